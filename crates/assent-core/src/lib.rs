//! # assent-core
//!
//! The ASSENT consent decision engine.
//!
//! Given a request to access patient clinical data, the engine selects the
//! best-matching active consent, evaluates its provision tree into a
//! field-level permission set, applies role / purpose / sensitivity /
//! preference filters, honors the emergency override, and assembles the
//! decision together with a consent snapshot and an audit event.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use assent_core::DecisionEngine;
//! use assent_temporal::wall_clock_now;
//!
//! let engine = DecisionEngine::new();
//! let bundle = engine.validate(&request, &consents, wall_clock_now(), &preferences)?;
//! ```
//!
//! `validate` is stateless and shared-nothing: no I/O, no locks, no state
//! between calls. Identical inputs produce byte-identical bundles.

pub mod assembler;
pub mod config;
pub mod emergency;
pub mod engine;
pub mod evaluator;
pub mod filter;
pub mod matcher;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::EngineConfig;
pub use engine::DecisionEngine;
pub use traits::{DeclaredRelationship, RelationshipResolver};

// ── Scenario and property tests ───────────────────────────────────────────────
