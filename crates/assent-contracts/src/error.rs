//! Error types for the ASSENT decision pipeline.
//!
//! The split is deliberate: input malformation is an `Err(AssentError)`,
//! while an authorization denial is a perfectly valid `Ok` decision with a
//! structured reason code. Callers on hot paths never see unwinding for
//! either case.

use thiserror::Error;

/// The unified error type for the ASSENT engine.
///
/// Every variant describes malformed input or misconfiguration, never a
/// policy outcome. Policy outcomes travel inside `Decision`.
#[derive(Debug, Error)]
pub enum AssentError {
    /// A timestamp string did not match any documented ISO-8601 form.
    #[error("unparseable timestamp '{value}': {detail}")]
    TimestampParse { value: String, detail: String },

    /// The request listed no data types at all.
    #[error("request '{request_id}' has an empty dataTypes list")]
    EmptyDataTypes { request_id: String },

    /// The request listed the same data type more than once.
    #[error("request '{request_id}' lists data type '{value}' more than once")]
    DuplicateDataType { request_id: String, value: String },

    /// A period's start lies after its end.
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidTimeRange { start: String, end: String },

    /// A string did not name a member of a closed enumeration.
    #[error("unknown {kind} code '{value}'")]
    UnknownEnum { kind: &'static str, value: String },

    /// An identifier failed syntactic validation.
    #[error("invalid {kind} '{value}': {detail}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        detail: String,
    },

    /// A consent tree exceeded the hard node or depth bound.
    #[error("consent '{consent_id}' exceeds tree bounds: {nodes} nodes (max {max_nodes}), depth {depth} (max {max_depth})")]
    OversizedConsentTree {
        consent_id: String,
        nodes: usize,
        max_nodes: usize,
        depth: usize,
        max_depth: usize,
    },

    /// A configuration value is missing, unreadable, or out of range.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// An interop resource could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the ASSENT crates.
pub type AssentResult<T> = Result<T, AssentError>;
