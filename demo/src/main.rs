//! ASSENT Consent Decision Engine — Demo CLI
//!
//! Runs one or all of the six seed scenarios against the real engine and
//! prints the decision plus the canonical bundle JSON.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- physician-treatment
//!   cargo run -p demo -- nested-deny
//!   cargo run -p demo -- researcher-pseudonymization
//!   cargo run -p demo -- emergency-override
//!   cargo run -p demo -- emergency-refused
//!   cargo run -p demo -- temporal-violation

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use assent_contracts::AssentResult;
use assent_core::DecisionEngine;
use assent_interop::to_canonical_string;

mod fixtures;

use fixtures::Scenario;

// ── CLI definition ────────────────────────────────────────────────────────────

/// ASSENT — healthcare consent decision engine demo.
///
/// Each subcommand runs one (or all) of the seed scenarios: matching,
/// provision evaluation, filtering, emergency override, and interop
/// emission, end to end.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "ASSENT consent decision engine demo",
    long_about = "Runs the ASSENT seed scenarios against the decision engine.\n\n\
                  Scenarios:\n\
                  1. Physician treatment access   — exact consent match\n\
                  2. Nested deny                  — genetic data carved out\n\
                  3. Researcher pseudonymization  — identifying fields rewritten\n\
                  4. Emergency override (nurse)   — forced allergy access, 24h cap\n\
                  5. Emergency refused (researcher) — no override capability\n\
                  6. Temporal violation           — request window outside consent"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Print the full canonical bundle JSON for each scenario.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run all six scenarios in sequence.
    RunAll,
    /// Scenario 1: physician treatment access with an exact match.
    PhysicianTreatment,
    /// Scenario 2: nested deny for genetic data.
    NestedDeny,
    /// Scenario 3: researcher access with pseudonymization.
    ResearcherPseudonymization,
    /// Scenario 4: nurse emergency override.
    EmergencyOverride,
    /// Scenario 5: researcher refused emergency expansion.
    EmergencyRefused,
    /// Scenario 6: request window outside the consent period.
    TemporalViolation,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging. Set RUST_LOG=debug for scoring detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let scenarios = match cli.command {
        Command::RunAll => fixtures::all(),
        Command::PhysicianTreatment => vec![fixtures::physician_treatment()],
        Command::NestedDeny => vec![fixtures::nested_genetic_deny()],
        Command::ResearcherPseudonymization => vec![fixtures::researcher_pseudonymization()],
        Command::EmergencyOverride => vec![fixtures::nurse_emergency_override()],
        Command::EmergencyRefused => vec![fixtures::researcher_emergency_refused()],
        Command::TemporalViolation => vec![fixtures::temporal_violation()],
    };

    if let Err(e) = run(scenarios, cli.json) {
        eprintln!("demo error: {}", e);
        std::process::exit(1);
    }
}

fn run(scenarios: Vec<Scenario>, json: bool) -> AssentResult<()> {
    let engine = DecisionEngine::new();

    for scenario in scenarios {
        println!();
        println!("── {} ──", scenario.title);
        println!("   expectation: {}", scenario.expectation);

        let bundle = engine.validate(
            &scenario.request,
            &scenario.consents,
            scenario.now,
            &scenario.preferences,
        )?;
        let decision = &bundle.decision;

        println!(
            "   decision: {:?} ({})",
            decision.kind, decision.reason.human
        );
        if let Some(handle) = &decision.access_handle {
            println!("   handle expires: {}", handle.expires_at.to_rfc3339());
        }
        if let Some(permissions) = &decision.permissions {
            let allowed: Vec<String> =
                permissions.allowed.iter().map(|c| c.to_string()).collect();
            println!("   allowed: {}", allowed.join(", "));
            if !permissions.masked.is_empty() {
                let masked: Vec<String> =
                    permissions.masked.iter().map(|f| f.to_string()).collect();
                println!("   masked: {}", masked.join(", "));
            }
            if !permissions.pseudonymized.is_empty() {
                let pseudo: Vec<String> =
                    permissions.pseudonymized.iter().map(|f| f.to_string()).collect();
                println!("   pseudonymized: {}", pseudo.join(", "));
            }
        }
        println!("   audit outcome: {}", bundle.audit_event["outcome"]);

        if json {
            let value = serde_json::to_value(&bundle).map_err(|e| {
                assent_contracts::AssentError::Serialization {
                    reason: format!("failed to serialize bundle: {}", e),
                }
            })?;
            println!("{}", to_canonical_string(&value));
        }
    }

    println!();
    println!("All selected scenarios completed.");
    Ok(())
}
