//! Ability validation CLI
//!
//! Replays a scenario timeline through an owner's ability set and validates
//! activation behavior:
//! - Realtime mode (1x): Watch transitions happen at scenario pace
//! - Accelerated mode: Fast CI validation with checkpoints

mod output;
mod replay;
mod scenario;
mod verification;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use evo_core::{
    AbilityKey, AbilitySet, Application, EngineConfig, EngineConfigExt, StatSheet, load_catalog,
};

use crate::output::{CliOutput, OutputLevel};
use crate::replay::{ReplayBinding, VirtualClock};
use crate::scenario::{Scenario, Step, condition_inputs, external_payload, record_to_value};
use crate::verification::{CheckpointVerifier, Expectations, Snapshot};

// ═══════════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ReplayMode {
    /// 1x speed with actual timing delays
    Realtime,
    /// Fast replay with virtual time (default)
    #[default]
    Accelerated,
}

#[derive(Parser, Debug)]
#[command(name = "evo-validate")]
#[command(about = "Validate ability definitions against scenario timelines")]
#[command(version)]
struct Args {
    /// Path to scenario TOML file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Path to definitions directory (defaults to the configured one)
    #[arg(short, long)]
    definitions: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────────────────
    // Replay Mode
    // ─────────────────────────────────────────────────────────────────────────
    /// Replay mode
    #[arg(long, value_enum, default_value_t = ReplayMode::Accelerated)]
    mode: ReplayMode,

    /// Custom speed multiplier (overrides --mode)
    #[arg(long)]
    speed: Option<f32>,

    // ─────────────────────────────────────────────────────────────────────────
    // Output Mode
    // ─────────────────────────────────────────────────────────────────────────
    /// Quiet mode: summary only
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode: show every step and stat table
    #[arg(short, long)]
    verbose: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────
    /// Path to expectations TOML file for checkpoint verification
    #[arg(long)]
    expect: Option<PathBuf>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════════

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let output_level = if args.quiet {
        OutputLevel::Quiet
    } else if args.verbose {
        OutputLevel::Verbose
    } else {
        OutputLevel::Normal
    };
    let mut cli = CliOutput::new(output_level);

    let config = EngineConfig::load_or_default();
    let Some(definitions_dir) = args.definitions.clone().or(config.definitions_path()) else {
        return Err("no definitions directory given or configured".into());
    };
    let catalog = load_catalog(&definitions_dir, config.case_insensitive_enums)?;
    let scenario = Scenario::load(&args.scenario)?;

    let owner = &scenario.owner;
    let definitions = if owner.abilities.is_empty() {
        catalog.definitions_for_owner(owner.kind, owner.meta_id)
    } else {
        catalog.definitions_for_ids(&owner.abilities)
    };
    tracing::info!(
        owner = owner.meta_id,
        kind = %owner.kind,
        abilities = definitions.len(),
        "Building ability set"
    );

    let mut sheet = StatSheet::new(owner.kind, owner.meta_id);
    for (stat, value) in &owner.stats {
        sheet.set_base(stat.as_str(), record_to_value(value));
    }
    let mut set = AbilitySet::new(
        owner.meta_id,
        &definitions,
        ReplayBinding::new(owner.kind, sheet),
    );

    let mut verifier = match &args.expect {
        Some(expect_path) => {
            let expectations = Expectations::load(expect_path)?;
            let expected_scenario = &expectations.meta.scenario;
            if !expected_scenario.is_empty() && *expected_scenario != scenario.name {
                eprintln!(
                    "Warning: expectations file is for '{}' but replaying '{}'",
                    expected_scenario, scenario.name
                );
            }
            Some(CheckpointVerifier::new(expectations))
        }
        None => None,
    };

    let mut clock = match (args.speed, args.mode) {
        (Some(speed), _) => VirtualClock::new(speed),
        (None, ReplayMode::Realtime) => VirtualClock::realtime(),
        (None, ReplayMode::Accelerated) => VirtualClock::instant(),
    };
    if !args.quiet {
        let pace = if clock.is_instant_mode() {
            "instant".to_string()
        } else {
            format!("{:.1}x", clock.speed())
        };
        eprintln!("Replaying {} at {}", args.scenario.display(), pace);
    }
    cli.scenario_start(&scenario.name, set.len());

    for step in &scenario.steps {
        let at = step.at_secs();
        // checkpoints strictly before this step see the state without it
        run_checkpoints(
            &mut set,
            &mut clock,
            &mut cli,
            verifier.as_mut(),
            |t| t < at,
        );
        advance(&mut set, &mut clock, &mut cli, at);

        cli.step(at, &step.describe());
        run_step(&mut set, step, &mut cli, at);
        report_events(&mut set, &mut cli, at);
        cli.stats(at, &set.binding().sheet().stats());
    }

    let end = verifier
        .as_ref()
        .and_then(CheckpointVerifier::last_checkpoint_secs)
        .unwrap_or(0.0)
        .max(scenario.duration());
    run_checkpoints(
        &mut set,
        &mut clock,
        &mut cli,
        verifier.as_mut(),
        |t| t <= end,
    );
    advance(&mut set, &mut clock, &mut cli, end);
    tracing::info!(elapsed = clock.elapsed_secs(), "Replay finished");
    cli.scenario_end(&clock.format_time());
    cli.flush();

    let verification = verifier.map(CheckpointVerifier::finalize);
    cli.print_summary(
        verification
            .as_ref()
            .map(|r| (r.checkpoints_passed, r.checkpoints_total)),
    );

    // Exit with error code if verification failed
    if verification.is_some_and(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Replay
// ═══════════════════════════════════════════════════════════════════════════════

/// Move the clock to `secs`, ticking the set by the elapsed delta
fn advance(
    set: &mut AbilitySet<ReplayBinding>,
    clock: &mut VirtualClock,
    cli: &mut CliOutput,
    secs: f32,
) {
    let delta = clock.advance_to(secs);
    if delta > 0.0 {
        set.tick(delta);
        report_events(set, cli, secs);
    }
}

fn run_checkpoints(
    set: &mut AbilitySet<ReplayBinding>,
    clock: &mut VirtualClock,
    cli: &mut CliOutput,
    verifier: Option<&mut CheckpointVerifier>,
    due: impl Fn(f32) -> bool,
) {
    let Some(verifier) = verifier else {
        return;
    };
    while let Some(at) = verifier.next_checkpoint_secs() {
        if !due(at) {
            break;
        }
        advance(set, clock, cli, at);
        if let Some(result) = verifier.verify_next(&snapshot(set)) {
            cli.checkpoint(&result);
        }
    }
}

fn run_step(set: &mut AbilitySet<ReplayBinding>, step: &Step, cli: &mut CliOutput, at: f32) {
    match step {
        Step::Evaluate {
            condition,
            activate,
            cooldown,
            inputs,
            payload,
            ..
        } => {
            let inputs = condition_inputs(inputs);
            let payload = external_payload(payload);
            set.evaluate(*condition, *activate, *cooldown, &inputs, payload.as_ref());
        }
        Step::PostEvaluate { condition, .. } => {
            set.post_evaluate(*condition);
        }
        Step::Apply {
            ability_type,
            sub_type,
            payload,
            ..
        } => {
            let key = AbilityKey::new(ability_type.as_str()).with_sub_type(sub_type.as_str());
            let payload = external_payload(payload);
            let notified = set.apply_applied(&key, payload.as_ref());
            tracing::debug!(ability_type = %ability_type, notified, "Re-applied abilities");
        }
        Step::Consume {
            ability_type,
            sub_type,
            ..
        } => {
            let key = AbilityKey::new(ability_type.as_str()).with_sub_type(sub_type.as_str());
            let applied = set.is_applied(&key, Application::Active);
            cli.consume(at, ability_type, applied);
        }
    }
}

fn report_events(set: &mut AbilitySet<ReplayBinding>, cli: &mut CliOutput, at: f32) {
    for event in set.binding_mut().drain_events() {
        cli.ability_event(at, &event);
    }
}

fn snapshot(set: &AbilitySet<ReplayBinding>) -> Snapshot {
    Snapshot {
        applied: set.all_applied(&[]).iter().map(|i| i.meta_id()).collect(),
        stats: set
            .binding()
            .sheet()
            .stats()
            .into_iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_f32()))
            .collect(),
    }
}
