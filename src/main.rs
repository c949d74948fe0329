use clap::{Parser, Subcommand};
use std::io::Write;

use evo::app_state::AppState;
use evo::commands;
use evo::logging;
use evo::readline;
use evo_core::{ConditionKind, EngineConfigExt};

fn main() -> Result<(), String> {
    let mut state = AppState::new();
    let _log_guard = logging::init(state.config.debug_logging);

    if state.config.definitions_path().is_some()
        && let Err(err) = commands::load(&mut state, None)
    {
        tracing::warn!(error = %err, "Could not load configured definitions");
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut state) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "evo ability shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load ability definitions (defaults to the configured directory)
    Load {
        #[arg(short, long)]
        path: Option<String>,
    },
    Config,
    SetDirectory {
        #[arg(short, long)]
        path: String,
    },
    /// List loaded definitions
    List,
    /// Create an owner with its abilities
    Spawn {
        meta_id: i32,
        /// Owner is an action card instead of a unit
        #[arg(long)]
        card: bool,
        /// Explicit ability IDs (defaults to the owner's catalog abilities)
        #[arg(short, long, value_delimiter = ',')]
        abilities: Vec<i32>,
        /// Base stats as STAT=VALUE
        #[arg(short, long)]
        stat: Vec<String>,
    },
    /// Route a condition to an owner's abilities
    Eval {
        owner: i32,
        #[arg(value_parser = parse_condition)]
        condition: ConditionKind,
        #[arg(long)]
        deactivate: bool,
        /// Start cooldowns when deactivating
        #[arg(long)]
        cooldown: bool,
        /// Condition operands, in order
        #[arg(short, long, value_delimiter = ',')]
        inputs: Vec<String>,
        /// External payload as KEY=VALUE
        #[arg(short, long)]
        payload: Vec<String>,
    },
    /// Settle momentary abilities after their event
    Post {
        owner: i32,
        #[arg(value_parser = parse_condition)]
        condition: ConditionKind,
    },
    /// Advance every owner's timers
    Tick { secs: f32 },
    /// Re-notify applied abilities of a type
    Apply {
        owner: i32,
        ability_type: String,
        #[arg(long)]
        sub_type: Option<String>,
        #[arg(short, long)]
        payload: Vec<String>,
    },
    /// Spend one use of an applied ability
    Consume {
        owner: i32,
        ability_type: String,
        #[arg(long)]
        sub_type: Option<String>,
    },
    /// Fold applied abilities of a type into a value
    Value {
        owner: i32,
        ability_type: String,
        value: String,
        #[arg(long)]
        sub_type: Option<String>,
        /// Spend a use of count-limited abilities
        #[arg(long)]
        active: bool,
    },
    Stats { owner: i32 },
    Abilities { owner: i32 },
    Exit,
}

fn parse_condition(raw: &str) -> Result<ConditionKind, String> {
    raw.parse()
}

fn respond(line: &str, state: &mut AppState) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "evo".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Load { path }) => commands::load(state, path.as_deref())?,
        Some(Commands::Config) => commands::show_config(state),
        Some(Commands::SetDirectory { path }) => commands::set_directory(state, path)?,
        Some(Commands::List) => commands::list_catalog(state),
        Some(Commands::Spawn {
            meta_id,
            card,
            abilities,
            stat,
        }) => commands::spawn(state, *meta_id, *card, abilities, stat)?,
        Some(Commands::Eval {
            owner,
            condition,
            deactivate,
            cooldown,
            inputs,
            payload,
        }) => commands::evaluate(
            state,
            *owner,
            *condition,
            *deactivate,
            *cooldown,
            inputs,
            payload,
        )?,
        Some(Commands::Post { owner, condition }) => {
            commands::post_evaluate(state, *owner, *condition)?
        }
        Some(Commands::Tick { secs }) => commands::tick(state, *secs)?,
        Some(Commands::Apply {
            owner,
            ability_type,
            sub_type,
            payload,
        }) => commands::apply(state, *owner, ability_type, sub_type.as_deref(), payload)?,
        Some(Commands::Consume {
            owner,
            ability_type,
            sub_type,
        }) => commands::consume(state, *owner, ability_type, sub_type.as_deref())?,
        Some(Commands::Value {
            owner,
            ability_type,
            value,
            sub_type,
            active,
        }) => commands::compute(
            state,
            *owner,
            ability_type,
            sub_type.as_deref(),
            value,
            *active,
        )?,
        Some(Commands::Stats { owner }) => commands::show_stats(state, *owner)?,
        Some(Commands::Abilities { owner }) => commands::show_abilities(state, *owner)?,
        Some(Commands::Exit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
