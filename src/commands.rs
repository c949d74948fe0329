//! Shell command handlers
//!
//! Each handler drives one engine operation against [`AppState`] and prints
//! its result. Errors are returned as display strings for the REPL.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use evo_core::{
    AbilityKey, Application, ConditionInputs, ConditionKind, EngineConfigExt, ExternalPayload,
    OwnerKind, StatSheet, Value,
};

use crate::app_state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Argument Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Numbers parse as numbers; everything else stays text
pub fn parse_value(raw: &str) -> Value {
    match raw.trim().parse::<f32>() {
        Ok(v) => Value::Number(v),
        Err(_) => Value::Text(raw.trim().to_string()),
    }
}

/// Split a `KEY=VALUE` pair
pub fn parse_pair(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), parse_value(value)))
}

pub fn parse_payload(pairs: &[String]) -> Result<Option<ExternalPayload>, String> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut payload = ExternalPayload::new();
    for pair in pairs {
        let (key, value) = parse_pair(pair)?;
        payload.insert(key, value.as_f32());
    }
    Ok(Some(payload))
}

fn key(ability_type: &str, sub_type: Option<&str>) -> AbilityKey {
    let key = AbilityKey::new(ability_type);
    match sub_type {
        Some(sub_type) => key.with_sub_type(sub_type),
        None => key,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog & Config
// ─────────────────────────────────────────────────────────────────────────────

pub fn load(state: &mut AppState, path: Option<&str>) -> Result<(), String> {
    let timer = Instant::now();
    let count = state.load_catalog(path.map(PathBuf::from))?;
    println!(
        "loaded {} abilities in {}ms",
        count,
        timer.elapsed().as_millis()
    );
    Ok(())
}

pub fn show_config(state: &AppState) {
    println!("definitions_dir:        {}", state.config.definitions_dir);
    println!(
        "case_insensitive_enums: {}",
        state.config.case_insensitive_enums
    );
    println!("debug_logging:          {}", state.config.debug_logging);
    if let Some(path) = evo_core::EngineConfig::config_path() {
        println!("config file:            {}", path.display());
    }
}

pub fn set_directory(state: &mut AppState, path: &str) -> Result<(), String> {
    state.config.definitions_dir = path.to_string();
    state.config.save().map_err(|e| e.to_string())?;
    println!("definitions directory set to {path}");
    Ok(())
}

pub fn list_catalog(state: &AppState) {
    if state.catalog.is_empty() {
        println!("No abilities loaded");
        return;
    }

    println!(
        "{:<10} {:<8} {:<24} {:<18} Values",
        "Meta ID", "Owner", "Type", "Condition"
    );
    println!("{}", "-".repeat(80));
    for def in state.catalog.iter() {
        let values: Vec<String> = def
            .values
            .iter()
            .map(|slot| slot.value.to_string())
            .collect();
        println!(
            "{:<10} {:<8} {:<24} {:<18} {}",
            def.meta_id,
            def.owner_meta_id,
            def.type_label(),
            def.condition.to_string(),
            values.join(", ")
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Owners
// ─────────────────────────────────────────────────────────────────────────────

pub fn spawn(
    state: &mut AppState,
    meta_id: i32,
    card: bool,
    abilities: &[i32],
    stats: &[String],
) -> Result<(), String> {
    let kind = if card {
        OwnerKind::ActionCard
    } else {
        OwnerKind::Unit
    };
    let mut sheet = StatSheet::new(kind, meta_id);
    for stat in stats {
        let (name, value) = parse_pair(stat)?;
        sheet.set_base(name, value);
    }

    let count = state.spawn(kind, meta_id, abilities, sheet);
    println!("spawned {kind} {meta_id} with {count} abilities");
    Ok(())
}

pub fn evaluate(
    state: &mut AppState,
    owner: i32,
    condition: ConditionKind,
    deactivate: bool,
    cooldown: bool,
    inputs: &[String],
    payload: &[String],
) -> Result<(), String> {
    let payload = parse_payload(payload)?;
    let inputs = ConditionInputs::new(inputs.iter().map(|raw| parse_value(raw)).collect());
    let set = state.owner_mut(owner)?;
    let notified = set.evaluate(condition, !deactivate, cooldown, &inputs, payload.as_ref());
    println!("{condition}: {notified} notifications");
    Ok(())
}

pub fn post_evaluate(
    state: &mut AppState,
    owner: i32,
    condition: ConditionKind,
) -> Result<(), String> {
    let settled = state.owner_mut(owner)?.post_evaluate(condition);
    println!("{condition}: {settled} abilities settled");
    Ok(())
}

pub fn tick(state: &mut AppState, secs: f32) -> Result<(), String> {
    if secs < 0.0 {
        return Err("tick duration cannot be negative".to_string());
    }
    let expired = state.tick(secs);
    println!("t={:.2}s, {expired} abilities expired", state.elapsed_secs);
    Ok(())
}

pub fn apply(
    state: &mut AppState,
    owner: i32,
    ability_type: &str,
    sub_type: Option<&str>,
    payload: &[String],
) -> Result<(), String> {
    let payload = parse_payload(payload)?;
    let set = state.owner_mut(owner)?;
    let notified = set.apply_applied(&key(ability_type, sub_type), payload.as_ref());
    println!("{ability_type}: re-applied {notified} abilities");
    Ok(())
}

pub fn consume(
    state: &mut AppState,
    owner: i32,
    ability_type: &str,
    sub_type: Option<&str>,
) -> Result<(), String> {
    let set = state.owner_mut(owner)?;
    let applied = set.is_applied(&key(ability_type, sub_type), Application::Active);
    let status = if applied { "applied" } else { "not applied" };
    println!("{ability_type}: {status}");
    Ok(())
}

/// Fold every applied ability of `ability_type` into `value`
pub fn compute(
    state: &mut AppState,
    owner: i32,
    ability_type: &str,
    sub_type: Option<&str>,
    value: &str,
    active: bool,
) -> Result<(), String> {
    let application = if active {
        Application::Active
    } else {
        Application::Passive
    };
    let ability_key = key(ability_type, sub_type);
    let set = state.owner_mut(owner)?;
    let result = set.applied_value(&parse_value(value), &ability_key, application, &[]);
    println!("{ability_type}: {value} -> {result}");
    Ok(())
}

pub fn show_stats(state: &mut AppState, owner: i32) -> Result<(), String> {
    let set = state.owner_mut(owner)?;
    let sheet = set.binding().host();
    println!("{:<24} {:<12} Current", "Stat", "Base");
    println!("{}", "-".repeat(50));
    for (name, value) in sheet.stats() {
        let base = sheet
            .base(name.as_str())
            .map_or_else(|| "-".to_string(), Value::to_string);
        println!("{:<24} {:<12} {}", name.as_str(), base, value);
    }
    println!("{} notifications received", sheet.applications());
    Ok(())
}

pub fn show_abilities(state: &mut AppState, owner: i32) -> Result<(), String> {
    let set = state.owner_mut(owner)?;
    if set.is_empty() {
        println!("Owner {owner} has no abilities");
        return Ok(());
    }

    println!(
        "{:<10} {:<24} {:<18} {:<8} {:<6} {:<6} {:<8} Cool",
        "Meta ID", "Type", "Condition", "Applied", "Stack", "Uses", "Time"
    );
    println!("{}", "-".repeat(92));
    for instance in set.instances() {
        println!(
            "{:<10} {:<24} {:<18} {:<8} {:<6} {:<6} {:<8.2} {:.2}",
            instance.meta_id(),
            instance.definition().type_label(),
            instance.condition().to_string(),
            instance.is_applied(),
            instance.applied_count(),
            instance.remaining_count(),
            instance.remaining_duration(),
            instance.remaining_cool_time(),
        );
    }
    Ok(())
}

pub fn exit() -> Result<(), String> {
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}
