//! Ability metadata loading
//!
//! Metadata files are TOML documents holding any number of `[[ability]]`
//! tables. A directory is scanned recursively; files are read in path order
//! so catalog order is stable between runs.

use std::fs;
use std::path::{Path, PathBuf};

use evo_types::{AbilityConfig, AbilityRecord};

use super::{AbilityCatalog, AbilityDefinition, LoaderError};

/// Load ability definitions from a single TOML file
pub fn load_definitions_from_file(
    path: &Path,
    ignore_case: bool,
) -> Result<Vec<AbilityDefinition>, LoaderError> {
    let content = fs::read_to_string(path).map_err(|source| LoaderError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    load_definitions_from_str(&content, path, ignore_case)
}

/// Parse ability definitions from TOML text; `path` only labels errors.
pub fn load_definitions_from_str(
    content: &str,
    path: &Path,
    ignore_case: bool,
) -> Result<Vec<AbilityDefinition>, LoaderError> {
    let config: AbilityConfig = toml::from_str(content).map_err(|source| LoaderError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;

    config
        .abilities
        .iter()
        .map(|record| {
            validate_record(record, path)?;
            Ok(AbilityDefinition::from_record(record, ignore_case))
        })
        .collect()
}

/// Load every `.toml` file under `dir`, recursing into subdirectories
pub fn load_definitions_from_dir(
    dir: &Path,
    ignore_case: bool,
) -> Result<Vec<AbilityDefinition>, LoaderError> {
    let mut files = Vec::new();
    collect_toml_files(dir, &mut files)?;
    files.sort();

    let mut definitions = Vec::new();
    for file in &files {
        let loaded = load_definitions_from_file(file, ignore_case)?;
        tracing::debug!(path = %file.display(), count = loaded.len(), "Loaded ability file");
        definitions.extend(loaded);
    }
    Ok(definitions)
}

/// Load a directory straight into a catalog. Duplicate IDs keep the first
/// definition seen.
pub fn load_catalog(dir: &Path, ignore_case: bool) -> Result<AbilityCatalog, LoaderError> {
    let definitions = load_definitions_from_dir(dir, ignore_case)?;
    let mut catalog = AbilityCatalog::new();
    catalog.add_definitions(definitions, false);
    tracing::info!(
        dir = %dir.display(),
        abilities = catalog.len(),
        "Ability catalog loaded"
    );
    Ok(catalog)
}

fn collect_toml_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoaderError> {
    let entries = fs::read_dir(dir).map_err(|source| LoaderError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| LoaderError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_toml_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    Ok(())
}

fn validate_record(record: &AbilityRecord, path: &Path) -> Result<(), LoaderError> {
    let invalid = |reason: &str| LoaderError::InvalidDefinition {
        path: path.to_path_buf(),
        meta_id: record.meta_id,
        reason: reason.to_string(),
    };

    if record.meta_id <= 0 {
        return Err(invalid("meta_id must be positive"));
    }
    if record.values.is_empty() {
        return Err(invalid("at least one value slot is required"));
    }
    if record.duration < 0.0 || record.cool_time < 0.0 {
        return Err(invalid("duration and cool_time cannot be negative"));
    }
    Ok(())
}
