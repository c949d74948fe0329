//! Ability definitions
//!
//! Definitions are loaded from TOML metadata, resolved once (enum names,
//! condition targets, DECREASE sign) and collected into an [`AbilityCatalog`].

mod catalog;
mod condition;
mod definition;
mod error;
mod loader;

pub use catalog::AbilityCatalog;
pub use condition::{ConditionTarget, SLOT_SEQUENCE_LABEL};
pub use definition::{AbilityDefinition, ValueSlot};
pub use error::LoaderError;
pub use loader::{
    load_catalog, load_definitions_from_dir, load_definitions_from_file,
    load_definitions_from_str,
};
