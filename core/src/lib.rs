pub mod abilities;
pub mod config;
pub mod definitions;
pub mod values;

// Re-exports for convenience
pub use abilities::{
    AbilityInstance, AbilityKey, AbilitySet, Application, CardBinding, CardHost, ConditionInputs,
    ExternalPayload, HostBinding, OwnerBinding, StatSheet, Transition, UnitBinding, UnitHost,
};
pub use config::{ConfigError, EngineConfig, EngineConfigExt};
pub use definitions::{
    AbilityCatalog, AbilityDefinition, ConditionTarget, LoaderError, ValueSlot, load_catalog,
    load_definitions_from_dir, load_definitions_from_file, load_definitions_from_str,
};
pub use evo_types::{AbilityType, ChangeKind, ConditionKind, OwnerKind, ValueKind};
pub use values::{EnumType, Value};
