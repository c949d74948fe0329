//! Conditional abilities
//!
//! This module turns ability definitions into live, per-owner state:
//!
//! ```text
//! AbilityCatalog ──definitions_for_owner──► AbilitySet<B: OwnerBinding>
//!                                               │
//!          evaluate / post_evaluate / tick      │ IndexMap<AbilityType, Vec<AbilityInstance>>
//!                                               ▼
//!                               AbilityInstance (state machine + value math)
//!                                               │
//!                                               ▼  on_ability_applied
//!                                        OwnerBinding (unit / action card)
//! ```
//!
//! All mutation happens synchronously inside the calling frame; nothing here
//! is shared between owners.

mod binding;
mod inputs;
mod instance;
mod set;
mod stats;

#[cfg(test)]
mod set_tests;

pub use binding::{CardBinding, CardHost, HostBinding, OwnerBinding, UnitBinding, UnitHost};
pub use inputs::{ConditionInputs, ExternalPayload};
pub use instance::{AbilityInstance, Application, Transition};
pub use set::{AbilityKey, AbilitySet};
pub use stats::StatSheet;
