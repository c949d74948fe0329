//! Owner binding that records transitions for reporting

use evo_core::{
    AbilityInstance, AbilityType, ExternalPayload, HostBinding, OwnerBinding, OwnerKind, StatSheet,
};

/// One owner notification, as observed by the binding
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityEvent {
    pub meta_id: i32,
    pub ability_type: AbilityType,
    pub applied: bool,
    /// Uses left after the owner applied the value (0 for unlimited)
    pub remaining_count: u32,
}

/// Applies abilities to a stat sheet and keeps every notification until drained.
#[derive(Debug)]
pub struct ReplayBinding {
    inner: HostBinding<StatSheet>,
    events: Vec<AbilityEvent>,
}

impl ReplayBinding {
    pub fn new(kind: OwnerKind, sheet: StatSheet) -> Self {
        Self {
            inner: HostBinding::new(kind, sheet),
            events: Vec::new(),
        }
    }

    pub fn sheet(&self) -> &StatSheet {
        self.inner.host()
    }

    pub fn drain_events(&mut self) -> Vec<AbilityEvent> {
        std::mem::take(&mut self.events)
    }
}

impl OwnerBinding for ReplayBinding {
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        let applied = instance.is_applied();
        self.inner.on_ability_applied(instance, payload);
        self.events.push(AbilityEvent {
            meta_id: instance.meta_id(),
            ability_type: instance.ability_type().clone(),
            applied,
            remaining_count: instance.remaining_count(),
        });
    }
}
