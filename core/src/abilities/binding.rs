//! Owner bindings
//!
//! An ability set never touches its owner's stats directly. Every state
//! transition is handed to an [`OwnerBinding`], which re-derives the affected
//! stat with [`AbilityInstance::compute_applied_value`].

use evo_types::OwnerKind;

use super::{AbilityInstance, ExternalPayload};

/// Capability through which ability transitions reach the owning entity.
pub trait OwnerBinding {
    /// Called after every observable transition of `instance`.
    ///
    /// `payload` is the triggering event's data, when the transition came
    /// from an evaluation that carried one.
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    );
}

impl<F> OwnerBinding for F
where
    F: FnMut(&mut AbilityInstance, Option<&ExternalPayload>),
{
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        self(instance, payload)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hosts
// ─────────────────────────────────────────────────────────────────────────────

/// A field unit that accepts ability applications.
pub trait UnitHost {
    fn unit_meta_id(&self) -> i32;

    fn apply_unit_ability(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    );
}

/// An action card that accepts ability applications.
pub trait CardHost {
    fn card_meta_id(&self) -> i32;

    fn apply_card_ability(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    );
}

/// Binds an ability set to a unit.
#[derive(Debug, Clone, Default)]
pub struct UnitBinding<H> {
    host: H,
}

impl<H: UnitHost> UnitBinding<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H: UnitHost> OwnerBinding for UnitBinding<H> {
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        tracing::trace!(
            unit = self.host.unit_meta_id(),
            meta_id = instance.meta_id(),
            applied = instance.is_applied(),
            "Applying ability to unit"
        );
        self.host.apply_unit_ability(instance, payload);
    }
}

/// Binds an ability set to an action card.
#[derive(Debug, Clone, Default)]
pub struct CardBinding<H> {
    host: H,
}

impl<H: CardHost> CardBinding<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H: CardHost> OwnerBinding for CardBinding<H> {
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        tracing::trace!(
            card = self.host.card_meta_id(),
            meta_id = instance.meta_id(),
            applied = instance.is_applied(),
            "Applying ability to action card"
        );
        self.host.apply_card_ability(instance, payload);
    }
}

/// Either binding over a host that can act as both, chosen by owner kind.
#[derive(Debug, Clone)]
pub enum HostBinding<H> {
    Unit(UnitBinding<H>),
    Card(CardBinding<H>),
}

impl<H: UnitHost + CardHost> HostBinding<H> {
    pub fn new(kind: OwnerKind, host: H) -> Self {
        match kind {
            OwnerKind::Unit => HostBinding::Unit(UnitBinding::new(host)),
            OwnerKind::ActionCard => HostBinding::Card(CardBinding::new(host)),
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            HostBinding::Unit(_) => OwnerKind::Unit,
            HostBinding::Card(_) => OwnerKind::ActionCard,
        }
    }

    pub fn host(&self) -> &H {
        match self {
            HostBinding::Unit(b) => b.host(),
            HostBinding::Card(b) => b.host(),
        }
    }

    pub fn host_mut(&mut self) -> &mut H {
        match self {
            HostBinding::Unit(b) => b.host_mut(),
            HostBinding::Card(b) => b.host_mut(),
        }
    }
}

impl<H: UnitHost + CardHost> OwnerBinding for HostBinding<H> {
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        match self {
            HostBinding::Unit(b) => b.on_ability_applied(instance, payload),
            HostBinding::Card(b) => b.on_ability_applied(instance, payload),
        }
    }
}
