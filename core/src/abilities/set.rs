//! Per-owner ability sets
//!
//! An [`AbilitySet`] owns every ability instance of one unit or action card,
//! grouped by ability type in insertion order. It routes condition
//! evaluations and ticks to its instances and forwards each observable
//! transition to the owner through an [`OwnerBinding`].
//!
//! Iteration order is stable: groups in the order their first definition was
//! added, instances within a group in definition order. Two evaluations with
//! identical inputs always produce the same callback sequence.

use indexmap::IndexMap;

use evo_types::{AbilityType, ConditionKind};

use super::{AbilityInstance, Application, ConditionInputs, ExternalPayload, OwnerBinding};
use crate::definitions::AbilityDefinition;
use crate::values::Value;

/// Lookup key for value queries: an ability type, optionally narrowed to one
/// sub type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbilityKey {
    pub ability_type: AbilityType,
    pub sub_type: Option<String>,
}

impl AbilityKey {
    pub fn new(ability_type: impl Into<AbilityType>) -> Self {
        Self {
            ability_type: ability_type.into(),
            sub_type: None,
        }
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        let sub_type = sub_type.into();
        self.sub_type = (!sub_type.is_empty()).then_some(sub_type);
        self
    }

    fn matches(&self, instance: &AbilityInstance) -> bool {
        self.sub_type
            .as_deref()
            .is_none_or(|sub_type| instance.sub_type() == sub_type)
    }
}

impl From<&str> for AbilityKey {
    fn from(ability_type: &str) -> Self {
        Self::new(ability_type)
    }
}

/// The abilities of one owner
pub struct AbilitySet<B> {
    owner_meta_id: i32,
    abilities: IndexMap<AbilityType, Vec<AbilityInstance>>,
    binding: B,
}

impl<B: OwnerBinding> AbilitySet<B> {
    pub fn new(owner_meta_id: i32, definitions: &[AbilityDefinition], binding: B) -> Self {
        let mut set = Self {
            owner_meta_id,
            abilities: IndexMap::new(),
            binding,
        };
        set.add_definitions(definitions);
        set
    }

    /// Add one inactive instance per definition.
    pub fn add_definitions(&mut self, definitions: &[AbilityDefinition]) {
        for definition in definitions {
            self.abilities
                .entry(definition.ability_type.clone())
                .or_default()
                .push(AbilityInstance::new(definition));
        }
    }

    pub fn owner_meta_id(&self) -> i32 {
        self.owner_meta_id
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    pub fn into_binding(self) -> B {
        self.binding
    }

    /// Definitions of every instance, in iteration order
    pub fn definitions(&self) -> Vec<&AbilityDefinition> {
        self.instances().map(AbilityInstance::definition).collect()
    }

    pub fn instances(&self) -> impl Iterator<Item = &AbilityInstance> {
        self.abilities.values().flatten()
    }

    pub fn instance(&self, meta_id: i32) -> Option<&AbilityInstance> {
        self.instances()
            .find(|instance| instance.meta_id() == meta_id)
    }

    pub fn len(&self) -> usize {
        self.abilities.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Evaluation
    // ═══════════════════════════════════════════════════════════════════════

    /// Route a condition to every instance it reaches.
    ///
    /// Each reached instance is settled first. Activation then requires the
    /// inputs to satisfy the instance; deactivation only requires the
    /// condition to match. Activating a zone-conditioned instance deactivates
    /// every instance of the opposite zone.
    ///
    /// Returns the number of owner notifications sent.
    pub fn evaluate(
        &mut self,
        condition: ConditionKind,
        activate: bool,
        start_cooldown: bool,
        inputs: &ConditionInputs,
        payload: Option<&ExternalPayload>,
    ) -> usize {
        let mut notified = 0;
        for group in 0..self.abilities.len() {
            for index in 0..self.abilities[group].len() {
                notified += self.evaluate_instance(
                    group,
                    index,
                    condition,
                    activate,
                    start_cooldown,
                    inputs,
                    payload,
                );
            }
        }
        notified
    }

    fn evaluate_instance(
        &mut self,
        group: usize,
        index: usize,
        condition: ConditionKind,
        activate: bool,
        start_cooldown: bool,
        inputs: &ConditionInputs,
        payload: Option<&ExternalPayload>,
    ) -> usize {
        let binding = &mut self.binding;
        let instance = &mut self.abilities[group][index];
        if !instance.condition().is_requested_by(condition) {
            return 0;
        }

        let mut notified = 0;
        if instance.settle(true) {
            binding.on_ability_applied(instance, payload);
            notified += 1;
        }

        let transition = if activate {
            if !instance.can_satisfy(inputs) {
                return notified;
            }
            instance.try_activate()
        } else {
            instance.try_deactivate(start_cooldown)
        };
        if !transition.changed() {
            return notified;
        }

        binding.on_ability_applied(instance, payload);
        notified += 1;

        let opposite = if instance.is_applied() {
            instance.condition().opposite_zone()
        } else {
            None
        };
        if let Some(opposite) = opposite {
            // deactivation never recurses, so this terminates after one level
            notified += self.evaluate(opposite, false, start_cooldown, inputs, None);
        }
        notified
    }

    /// Settle every instance of `condition` after its event has been handled.
    ///
    /// Returns the number of instances deactivated.
    pub fn post_evaluate(&mut self, condition: ConditionKind) -> usize {
        let binding = &mut self.binding;
        let mut settled = 0;
        for instance in self.abilities.values_mut().flatten() {
            if instance.condition().is_requested_by(condition) && instance.settle(true) {
                binding.on_ability_applied(instance, None);
                settled += 1;
            }
        }
        settled
    }

    /// Advance every instance by `delta` seconds.
    ///
    /// Returns the number of instances whose duration ran out.
    pub fn tick(&mut self, delta: f32) -> usize {
        let binding = &mut self.binding;
        let mut expired = 0;
        for instance in self.abilities.values_mut().flatten() {
            if instance.tick(delta) {
                binding.on_ability_applied(instance, None);
                expired += 1;
            }
        }
        expired
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Applied, available instances of `key`, optionally restricted to the
    /// `conditions` allow-list (empty = any condition).
    pub fn applied_instances(
        &self,
        key: &AbilityKey,
        conditions: &[ConditionKind],
    ) -> Vec<&AbilityInstance> {
        self.abilities
            .get(&key.ability_type)
            .into_iter()
            .flatten()
            .filter(|instance| {
                key.matches(instance)
                    && instance.is_applied()
                    && instance.is_available()
                    && allowed(conditions, instance.condition())
            })
            .collect()
    }

    /// Every applied instance across all types (empty `conditions` = any)
    pub fn all_applied(&self, conditions: &[ConditionKind]) -> Vec<&AbilityInstance> {
        self.instances()
            .filter(|instance| instance.is_applied() && allowed(conditions, instance.condition()))
            .collect()
    }

    /// `value` with every applied instance of `key` folded in.
    ///
    /// Attack damage types measure each instance against the original value
    /// and sum the deltas; every other type chains instance results.
    pub fn applied_value(
        &mut self,
        value: &Value,
        key: &AbilityKey,
        application: Application,
        conditions: &[ConditionKind],
    ) -> Value {
        let Some(group) = self.abilities.get_mut(&key.ability_type) else {
            return value.clone();
        };

        let from_origin = key.ability_type.applies_from_origin();
        let mut result = value.clone();
        for instance in group.iter_mut().filter(|instance| {
            key.matches(instance)
                && instance.is_applied()
                && instance.is_available()
                && allowed(conditions, instance.condition())
        }) {
            if from_origin {
                let applied = instance.compute_applied_value(value, None, 0, application);
                result = Value::Number(result.as_f32() + applied.as_f32() - value.as_f32());
            } else {
                result = instance.compute_applied_value(&result, None, 0, application);
            }
        }
        result
    }

    /// Whether any instance of `key` is applied. An [`Application::Active`]
    /// query spends one use of the first applied instance.
    pub fn is_applied(&mut self, key: &AbilityKey, application: Application) -> bool {
        let Some(group) = self.abilities.get_mut(&key.ability_type) else {
            return false;
        };
        let Some(instance) = group
            .iter_mut()
            .find(|instance| key.matches(instance) && instance.is_applied())
        else {
            return false;
        };

        if application == Application::Active {
            instance.consume_use();
        }
        true
    }

    /// Re-notify the owner for every applied instance of `key` with `payload`.
    ///
    /// Returns the number of notifications sent.
    pub fn apply_applied(&mut self, key: &AbilityKey, payload: Option<&ExternalPayload>) -> usize {
        let binding = &mut self.binding;
        let Some(group) = self.abilities.get_mut(&key.ability_type) else {
            return 0;
        };

        let mut notified = 0;
        for instance in group.iter_mut() {
            if key.matches(instance) && instance.is_applied() {
                binding.on_ability_applied(instance, payload);
                notified += 1;
            }
        }
        notified
    }
}

fn allowed(conditions: &[ConditionKind], condition: ConditionKind) -> bool {
    conditions.is_empty() || conditions.contains(&condition)
}
