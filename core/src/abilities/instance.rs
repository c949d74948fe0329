//! Live ability instances (runtime state)
//!
//! An `AbilityInstance` is one owner's copy of an [`AbilityDefinition`] plus
//! the mutable state that definition drives: whether it is applied, how many
//! times it stacked, and the remaining uses, duration and cooldown.
//!
//! # Lifecycle
//!
//! 1. Owner spawns → one instance per definition, inactive
//! 2. A matching condition arrives → `try_activate` (if `can_satisfy`)
//! 3. The owner applies the value; each externally observed application
//!    consumes one use
//! 4. Duration expiry, use exhaustion, settling or an explicit
//!    `try_deactivate` → inactive, optionally cooling down

use evo_types::{AbilityType, ChangeKind, ConditionKind, SlotKind, ValueKind};

use super::{ConditionInputs, ExternalPayload};
use crate::definitions::AbilityDefinition;
use crate::values::{Value, math, set_flag, unset_flag};

/// Timer residue below which a duration or cooldown counts as elapsed.
const TIMER_EPSILON: f32 = 1e-4;

/// Subtract `delta` from a running timer, snapping float residue to zero.
fn count_down(remaining: f32, delta: f32) -> f32 {
    let left = remaining - delta;
    if left <= TIMER_EPSILON { 0.0 } else { left }
}

/// Outcome of an activation or deactivation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed; the owner must re-apply the value
    Changed,
    /// Request succeeded without a state change
    Unchanged,
    /// Request refused (invalid, cooling down, exhausted)
    Rejected,
}

impl Transition {
    pub fn succeeded(self) -> bool {
        self != Transition::Rejected
    }

    pub fn changed(self) -> bool {
        self == Transition::Changed
    }
}

/// Whether a computation counts as an observed application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    /// Consumes one use of a count-limited ability
    Active,
    /// Read-only preview
    Passive,
}

/// An ability instance owned by a unit or action card
#[derive(Debug, Clone)]
pub struct AbilityInstance {
    definition: AbilityDefinition,

    // ─── State ──────────────────────────────────────────────────────────────
    is_applied: bool,

    /// Stacks for ACCUMULATE / COMPOUND_INTEREST abilities
    applied_count: u32,

    // ─── Timing ─────────────────────────────────────────────────────────────
    remaining_count: u32,
    remaining_duration: f32,
    remaining_cool_time: f32,
}

impl AbilityInstance {
    /// Create an inactive instance from its own copy of `definition`.
    pub fn new(definition: &AbilityDefinition) -> Self {
        Self::from_definition(definition.clone())
    }

    pub fn from_definition(definition: AbilityDefinition) -> Self {
        let remaining_count = definition.count;
        Self {
            definition,
            is_applied: false,
            applied_count: 0,
            remaining_count,
            remaining_duration: 0.0,
            remaining_cool_time: 0.0,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn definition(&self) -> &AbilityDefinition {
        &self.definition
    }

    pub fn meta_id(&self) -> i32 {
        self.definition.meta_id
    }

    pub fn ability_type(&self) -> &AbilityType {
        &self.definition.ability_type
    }

    pub fn sub_type(&self) -> &str {
        &self.definition.ability_sub_type
    }

    pub fn condition(&self) -> ConditionKind {
        self.definition.condition
    }

    pub fn is_applied(&self) -> bool {
        self.is_applied
    }

    pub fn applied_count(&self) -> u32 {
        self.applied_count
    }

    pub fn remaining_count(&self) -> u32 {
        self.remaining_count
    }

    pub fn remaining_duration(&self) -> f32 {
        self.remaining_duration
    }

    pub fn remaining_cool_time(&self) -> f32 {
        self.remaining_cool_time
    }

    pub fn is_valid(&self) -> bool {
        self.definition.is_valid()
    }

    pub fn is_cooling(&self) -> bool {
        self.remaining_cool_time > 0.0
    }

    /// Inside a timed activation window
    pub fn is_mid_duration(&self) -> bool {
        self.remaining_duration > 0.0
    }

    /// Count-limited and out of uses
    pub fn is_exhausted(&self) -> bool {
        self.definition.count > 0 && self.remaining_count == 0
    }

    /// Valid, not cooling down, and not out of uses.
    pub fn is_available(&self) -> bool {
        self.is_valid() && !self.is_cooling() && !self.is_exhausted()
    }

    // ─── State Machine ──────────────────────────────────────────────────────

    /// Whether `inputs` would allow this instance to activate right now.
    pub fn can_satisfy(&self, inputs: &ConditionInputs) -> bool {
        self.is_available()
            && self.definition.condition_target.is_satisfied(
                self.definition.condition,
                inputs,
                self.definition.values.first(),
            )
    }

    /// Activate. Stacking abilities gain a stack even when already applied.
    pub fn try_activate(&mut self) -> Transition {
        if !self.is_valid() {
            return Transition::Rejected;
        }

        let stacks = self.definition.value_type.stacks();
        if self.is_applied && !stacks {
            return Transition::Unchanged;
        }
        if !self.is_applied && (self.is_cooling() || self.is_exhausted()) {
            return Transition::Rejected;
        }

        self.is_applied = true;
        if stacks {
            self.applied_count += 1;
        }
        self.remaining_cool_time = 0.0;
        if self.definition.duration > 0.0 {
            self.remaining_duration = self.definition.duration;
        }

        tracing::debug!(
            meta_id = self.meta_id(),
            condition = %self.condition(),
            applied_count = self.applied_count,
            "Ability activated"
        );
        Transition::Changed
    }

    /// Deactivate, optionally starting the cooldown.
    ///
    /// Non-accumulating abilities drop their stacks; the duration window ends.
    pub fn try_deactivate(&mut self, start_cooldown: bool) -> Transition {
        if !self.is_valid() {
            return Transition::Rejected;
        }
        if !self.is_applied {
            return Transition::Unchanged;
        }

        self.is_applied = false;
        if !self.definition.value_type.contains(ValueKind::ACCUMULATE) {
            self.applied_count = 0;
        }
        self.remaining_duration = 0.0;
        if start_cooldown && self.definition.cool_time > 0.0 {
            self.remaining_cool_time = self.definition.cool_time;
        }

        tracing::debug!(
            meta_id = self.meta_id(),
            condition = %self.condition(),
            cooling = self.is_cooling(),
            "Ability deactivated"
        );
        Transition::Changed
    }

    /// Advance timers by `delta` seconds.
    ///
    /// Returns true on the tick the duration runs out (the instance is
    /// deactivated with cooldown at that point).
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.remaining_cool_time > 0.0 {
            self.remaining_cool_time = count_down(self.remaining_cool_time, delta);
        }

        if self.remaining_duration > 0.0 {
            self.remaining_duration = count_down(self.remaining_duration, delta);
            if self.remaining_duration == 0.0 {
                if self.is_applied {
                    self.try_deactivate(true);
                }
                return true;
            }
        }
        false
    }

    /// Spend one use of a count-limited ability.
    ///
    /// The last use deactivates (with cooldown) unless a duration window is
    /// still open. Returns true if a use was spent.
    pub fn consume_use(&mut self) -> bool {
        if !self.is_applied || self.remaining_count == 0 {
            return false;
        }

        self.remaining_count -= 1;
        if self.remaining_count == 0 && !self.is_mid_duration() {
            self.try_deactivate(true);
        }
        true
    }

    /// Applied state survives settling (metadata overlays when `check_type`,
    /// and the lifetime/zone conditions).
    pub fn maintains_state(&self, check_type: bool) -> bool {
        (check_type && self.definition.ability_type.is_metadata_overlay())
            || self.definition.condition.is_persistent()
    }

    /// Clear a momentary activation once its triggering event has been handled.
    ///
    /// Returns true if the instance was deactivated (no cooldown).
    pub fn settle(&mut self, check_type: bool) -> bool {
        if self.is_applied && !self.is_mid_duration() && !self.maintains_state(check_type) {
            return self.try_deactivate(false).changed();
        }
        false
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Value Computation
    // ═══════════════════════════════════════════════════════════════════════

    /// Compute the value `input` takes under this ability and, for
    /// [`Application::Active`], spend one use.
    ///
    /// A sequence input is transformed element-wise against the value slots;
    /// anything else is transformed by slot `slot`. Consumption happens once
    /// per call.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range for a scalar input.
    pub fn compute_applied_value(
        &mut self,
        input: &Value,
        payload: Option<&ExternalPayload>,
        slot: usize,
        application: Application,
    ) -> Value {
        let result = self.computed_value(input, payload, slot);

        if application == Application::Active {
            tracing::trace!(
                meta_id = self.meta_id(),
                applied = self.is_applied,
                %input,
                %result,
                "Ability value applied"
            );
            self.consume_use();
        }
        result
    }

    /// Read-only form of [`compute_applied_value`](Self::compute_applied_value).
    pub fn computed_value(
        &self,
        input: &Value,
        payload: Option<&ExternalPayload>,
        slot: usize,
    ) -> Value {
        match input {
            Value::Sequence(items) => Value::Sequence(self.apply_sequence(items, payload)),
            _ => self.apply_slot(input, payload, slot),
        }
    }

    pub fn compute_f32(
        &mut self,
        input: f32,
        payload: Option<&ExternalPayload>,
        slot: usize,
        application: Application,
    ) -> f32 {
        self.compute_applied_value(&Value::Number(input), payload, slot, application)
            .as_f32()
    }

    /// Integer form; the result is rounded half to even.
    pub fn compute_i32(
        &mut self,
        input: i32,
        payload: Option<&ExternalPayload>,
        slot: usize,
        application: Application,
    ) -> i32 {
        self.compute_f32(input as f32, payload, slot, application)
            .round_ties_even() as i32
    }

    pub fn compute_text(
        &mut self,
        input: &str,
        payload: Option<&ExternalPayload>,
        slot: usize,
        application: Application,
    ) -> String {
        self.compute_applied_value(&Value::from(input), payload, slot, application)
            .to_string()
    }

    /// Passive value used as an ability's own base. NONE-typed abilities start
    /// from 0 when `none_type_replaces` is set.
    pub fn base_value(&self, value: f32, none_type_replaces: bool) -> f32 {
        let input = if none_type_replaces && self.definition.value_type.is_none() {
            0.0
        } else {
            value
        };
        self.computed_value(&Value::Number(input), None, 0).as_f32()
    }

    /// Re-base `value` on an accumulated total for INCREASE/DECREASE numeric
    /// slots: `accumulated + value - default`.
    ///
    /// Sequences fold element-wise; other slots pass through.
    pub fn fold_accumulated(
        &self,
        value: &Value,
        default: Option<&Value>,
        accumulated: Option<&Value>,
        slot: usize,
    ) -> Value {
        if let Value::Sequence(items) = value {
            fn element(source: Option<&Value>, i: usize) -> Option<&Value> {
                source.and_then(Value::as_sequence).and_then(|s| s.get(i))
            }

            return Value::Sequence(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.fold_accumulated(item, element(default, i), element(accumulated, i), i)
                    })
                    .collect(),
            );
        }

        let change = self.definition.change_type_at(slot);
        if matches!(change, ChangeKind::Increase | ChangeKind::Decrease)
            && self.definition.is_numeric_slot(slot)
        {
            let accumulated = accumulated.map_or(0.0, Value::as_f32);
            let default = default.map_or(0.0, Value::as_f32);
            if accumulated != default {
                return Value::Number(accumulated + value.as_f32() - default);
            }
        }
        value.clone()
    }

    // ─── Slot transforms ────────────────────────────────────────────────────

    fn apply_slot(&self, input: &Value, payload: Option<&ExternalPayload>, slot: usize) -> Value {
        let Some(def_slot) = self.definition.values.get(slot) else {
            panic!(
                "value slot {slot} out of range for ability {} ({} slots)",
                self.meta_id(),
                self.definition.values.len()
            );
        };

        match def_slot.kind {
            SlotKind::Number => Value::Number(self.apply_number(input.as_f32(), payload, slot)),
            SlotKind::Enum => self.apply_enum(input, slot),
            SlotKind::Text | SlotKind::Sequence => {
                if self.is_applied {
                    def_slot.value.clone()
                } else {
                    input.clone()
                }
            }
        }
    }

    fn apply_number(&self, value: f32, payload: Option<&ExternalPayload>, slot: usize) -> f32 {
        let def = &self.definition;
        let base = if def.change_type_at(slot) == ChangeKind::Change {
            0.0
        } else {
            value
        };

        let configured = def.converted_value(slot).map_or(0.0, Value::as_f32);
        let mut magnitude = if self.is_applied {
            configured
        } else {
            -configured
        };

        let external = def
            .external_apply_type
            .as_deref()
            .zip(payload)
            .and_then(|(key, payload)| payload.get(key));
        if let Some(external) = external {
            let external = if def.external_change_type_at(slot) == ChangeKind::Decrease {
                -external
            } else {
                external
            };
            magnitude = math::combine(
                external,
                0.0,
                magnitude,
                def.external_value_type,
                1,
                def.change_type,
                self.is_applied,
            );
        }

        math::combine(
            value,
            base,
            magnitude,
            def.value_type,
            self.applied_count,
            def.change_type,
            self.is_applied,
        )
    }

    fn apply_enum(&self, input: &Value, slot: usize) -> Value {
        if !self.is_applied {
            return input.clone();
        }
        let Some(def_slot) = self.definition.values.get(slot) else {
            return input.clone();
        };
        let ty = def_slot.enum_type;
        if !ty.is_known() {
            return input.clone();
        }

        let (Some(configured), Some(current)) = (def_slot.value.enum_bits(ty), input.enum_bits(ty))
        else {
            return input.clone();
        };

        let bits = match self.definition.change_type_at(slot) {
            ChangeKind::Increase | ChangeKind::Enable => set_flag(current, configured),
            ChangeKind::Decrease | ChangeKind::Disable => unset_flag(current, configured),
            ChangeKind::Change => configured,
        };
        Value::enum_value(ty, bits)
    }

    fn apply_sequence(&self, items: &[Value], payload: Option<&ExternalPayload>) -> Vec<Value> {
        let slots = &self.definition.values;
        let inputs = items.len();
        let configured = slots.len();

        let length = match self.definition.change_type_at(0) {
            ChangeKind::Enable => inputs + configured,
            ChangeKind::Change => configured,
            _ => inputs.max(configured),
        };

        let slot_value = |i: usize| slots.get(i).map(|s| s.value.clone()).unwrap_or_default();

        (0..length)
            .map(|i| match self.definition.change_type_at(i) {
                ChangeKind::Enable => match items.get(i) {
                    Some(item) => item.clone(),
                    None => slot_value(i - inputs),
                },
                ChangeKind::Change => match slots.get(i) {
                    Some(slot) => slot.value.clone(),
                    None => items.get(i).cloned().unwrap_or_default(),
                },
                _ => match items.get(i) {
                    Some(item) if i < configured => self.apply_slot(item, payload, i),
                    Some(item) => item.clone(),
                    None => slot_value(i),
                },
            })
            .collect()
    }
}
