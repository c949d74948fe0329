//! Stat sheet host
//!
//! A minimal owner that keeps base stats keyed by ability type and the value
//! each applied ability produces from that base. Numeric stats sum the
//! per-ability deltas; other stats take the latest applied value.

use indexmap::IndexMap;

use evo_types::{AbilityType, OwnerKind};

use super::{AbilityInstance, Application, CardHost, ExternalPayload, UnitHost};
use crate::values::Value;

#[derive(Debug, Clone, Default)]
pub struct StatSheet {
    owner_kind: OwnerKind,
    owner_meta_id: i32,
    base: IndexMap<AbilityType, Value>,
    /// Applied value per ability meta ID, in application order
    applied: IndexMap<AbilityType, IndexMap<i32, Value>>,
    applications: u32,
}

impl StatSheet {
    pub fn new(owner_kind: OwnerKind, owner_meta_id: i32) -> Self {
        Self {
            owner_kind,
            owner_meta_id,
            ..Self::default()
        }
    }

    pub fn with_stat(mut self, stat: impl Into<AbilityType>, value: impl Into<Value>) -> Self {
        self.set_base(stat, value);
        self
    }

    pub fn owner_kind(&self) -> OwnerKind {
        self.owner_kind
    }

    pub fn owner_meta_id(&self) -> i32 {
        self.owner_meta_id
    }

    pub fn set_base(&mut self, stat: impl Into<AbilityType>, value: impl Into<Value>) {
        self.base.insert(stat.into(), value.into());
    }

    pub fn base(&self, stat: &str) -> Option<&Value> {
        self.base.get(&AbilityType::from(stat))
    }

    /// Current value of `stat` with every applied ability folded in
    pub fn get(&self, stat: &str) -> Value {
        let key = AbilityType::from(stat);
        let base = self.base.get(&key).cloned().unwrap_or_default();
        let Some(applied) = self.applied.get(&key) else {
            return base;
        };

        let mut current = base.clone();
        for value in applied.values() {
            current = match (&current, &base, value) {
                (Value::Number(c), Value::Number(b), Value::Number(v)) => Value::Number(c + v - b),
                _ => value.clone(),
            };
        }
        current
    }

    pub fn stat_f32(&self, stat: &str) -> f32 {
        self.get(stat).as_f32()
    }

    /// Every stat with a base value or an applied ability, with its current value
    pub fn stats(&self) -> Vec<(AbilityType, Value)> {
        let mut names: Vec<&AbilityType> = self.base.keys().collect();
        for name in self.applied.keys() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
            .into_iter()
            .map(|name| (name.clone(), self.get(name.as_str())))
            .collect()
    }

    /// Number of ability notifications received
    pub fn applications(&self) -> u32 {
        self.applications
    }

    fn apply(&mut self, instance: &mut AbilityInstance, payload: Option<&ExternalPayload>) {
        self.applications += 1;
        let key = instance.ability_type().clone();
        let meta_id = instance.meta_id();

        if instance.is_applied() {
            let base = self.base.get(&key).cloned().unwrap_or_default();
            let value = instance.compute_applied_value(&base, payload, 0, Application::Active);
            tracing::debug!(
                owner = self.owner_meta_id,
                stat = %key,
                meta_id,
                %base,
                %value,
                "Stat modified"
            );
            self.applied.entry(key).or_default().insert(meta_id, value);
        } else if let Some(applied) = self.applied.get_mut(&key)
            && applied.shift_remove(&meta_id).is_some()
        {
            tracing::debug!(
                owner = self.owner_meta_id,
                stat = %key,
                meta_id,
                "Stat modifier removed"
            );
        }
    }
}

impl UnitHost for StatSheet {
    fn unit_meta_id(&self) -> i32 {
        self.owner_meta_id
    }

    fn apply_unit_ability(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        self.apply(instance, payload);
    }
}

impl CardHost for StatSheet {
    fn card_meta_id(&self) -> i32 {
        self.owner_meta_id
    }

    fn apply_card_ability(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        self.apply(instance, payload);
    }
}
