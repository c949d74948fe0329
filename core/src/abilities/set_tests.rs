//! Tests for AbilitySet evaluation, queries and owner notification
//!
//! Verifies that:
//! - Evaluations reach only matching instances and notify on real changes
//! - IN_HOME / IN_AWAY stay mutually exclusive
//! - Post-evaluation and ticks deactivate and notify
//! - Value queries chain or sum deltas per ability type
//! - Stat sheets see the folded values through unit and card bindings

use evo_types::{
    AbilityRecord, AbilityType, ChangeKind, ConditionKind, OwnerKind, RecordValue, ValueKind,
    ValueRecord,
};

use super::{
    AbilityInstance, AbilityKey, AbilitySet, Application, ConditionInputs, ExternalPayload,
    HostBinding, OwnerBinding, StatSheet,
};
use crate::definitions::AbilityDefinition;
use crate::values::Value;

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Records every notification as (meta_id, applied)
#[derive(Debug, Default)]
struct Recorder {
    events: Vec<(i32, bool)>,
    with_payload: usize,
}

impl OwnerBinding for Recorder {
    fn on_ability_applied(
        &mut self,
        instance: &mut AbilityInstance,
        payload: Option<&ExternalPayload>,
    ) {
        let event = (instance.meta_id(), instance.is_applied());
        self.events.push(event);
        if payload.is_some() {
            self.with_payload += 1;
        }
    }
}

fn make_record(
    meta_id: i32,
    ability_type: &str,
    condition: ConditionKind,
    value_type: ValueKind,
    value: f32,
) -> AbilityRecord {
    AbilityRecord {
        meta_id,
        owner_meta_id: 10,
        owner_kind: OwnerKind::Unit,
        ability_type: AbilityType::from(ability_type),
        ability_sub_type: String::new(),
        condition,
        condition_value_type: String::new(),
        condition_value: None,
        change_type: ChangeKind::Increase,
        value_type,
        external_apply_type: None,
        external_change_type: ChangeKind::Increase,
        external_value_type: ValueKind::NONE,
        apply_meta_id: 0,
        count: 0,
        duration: 0.0,
        cool_time: 0.0,
        values: vec![ValueRecord {
            value: RecordValue::Float(value as f64),
            ..ValueRecord::default()
        }],
    }
}

fn make_ability(
    meta_id: i32,
    ability_type: &str,
    condition: ConditionKind,
    value_type: ValueKind,
    value: f32,
) -> AbilityDefinition {
    let record = make_record(meta_id, ability_type, condition, value_type, value);
    AbilityDefinition::from_record(&record, true)
}

fn make_set(definitions: &[AbilityDefinition]) -> AbilitySet<Recorder> {
    AbilitySet::new(10, definitions, Recorder::default())
}

fn activate(set: &mut AbilitySet<impl OwnerBinding>, condition: ConditionKind) -> usize {
    set.evaluate(condition, true, false, &ConditionInputs::none(), None)
}

fn is_applied(set: &AbilitySet<Recorder>, meta_id: i32) -> bool {
    set.instance(meta_id)
        .is_some_and(AbilityInstance::is_applied)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ═══════════════════════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn evaluate_notifies_only_on_change() {
    let atk = make_ability(1, "ATK", ConditionKind::Always, ValueKind::ABS, 5.0);
    let mut set = make_set(&[atk]);

    assert_eq!(activate(&mut set, ConditionKind::Always), 1);
    assert_eq!(activate(&mut set, ConditionKind::Always), 0);
    assert_eq!(set.binding().events, vec![(1, true)]);
}

#[test]
fn evaluate_skips_other_conditions() {
    let mut set = make_set(&[
        make_ability(1, "ATK", ConditionKind::Always, ValueKind::ABS, 5.0),
        make_ability(2, "ATK", ConditionKind::Spawn, ValueKind::ABS, 5.0),
    ]);

    activate(&mut set, ConditionKind::Spawn);
    assert!(!is_applied(&set, 1));
    assert!(is_applied(&set, 2));

    assert_eq!(activate(&mut set, ConditionKind::All), 1);
    assert!(is_applied(&set, 1));
}

#[test]
fn iteration_follows_type_groups_in_insertion_order() {
    let defs = [
        make_ability(1, "ATK", ConditionKind::Always, ValueKind::ABS, 1.0),
        make_ability(2, "DEF", ConditionKind::Always, ValueKind::ABS, 1.0),
        make_ability(3, "ATK", ConditionKind::Always, ValueKind::ABS, 1.0),
    ];

    let mut first = make_set(&defs);
    let mut second = make_set(&defs);
    activate(&mut first, ConditionKind::Always);
    activate(&mut second, ConditionKind::Always);

    let expected = vec![(1, true), (3, true), (2, true)];
    assert_eq!(first.binding().events, expected);
    assert_eq!(first.binding().events, second.binding().events);
    let ids: Vec<i32> = first.definitions().iter().map(|d| d.meta_id).collect();
    assert_eq!(ids, vec![1, 3, 2]);
}

#[test]
fn deactivation_starts_cooldown_when_requested() {
    let mut def = make_ability(1, "ATK", ConditionKind::Always, ValueKind::ABS, 5.0);
    def.cool_time = 2.0;
    let mut set = make_set(&[def]);

    activate(&mut set, ConditionKind::Always);
    let none = ConditionInputs::none();
    let notified = set.evaluate(ConditionKind::Always, false, true, &none, None);
    assert_eq!(notified, 1);
    assert!(set.instance(1).is_some_and(AbilityInstance::is_cooling));

    assert_eq!(activate(&mut set, ConditionKind::Always), 0);
    set.tick(2.0);
    assert_eq!(activate(&mut set, ConditionKind::Always), 1);
}

#[test]
fn zone_conditions_are_mutually_exclusive() {
    let mut set = make_set(&[
        make_ability(1, "ATK", ConditionKind::InHome, ValueKind::ABS, 3.0),
        make_ability(2, "ATK", ConditionKind::InAway, ValueKind::ABS, 4.0),
    ]);

    assert_eq!(activate(&mut set, ConditionKind::InAway), 1);
    assert!(is_applied(&set, 2));

    assert_eq!(activate(&mut set, ConditionKind::InHome), 2);
    assert!(is_applied(&set, 1));
    assert!(!is_applied(&set, 2));

    activate(&mut set, ConditionKind::InAway);
    assert!(!is_applied(&set, 1));
    assert!(is_applied(&set, 2));

    assert_eq!(
        set.binding().events,
        vec![(2, true), (1, true), (2, false), (2, true), (1, false)]
    );
}

#[test]
fn momentary_conditions_resettle_on_each_event() {
    let atk = make_ability(1, "ATK", ConditionKind::Attack, ValueKind::ABS, 2.0);
    let mut set = make_set(&[atk]);
    let opponent = ConditionInputs::opponent(1, 0);

    let attack = ConditionKind::Attack;
    assert_eq!(set.evaluate(attack, true, false, &opponent, None), 1);
    // settled, then activated again
    assert_eq!(set.evaluate(attack, true, false, &opponent, None), 2);
    assert_eq!(set.binding().events, vec![(1, true), (1, false), (1, true)]);
}

#[test]
fn hp_condition_gates_activation() {
    let mut record = make_record(1, "DEF", ConditionKind::HpLessThan, ValueKind::ABS, 10.0);
    record.condition_value_type = "RATIO".to_string();
    record.condition_value = Some(RecordValue::Float(0.5));
    let mut set = make_set(&[AbilityDefinition::from_record(&record, true)]);

    let hp = |current| ConditionInputs::hp(current, 100);
    let low_hp = ConditionKind::HpLessThan;
    assert_eq!(set.evaluate(low_hp, true, false, &hp(60), None), 0);
    assert_eq!(set.evaluate(low_hp, true, false, &hp(50), None), 1);
}

#[test]
fn post_evaluate_clears_event_conditions_only() {
    let mut set = make_set(&[
        make_ability(1, "ATK", ConditionKind::Attack, ValueKind::ABS, 2.0),
        make_ability(2, "ATK", ConditionKind::Always, ValueKind::ABS, 2.0),
    ]);
    activate(&mut set, ConditionKind::All);

    assert_eq!(set.post_evaluate(ConditionKind::Always), 0);
    assert_eq!(set.post_evaluate(ConditionKind::Attack), 1);
    assert!(!is_applied(&set, 1));
    assert!(is_applied(&set, 2));
    assert_eq!(set.post_evaluate(ConditionKind::Attack), 0);
}

#[test]
fn tick_notifies_on_expiry() {
    let mut def = make_ability(1, "ATK", ConditionKind::Attack, ValueKind::ABS, 2.0);
    def.duration = 2.0;
    let mut set = make_set(&[def]);
    activate(&mut set, ConditionKind::Attack);

    // mid-duration instances survive post evaluation
    assert_eq!(set.post_evaluate(ConditionKind::Attack), 0);

    assert_eq!(set.tick(1.0), 0);
    assert_eq!(set.tick(1.0), 1);
    assert_eq!(set.tick(1.0), 0);
    assert_eq!(set.binding().events, vec![(1, true), (1, false)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn attack_damage_sums_deltas_from_origin() {
    let mut set = make_set(&[
        make_ability(1, "ATK_DMG", ConditionKind::Always, ValueKind::RATIO, 10.0),
        make_ability(2, "ATK_DMG", ConditionKind::Always, ValueKind::RATIO, 20.0),
    ]);
    activate(&mut set, ConditionKind::Always);

    let value = set.applied_value(
        &Value::Number(100.0),
        &AbilityKey::new(AbilityType::ATK_DMG),
        Application::Passive,
        &[],
    );
    assert!(close(value.as_f32(), 130.0));
}

#[test]
fn other_types_chain() {
    let mut set = make_set(&[
        make_ability(1, "ATK", ConditionKind::Always, ValueKind::RATIO, 10.0),
        make_ability(2, "ATK", ConditionKind::Always, ValueKind::RATIO, 20.0),
    ]);
    activate(&mut set, ConditionKind::Always);

    let key = AbilityKey::new("ATK");
    let value = set.applied_value(&Value::Number(100.0), &key, Application::Passive, &[]);
    assert!(close(value.as_f32(), 132.0));

    let base = Value::Number(100.0);
    let home_only = [ConditionKind::InHome];
    let filtered = set.applied_value(&base, &key, Application::Passive, &home_only);
    assert_eq!(filtered, Value::Number(100.0));

    let hp = AbilityKey::new("HP");
    let missing = set.applied_value(&base, &hp, Application::Passive, &[]);
    assert_eq!(missing, Value::Number(100.0));
}

#[test]
fn sub_type_narrows_queries() {
    let mut fire = make_record(1, "ELEMENT_DMG", ConditionKind::Always, ValueKind::ABS, 5.0);
    fire.ability_sub_type = "FIRE".to_string();
    let mut ice = make_record(2, "ELEMENT_DMG", ConditionKind::Always, ValueKind::ABS, 7.0);
    ice.ability_sub_type = "ICE".to_string();
    let mut set = make_set(&[
        AbilityDefinition::from_record(&fire, true),
        AbilityDefinition::from_record(&ice, true),
    ]);
    activate(&mut set, ConditionKind::Always);

    let any = AbilityKey::new("ELEMENT_DMG");
    assert_eq!(set.applied_instances(&any, &[]).len(), 2);

    let fire_only = AbilityKey::new("ELEMENT_DMG").with_sub_type("FIRE");
    let ids: Vec<i32> = set
        .applied_instances(&fire_only, &[])
        .iter()
        .map(|i| i.meta_id())
        .collect();
    assert_eq!(ids, vec![1]);
    let fire_value = set.applied_value(&Value::Number(0.0), &fire_only, Application::Passive, &[]);
    assert_eq!(fire_value, Value::Number(5.0));

    assert_eq!(set.all_applied(&[]).len(), 2);
    assert!(set.all_applied(&[ConditionKind::Spawn]).is_empty());
}

#[test]
fn active_is_applied_query_spends_a_use() {
    let mut def = make_ability(1, "SHIELD", ConditionKind::Always, ValueKind::ABS, 1.0);
    def.count = 2;
    let mut set = make_set(&[def]);
    let key = AbilityKey::new("SHIELD");

    assert!(!set.is_applied(&key, Application::Active));
    activate(&mut set, ConditionKind::Always);

    assert!(set.is_applied(&key, Application::Passive));
    let remaining = set.instance(1).map(AbilityInstance::remaining_count);
    assert_eq!(remaining, Some(2));

    assert!(set.is_applied(&key, Application::Active));
    assert!(set.is_applied(&key, Application::Active));
    assert!(!set.is_applied(&key, Application::Active));
    assert!(set.applied_instances(&key, &[]).is_empty());
}

#[test]
fn apply_applied_forwards_payload() {
    let mut set = make_set(&[
        make_ability(1, "ATK", ConditionKind::Always, ValueKind::ABS, 1.0),
        make_ability(2, "ATK", ConditionKind::Spawn, ValueKind::ABS, 1.0),
    ]);
    activate(&mut set, ConditionKind::Always);

    let payload = ExternalPayload::new().with("DMG", 12.0);
    let (atk, def) = (AbilityKey::new("ATK"), AbilityKey::new("DEF"));
    assert_eq!(set.apply_applied(&atk, Some(&payload)), 1);
    assert_eq!(set.binding().with_payload, 1);
    assert_eq!(set.apply_applied(&def, Some(&payload)), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Stat Sheets
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn unit_stat_sheet_follows_zone_changes() {
    let defs = [
        make_ability(1, "ATK", ConditionKind::Always, ValueKind::ABS, 5.0),
        make_ability(2, "ATK", ConditionKind::InHome, ValueKind::ABS, 3.0),
        make_ability(3, "DEF", ConditionKind::InAway, ValueKind::RATIO, 50.0),
    ];
    let sheet = StatSheet::new(OwnerKind::Unit, 10)
        .with_stat("ATK", 10)
        .with_stat("DEF", 20);
    let mut set = AbilitySet::new(10, &defs, HostBinding::new(OwnerKind::Unit, sheet));

    activate(&mut set, ConditionKind::Always);
    assert_eq!(set.binding().host().stat_f32("ATK"), 15.0);

    activate(&mut set, ConditionKind::InHome);
    assert_eq!(set.binding().host().stat_f32("ATK"), 18.0);

    activate(&mut set, ConditionKind::InAway);
    assert_eq!(set.binding().host().stat_f32("ATK"), 15.0);
    assert_eq!(set.binding().host().stat_f32("DEF"), 30.0);
    assert_eq!(set.binding().host().applications(), 4);
}

#[test]
fn card_stat_sheet_applies_decrease() {
    let mut record = make_record(1, "COST", ConditionKind::Always, ValueKind::ABS, 1.0);
    record.owner_kind = OwnerKind::ActionCard;
    record.change_type = ChangeKind::Decrease;
    let defs = [AbilityDefinition::from_record(&record, true)];

    let sheet = StatSheet::new(OwnerKind::ActionCard, 20).with_stat("COST", 3);
    let mut set = AbilitySet::new(20, &defs, HostBinding::new(OwnerKind::ActionCard, sheet));
    assert_eq!(set.binding().kind(), OwnerKind::ActionCard);

    activate(&mut set, ConditionKind::Always);
    assert_eq!(set.binding().host().stat_f32("COST"), 2.0);

    let none = ConditionInputs::none();
    set.evaluate(ConditionKind::Always, false, false, &none, None);
    assert_eq!(set.binding().host().stat_f32("COST"), 3.0);
}
