//! Value combination arithmetic

use evo_types::{ChangeKind, ValueKind};

/// `ratio` of `value` (0.1 = ten percent).
pub fn percent_of(value: f32, ratio: f32) -> f32 {
    value * ratio
}

/// Interest gained by `principal` after `periods` compounding periods at `rate`.
pub fn compound_interest(principal: f32, rate: f32, periods: u32) -> f32 {
    principal * ((1.0 + rate).powi(periods as i32) - 1.0)
}

/// Fold `magnitude` into `base` according to `kind`.
///
/// `value` is the untouched input the ratio policies measure against;
/// `base` is where the result starts (0 for CHANGE slots). NONE-typed
/// magnitudes only apply while `applied`, dispatching on `change`.
pub fn combine(
    value: f32,
    base: f32,
    magnitude: f32,
    kind: ValueKind,
    count: u32,
    change: ChangeKind,
    applied: bool,
) -> f32 {
    let mut result = base;
    let count_f = count as f32;

    if kind.contains(ValueKind::RATIO) {
        if value == 0.0 {
            // no base to take a percentage of
            result += magnitude;
        } else if kind.contains(ValueKind::COMPOUND_INTEREST) {
            result += compound_interest(value, magnitude / 100.0, count);
        } else if kind.contains(ValueKind::ACCUMULATE) {
            result += percent_of(value, magnitude / 100.0 * count_f);
        } else {
            result += percent_of(value, magnitude / 100.0);
        }
    } else if kind.contains(ValueKind::ABS) {
        if kind.contains(ValueKind::ACCUMULATE) {
            result += magnitude * count_f;
        } else if kind.contains(ValueKind::MULTIPLY) {
            result += value * magnitude * count_f;
        } else {
            result += magnitude;
        }
    } else if applied && (value == 0.0 || kind.is_none()) {
        match change {
            ChangeKind::Increase => result = value + magnitude,
            ChangeKind::Decrease => result = value - magnitude,
            ChangeKind::Enable => {
                if base != 0.0 {
                    result = base;
                }
            }
            ChangeKind::Change => result = magnitude,
            ChangeKind::Disable => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    /// Applied increase on an untouched value
    fn increase(value: f32, by: f32, kind: ValueKind, count: u32) -> f32 {
        combine(value, value, by, kind, count, ChangeKind::Increase, true)
    }

    #[test]
    fn ratio_without_base_is_absolute() {
        assert_eq!(increase(0.0, 15.0, ValueKind::RATIO, 1), 15.0);
    }

    #[test]
    fn plain_ratio() {
        assert!(close(increase(200.0, 10.0, ValueKind::RATIO, 1), 220.0));
    }

    #[test]
    fn ratio_accumulate_scales_with_count() {
        let kind = ValueKind::RATIO | ValueKind::ACCUMULATE;
        assert!(close(increase(100.0, 10.0, kind, 3), 130.0));
    }

    #[test]
    fn ratio_compound_interest() {
        let kind = ValueKind::RATIO | ValueKind::COMPOUND_INTEREST;
        assert!(close(increase(100.0, 10.0, kind, 2), 121.0));
    }

    #[test]
    fn abs_variants() {
        assert_eq!(increase(10.0, 5.0, ValueKind::ABS, 1), 15.0);
        let acc = ValueKind::ABS | ValueKind::ACCUMULATE;
        assert_eq!(increase(10.0, 5.0, acc, 3), 25.0);
        let mul = ValueKind::ABS | ValueKind::MULTIPLY;
        assert_eq!(increase(10.0, 2.0, mul, 1), 30.0);
    }

    #[test]
    fn none_dispatches_on_change_kind() {
        let none = |base, magnitude, change, applied| {
            combine(4.0, base, magnitude, ValueKind::NONE, 0, change, applied)
        };
        assert_eq!(none(4.0, 3.0, ChangeKind::Increase, true), 7.0);
        assert_eq!(none(4.0, 3.0, ChangeKind::Decrease, true), 1.0);
        assert_eq!(none(0.0, 3.0, ChangeKind::Change, true), 3.0);
        assert_eq!(none(4.0, 3.0, ChangeKind::Enable, true), 4.0);
        // inactive NONE leaves the base alone
        assert_eq!(none(4.0, -3.0, ChangeKind::Increase, false), 4.0);
    }
}
