//! Tagged runtime values
//!
//! Every value that flows through ability evaluation (stat inputs, slot
//! values, condition inputs) is one of these variants. Coercions never fail:
//! malformed numbers read as 0.

use std::fmt;

use super::EnumType;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    Text(String),
    Enum { ty: EnumType, bits: i64 },
    Sequence(Vec<Value>),
}

impl Value {
    pub fn enum_value(ty: EnumType, bits: i64) -> Self {
        Value::Enum { ty, bits }
    }

    /// Numeric read. Unparseable text and sequences read as 0.
    pub fn as_f32(&self) -> f32 {
        match self {
            Value::Number(v) => *v,
            Value::Text(s) => s.trim().parse::<f32>().unwrap_or(0.0),
            Value::Enum { bits, .. } => *bits as f32,
            Value::Sequence(_) => 0.0,
        }
    }

    /// Integer read, truncating fractions.
    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Number(v) => *v as i64,
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f32>().map(|v| v as i64))
                    .unwrap_or(0)
            }
            Value::Enum { bits, .. } => *bits,
            Value::Sequence(_) => 0,
        }
    }

    /// Bits of this value interpreted in table `ty`.
    ///
    /// Enum values yield their bits directly, numbers are taken as raw bits,
    /// and text is parsed by name. `None` when text cannot be parsed.
    pub fn enum_bits(&self, ty: EnumType) -> Option<i64> {
        match self {
            Value::Enum { bits, .. } => Some(*bits),
            Value::Number(v) => Some(*v as i64),
            Value::Text(s) => ty.parse(s, true),
            Value::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Enum { ty, bits } => f.write_str(&ty.format(*bits)),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f32)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercions_degrade_to_zero() {
        assert_eq!(Value::from("12.5").as_f32(), 12.5);
        assert_eq!(Value::from("twelve").as_f32(), 0.0);
        assert_eq!(Value::from("7.9").as_i64(), 7);
        assert_eq!(Value::Sequence(vec![Value::from(1.0)]).as_f32(), 0.0);
        assert_eq!(Value::enum_value(EnumType::UnitType, 4).as_f32(), 4.0);
    }

    #[test]
    fn enum_bits_by_name_or_number() {
        assert_eq!(Value::from("RANGED").enum_bits(EnumType::UnitType), Some(2));
        assert_eq!(Value::from(8.0).enum_bits(EnumType::UnitType), Some(8));
        assert_eq!(Value::from("RANGED").enum_bits(EnumType::Unknown), None);
    }

    #[test]
    fn display_renders_enum_names() {
        let v = Value::Sequence(vec![
            Value::from(1.5),
            Value::enum_value(EnumType::BattleTag, 2),
        ]);
        assert_eq!(v.to_string(), "[1.5, POISON]");
    }
}
