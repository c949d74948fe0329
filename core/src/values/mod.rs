//! Value model: tagged values, enum flag tables, combination math

mod flags;
pub mod math;
mod value;

pub use flags::{EnumType, has_flag, set_flag, unset_flag};
pub use value::Value;
