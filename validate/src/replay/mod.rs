//! Replay engine for scenario validation
//!
//! Provides the virtual clock that turns step timestamps into ticks and the
//! recording binding that reports ability transitions.

pub mod clock;
pub mod recorder;

pub use clock::{VirtualClock, format_secs};
pub use recorder::{AbilityEvent, ReplayBinding};
