//! Virtual clock for replay timing simulation
//!
//! Supports multiple replay modes:
//! - Instant (0x): Steps run back to back, time only exists as tick deltas
//! - Realtime (1x speed): Sleep between steps for accurate pacing
//! - Custom speed: Any multiplier (0.5x slow-mo, 10x fast-forward, etc.)

use std::time::Duration;

/// Virtual clock measuring scenario time in seconds
#[derive(Debug)]
pub struct VirtualClock {
    /// Current scenario time
    current_secs: f32,

    /// Speed multiplier (1.0 = realtime, 0.0 = instant, 10.0 = 10x speed)
    speed_multiplier: f32,
}

impl VirtualClock {
    pub fn new(speed_multiplier: f32) -> Self {
        Self {
            current_secs: 0.0,
            speed_multiplier: speed_multiplier.max(0.0),
        }
    }

    /// Create a clock for instant replay
    pub fn instant() -> Self {
        Self::new(0.0)
    }

    /// Create a clock for realtime (1x) replay
    pub fn realtime() -> Self {
        Self::new(1.0)
    }

    /// Advance to `secs`, sleeping in paced modes. Returns the elapsed delta
    /// (0 when `secs` is not ahead of the clock).
    pub fn advance_to(&mut self, secs: f32) -> f32 {
        let delta = (secs - self.current_secs).max(0.0);
        if delta == 0.0 {
            return 0.0;
        }

        if self.speed_multiplier > 0.0 {
            let sleep_ms = (delta * 1000.0 / self.speed_multiplier) as u64;
            if sleep_ms > 0 {
                std::thread::sleep(Duration::from_millis(sleep_ms));
            }
        }

        self.current_secs = secs;
        delta
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.current_secs
    }

    /// Format elapsed time as MM:SS.ms
    pub fn format_time(&self) -> String {
        format_secs(self.current_secs)
    }

    pub fn is_instant_mode(&self) -> bool {
        self.speed_multiplier == 0.0
    }

    pub fn speed(&self) -> f32 {
        self.speed_multiplier
    }
}

/// Format seconds as MM:SS.ms
pub fn format_secs(secs: f32) -> String {
    let mins = (secs / 60.0).floor() as u32;
    let secs_remainder = secs % 60.0;
    format!("{:02}:{:05.2}", mins, secs_remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_returns_delta() {
        let mut clock = VirtualClock::instant();

        assert_eq!(clock.advance_to(1.5), 1.5);
        assert_eq!(clock.advance_to(4.0), 2.5);
        assert_eq!(clock.elapsed_secs(), 4.0);

        // never runs backwards
        assert_eq!(clock.advance_to(3.0), 0.0);
        assert_eq!(clock.elapsed_secs(), 4.0);
    }

    #[test]
    fn test_format_time() {
        let mut clock = VirtualClock::instant();

        clock.advance_to(15.25);
        assert_eq!(clock.format_time(), "00:15.25");

        clock.advance_to(165.5);
        assert_eq!(clock.format_time(), "02:45.50");
    }

    #[test]
    fn test_modes() {
        assert!(VirtualClock::instant().is_instant_mode());
        let clock = VirtualClock::realtime();
        assert!(!clock.is_instant_mode());
        assert_eq!(clock.speed(), 1.0);
    }
}
