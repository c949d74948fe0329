//! Colored CLI output for ability transitions
//!
//! Formats activations, deactivations, steps and checkpoint results with
//! colored output for easy visual parsing.

use std::io::{self, Write};

use evo_core::{AbilityType, Value};

use crate::replay::{AbilityEvent, format_secs};
use crate::verification::checkpoint::CheckpointResult;

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OutputLevel {
    /// Only show summary at end
    Quiet,
    /// Show ability transitions and checkpoints (default)
    #[default]
    Normal,
    /// Also show every scenario step and stat tables
    Verbose,
}

/// CLI output formatter with color support
#[derive(Debug)]
pub struct CliOutput {
    level: OutputLevel,
    use_colors: bool,
    steps_run: u32,
    activations: u32,
    deactivations: u32,
    notifications: u32,
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new(OutputLevel::Normal)
    }
}

impl CliOutput {
    pub fn new(level: OutputLevel) -> Self {
        Self {
            level,
            use_colors: atty::is(atty::Stream::Stdout),
            steps_run: 0,
            activations: 0,
            deactivations: 0,
            notifications: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ANSI Color Codes
    // ═══════════════════════════════════════════════════════════════════════════

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint("36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Event Output
    // ═══════════════════════════════════════════════════════════════════════════

    /// Log the start of a replay
    pub fn scenario_start(&self, name: &str, abilities: usize) {
        if self.level < OutputLevel::Normal {
            return;
        }
        let label = self.bold(&self.green("═══ SCENARIO START ═══"));
        println!("\n{} {} ({} abilities)\n", label, name, abilities);
    }

    /// Log a scenario step (verbose only)
    pub fn step(&mut self, secs: f32, description: &str) {
        self.steps_run += 1;
        if self.level < OutputLevel::Verbose {
            return;
        }
        let label = self.dim("STEP:");
        println!("[{}] {} {}", format_secs(secs), label, description);
    }

    /// Log one owner notification
    pub fn ability_event(&mut self, secs: f32, event: &AbilityEvent) {
        self.notifications += 1;
        if event.applied {
            self.activations += 1;
        } else {
            self.deactivations += 1;
        }
        if self.level < OutputLevel::Normal {
            return;
        }

        let time_str = format_secs(secs);
        let id = self.dim(&format!("[{}]", event.meta_id));
        if event.applied {
            let uses = if event.remaining_count > 0 {
                format!(" ({} uses left)", event.remaining_count)
            } else {
                String::new()
            };
            println!(
                "[{}] {} {} {}{} {}",
                time_str,
                self.green("-->"),
                self.green("APPLIED:"),
                event.ability_type,
                uses,
                id
            );
        } else {
            println!(
                "[{}] {} {} {} {}",
                time_str,
                self.yellow("<--"),
                self.yellow("CLEARED:"),
                event.ability_type,
                id
            );
        }
    }

    /// Log a consume step result
    pub fn consume(&self, secs: f32, ability_type: &str, applied: bool) {
        if self.level < OutputLevel::Normal {
            return;
        }
        let status = if applied {
            self.cyan("hit")
        } else {
            self.dim("miss")
        };
        println!(
            "[{}] {} {} {} {}",
            format_secs(secs),
            self.cyan("***"),
            self.cyan("CONSUME:"),
            ability_type,
            status
        );
    }

    /// Print the owner's current stats (verbose only)
    pub fn stats(&self, secs: f32, stats: &[(AbilityType, Value)]) {
        if self.level < OutputLevel::Verbose || stats.is_empty() {
            return;
        }
        println!("[{}] {}", format_secs(secs), self.dim("STATS:"));
        for (name, value) in stats {
            println!("    {:<20} {}", name.as_str(), value);
        }
    }

    /// Log checkpoint result
    pub fn checkpoint(&self, result: &CheckpointResult) {
        if self.level < OutputLevel::Normal && result.passed {
            return;
        }

        let time_str = format_secs(result.at_secs);
        let desc = result.description.as_deref().unwrap_or("");
        if result.passed {
            println!(
                "[{}] {} {} #{} {}",
                time_str,
                self.green("[✓]"),
                self.green("CHECKPOINT:"),
                result.checkpoint_idx + 1,
                desc
            );
        } else {
            println!(
                "[{}] {} {} #{} {}",
                time_str,
                self.red("[✗]"),
                self.red("CHECKPOINT:"),
                result.checkpoint_idx + 1,
                desc
            );
            for failure in &result.failures {
                println!("      {}", self.red(failure));
            }
        }
    }

    /// Log the end of a replay
    pub fn scenario_end(&self, time: &str) {
        if self.level < OutputLevel::Normal {
            return;
        }
        let label = self.bold(&self.yellow("═══ SCENARIO END ═══"));
        println!("\n{} (at {})\n", label, time);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Summary Report
    // ═══════════════════════════════════════════════════════════════════════════

    /// Print final summary
    pub fn print_summary(&self, checkpoints_passed: Option<(u32, u32)>) {
        let line = "═".repeat(51);
        println!();
        println!("{}", line);
        println!("  ABILITY VALIDATION SUMMARY");
        println!("{}", line);
        println!("Steps Run:       {}", self.steps_run);
        println!("Notifications:   {}", self.notifications);
        println!("Activations:     {}", self.activations);
        println!("Deactivations:   {}", self.deactivations);

        if let Some((passed, total)) = checkpoints_passed {
            let status = if passed == total {
                self.green(&format!("PASSED ({}/{})", passed, total))
            } else {
                self.red(&format!("FAILED ({}/{})", passed, total))
            };
            println!("Verification:    {}", status);
        }
        println!("{}", line);
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(applied: bool) -> AbilityEvent {
        AbilityEvent {
            meta_id: 1001,
            ability_type: AbilityType::new("ATK"),
            applied,
            remaining_count: 0,
        }
    }

    #[test]
    fn test_quiet_still_counts() {
        let mut output = CliOutput::new(OutputLevel::Quiet);

        output.step(0.0, "evaluate ALWAYS (activate)");
        output.ability_event(0.0, &event(true));
        output.ability_event(3.0, &event(false));

        assert_eq!(output.steps_run, 1);
        assert_eq!(output.notifications, 2);
        assert_eq!(output.activations, 1);
        assert_eq!(output.deactivations, 1);
    }

    #[test]
    fn test_plain_text_without_colors() {
        let mut output = CliOutput::new(OutputLevel::Normal);
        output.use_colors = false;
        assert_eq!(output.green("x"), "x");

        output.use_colors = true;
        assert_eq!(output.green("x"), "\x1b[32mx\x1b[0m");
    }
}
