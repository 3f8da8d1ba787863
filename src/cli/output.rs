//! CLI output formatting

use crate::core::RunOutcome;
use crate::execution::ProgressReporter;
use console::{measure_text_width, Emoji};
use std::path::{Path, PathBuf};

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static PIN: Emoji<'_, '_> = Emoji("📍 ", "# ");
pub static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "* ");

/// Draw lines inside a double-line box, padding by display width
pub fn panel(lines: &[String]) -> String {
    let width = lines
        .iter()
        .map(|line| measure_text_width(line))
        .max()
        .unwrap_or(0);

    let mut out = format!("╔{}╗\n", "═".repeat(width + 2));
    for line in lines {
        let pad = width - measure_text_width(line);
        out.push_str(&format!("║ {}{} ║\n", line, " ".repeat(pad)));
    }
    out.push_str(&format!("╚{}╝", "═".repeat(width + 2)));
    out
}

/// Installer banner shown before anything else
pub fn banner() -> String {
    panel(&[
        style("Canvas LMS Automated Installer").cyan().bold().to_string(),
        style("Ubuntu 22.04 LTS - Comprehensive Installation Guide")
            .dim()
            .to_string(),
        String::new(),
        format!(
            "{}{}",
            WARN,
            style("This installer requires root privileges and will modify system configuration")
                .yellow()
        ),
    ])
}

/// Final message for a run that stopped at a failed step
pub fn format_failure(outcome: &RunOutcome, log_path: &Path) -> Option<String> {
    match outcome {
        RunOutcome::Completed => None,
        RunOutcome::Failed { step_name, .. } => Some(format!(
            "\n{}{}\n{}",
            CROSS,
            style(format!("Installation failed at step: {}", step_name)).red(),
            style(format!(
                "Check the log file ({}) for details and run the installer again to resume.",
                log_path.display()
            ))
            .yellow()
        )),
    }
}

/// Message printed when the run is interrupted
pub fn format_interrupted() -> String {
    format!(
        "\n\n{}{}\n{}",
        WARN,
        style("Installation interrupted by user").yellow(),
        style("Run the installer again to resume from the last completed step.").dim()
    )
}

/// Progress reporter that prints to the terminal
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    log_path: PathBuf,
}

impl ConsoleReporter {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    /// Completion panel body
    pub fn completion_panel(&self, message: &str) -> String {
        let mut lines = vec![
            style(format!(
                "{}Canvas LMS Installation Completed Successfully! {}",
                PARTY, PARTY
            ))
            .green()
            .bold()
            .to_string(),
            String::new(),
        ];
        lines.extend(message.lines().map(|line| style(line).cyan().to_string()));
        lines.push(String::new());
        lines.push(
            style(format!("Log file: {}", self.log_path.display()))
                .dim()
                .to_string(),
        );
        panel(&lines)
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_step_start(&self, name: &str, position: usize, total: usize) {
        println!(
            "\n{}{}",
            PIN,
            style(format!("Step {}/{}: {}", position, total, name))
                .blue()
                .bold()
        );
    }

    fn on_step_success(&self, name: &str) {
        println!("{}{}", CHECK, style(format!("{} completed successfully", name)).green());
    }

    fn on_step_failure(&self, name: &str, reason: &str) {
        println!("{}{}", CROSS, style(format!("{} failed: {}", name, reason)).red());
    }

    fn on_pipeline_complete(&self, message: &str) {
        println!("\n{}", "=".repeat(60));
        println!("{}", self.completion_panel(message));
    }

    fn on_step_detail(&self, _name: &str, detail: &str) {
        println!("   {}", style(detail).cyan());
    }

    fn on_step_skipped(&self, name: &str, reason: &str) {
        println!("{}{}", SKIP, style(format!("Skipping {}: {}", name, reason)).yellow());
    }

    fn on_resume(&self, position: usize, total: usize) {
        println!(
            "{}{}",
            INFO,
            style(format!("Resuming from step {} of {}", position, total)).green()
        );
    }
}
