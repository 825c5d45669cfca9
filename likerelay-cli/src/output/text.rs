//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use likerelay_core::HistoryRecord;
use likerelay_store::HistoryStats;

use super::json::SendOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the outcome of a send.
    pub fn format_send(&self, output: &SendOutput, show_attempts: bool) -> String {
        let mut lines = Vec::new();

        // Header: "DragonSlayer99 (BR)"
        lines.push(format!(
            "{} ({})",
            self.bold(&output.nickname),
            output.region
        ));
        lines.push(format!(
            "Level {}  {} exp",
            output.level,
            self.format_number(output.exp)
        ));

        if output.limit_reached {
            lines.push(self.yellow("24h limit reached: this id already received likes today. Try again tomorrow."));
            lines.push(format!("Likes:   {}", self.format_number(output.likes_after)));
        } else {
            lines.push(format!(
                "Likes:   {} → {}  {}",
                self.format_number(output.likes_before),
                self.format_number(output.likes_after),
                self.green(&format!("+{}", self.format_number(output.likes_sent)))
            ));
        }

        if show_attempts {
            lines.push(String::new());
            lines.push(self.dim("Attempts:"));
            for attempt in &output.attempts {
                let status = if attempt.success {
                    self.green("✓")
                } else {
                    self.red("✗")
                };
                let mut line = format!(
                    "  {} {:<20} {:>6}ms",
                    status, attempt.strategy, attempt.duration_ms
                );
                if let Some(error) = &attempt.error {
                    line.push_str(&format!("  {}", self.dim(error)));
                }
                lines.push(line);
            }
        }

        lines.join("\n")
    }

    /// Formats history records, newest first.
    pub fn format_history(&self, records: &[HistoryRecord]) -> String {
        if records.is_empty() {
            return self.dim("No history yet");
        }

        let mut lines = Vec::new();
        lines.push(format!(
            "{:<16} {:<12} {:<18} {:>8}  {}",
            self.bold("When"),
            self.bold("Player"),
            self.bold("Nickname"),
            self.bold("Sent"),
            self.bold("Status")
        ));

        for record in records {
            let status = if record.success {
                self.green("✓")
            } else {
                self.yellow("24h limit")
            };
            lines.push(format!(
                "{:<16} {:<12} {:<18} {:>8}  {}",
                self.format_timestamp(record.timestamp),
                record.player_id,
                truncate(&record.nickname, 18),
                self.format_number(record.likes_sent),
                status
            ));
        }

        lines.join("\n")
    }

    /// Formats aggregate history stats.
    pub fn format_stats(&self, stats: &HistoryStats) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("LikeRelay History"));
        lines.push("─".repeat(30));
        lines.push(format!("Dispatches:  {}", stats.total));
        lines.push(format!("Successful:  {}", self.green(&stats.successful.to_string())));
        lines.push(format!("Limit hit:   {}", stats.failed));
        lines.push(format!(
            "Likes sent:  {}",
            self.cyan(&self.format_number(stats.total_likes))
        ));

        lines.join("\n")
    }

    // ========================================================================
    // Formatting helpers
    // ========================================================================

    fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
    }

    /// Groups thousands: 1234567 -> "1,234,567".
    fn format_number(&self, n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
