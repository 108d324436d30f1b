//! Text output formatting with colors.

use chrono::{DateTime, Local};
use claimwatch_core::{ClaimError, ClaimLinks, ClaimRecord, PollOutcome, PollState};
use claimwatch_store::Config;

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
#[derive(Debug, Clone)]
pub struct TextFormatter {
    use_colors: bool,
    links: ClaimLinks,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool, links: ClaimLinks) -> Self {
        Self { use_colors, links }
    }

    /// Formats one state transition as a timestamped line.
    ///
    /// `max_attempts` is only used to render the attempt counter.
    pub fn format_state(&self, state: &PollState, max_attempts: u32, at: DateTime<Local>) -> String {
        let stamp = self.dim(&format!("[{}]", at.format("%H:%M:%S")));

        let body = match state {
            PollState::Loading { attempt } => format!(
                "Checking for reward {}",
                self.dim(&format!("(attempt {}/{max_attempts})", attempt + 1))
            ),
            PollState::Found(record) => {
                format!("{} {}", self.green("Reward found:"), self.format_record(record))
            }
            PollState::Exhausted { attempts } => {
                self.yellow(&format!("No reward yet after {attempts} attempts"))
            }
            PollState::Cancelled => self.yellow("Cancelled"),
            PollState::Failed(err) => format!("{} {}", self.red("Lookup failed:"), self.format_error(err)),
        };

        format!("{stamp} {body}")
    }

    /// Formats the final summary for a finished poll.
    pub fn format_outcome(&self, outcome: &PollOutcome) -> String {
        match outcome {
            PollOutcome::Found(record) => {
                let mut lines = vec![self.format_record(record)];
                lines.push(self.format_link(record));
                lines.join("\n")
            }
            PollOutcome::Exhausted { attempts } => {
                format!("No reward found after {attempts} attempts")
            }
            PollOutcome::Cancelled => "Cancelled".to_string(),
            PollOutcome::Failed(err) => format!("Lookup failed: {}", self.format_error(err)),
        }
    }

    /// Formats the shopper link for a record: "<call to action>: <url>".
    pub fn format_link(&self, record: &ClaimRecord) -> String {
        format!(
            "{}: {}",
            self.bold(ClaimLinks::call_to_action(record)),
            self.cyan(self.links.url_for(record).as_str())
        )
    }

    /// Formats a record as "<amount> miles (<status>)".
    pub fn format_record(&self, record: &ClaimRecord) -> String {
        let status = if record.is_claimed() {
            "claimed"
        } else {
            "not claimed"
        };
        format!(
            "{} miles ({status})",
            self.bold(&record.claimed_amount.major_display())
        )
    }

    fn format_error(&self, err: &ClaimError) -> String {
        if err.is_transport() {
            format!("{err} {}", self.dim("(network)"))
        } else {
            format!("{err} {}", self.dim("(service)"))
        }
    }

    /// Formats the configuration as an aligned listing.
    pub fn format_config(&self, config: &Config) -> String {
        let rows = [
            ("Lookup URL", config.lookup.base_url.clone()),
            ("Shop header", config.lookup.shop_header.clone()),
            ("Timeout", format!("{}ms", config.lookup.timeout_ms)),
            ("Interval", format!("{}ms", config.poll.interval_ms)),
            ("Max attempts", config.poll.max_attempts.to_string()),
            ("Consumer site", config.links.consumer_base.clone()),
            ("Log level", config.general.log_level.clone()),
        ];

        let mut lines = vec![self.bold("ClaimWatch Configuration"), "─".repeat(40)];
        lines.extend(
            rows.iter()
                .map(|(label, value)| format!("{:<14} {value}", format!("{label}:"))),
        );
        lines.join("\n")
    }

    // ========================================================================
    // Color Helpers
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
