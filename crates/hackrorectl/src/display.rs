//! Terminal rendering - ASCII only, optional color.

use hackrore_common::config::ColorMode;
use hackrore_common::tickets::{Ticket, TicketStatus};
use hackrore_common::{
    DiagnosticCheck, ProgressionLedger, ResultAggregator, TestResult, TestStatus, Unlockable,
    XpAward,
};
use owo_colors::OwoColorize;

pub const HR: &str = "------------------------------------------------------------";

/// Color on/off switch for every rendered string
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn from_mode(mode: ColorMode) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => console::Term::stdout().features().colors_supported(),
        };
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn ok(&self, s: &str) -> String {
        if self.color { s.bright_green().to_string() } else { s.to_string() }
    }

    pub fn warn(&self, s: &str) -> String {
        if self.color { s.yellow().to_string() } else { s.to_string() }
    }

    pub fn err(&self, s: &str) -> String {
        if self.color { s.bright_red().to_string() } else { s.to_string() }
    }

    pub fn dim(&self, s: &str) -> String {
        if self.color { s.dimmed().to_string() } else { s.to_string() }
    }

    pub fn bold(&self, s: &str) -> String {
        if self.color { s.bold().to_string() } else { s.to_string() }
    }

    pub fn accent(&self, s: &str) -> String {
        if self.color { s.cyan().to_string() } else { s.to_string() }
    }

    pub fn status_badge(&self, status: TestStatus) -> String {
        match status {
            TestStatus::Pass => self.ok("[PASS]"),
            TestStatus::Fail => self.err("[FAIL]"),
            TestStatus::Warning => self.warn("[WARN]"),
            TestStatus::Pending => self.dim("[PEND]"),
        }
    }

    pub fn ticket_badge(&self, status: TicketStatus) -> String {
        let label = format!("{:<11}", status.as_str());
        match status {
            TicketStatus::Fixed => self.ok(&label),
            TicketStatus::InProgress => self.accent(&label),
            TicketStatus::Pending => self.warn(&label),
        }
    }
}

/// `[=====-----]` for a 0-100 percentage
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (percent.min(100) as usize * width) / 100;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), "-".repeat(empty))
}

pub fn render_status(style: &Style, ledger: &ProgressionLedger, results: &ResultAggregator) -> String {
    let progress = ledger.progress_to_next_level();
    let mut lines = Vec::new();

    lines.push(style.bold("Technician Profile"));
    lines.push(style.dim(HR));
    lines.push(format!(
        "  Level {}   {} {}%",
        style.accent(&ledger.level().to_string()),
        progress_bar(progress.percent(), 30),
        progress.percent()
    ));
    if ledger.is_max_level() {
        lines.push(format!("  {} XP (max level)", ledger.xp()));
    } else {
        lines.push(format!(
            "  {} / {} XP  ({} to next level)",
            ledger.xp(),
            progress.next_level_threshold,
            progress.xp_to_next(ledger.xp())
        ));
    }
    let unlocked = ledger.unlockables().iter().filter(|u| u.unlocked).count();
    lines.push(format!(
        "  Unlocks: {}/{}",
        unlocked,
        ledger.unlockables().len()
    ));

    lines.push(String::new());
    lines.push(style.bold("Diagnostics"));
    lines.push(style.dim(HR));
    let counts = results.counts();
    lines.push(format!(
        "  Overall {}   pass {}  warn {}  fail {}  pending {}",
        style.status_badge(results.overall_status()),
        counts.pass,
        counts.warning,
        counts.fail,
        counts.pending
    ));
    for r in results.results().values() {
        lines.push(format!("  {} {}", style.status_badge(r.status), r.name));
    }

    if !ledger.is_durable() || !results.is_durable() {
        lines.push(String::new());
        lines.push(style.warn("[NOTE] Storage unavailable, progress is not being saved."));
    }

    lines.join("\n")
}

pub fn render_result_line(style: &Style, r: &TestResult) -> String {
    let mut line = format!(
        "{} {}  {:<16} {}",
        style.dim(&r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        style.status_badge(r.status),
        r.id,
        r.name
    );
    if let Some(details) = &r.details {
        let text = match details {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        line.push_str(&format!("  {}", style.dim(&text)));
    }
    line
}

pub fn render_results<'a>(style: &Style, results: impl Iterator<Item = &'a TestResult>) -> String {
    let lines: Vec<_> = results.map(|r| render_result_line(style, r)).collect();
    if lines.is_empty() {
        "No results recorded.".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn render_award(style: &Style, award: &XpAward) -> String {
    let mut notices = award.notices().into_iter();
    let mut lines = Vec::new();
    if let Some(first) = notices.next() {
        lines.push(style.ok(&first));
    }
    lines.extend(notices.map(|n| style.accent(&n)));
    lines.join("\n")
}

pub fn render_unlocks(style: &Style, unlockables: &[Unlockable]) -> String {
    unlockables
        .iter()
        .map(|u| {
            let mark = if u.unlocked { style.ok("[x]") } else { style.dim("[ ]") };
            format!(
                "{} {:<18} {:<6} level {:>2}  {}",
                mark, u.name, u.kind.as_str(), u.required_level, u.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_checks() -> String {
    DiagnosticCheck::ALL
        .iter()
        .map(|c| {
            format!(
                "{:<15} {:<16} {}{}",
                c.slug(),
                c.result_id().unwrap_or("-"),
                c.display_name(),
                if c.is_scored() { "  (scored)" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_tickets(style: &Style, tickets: &[&Ticket]) -> String {
    if tickets.is_empty() {
        return "No logs found. Create a new ticket to get started.".to_string();
    }
    let mut lines = vec![format!(
        "{:<9} {:<11} {:<16} {:<16} {:<11} {}",
        "ID", "Date", "Client", "Device", "Status", "Issue"
    )];
    lines.push(style.dim(HR));
    for t in tickets {
        lines.push(format!(
            "{:<9} {:<11} {:<16} {:<16} {} {}",
            t.id,
            t.date.format("%Y-%m-%d").to_string(),
            t.client,
            t.device,
            style.ticket_badge(t.status),
            t.issue
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 10), "[----------]");
        assert_eq!(progress_bar(50, 10), "[=====-----]");
        assert_eq!(progress_bar(100, 10), "[==========]");
        assert_eq!(progress_bar(250, 4), "[====]");
    }

    #[test]
    fn test_plain_badges_have_no_escapes() {
        let style = Style::plain();
        assert_eq!(style.status_badge(TestStatus::Fail), "[FAIL]");
        assert!(!style.ok("x").contains('\x1b'));
    }

    #[test]
    fn test_colored_badges_have_escapes() {
        let style = Style { color: true };
        assert!(style.status_badge(TestStatus::Pass).contains('\x1b'));
    }
}
