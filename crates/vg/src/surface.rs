use owo_colors::OwoColorize;
use std::fmt::Write as _;
use vg_core::view::{display_value, SystemRow, UserRow};
use vg_core::{ChannelStatus, LiveView, Surface};
use vg_types::ValidationStatus;

const USER_ROW_LIMIT: usize = 14;
const SYSTEM_ROW_LIMIT: usize = 6;
const MISSING_EVENT_LIMIT: usize = 5;

/// Full-redraw terminal rendering of the live view. All row selection and
/// capping lives in the state; this only draws what it is handed.
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, view: &LiveView) {
        let mut out = String::new();
        // Clear and home before each redraw.
        out.push_str("\x1b[2J\x1b[H");

        let channel = match view.channel() {
            ChannelStatus::Connected => "live".green().to_string(),
            ChannelStatus::Disconnected => "disconnected".red().to_string(),
        };
        let _ = writeln!(
            out,
            "{} app {}  [{channel}]",
            "vigil".bold(),
            view.app_id().bold()
        );

        let _ = write!(
            out,
            "events: {} user / {} system   buffer: {} results",
            view.user_events(),
            view.system_events(),
            view.result_count()
        );
        if let Some(stats) = view.stats() {
            let _ = write!(
                out,
                "   stats: {} valid / {} invalid of {}",
                stats.valid.green(),
                stats.invalid.red(),
                stats.total
            );
        }
        out.push('\n');

        if let Some(coverage) = view.coverage() {
            let _ = write!(
                out,
                "coverage: {}/{} events captured",
                coverage.captured, coverage.total
            );
            if !coverage.missing_events.is_empty() {
                let shown: Vec<&str> = coverage
                    .missing_events
                    .iter()
                    .take(MISSING_EVENT_LIMIT)
                    .map(String::as_str)
                    .collect();
                let _ = write!(out, "   missing: {}", shown.join(", ").yellow());
                if coverage.missing_events.len() > shown.len() {
                    let _ = write!(out, " (+{})", coverage.missing_events.len() - shown.len());
                }
            }
            out.push('\n');
        }

        if let Some(criteria) = view.active_filter() {
            let matching = view.filtered_results().map_or(0, |results| results.len());
            let _ = writeln!(
                out,
                "{} {}  ({matching} matching results)",
                "filter:".yellow().bold(),
                describe_criteria(criteria)
            );
        }

        render_user_table(&mut out, view.user_rows());
        render_system_table(&mut out, view.system_rows());

        if view.has_more() {
            let _ = writeln!(
                out,
                "{} of {} logs loaded; `more` fetches the next page",
                view.user_events() + view.system_events(),
                view.total_logs()
            );
        }
        let _ = writeln!(out, "{}", "commands: help".dimmed());
        print!("{out}");
    }

    fn alert(&mut self, message: &str) {
        println!("{} {message}", "!".yellow().bold());
    }
}

fn render_user_table(out: &mut String, rows: &[UserRow]) {
    let _ = writeln!(out, "{}", "── user events ──".bold());
    if rows.is_empty() {
        let _ = writeln!(out, "  {}", "none yet".dimmed());
        return;
    }
    for row in rows.iter().take(USER_ROW_LIMIT) {
        match row {
            UserRow::Header {
                timestamp,
                event_name,
            } => {
                let _ = writeln!(out, "{}  {}", timestamp.dimmed(), event_name.bold());
            }
            UserRow::Field(field) => {
                let _ = writeln!(
                    out,
                    "    {:<20} {:<16} {} -> {}  {}{}",
                    field.key,
                    display_value(&field.value),
                    field.expected_type,
                    field.received_type,
                    paint_status(field.validation_status),
                    field
                        .comment
                        .as_deref()
                        .map(|comment| format!("  ({comment})"))
                        .unwrap_or_default()
                );
            }
        }
    }
    if rows.len() > USER_ROW_LIMIT {
        let _ = writeln!(out, "  … {} more rows", rows.len() - USER_ROW_LIMIT);
    }
}

fn render_system_table(out: &mut String, rows: &[SystemRow]) {
    let _ = writeln!(out, "{}", "── system events ──".bold());
    if rows.is_empty() {
        let _ = writeln!(out, "  {}", "none yet".dimmed());
        return;
    }
    for row in rows.iter().take(SYSTEM_ROW_LIMIT) {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            row.timestamp.dimmed(),
            row.event_name,
            row.message
        );
    }
    if rows.len() > SYSTEM_ROW_LIMIT {
        let _ = writeln!(out, "  … {} more rows", rows.len() - SYSTEM_ROW_LIMIT);
    }
}

fn describe_criteria(criteria: &vg_core::FilterCriteria) -> String {
    let mut parts = Vec::new();
    for (name, set) in [
        ("events", &criteria.events),
        ("fields", &criteria.fields),
        ("expected", &criteria.expected_types),
        ("received", &criteria.received_types),
        ("statuses", &criteria.statuses),
    ] {
        if !set.is_empty() {
            let values: Vec<&str> = set.iter().map(String::as_str).collect();
            parts.push(format!("{name}={}", values.join(",")));
        }
    }
    if let Some(needle) = criteria.value_contains.as_deref() {
        if !needle.is_empty() {
            parts.push(format!("value~{needle}"));
        }
    }
    parts.join(" ")
}

fn paint_status(status: ValidationStatus) -> String {
    match status {
        ValidationStatus::Valid => status.as_str().green().to_string(),
        ValidationStatus::Invalid => status.as_str().red().to_string(),
        _ => status.as_str().yellow().to_string(),
    }
}
