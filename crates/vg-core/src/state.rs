use crate::classify::{classify, EventKind};
use crate::filter::{FilterCriteria, FilterOptions};
use crate::view::{
    display_timestamp, grouped_user_rows, user_rows_for_event, SystemRow, UserRow,
};
use std::collections::VecDeque;
use vg_types::{Coverage, LogEvent, LogsPage, StatsSummary, ValidationResult};

/// Rolling buffer cap: older results are evicted once this many are held.
pub const RESULT_BUFFER_CAP: usize = 1000;
/// Per-table display cap, independent of the buffer cap.
pub const TABLE_ROW_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    Connected,
    #[default]
    Disconnected,
}

/// Which result set an export sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// The active filtered set, or the whole buffer when unfiltered.
    Filtered,
    /// The whole buffer regardless of any active filter.
    Everything,
}

/// All client-side state for one subject's live validation view.
///
/// Mutations happen only from the session's dispatch loop; every method
/// here is synchronous and side-effect free beyond `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    app_id: String,
    page_size: u32,

    results: VecDeque<ValidationResult>,
    user_rows: Vec<UserRow>,
    system_rows: Vec<SystemRow>,
    user_events: u64,
    system_events: u64,

    filter: Option<FilterCriteria>,
    filtered: Option<Vec<ValidationResult>>,
    options: FilterOptions,

    page: u32,
    total_logs: u64,

    stats: Option<StatsSummary>,
    coverage: Option<Coverage>,
    expected_events: Vec<String>,
    channel: ChannelStatus,
}

impl LiveView {
    pub fn new(app_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            app_id: app_id.into(),
            page_size: page_size.max(1),
            results: VecDeque::new(),
            user_rows: Vec::new(),
            system_rows: Vec::new(),
            user_events: 0,
            system_events: 0,
            filter: None,
            filtered: None,
            options: FilterOptions::default(),
            page: 0,
            total_logs: 0,
            stats: None,
            coverage: None,
            expected_events: Vec::new(),
            channel: ChannelStatus::default(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Ingest one event from the live channel or a page replay.
    pub fn ingest(&mut self, event: &LogEvent) -> EventKind {
        let kind = classify(event);
        let timestamp = display_timestamp(event.created_at);
        match kind {
            EventKind::User => {
                let results = self.adopt_results(event, &timestamp);
                let block = user_rows_for_event(&timestamp, &event.event_name, &results);
                for row in &results {
                    self.results.push_front(row.clone());
                }
                self.results.truncate(RESULT_BUFFER_CAP);
                prepend_capped(&mut self.user_rows, block);
                self.user_events += 1;
                self.options = FilterOptions::collect(self.results.iter());
            }
            EventKind::System => {
                let row = SystemRow {
                    timestamp,
                    event_name: event.event_name.clone(),
                    message: event
                        .validation_message
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                };
                prepend_capped(&mut self.system_rows, vec![row]);
                self.system_events += 1;
            }
        }
        kind
    }

    /// Apply one fetched page. Page 1 is a full reset before replay;
    /// later pages append. Events are replayed oldest-first so that the
    /// newest ends up on top, matching the live insertion path.
    pub fn apply_page(&mut self, page: u32, payload: LogsPage) {
        if page == 1 {
            self.reset_view();
        }
        let mut logs = payload.logs;
        logs.sort_by_key(|event| event.created_at);
        for event in &logs {
            self.ingest(event);
        }
        self.page = page;
        self.total_logs = payload.total;
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_logs(&self) -> u64 {
        self.total_logs
    }

    pub fn next_page(&self) -> u32 {
        if self.page == 0 {
            1
        } else {
            self.page + 1
        }
    }

    /// Whether the "load more" affordance applies.
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total_logs
    }

    /// Compute the filtered view and re-render the user table from it.
    /// The rolling buffer is left untouched.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) {
        let selected: Vec<ValidationResult> = self
            .results
            .iter()
            .filter(|row| criteria.matches(row))
            .cloned()
            .collect();
        self.user_rows = grouped_user_rows(&selected);
        self.user_rows.truncate(TABLE_ROW_CAP);
        self.filtered = Some(selected);
        self.filter = Some(criteria);
    }

    /// Drop the filtered view. The caller follows up with a full reload
    /// (`apply_page(1, …)`) to restore the unfiltered rendering.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.filtered = None;
    }

    pub fn active_filter(&self) -> Option<&FilterCriteria> {
        self.filter.as_ref()
    }

    /// The result set an export request carries.
    pub fn export_set(&self, scope: ExportScope) -> Vec<ValidationResult> {
        match scope {
            ExportScope::Filtered => match &self.filtered {
                Some(selected) => selected.clone(),
                None => self.results.iter().cloned().collect(),
            },
            ExportScope::Everything => self.results.iter().cloned().collect(),
        }
    }

    /// Apply an acknowledged bulk delete: everything local is emptied.
    /// Stats and coverage keep their last fetched values until the next
    /// refresh tick corrects them.
    pub fn apply_delete(&mut self) {
        self.reset_view();
        self.page = 0;
        self.total_logs = 0;
    }

    pub fn results(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter()
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn filtered_results(&self) -> Option<&[ValidationResult]> {
        self.filtered.as_deref()
    }

    pub fn user_rows(&self) -> &[UserRow] {
        &self.user_rows
    }

    pub fn system_rows(&self) -> &[SystemRow] {
        &self.system_rows
    }

    pub fn user_events(&self) -> u64 {
        self.user_events
    }

    pub fn system_events(&self) -> u64 {
        self.system_events
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn stats(&self) -> Option<&StatsSummary> {
        self.stats.as_ref()
    }

    pub fn set_stats(&mut self, stats: StatsSummary) {
        self.stats = Some(stats);
    }

    pub fn coverage(&self) -> Option<&Coverage> {
        self.coverage.as_ref()
    }

    pub fn set_coverage(&mut self, coverage: Coverage) {
        self.coverage = Some(coverage);
    }

    pub fn expected_events(&self) -> &[String] {
        &self.expected_events
    }

    pub fn set_expected_events(&mut self, names: Vec<String>) {
        self.expected_events = names;
    }

    pub fn channel(&self) -> ChannelStatus {
        self.channel
    }

    pub fn set_channel(&mut self, status: ChannelStatus) {
        self.channel = status;
    }

    /// Copy the owning event's display fields onto its result rows before
    /// they enter the buffer.
    fn adopt_results(&self, event: &LogEvent, timestamp: &str) -> Vec<ValidationResult> {
        event
            .validation_results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.timestamp = timestamp.to_string();
                if row.event_name.is_empty() {
                    row.event_name = event.event_name.clone();
                }
                row
            })
            .collect()
    }

    fn reset_view(&mut self) {
        self.results.clear();
        self.user_rows.clear();
        self.system_rows.clear();
        self.user_events = 0;
        self.system_events = 0;
        self.filter = None;
        self.filtered = None;
        self.options = FilterOptions::default();
    }
}

/// Insert `block` at the top of `rows`, then trim the oldest rows off the
/// bottom down to the display cap.
fn prepend_capped<T>(rows: &mut Vec<T>, block: Vec<T>) {
    rows.splice(0..0, block);
    rows.truncate(TABLE_ROW_CAP);
}
