use crate::error::ClientError;
use crate::seq::Seq;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vg_core::{
    ApiError, ChannelStatus, ExportScope, FilterCriteria, LiveView, Surface, ValidationApi,
};
use vg_types::{ChannelMessage, Coverage, DeleteOutcome, LogsPage, StatsSummary};

/// User-issued actions, parsed by the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadMore,
    Reload,
    Filter(FilterCriteria),
    ClearFilter,
    ExportReport,
    ExportValid,
    DeleteAll { confirmed: bool },
    Quit,
}

/// Everything the dispatch loop consumes. Fetches run as spawned tasks
/// and come back through this queue, so state is only ever touched from
/// one place.
#[derive(Debug)]
pub enum Inbound {
    Push(ChannelMessage),
    Channel(ChannelStatus),
    Command(Command),
    PageLoaded {
        seq: u64,
        page: u32,
        outcome: Result<LogsPage, ApiError>,
    },
    StatsLoaded {
        seq: u64,
        outcome: Result<StatsSummary, ApiError>,
    },
    CoverageLoaded {
        seq: u64,
        outcome: Result<Coverage, ApiError>,
    },
    EventNamesLoaded {
        outcome: Result<Vec<String>, ApiError>,
    },
    ReportSaved {
        outcome: Result<PathBuf, ClientError>,
    },
    DeleteFinished {
        outcome: Result<DeleteOutcome, ApiError>,
    },
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub stats_every: Duration,
    pub coverage_every: Duration,
    pub report_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stats_every: Duration::from_secs(5),
            coverage_every: Duration::from_secs(10),
            report_dir: PathBuf::from("."),
        }
    }
}

/// The live view controller: one dispatch loop owning all state for a
/// subject's session.
pub struct Session<V, S> {
    api: V,
    surface: S,
    state: LiveView,
    config: SessionConfig,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    page_seq: Seq,
    stats_seq: Seq,
    coverage_seq: Seq,
}

impl<V, S> Session<V, S>
where
    V: ValidationApi + Clone + Send + Sync + 'static,
    S: Surface,
{
    pub fn new(api: V, surface: S, state: LiveView, config: SessionConfig) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            api,
            surface,
            state,
            config,
            inbound_tx,
            inbound_rx,
            page_seq: Seq::default(),
            stats_seq: Seq::default(),
            coverage_seq: Seq::default(),
        }
    }

    /// Handle for producers outside the loop: the push-channel subscriber
    /// and the command reader.
    pub fn sender(&self) -> mpsc::UnboundedSender<Inbound> {
        self.inbound_tx.clone()
    }

    /// Run until the user quits. Stats and coverage refresh on their own
    /// cadence for the lifetime of the session; the first tick of each
    /// interval doubles as the initial fetch.
    pub async fn run(mut self) {
        self.surface.render(&self.state);
        self.spawn_page(1);
        self.spawn_event_names();

        let mut stats_tick = tokio::time::interval(self.config.stats_every);
        let mut coverage_tick = tokio::time::interval(self.config.coverage_every);
        loop {
            tokio::select! {
                Some(message) = self.inbound_rx.recv() => {
                    if !self.handle(message) {
                        break;
                    }
                }
                _ = stats_tick.tick() => self.spawn_stats(),
                _ = coverage_tick.tick() => self.spawn_coverage(),
            }
        }
    }

    /// Apply one inbound message. Returns false when the session should
    /// end.
    fn handle(&mut self, message: Inbound) -> bool {
        match message {
            Inbound::Push(ChannelMessage::ValidationUpdate { app_id, log }) => {
                if app_id != self.state.app_id() {
                    debug!(%app_id, "dropping update for another app");
                    return true;
                }
                self.state.ingest(&log);
                self.surface.render(&self.state);
            }
            Inbound::Push(message) => debug!(?message, "channel acknowledgment"),
            Inbound::Channel(status) => {
                self.state.set_channel(status);
                self.surface.render(&self.state);
            }
            Inbound::Command(command) => return self.handle_command(command),
            Inbound::PageLoaded { seq, page, outcome } => {
                if !self.page_seq.is_current(seq) {
                    debug!(seq, page, "discarding stale page response");
                    return true;
                }
                match outcome {
                    Ok(payload) => {
                        self.state.apply_page(page, payload);
                        self.surface.render(&self.state);
                    }
                    Err(err) => warn!(page, error = %err, "page load failed"),
                }
            }
            Inbound::StatsLoaded { seq, outcome } => {
                if !self.stats_seq.is_current(seq) {
                    return true;
                }
                match outcome {
                    Ok(stats) => {
                        self.state.set_stats(stats);
                        self.surface.render(&self.state);
                    }
                    Err(err) => debug!(error = %err, "stats refresh failed"),
                }
            }
            Inbound::CoverageLoaded { seq, outcome } => {
                if !self.coverage_seq.is_current(seq) {
                    return true;
                }
                match outcome {
                    Ok(coverage) => {
                        self.state.set_coverage(coverage);
                        self.surface.render(&self.state);
                    }
                    Err(err) => debug!(error = %err, "coverage refresh failed"),
                }
            }
            Inbound::EventNamesLoaded { outcome } => match outcome {
                Ok(names) => {
                    self.state.set_expected_events(names);
                    self.surface.render(&self.state);
                }
                Err(err) => debug!(error = %err, "event-name fetch failed"),
            },
            Inbound::ReportSaved { outcome } => match outcome {
                Ok(path) => self.surface.alert(&format!("report saved: {}", path.display())),
                Err(err) => self.surface.alert(&format!("export failed: {err}")),
            },
            Inbound::DeleteFinished { outcome } => match outcome {
                Ok(outcome) if outcome.success => {
                    self.state.apply_delete();
                    self.surface.render(&self.state);
                    self.surface
                        .alert(&format!("deleted {} stored logs", outcome.deleted));
                }
                Ok(outcome) => {
                    let detail = outcome.error.unwrap_or_else(|| "delete failed".to_string());
                    self.surface.alert(&detail);
                }
                Err(err) => self.surface.alert(&format!("delete failed: {err}")),
            },
        }
        true
    }

    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::LoadMore => {
                if self.state.has_more() {
                    self.spawn_page(self.state.next_page());
                } else {
                    self.surface.alert("no more stored logs");
                }
            }
            Command::Reload => self.spawn_page(1),
            Command::Filter(criteria) => {
                if criteria.is_empty() {
                    self.surface.alert("empty filter; use `clear` to unfilter");
                    return true;
                }
                self.state.apply_filter(criteria);
                self.surface.render(&self.state);
            }
            Command::ClearFilter => {
                // Intentionally a full reload rather than an incremental
                // un-filter.
                self.state.clear_filter();
                self.spawn_page(1);
            }
            Command::ExportReport => self.spawn_export(ExportScope::Filtered),
            Command::ExportValid => self.spawn_export(ExportScope::Everything),
            Command::DeleteAll { confirmed: false } => {
                self.surface.alert(&format!(
                    "this deletes every stored log for {}; run `delete yes` to confirm",
                    self.state.app_id()
                ));
            }
            Command::DeleteAll { confirmed: true } => self.spawn_delete(),
            Command::Quit => return false,
        }
        true
    }

    fn spawn_page(&mut self, page: u32) {
        let seq = self.page_seq.next();
        let api = self.api.clone();
        let tx = self.inbound_tx.clone();
        let limit = self.state.page_size();
        tokio::spawn(async move {
            let outcome = api.fetch_logs(page, limit).await;
            let _ = tx.send(Inbound::PageLoaded { seq, page, outcome });
        });
    }

    fn spawn_stats(&mut self) {
        let seq = self.stats_seq.next();
        let api = self.api.clone();
        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            let outcome = api.fetch_stats().await;
            let _ = tx.send(Inbound::StatsLoaded { seq, outcome });
        });
    }

    fn spawn_coverage(&mut self) {
        let seq = self.coverage_seq.next();
        let api = self.api.clone();
        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            let outcome = api.fetch_coverage().await;
            let _ = tx.send(Inbound::CoverageLoaded { seq, outcome });
        });
    }

    fn spawn_event_names(&mut self) {
        let api = self.api.clone();
        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            let outcome = api.fetch_event_names().await;
            let _ = tx.send(Inbound::EventNamesLoaded { outcome });
        });
    }

    fn spawn_export(&mut self, scope: ExportScope) {
        let results = self.state.export_set(scope);
        let api = self.api.clone();
        let tx = self.inbound_tx.clone();
        let app_id = self.state.app_id().to_string();
        let dir = self.config.report_dir.clone();
        tokio::spawn(async move {
            let outcome: Result<PathBuf, ClientError> = async {
                let bytes = match scope {
                    ExportScope::Filtered => api.download_report(&results).await?,
                    ExportScope::Everything => api.download_valid_events(&results).await?,
                };
                let prefix = match scope {
                    ExportScope::Filtered => "validation_report",
                    ExportScope::Everything => "valid_events",
                };
                let name = format!(
                    "{prefix}_{app_id}_{}.csv",
                    Utc::now().format("%Y%m%d_%H%M%S")
                );
                let path = dir.join(name);
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|err| ClientError::Save {
                        message: err.to_string(),
                    })?;
                Ok(path)
            }
            .await;
            let _ = tx.send(Inbound::ReportSaved { outcome });
        });
    }

    fn spawn_delete(&mut self) {
        let api = self.api.clone();
        let tx = self.inbound_tx.clone();
        tokio::spawn(async move {
            let outcome = api.delete_logs().await;
            let _ = tx.send(Inbound::DeleteFinished { outcome });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use vg_types::{LogEvent, ValidationResult};

    #[derive(Clone, Default)]
    struct MockApi;

    #[async_trait]
    impl ValidationApi for MockApi {
        async fn fetch_logs(&self, _page: u32, _limit: u32) -> Result<LogsPage, ApiError> {
            Ok(LogsPage {
                total: 0,
                logs: Vec::new(),
            })
        }
        async fn fetch_stats(&self) -> Result<StatsSummary, ApiError> {
            Ok(StatsSummary::default())
        }
        async fn fetch_coverage(&self) -> Result<Coverage, ApiError> {
            Ok(Coverage::default())
        }
        async fn fetch_event_names(&self) -> Result<Vec<String>, ApiError> {
            Ok(Vec::new())
        }
        async fn download_report(
            &self,
            _results: &[ValidationResult],
        ) -> Result<Vec<u8>, ApiError> {
            Ok(b"csv".to_vec())
        }
        async fn download_valid_events(
            &self,
            _results: &[ValidationResult],
        ) -> Result<Vec<u8>, ApiError> {
            Ok(b"csv".to_vec())
        }
        async fn delete_logs(&self) -> Result<DeleteOutcome, ApiError> {
            Ok(DeleteOutcome {
                success: true,
                deleted: 0,
                error: None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        renders: usize,
        alerts: Vec<String>,
    }

    impl Surface for RecordingSurface {
        fn render(&mut self, _view: &LiveView) {
            self.renders += 1;
        }
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    fn session() -> Session<MockApi, RecordingSurface> {
        Session::new(
            MockApi,
            RecordingSurface::default(),
            LiveView::new("app-7", 50),
            SessionConfig::default(),
        )
    }

    fn user_event(name: &str) -> LogEvent {
        serde_json::from_value(json!({
            "created_at": "2026-03-01T08:00:00Z",
            "event_name": name,
            "payload": {"eventId": 0},
            "validation_results": [{
                "eventName": name,
                "key": "user_id",
                "value": 1,
                "expectedType": "integer",
                "receivedType": "integer",
                "validationStatus": "Valid"
            }]
        }))
        .unwrap()
    }

    fn page(names: &[&str]) -> LogsPage {
        LogsPage {
            total: names.len() as u64,
            logs: names.iter().map(|name| user_event(name)).collect(),
        }
    }

    #[tokio::test]
    async fn stale_page_responses_are_discarded() {
        let mut session = session();
        let first = session.page_seq.next();
        let second = session.page_seq.next();

        session.handle(Inbound::PageLoaded {
            seq: first,
            page: 1,
            outcome: Ok(page(&["stale"])),
        });
        assert_eq!(session.state.result_count(), 0);

        session.handle(Inbound::PageLoaded {
            seq: second,
            page: 1,
            outcome: Ok(page(&["fresh"])),
        });
        assert_eq!(session.state.result_count(), 1);
        assert_eq!(session.state.results().next().unwrap().event_name, "fresh");
    }

    #[tokio::test]
    async fn updates_for_other_apps_are_ignored() {
        let mut session = session();
        session.handle(Inbound::Push(ChannelMessage::ValidationUpdate {
            app_id: "someone-else".to_string(),
            log: Box::new(user_event("login")),
        }));
        assert_eq!(session.state.result_count(), 0);

        session.handle(Inbound::Push(ChannelMessage::ValidationUpdate {
            app_id: "app-7".to_string(),
            log: Box::new(user_event("login")),
        }));
        assert_eq!(session.state.result_count(), 1);
    }

    #[tokio::test]
    async fn delete_requires_confirmation_and_clears_on_success() {
        let mut session = session();
        let seq = session.page_seq.next();
        session.handle(Inbound::PageLoaded {
            seq,
            page: 1,
            outcome: Ok(page(&["login"])),
        });
        assert_eq!(session.state.result_count(), 1);

        session.handle(Inbound::Command(Command::DeleteAll { confirmed: false }));
        assert_eq!(session.state.result_count(), 1);
        assert!(session.surface.alerts.last().unwrap().contains("confirm"));

        session.handle(Inbound::DeleteFinished {
            outcome: Ok(DeleteOutcome {
                success: true,
                deleted: 1,
                error: None,
            }),
        });
        assert_eq!(session.state.result_count(), 0);
        assert_eq!(session.state.user_events(), 0);
    }

    #[tokio::test]
    async fn failed_delete_leaves_state_untouched_and_surfaces_detail() {
        let mut session = session();
        let seq = session.page_seq.next();
        session.handle(Inbound::PageLoaded {
            seq,
            page: 1,
            outcome: Ok(page(&["login"])),
        });

        session.handle(Inbound::DeleteFinished {
            outcome: Ok(DeleteOutcome {
                success: false,
                deleted: 0,
                error: Some("database locked".to_string()),
            }),
        });
        assert_eq!(session.state.result_count(), 1);
        assert_eq!(session.surface.alerts.last().unwrap(), "database locked");
    }

    #[tokio::test]
    async fn channel_status_reaches_the_view() {
        let mut session = session();
        session.handle(Inbound::Channel(ChannelStatus::Connected));
        assert_eq!(session.state.channel(), ChannelStatus::Connected);
        session.handle(Inbound::Channel(ChannelStatus::Disconnected));
        assert_eq!(session.state.channel(), ChannelStatus::Disconnected);
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let mut session = session();
        assert!(session.handle(Inbound::Command(Command::LoadMore)));
        assert!(!session.handle(Inbound::Command(Command::Quit)));
    }
}
