use std::sync::atomic::{AtomicU64, Ordering};

use crate::IngestReport;

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_requests: AtomicU64,
    ingest_ignored: AtomicU64,
    ingest_lines: AtomicU64,
    events_inserted: AtomicU64,
    events_duplicate: AtomicU64,
    lines_skipped: AtomicU64,
    ingest_errors: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self, report: &IngestReport) {
        self.ingest_requests.fetch_add(1, Ordering::Relaxed);
        self.ingest_lines
            .fetch_add(report.lines as u64, Ordering::Relaxed);
        self.events_inserted
            .fetch_add(report.inserted as u64, Ordering::Relaxed);
        self.events_duplicate
            .fetch_add(report.duplicates as u64, Ordering::Relaxed);
        self.lines_skipped
            .fetch_add(report.skipped as u64, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ingest_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest_error(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.ingest_requests.load(Ordering::Relaxed);
        let ignored = self.ingest_ignored.load(Ordering::Relaxed);
        let lines = self.ingest_lines.load(Ordering::Relaxed);
        let inserted = self.events_inserted.load(Ordering::Relaxed);
        let duplicates = self.events_duplicate.load(Ordering::Relaxed);
        let skipped = self.lines_skipped.load(Ordering::Relaxed);
        let errors = self.ingest_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE modlog_ingest_requests_total counter\n\
modlog_ingest_requests_total {}\n\
# TYPE modlog_ingest_ignored_total counter\n\
modlog_ingest_ignored_total {}\n\
# TYPE modlog_ingest_lines_total counter\n\
modlog_ingest_lines_total {}\n\
# TYPE modlog_events_inserted_total counter\n\
modlog_events_inserted_total {}\n\
# TYPE modlog_events_duplicate_total counter\n\
modlog_events_duplicate_total {}\n\
# TYPE modlog_lines_skipped_total counter\n\
modlog_lines_skipped_total {}\n\
# TYPE modlog_ingest_errors_total counter\n\
modlog_ingest_errors_total {}\n",
            requests, ignored, lines, inserted, duplicates, skipped, errors
        )
    }
}
