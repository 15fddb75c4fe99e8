use systemd_journal_logger::JournalLog;

/// Forwards to the journal, letting sojourn targets through at info/debug and
/// everything else at warn.
struct FilteredJournal {
    inner: JournalLog,
}

impl log::Log for FilteredJournal {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let target = metadata.target();
        if target.starts_with("sojourn") || target.starts_with("trip_check") {
            let max = if crate::debug_logging() {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            metadata.level() <= max
        } else {
            metadata.level() <= log::LevelFilter::Warn
        }
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the journal logger (`journalctl --user -t <identifier> -f`).
pub fn init_journal(identifier: &str, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let journal = JournalLog::new()?.with_syslog_identifier(identifier.to_string());

    crate::set_debug_logging(debug);

    log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
    // Global max must be Debug so debug records can pass once toggled on
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}
