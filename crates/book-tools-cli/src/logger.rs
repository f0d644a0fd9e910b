use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

/// Timestamped logger writing to stderr, so stdout stays clean for results
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    /// `verbosity` counts `-v` flags: warn, info, debug, trace
    pub fn new(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Self { level }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        eprintln!(
            "{} {} {}: {}",
            Local::now().format("%H:%M:%S%.3f"),
            tag,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(StderrLogger::new(0).level, LevelFilter::Warn);
        assert_eq!(StderrLogger::new(1).level, LevelFilter::Info);
        assert_eq!(StderrLogger::new(2).level, LevelFilter::Debug);
        assert_eq!(StderrLogger::new(9).level, LevelFilter::Trace);
    }

    #[test]
    fn test_init_once() {
        StderrLogger::new(2).init().unwrap();
        assert_eq!(log::max_level(), LevelFilter::Debug);

        // A second logger is refused, and the error converts like any other
        let err: anyhow::Error = StderrLogger::new(0).init().unwrap_err().into();
        assert!(!err.to_string().is_empty());
    }
}
