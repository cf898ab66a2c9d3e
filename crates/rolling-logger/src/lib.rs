//! Rolling Logger
//!
//! `log` backend for the browser: every record goes to the devtools console
//! and into a fixed-size circular buffer that can be snapshotted later
//! (e.g. to attach the last few hundred lines to a bug report).

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

/// Circular buffer of formatted log lines
#[derive(Debug)]
pub struct RingBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a line, evicting the oldest one when full
    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Console + ring buffer logger
pub struct RollingLogger {
    app_name: String,
    level: LevelFilter,
    buffer: Mutex<RingBuffer>,
}

impl RollingLogger {
    pub fn new(app_name: &str, level: LevelFilter, capacity: usize) -> Self {
        Self {
            app_name: app_name.to_string(),
            level,
            buffer: Mutex::new(RingBuffer::new(capacity)),
        }
    }

    fn format(&self, record: &Record) -> String {
        format!(
            "[{}] {} {} {}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.app_name,
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        write_console(record.level(), &line);
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(line);
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// Error returned when the logger is installed twice
#[derive(Debug, thiserror::Error)]
#[error("rolling logger already initialized")]
pub struct AlreadyInitialized;

/// Install the global logger. Must be called once, before the app mounts.
pub fn init_logger(app_name: &str, level: LevelFilter, capacity: usize) -> Result<(), AlreadyInitialized> {
    if LOGGER.set(RollingLogger::new(app_name, level, capacity)).is_err() {
        return Err(AlreadyInitialized);
    }
    let logger = LOGGER.get().ok_or(AlreadyInitialized)?;
    log::set_logger(logger).map_err(|_| AlreadyInitialized)?;
    log::set_max_level(level);
    Ok(())
}

/// Snapshot of the buffered lines, oldest first
pub fn recent_lines() -> Vec<String> {
    LOGGER
        .get()
        .and_then(|logger| logger.buffer.lock().ok().map(|b| b.snapshot()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut buffer = RingBuffer::new(3);
        for i in 0..5 {
            buffer.push(format!("line {}", i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let mut buffer = RingBuffer::new(0);
        buffer.push("a".to_string());
        buffer.push("b".to_string());
        assert_eq!(buffer.snapshot(), vec!["b"]);
    }

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init_logger("Test", LevelFilter::Info, 4);
        let err = init_logger("Test", LevelFilter::Info, 4).unwrap_err();
        assert_eq!(err.to_string(), "rolling logger already initialized");
    }

    #[test]
    fn test_logger_filters_by_level() {
        let logger = RollingLogger::new("Test", LevelFilter::Warn, 10);
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("t")
                .args(format_args!("dropped"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .target("t")
                .args(format_args!("kept"))
                .build(),
        );
        let lines = logger.buffer.lock().unwrap().snapshot();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR t: kept"));
        assert!(lines[0].contains("Test"));
    }
}
