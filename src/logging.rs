//! `log` backend that writes to the browser console.
//!
//! Records map onto the matching `console.*` method so the devtools level
//! filter keeps working.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

static LOGGER: ConsoleLogger = ConsoleLogger;

pub struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug => console::log_1(&line),
            Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

/// Install the console logger. Calling it again only adjusts the level.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("console logger already installed");
    }
    log::set_max_level(level);
}
