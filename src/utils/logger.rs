use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::LogLevel;

/// 寫到 stderr 的日誌後端；腳本設定 `suppress` 或 `noConsole` 後靜音
#[derive(Debug)]
pub struct ConsoleLogger {
    suppressed: AtomicBool,
    max_level: AtomicUsize,
}

static LOGGER: ConsoleLogger = ConsoleLogger::new();

impl ConsoleLogger {
    pub const fn new() -> Self {
        Self {
            suppressed: AtomicBool::new(false),
            max_level: AtomicUsize::new(LevelFilter::Info as usize),
        }
    }

    /// 安裝為全域 logger；重複呼叫只會更新等級
    pub fn init(level: LogLevel) {
        let filter = level.to_filter();
        LOGGER.max_level.store(filter as usize, Ordering::Relaxed);
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(filter);
        }
    }

    pub fn global() -> &'static ConsoleLogger {
        &LOGGER
    }

    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::Relaxed);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Relaxed)
    }

    fn level_enabled(&self, level: Level) -> bool {
        (level as usize) <= self.max_level.load(Ordering::Relaxed)
    }

    pub fn format_line(record: &Record) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        ConsoleLogger::new()
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        !self.is_suppressed() && self.level_enabled(metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", Self::format_line(record)).ok();
    }

    fn flush(&self) {
        std::io::stderr().flush().ok();
    }
}

/// 分離主控台視窗 (僅 Windows)
#[cfg(windows)]
pub fn detach_console() {
    #[link(name = "kernel32")]
    extern "system" {
        fn FreeConsole() -> i32;
    }
    // SAFETY: FreeConsole 沒有參數，失敗時只回傳 0
    unsafe {
        FreeConsole();
    }
}

#[cfg(not(windows))]
pub fn detach_console() {}
