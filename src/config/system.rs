use std::path::PathBuf;

use log::LevelFilter;

pub const DEFAULT_SCRIPT: &str = "main.lua";
pub const DEFAULT_ROM: &str = "rom.rom";

/// 系統相關設定
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub script_path: PathBuf,
    pub rom_path: PathBuf,
    pub log_level: LogLevel,
    /// util.random 的種子；None 時取自作業系統
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            script_path: PathBuf::from(DEFAULT_SCRIPT),
            rom_path: PathBuf::from(DEFAULT_ROM),
            log_level: LogLevel::Info,
            seed: None,
        }
    }
}
