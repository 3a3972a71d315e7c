pub mod system;
pub mod video;

pub use system::{LogLevel, SystemConfig};
pub use video::VideoConfig;

use crate::error::{Error, Result};

pub const DEFAULT_TITLE: &str = "PLF Window";
/// 腳本宣告的緩衝區像素上限 (4096 × 4096)
pub const MAX_BUFFER_PIXELS: i64 = 4096 * 4096;

/// 全局配置結構
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub video: VideoConfig,
    pub system: SystemConfig,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

/// 配置構建器
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    pub fn video_config(mut self, config: VideoConfig) -> Self {
        self.config.video = config;
        self
    }

    pub fn system_config(mut self, config: SystemConfig) -> Self {
        self.config.system = config;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// 腳本在啟動時宣告的全域變數
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptConfig {
    pub width: usize,
    pub height: usize,
    /// None 或 ≤ 0 表示不限制幀率
    pub fps: Option<f64>,
    pub title: String,
    pub no_console: bool,
    pub suppress: bool,
}

impl ScriptConfig {
    pub fn new(width: i64, height: i64) -> Result<Self> {
        if width <= 0 {
            return Err(Error::Config(format!("'width' 必須大於 0，實際為 {}", width)));
        }
        if height <= 0 {
            return Err(Error::Config(format!("'height' 必須大於 0，實際為 {}", height)));
        }
        if !matches!(width.checked_mul(height), Some(p) if p <= MAX_BUFFER_PIXELS) {
            return Err(Error::Config(format!(
                "緩衝區 {}x{} 超過 {} 像素上限",
                width, height, MAX_BUFFER_PIXELS
            )));
        }
        Ok(Self {
            width: width as usize,
            height: height as usize,
            fps: None,
            title: DEFAULT_TITLE.to_string(),
            no_console: false,
            suppress: false,
        })
    }

    /// 是否要靜音診斷訊息
    pub fn quiet(&self) -> bool {
        self.suppress || self.no_console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn builder_overrides_sections() {
        let config = ConfigBuilder::new()
            .system_config(SystemConfig {
                script_path: PathBuf::from("game.lua"),
                ..SystemConfig::default()
            })
            .build();
        assert_eq!(config.system.script_path, PathBuf::from("game.lua"));
        assert_eq!(config.system.rom_path, PathBuf::from("rom.rom"));
        assert_eq!(config.video.max_window_dim, 540);
    }

    #[test]
    fn script_config_requires_positive_dimensions() {
        assert!(matches!(ScriptConfig::new(0, 10), Err(Error::Config(_))));
        assert!(matches!(ScriptConfig::new(10, -1), Err(Error::Config(_))));
        assert!(matches!(ScriptConfig::new(i64::MAX, 2), Err(Error::Config(_))));
        assert!(matches!(ScriptConfig::new(8192, 8192), Err(Error::Config(_))));
        assert!(ScriptConfig::new(4096, 4096).is_ok());
        let config = ScriptConfig::new(4, 2).unwrap();
        assert_eq!(config.title, "PLF Window");
        assert!(!config.quiet());
    }
}
