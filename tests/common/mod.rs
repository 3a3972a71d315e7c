// 整合測試共用: 以 HeadlessDisplay 與 ManualClock 啟動主控台
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use plf_console::config::{ConfigBuilder, SystemConfig};
use plf_console::interface::{Display, HeadlessDisplay, HeadlessHandle};
use plf_console::palette::{self, Rgba};
use plf_console::timer::Clock;
use plf_console::{Console, ManualClock, Result};
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub script: PathBuf,
    pub rom: PathBuf,
}

impl Fixture {
    pub fn new(source: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("main.lua");
        std::fs::write(&script, source).unwrap();
        let rom = dir.path().join("rom.rom");
        Self { dir, script, rom }
    }

    pub fn with_rom(self, bytes: &[u8]) -> Self {
        std::fs::write(&self.rom, bytes).unwrap();
        self
    }

    pub fn boot_with<C: Clock>(&self, clock: C) -> Result<(Console<C>, HeadlessHandle)> {
        let config = ConfigBuilder::new()
            .system_config(SystemConfig {
                script_path: self.script.clone(),
                rom_path: self.rom.clone(),
                seed: Some(1),
                ..SystemConfig::default()
            })
            .build();
        let slot = Rc::new(RefCell::new(None));
        let sink = slot.clone();
        let console = Console::boot(config, clock, move |spec| {
            let display = HeadlessDisplay::new(spec);
            *sink.borrow_mut() = Some(display.handle());
            Ok(Box::new(display) as Box<dyn Display>)
        })?;
        let handle = slot.borrow_mut().take().unwrap();
        Ok((console, handle))
    }

    pub fn boot(&self) -> Result<(Console<ManualClock>, HeadlessHandle)> {
        self.boot_with(ManualClock::new())
    }
}

pub fn rgba(code: i64) -> u32 {
    palette::decode_packed(code)
}

pub const OPAQUE_BLACK: u32 = Rgba::OPAQUE_BLACK.pack();
