use log::{error, info, warn};
use std::cell::Ref;
use std::path::Path;
use std::time::Duration;

use crate::config::{Config, ScriptConfig};
use crate::error::Result;
use crate::framebuffer::FrameBuffer;
use crate::interface::video::letterbox;
use crate::interface::{Display, InputEvent, WindowSpec};
use crate::script::{HostContext, ScriptHost};
use crate::timer::{frame_delay, Clock};
use crate::utils::logger::{self, ConsoleLogger};

/// 主控台核心: 腳本、幀緩衝區、顯示後端與主迴圈
pub struct Console<C: Clock> {
    host: ScriptHost,
    ctx: HostContext,
    script_config: ScriptConfig,
    clock: C,
    prev: Duration,
    frames: u64,
    last_error: Option<String>,
}

impl<C: Clock> Console<C> {
    /// 載入 config 指定的腳本、讀取腳本設定並開啟視窗
    pub fn boot<F>(config: Config, clock: C, open_display: F) -> Result<Self>
    where
        F: FnOnce(&WindowSpec) -> Result<Box<dyn Display>>,
    {
        let host = Self::create_host(&config)?;
        host.load(&config.system.script_path)?;
        info!("腳本載入完成: {}", config.system.script_path.display());
        Self::start(config, clock, host, open_display)
    }

    /// 直接由原始碼啟動
    pub fn boot_source<F>(config: Config, clock: C, source: &str, open_display: F) -> Result<Self>
    where
        F: FnOnce(&WindowSpec) -> Result<Box<dyn Display>>,
    {
        let host = Self::create_host(&config)?;
        host.load_source(source, "main.lua")?;
        Self::start(config, clock, host, open_display)
    }

    fn create_host(config: &Config) -> Result<ScriptHost> {
        let ctx = HostContext::new(config.system.rom_path.clone(), config.system.seed);
        ScriptHost::new(ctx)
    }

    fn start<F>(config: Config, clock: C, host: ScriptHost, open_display: F) -> Result<Self>
    where
        F: FnOnce(&WindowSpec) -> Result<Box<dyn Display>>,
    {
        let script_config = host.read_config()?;
        if script_config.quiet() {
            ConsoleLogger::global().set_suppressed(true);
        }
        if script_config.no_console {
            logger::detach_console();
        }

        let ctx = host.context().clone();
        let (width, height) = (script_config.width, script_config.height);
        *ctx.framebuffer.borrow_mut() = FrameBuffer::new(width, height);

        let (window_w, window_h) = config.video.initial_window_size(width, height);
        let spec = WindowSpec {
            title: script_config.title.clone(),
            width: window_w,
            height: window_h,
            resizable: config.video.resizable,
            fullscreen_size: config.video.fullscreen_size,
        };
        let display = open_display(&spec)?;
        *ctx.display.borrow_mut() = Some(display);
        info!(
            "主控台啟動: 緩衝區 {}x{}，視窗 {}x{}",
            width, height, window_w, window_h
        );

        let prev = clock.now();
        Ok(Self {
            host,
            ctx,
            script_config,
            clock,
            prev,
            frames: 0,
            last_error: None,
        })
    }

    /// 執行一幀；回傳主迴圈是否應繼續
    pub fn tick(&mut self) -> bool {
        if !self.ctx.running.get() {
            return false;
        }

        let tick_start = self.clock.now();
        let dt = tick_start.saturating_sub(self.prev).as_secs_f64();
        self.prev = tick_start;

        let events = self
            .ctx
            .with_display(|display| display.poll_events())
            .unwrap_or_default();
        for event in events {
            self.handle_event(event);
        }

        if let Err(e) = self.host.call_update(dt) {
            self.report(e);
        }

        // update 失敗時仍交換，前一幀維持可見
        self.ctx.framebuffer.borrow_mut().swap_and_clear();
        self.present();
        self.frames += 1;

        let elapsed = self.clock.now().saturating_sub(tick_start);
        if let Some(delay) = frame_delay(self.host.read_fps(), elapsed) {
            if !delay.is_zero() {
                self.clock.sleep(delay);
            }
        }

        self.ctx.running.get()
    }

    /// 執行到腳本或視窗要求結束
    pub fn run(&mut self) -> Result<()> {
        while self.tick() {}
        info!("主控台結束，共 {} 幀", self.frames);
        Ok(())
    }

    fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit => self.ctx.running.set(false),
            InputEvent::ToggleFullscreen => {
                let result = self.ctx.with_display(|display| {
                    let fullscreen = !display.is_fullscreen();
                    display.set_fullscreen(fullscreen)
                });
                if let Some(Err(e)) = result {
                    warn!("切換全螢幕失敗: {}", e);
                }
            }
            InputEvent::MouseDown(button) => {
                if let Err(e) = self.host.call_mouse_down(button) {
                    self.report(e);
                }
            }
            InputEvent::MouseUp(button) => {
                if let Err(e) = self.host.call_mouse_up(button) {
                    self.report(e);
                }
            }
        }
    }

    fn present(&mut self) {
        let fb = self.ctx.framebuffer.borrow();
        let result = self.ctx.with_display(|display| {
            let (window_w, window_h) = display.window_size();
            let dest = letterbox(fb.width(), fb.height(), window_w, window_h);
            display.present(fb.front(), fb.width(), fb.height(), dest)
        });
        if let Some(Err(e)) = result {
            error!("畫面輸出失敗: {}", e);
        }
    }

    fn report(&mut self, err: crate::error::Error) {
        error!("{}", err);
        self.last_error = Some(err.to_string());
    }

    pub fn script_config(&self) -> &ScriptConfig {
        &self.script_config
    }

    pub fn framebuffer(&self) -> Ref<'_, FrameBuffer> {
        self.ctx.framebuffer.borrow()
    }

    pub fn host(&self) -> &ScriptHost {
        &self.host
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.ctx.running.get()
    }

    /// 最近一次 update / mouseDown / mouseUp 的錯誤
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn rom_path(&self) -> &Path {
        self.ctx.rom_path.as_path()
    }
}
