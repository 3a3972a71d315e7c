// minifb 桌面後端

use std::fmt::{self, Debug};

use log::{info, warn};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use super::input::{InputEvent, KeyCode, MouseButton};
use super::video::{blit_letterboxed, Rect};
use super::{Display, WindowSpec};
use crate::error::{Error, Result};

pub struct MinifbDisplay {
    window: Window,
    spec: WindowSpec,
    title: String,
    fullscreen: bool,
    /// 上一次 poll 時的按鍵狀態，用來產生按下/放開事件
    buttons_down: [bool; 3],
    /// 視窗大小的 0RGB 表面
    surface: Vec<u32>,
}

impl MinifbDisplay {
    pub fn open(spec: &WindowSpec) -> Result<Self> {
        let window = Self::create_window(&spec.title, spec.width, spec.height, false, spec.resizable)?;
        info!("視窗建立成功: {} ({}x{})", spec.title, spec.width, spec.height);
        Ok(Self {
            window,
            spec: spec.clone(),
            title: spec.title.clone(),
            fullscreen: false,
            buttons_down: [false; 3],
            surface: Vec::new(),
        })
    }

    fn create_window(
        title: &str,
        width: usize,
        height: usize,
        fullscreen: bool,
        resizable: bool,
    ) -> Result<Window> {
        let options = WindowOptions {
            borderless: fullscreen,
            topmost: fullscreen,
            resize: resizable && !fullscreen,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::Display(format!("視窗建立失敗: {}", e)))?;
        // 幀率由主迴圈控制
        #[allow(deprecated)]
        window.limit_update_rate(None);
        if fullscreen {
            window.set_position(0, 0);
        }
        Ok(window)
    }

    fn to_minifb_button(button: MouseButton) -> minifb::MouseButton {
        match button {
            MouseButton::Left => minifb::MouseButton::Left,
            MouseButton::Right => minifb::MouseButton::Right,
            MouseButton::Middle => minifb::MouseButton::Middle,
        }
    }

    fn char_key(c: char) -> Option<Key> {
        let key = match c {
            'a' => Key::A,
            'b' => Key::B,
            'c' => Key::C,
            'd' => Key::D,
            'e' => Key::E,
            'f' => Key::F,
            'g' => Key::G,
            'h' => Key::H,
            'i' => Key::I,
            'j' => Key::J,
            'k' => Key::K,
            'l' => Key::L,
            'm' => Key::M,
            'n' => Key::N,
            'o' => Key::O,
            'p' => Key::P,
            'q' => Key::Q,
            'r' => Key::R,
            's' => Key::S,
            't' => Key::T,
            'u' => Key::U,
            'v' => Key::V,
            'w' => Key::W,
            'x' => Key::X,
            'y' => Key::Y,
            'z' => Key::Z,
            '0' => Key::Key0,
            '1' => Key::Key1,
            '2' => Key::Key2,
            '3' => Key::Key3,
            '4' => Key::Key4,
            '5' => Key::Key5,
            '6' => Key::Key6,
            '7' => Key::Key7,
            '8' => Key::Key8,
            '9' => Key::Key9,
            ' ' => Key::Space,
            '-' => Key::Minus,
            '=' => Key::Equal,
            '[' => Key::LeftBracket,
            ']' => Key::RightBracket,
            ';' => Key::Semicolon,
            '\'' => Key::Apostrophe,
            ',' => Key::Comma,
            '.' => Key::Period,
            '/' => Key::Slash,
            '\\' => Key::Backslash,
            '`' => Key::Backquote,
            _ => return None,
        };
        Some(key)
    }

    /// 一個邏輯按鍵可能對應左右兩顆實體按鍵
    fn physical_keys(key: KeyCode) -> Vec<Key> {
        match key {
            KeyCode::Char(c) => Self::char_key(c).into_iter().collect(),
            KeyCode::Enter => vec![Key::Enter],
            KeyCode::Shift => vec![Key::LeftShift, Key::RightShift],
            KeyCode::Control => vec![Key::LeftCtrl, Key::RightCtrl],
            KeyCode::Alt => vec![Key::LeftAlt, Key::RightAlt],
            KeyCode::Escape => vec![Key::Escape],
            KeyCode::Back => vec![Key::Backspace],
            KeyCode::Tab => vec![Key::Tab],
            KeyCode::Left => vec![Key::Left],
            KeyCode::Right => vec![Key::Right],
            KeyCode::Up => vec![Key::Up],
            KeyCode::Down => vec![Key::Down],
        }
    }
}

impl Debug for MinifbDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinifbDisplay")
            .field("title", &self.title)
            .field("fullscreen", &self.fullscreen)
            .field("window", &"Window { ... }")
            .finish()
    }
}

impl Display for MinifbDisplay {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if !self.window.is_open() {
            events.push(InputEvent::Quit);
            return events;
        }

        if self.window.is_key_pressed(Key::F11, KeyRepeat::No) {
            events.push(InputEvent::ToggleFullscreen);
        }

        for (i, button) in MouseButton::ALL.into_iter().enumerate() {
            let down = self.window.get_mouse_down(Self::to_minifb_button(button));
            if down != self.buttons_down[i] {
                events.push(if down {
                    InputEvent::MouseDown(button)
                } else {
                    InputEvent::MouseUp(button)
                });
                self.buttons_down[i] = down;
            }
        }

        events
    }

    fn window_size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    fn present(&mut self, frame: &[u32], width: usize, height: usize, dest: Rect) -> Result<()> {
        let (window_w, window_h) = self.window.get_size();
        let (window_w, window_h) = (window_w.max(1), window_h.max(1));
        self.surface.resize(window_w * window_h, 0);
        blit_letterboxed(frame, width, height, &mut self.surface, window_w, dest);
        self.window
            .update_with_buffer(&self.surface, window_w, window_h)
            .map_err(|e| Error::Display(format!("像素上傳失敗: {}", e)))
    }

    fn mouse_position(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    fn mouse_down(&self, button: MouseButton) -> bool {
        self.window.get_mouse_down(Self::to_minifb_button(button))
    }

    fn key_down(&self, key: KeyCode) -> bool {
        Self::physical_keys(key)
            .into_iter()
            .any(|k| self.window.is_key_down(k))
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.window.set_cursor_visibility(visible);
    }

    fn center_cursor(&mut self) -> Result<()> {
        // minifb 不提供移動游標的 API
        warn!("此顯示後端不支援 mouse.center");
        Ok(())
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
        self.title = title.to_string();
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        if fullscreen == self.fullscreen {
            return Ok(());
        }
        // minifb 無法切換既有視窗的模式，只能重建
        let (width, height) = if fullscreen {
            self.spec.fullscreen_size
        } else {
            (self.spec.width, self.spec.height)
        };
        let window = Self::create_window(&self.title, width, height, fullscreen, self.spec.resizable)
            .map_err(|e| {
                warn!("切換全螢幕失敗: {}", e);
                e
            })?;
        self.window = window;
        self.fullscreen = fullscreen;
        self.buttons_down = [false; 3];
        Ok(())
    }

    fn show_message(&mut self, title: &str, text: &str) {
        info!("[{}] {}", title, text);
    }
}
