// 無視窗的顯示後端，測試與批次執行用

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use super::input::{InputEvent, KeyCode, MouseButton};
use super::video::Rect;
use super::{Display, WindowSpec};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct HeadlessState {
    pub events: VecDeque<InputEvent>,
    pub window_size: (usize, usize),
    pub windowed_size: (usize, usize),
    pub fullscreen_size: (usize, usize),
    pub mouse: Option<(f32, f32)>,
    pub buttons: HashSet<MouseButton>,
    pub keys: HashSet<KeyCode>,
    pub title: String,
    pub fullscreen: bool,
    pub cursor_visible: bool,
    pub centered: u32,
    pub messages: Vec<(String, String)>,
    /// 最後一次 present 的 RGBA 幀
    pub frame: Vec<u32>,
    pub frame_size: (usize, usize),
    pub dest: Rect,
    pub presents: u64,
}

/// 由外部操控 HeadlessDisplay 的共享把手
#[derive(Debug, Clone)]
pub struct HeadlessHandle(Rc<RefCell<HeadlessState>>);

impl HeadlessHandle {
    pub fn push_event(&self, event: InputEvent) {
        self.0.borrow_mut().events.push_back(event);
    }

    /// 按鍵狀態與事件一起更新
    pub fn press(&self, button: MouseButton) {
        let mut state = self.0.borrow_mut();
        state.buttons.insert(button);
        state.events.push_back(InputEvent::MouseDown(button));
    }

    pub fn release(&self, button: MouseButton) {
        let mut state = self.0.borrow_mut();
        state.buttons.remove(&button);
        state.events.push_back(InputEvent::MouseUp(button));
    }

    pub fn move_mouse(&self, position: Option<(f32, f32)>) {
        self.0.borrow_mut().mouse = position;
    }

    pub fn set_key(&self, key: KeyCode, down: bool) {
        let mut state = self.0.borrow_mut();
        if down {
            state.keys.insert(key);
        } else {
            state.keys.remove(&key);
        }
    }

    pub fn resize(&self, width: usize, height: usize) {
        self.0.borrow_mut().window_size = (width, height);
    }

    pub fn state(&self) -> std::cell::Ref<'_, HeadlessState> {
        self.0.borrow()
    }

    /// 最後一幀中 (x, y) 的 RGBA 值
    pub fn frame_pixel(&self, x: usize, y: usize) -> Option<u32> {
        let state = self.0.borrow();
        let (w, h) = state.frame_size;
        if x >= w || y >= h {
            return None;
        }
        state.frame.get(y * w + x).copied()
    }
}

#[derive(Debug)]
pub struct HeadlessDisplay {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDisplay {
    pub fn new(spec: &WindowSpec) -> Self {
        let state = HeadlessState {
            window_size: (spec.width, spec.height),
            windowed_size: (spec.width, spec.height),
            fullscreen_size: spec.fullscreen_size,
            title: spec.title.clone(),
            cursor_visible: true,
            ..HeadlessState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle(Rc::clone(&self.state))
    }
}

impl Display for HeadlessDisplay {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.state.borrow_mut().events.drain(..).collect()
    }

    fn window_size(&self) -> (usize, usize) {
        self.state.borrow().window_size
    }

    fn present(&mut self, frame: &[u32], width: usize, height: usize, dest: Rect) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.frame.clear();
        state.frame.extend_from_slice(frame);
        state.frame_size = (width, height);
        state.dest = dest;
        state.presents += 1;
        Ok(())
    }

    fn mouse_position(&self) -> Option<(f32, f32)> {
        self.state.borrow().mouse
    }

    fn mouse_down(&self, button: MouseButton) -> bool {
        self.state.borrow().buttons.contains(&button)
    }

    fn key_down(&self, key: KeyCode) -> bool {
        self.state.borrow().keys.contains(&key)
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.state.borrow_mut().cursor_visible = visible;
    }

    fn center_cursor(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let (w, h) = state.window_size;
        state.mouse = Some(((w / 2) as f32, (h / 2) as f32));
        state.centered += 1;
        Ok(())
    }

    fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().title = title.to_string();
    }

    fn is_fullscreen(&self) -> bool {
        self.state.borrow().fullscreen
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fullscreen == fullscreen {
            return Ok(());
        }
        state.window_size = if fullscreen {
            state.fullscreen_size
        } else {
            state.windowed_size
        };
        state.fullscreen = fullscreen;
        Ok(())
    }

    fn show_message(&mut self, title: &str, text: &str) {
        self.state
            .borrow_mut()
            .messages
            .push((title.to_string(), text.to_string()));
    }
}
