// 外部介面模組: 視窗、輸入與畫面輸出

pub mod headless;
pub mod input;
pub mod minifb_display;
pub mod video;

pub use headless::{HeadlessDisplay, HeadlessHandle};
pub use input::{InputEvent, KeyCode, MouseButton};
pub use minifb_display::MinifbDisplay;
pub use video::Rect;

use std::fmt::Debug;

use crate::error::Result;

/// 視窗建立參數
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub resizable: bool,
    pub fullscreen_size: (usize, usize),
}

/// 顯示後端: 擁有視窗、事件佇列與像素上傳路徑
pub trait Display: Debug {
    /// 取出自上次呼叫以來的所有事件
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// 視窗客戶區大小
    fn window_size(&self) -> (usize, usize);

    /// 上傳 RGBA (0xRRGGBBAA) 幀並縮放到 dest，dest 以外塗黑
    fn present(&mut self, frame: &[u32], width: usize, height: usize, dest: Rect) -> Result<()>;

    /// 滑鼠在視窗座標中的位置，不在視窗內時為 None
    fn mouse_position(&self) -> Option<(f32, f32)>;

    fn mouse_down(&self, button: MouseButton) -> bool;

    fn key_down(&self, key: KeyCode) -> bool;

    fn set_cursor_visible(&mut self, visible: bool);

    /// 將游標移到視窗中央
    fn center_cursor(&mut self) -> Result<()>;

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);

    fn is_fullscreen(&self) -> bool;

    /// 冪等: 已是目標狀態時不做任何事
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()>;

    fn show_message(&mut self, title: &str, text: &str);
}
