use crate::error::{Error, Result};

/// 顯示後端回報的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    ToggleFullscreen,
    MouseDown(MouseButton),
    MouseUp(MouseButton),
}

/// 腳本看到的按鍵代碼: 1 = 左鍵, 2 = 右鍵, 3 = 中鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(MouseButton::Left),
            2 => Ok(MouseButton::Right),
            3 => Ok(MouseButton::Middle),
            _ => Err(Error::Domain(format!("無效的滑鼠按鍵: {}", code))),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 3,
        }
    }
}

/// 實體按鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// 字母、數字、空白與美式鍵盤標點 (皆為小寫)
    Char(char),
    Enter,
    Shift,
    Control,
    Alt,
    Escape,
    Back,
    Tab,
    Left,
    Right,
    Up,
    Down,
}

/// 單一字元可對應的標點鍵
const PUNCTUATION: &str = " -=[];',./\\`";

impl KeyCode {
    /// 單一字元轉小寫後對應實體按鍵；多字元名稱必須是固定的列舉之一
    pub fn parse(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || PUNCTUATION.contains(c) {
                return Ok(KeyCode::Char(c));
            }
            return Err(Error::Domain(format!("無法辨識的按鍵: {}", name)));
        }

        match name {
            "enter" => Ok(KeyCode::Enter),
            "shift" => Ok(KeyCode::Shift),
            "control" => Ok(KeyCode::Control),
            "alt" => Ok(KeyCode::Alt),
            "escape" => Ok(KeyCode::Escape),
            "back" => Ok(KeyCode::Back),
            "tab" => Ok(KeyCode::Tab),
            "left" => Ok(KeyCode::Left),
            "right" => Ok(KeyCode::Right),
            "up" => Ok(KeyCode::Up),
            "down" => Ok(KeyCode::Down),
            _ => Err(Error::Domain(format!("無法辨識的按鍵: {}", name))),
        }
    }
}
