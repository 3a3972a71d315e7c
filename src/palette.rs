// 調色盤編解碼
// 512 色，每個通道 3 位元 (8×8×8 色立方)

use crate::error::{Error, Result};

/// 調色盤代碼的合法範圍下限
pub const MIN_CODE: i64 = 1;
/// 調色盤代碼的合法範圍上限
pub const MAX_CODE: i64 = 512;
/// 通道索引上限
pub const MAX_CHANNEL: i64 = 7;
/// 每個通道索引對應的 8 位元步進
pub const CHANNEL_STEP: u8 = 36;
/// 不透明黑色的代碼 (encode(0, 0, 0))
pub const BLACK: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const OPAQUE_BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };

    /// 打包為 0xRRGGBBAA
    pub const fn pack(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    pub const fn unpack(value: u32) -> Rgba {
        Rgba {
            r: (value >> 24) as u8,
            g: (value >> 16) as u8,
            b: (value >> 8) as u8,
            a: value as u8,
        }
    }

    /// 轉為視窗表面使用的 0x00RRGGBB
    pub const fn to_0rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// 預先計算的 RGBA 打包值，索引為 code - 1
static PACKED: [u32; 512] = build_packed_table();

const fn build_packed_table() -> [u32; 512] {
    let mut table = [0u32; 512];
    let mut i = 0;
    while i < 512 {
        let rgba = Rgba {
            r: (i / 64) as u8 * CHANNEL_STEP,
            g: ((i % 64) / 8) as u8 * CHANNEL_STEP,
            b: (i % 8) as u8 * CHANNEL_STEP,
            a: 255,
        };
        table[i] = rgba.pack();
        i += 1;
    }
    table
}

/// 代碼是否會被繪圖指令寫入 (其餘視為透明略過)
pub fn is_drawable(code: i64) -> bool {
    (MIN_CODE..=MAX_CODE).contains(&code)
}

fn channel_in_range(k: i64) -> bool {
    (0..=MAX_CHANNEL).contains(&k)
}

/// 通道索引 → 代碼
pub fn encode(r: i64, g: i64, b: i64) -> Result<i64> {
    if !channel_in_range(r) || !channel_in_range(g) || !channel_in_range(b) {
        return Err(Error::Domain(format!(
            "RGB 索引必須介於 0 到 7 之間: ({}, {}, {})",
            r, g, b
        )));
    }
    Ok(64 * r + 8 * g + b + 1)
}

/// 代碼 → 通道索引，超出範圍時回傳 None
pub fn channels(code: i64) -> Option<(u8, u8, u8)> {
    if !is_drawable(code) {
        return None;
    }
    let value = code - 1;
    Some(((value / 64) as u8, ((value % 64) / 8) as u8, (value % 8) as u8))
}

/// 代碼 → RGBA，超出範圍時為不透明黑色
pub fn decode(code: i64) -> Rgba {
    if is_drawable(code) {
        Rgba::unpack(PACKED[(code - 1) as usize])
    } else {
        Rgba::OPAQUE_BLACK
    }
}

/// 與 decode 相同，但直接回傳打包值
pub fn decode_packed(code: i64) -> u32 {
    if is_drawable(code) {
        PACKED[(code - 1) as usize]
    } else {
        Rgba::OPAQUE_BLACK.pack()
    }
}

pub fn rgb(r: i64, g: i64, b: i64) -> Result<i64> {
    encode(r, g, b)
}

/// h, s, v 皆為 0..=7
pub fn hsv(h: i64, s: i64, v: i64) -> Result<i64> {
    if !channel_in_range(h) || !channel_in_range(s) || !channel_in_range(v) {
        return Err(Error::Domain(format!(
            "HSV 值必須介於 0 到 7 之間: ({}, {}, {})",
            h, s, v
        )));
    }

    let hue = h as f64 / 7.0 * 360.0;
    let saturation = s as f64 / 7.0;
    let value = v as f64 / 7.0;

    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    // f64::round 對 .5 採遠離零的捨入
    let to_index = |channel: f64| (((channel + m) * 7.0).round() as i64).clamp(0, MAX_CHANNEL);
    encode(to_index(r), to_index(g), to_index(b))
}

pub fn greyscale(code: i64) -> i64 {
    let rgba = decode(code);
    let y = (rgba.r as i64 + rgba.g as i64 + rgba.b as i64) / 3;
    let index = (y * 7 / 255).clamp(0, MAX_CHANNEL);
    // index 已在 0..=7 內
    64 * index + 8 * index + index + 1
}
