// 雙緩衝幀緩衝區與繪圖指令
//
// 所有繪圖都寫入 back，座標逐像素裁切到 [0, W) × [0, H)，
// 超出 1..=512 的代碼不寫入。

pub mod texture;

pub use texture::Texture;

use log::warn;

use crate::error::Result;
use crate::palette::{self, Rgba};

#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    front: Vec<u32>,
    back: Vec<u32>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new(0, 0)
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            front: vec![0; width * height],
            back: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 最近一次完成的幀
    pub fn front(&self) -> &[u32] {
        &self.front
    }

    /// 目前正在繪製的幀
    pub fn back(&self) -> &[u32] {
        &self.back
    }

    /// 交換前後緩衝並清空新的 back
    pub fn swap_and_clear(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.back.fill(0);
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64 {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    #[inline]
    fn put(&mut self, x: i64, y: i64, packed: u32) {
        if let Some(i) = self.index(x, y) {
            self.back[i] = packed;
        }
    }

    pub fn pixel(&mut self, x: i64, y: i64, code: i64) {
        if !palette::is_drawable(code) {
            return;
        }
        self.put(x, y, palette::decode_packed(code));
    }

    /// Bresenham 直線，兩端點皆包含
    pub fn line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, code: i64) {
        if !palette::is_drawable(code) {
            return;
        }
        let packed = palette::decode_packed(code);
        let (width, height) = (self.width, self.height);
        trace_line(width, height, (x1, y1), (x2, y2), |x, y| self.put(x, y, packed));
    }

    /// 實心圓: (x-cx)² + (y-cy)² ≤ r²
    pub fn circle(&mut self, cx: i64, cy: i64, r: i64, code: i64) {
        if r < 0 || !palette::is_drawable(code) || self.width == 0 || self.height == 0 {
            return;
        }
        let packed = palette::decode_packed(code);

        // 只掃描外接正方形與緩衝區的交集；以 i128 計算避免溢位
        let (cx, cy, r) = (cx as i128, cy as i128, r as i128);
        let x_min = (cx - r).max(0);
        let x_max = (cx + r).min(self.width as i128 - 1);
        let y_min = (cy - r).max(0);
        let y_max = (cy + r).min(self.height as i128 - 1);
        let r2 = r * r;

        for y in y_min..=y_max {
            let dy = y - cy;
            for x in x_min..=x_max {
                let dx = x - cx;
                if dx * dx + dy * dy <= r2 {
                    self.put(x as i64, y as i64, packed);
                }
            }
        }
    }

    /// 以 (x_off, y_off) 為左上角貼上材質
    pub fn rect(&mut self, texture: &Texture, x_off: i64, y_off: i64) {
        for ty in 0..texture.height() {
            for tx in 0..texture.width() {
                let code = texture.codes()[ty * texture.width() + tx];
                if !palette::is_drawable(code) {
                    continue;
                }
                // 目的座標溢位時必在緩衝區外
                let x = x_off.checked_add(tx as i64);
                let y = y_off.checked_add(ty as i64);
                if let (Some(x), Some(y)) = (x, y) {
                    self.put(x, y, palette::decode_packed(code));
                }
            }
        }
    }

    /// 以列優先順序對每個像素呼叫 shader；失敗的像素寫入不透明黑色
    pub fn shade<F>(&mut self, mut shader: F)
    where
        F: FnMut(i64, i64) -> Result<i64>,
    {
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                match shader(x as i64, y as i64) {
                    Ok(code) if palette::is_drawable(code) => {
                        self.back[i] = palette::decode_packed(code);
                    }
                    // 與其他繪圖指令相同的略過規則，不寫入黑色
                    Ok(_) => {}
                    Err(e) => {
                        warn!("shader 於 ({}, {}) 失敗: {}", x, y, e);
                        self.back[i] = Rgba::OPAQUE_BLACK.pack();
                    }
                }
            }
        }
    }
}

/// 走訪 (x1, y1)-(x2, y2) 的 Bresenham 像素，只回報主軸座標落在 width × height 內的那一段
///
/// 主軸每一步都前進一格，因此可直接推算進入緩衝區那一步的誤差項，
/// 得到的像素集合與從端點逐步走訪相同，步數不超過主軸方向的緩衝區長度。
fn trace_line<F>(width: usize, height: usize, p1: (i64, i64), p2: (i64, i64), mut plot: F)
where
    F: FnMut(i64, i64),
{
    // 固定從字典序較小的端點開始，交換端點得到相同的像素集合
    let (p1, p2) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };

    // 以 i128 計算，任意 i64 端點都不會溢位
    let (x1, y1) = (p1.0 as i128, p1.1 as i128);
    let (x2, y2) = (p2.0 as i128, p2.1 as i128);
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx: i128 = if x1 < x2 { 1 } else { -1 };
    let sy: i128 = if y1 < y2 { 1 } else { -1 };

    let x_major = dx >= dy;
    let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };
    let (start, step, len) = if x_major {
        (x1, sx, width as i128)
    } else {
        (y1, sy, height as i128)
    };

    // 主軸座標在 [0, len) 內的步數區間
    let (k_lo, k_hi) = if step > 0 {
        (-start, len - 1 - start)
    } else {
        (start - (len - 1), start)
    };
    let (k_lo, k_hi) = (k_lo.max(0), k_hi.min(major));
    if k_lo > k_hi {
        return;
    }

    // 第 k 步時次軸已走 round_half_down(k * minor / major) 步
    let product = k_lo as u128 * minor as u128;
    let (q, r) = if major == 0 {
        (0, 0)
    } else {
        (product / major as u128, product % major as u128)
    };
    let carry = (2 * r > major as u128) as i128;
    let (q, r) = (q as i128, r as i128);
    let minor_steps = q + carry;

    let (mut x, mut y, mut err) = if x_major {
        (x1 + sx * k_lo, y1 + sy * minor_steps, dx - dy - r + carry * dx)
    } else {
        (x1 + sx * minor_steps, y1 + sy * k_lo, dx - dy + r - carry * dy)
    };

    for _ in k_lo..=k_hi {
        // 主軸在範圍內，次軸介於兩端點之間，皆可轉回 i64
        plot(x as i64, y as i64);
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}
