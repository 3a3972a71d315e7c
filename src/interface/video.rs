// 保持長寬比的縮放 (letterbox) 與座標換算

use crate::palette::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// 視窗內保持緩衝區長寬比的目標矩形，置中
pub fn letterbox(buffer_w: usize, buffer_h: usize, window_w: usize, window_h: usize) -> Rect {
    if buffer_w == 0 || buffer_h == 0 || window_w == 0 || window_h == 0 {
        return Rect::default();
    }
    let buffer_aspect = buffer_w as f64 / buffer_h as f64;
    let window_aspect = window_w as f64 / window_h as f64;

    if window_aspect > buffer_aspect {
        let w = ((window_h as f64 * buffer_aspect) as usize).min(window_w);
        Rect {
            x: (window_w - w) / 2,
            y: 0,
            w,
            h: window_h,
        }
    } else {
        let h = ((window_w as f64 / buffer_aspect) as usize).min(window_h);
        Rect {
            x: 0,
            y: (window_h - h) / 2,
            w: window_w,
            h,
        }
    }
}

/// 視窗座標 → 緩衝區座標，落在目標矩形外時為 None
pub fn window_to_buffer(
    mouse: (f32, f32),
    dest: Rect,
    buffer_w: usize,
    buffer_h: usize,
) -> Option<(i64, i64)> {
    if dest.w == 0 || dest.h == 0 {
        return None;
    }
    let scale_x = buffer_w as f64 / dest.w as f64;
    let scale_y = buffer_h as f64 / dest.h as f64;
    let bx = ((mouse.0 as f64 - dest.x as f64) * scale_x).floor() as i64;
    let by = ((mouse.1 as f64 - dest.y as f64) * scale_y).floor() as i64;

    if bx < 0 || by < 0 || bx >= buffer_w as i64 || by >= buffer_h as i64 {
        None
    } else {
        Some((bx, by))
    }
}

/// 以最近鄰取樣把 RGBA 幀縮放進視窗大小的 0RGB 表面，dest 以外填黑
pub fn blit_letterboxed(
    frame: &[u32],
    frame_w: usize,
    frame_h: usize,
    surface: &mut [u32],
    surface_w: usize,
    dest: Rect,
) {
    surface.fill(0);
    if frame_w == 0 || frame_h == 0 || dest.w == 0 || dest.h == 0 || surface_w == 0 {
        return;
    }
    let surface_h = surface.len() / surface_w;

    for dy in 0..dest.h {
        let sy = dest.y + dy;
        if sy >= surface_h {
            break;
        }
        let fy = dy * frame_h / dest.h;
        let src_row = &frame[fy * frame_w..(fy + 1) * frame_w];
        let dst_row = &mut surface[sy * surface_w..(sy + 1) * surface_w];
        for dx in 0..dest.w {
            let sx = dest.x + dx;
            if sx >= surface_w {
                break;
            }
            let fx = dx * frame_w / dest.w;
            dst_row[sx] = Rgba::unpack(src_row[fx]).to_0rgb();
        }
    }
}
