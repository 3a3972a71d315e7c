// util 表的數值工具: distance / clamp / lerp / intersect

/// 左上角為 (x, y)，寬高往正方向延伸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (cx1, cy1) = self.center();
        let (cx2, cy2) = other.center();
        (cx2 - cx1).abs() < (self.w + other.w) / 2.0 && (cy2 - cy1).abs() < (self.h + other.h) / 2.0
    }
}

/// 分離兩個矩形所需的最小平移量 (mx1, my1, mx2, my2)
///
/// 沿重疊較小的軸分離，兩軸重疊相同時沿 Y 軸；沒有重疊時全為 0。
pub fn intersect(a: &Aabb, b: &Aabb) -> (f64, f64, f64, f64) {
    let (cx1, cy1) = a.center();
    let (cx2, cy2) = b.center();
    let dx = cx2 - cx1;
    let dy = cy2 - cy1;
    let hx = (a.w + b.w) / 2.0;
    let hy = (a.h + b.h) / 2.0;

    if dx.abs() >= hx || dy.abs() >= hy {
        return (0.0, 0.0, 0.0, 0.0);
    }

    let ox = hx - dx.abs();
    let oy = hy - dy.abs();

    // 矩形 1 往 -Δ 方向移動
    if ox < oy {
        let m = if dx > 0.0 { -ox } else { ox };
        (m, 0.0, -m, 0.0)
    } else {
        let m = if dy > 0.0 { -oy } else { oy };
        (0.0, m, 0.0, -m)
    }
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// 與 f64::clamp 不同，min > max 時不 panic: 先比下限再比上限
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + t * (end - start)
}
