// 單調時鐘與幀率控制

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// 主迴圈使用的時間來源
pub trait Clock {
    /// 自時鐘建立以來經過的時間
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// 只在 advance 或 sleep 時前進的時鐘；複本共用同一個時間
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    slept: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get().saturating_add(duration));
    }

    /// 累計睡眠時間
    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.slept.set(self.slept.get().saturating_add(duration));
    }
}

/// 幀結束時要睡多久；fps 缺少或 ≤ 0 時不限制
pub fn frame_delay(fps: Option<f64>, elapsed: Duration) -> Option<Duration> {
    let fps = fps.filter(|f| f.is_finite() && *f > 0.0)?;
    // 極小的 fps 使幀長超出 Duration 範圍，飽和到最大值
    let target = Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::MAX);
    Some(target.saturating_sub(elapsed))
}
