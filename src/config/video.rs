/// 視窗與顯示相關設定
#[derive(Debug, Clone)]
pub struct VideoConfig {
    /// 初始視窗較長邊的大小 (1080p 螢幕較短邊的一半)
    pub max_window_dim: usize,
    /// 全螢幕時的視窗大小
    pub fullscreen_size: (usize, usize),
    pub resizable: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            max_window_dim: 540,
            fullscreen_size: (1920, 1080),
            resizable: true,
        }
    }
}

impl VideoConfig {
    /// 依緩衝區長寬比計算初始視窗大小，較長邊為 max_window_dim
    pub fn initial_window_size(&self, buffer_width: usize, buffer_height: usize) -> (usize, usize) {
        let max = self.max_window_dim.max(1);
        if buffer_width == 0 || buffer_height == 0 {
            return (max, max);
        }
        let aspect = buffer_width as f64 / buffer_height as f64;
        let mut width = max;
        let mut height = (max as f64 / aspect) as usize;
        if height > max {
            height = max;
            width = (max as f64 * aspect) as usize;
        }
        (width.max(1), height.max(1))
    }
}
