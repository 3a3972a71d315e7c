use crate::error::Result;
use crate::palette;

/// 調色盤代碼組成的矩形陣列 (row-major)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Texture {
    width: usize,
    height: usize,
    codes: Vec<i64>,
}

impl Texture {
    /// codes 長度必須為 width * height，多餘截斷、不足補 0 (略過)
    pub fn from_codes(width: usize, height: usize, mut codes: Vec<i64>) -> Self {
        codes.resize(width * height, 0);
        Self {
            width,
            height,
            codes,
        }
    }

    /// 由逐列資料建立，長短不一的列以 0 補齊到最長的寬度
    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut codes = Vec::with_capacity(width * height);
        for row in rows {
            codes.extend_from_slice(row);
            codes.extend(std::iter::repeat(0).take(width - row.len()));
        }
        Self {
            width,
            height,
            codes,
        }
    }

    /// 對每個 (x, y) 呼叫 shader；失敗的像素以黑色代碼取代
    pub fn from_shader<F>(width: usize, height: usize, mut shader: F) -> Self
    where
        F: FnMut(i64, i64) -> Result<i64>,
    {
        let mut codes = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let code = match shader(x as i64, y as i64) {
                    Ok(code) => code,
                    Err(e) => {
                        log::warn!("shader 於 ({}, {}) 失敗: {}", x, y, e);
                        palette::BLACK
                    }
                };
                codes.push(code);
            }
        }
        Self {
            width,
            height,
            codes,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i64> {
        if x < self.width && y < self.height {
            Some(self.codes[y * self.width + x])
        } else {
            None
        }
    }

    pub fn codes(&self) -> &[i64] {
        &self.codes
    }

    pub fn rows(&self) -> Vec<Vec<i64>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.codes.chunks(self.width).map(<[i64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn ragged_rows_are_padded_with_skip_code() {
        let texture = Texture::from_rows(&[vec![1, 2, 3], vec![4]]);
        assert_eq!(texture.width(), 3);
        assert_eq!(texture.height(), 2);
        assert_eq!(texture.rows(), vec![vec![1, 2, 3], vec![4, 0, 0]]);
        assert_eq!(texture.get(0, 1), Some(4));
        assert_eq!(texture.get(3, 0), None);
    }

    #[test]
    fn shader_failures_become_black() {
        let texture = Texture::from_shader(3, 2, |x, y| {
            if x == 1 && y == 1 {
                Err(Error::Draw("boom".into()))
            } else {
                Ok(x + y * 10 + 2)
            }
        });
        assert_eq!(texture.rows(), vec![vec![2, 3, 4], vec![12, palette::BLACK, 14]]);
    }

    #[test]
    fn empty_textures() {
        assert_eq!(Texture::from_rows(&[]).rows(), Vec::<Vec<i64>>::new());
        assert_eq!(Texture::from_shader(0, 2, |_, _| Ok(1)).rows(), vec![vec![], vec![]]);
    }
}
