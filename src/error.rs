use crate::rom::RomError;
use std::io;
use thiserror::Error;

/// 主控台的錯誤類型
#[derive(Error, Debug)]
pub enum Error {
    /// 啟動時讀取的腳本全域變數缺失或無效
    #[error("設定錯誤: {0}")]
    Config(String),

    /// 腳本載入失敗或進入點拋出錯誤
    #[error("腳本錯誤: {0}")]
    Script(String),

    /// shader 在單一像素上失敗
    #[error("繪圖錯誤: {0}")]
    Draw(String),

    /// ROM 相關錯誤
    #[error("ROM 錯誤: {0}")]
    Rom(#[from] RomError),

    /// 超出範圍的調色盤索引、無效的滑鼠按鍵或未知的鍵名
    #[error("參數超出範圍: {0}")]
    Domain(String),

    /// 視窗建立或像素上傳失敗
    #[error("顯示錯誤: {0}")]
    Display(String),

    /// IO 錯誤
    #[error("IO 錯誤: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// 在主迴圈開始前發生時是否必須終止程式
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Display(_) | Error::Script(_) | Error::Io(_)
        )
    }
}

impl From<mlua::Error> for Error {
    fn from(err: mlua::Error) -> Self {
        Error::Script(err.to_string())
    }
}

impl From<minifb::Error> for Error {
    fn from(err: minifb::Error) -> Self {
        Error::Display(err.to_string())
    }
}

/// 主控台結果類型
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_fatality_follows_error_kind() {
        assert!(Error::Config("width".into()).is_fatal_at_startup());
        assert!(Error::Display("no window".into()).is_fatal_at_startup());
        assert!(!Error::Domain("button 9".into()).is_fatal_at_startup());
        assert!(!Error::Rom(RomError::BadMagic).is_fatal_at_startup());
    }

    #[test]
    fn rom_errors_convert_into_crate_errors() {
        let err: Error = RomError::NotFound("test".into()).into();
        assert!(matches!(err, Error::Rom(RomError::NotFound(ref n)) if n == "test"));
    }
}
