// ROM 影像容器
//
// 佈局 (little-endian):
//   0  4  magic "imag"
//   4  1  影像數量 N
//   5  -  N 筆影像記錄: 像素數 P (u32) | 名稱 (4 bytes) | 寬 (u32) | 高 (u32) | 2·P bytes 像素 (u16)

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::framebuffer::Texture;

pub const MAGIC: &[u8; 4] = b"imag";
/// 單張影像允許的最大像素數
pub const MAX_PIXELS: u32 = 1_000_000;
/// 一個 ROM 最多可容納的影像數
pub const MAX_IMAGES: usize = 255;
pub const NAME_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum RomError {
    #[error("ROM 標頭無效 (預期 \"imag\")")]
    BadMagic,

    #[error("影像大小與尺寸不符: {pixels} 像素, {width}x{height}")]
    SizeMismatch { pixels: u32, width: u32, height: u32 },

    #[error("影像過大無法載入: {0} 像素")]
    TooLarge(u32),

    #[error("無法為 {0} 像素配置記憶體")]
    AllocFailed(u32),

    #[error("ROM 中找不到影像 '{0}'")]
    NotFound(String),

    #[error("未提供 ROM 路徑")]
    NoRomPath,

    #[error("ROM 讀取失敗: {0}")]
    Io(#[from] io::Error),
}

/// 記錄標頭 (像素資料之前的 16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub pixels: u32,
    pub name: [u8; NAME_LEN],
    pub width: u32,
    pub height: u32,
}

impl RecordHeader {
    fn read_from<R: Read>(reader: &mut R) -> Result<Self, RomError> {
        let pixels = read_u32(reader)?;
        let mut name = [0u8; NAME_LEN];
        reader.read_exact(&mut name)?;
        let width = read_u32(reader)?;
        let height = read_u32(reader)?;
        Ok(Self {
            pixels,
            name,
            width,
            height,
        })
    }

    pub fn name_lossy(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// 檢查 magic 並回傳影像數量
fn read_header<R: Read>(reader: &mut R) -> Result<u8, RomError> {
    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) => {}
        // 連 4 bytes 都沒有也算是標頭錯誤
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(RomError::BadMagic),
        Err(e) => return Err(e.into()),
    }
    if &magic != MAGIC {
        return Err(RomError::BadMagic);
    }
    let mut count = [0u8; 1];
    reader.read_exact(&mut count)?;
    Ok(count[0])
}

/// 名稱比對: 只看前 4 bytes，兩邊同時遇到 NUL 即視為相同
pub fn name_matches(record: &[u8; NAME_LEN], query: &str) -> bool {
    let query = query.as_bytes();
    for (i, &a) in record.iter().enumerate() {
        let b = query.get(i).copied().unwrap_or(0);
        if a != b {
            return false;
        }
        if a == 0 {
            return true;
        }
    }
    true
}

/// 依名稱循序搜尋影像
pub fn find_image<R: Read + Seek>(reader: &mut R, name: &str) -> Result<Texture, RomError> {
    let count = read_header(reader)?;

    for _ in 0..count {
        let header = RecordHeader::read_from(reader)?;

        if !name_matches(&header.name, name) {
            reader.seek(SeekFrom::Current(header.pixels as i64 * 2))?;
            continue;
        }

        if header.pixels as u64 != header.width as u64 * header.height as u64 {
            return Err(RomError::SizeMismatch {
                pixels: header.pixels,
                width: header.width,
                height: header.height,
            });
        }
        if header.pixels > MAX_PIXELS {
            return Err(RomError::TooLarge(header.pixels));
        }

        let mut raw = Vec::new();
        raw.try_reserve_exact(header.pixels as usize * 2)
            .map_err(|_| RomError::AllocFailed(header.pixels))?;
        raw.resize(header.pixels as usize * 2, 0);
        reader.read_exact(&mut raw)?;

        let codes = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) as i64)
            .collect();

        debug!(
            "從 ROM 載入影像 '{}' ({}x{})",
            header.name_lossy(),
            header.width,
            header.height
        );
        return Ok(Texture::from_codes(
            header.width as usize,
            header.height as usize,
            codes,
        ));
    }

    Err(RomError::NotFound(name.to_string()))
}

/// 開啟 ROM 檔案、讀取指定影像後關閉，不做快取
pub fn load_image<P: AsRef<Path>>(path: P, name: &str) -> Result<Texture, RomError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(RomError::NoRomPath);
    }
    let mut reader = BufReader::new(File::open(path)?);
    find_image(&mut reader, name)
}

/// 列出 ROM 內所有影像的標頭
pub fn list_images<R: Read + Seek>(reader: &mut R) -> Result<Vec<RecordHeader>, RomError> {
    let count = read_header(reader)?;
    let mut headers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let header = RecordHeader::read_from(reader)?;
        reader.seek(SeekFrom::Current(header.pixels as i64 * 2))?;
        headers.push(header);
    }
    Ok(headers)
}

/// 以 ROM 佈局寫出影像表
#[derive(Debug, Default, Clone)]
pub struct RomBuilder {
    images: Vec<([u8; NAME_LEN], u32, u32, Vec<u16>)>,
}

impl RomBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 名稱最多 4 bytes，不足時以 NUL 補齊
    pub fn image(mut self, name: &str, width: u32, height: u32, pixels: &[u16]) -> io::Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > NAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("影像名稱超過 4 bytes: {}", name),
            ));
        }
        if self.images.len() >= MAX_IMAGES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "ROM 最多只能容納 255 張影像",
            ));
        }
        let mut padded = [0u8; NAME_LEN];
        padded[..bytes.len()].copy_from_slice(bytes);
        self.images.push((padded, width, height, pixels.to_vec()));
        Ok(self)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(MAGIC)?;
        writer.write_all(&[self.images.len() as u8])?;
        for (name, width, height, pixels) in &self.images {
            writer.write_all(&(pixels.len() as u32).to_le_bytes())?;
            writer.write_all(name)?;
            writer.write_all(&width.to_le_bytes())?;
            writer.write_all(&height.to_le_bytes())?;
            for pixel in pixels {
                writer.write_all(&pixel.to_le_bytes())?;
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out).expect("寫入 Vec<u8> 不會回傳 I/O 錯誤");
        out
    }
}
