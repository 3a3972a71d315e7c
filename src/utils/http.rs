// util.httpGet 的後端

/// 阻塞式 GET，回傳 (body, status)
pub trait HttpClient {
    fn get(&self, url: &str) -> (Option<String>, u16);
}

/// 未實作的用戶端: 一律回傳 (nil, 501)
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedHttp;

pub const NOT_IMPLEMENTED: u16 = 501;

impl HttpClient for UnimplementedHttp {
    fn get(&self, url: &str) -> (Option<String>, u16) {
        log::debug!("httpGet 未實作: {}", url);
        (None, NOT_IMPLEMENTED)
    }
}
