pub mod geometry;
pub mod http;
pub mod logger;

pub use geometry::Aabb;
pub use http::{HttpClient, UnimplementedHttp};
pub use logger::ConsoleLogger;
