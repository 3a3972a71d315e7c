// PLF 主控台庫
pub mod config;
pub mod console;
pub mod error;
pub mod framebuffer;
pub mod interface;
pub mod palette;
pub mod rom;
pub mod script;
pub mod timer;
pub mod utils;

pub use crate::config::{Config, ConfigBuilder, ScriptConfig};
pub use crate::console::Console;
pub use crate::error::{Error, Result};
pub use crate::framebuffer::{FrameBuffer, Texture};
pub use crate::interface::{Display, HeadlessDisplay, MinifbDisplay};
pub use crate::script::{HostContext, ScriptHost};
pub use crate::timer::{Clock, ManualClock, SystemClock};
