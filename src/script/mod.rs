// Lua 腳本橋接

pub mod api;
pub mod marshal;

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};
use mlua::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ScriptConfig;
use crate::error::{Error, Result};
use crate::framebuffer::FrameBuffer;
use crate::interface::{Display, MouseButton};
use crate::utils::{HttpClient, UnimplementedHttp};

use marshal::{to_integer, to_number};

/// 顯示後端的插槽；視窗在讀完腳本設定後才建立
pub type DisplaySlot = Rc<RefCell<Option<Box<dyn Display>>>>;

/// 腳本與主迴圈共用的狀態
#[derive(Clone)]
pub struct HostContext {
    pub framebuffer: Rc<RefCell<FrameBuffer>>,
    pub display: DisplaySlot,
    pub running: Rc<Cell<bool>>,
    pub rom_path: Rc<PathBuf>,
    pub http: Rc<dyn HttpClient>,
    pub rng: Rc<RefCell<StdRng>>,
}

impl HostContext {
    pub fn new(rom_path: PathBuf, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            framebuffer: Rc::new(RefCell::new(FrameBuffer::default())),
            display: Rc::new(RefCell::new(None)),
            running: Rc::new(Cell::new(true)),
            rom_path: Rc::new(rom_path),
            http: Rc::new(UnimplementedHttp),
            rng: Rc::new(RefCell::new(rng)),
        }
    }

    pub fn with_http(mut self, http: Rc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    pub fn buffer_size(&self) -> (usize, usize) {
        let fb = self.framebuffer.borrow();
        (fb.width(), fb.height())
    }

    /// 視窗不存在或正在使用中時回傳 None
    pub fn with_display<R>(&self, f: impl FnOnce(&mut dyn Display) -> R) -> Option<R> {
        let mut slot = self.display.try_borrow_mut().ok()?;
        let display = slot.as_mut()?;
        Some(f(display.as_mut()))
    }
}

pub struct ScriptHost {
    lua: Lua,
    ctx: HostContext,
}

impl ScriptHost {
    /// 建立 Lua 狀態並註冊功能表，腳本頂層程式碼即可使用
    pub fn new(ctx: HostContext) -> Result<Self> {
        let lua = Lua::new();
        api::register(&lua, &ctx)?;
        Ok(Self { lua, ctx })
    }

    pub fn context(&self) -> &HostContext {
        &self.ctx
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn load(&self, path: &Path) -> Result<()> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Script(format!("無法讀取腳本 {}: {}", path.display(), e)))?;
        self.load_source(&source, &path.display().to_string())
    }

    pub fn load_source(&self, source: &str, name: &str) -> Result<()> {
        self.lua.load(source).set_name(format!("@{}", name)).exec()?;
        debug!("腳本已載入: {}", name);
        Ok(())
    }

    fn required_dimension(globals: &LuaTable, name: &str) -> Result<i64> {
        match globals.get::<LuaValue>(name)? {
            LuaValue::Nil => Err(Error::Config(format!("腳本未定義 '{}'", name))),
            value => to_integer(&value)
                .ok_or_else(|| Error::Config(format!("'{}' 必須是整數", name))),
        }
    }

    /// 讀取腳本宣告的全域設定
    pub fn read_config(&self) -> Result<ScriptConfig> {
        let globals = self.lua.globals();
        let width = Self::required_dimension(&globals, "width")?;
        let height = Self::required_dimension(&globals, "height")?;
        let mut config = ScriptConfig::new(width, height)?;

        config.fps = self.read_fps();
        match globals.get::<LuaValue>("title")? {
            LuaValue::Nil => {}
            LuaValue::String(title) => config.title = title.to_str()?.to_string(),
            other => warn!("'title' 必須是字串，忽略 {}", other.type_name()),
        }
        config.no_console = Self::flag(&globals, "noConsole")?;
        config.suppress = Self::flag(&globals, "suppress")?;
        Ok(config)
    }

    /// 只有布林值 true 會開啟旗標
    fn flag(globals: &LuaTable, name: &str) -> Result<bool> {
        Ok(matches!(globals.get::<LuaValue>(name)?, LuaValue::Boolean(true)))
    }

    /// 每幀重新讀取，腳本可在執行中調整幀率
    pub fn read_fps(&self) -> Option<f64> {
        self.lua
            .globals()
            .get::<LuaValue>("fps")
            .ok()
            .and_then(|value| to_number(&value))
    }

    fn entry_point(&self, name: &str) -> Result<Option<LuaFunction>> {
        match self.lua.globals().get::<LuaValue>(name)? {
            LuaValue::Function(f) => Ok(Some(f)),
            _ => Ok(None),
        }
    }

    pub fn call_update(&self, dt: f64) -> Result<()> {
        let update = self
            .entry_point("update")?
            .ok_or_else(|| Error::Script("update not defined".to_string()))?;
        update.call::<()>(dt)?;
        Ok(())
    }

    pub fn call_mouse_down(&self, button: MouseButton) -> Result<()> {
        self.call_optional("mouseDown", button)
    }

    pub fn call_mouse_up(&self, button: MouseButton) -> Result<()> {
        self.call_optional("mouseUp", button)
    }

    fn call_optional(&self, name: &str, button: MouseButton) -> Result<()> {
        if let Some(callback) = self.entry_point(name)? {
            callback.call::<()>(button.code())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;

    fn host(source: &str) -> ScriptHost {
        let host = ScriptHost::new(HostContext::new(PathBuf::new(), Some(7))).unwrap();
        host.load_source(source, "test.lua").unwrap();
        host
    }

    #[test]
    fn config_reads_declared_globals() {
        let host = host("width = 4 height = 2.0 fps = 30 title = 'demo' suppress = true");
        let config = host.read_config().unwrap();
        assert_eq!((config.width, config.height), (4, 2));
        assert_eq!(config.fps, Some(30.0));
        assert_eq!(config.title, "demo");
        assert!(config.suppress && !config.no_console);
    }

    #[test]
    fn only_boolean_true_sets_the_quiet_flags() {
        let config = host("width = 1 height = 1 noConsole = 1 suppress = 'yes'")
            .read_config()
            .unwrap();
        assert!(!config.no_console && !config.suppress);
        let config = host("width = 1 height = 1 noConsole = true").read_config().unwrap();
        assert!(config.no_console && config.quiet());
    }

    #[test]
    fn missing_or_fractional_dimensions_are_config_errors() {
        assert!(matches!(host("height = 2").read_config(), Err(Error::Config(_))));
        assert!(matches!(
            host("width = 2.5 height = 2").read_config(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            host("width = 0 height = 2").read_config(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn load_errors_are_script_errors() {
        let host = ScriptHost::new(HostContext::new(PathBuf::new(), None)).unwrap();
        assert!(matches!(host.load_source("width = ", "bad.lua"), Err(Error::Script(_))));
        assert!(matches!(
            host.load(Path::new("/nonexistent/main.lua")),
            Err(Error::Script(_))
        ));
    }

    #[test]
    fn missing_update_is_reported() {
        let err = host("width = 1 height = 1").call_update(0.0).unwrap_err();
        assert!(err.to_string().contains("update not defined"));
    }

    #[test]
    fn mouse_callbacks_are_optional() {
        let host = host("clicks = 0 function mouseDown(b) clicks = clicks + b end");
        host.call_mouse_down(MouseButton::Right).unwrap();
        host.call_mouse_up(MouseButton::Right).unwrap();
        assert_eq!(host.lua().globals().get::<i64>("clicks").unwrap(), 2);
    }

    #[test]
    fn color_functions_are_available_at_top_level() {
        let host = host("red = color.rgb(7, 0, 0) ok = pcall(color.rgb, 8, 0, 0)");
        let globals = host.lua().globals();
        assert_eq!(globals.get::<i64>("red").unwrap(), palette::encode(7, 0, 0).unwrap());
        assert!(!globals.get::<bool>("ok").unwrap());
    }

    #[test]
    fn util_functions() {
        let host = host(
            "d = util.distance(0, 0, 3, 4) \
             c = util.clamp(5, 0, 2) \
             l = util.lerp(0, 10, 0.25) \
             ax, ay, bx, by = util.intersect(0, 0, 10, 10, 5, 0, 10, 10) \
             body, status = util.httpGet('http://example.com') \
             r = util.random(3, 3) \
             u = util.random() \
             bad = pcall(util.random, 1)",
        );
        let g = host.lua().globals();
        assert_eq!(g.get::<f64>("d").unwrap(), 5.0);
        assert_eq!(g.get::<f64>("c").unwrap(), 2.0);
        assert_eq!(g.get::<f64>("l").unwrap(), 2.5);
        assert_eq!(g.get::<f64>("ax").unwrap(), -5.0);
        assert_eq!(g.get::<f64>("bx").unwrap(), 5.0);
        assert_eq!(g.get::<LuaValue>("body").unwrap(), LuaValue::Nil);
        assert_eq!(g.get::<i64>("status").unwrap(), 501);
        assert_eq!(g.get::<f64>("r").unwrap(), 3.0);
        let u = g.get::<f64>("u").unwrap();
        assert!((0.0..1.0).contains(&u));
        assert!(!g.get::<bool>("bad").unwrap());
    }

    #[test]
    fn random_accepts_bounds_wider_than_f64_range() {
        let host = host(
            "wide = {} \
             for i = 1, 64 do wide[i] = util.random(1e308, -1e308) end \
             ok = pcall(util.random, -math.huge, 0)",
        );
        let g = host.lua().globals();
        let wide: Vec<f64> = g.get("wide").unwrap();
        assert!(wide.iter().all(|v| v.is_finite() && (-1e308..=1e308).contains(v)));
        assert!(!g.get::<bool>("ok").unwrap());
    }

    #[test]
    fn oversized_shader_textures_are_rejected() {
        let host = host(
            "f = function(x, y) return 1 end \
             huge_ok, huge_err = pcall(texture.fromShader, f, 2^32, 2^32) \
             huge_err = tostring(huge_err) \
             big_ok = pcall(texture.fromShader, f, 2000, 2000) \
             small = texture.fromShader(f, 2, 1)",
        );
        let g = host.lua().globals();
        assert!(!g.get::<bool>("huge_ok").unwrap());
        assert!(g.get::<String>("huge_err").unwrap().contains("4294967296"));
        assert!(!g.get::<bool>("big_ok").unwrap());
        assert_eq!(g.get::<Vec<Vec<i64>>>("small").unwrap(), vec![vec![1, 1]]);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = host("v = util.random(0, 100)").lua().globals().get::<f64>("v").unwrap();
        let b = host("v = util.random(0, 100)").lua().globals().get::<f64>("v").unwrap();
        assert_eq!(a, b);
        assert!((0.0..=100.0).contains(&a));
    }

    #[test]
    fn display_calls_without_a_window_are_harmless() {
        let host = host(
            "x, y = mouse.position() \
             down = mouse.down(1) \
             key = keyboard.down('a') \
             bad_key = pcall(keyboard.down, 'f13') \
             bad_button = pcall(mouse.down, 4) \
             window.title('later')",
        );
        let g = host.lua().globals();
        assert_eq!(g.get::<LuaValue>("x").unwrap(), LuaValue::Nil);
        assert!(!g.get::<bool>("down").unwrap());
        assert!(!g.get::<bool>("key").unwrap());
        assert!(!g.get::<bool>("bad_key").unwrap());
        assert!(!g.get::<bool>("bad_button").unwrap());
    }

    #[test]
    fn window_close_clears_the_running_flag() {
        let host = host("window.close()");
        assert!(!host.context().running.get());
    }
}
