// 註冊給腳本使用的七個功能表: color, drawing, texture, mouse, keyboard, window, util

use log::warn;
use mlua::prelude::*;
use rand::Rng;

use super::marshal::{table_to_texture, texture_to_table, to_integer, Args};
use super::HostContext;
use crate::error::{Error, Result};
use crate::framebuffer::Texture;
use crate::interface::video::{letterbox, window_to_buffer};
use crate::interface::{KeyCode, MouseButton};
use crate::palette;
use crate::rom;
use crate::utils::geometry::{self, Aabb};

fn function<F, R>(lua: &Lua, name: &'static str, f: F) -> LuaResult<LuaFunction>
where
    F: Fn(&Lua, Args) -> LuaResult<R> + 'static,
    R: IntoLuaMulti,
{
    lua.create_function(move |lua, values: LuaMultiValue| f(lua, Args::new(name, values)))
}

/// 主控台錯誤以 Lua 錯誤的形式交給腳本
fn raise(err: Error) -> LuaError {
    LuaError::external(err)
}

pub fn register(lua: &Lua, ctx: &HostContext) -> LuaResult<()> {
    let globals = lua.globals();
    globals.set("color", color_table(lua)?)?;
    globals.set("drawing", drawing_table(lua, ctx)?)?;
    globals.set("texture", texture_table(lua, ctx)?)?;
    globals.set("mouse", mouse_table(lua, ctx)?)?;
    globals.set("keyboard", keyboard_table(lua, ctx)?)?;
    globals.set("window", window_table(lua, ctx)?)?;
    globals.set("util", util_table(lua, ctx)?)?;
    Ok(())
}

fn color_table(lua: &Lua) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;
    table.set(
        "rgb",
        function(lua, "color.rgb", |_, args| {
            palette::rgb(args.integer(0)?, args.integer(1)?, args.integer(2)?).map_err(raise)
        })?,
    )?;
    table.set(
        "hsv",
        function(lua, "color.hsv", |_, args| {
            palette::hsv(args.integer(0)?, args.integer(1)?, args.integer(2)?).map_err(raise)
        })?,
    )?;
    table.set(
        "greyscale",
        function(lua, "color.greyscale", |_, args| Ok(palette::greyscale(args.integer(0)?)))?,
    )?;
    Ok(table)
}

/// 呼叫一次 shader 並把回傳值轉為調色盤代碼
fn run_shader(shader: &LuaFunction, x: i64, y: i64) -> Result<i64> {
    let value = shader
        .call::<LuaValue>((x, y))
        .map_err(|e| Error::Draw(e.to_string()))?;
    to_integer(&value)
        .ok_or_else(|| Error::Draw(format!("shader 必須回傳整數，得到 {}", value.type_name())))
}

fn drawing_table(lua: &Lua, ctx: &HostContext) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;

    let fb = ctx.framebuffer.clone();
    table.set(
        "shader",
        function(lua, "drawing.shader", move |_, args| {
            let shader = args.function(0)?;
            let (width, height) = {
                let fb = fb.borrow();
                (fb.width(), fb.height())
            };
            // 先跑完所有 Lua 呼叫，shader 內才能安全地再呼叫繪圖函式
            let mut results = Vec::with_capacity(width * height);
            for y in 0..height {
                for x in 0..width {
                    results.push(run_shader(&shader, x as i64, y as i64));
                }
            }
            let mut results = results.into_iter();
            fb.borrow_mut()
                .shade(|_, _| results.next().unwrap_or(Ok(0)));
            Ok(())
        })?,
    )?;

    let fb = ctx.framebuffer.clone();
    table.set(
        "rect",
        function(lua, "drawing.rect", move |_, args| {
            let texture = table_to_texture(&args.table(0)?)?;
            let (x, y) = (args.integer(1)?, args.integer(2)?);
            fb.borrow_mut().rect(&texture, x, y);
            Ok(())
        })?,
    )?;

    let fb = ctx.framebuffer.clone();
    table.set(
        "circle",
        function(lua, "drawing.circle", move |_, args| {
            let (cx, cy, r, code) = (
                args.integer(0)?,
                args.integer(1)?,
                args.integer(2)?,
                args.integer(3)?,
            );
            fb.borrow_mut().circle(cx, cy, r, code);
            Ok(())
        })?,
    )?;

    let fb = ctx.framebuffer.clone();
    table.set(
        "line",
        function(lua, "drawing.line", move |_, args| {
            let (x1, y1, x2, y2, code) = (
                args.integer(0)?,
                args.integer(1)?,
                args.integer(2)?,
                args.integer(3)?,
                args.integer(4)?,
            );
            fb.borrow_mut().line(x1, y1, x2, y2, code);
            Ok(())
        })?,
    )?;

    let fb = ctx.framebuffer.clone();
    table.set(
        "pixel",
        function(lua, "drawing.pixel", move |_, args| {
            let (x, y, code) = (args.integer(0)?, args.integer(1)?, args.integer(2)?);
            fb.borrow_mut().pixel(x, y, code);
            Ok(())
        })?,
    )?;

    Ok(table)
}

fn texture_table(lua: &Lua, ctx: &HostContext) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;

    table.set(
        "fromShader",
        function(lua, "texture.fromShader", |lua, args| {
            let shader = args.function(0)?;
            let (width, height) = (args.integer(1)?, args.integer(2)?);
            if width < 0 || height < 0 {
                return Err(raise(Error::Domain(format!(
                    "材質大小不可為負: {}x{}",
                    width, height
                ))));
            }
            let pixels = (width as u64).checked_mul(height as u64);
            if !matches!(pixels, Some(p) if p <= rom::MAX_PIXELS as u64) {
                return Err(raise(Error::Domain(format!(
                    "材質過大: {}x{}，上限 {} 像素",
                    width,
                    height,
                    rom::MAX_PIXELS
                ))));
            }
            let texture = Texture::from_shader(width as usize, height as usize, |x, y| {
                run_shader(&shader, x, y)
            });
            texture_to_table(lua, &texture)
        })?,
    )?;

    let rom_path = ctx.rom_path.clone();
    table.set(
        "fromRom",
        function(lua, "texture.fromRom", move |lua, args| {
            let name = args.string(0)?;
            let texture = rom::load_image(rom_path.as_path(), &name).map_err(|e| raise(e.into()))?;
            texture_to_table(lua, &texture)
        })?,
    )?;

    Ok(table)
}

fn mouse_table(lua: &Lua, ctx: &HostContext) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;

    let host = ctx.clone();
    table.set(
        "position",
        function(lua, "mouse.position", move |_, _| {
            let (buffer_w, buffer_h) = host.buffer_size();
            let position = host
                .with_display(|display| {
                    let (window_w, window_h) = display.window_size();
                    let dest = letterbox(buffer_w, buffer_h, window_w, window_h);
                    display
                        .mouse_position()
                        .and_then(|mouse| window_to_buffer(mouse, dest, buffer_w, buffer_h))
                })
                .flatten();
            Ok(match position {
                Some((x, y)) => (Some(x), Some(y)),
                None => (None, None),
            })
        })?,
    )?;

    let host = ctx.clone();
    table.set(
        "down",
        function(lua, "mouse.down", move |_, args| {
            let button = MouseButton::from_code(args.integer(0)?).map_err(raise)?;
            Ok(host
                .with_display(|display| display.mouse_down(button))
                .unwrap_or(false))
        })?,
    )?;

    let host = ctx.clone();
    table.set(
        "visible",
        function(lua, "mouse.visible", move |_, args| {
            let visible = args.boolean(0);
            host.with_display(|display| display.set_cursor_visible(visible));
            Ok(())
        })?,
    )?;

    let host = ctx.clone();
    table.set(
        "center",
        function(lua, "mouse.center", move |_, _| {
            host.with_display(|display| display.center_cursor())
                .unwrap_or(Ok(()))
                .map_err(raise)
        })?,
    )?;

    Ok(table)
}

fn keyboard_table(lua: &Lua, ctx: &HostContext) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;
    let host = ctx.clone();
    table.set(
        "down",
        function(lua, "keyboard.down", move |_, args| {
            let key = KeyCode::parse(&args.string(0)?).map_err(raise)?;
            Ok(host
                .with_display(|display| display.key_down(key))
                .unwrap_or(false))
        })?,
    )?;
    Ok(table)
}

fn window_table(lua: &Lua, ctx: &HostContext) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;

    let host = ctx.clone();
    table.set(
        "title",
        function(lua, "window.title", move |_, args| {
            let title = args.string(0)?;
            if host.with_display(|display| display.set_title(&title)).is_none() {
                warn!("視窗尚未建立，忽略 window.title");
            }
            Ok(())
        })?,
    )?;

    let running = ctx.running.clone();
    table.set(
        "close",
        function(lua, "window.close", move |_, _| {
            running.set(false);
            Ok(())
        })?,
    )?;

    let host = ctx.clone();
    table.set(
        "fullscreen",
        function(lua, "window.fullscreen", move |_, args| {
            let fullscreen = args.boolean(0);
            host.with_display(|display| display.set_fullscreen(fullscreen))
                .unwrap_or(Ok(()))
                .map_err(raise)
        })?,
    )?;

    let host = ctx.clone();
    table.set(
        "message",
        function(lua, "window.message", move |_, args| {
            let text = args.string(0)?;
            host.with_display(|display| {
                let title = display.title();
                display.show_message(&title, &text);
            });
            Ok(())
        })?,
    )?;

    Ok(table)
}

fn util_table(lua: &Lua, ctx: &HostContext) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;

    table.set(
        "distance",
        function(lua, "util.distance", |_, args| {
            Ok(geometry::distance(
                args.number(0)?,
                args.number(1)?,
                args.number(2)?,
                args.number(3)?,
            ))
        })?,
    )?;

    table.set(
        "clamp",
        function(lua, "util.clamp", |_, args| {
            Ok(geometry::clamp(args.number(0)?, args.number(1)?, args.number(2)?))
        })?,
    )?;

    table.set(
        "lerp",
        function(lua, "util.lerp", |_, args| {
            Ok(geometry::lerp(args.number(0)?, args.number(1)?, args.number(2)?))
        })?,
    )?;

    let rng = ctx.rng.clone();
    table.set(
        "random",
        function(lua, "util.random", move |_, args| match args.len() {
            0 => Ok(rng.borrow_mut().gen::<f64>()),
            2 => {
                let (a, b) = (args.number(0)?, args.number(1)?);
                if !a.is_finite() || !b.is_finite() {
                    return Err(LuaError::runtime("util.random 的範圍必須是有限數值"));
                }
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                if lo == hi {
                    return Ok(lo);
                }
                let mut rng = rng.borrow_mut();
                if (hi - lo).is_finite() {
                    return Ok(rng.gen_range(lo..=hi));
                }
                // 範圍寬度超出 f64 時改用內插
                let t = rng.gen::<f64>();
                Ok((lo * (1.0 - t) + hi * t).clamp(lo, hi))
            }
            n => Err(LuaError::runtime(format!(
                "util.random 需要 0 或 2 個參數，收到 {}",
                n
            ))),
        })?,
    )?;

    let http = ctx.http.clone();
    table.set(
        "httpGet",
        function(lua, "util.httpGet", move |_, args| {
            let (body, status) = http.get(&args.string(0)?);
            Ok((body, status as i64))
        })?,
    )?;

    table.set(
        "intersect",
        function(lua, "util.intersect", |_, args| {
            let a = Aabb::new(args.number(0)?, args.number(1)?, args.number(2)?, args.number(3)?);
            let b = Aabb::new(args.number(4)?, args.number(5)?, args.number(6)?, args.number(7)?);
            Ok(geometry::intersect(&a, &b))
        })?,
    )?;

    Ok(table)
}
