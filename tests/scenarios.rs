mod common;

use std::time::{Duration, Instant};

use common::{rgba, Fixture, OPAQUE_BLACK};
use plf_console::interface::{InputEvent, MouseButton};
use plf_console::palette::{self, Rgba};
use plf_console::rom::RomBuilder;
use plf_console::{Error, SystemClock};

#[test]
fn single_red_pixel_frame() {
    let fixture = Fixture::new(
        "width = 4 height = 2 fps = 0
         function update(dt) drawing.pixel(0, 0, color.rgb(7, 0, 0)) end",
    );
    let (mut console, handle) = fixture.boot().unwrap();
    assert!(console.tick());

    let red = Rgba { r: 252, g: 0, b: 0, a: 255 }.pack();
    assert_eq!(handle.frame_pixel(0, 0), Some(red));
    for (x, y) in [(1, 0), (2, 0), (3, 0), (0, 1), (3, 1)] {
        // 清空的像素以黑色呈現
        let pixel = handle.frame_pixel(x, y).unwrap();
        assert_eq!(Rgba::unpack(pixel).to_0rgb(), 0);
    }
    assert_eq!(handle.state().dest.w, 540);
}

#[test]
fn shader_gradient() {
    let fixture = Fixture::new(
        "width = 3 height = 3
         function update() drawing.shader(function(x, y) return color.rgb(x, y, 0) end) end",
    );
    let (mut console, handle) = fixture.boot().unwrap();
    console.tick();
    for y in 0..3 {
        for x in 0..3 {
            let expected = Rgba { r: x as u8 * 36, g: y as u8 * 36, b: 0, a: 255 }.pack();
            assert_eq!(handle.frame_pixel(x, y), Some(expected), "({}, {})", x, y);
        }
    }
}

#[test]
fn shader_errors_become_black_pixels() {
    let fixture = Fixture::new(
        "width = 2 height = 1
         function update()
           drawing.shader(function(x, y)
             if x == 1 then error('bad pixel') end
             return color.rgb(0, 7, 0)
           end)
         end",
    );
    let (mut console, _) = fixture.boot().unwrap();
    console.tick();
    let front = console.framebuffer().front().to_vec();
    assert_eq!(front, vec![rgba(palette::encode(0, 7, 0).unwrap()), OPAQUE_BLACK]);
    assert!(console.last_error().is_none());
}

#[test]
fn shader_can_call_back_into_drawing() {
    let fixture = Fixture::new(
        "width = 2 height = 2
         function update()
           drawing.shader(function(x, y)
             drawing.pixel(1, 1, color.rgb(7, 7, 7))
             return 0
           end)
         end",
    );
    let (mut console, _) = fixture.boot().unwrap();
    console.tick();
    assert!(console.last_error().is_none());
    assert_eq!(console.framebuffer().front()[3], rgba(512));
}

#[test]
fn intersect_from_script() {
    let fixture = Fixture::new(
        "width = 1 height = 1
         a = { util.intersect(0, 0, 10, 10, 5, 0, 10, 10) }
         b = { util.intersect(0, 0, 10, 10, 20, 0, 10, 10) }
         function update() end",
    );
    let (console, _) = fixture.boot().unwrap();
    let globals = console.host().lua().globals();
    let a: Vec<f64> = globals.get("a").unwrap();
    let b: Vec<f64> = globals.get("b").unwrap();
    assert_eq!(a, vec![-5.0, 0.0, 5.0, 0.0]);
    assert_eq!(b, vec![0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn texture_from_rom() {
    let rom = RomBuilder::new()
        .image("pad", 1, 1, &[512])
        .unwrap()
        .image("test", 2, 2, &[1, 65, 129, 193])
        .unwrap()
        .to_bytes();
    let fixture = Fixture::new(
        "width = 4 height = 4
         img = texture.fromRom('test')
         ok, err = pcall(texture.fromRom, 'nope')
         err = tostring(err)
         function update() drawing.rect(img, 1, 1) end",
    )
    .with_rom(&rom);
    let (mut console, _) = fixture.boot().unwrap();

    let globals = console.host().lua().globals();
    let img: Vec<Vec<i64>> = globals.get("img").unwrap();
    assert_eq!(img, vec![vec![1, 65], vec![129, 193]]);
    assert!(!globals.get::<bool>("ok").unwrap());
    assert!(globals.get::<String>("err").unwrap().contains("nope"));

    console.tick();
    let front = console.framebuffer().front().to_vec();
    assert_eq!(front[4 + 1], rgba(1));
    assert_eq!(front[4 + 2], rgba(65));
    assert_eq!(front[8 + 1], rgba(129));
    assert_eq!(front[8 + 2], rgba(193));
    assert_eq!(front[0], 0);
}

#[test]
fn rom_errors_surface_to_the_script() {
    let fixture = Fixture::new(
        "width = 1 height = 1
         ok, err = pcall(texture.fromRom, 'test')
         err = tostring(err)
         function update() end",
    )
    .with_rom(b"nope\x00");
    let (console, _) = fixture.boot().unwrap();
    let globals = console.host().lua().globals();
    assert!(!globals.get::<bool>("ok").unwrap());
    assert!(globals.get::<String>("err").unwrap().contains("imag"));
}

#[test]
fn texture_from_shader_builds_rows() {
    let fixture = Fixture::new(
        "width = 1 height = 1
         t = texture.fromShader(function(x, y) if y == 1 then error('x') end return x + 1 end, 3, 2)
         function update() end",
    );
    let (console, _) = fixture.boot().unwrap();
    let t: Vec<Vec<i64>> = console.host().lua().globals().get("t").unwrap();
    assert_eq!(t, vec![vec![1, 2, 3], vec![1, 1, 1]]);
}

#[test]
fn domain_errors_are_catchable() {
    let fixture = Fixture::new(
        "width = 1 height = 1
         results = {
           pcall(color.rgb, 8, 0, 0),
           pcall(color.hsv, 0, 8, 0),
           pcall(mouse.down, 0),
           pcall(keyboard.down, 'capslock'),
           pcall(drawing.pixel, 0, 0, 1.5),
         }
         function update() end",
    );
    let (console, _) = fixture.boot().unwrap();
    let results: Vec<bool> = console
        .host()
        .lua()
        .load("return { results[1], results[2], results[3], results[4], results[5] }")
        .eval()
        .unwrap();
    assert_eq!(results, vec![false; 5]);
}

#[test]
fn mouse_position_maps_through_the_letterbox() {
    let fixture = Fixture::new(
        "width = 4 height = 2
         function update() mx, my = mouse.position() held = mouse.down(1) end",
    );
    let (mut console, handle) = fixture.boot().unwrap();
    handle.resize(800, 200);
    handle.move_mouse(Some((599.0, 199.0)));
    handle.press(MouseButton::Left);
    console.tick();
    let globals = console.host().lua().globals();
    assert_eq!(globals.get::<i64>("mx").unwrap(), 3);
    assert_eq!(globals.get::<i64>("my").unwrap(), 1);
    assert!(globals.get::<bool>("held").unwrap());

    handle.move_mouse(Some((100.0, 100.0)));
    console.tick();
    let globals = console.host().lua().globals();
    assert_eq!(globals.get::<Option<i64>>("mx").unwrap(), None);
}

#[test]
fn window_controls_from_script() {
    let fixture = Fixture::new(
        "width = 2 height = 2 title = 'start'
         frame = 0
         function update()
           frame = frame + 1
           if frame == 1 then
             window.title('renamed')
             window.fullscreen(true)
             window.fullscreen(true)
             window.message('hello')
             mouse.visible(false)
             mouse.center()
           elseif frame == 2 then
             window.close()
           end
         end",
    );
    let (mut console, handle) = fixture.boot().unwrap();
    assert!(console.tick());
    {
        let state = handle.state();
        assert_eq!(state.title, "renamed");
        assert!(state.fullscreen);
        assert_eq!(state.window_size, (1920, 1080));
        assert_eq!(state.messages, vec![("renamed".to_string(), "hello".to_string())]);
        assert!(!state.cursor_visible);
        assert_eq!(state.centered, 1);
    }
    assert!(!console.tick());
    assert!(!console.is_running());
    console.run().unwrap();
    assert_eq!(console.frames(), 2);
}

#[test]
fn keyboard_state_reaches_the_script() {
    let fixture = Fixture::new(
        "width = 1 height = 1
         function update() a = keyboard.down('A') enter = keyboard.down('enter') end",
    );
    let (mut console, handle) = fixture.boot().unwrap();
    handle.set_key(plf_console::interface::KeyCode::Char('a'), true);
    console.tick();
    let globals = console.host().lua().globals();
    assert!(globals.get::<bool>("a").unwrap());
    assert!(!globals.get::<bool>("enter").unwrap());
}

#[test]
fn quit_event_ends_run() {
    let fixture = Fixture::new("width = 1 height = 1 function update() end");
    let (mut console, handle) = fixture.boot().unwrap();
    handle.push_event(InputEvent::Quit);
    console.run().unwrap();
    assert_eq!(console.frames(), 1);
}

#[test]
fn startup_failures() {
    let missing = Fixture::new("width = 1 height = 1");
    std::fs::remove_file(&missing.script).unwrap();
    assert!(matches!(missing.boot(), Err(Error::Script(_))));

    let no_height = Fixture::new("width = 1");
    assert!(matches!(no_height.boot(), Err(Error::Config(_))));

    let syntax = Fixture::new("width = = 1");
    assert!(matches!(syntax.boot(), Err(Error::Script(_))));
}

#[test]
fn missing_update_is_logged_and_the_loop_continues() {
    let fixture = Fixture::new("width = 1 height = 1");
    let (mut console, handle) = fixture.boot().unwrap();
    assert!(console.tick());
    assert!(console.tick());
    assert_eq!(console.last_error(), Some("腳本錯誤: update not defined"));
    assert_eq!(handle.state().presents, 2);
}

#[test]
fn frame_period_respects_fps() {
    let fixture = Fixture::new(
        "width = 1 height = 1 fps = 60
         function update()
           local t = os.clock()
           while os.clock() - t < 0.001 do end
         end",
    );
    let (mut console, _) = fixture.boot_with(SystemClock::new()).unwrap();
    console.tick();
    let start = Instant::now();
    for _ in 0..3 {
        console.tick();
    }
    let period = start.elapsed() / 3;
    assert!(period >= Duration::from_micros(16_000), "{:?}", period);
}
