// PLF 主控台 - 主程式

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use plf_console::config::system::{DEFAULT_ROM, DEFAULT_SCRIPT};
use plf_console::config::{ConfigBuilder, LogLevel, SystemConfig, VideoConfig};
use plf_console::interface::{Display, MinifbDisplay};
use plf_console::utils::ConsoleLogger;
use plf_console::{Console, SystemClock};

#[derive(Parser)]
#[command(name = "plf_console")]
#[command(version, about = "Lua fantasy console", long_about = None)]
struct Cli {
    /// Lua script to run
    #[arg(default_value = DEFAULT_SCRIPT)]
    script: PathBuf,

    /// Image ROM read by texture.fromRom
    #[arg(default_value = DEFAULT_ROM)]
    rom: PathBuf,

    /// Diagnostic output level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Seed for util.random
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ConsoleLogger::init(cli.log_level);

    let config = ConfigBuilder::new()
        .video_config(VideoConfig::default())
        .system_config(SystemConfig {
            script_path: cli.script,
            rom_path: cli.rom,
            log_level: cli.log_level,
            seed: cli.seed,
        })
        .build();

    let console = Console::boot(config, SystemClock::new(), |spec| {
        Ok(Box::new(MinifbDisplay::open(spec)?) as Box<dyn Display>)
    });

    let mut console = match console {
        Ok(console) => console,
        Err(e) => {
            error!("啟動失敗: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match console.run() {
        Ok(()) => {
            info!("正常結束");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("執行失敗: {}", e);
            ExitCode::FAILURE
        }
    }
}
