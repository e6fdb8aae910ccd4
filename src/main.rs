use clap::{Parser, Subcommand};
use pixelbonsai::app::{self, GrowOptions};
use pixelbonsai::display::{halfblock_ansi, scale_nearest};
use pixelbonsai::{render_still, Config, Result, TimerSnapshot, TimerStatus};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pixelbonsai")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Focus timer that grows a pixel-art bonsai", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/pixelbonsai/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the focus timer and watch the bonsai grow
    Grow {
        /// Focus sessions already completed
        #[arg(short, long, default_value = "0")]
        growth: u32,

        /// Work session length in minutes
        #[arg(long)]
        work: Option<u32>,

        /// Short break length in minutes
        #[arg(long)]
        short_break: Option<u32>,

        /// Long break length in minutes
        #[arg(long)]
        long_break: Option<u32>,

        /// Timer speed multiplier (0.1 to 10000)
        #[arg(long, default_value = "1.0", value_parser = app::parse_speed)]
        speed: f64,

        /// Disable wind, pulse and particles
        #[arg(long)]
        reduced_motion: bool,

        /// Dust the foliage with snow
        #[arg(long)]
        snow: bool,
    },

    /// Render one still frame, to a PNG or the terminal
    Render {
        /// Write a PNG here instead of printing half-blocks
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Integer upscale factor for the PNG
        #[arg(short, long, default_value = "1")]
        scale: u32,

        /// Focus sessions completed
        #[arg(short, long, default_value = "0")]
        growth: u32,

        /// Progress through the current work session (0-1)
        #[arg(short, long, default_value = "0.0")]
        progress: f64,

        /// Session number for the sign board
        #[arg(long, default_value = "1")]
        session: u32,

        /// Dust the foliage with snow
        #[arg(long)]
        snow: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Grow {
            growth,
            work,
            short_break,
            long_break,
            speed,
            reduced_motion,
            snow,
        } => {
            if let Some(m) = work {
                config.timer.work_mins = m;
            }
            if let Some(m) = short_break {
                config.timer.short_break_mins = m;
            }
            if let Some(m) = long_break {
                config.timer.long_break_mins = m;
            }
            config.validate()?;
            app::run(
                config,
                GrowOptions {
                    growth,
                    speed,
                    reduced_motion,
                    snow: snow.then_some(true),
                },
            )
        }
        Commands::Render {
            out,
            scale,
            growth,
            progress,
            session,
            snow,
        } => {
            let snapshot = TimerSnapshot {
                total_growth: growth,
                session_progress: progress.clamp(0.0, 1.0),
                is_work_session: true,
                status: TimerStatus::Idle,
                current_session: session.max(1),
            };
            let snow = snow || config.plant.accessories.snow;
            let (image, text) = render_still(config.plant, &snapshot, snow)?;
            match out {
                Some(path) => {
                    let scale = scale.clamp(1, 16);
                    let image = scale_nearest(&image, image.width() * scale, image.height() * scale);
                    image.save(&path)?;
                    println!("wrote {}", path.display());
                }
                None => print!("{}", halfblock_ansi(&image)),
            }
            println!("{}", text);
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pixelbonsai: {}", e);
            ExitCode::FAILURE
        }
    }
}
