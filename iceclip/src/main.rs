mod app_state;
mod commands;
mod settings;

use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Parser;

use iceclip_core::{CaptureConfiguration, CaptureEngine};
use iceclip_http::HttpChunkSource;

use app_state::{AppState, ConsoleDelegate};
use commands::{Command, Flow};
use settings::Settings;

/// Keep the last few minutes of a live audio stream and save clips on demand.
#[derive(Parser, Debug)]
#[command(name = "iceclip", version, about)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, env = "ICECLIP_SETTINGS")]
    settings: Option<PathBuf>,

    /// Stream URL
    #[arg(long)]
    url: Option<String>,

    /// Buffer window in minutes
    #[arg(long, short = 'w', value_parser = clap::value_parser!(u32).range(1..))]
    window: Option<u32>,

    /// Folder clips are saved to
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// File name prefix for clips
    #[arg(long, short = 'p')]
    prefix: Option<String>,

    /// Write a JSON metadata file next to each clip
    #[arg(long)]
    metadata: bool,

    /// Start disconnected
    #[arg(long)]
    no_connect: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_or_create(&settings_path)?;
    if settings.apply_overrides(cli.url, cli.window, cli.output, cli.prefix) {
        settings.save(&settings_path)?;
    }
    log::info!("settings: {:?} ({})", settings, settings_path.display());

    let config = CaptureConfiguration {
        output_directory: settings.output_folder.clone(),
        file_prefix: settings.file_prefix.clone(),
        write_metadata: cli.metadata,
        ..CaptureConfiguration::default()
    };

    let mut engine = CaptureEngine::new(HttpChunkSource::new(), config)?;
    engine.set_delegate(ConsoleDelegate::new());
    let mut app = AppState::new(engine, settings, settings_path);

    if !cli.no_connect {
        if let Err(e) = app.connect() {
            eprintln!("{}", e);
        }
    }
    println!("press Enter to save a clip, h for help");

    for line in io::stdin().lock().lines() {
        let line = line?;
        let result = line
            .parse::<Command>()
            .and_then(|command| commands::execute(&mut app, command));
        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(message) => eprintln!("{}", message),
        }
    }

    println!("stopping...");
    app.shutdown();
    Ok(())
}
