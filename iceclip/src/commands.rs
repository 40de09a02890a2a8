use std::path::PathBuf;
use std::str::FromStr;

use crate::app_state::AppState;

pub const HELP: &str = "\
commands:
  <enter>, s       save the buffered audio as a clip
  c                connect to the stream
  d                disconnect
  w <minutes>      change the buffer window
  o <dir>          change the output folder
  p <prefix>       change the file prefix
  u <url>          change the stream URL (applies on next connect)
  i                show status and diagnostics
  h                show this help
  q                quit";

/// One line of control input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SaveClip,
    Connect,
    Disconnect,
    Window(u32),
    OutputFolder(PathBuf),
    Prefix(String),
    Url(String),
    Info,
    Help,
    Quit,
}

/// What the control loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };

        let command = match word {
            "" | "s" | "save" => Command::SaveClip,
            "c" | "connect" => Command::Connect,
            "d" | "disconnect" => Command::Disconnect,
            "i" | "info" => Command::Info,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "w" | "window" => {
                let minutes = arg
                    .parse::<u32>()
                    .ok()
                    .filter(|m| *m > 0)
                    .ok_or_else(|| {
                        format!("buffer size must be a positive whole number of minutes, got {:?}", arg)
                    })?;
                return Ok(Command::Window(minutes));
            }
            "o" | "output" => Command::OutputFolder(PathBuf::from(required(word, arg)?)),
            "p" | "prefix" => Command::Prefix(required(word, arg)?.to_string()),
            "u" | "url" => Command::Url(required(word, arg)?.to_string()),
            other => return Err(format!("unknown command {:?} (h for help)", other)),
        };

        let takes_argument = matches!(
            command,
            Command::OutputFolder(_) | Command::Prefix(_) | Command::Url(_)
        );
        if !arg.is_empty() && !takes_argument {
            return Err(format!("{} takes no argument", word));
        }
        Ok(command)
    }
}

fn required<'a>(word: &str, arg: &'a str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("{} needs a value", word))
    } else {
        Ok(arg)
    }
}

/// Run one command against the app state.
pub fn execute(app: &mut AppState, command: Command) -> Result<Flow, String> {
    match command {
        Command::SaveClip => app.save_clip().map_err(|e| e.to_string())?,
        Command::Connect => app.connect().map_err(|e| e.to_string())?,
        Command::Disconnect => app.engine.stop(),
        Command::Window(minutes) => {
            app.engine
                .reconfigure_window(minutes)
                .map_err(|e| e.to_string())?;
            app.settings.window_minutes = minutes;
            app.persist_settings()?;
            println!("buffer window set to {} minute(s)", minutes);
        }
        Command::OutputFolder(folder) => {
            app.settings.output_folder = folder;
            apply_destination(app)?;
        }
        Command::Prefix(prefix) => {
            app.settings.file_prefix = prefix;
            apply_destination(app)?;
        }
        Command::Url(url) => {
            app.settings.stream_url = url;
            app.persist_settings()?;
            println!("stream URL set to {}", app.settings.stream_url);
        }
        Command::Info => print_info(app),
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn apply_destination(app: &mut AppState) -> Result<(), String> {
    app.engine.set_clip_destination(
        app.settings.output_folder.clone(),
        app.settings.file_prefix.clone(),
    );
    app.persist_settings()?;
    println!(
        "clips go to {}/{}_<timestamp>",
        app.settings.output_folder.display(),
        app.settings.file_prefix
    );
    Ok(())
}

fn print_info(app: &AppState) {
    let engine = &app.engine;
    let diagnostics = engine.diagnostics();
    println!("state:        {}", engine.state().label());
    println!("status:       {}", engine.status());
    if let Some(session) = engine.session() {
        println!("session:      {} ({})", session.id, session.url);
        println!("started:      {}", session.started_at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!(
        "buffer:       {}/{} chunks ({:.1}%), window {} min",
        engine.buffer_len(),
        engine.buffer_capacity(),
        engine.fullness(),
        engine.window_minutes()
    );
    println!(
        "received:     {} chunks, {} bytes",
        diagnostics.chunks_received, diagnostics.bytes_received
    );
    println!(
        "connects:     {} attempts, {} errors",
        diagnostics.connect_attempts, diagnostics.capture_errors
    );
    println!("clips saved:  {}", diagnostics.clips_saved);
    println!(
        "destination:  {}/{}",
        engine.output_directory().display(),
        engine.file_prefix()
    );
    println!("stream URL:   {}", app.settings.stream_url);
}
