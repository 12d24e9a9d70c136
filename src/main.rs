use clap::{Parser, Subcommand};
use pianoroll::config::RollConfig;
use pianoroll::session::Session;
use pianoroll::tab::SymbolMode;
use pianoroll::transport::{LogSink, TransportStatus};
use pianoroll::RollError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pianoroll", about = "Piano-roll renderer and player for kalimba tabs and MIDI files")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, default_value = "pianoroll.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the input as tab text
    Tab {
        input: PathBuf,
        /// Write scale degrees instead of letters
        #[arg(short, long)]
        number: bool,
        /// Coloured markup instead of plain text
        #[arg(long)]
        html: bool,
        /// Chord tolerance and line-break silence in seconds
        #[arg(short, long)]
        spacing: Option<f64>,
        /// MIDI part to use
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Render both layers at a playback time to a PNG file
    Render {
        input: PathBuf,
        /// Playback time in seconds
        #[arg(long, default_value_t = 0.0)]
        time: f64,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Play the input headlessly, logging the visible window
    Play {
        input: PathBuf,
        #[arg(short, long)]
        speed: Option<f64>,
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Print a share link for the input
    Share {
        input: PathBuf,
        /// Page location the link is based on
        #[arg(short, long)]
        location: String,
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Print the notes of a share link as tab text
    Unshare {
        url: String,
        #[arg(short, long)]
        number: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RollError> {
    let mut config = RollConfig::load(&cli.config)?;

    match cli.command {
        Commands::Tab {
            input,
            number,
            html,
            spacing,
            track,
        } => {
            if number {
                config.symbol_mode = SymbolMode::Number;
            }
            if let Some(spacing) = spacing {
                config.spacing = spacing;
            }
            let mut session = Session::new(config)?;
            load_input(&mut session, &input, track)?;
            if html {
                println!("{}", session.tab_html());
            } else {
                println!("{}", session.tab_text());
            }
        }
        Commands::Render {
            input,
            time,
            out,
            track,
        } => {
            let mut session = Session::new(config)?;
            load_input(&mut session, &input, track)?;
            session.seek_view(time);
            save_png(&session, &out)?;
            eprintln!("Wrote {} at {:.2}s to {}", input.display(), time, out.display());
        }
        Commands::Play {
            input,
            speed,
            track,
        } => {
            if let Some(speed) = speed {
                config.speed = speed;
            }
            let mut session = Session::new(config)?;
            load_input(&mut session, &input, track)?;
            play(&mut session)?;
        }
        Commands::Share {
            input,
            location,
            track,
        } => {
            let mut session = Session::new(config)?;
            load_input(&mut session, &input, track)?;
            println!("{}", session.share_link(&location)?);
        }
        Commands::Unshare { url, number } => {
            if number {
                config.symbol_mode = SymbolMode::Number;
            }
            let mut session = Session::new(config)?;
            session.load_link(&url)?;
            println!("{}", session.tab_text());
        }
    }
    Ok(())
}

fn is_midi(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
}

fn load_input(session: &mut Session, path: &Path, track: Option<usize>) -> Result<(), RollError> {
    if is_midi(path) {
        let bytes = fs::read(path)?;
        session.load_midi(&bytes)?;
        if let Some(notice) = session.take_notice() {
            eprintln!("{}", notice);
        }
        if let Some(track) = track {
            session.select_part(track)?;
        }
    } else {
        let text = fs::read_to_string(path)?;
        session.set_tab_text(&text)?;
    }
    log::info!("Loaded {} notes from {}", session.notes().len(), path.display());
    Ok(())
}

fn play(session: &mut Session) -> Result<(), RollError> {
    let frame = Duration::from_millis(session.config().frame_interval_ms);
    session.set_sink(Box::new(LogSink));
    session.play()?;

    let mut last_report = -1.0;
    loop {
        let Some(time) = session.frame() else {
            break;
        };
        if session.transport().status() == TransportStatus::Stopped {
            break;
        }
        if time - last_report >= 1.0 {
            last_report = time;
            if let Some(window) = session.view().window() {
                log::info!(
                    "{:6.2}s  window {:.2}..{:.2}s  {} notes visible",
                    time,
                    window.start,
                    window.end,
                    session.view().notes_in_window()
                );
            }
        }
        std::thread::sleep(frame);
    }
    log::info!("Playback finished");
    Ok(())
}

fn save_png(session: &Session, path: &Path) -> Result<(), RollError> {
    let renderer = session.view().renderer();
    let (width, height) = (renderer.background().width(), renderer.background().height());
    let image = image::RgbaImage::from_raw(width, height, renderer.composite()).ok_or_else(|| {
        RollError::InvalidArgument(format!("surface is not {}x{} RGBA", width, height))
    })?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| RollError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}
