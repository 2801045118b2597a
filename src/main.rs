use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use animatedfetch::config::{create_default_config, Settings};
use animatedfetch::display::{CancelToken, PlaybackSession, SystemClock};
use animatedfetch::layout::Layout;
use animatedfetch::menu::{BufferedInput, LineSource, Menu, TerminalInput};
use animatedfetch::terminal::{terminal_width, Screen, TerminalScreen};
use animatedfetch::{load, logging, metrics, AnimationSet, Frame};

/// A terminal fetch program with animated GIF support.
#[derive(Parser, Debug)]
#[command(name = "animatedfetch", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    create_config: bool,

    /// Offer the action buttons after the display settles
    #[arg(short, long)]
    interactive: bool,

    /// GIF to play (overrides the configuration)
    #[arg(short, long, value_name = "PATH")]
    gif: Option<PathBuf>,

    /// Animation width in characters
    #[arg(short, long, value_name = "COLS")]
    width: Option<u32>,

    /// Seconds of animated playback before settling
    #[arg(long, value_name = "SECS")]
    duration: Option<f64>,

    /// Show the layout without the animation
    #[arg(long)]
    no_animation: bool,
}

impl Cli {
    /// Apply command line overrides on top of loaded settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(gif) = &self.gif {
            settings.animation.path = gif.to_string_lossy().into_owned();
        }
        if let Some(width) = self.width {
            settings.animation.width = width;
        }
        if let Some(duration) = self.duration {
            settings.animation.duration = duration;
        }
        if self.no_animation {
            settings.animation.enabled = false;
        }
        settings.validated()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.create_config {
        let path = create_default_config(cli.config.as_deref())
            .context("failed to create configuration")?;
        println!("Created configuration at {}", path.display());
        return Ok(());
    }

    let settings = cli.apply(Settings::load(cli.config.as_deref()));
    let metrics = metrics::collect();

    let cancel = CancelToken::new();
    let _signals = cancel
        .watch_signals()
        .map_err(|err| warn!(%err, "interrupts will not stop playback early"))
        .ok();

    let anim = &settings.animation;
    let animation = if anim.enabled {
        load(settings.animation_path(), anim.width, anim.fps)
    } else {
        AnimationSet::empty(anim.fps)
    };
    debug!(
        frames = animation.frame_count(),
        status = ?animation.status(),
        "animation ready"
    );

    let layout = Layout::new(&settings, &metrics).with_max_width(terminal_width());
    let mut screen = TerminalScreen::stdout();
    let report = PlaybackSession::new(&animation, settings.playback_budget())
        .run(
            &mut screen,
            &mut SystemClock::start(),
            &cancel,
            |frame: &Frame| layout.compose(Some(&frame.grid)),
        )
        .context("failed to draw to the terminal")?;

    if cli.interactive && !report.interrupted() {
        let redraw = || layout.compose(Some(&animation.first().grid));
        let menu = if io::stdin().is_terminal() {
            run_menu(&settings, TerminalInput::new(cancel.clone()), &cancel, &mut screen, redraw)
        } else {
            run_menu(&settings, BufferedInput(io::stdin().lock()), &cancel, &mut screen, redraw)
        };
        menu.context("interactive menu failed")?;
    }

    Ok(())
}

fn run_menu<I, S, F>(
    settings: &Settings,
    input: I,
    cancel: &CancelToken,
    screen: &mut S,
    redraw: F,
) -> io::Result<()>
where
    I: LineSource,
    S: Screen,
    F: Fn() -> Vec<String>,
{
    Menu::new(&settings.buttons, input, io::stdout(), cancel.clone()).run(screen, redraw)
}
