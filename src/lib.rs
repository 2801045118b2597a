//! # animatedfetch
//!
//! Terminal system fetch with an animated GIF beside the host metrics.
//!
//! This crate provides:
//! - Loading an animated GIF into colored glyph grids with per-frame durations
//! - Sizing grids for the terminal's tall character cells
//! - A playback cursor and a budgeted, interruptible display loop
//! - Host metrics, layout composition and an interactive action menu
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use animatedfetch::display::{CancelToken, PlaybackSession, SystemClock};
//! use animatedfetch::terminal::TerminalScreen;
//! use animatedfetch::render::ansi_lines;
//!
//! let set = animatedfetch::load("~/.config/animatedfetch/animation.gif", 40, 10.0);
//! let mut screen = TerminalScreen::stdout();
//!
//! let report = PlaybackSession::new(&set, Duration::from_secs(5))
//!     .run(&mut screen, &mut SystemClock::start(), &CancelToken::new(), |frame| {
//!         ansi_lines(&frame.grid)
//!     })?;
//! println!("{} frames shown", report.frames_shown);
//! # Ok::<(), std::io::Error>(())
//! ```

mod animation;
mod data;
mod sizing;

pub mod color;
pub mod config;
pub mod display;
pub mod layout;
pub mod loader;
pub mod logging;
pub mod menu;
pub mod metrics;
pub mod render;
pub mod terminal;

pub use animation::PlaybackCursor;
pub use data::{Frame, GlyphCell, GlyphGrid, BLOCK};
pub use loader::{load, AnimationSet, LoadStatus};
pub use sizing::GridSizing;
