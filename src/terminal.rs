//! Terminal output.
//!
//! Every draw is one synchronized update: cursor home, overwrite each line,
//! clear whatever is left below. Lines past the terminal height are dropped
//! so a draw never scrolls. Color and cursor state are restored by `finish`,
//! which also runs on drop.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, ResetColor};
use crossterm::terminal::{self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use crossterm::{execute, queue};

/// Where composed frames are pushed.
pub trait Screen {
    /// Replace what is on screen with `lines`.
    fn draw(&mut self, lines: &[String]) -> io::Result<()>;

    /// Restore color and cursor state.
    fn finish(&mut self) -> io::Result<()>;

    /// Forget what was drawn so the next draw starts from a clear screen.
    fn invalidate(&mut self) {}
}

/// A [`Screen`] writing escape sequences to any writer.
pub struct TerminalScreen<W: Write> {
    out: W,
    /// Terminal height, when known
    rows: Option<usize>,
    started: bool,
    cursor_hidden: bool,
    /// The cursor sits at the end of the last drawn line
    mid_line: bool,
}

impl TerminalScreen<Stdout> {
    /// Screen on standard output, sized to the current terminal.
    pub fn stdout() -> Self {
        Self::new(io::stdout()).with_rows(terminal::size().ok().map(|(_, rows)| rows as usize))
    }
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: None,
            started: false,
            cursor_hidden: false,
            mid_line: false,
        }
    }

    /// Limit draws to a terminal `rows` lines tall.
    pub fn with_rows(mut self, rows: Option<usize>) -> Self {
        self.rows = rows;
        self
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        if !self.started {
            queue!(self.out, Hide, Clear(ClearType::All))?;
            self.started = true;
            self.cursor_hidden = true;
        }
        queue!(self.out, MoveTo(0, 0))?;

        // The last row stays free so the cursor can move past the last line.
        let visible = match self.rows {
            Some(rows) => &lines[..lines.len().min(rows.saturating_sub(1).max(1))],
            None => lines,
        };
        for (i, line) in visible.iter().enumerate() {
            if i > 0 {
                queue!(self.out, Print("\r\n"))?;
            }
            queue!(self.out, Print(line), ResetColor, Clear(ClearType::UntilNewLine))?;
        }
        self.mid_line = !visible.is_empty();

        queue!(self.out, Clear(ClearType::FromCursorDown), EndSynchronizedUpdate)?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.mid_line {
            queue!(self.out, Print("\r\n"))?;
            self.mid_line = false;
        }
        queue!(self.out, ResetColor)?;
        if self.cursor_hidden {
            queue!(self.out, Show)?;
            self.cursor_hidden = false;
        }
        self.out.flush()
    }

    fn invalidate(&mut self) {
        self.started = false;
    }
}

impl<W: Write> Drop for TerminalScreen<W> {
    fn drop(&mut self) {
        if self.cursor_hidden {
            if let Err(err) = self.finish() {
                tracing::error!(?err, "failed to restore terminal");
            }
        }
    }
}

/// Best-effort terminal reset for abnormal exits.
pub fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), ResetColor, Show, Print("\r\n"));
}

/// Current terminal width in columns, when stdout is a terminal.
pub fn terminal_width() -> Option<usize> {
    terminal::size().ok().map(|(cols, _)| cols as usize)
}
