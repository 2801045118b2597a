//! Interactive action menu shown after the display settles.
//!
//! Reads one choice per line. A button key runs that button's command
//! through the platform shell, then the static layout is drawn again.
//! On a terminal, input is read key by key in raw mode so Ctrl+C ends the
//! menu immediately.

use std::io::{self, BufRead, Write};
use std::process::{Command, ExitStatus};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{debug, warn};

use crate::color::TextStyle;
use crate::config::Button;
use crate::display::CancelToken;
use crate::terminal::Screen;

const HINT: &str = "Press a key to run an action, or 'q' to quit";

/// How often raw input checks the cancel token.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a line of input asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice<'a> {
    Quit,
    Run(&'a Button),
    Invalid,
}

/// Match a line of input against the buttons.
///
/// Empty input and `q` (either case) quit. Button keys are matched exactly
/// after trimming.
pub fn resolve_choice<'a>(input: &str, buttons: &'a [Button]) -> MenuChoice<'a> {
    let choice = input.trim();
    if choice.is_empty() || choice.eq_ignore_ascii_case("q") {
        return MenuChoice::Quit;
    }

    buttons
        .iter()
        .find(|button| button.key == choice)
        .map_or(MenuChoice::Invalid, MenuChoice::Run)
}

/// Run `command` through the platform shell with inherited stdio.
pub fn run_command(command: &str) -> io::Result<ExitStatus> {
    #[cfg(windows)]
    let mut child = Command::new("cmd").args(["/C", command]).spawn()?;
    #[cfg(not(windows))]
    let mut child = Command::new("sh").args(["-c", command]).spawn()?;

    child.wait()
}

/// One read from the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// Where menu input comes from.
pub trait LineSource {
    fn next_line(&mut self) -> io::Result<Input>;
}

/// Line input from any buffered reader, such as piped stdin.
pub struct BufferedInput<R>(pub R);

impl<R: BufRead> LineSource for BufferedInput<R> {
    fn next_line(&mut self) -> io::Result<Input> {
        let mut line = String::new();
        if self.0.read_line(&mut line)? == 0 {
            return Ok(Input::Eof);
        }
        Ok(Input::Line(line))
    }
}

/// Key-by-key input from the terminal with local echo.
pub struct TerminalInput {
    cancel: CancelToken,
}

impl TerminalInput {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    fn read_raw(&mut self, out: &mut impl Write) -> io::Result<Input> {
        let mut line = String::new();
        loop {
            if self.cancel.is_cancelled() {
                write!(out, "\r\n")?;
                out.flush()?;
                return Ok(Input::Interrupted);
            }
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Char('c') if ctrl => {
                    write!(out, "^C\r\n")?;
                    out.flush()?;
                    return Ok(Input::Interrupted);
                }
                KeyCode::Char('d') if ctrl && line.is_empty() => {
                    write!(out, "\r\n")?;
                    out.flush()?;
                    return Ok(Input::Eof);
                }
                KeyCode::Enter => {
                    write!(out, "\r\n")?;
                    out.flush()?;
                    return Ok(Input::Line(line));
                }
                KeyCode::Backspace => {
                    if line.pop().is_some() {
                        write!(out, "\x08 \x08")?;
                    }
                }
                KeyCode::Char(c) if !ctrl => {
                    line.push(c);
                    write!(out, "{}", c)?;
                }
                _ => {}
            }
            out.flush()?;
        }
    }
}

impl LineSource for TerminalInput {
    fn next_line(&mut self) -> io::Result<Input> {
        terminal::enable_raw_mode()?;
        let read = self.read_raw(&mut io::stdout());
        let restored = terminal::disable_raw_mode();
        let input = read?;
        restored?;
        Ok(input)
    }
}

/// Prompt loop over an input source.
pub struct Menu<'a, I, W> {
    buttons: &'a [Button],
    input: I,
    output: W,
    cancel: CancelToken,
}

impl<'a, I: LineSource, W: Write> Menu<'a, I, W> {
    pub fn new(buttons: &'a [Button], input: I, output: W, cancel: CancelToken) -> Self {
        Self {
            buttons,
            input,
            output,
            cancel,
        }
    }

    /// Prompt until the user quits, input ends or an interrupt arrives.
    ///
    /// After each command, `redraw` supplies the lines drawn back to `screen`.
    pub fn run<S, F>(&mut self, screen: &mut S, redraw: F) -> io::Result<()>
    where
        S: Screen,
        F: Fn() -> Vec<String>,
    {
        if self.buttons.is_empty() {
            return Ok(());
        }

        self.hint()?;
        loop {
            if self.cancel.is_cancelled() {
                return self.interrupted();
            }

            write!(self.output, "\nChoice [q]: ")?;
            self.output.flush()?;
            let line = match self.input.next_line()? {
                Input::Line(line) => line,
                Input::Eof => return Ok(()),
                Input::Interrupted => return self.interrupted(),
            };

            match resolve_choice(&line, self.buttons) {
                MenuChoice::Quit => return Ok(()),
                MenuChoice::Invalid => {
                    let style = TextStyle::parse("yellow");
                    writeln!(self.output, "{}", style.apply("Invalid choice. Try again."))?;
                }
                MenuChoice::Run(button) if button.command.trim().is_empty() => {
                    debug!(key = %button.key, "button has no command");
                }
                MenuChoice::Run(button) => {
                    self.execute(button)?;

                    match self.input.next_line()? {
                        Input::Line(_) => {}
                        Input::Eof => return Ok(()),
                        Input::Interrupted => return self.interrupted(),
                    }

                    screen.invalidate();
                    screen.draw(&redraw())?;
                    screen.finish()?;
                    self.hint()?;
                }
            }
        }
    }

    fn execute(&mut self, button: &Button) -> io::Result<()> {
        let label = TextStyle::parse("bold green");
        writeln!(self.output, "\n{} {}\n", label.apply("Running:"), button.command)?;
        self.output.flush()?;

        match run_command(&button.command) {
            Ok(status) if !status.success() => {
                debug!(command = %button.command, %status, "command exited unsuccessfully");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(command = %button.command, %err, "failed to run command");
                let style = TextStyle::parse("bold red");
                writeln!(self.output, "{} {}", style.apply("Error:"), err)?;
            }
        }
        self.cancel.clear();

        let dim = TextStyle::parse("dim");
        write!(self.output, "\n{}", dim.apply("Press Enter to continue..."))?;
        self.output.flush()
    }

    fn hint(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", TextStyle::parse("dim").apply(HINT))
    }

    fn interrupted(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", TextStyle::parse("yellow").apply("Interrupted"))?;
        self.output.flush()
    }
}
