//! Timed playback of an [`AnimationSet`] inside the composed layout.
//!
//! A [`PlaybackSession`] moves `Idle -> Playing -> Settled`. While playing it
//! advances a [`PlaybackCursor`], recomposes the whole layout around the new
//! frame and pushes it to a [`Screen`], then sleeps for the frame's duration.
//! It settles when the budget is spent or the [`CancelToken`] fires, and
//! always ends with a static render of the first frame.

use std::io;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

#[cfg(unix)]
use signal_hook::iterator::{Handle, Signals};

use crate::terminal::Screen;
use crate::{AnimationSet, Frame, PlaybackCursor};

/// Granularity of interruptible sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Shared interrupt flag, set from a signal handler or another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Lower the flag again.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Raise this flag on SIGINT, SIGTERM and SIGQUIT.
    ///
    /// On Unix a second signal arriving while the flag is still raised
    /// restores the terminal and exits with status `128 + signal`.
    pub fn watch_signals(&self) -> io::Result<SignalWatcher> {
        self.watch(signal_hook::consts::TERM_SIGNALS)
    }

    #[cfg(unix)]
    fn watch(&self, signals: &[c_int]) -> io::Result<SignalWatcher> {
        let mut signals = Signals::new(signals)?;
        let handle = signals.handle();
        let token = self.clone();

        let thread = thread::spawn(move || {
            for signal in signals.forever() {
                if token.is_cancelled() {
                    crate::terminal::restore_terminal();
                    std::process::exit(128 + signal);
                }
                debug!(signal, "interrupt requested");
                token.cancel();
            }
        });

        Ok(SignalWatcher {
            handle,
            thread: Some(thread),
        })
    }

    #[cfg(not(unix))]
    fn watch(&self, signals: &[c_int]) -> io::Result<SignalWatcher> {
        for &signal in signals {
            signal_hook::flag::register(signal, Arc::clone(&self.0))?;
        }
        Ok(SignalWatcher {})
    }
}

/// Turns terminating signals into cancellation until dropped.
pub struct SignalWatcher {
    #[cfg(unix)]
    handle: Handle,
    #[cfg(unix)]
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for SignalWatcher {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

/// Time source for playback.
pub trait Clock {
    /// Time since playback started.
    fn elapsed(&self) -> Duration;

    /// Sleep for `duration`, returning early once `cancel` is raised.
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken);
}

/// Wall clock with sliced sleeps.
#[derive(Clone, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start measuring from now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) {
        let deadline = Instant::now() + duration;
        while !cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Settled,
}

/// Why playback settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleReason {
    /// Nothing to animate: empty or single-frame set.
    Static,
    /// The playback budget ran out.
    BudgetElapsed,
    /// The cancel token was raised.
    Interrupted,
}

/// Summary of one playback run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackReport {
    pub reason: SettleReason,
    /// Animation frames pushed while playing, not counting the final render.
    pub frames_shown: usize,
    /// Complete passes over the frame list.
    pub cycles: usize,
}

impl PlaybackReport {
    #[inline]
    pub fn interrupted(&self) -> bool {
        self.reason == SettleReason::Interrupted
    }
}

/// One run of the display loop over an animation.
#[derive(Debug)]
pub struct PlaybackSession<'a> {
    cursor: PlaybackCursor<'a>,
    budget: Duration,
    state: PlaybackState,
    frames_shown: usize,
}

impl<'a> PlaybackSession<'a> {
    pub fn new(set: &'a AnimationSet, budget: Duration) -> Self {
        Self {
            cursor: PlaybackCursor::new(set),
            budget,
            state: PlaybackState::Idle,
            frames_shown: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Play until settled.
    ///
    /// `compose` builds the full screen around a frame. The screen is
    /// finished on every path, including draw errors, which are returned
    /// after cleanup.
    pub fn run<S, C, F>(
        &mut self,
        screen: &mut S,
        clock: &mut C,
        cancel: &CancelToken,
        mut compose: F,
    ) -> io::Result<PlaybackReport>
    where
        S: Screen,
        C: Clock,
        F: FnMut(&Frame) -> Vec<String>,
    {
        let played = self.drive(screen, clock, cancel, &mut compose);
        self.state = PlaybackState::Settled;
        let finished = screen.finish();

        let report = played?;
        finished?;
        debug!(?report, "playback settled");
        Ok(report)
    }

    fn drive<S, C, F>(
        &mut self,
        screen: &mut S,
        clock: &mut C,
        cancel: &CancelToken,
        compose: &mut F,
    ) -> io::Result<PlaybackReport>
    where
        S: Screen,
        C: Clock,
        F: FnMut(&Frame) -> Vec<String>,
    {
        self.cursor.reset();
        if self.cursor.frame_count() <= 1 {
            screen.draw(&compose(self.cursor.current()))?;
            return Ok(self.report(SettleReason::Static));
        }

        self.state = PlaybackState::Playing;
        screen.draw(&compose(self.cursor.current()))?;
        self.frames_shown = 1;
        clock.sleep(self.cursor.current().duration, cancel);

        let reason = loop {
            if cancel.is_cancelled() {
                break SettleReason::Interrupted;
            }
            if clock.elapsed() >= self.budget {
                break SettleReason::BudgetElapsed;
            }

            let wait = self.cursor.advance();
            screen.draw(&compose(self.cursor.current()))?;
            self.frames_shown += 1;
            clock.sleep(wait, cancel);
        };

        self.state = PlaybackState::Settled;
        self.cursor.reset();
        screen.draw(&compose(self.cursor.current()))?;
        Ok(self.report(reason))
    }

    fn report(&self, reason: SettleReason) -> PlaybackReport {
        let count = self.cursor.frame_count().max(1);
        PlaybackReport {
            reason,
            frames_shown: self.frames_shown,
            cycles: self.frames_shown / count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GlyphCell, GlyphGrid};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingScreen {
        draws: Vec<Vec<String>>,
        finished: usize,
        fail_on: Option<usize>,
    }

    impl Screen for RecordingScreen {
        fn draw(&mut self, lines: &[String]) -> io::Result<()> {
            if self.fail_on == Some(self.draws.len()) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.draws.push(lines.to_vec());
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            self.finished += 1;
            Ok(())
        }
    }

    /// Advances only when slept on. Optionally raises cancel after some sleeps.
    struct ManualClock {
        now: Duration,
        sleeps: usize,
        cancel_after: Option<usize>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Duration::ZERO,
                sleeps: 0,
                cancel_after: None,
            }
        }
    }

    impl Clock for ManualClock {
        fn elapsed(&self) -> Duration {
            self.now
        }

        fn sleep(&mut self, duration: Duration, cancel: &CancelToken) {
            self.now += duration;
            self.sleeps += 1;
            if self.cancel_after == Some(self.sleeps) {
                cancel.cancel();
            }
        }
    }

    /// Frames whose single cell's red channel is the frame index.
    fn tagged_set(millis: &[u64]) -> AnimationSet {
        let frames = millis
            .iter()
            .enumerate()
            .map(|(i, &ms)| {
                let grid = GlyphGrid::new(1, 1, vec![GlyphCell::new(i as u8, 0, 0, 0)]);
                Frame::new(grid, Duration::from_millis(ms))
            })
            .collect();
        AnimationSet::from_frames(frames, 10.0)
    }

    fn tag(frame: &Frame) -> Vec<String> {
        match frame.grid.rgb_at(0, 0) {
            Some((r, _, _)) => vec![r.to_string()],
            None => vec!["empty".to_string()],
        }
    }

    fn drawn_tags(screen: &RecordingScreen) -> Vec<&str> {
        screen.draws.iter().map(|d| d[0].as_str()).collect()
    }

    #[test]
    fn test_budget_allows_full_cycles() {
        let set = tagged_set(&[250, 250, 250, 250]);
        let mut screen = RecordingScreen::default();
        let mut clock = ManualClock::new();
        let cancel = CancelToken::new();

        let mut session = PlaybackSession::new(&set, Duration::from_secs(5));
        let report = session.run(&mut screen, &mut clock, &cancel, tag).unwrap();

        assert_eq!(report.reason, SettleReason::BudgetElapsed);
        assert!(report.cycles >= 5, "only {} cycles", report.cycles);
        assert_eq!(session.state(), PlaybackState::Settled);
        assert_eq!(screen.finished, 1);
    }

    #[test]
    fn test_frames_follow_cyclic_order() {
        let set = tagged_set(&[100, 200, 150]);
        let mut screen = RecordingScreen::default();
        let mut clock = ManualClock::new();
        let cancel = CancelToken::new();

        PlaybackSession::new(&set, Duration::from_millis(1000))
            .run(&mut screen, &mut clock, &cancel, tag)
            .unwrap();

        // Sleeps: 100, 200, 150, 100, 200, 150, 100 -> 1000 ms after seven frames.
        assert_eq!(
            drawn_tags(&screen),
            vec!["0", "1", "2", "0", "1", "2", "0", "0"]
        );
    }

    #[test]
    fn test_settled_render_is_first_frame() {
        let set = tagged_set(&[100, 100]);
        let mut screen = RecordingScreen::default();
        let mut clock = ManualClock::new();
        let cancel = CancelToken::new();

        let report = PlaybackSession::new(&set, Duration::from_millis(200))
            .run(&mut screen, &mut clock, &cancel, tag)
            .unwrap();

        assert_eq!(report.frames_shown, 2);
        assert_eq!(report.cycles, 1);
        assert_eq!(drawn_tags(&screen), vec!["0", "1", "0"]);
    }

    #[test]
    fn test_cancel_settles_early() {
        let set = tagged_set(&[100, 100, 100]);
        let mut screen = RecordingScreen::default();
        let mut clock = ManualClock::new();
        clock.cancel_after = Some(2);
        let cancel = CancelToken::new();

        let report = PlaybackSession::new(&set, Duration::from_secs(60))
            .run(&mut screen, &mut clock, &cancel, tag)
            .unwrap();

        assert!(report.interrupted());
        assert_eq!(report.frames_shown, 2);
        assert_eq!(drawn_tags(&screen), vec!["0", "1", "0"]);
        assert_eq!(screen.finished, 1);
    }

    #[test]
    fn test_cancel_before_start() {
        let set = tagged_set(&[100, 100]);
        let mut screen = RecordingScreen::default();
        let mut clock = ManualClock::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let report = PlaybackSession::new(&set, Duration::from_secs(60))
            .run(&mut screen, &mut clock, &cancel, tag)
            .unwrap();

        assert_eq!(report.reason, SettleReason::Interrupted);
        assert_eq!(report.frames_shown, 1);
    }

    #[test]
    fn test_static_sets_render_once() {
        let cancel = CancelToken::new();

        for set in [AnimationSet::empty(10.0), tagged_set(&[100])] {
            let mut screen = RecordingScreen::default();
            let mut clock = ManualClock::new();
            let mut session = PlaybackSession::new(&set, Duration::from_secs(5));

            let report = session.run(&mut screen, &mut clock, &cancel, tag).unwrap();

            assert_eq!(report.reason, SettleReason::Static);
            assert_eq!(screen.draws.len(), 1);
            assert_eq!(clock.sleeps, 0);
            assert_eq!(screen.finished, 1);
        }
    }

    #[test]
    fn test_static_empty_set_uses_sentinel() {
        let set = AnimationSet::empty(10.0);
        let mut screen = RecordingScreen::default();
        let mut clock = ManualClock::new();

        PlaybackSession::new(&set, Duration::from_secs(5))
            .run(&mut screen, &mut clock, &CancelToken::new(), tag)
            .unwrap();

        assert_eq!(drawn_tags(&screen), vec!["empty"]);
    }

    #[test]
    fn test_draw_error_still_finishes() {
        let set = tagged_set(&[100, 100, 100]);
        let mut screen = RecordingScreen {
            fail_on: Some(2),
            ..Default::default()
        };
        let mut clock = ManualClock::new();

        let mut session = PlaybackSession::new(&set, Duration::from_secs(5));
        let err = session
            .run(&mut screen, &mut clock, &CancelToken::new(), tag)
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(screen.finished, 1);
        assert_eq!(session.state(), PlaybackState::Settled);
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_raises_token() {
        use signal_hook::consts::SIGUSR2;

        let cancel = CancelToken::new();
        let watcher = cancel.watch(&[SIGUSR2]).unwrap();
        signal_hook::low_level::raise(SIGUSR2).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !cancel.is_cancelled() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(cancel.is_cancelled());
        drop(watcher);
    }

    #[test]
    fn test_system_clock_sleep_is_interruptible() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut clock = SystemClock::start();
        clock.sleep(Duration::from_secs(10), &cancel);
        assert!(clock.elapsed() < Duration::from_secs(1));

        cancel.clear();
        assert!(!cancel.is_cancelled());
    }
}
