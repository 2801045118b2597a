//! Playback cursor over a loaded animation.

use std::time::Duration;

use crate::{AnimationSet, Frame};

/// Current-frame state for playing one [`AnimationSet`].
///
/// The cursor does not handle timing itself. `advance()` returns how long
/// the newly current frame should stay on screen and the caller sleeps for
/// that long.
///
/// ## Example
///
/// ```rust
/// use std::time::Duration;
/// use animatedfetch::{AnimationSet, Frame, GlyphGrid, PlaybackCursor};
///
/// let frames = [100, 200, 150]
///     .iter()
///     .map(|&ms| Frame::new(GlyphGrid::empty(), Duration::from_millis(ms)))
///     .collect();
/// let set = AnimationSet::from_frames(frames, 10.0);
///
/// let mut cursor = PlaybackCursor::new(&set);
/// assert_eq!(cursor.advance(), Duration::from_millis(200));
/// assert_eq!(cursor.advance(), Duration::from_millis(150));
/// assert_eq!(cursor.advance(), Duration::from_millis(100));
/// assert_eq!(cursor.index(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct PlaybackCursor<'a> {
    /// Frames being played
    set: &'a AnimationSet,
    /// Current frame index
    index: usize,
}

impl<'a> PlaybackCursor<'a> {
    /// Create a cursor positioned at the first frame.
    pub fn new(set: &'a AnimationSet) -> Self {
        Self { set, index: 0 }
    }

    /// Get the current frame index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the total number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.set.frame_count()
    }

    /// The frame at the current index, or the empty sentinel for an empty set.
    pub fn current(&self) -> &'a Frame {
        self.set.get(self.index).unwrap_or(self.set.sentinel())
    }

    /// Advance to the next frame, wrapping to the first after the last.
    ///
    /// Returns the duration of the new current frame. On an empty set the
    /// index stays put and the fallback duration is returned.
    pub fn advance(&mut self) -> Duration {
        let count = self.set.frame_count();
        if count == 0 {
            return self.set.fallback_duration();
        }

        self.index = (self.index + 1) % count;
        self.current().duration
    }

    /// Move back to the first frame.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GlyphGrid;

    fn set_with_durations(millis: &[u64]) -> AnimationSet {
        let frames = millis
            .iter()
            .map(|&ms| Frame::new(GlyphGrid::empty(), Duration::from_millis(ms)))
            .collect();
        AnimationSet::from_frames(frames, 10.0)
    }

    #[test]
    fn test_advance_returns_new_frame_duration() {
        let set = set_with_durations(&[100, 200, 150]);
        let mut cursor = PlaybackCursor::new(&set);
        cursor.reset();

        let durations: Vec<Duration> = (0..3).map(|_| cursor.advance()).collect();
        assert_eq!(
            durations,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(150),
                Duration::from_millis(100)
            ]
        );

        // Fourth advance repeats the cycle
        assert_eq!(cursor.advance(), Duration::from_millis(200));
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        for n in 1..=7 {
            let set = set_with_durations(&vec![50; n]);
            let mut cursor = PlaybackCursor::new(&set);
            cursor.reset();

            for _ in 0..n {
                cursor.advance();
            }
            assert_eq!(cursor.index(), 0, "frame count {}", n);
        }
    }

    #[test]
    fn test_empty_set() {
        let set = AnimationSet::empty(4.0);
        let mut cursor = PlaybackCursor::new(&set);

        assert_eq!(cursor.advance(), Duration::from_millis(250));
        assert_eq!(cursor.index(), 0);
        assert!(cursor.current().is_empty());
        assert_eq!(cursor.current().duration, Duration::from_millis(250));
    }

    #[test]
    fn test_reset() {
        let set = set_with_durations(&[10, 20, 30]);
        let mut cursor = PlaybackCursor::new(&set);

        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.current().duration, Duration::from_millis(30));

        cursor.reset();
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.current().duration, Duration::from_millis(10));
    }
}
