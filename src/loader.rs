//! Animated GIF loading.
//!
//! Frames are decoded strictly in source order, downsampled to the target
//! character grid and rendered to glyphs. Loading never fails outright:
//! - a missing file yields an empty set (animation is simply absent)
//! - a decode error keeps the frames decoded so far and marks the set degraded

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, Delay, DynamicImage, ImageError, ImageResult};
use tracing::{debug, warn};

use crate::render::render;
use crate::{Frame, GridSizing};

/// Playback rate used when the configured fallback rate is unusable.
pub const DEFAULT_FPS: f64 = 10.0;

/// Outcome of loading an animation source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// Every frame in the source decoded
    Complete,
    /// The source file does not exist
    Missing,
    /// Decoding stopped early; only the decoded prefix was kept
    Degraded { reason: String },
}

/// An ordered, immutable sequence of decoded frames.
#[derive(Clone, Debug)]
pub struct AnimationSet {
    frames: Vec<Frame>,
    status: LoadStatus,
    fallback: Duration,
    sentinel: Frame,
}

impl AnimationSet {
    fn with_status(frames: Vec<Frame>, status: LoadStatus, fallback_fps: f64) -> Self {
        let fallback = fallback_duration(fallback_fps);
        Self {
            frames,
            status,
            fallback,
            sentinel: Frame::empty(fallback),
        }
    }

    /// A set with no frames, used when animation is disabled.
    pub fn empty(fallback_fps: f64) -> Self {
        Self::with_status(Vec::new(), LoadStatus::Complete, fallback_fps)
    }

    /// Build a set from already decoded frames.
    pub fn from_frames(frames: Vec<Frame>, fallback_fps: f64) -> Self {
        Self::with_status(frames, LoadStatus::Complete, fallback_fps)
    }

    /// Consume decoded image frames in order.
    ///
    /// The first `Err` stops consumption; frames before it are kept and the
    /// set is marked degraded. Grid dimensions are fixed by the first frame
    /// so every frame of the set has the same size.
    pub fn from_decoded<I>(decoded: I, target_width: u32, fallback_fps: f64) -> Self
    where
        I: IntoIterator<Item = ImageResult<image::Frame>>,
    {
        let sizing = GridSizing::default();
        let fallback = fallback_duration(fallback_fps);
        let mut frames = Vec::new();
        let mut status = LoadStatus::Complete;
        let mut dims: Option<(u32, u32)> = None;

        for result in decoded {
            let frame = match result {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(decoded = frames.len(), error = %err, "animation decode stopped early");
                    status = LoadStatus::Degraded {
                        reason: err.to_string(),
                    };
                    break;
                }
            };

            let duration = frame_duration(frame.delay(), fallback);
            let buffer = frame.into_buffer();
            let (width, height) = *dims.get_or_insert_with(|| {
                sizing.grid_dimensions(target_width, buffer.width(), buffer.height())
            });

            let resized = imageops::resize(&buffer, width, height, FilterType::Nearest);
            let bitmap = DynamicImage::ImageRgba8(resized).into_rgb8();
            frames.push(Frame::new(render(&bitmap), duration));
        }

        Self::with_status(frames, status, fallback_fps)
    }

    /// All frames in decode order.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Get the frame at the given index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// The frame shown when nothing animates: the first frame, or the
    /// empty sentinel.
    pub fn first(&self) -> &Frame {
        self.frames.first().unwrap_or(&self.sentinel)
    }

    /// The empty frame handed out in place of a missing one.
    #[inline]
    pub fn sentinel(&self) -> &Frame {
        &self.sentinel
    }

    /// Get the number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Check if the set has no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Check if the set needs timed playback (more than one frame).
    #[inline]
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// How loading went.
    #[inline]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Check if decoding stopped before the end of the source.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, LoadStatus::Degraded { .. })
    }

    /// Duration used where a frame has none (`1 / fallback_fps`).
    #[inline]
    pub fn fallback_duration(&self) -> Duration {
        self.fallback
    }

    /// Length of one full playback cycle.
    pub fn cycle_duration(&self) -> Duration {
        self.frames.iter().map(|f| f.duration).sum()
    }
}

/// Load an animated GIF into glyph frames `target_width` columns wide.
///
/// A leading `~/` in `path` is expanded to the home directory. Frames with no
/// authored delay last `1 / fallback_fps` seconds.
///
/// ## Example
///
/// ```rust
/// let set = animatedfetch::load("/nonexistent/path", 40, 10.0);
/// assert_eq!(set.frame_count(), 0);
/// assert!(!set.is_degraded());
/// ```
pub fn load(path: impl AsRef<Path>, target_width: u32, fallback_fps: f64) -> AnimationSet {
    let path = expand_home(path.as_ref());

    if !path.exists() {
        debug!(path = %path.display(), "animation source not found, animation disabled");
        return AnimationSet::with_status(Vec::new(), LoadStatus::Missing, fallback_fps);
    }

    let decoder = File::open(&path)
        .map_err(ImageError::IoError)
        .and_then(|file| GifDecoder::new(BufReader::new(file)));

    match decoder {
        Ok(decoder) => {
            let set = AnimationSet::from_decoded(decoder.into_frames(), target_width, fallback_fps);
            if set.is_empty() {
                debug!(path = %path.display(), "animation source has no frames");
            } else {
                debug!(
                    path = %path.display(),
                    frames = set.frame_count(),
                    cycle = ?set.cycle_duration(),
                    "animation loaded"
                );
            }
            set
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to open animation");
            AnimationSet::with_status(
                Vec::new(),
                LoadStatus::Degraded {
                    reason: err.to_string(),
                },
                fallback_fps,
            )
        }
    }
}

/// Duration of one frame at `fps` frames per second.
///
/// Non-positive or non-finite rates fall back to [`DEFAULT_FPS`].
pub fn fallback_duration(fps: f64) -> Duration {
    let fps = if fps.is_finite() && fps > 0.0 { fps } else { DEFAULT_FPS };
    Duration::from_nanos((1e9 / fps).round() as u64)
}

fn frame_duration(delay: Delay, fallback: Duration) -> Duration {
    let (numer, denom) = delay.numer_denom_ms();
    if numer == 0 || denom == 0 {
        return fallback;
    }
    Duration::from_nanos(numer as u64 * 1_000_000 / denom as u64)
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
