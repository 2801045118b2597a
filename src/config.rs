//! Configuration loading.
//!
//! Settings live in a TOML file, by default
//! `<config dir>/animatedfetch/config.toml`. Every table and field is
//! optional; anything missing takes its default value.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::loader::{expand_home, DEFAULT_FPS};

/// Default playback budget in seconds.
pub const DEFAULT_DURATION_SECS: f64 = 5.0;

const CONFIG_HEADER: &str = "\
# animatedfetch configuration file
# All tables and fields are optional; missing values use the defaults below.

";

/// Errors from reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no configuration directory available")]
    NoConfigDir,
}

/// All settings.
///
/// Arrays given in the file replace the default arrays; omitted arrays keep
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub animation: AnimationSettings,
    pub layout: LayoutSettings,
    pub colors: ColorSettings,
    pub info_sections: Vec<InfoSection>,
    pub buttons: Vec<Button>,
}

/// The `[animation]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Show the animation at all
    pub enabled: bool,
    /// GIF to play; a leading `~` expands to the home directory
    pub path: String,
    /// Frame width in terminal columns
    pub width: u32,
    /// Rate for frames that carry no delay of their own
    pub fps: f64,
    /// Playback budget in seconds before the display settles
    pub duration: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.config/animatedfetch/animation.gif".to_string(),
            width: 40,
            fps: DEFAULT_FPS,
            duration: DEFAULT_DURATION_SECS,
        }
    }
}

/// The `[layout]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub title: String,
    pub show_hostname: bool,
    pub separator: String,
    /// Columns between the animation and the info panel
    pub padding: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            title: "System Information".to_string(),
            show_hostname: true,
            separator: "─".to_string(),
            padding: 2,
        }
    }
}

/// The `[colors]` table: style strings for fixed layout elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub title: String,
    pub label: String,
    pub separator: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            title: "bold cyan".to_string(),
            label: "bold".to_string(),
            separator: "dim".to_string(),
        }
    }
}

/// One row of the info panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoSection {
    /// Text shown before the value; the key is used when empty
    pub label: String,
    /// Metrics key to display
    pub key: String,
    pub color: String,
}

impl InfoSection {
    pub fn new(label: &str, key: &str, color: &str) -> Self {
        Self {
            label: label.to_string(),
            key: key.to_string(),
            color: color.to_string(),
        }
    }

    /// The label to display.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

impl Default for InfoSection {
    fn default() -> Self {
        Self::new("", "", "white")
    }
}

/// One entry of the actions panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Button {
    pub label: String,
    /// Shell command run when the button is chosen
    pub command: String,
    /// Input that selects the button
    pub key: String,
    pub color: String,
}

impl Button {
    pub fn new(label: &str, command: &str, key: &str, color: &str) -> Self {
        Self {
            label: label.to_string(),
            command: command.to_string(),
            key: key.to_string(),
            color: color.to_string(),
        }
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new("Unknown", "", "", "white")
    }
}

fn default_info_sections() -> Vec<InfoSection> {
    vec![
        InfoSection::new("OS", "os", "cyan"),
        InfoSection::new("Kernel", "kernel", "blue"),
        InfoSection::new("Uptime", "uptime", "green"),
        InfoSection::new("Shell", "shell", "yellow"),
        InfoSection::new("Terminal", "terminal", "magenta"),
        InfoSection::new("CPU", "cpu", "red"),
        InfoSection::new("Memory", "memory", "cyan"),
        InfoSection::new("Disk", "disk", "blue"),
    ]
}

fn default_buttons() -> Vec<Button> {
    vec![
        Button::new("System Update", "sudo apt update && sudo apt upgrade", "u", "green"),
        Button::new("Neofetch", "neofetch", "n", "cyan"),
        Button::new("Disk Usage", "df -h", "d", "yellow"),
        Button::new("Top Processes", "top", "t", "red"),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            animation: AnimationSettings::default(),
            layout: LayoutSettings::default(),
            colors: ColorSettings::default(),
            info_sections: default_info_sections(),
            buttons: default_buttons(),
        }
    }
}

impl Settings {
    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "animatedfetch").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parse a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read and parse a configuration file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings, falling back to the defaults.
    ///
    /// Uses `path` or the default location. A missing file silently yields
    /// the defaults; an unreadable or invalid one logs a warning first.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => expand_home(&path),
            None => return Self::default(),
        };

        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Self::default();
        }

        match Self::read(&path) {
            Ok(settings) => settings.validated(),
            Err(err) => {
                warn!(error = %err, "using default configuration");
                Self::default()
            }
        }
    }

    /// Clamp values that would break loading or playback.
    pub fn validated(mut self) -> Self {
        let anim = &mut self.animation;
        if anim.width == 0 {
            warn!("animation.width must be at least 1, using 1");
            anim.width = 1;
        }
        if !(anim.fps.is_finite() && anim.fps > 0.0) {
            warn!(fps = anim.fps, "animation.fps must be positive, using {}", DEFAULT_FPS);
            anim.fps = DEFAULT_FPS;
        }
        if !(anim.duration.is_finite() && anim.duration >= 0.0) {
            warn!(duration = anim.duration, "animation.duration must be non-negative, using {}", DEFAULT_DURATION_SECS);
            anim.duration = DEFAULT_DURATION_SECS;
        }
        self
    }

    /// How long animated playback runs before settling.
    pub fn playback_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.animation.duration).unwrap_or(Duration::MAX)
    }

    /// The animation path with `~` expanded.
    pub fn animation_path(&self) -> PathBuf {
        expand_home(Path::new(&self.animation.path))
    }
}

/// Write the default configuration to `path` (or the default location).
///
/// Parent directories are created as needed. Returns the written path.
pub fn create_default_config(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(path) => expand_home(path),
        None => Settings::default_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
    }

    let content = format!("{}{}", CONFIG_HEADER, Settings::default().to_toml()?);
    fs::write(&path, content).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
