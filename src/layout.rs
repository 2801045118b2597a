//! Layout composition.
//!
//! Merges one glyph frame with the info panel and the actions panel into a
//! block of terminal lines. Widths are measured on the unstyled text so
//! styling never affects alignment.

use unicode_width::UnicodeWidthStr;

use crate::color::TextStyle;
use crate::config::Settings;
use crate::metrics::Metrics;
use crate::render::ansi_lines;
use crate::GlyphGrid;

const ACTIONS_TITLE: &str = " Actions ";

/// A piece of text with a single style.
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: TextStyle,
}

/// A line of styled spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    /// Create an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// A line with one styled span.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self::new().push(text, style)
    }

    /// Append a span.
    pub fn push(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style,
        });
        self
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.width()).sum()
    }

    /// The unstyled text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// The text with style escapes, ready to print.
    pub fn render(&self) -> String {
        self.spans
            .iter()
            .map(|span| {
                if span.style.is_plain() {
                    span.text.clone()
                } else {
                    span.style.apply(&span.text).to_string()
                }
            })
            .collect()
    }
}

fn pad_to(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Composes the full display from settings and a metrics snapshot.
#[derive(Clone, Debug)]
pub struct Layout<'a> {
    settings: &'a Settings,
    metrics: &'a Metrics,
    max_width: Option<usize>,
}

impl<'a> Layout<'a> {
    pub fn new(settings: &'a Settings, metrics: &'a Metrics) -> Self {
        Self {
            settings,
            metrics,
            max_width: None,
        }
    }

    /// Limit the side-by-side layout to `max_width` columns; wider content
    /// stacks the frame above the info panel.
    pub fn with_max_width(mut self, max_width: Option<usize>) -> Self {
        self.max_width = max_width;
        self
    }

    /// The info panel: optional host header, then one line per info
    /// section whose key is present in the metrics.
    ///
    /// The separator under the host line spans the widest line of the panel.
    pub fn info_lines(&self) -> Vec<Line> {
        let layout = &self.settings.layout;
        let colors = &self.settings.colors;

        let sections: Vec<_> = self
            .settings
            .info_sections
            .iter()
            .filter_map(|section| {
                self.metrics
                    .get(&section.key)
                    .map(|value| (section, value))
            })
            .collect();

        let host_label = "Host";
        let label_width = sections
            .iter()
            .map(|(section, _)| section.display_label().width())
            .chain(layout.show_hostname.then(|| host_label.width()))
            .max()
            .unwrap_or(0);

        let rows: Vec<Line> = sections
            .into_iter()
            .map(|(section, value)| {
                let style = TextStyle::parse(&format!("{} {}", colors.label, section.color));
                Line::styled(pad_to(section.display_label(), label_width), style)
                    .push("  ", TextStyle::default())
                    .push(value.as_str(), TextStyle::default())
            })
            .collect();

        if !layout.show_hostname {
            return rows;
        }

        let hostname = self
            .metrics
            .get("hostname")
            .map(String::as_str)
            .unwrap_or("unknown");
        let host = Line::styled(pad_to(host_label, label_width), TextStyle::parse(&colors.title))
            .push("  ", TextStyle::default())
            .push(hostname, TextStyle::parse("bold"));

        let panel_width = rows.iter().map(Line::width).max().unwrap_or(0).max(host.width());
        let repeats = match layout.separator.width() {
            0 => 0,
            w => panel_width / w,
        };
        let separator = Line::styled(
            layout.separator.repeat(repeats),
            TextStyle::parse(&colors.separator),
        );

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(host);
        lines.push(separator);
        lines.extend(rows);
        lines
    }

    /// The actions panel: a rounded box with one `[key] label` row per
    /// button. Empty when no buttons are configured.
    pub fn action_lines(&self) -> Vec<Line> {
        let buttons = &self.settings.buttons;
        if buttons.is_empty() {
            return Vec::new();
        }

        let rows: Vec<Line> = buttons
            .iter()
            .map(|button| {
                Line::styled(format!("[{}]", button.key), TextStyle::bold_color(&button.color))
                    .push(" ", TextStyle::default())
                    .push(button.label.as_str(), TextStyle::default())
            })
            .collect();

        let title_width = ACTIONS_TITLE.width();
        let inner = rows
            .iter()
            .map(Line::width)
            .max()
            .unwrap_or(0)
            .max(title_width);
        let border = TextStyle::parse("blue");

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(
            Line::styled("╭─", border)
                .push(ACTIONS_TITLE, TextStyle::parse("bold"))
                .push(format!("{}╮", "─".repeat(inner + 1 - title_width)), border),
        );
        for row in rows {
            let fill = " ".repeat(inner - row.width());
            let mut line = Line::styled("│ ", border);
            line.spans.extend(row.spans);
            lines.push(line.push(fill, TextStyle::default()).push(" │", border));
        }
        lines.push(Line::styled(format!("╰{}╯", "─".repeat(inner + 2)), border));

        lines
    }

    /// Compose the full display around `frame`.
    ///
    /// An empty or absent frame yields the plain info layout.
    pub fn compose(&self, frame: Option<&GlyphGrid>) -> Vec<String> {
        let settings = self.settings;
        let mut out = vec![
            String::new(),
            Line::styled(settings.layout.title.as_str(), TextStyle::parse(&settings.colors.title)).render(),
            String::new(),
        ];

        let info = self.info_lines();
        match frame.filter(|grid| !grid.is_empty()) {
            Some(grid) => {
                let frame_lines = ansi_lines(grid);
                let frame_width = grid.width as usize;
                let gap = settings.layout.padding;
                let info_width = info.iter().map(Line::width).max().unwrap_or(0);
                let fits = self
                    .max_width
                    .map_or(true, |max| frame_width + gap + info_width <= max);

                if fits {
                    let rows = frame_lines.len().max(info.len());
                    for i in 0..rows {
                        let mut line = match frame_lines.get(i) {
                            Some(glyphs) => glyphs.clone(),
                            None => " ".repeat(frame_width),
                        };
                        if let Some(info_line) = info.get(i) {
                            line.push_str(&" ".repeat(gap));
                            line.push_str(&info_line.render());
                        }
                        out.push(line);
                    }
                } else {
                    out.extend(frame_lines);
                    out.push(String::new());
                    out.extend(info.iter().map(Line::render));
                }
            }
            None => out.extend(info.iter().map(Line::render)),
        }

        let actions = self.action_lines();
        if !actions.is_empty() {
            out.push(String::new());
            out.extend(actions.iter().map(Line::render));
        }
        out.push(String::new());

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Button, InfoSection};
    use crate::GlyphCell;
    use pretty_assertions::assert_eq;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn metrics() -> Metrics {
        [("hostname", "box"), ("os", "Debian 12"), ("kernel", "6.1.0"), ("cpu", "Ryzen")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.info_sections = vec![
            InfoSection::new("OS", "os", "cyan"),
            InfoSection::new("Kernel", "kernel", "blue"),
            InfoSection::new("Disk", "disk", "blue"),
        ];
        settings.buttons = vec![
            Button::new("Disk Usage", "df -h", "d", "yellow"),
            Button::new("Top", "top", "t", "red"),
        ];
        settings
    }

    fn solid_grid(width: u32, height: u32) -> GlyphGrid {
        let cells = (0..width * height).map(|i| GlyphCell::new(9, 9, 9, i)).collect();
        GlyphGrid::new(width, height, cells)
    }

    #[test]
    fn line_width_ignores_style() {
        let line = Line::styled("ab", TextStyle::parse("bold red")).push("─c", TextStyle::default());
        assert_eq!(line.width(), 4);
        assert_eq!(line.text(), "ab─c");
        assert_eq!(strip_ansi(&line.render()), "ab─c");
    }

    #[test]
    fn info_lines_skip_missing_metrics() {
        let settings = settings();
        let metrics = metrics();
        let layout = Layout::new(&settings, &metrics);
        let lines: Vec<String> = layout.info_lines().iter().map(Line::text).collect();

        assert_eq!(
            lines,
            vec![
                "Host    box".to_string(),
                "─".repeat(17),
                "OS      Debian 12".to_string(),
                "Kernel  6.1.0".to_string(),
            ]
        );
    }

    #[test]
    fn info_lines_without_hostname() {
        let mut settings = settings();
        settings.layout.show_hostname = false;
        let metrics = metrics();
        let lines: Vec<String> = Layout::new(&settings, &metrics)
            .info_lines()
            .iter()
            .map(Line::text)
            .collect();

        assert_eq!(lines, vec!["OS      Debian 12", "Kernel  6.1.0"]);
    }

    #[test]
    fn actions_panel_is_a_closed_box() {
        let settings = settings();
        let metrics = metrics();
        let lines = Layout::new(&settings, &metrics).action_lines();

        let texts: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(
            texts,
            vec![
                format!("╭─ Actions {}╮", "─".repeat(6)),
                "│ [d] Disk Usage │".to_string(),
                "│ [t] Top        │".to_string(),
                format!("╰{}╯", "─".repeat(16)),
            ]
        );
        let widths: Vec<usize> = lines.iter().map(Line::width).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
    }

    #[test]
    fn no_buttons_no_panel() {
        let mut settings = settings();
        settings.buttons.clear();
        let metrics = metrics();
        assert!(Layout::new(&settings, &metrics).action_lines().is_empty());
    }

    #[test]
    fn compose_places_frame_beside_info() {
        let settings = settings();
        let metrics = metrics();
        let grid = solid_grid(3, 2);
        let lines: Vec<String> = Layout::new(&settings, &metrics)
            .compose(Some(&grid))
            .iter()
            .map(|l| strip_ansi(l))
            .collect();

        assert_eq!(lines[1], "System Information");
        assert_eq!(lines[3], "███  Host    box");
        assert_eq!(lines[4], format!("███  {}", "─".repeat(17)));
        assert_eq!(lines[5], "     OS      Debian 12");
        assert_eq!(lines[6], "     Kernel  6.1.0");
        assert_eq!(lines[7], "");
        assert!(lines[8].starts_with("╭─ Actions"));
        assert_eq!(lines.last().map(String::as_str), Some(""));
    }

    #[test]
    fn default_layout_fits_eighty_columns() {
        let settings = Settings::default();
        let metrics: Metrics = [
            ("hostname", "box"),
            ("os", "Debian GNU/Linux 12"),
            ("kernel", "6.1.0-18-amd64"),
            ("uptime", "2d 3h 4m"),
            ("memory", "1.5GB / 4.0GB (37.5%)"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let grid = solid_grid(40, 20);

        let layout = Layout::new(&settings, &metrics).with_max_width(Some(80));
        let lines: Vec<String> = layout.compose(Some(&grid)).iter().map(|l| strip_ansi(l)).collect();

        assert_eq!(lines[3], format!("{}  Host    box", "█".repeat(40)));
        let separator = &lines[4][lines[4].find("  ").unwrap() + 2..];
        assert_eq!(separator.chars().count(), "Memory  1.5GB / 4.0GB (37.5%)".len());
    }

    #[test]
    fn separator_follows_widest_line() {
        let mut settings = settings();
        settings.layout.separator = "=-".to_string();
        let metrics = metrics();
        let lines = Layout::new(&settings, &metrics).info_lines();

        assert_eq!(lines[1].text(), "=-".repeat(8));
    }

    #[test]
    fn compose_stacks_when_too_narrow() {
        let settings = settings();
        let metrics = metrics();
        let grid = solid_grid(30, 2);
        let lines: Vec<String> = Layout::new(&settings, &metrics)
            .with_max_width(Some(40))
            .compose(Some(&grid))
            .iter()
            .map(|l| strip_ansi(l))
            .collect();

        assert_eq!(lines[3], "█".repeat(30));
        assert_eq!(lines[4], "█".repeat(30));
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Host    box");
    }

    #[test]
    fn compose_without_frame() {
        let settings = settings();
        let metrics = metrics();
        let layout = Layout::new(&settings, &metrics);

        let empty = GlyphGrid::empty();
        assert_eq!(layout.compose(None), layout.compose(Some(&empty)));

        let lines: Vec<String> = layout.compose(None).iter().map(|l| strip_ansi(l)).collect();
        assert_eq!(lines[3], "Host    box");
    }
}
