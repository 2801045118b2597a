//! Glyph rendering for decoded frames.

use std::fmt::Write as _;

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use image::RgbImage;

use crate::{GlyphCell, GlyphGrid, BLOCK};

/// Convert an RGB bitmap into a glyph grid, one cell per pixel.
///
/// Cells keep the exact pixel color; there is no dithering or palette
/// reduction. The same bitmap always yields the same grid.
///
/// ## Example
///
/// ```rust
/// use image::{Rgb, RgbImage};
///
/// let bitmap = RgbImage::from_fn(3, 2, |x, _| Rgb([x as u8 * 100, 0, 0]));
/// let grid = animatedfetch::render::render(&bitmap);
///
/// assert_eq!(grid.dimensions(), (3, 2));
/// assert_eq!(grid.rgb_at(1, 2), Some((200, 0, 0)));
/// ```
pub fn render(bitmap: &RgbImage) -> GlyphGrid {
    let (width, height) = bitmap.dimensions();
    let cells = bitmap
        .pixels()
        .enumerate()
        .map(|(ordinal, px)| GlyphCell::new(px[0], px[1], px[2], ordinal as u32))
        .collect();

    GlyphGrid::new(width, height, cells)
}

/// A run of consecutive glyphs with the same color within one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRun {
    /// Number of glyphs in the run
    pub len: u32,
    /// RGB color as (r, g, b)
    pub color: (u8, u8, u8),
}

impl GlyphRun {
    /// The glyphs this run draws.
    pub fn text(&self) -> String {
        std::iter::repeat(BLOCK).take(self.len as usize).collect()
    }
}

/// Group a row of cells into same-colored runs.
///
/// Consecutive cells with the same color share one color escape when the
/// row is written to the terminal.
///
/// ```rust
/// use animatedfetch::GlyphCell;
/// use animatedfetch::render::row_runs;
///
/// let row = [
///     GlyphCell::new(255, 0, 0, 0),
///     GlyphCell::new(255, 0, 0, 1),
///     GlyphCell::new(0, 255, 0, 2),
/// ];
///
/// // Two runs: two red glyphs, then one green
/// let runs = row_runs(&row);
/// assert_eq!(runs.len(), 2);
/// assert_eq!(runs[0].len, 2);
/// ```
pub fn row_runs(row: &[GlyphCell]) -> Vec<GlyphRun> {
    let mut runs: Vec<GlyphRun> = Vec::new();

    for cell in row {
        if let Some(run) = runs.last_mut() {
            if run.color == cell.rgb() {
                run.len += 1;
                continue;
            }
        }
        runs.push(GlyphRun {
            len: 1,
            color: cell.rgb(),
        });
    }

    runs
}

/// Serialize one row as a terminal line with 24-bit foreground colors.
///
/// The line ends with a color reset so nothing leaks into following text.
pub fn ansi_row(row: &[GlyphCell]) -> String {
    let mut line = String::with_capacity(row.len() * 4);

    for run in row_runs(row) {
        let (r, g, b) = run.color;
        let _ = write!(line, "{}{}", SetForegroundColor(Color::Rgb { r, g, b }), run.text());
    }
    if !row.is_empty() {
        let _ = write!(line, "{}", ResetColor);
    }

    line
}

/// Serialize every row of a grid as terminal lines.
pub fn ansi_lines(grid: &GlyphGrid) -> Vec<String> {
    grid.rows().map(ansi_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]))
    }

    #[test]
    fn test_render_one_cell_per_pixel() {
        let grid = render(&gradient(4, 3));

        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.cell_count(), 12);
        assert_eq!(grid.rgb_at(2, 3), Some((30, 40, 7)));
        assert_eq!(grid.cell_at(2, 3).map(|c| c.ordinal), Some(11));
    }

    #[test]
    fn test_render_is_deterministic() {
        let bitmap = gradient(9, 5);
        assert_eq!(render(&bitmap), render(&bitmap));
    }

    #[test]
    fn test_row_runs() {
        let row = [
            GlyphCell::new(1, 2, 3, 0),
            GlyphCell::new(1, 2, 3, 1),
            GlyphCell::new(9, 9, 9, 2),
            GlyphCell::new(1, 2, 3, 3),
        ];
        let runs = row_runs(&row);

        assert_eq!(
            runs,
            vec![
                GlyphRun { len: 2, color: (1, 2, 3) },
                GlyphRun { len: 1, color: (9, 9, 9) },
                GlyphRun { len: 1, color: (1, 2, 3) },
            ]
        );
        assert_eq!(runs[0].text(), "██");
    }

    #[test]
    fn test_ansi_lines_one_per_row() {
        let grid = render(&gradient(3, 2));
        let lines = ansi_lines(&grid);

        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.chars().filter(|&c| c == BLOCK).count(), 3);
        }
        assert!(ansi_row(&[]).is_empty());
    }
}
