//! Core data structures for glyph frames.

use std::time::Duration;

/// The filled block every glyph cell is drawn with.
pub const BLOCK: char = '█';

/// A single colored terminal cell produced from one source pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphCell {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Row-major position of the cell within its grid
    pub ordinal: u32,
}

impl GlyphCell {
    /// Create a new cell.
    pub fn new(r: u8, g: u8, b: u8, ordinal: u32) -> Self {
        Self { r, g, b, ordinal }
    }

    /// Get the color as an `(r, g, b)` tuple.
    #[inline]
    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// The visual symbol drawn for this cell.
    #[inline]
    pub fn symbol(&self) -> char {
        BLOCK
    }
}

/// Colored glyph data for one frame.
///
/// Cells are stored row-major in a single vector; `rows()` hands them out
/// one row at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Grid width in characters
    pub width: u32,
    /// Grid height in characters
    pub height: u32,
    cells: Vec<GlyphCell>,
}

impl GlyphGrid {
    /// Create a grid from row-major cells.
    ///
    /// `cells.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, cells: Vec<GlyphCell>) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self { width, height, cells }
    }

    /// A grid with no cells.
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    /// Get the cell at the given position.
    ///
    /// Returns None if position is out of bounds.
    #[inline]
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&GlyphCell> {
        let width = self.width as usize;
        if row < self.height as usize && col < width {
            self.cells.get(row * width + col)
        } else {
            None
        }
    }

    /// Get the RGB color at the given position.
    #[inline]
    pub fn rgb_at(&self, row: usize, col: usize) -> Option<(u8, u8, u8)> {
        self.cell_at(row, col).map(GlyphCell::rgb)
    }

    /// Get one row of cells.
    pub fn row(&self, row: usize) -> Option<&[GlyphCell]> {
        let width = self.width as usize;
        if row < self.height as usize {
            self.cells.get(row * width..(row + 1) * width)
        } else {
            None
        }
    }

    /// Iterate over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[GlyphCell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[GlyphCell] {
        &self.cells
    }

    /// Grid dimensions as (columns, rows).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A decoded animation frame: its glyph grid and how long it stays on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Colored glyphs for this frame
    pub grid: GlyphGrid,
    /// Authored display duration
    pub duration: Duration,
}

impl Frame {
    /// Create a new frame.
    pub fn new(grid: GlyphGrid, duration: Duration) -> Self {
        Self { grid, duration }
    }

    /// A frame with an empty grid, used where no frame exists.
    pub fn empty(duration: Duration) -> Self {
        Self {
            grid: GlyphGrid::empty(),
            duration,
        }
    }

    /// Check if this frame has anything to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}
