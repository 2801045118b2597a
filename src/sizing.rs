//! Grid sizing for fitting decoded frames onto terminal cells.

/// Grid sizing configuration and calculations.
///
/// Terminal cells are roughly twice as tall as they are wide, so a frame
/// scaled to `width` columns needs about half as many rows as its pixel
/// aspect ratio would suggest.
#[derive(Clone, Debug)]
pub struct GridSizing {
    /// Height correction applied to the source aspect ratio (typically 0.5)
    pub char_aspect: f64,
    /// Minimum allowed grid height in rows
    pub min_height: u32,
}

impl Default for GridSizing {
    fn default() -> Self {
        Self {
            char_aspect: 0.5,
            min_height: 1,
        }
    }
}

impl GridSizing {
    /// Calculate grid dimensions using default ratios.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use animatedfetch::GridSizing;
    ///
    /// // A square 100x100 source at 40 columns becomes 40x20 cells
    /// assert_eq!(GridSizing::calculate(40, 100, 100), (40, 20));
    /// ```
    pub fn calculate(target_width: u32, source_width: u32, source_height: u32) -> (u32, u32) {
        Self::default().grid_dimensions(target_width, source_width, source_height)
    }

    /// Calculate the number of rows for a source frame at `target_width` columns.
    ///
    /// `round(target_width * source_height / source_width * char_aspect)`,
    /// never below `min_height`.
    pub fn grid_height(&self, target_width: u32, source_width: u32, source_height: u32) -> u32 {
        if source_width == 0 || source_height == 0 {
            return self.min_height;
        }

        let aspect = source_height as f64 / source_width as f64;
        let rows = (target_width as f64 * aspect * self.char_aspect).round();

        (rows as u32).max(self.min_height)
    }

    /// Calculate (columns, rows) for a source frame.
    pub fn grid_dimensions(&self, target_width: u32, source_width: u32, source_height: u32) -> (u32, u32) {
        let width = target_width.max(1);
        (width, self.grid_height(width, source_width, source_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_source() {
        let sizing = GridSizing::default();
        assert_eq!(sizing.grid_height(40, 100, 100), 20);
        assert_eq!(sizing.grid_height(10, 64, 64), 5);
    }

    #[test]
    fn test_rounds_to_nearest() {
        let sizing = GridSizing::default();
        // 10 * (100 / 300) * 0.5 = 1.67
        assert_eq!(sizing.grid_height(10, 300, 100), 2);
        // 10 * (50 / 80) * 0.5 = 3.125
        assert_eq!(sizing.grid_height(10, 80, 50), 3);
        // 7 * 1.0 * 0.5 = 3.5 rounds away from zero
        assert_eq!(sizing.grid_height(7, 10, 10), 4);
    }

    #[test]
    fn test_minimum_height() {
        let sizing = GridSizing::default();
        assert_eq!(sizing.grid_height(10, 1000, 10), 1);
        assert_eq!(sizing.grid_height(10, 0, 10), 1);
        assert_eq!(sizing.grid_height(10, 10, 0), 1);
    }

    #[test]
    fn test_grid_dimensions_clamps_width() {
        assert_eq!(GridSizing::calculate(0, 10, 10), (1, 1));
        assert_eq!(GridSizing::calculate(20, 40, 80), (20, 20));
    }
}
