/// Overlay of braille dots (U+2800..U+28FF) used for borders and outlines.
/// Every character cell holds 2x4 dots, so a canvas of `cols` x `rows`
/// cells addresses `cols * 2` x `rows * 4` pixels.
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    /// Dot bit patterns, row-major, one byte per character cell
    cells: Vec<u8>,
}

/// Dot bit by `[y % 4][x % 2]` within a cell
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

impl BrailleCanvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![0u8; cols * rows],
        }
    }

    /// Turn on the dot at pixel (x, y); off-canvas pixels are dropped
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (col, row) = (x / 2, y / 4);
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] |= DOT_BITS[y % 4][x % 2];
        }
    }

    /// Line rasterizers work in signed pixels; negatives are off-canvas
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            self.set_pixel(x, y);
        }
    }

    /// Braille glyph for a cell, None if no dot is set
    #[inline(always)]
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        match self.cells[row * self.cols + col] {
            0 => None,
            bits => char::from_u32(0x2800 + bits as u32),
        }
    }

    /// Whole canvas as text, blank cells as U+2800
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 3 + self.rows);
        for row in 0..self.rows {
            if row > 0 {
                out.push('\n');
            }
            for col in 0..self.cols {
                out.push(self.glyph(col, row).unwrap_or('\u{2800}'));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_positions() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁");
        canvas.set_pixel(1, 3);
        assert_eq!(canvas.to_string(), "⢁");
    }

    #[test]
    fn test_full_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        (0..2).for_each(|x| (0..4).for_each(|y| canvas.set_pixel(x, y)));
        assert_eq!(canvas.to_string(), "⣿");
    }

    #[test]
    fn test_glyph_lookup() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(3, 7);
        canvas.set_pixel_signed(-1, 2);
        canvas.set_pixel(100, 100);
        assert_eq!(canvas.glyph(0, 0), None);
        assert_eq!(canvas.glyph(1, 1), Some('⢀'));
        assert_eq!(canvas.glyph(5, 0), None);
        assert_eq!(canvas.to_string(), "\u{2800}\u{2800}\n\u{2800}⢀");
    }
}
