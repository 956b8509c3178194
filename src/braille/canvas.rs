/// Offscreen dot grid rendered as Unicode braille (U+2800 to U+28FF).
/// Every character cell holds 2x4 dots, so a canvas of `cols` x `rows`
/// cells has `2 * cols` x `4 * rows` addressable pixels.
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    cells: Vec<u8>,
}

/// Bit of a dot inside its cell:
/// ```text
/// (0,0) (1,0)   0x01 0x08
/// (0,1) (1,1)   0x02 0x10
/// (0,2) (1,2)   0x04 0x20
/// (0,3) (1,3)   0x40 0x80
/// ```
#[inline(always)]
fn dot_bit(dx: usize, dy: usize) -> u8 {
    const LEFT: [u8; 4] = [0x01, 0x02, 0x04, 0x40];
    const RIGHT: [u8; 4] = [0x08, 0x10, 0x20, 0x80];
    if dx == 0 {
        LEFT[dy]
    } else {
        RIGHT[dy]
    }
}

impl BrailleCanvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
        }
    }

    /// Light the dot at pixel (x, y). Anything off the canvas is ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (col, row) = (x / 2, y / 4);
        if col >= self.cols || row >= self.rows {
            return;
        }
        self.cells[row * self.cols + col] |= dot_bit(x % 2, y % 4);
    }

    /// Lit cells as (column, row, glyph); blank cells are skipped.
    pub fn glyphs(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, &bits)| {
            if bits == 0 {
                return None;
            }
            let glyph = char::from_u32(0x2800 + bits as u32)?;
            Some((i % self.cols, i / self.cols, glyph))
        })
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| {
                row.iter()
                    .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
