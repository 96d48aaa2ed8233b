use super::error::{QRError, QRResult};
use super::metadata::{ECLevel, Version, MAX_VERSION, MIN_VERSION};

// Error correction tables, indexed by level then version. Column 0 is unused.
//------------------------------------------------------------------------------

static EC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

static NUM_EC_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

fn level_index(ecl: ECLevel) -> usize {
    match ecl {
        ECLevel::L => 0,
        ECLevel::M => 1,
        ECLevel::Q => 2,
        ECLevel::H => 3,
    }
}

fn check_version(ver: u8) -> QRResult<usize> {
    if !(MIN_VERSION..=MAX_VERSION).contains(&ver) {
        return Err(QRError::InvalidVersion(ver as i64));
    }
    Ok(ver as usize)
}

/// Modules left for codewords and remainder bits once function patterns are drawn.
pub fn raw_data_modules(ver: u8) -> usize {
    let v = ver as usize;
    let mut res = (16 * v + 128) * v + 64;
    if v >= 2 {
        let n = v / 7 + 2;
        res -= (25 * n - 10) * n - 55;
        if v >= 7 {
            res -= 36;
        }
    }
    res
}

/// Alignment pattern centers along one axis, ascending.
pub fn alignment_positions(ver: u8) -> Vec<usize> {
    if ver < 2 {
        return Vec::new();
    }
    let v = ver as usize;
    let n = v / 7 + 2;
    let step = if v == 32 { 26 } else { (v * 4 + n * 2 + 1) / (n * 2 - 2) * 2 };
    let w = Version::width(ver) as usize;
    let mut res: Vec<usize> = (0..n - 1).map(|i| w - 7 - i * step).collect();
    res.push(6);
    res.reverse();
    res
}

// Block layout
//------------------------------------------------------------------------------

/// How the interleaved codeword stream splits into Reed-Solomon blocks.
///
/// Short blocks come first. Long blocks carry one extra data codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    blocks: usize,
    short_blocks: usize,
    short_data_len: usize,
    data_len: usize,
    ec_per_block: usize,
    correctable: usize,
}

impl BlockLayout {
    pub fn new(ver: u8, ecl: ECLevel) -> QRResult<Self> {
        let v = check_version(ver)?;
        let l = level_index(ecl);
        let blocks = NUM_EC_BLOCKS[l][v] as usize;
        let ec_per_block = EC_CODEWORDS_PER_BLOCK[l][v] as usize;
        let raw = raw_data_modules(ver) / 8;

        // Codewords small symbols hold back against misdecoding
        let reserved = match (ver, ecl) {
            (1, ECLevel::L) => 3,
            (2, ECLevel::L) | (1, ECLevel::M) => 2,
            (1, _) | (3, ECLevel::L) => 1,
            _ => 0,
        };

        Ok(Self {
            blocks,
            short_blocks: blocks - raw % blocks,
            short_data_len: raw / blocks - ec_per_block,
            data_len: raw - blocks * ec_per_block,
            ec_per_block,
            correctable: (ec_per_block - reserved) / 2,
        })
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn data_codewords(&self) -> usize {
        self.data_len
    }

    pub fn total_codewords(&self) -> usize {
        self.data_len + self.blocks * self.ec_per_block
    }

    /// Errors one block can correct.
    pub fn correctable(&self) -> usize {
        self.correctable
    }

    /// Block that owns the codeword at `idx` of the interleaved stream.
    pub fn block_of(&self, idx: usize) -> usize {
        let full_rows = self.short_data_len * self.blocks;
        if idx >= self.data_len {
            (idx - self.data_len) % self.blocks
        } else if idx < full_rows {
            idx % self.blocks
        } else {
            // Trailing data codewords exist in long blocks only
            self.short_blocks + idx - full_rows
        }
    }
}

// Symbol layout
//------------------------------------------------------------------------------

/// What a module of the symbol carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Finder, separator, timing, format and version modules, plus the bottom right alignment
    /// pattern readers use to fit the grid.
    Reserved,
    /// Any other alignment pattern.
    Alignment,
    /// A bit of the codeword at this index of the interleaved stream.
    Codeword(u16),
    Remainder,
}

/// Damage done by covering a set of modules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Damage {
    pub reserved: usize,
    pub lost_per_block: Vec<usize>,
}

impl Damage {
    pub fn worst_block(&self) -> usize {
        self.lost_per_block.iter().copied().max().unwrap_or(0)
    }

    pub fn lost_codewords(&self) -> usize {
        self.lost_per_block.iter().sum()
    }
}

/// Role of every module of a symbol of one version and level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLayout {
    ver: u8,
    w: usize,
    cells: Vec<Cell>,
    blocks: BlockLayout,
}

impl SymbolLayout {
    pub fn new(ver: u8, ecl: ECLevel) -> QRResult<Self> {
        let blocks = BlockLayout::new(ver, ecl)?;
        let w = Version::width(ver) as usize;
        let mut layout = Self { ver, w, cells: vec![Cell::Remainder; w * w], blocks };
        layout.mark_function_patterns();
        layout.place_codewords();
        Ok(layout)
    }

    pub fn version(&self) -> u8 {
        self.ver
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn blocks(&self) -> &BlockLayout {
        &self.blocks
    }

    pub fn cell(&self, r: usize, c: usize) -> Cell {
        debug_assert!(r < self.w && c < self.w, "Module out of bounds: {r} {c}");
        self.cells[r * self.w + c]
    }

    /// Counts what is lost when the modules flagged in `covered` (row major) are overwritten.
    pub fn assess(&self, covered: &[bool]) -> Damage {
        debug_assert_eq!(covered.len(), self.cells.len());

        let mut lost = vec![false; self.blocks.total_codewords()];
        let mut damage = Damage { reserved: 0, lost_per_block: vec![0; self.blocks.blocks()] };
        for (cell, _) in self.cells.iter().zip(covered).filter(|&(_, &hit)| hit) {
            match *cell {
                Cell::Reserved => damage.reserved += 1,
                Cell::Codeword(idx) => {
                    let idx = idx as usize;
                    if !lost[idx] {
                        lost[idx] = true;
                        damage.lost_per_block[self.blocks.block_of(idx)] += 1;
                    }
                }
                Cell::Alignment | Cell::Remainder => (),
            }
        }
        damage
    }

    fn set(&mut self, r: usize, c: usize, cell: Cell) {
        let idx = r * self.w + c;
        if self.cells[idx] != Cell::Reserved {
            self.cells[idx] = cell;
        }
    }

    fn mark_function_patterns(&mut self) {
        let w = self.w;

        // Finders with separators and format info, timing lines, dark module
        for r in 0..w {
            for c in 0..w {
                let top = r < 9 && (c < 9 || c >= w - 8);
                let bottom_left = r >= w - 8 && c < 9;
                if top || bottom_left || r == 6 || c == 6 {
                    self.set(r, c, Cell::Reserved);
                }
            }
        }

        // Version info, top right and bottom left
        if self.ver >= 7 {
            for i in 0..6 {
                for j in w - 11..w - 8 {
                    self.set(i, j, Cell::Reserved);
                    self.set(j, i, Cell::Reserved);
                }
            }
        }

        let ap = alignment_positions(self.ver);
        let last = ap.len().saturating_sub(1);
        for (i, &ar) in ap.iter().enumerate() {
            for (j, &ac) in ap.iter().enumerate() {
                if (i == 0 && (j == 0 || j == last)) || (i == last && j == 0) {
                    continue;
                }
                let cell = if i == last && j == last { Cell::Reserved } else { Cell::Alignment };
                for r in ar - 2..=ar + 2 {
                    for c in ac - 2..=ac + 2 {
                        self.set(r, c, cell);
                    }
                }
            }
        }
    }

    // Zigzag over column pairs from the right, skipping the vertical timing column
    fn place_codewords(&mut self) {
        let w = self.w;
        let bits = self.blocks.total_codewords() * 8;
        let mut bit = 0;
        let mut right = w - 1;
        loop {
            if right == 6 {
                right = 5;
            }
            let upward = (right + 1) & 2 == 0;
            for vert in 0..w {
                let r = if upward { w - 1 - vert } else { vert };
                for c in [right, right - 1] {
                    let idx = r * w + c;
                    if bit < bits && self.cells[idx] == Cell::Remainder {
                        self.cells[idx] = Cell::Codeword((bit / 8) as u16);
                        bit += 1;
                    }
                }
            }
            if right < 3 {
                break;
            }
            right -= 2;
        }
        debug_assert_eq!(bit, bits);
    }
}
