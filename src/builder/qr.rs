use image::RgbaImage;
use qrcode::QrCode;

use crate::common::{
    error::QRResult,
    layout::SymbolLayout,
    metadata::{Color, ECLevel},
};
use crate::logo::DamageBudget;

#[derive(Debug, Clone)]
pub struct QR {
    grid: Vec<bool>,
    w: usize,
    ver: u8,
    ecl: ECLevel,
    box_size: u32,
    border: u32,
    fill: Color,
    back: Color,
}

// QR type for builder
//------------------------------------------------------------------------------

impl QR {
    pub(super) fn new(
        code: &QrCode,
        ecl: ECLevel,
        box_size: u32,
        border: u32,
        fill: Color,
        back: Color,
    ) -> Self {
        let grid = code.to_colors().into_iter().map(|c| c == qrcode::Color::Dark).collect();
        let ver = match code.version() {
            qrcode::Version::Normal(v) | qrcode::Version::Micro(v) => v as u8,
        };
        Self { grid, w: code.width(), ver, ecl, box_size, border, fill, back }
    }

    pub fn version(&self) -> u8 {
        self.ver
    }

    /// Symbol width in modules, quiet zone excluded.
    pub fn width(&self) -> usize {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn box_size(&self) -> u32 {
        self.box_size
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    pub fn fill_color(&self) -> Color {
        self.fill
    }

    pub fn back_color(&self) -> Color {
        self.back
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&&m| m).count()
    }

    /// Side of the symbol in pixels, quiet zone excluded.
    pub fn symbol_px(&self) -> u32 {
        self.w as u32 * self.box_size
    }

    /// Side of the rendered image in pixels.
    pub fn side_px(&self) -> u64 {
        (self.w as u64 + 2 * self.border as u64) * self.box_size as u64
    }

    /// How much of the rendered symbol a logo may cover at this version and level.
    pub fn damage_budget(&self) -> QRResult<DamageBudget> {
        let layout = SymbolLayout::new(self.ver, self.ecl)?;
        Ok(DamageBudget::new(layout, self.box_size, self.border))
    }

    pub fn is_dark(&self, r: usize, c: usize) -> bool {
        debug_assert!(r < self.w && c < self.w, "Module out of bounds: {r} {c}");
        self.grid[r * self.w + c]
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let mut res = String::with_capacity(self.w * (self.w + 1) + 1);
        res.push('\n');
        for r in 0..self.w {
            for c in 0..self.w {
                res.push(if self.is_dark(r, c) { '#' } else { '.' });
            }
            res.push('\n');
        }
        res
    }
}

// Render
//------------------------------------------------------------------------------

impl QR {
    pub fn render(&self) -> RgbaImage {
        let qz_sz = self.border * self.box_size;
        let qr_sz = self.w as u32 * self.box_size;
        let total_sz = qz_sz + qr_sz + qz_sz;
        let (fill, back) = (self.fill.rgba(), self.back.rgba());

        let mut canvas = RgbaImage::from_pixel(total_sz, total_sz, back);
        for i in qz_sz..qz_sz + qr_sz {
            for j in qz_sz..qz_sz + qr_sz {
                let r = ((i - qz_sz) / self.box_size) as usize;
                let c = ((j - qz_sz) / self.box_size) as usize;
                if self.is_dark(r, c) {
                    canvas.put_pixel(j, i, fill);
                }
            }
        }

        canvas
    }
}
