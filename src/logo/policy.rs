use super::mask::zone_mask;
use super::shape::Placement;
use crate::common::{
    cast::floor_px,
    layout::{Damage, SymbolLayout},
};

// Compositing constants
//------------------------------------------------------------------------------

/// Logos whose width/height ratio falls in this band get a circular clean zone.
pub const SQUARE_ASPECT_BAND: (f64, f64) = (0.90, 1.10);

/// Longest logo side as a fraction of the container, where the container is
/// `size_percent * min(qr_width, qr_height)`.
pub const LOGO_FILL_RATIO: f64 = 0.65;

/// Circle diameter is `long_side * (1 + 2 * CIRCLE_PADDING_RATIO)`.
pub const CIRCLE_PADDING_RATIO: f64 = 0.25;

/// Rectangle padding on each axis, relative to the logo extent on that axis.
pub const RECT_PADDING_RATIO: f64 = 0.20;

/// Corner radius is `min(pad_x, pad_y) * CORNER_ROUNDNESS`.
pub const CORNER_ROUNDNESS: f64 = 1.5;

/// Share of a block's correctable codewords the clean zone may destroy.
pub const DAMAGE_SAFETY_FACTOR: f64 = 0.6;

/// Size percent used when the caller does not ask for one.
pub const DEFAULT_SIZE_PERCENT: f64 = 0.25;

// Policy
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositePolicy {
    pub square_aspect: (f64, f64),
    pub logo_fill_ratio: f64,
    pub circle_padding_ratio: f64,
    pub rect_padding_ratio: f64,
    pub corner_roundness: f64,
}

impl Default for CompositePolicy {
    fn default() -> Self {
        Self {
            square_aspect: SQUARE_ASPECT_BAND,
            logo_fill_ratio: LOGO_FILL_RATIO,
            circle_padding_ratio: CIRCLE_PADDING_RATIO,
            rect_padding_ratio: RECT_PADDING_RATIO,
            corner_roundness: CORNER_ROUNDNESS,
        }
    }
}

// Damage budget
//------------------------------------------------------------------------------

/// How many codewords a clean zone may destroy in each error correction block.
///
/// Every module the zone or the logo touches counts as lost, and so does every codeword with a
/// lost module. The budget holds while no block loses more than `DAMAGE_SAFETY_FACTOR` of what
/// it can correct and no finder, timing, format or version module is covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageBudget {
    layout: SymbolLayout,
    box_size: u32,
    border: u32,
    allowance: usize,
}

impl DamageBudget {
    /// Budget for a symbol rendered with `box_size` px modules behind a `border` module quiet
    /// zone.
    pub fn new(layout: SymbolLayout, box_size: u32, border: u32) -> Self {
        let correctable = layout.blocks().correctable() as f64;
        let allowance = floor_px(correctable * DAMAGE_SAFETY_FACTOR).unwrap_or(0) as usize;
        Self { layout, box_size: box_size.max(1), border, allowance }
    }

    /// Lost codewords a single block may take.
    pub fn allowance(&self) -> usize {
        self.allowance
    }

    pub fn damage(&self, placement: &Placement) -> Damage {
        self.layout.assess(&self.covered_modules(placement))
    }

    pub fn allows(&self, placement: &Placement) -> bool {
        let damage = self.damage(placement);
        damage.reserved == 0 && damage.worst_block() <= self.allowance
    }

    fn covered_modules(&self, placement: &Placement) -> Vec<bool> {
        let w = self.layout.width();
        let mut covered = vec![false; w * w];
        let quiet = self.border as i64 * self.box_size as i64;
        let size = self.box_size as i64;
        let module = |px: i64| (px - quiet).div_euclid(size);

        let (ox, oy) = placement.zone_origin();
        let mask = zone_mask(&placement.zone);
        for (mx, my, m) in mask.enumerate_pixels() {
            if m.0[0] == 0 {
                continue;
            }
            let (r, c) = (module(oy + my as i64), module(ox + mx as i64));
            if (0..w as i64).contains(&r) && (0..w as i64).contains(&c) {
                covered[r as usize * w + c as usize] = true;
            }
        }

        // The logo sits inside the zone unless the zone was clamped to the raster
        let (lx, ly) = placement.logo_origin();
        let (lw, lh) = placement.logo_size;
        let clamp = |m: i64| m.clamp(0, w as i64 - 1) as usize;
        let (r0, r1) = (module(ly), module(ly + lh as i64 - 1));
        let (c0, c1) = (module(lx), module(lx + lw as i64 - 1));
        if lw > 0 && lh > 0 && r1 >= 0 && c1 >= 0 && r0 < w as i64 && c0 < w as i64 {
            for r in clamp(r0)..=clamp(r1) {
                for c in clamp(c0)..=clamp(c1) {
                    covered[r * w + c] = true;
                }
            }
        }

        covered
    }
}

#[cfg(test)]
mod policy_tests {
    use super::{DamageBudget, CIRCLE_PADDING_RATIO, LOGO_FILL_RATIO};
    use crate::common::{layout::SymbolLayout, metadata::ECLevel};
    use crate::logo::shape::{CleanZoneShape, Placement};

    fn budget(ver: u8, ecl: ECLevel) -> DamageBudget {
        DamageBudget::new(SymbolLayout::new(ver, ecl).unwrap(), 10, 4)
    }

    fn circle(diameter: u32, center: (u32, u32)) -> Placement {
        let side = diameter * 2 / 3;
        Placement { logo_size: (side, side), zone: CleanZoneShape::Circle { diameter }, center }
    }

    #[test]
    fn test_circle_fits_container() {
        // Diameter must stay inside the container at full size percent
        assert!(LOGO_FILL_RATIO * (1.0 + 2.0 * CIRCLE_PADDING_RATIO) <= 1.0);
    }

    #[test]
    fn test_allowance_scales_with_level() {
        // 3-L: one block correcting 7, 3-H: two blocks correcting 11 each
        assert_eq!(budget(3, ECLevel::L).allowance(), 4);
        assert_eq!(budget(3, ECLevel::H).allowance(), 6);
        assert_eq!(budget(1, ECLevel::L).allowance(), 1);
    }

    #[test]
    fn test_small_center_zone_allowed() {
        // 3-H on a 370 px raster: center module is (14, 14)
        let budget = budget(3, ECLevel::H);
        let zone = circle(30, (185, 185));
        let damage = budget.damage(&zone);
        assert!(damage.reserved == 0 && damage.lost_codewords() > 0);
        assert!(budget.allows(&zone));
    }

    #[test]
    fn test_large_zone_rejected() {
        let budget = budget(3, ECLevel::H);
        let zone = circle(160, (185, 185));
        assert!(budget.damage(&zone).worst_block() > budget.allowance());
        assert!(!budget.allows(&zone));
    }

    #[test]
    fn test_finder_zone_rejected() {
        // A zone entirely in the data area would fit, the same zone on a finder does not
        let budget = budget(3, ECLevel::H);
        let zone = circle(12, (75, 75));
        assert!(budget.damage(&zone).reserved > 0);
        assert!(!budget.allows(&zone));
    }

    #[test]
    fn test_zone_in_quiet_zone_is_free() {
        let budget = budget(3, ECLevel::H);
        let zone = circle(20, (15, 185));
        assert_eq!(budget.damage(&zone).lost_codewords(), 0);
        assert!(budget.allows(&zone));
    }
}
