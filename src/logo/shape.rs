use std::f64::consts::PI;

use super::policy::CompositePolicy;
use crate::common::{
    cast::{floor_px, round_px},
    error::{QRError, QRResult},
};

// Shape kind
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShapeKind {
    Circle,
    Rectangle,
}

impl ShapeKind {
    pub fn detect(w: u32, h: u32, band: (f64, f64)) -> Self {
        let aspect = w as f64 / h as f64;
        if band.0 <= aspect && aspect <= band.1 {
            Self::Circle
        } else {
            Self::Rectangle
        }
    }
}

// Clean zone shape
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CleanZoneShape {
    Circle { diameter: u32 },
    RoundedRect { width: u32, height: u32, corner_radius: u32 },
}

impl CleanZoneShape {
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            Self::Circle { diameter } => (diameter, diameter),
            Self::RoundedRect { width, height, .. } => (width, height),
        }
    }

    pub fn area(&self) -> f64 {
        match *self {
            Self::Circle { diameter } => {
                let r = diameter as f64 / 2.0;
                PI * r * r
            }
            Self::RoundedRect { width, height, corner_radius } => {
                let r = corner_radius as f64;
                width as f64 * height as f64 - (4.0 - PI) * r * r
            }
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::RoundedRect { .. } => ShapeKind::Rectangle,
        }
    }
}

// Placement
//------------------------------------------------------------------------------

/// Geometry of one composition: scaled logo size, clean zone and their common center.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Placement {
    pub logo_size: (u32, u32),
    pub zone: CleanZoneShape,
    pub center: (u32, u32),
}

impl Placement {
    pub fn zone_origin(&self) -> (i64, i64) {
        Self::origin(self.center, self.zone.bounds())
    }

    pub fn logo_origin(&self) -> (i64, i64) {
        Self::origin(self.center, self.logo_size)
    }

    fn origin(center: (u32, u32), size: (u32, u32)) -> (i64, i64) {
        (center.0 as i64 - (size.0 / 2) as i64, center.1 as i64 - (size.1 / 2) as i64)
    }
}

/// Computes where the logo and its clean zone go on a `qr_dims` raster.
///
/// The logo is never upscaled: its longest side is capped at
/// `logo_fill_ratio * size_percent * min(qr_w, qr_h)`. `size_percent` above 1 is clamped,
/// zero, negative or NaN fails with [`QRError::DegenerateLogo`].
pub fn plan(
    qr_dims: (u32, u32),
    logo_dims: (u32, u32),
    size_percent: f64,
    policy: &CompositePolicy,
) -> QRResult<Placement> {
    let (qw, qh) = qr_dims;
    let (lw, lh) = logo_dims;

    if !(size_percent > 0.0) || lw == 0 || lh == 0 {
        return Err(QRError::DegenerateLogo);
    }
    let size_percent = size_percent.min(1.0);

    // 1. Shape from native aspect ratio
    let kind = ShapeKind::detect(lw, lh, policy.square_aspect);

    // 2. Logo scaling
    let container = size_percent * qw.min(qh) as f64;
    let target = container * policy.logo_fill_ratio;
    let scale = (target / lw.max(lh) as f64).min(1.0);
    let sw = round_px(lw as f64 * scale).ok_or(QRError::DegenerateLogo)?;
    let sh = round_px(lh as f64 * scale).ok_or(QRError::DegenerateLogo)?;
    if sw == 0 || sh == 0 {
        return Err(QRError::DegenerateLogo);
    }

    // 3. Clean zone sizing, clamped to the raster
    let zone = match kind {
        ShapeKind::Circle => {
            let d = sw.max(sh) as f64 * (1.0 + 2.0 * policy.circle_padding_ratio);
            let diameter = round_px(d).ok_or(QRError::DegenerateLogo)?.min(qw.min(qh));
            CleanZoneShape::Circle { diameter }
        }
        ShapeKind::Rectangle => {
            let pad_x = sw as f64 * policy.rect_padding_ratio;
            let pad_y = sh as f64 * policy.rect_padding_ratio;
            let width = round_px(sw as f64 + 2.0 * pad_x).ok_or(QRError::DegenerateLogo)?.min(qw);
            let height = round_px(sh as f64 + 2.0 * pad_y).ok_or(QRError::DegenerateLogo)?.min(qh);
            let radius = floor_px(pad_x.min(pad_y) * policy.corner_roundness)
                .ok_or(QRError::DegenerateLogo)?
                .min(width.min(height) / 2);
            CleanZoneShape::RoundedRect { width, height, corner_radius: radius }
        }
    };

    // 4. Centering
    let center = (qw / 2, qh / 2);

    Ok(Placement { logo_size: (sw, sh), zone, center })
}

#[cfg(test)]
mod shape_tests {
    use test_case::test_case;

    use super::{plan, CleanZoneShape, ShapeKind};
    use crate::common::error::QRError;
    use crate::logo::policy::{CompositePolicy, SQUARE_ASPECT_BAND};

    #[test_case(200, 200, ShapeKind::Circle)]
    #[test_case(110, 100, ShapeKind::Circle)]
    #[test_case(90, 100, ShapeKind::Circle)]
    #[test_case(111, 100, ShapeKind::Rectangle)]
    #[test_case(89, 100, ShapeKind::Rectangle)]
    #[test_case(400, 100, ShapeKind::Rectangle)]
    #[test_case(100, 300, ShapeKind::Rectangle)]
    fn test_detect(w: u32, h: u32, exp: ShapeKind) {
        assert_eq!(ShapeKind::detect(w, h, SQUARE_ASPECT_BAND), exp);
    }

    #[test]
    fn test_plan_square_logo() {
        let p = plan((370, 370), (200, 200), 0.25, &CompositePolicy::default()).unwrap();
        // container 92.5, target 60.125
        assert_eq!(p.logo_size, (60, 60));
        assert_eq!(p.zone, CleanZoneShape::Circle { diameter: 90 });
        assert_eq!(p.center, (185, 185));
        assert_eq!(p.zone_origin(), (140, 140));
        assert_eq!(p.logo_origin(), (155, 155));
    }

    #[test]
    fn test_plan_wide_logo() {
        let p = plan((400, 400), (300, 100), 0.5, &CompositePolicy::default()).unwrap();
        // container 200, target 130
        assert_eq!(p.logo_size, (130, 43));
        // pad_x 26, pad_y 8.6, radius floor(8.6 * 1.5)
        let exp = CleanZoneShape::RoundedRect { width: 182, height: 60, corner_radius: 12 };
        assert_eq!(p.zone, exp);
    }

    #[test]
    fn test_plan_never_upscales() {
        let p = plan((400, 400), (20, 20), 0.5, &CompositePolicy::default()).unwrap();
        assert_eq!(p.logo_size, (20, 20));
        assert_eq!(p.zone, CleanZoneShape::Circle { diameter: 30 });
    }

    #[test]
    fn test_plan_full_size_stays_in_bounds() {
        let p = plan((210, 210), (1000, 1000), 1.0, &CompositePolicy::default()).unwrap();
        let (w, h) = p.zone.bounds();
        assert!(w <= 210 && h <= 210);
        let (x, y) = p.zone_origin();
        assert!(x >= 0 && y >= 0);

        let clamped = plan((210, 210), (1000, 1000), 7.5, &CompositePolicy::default()).unwrap();
        assert_eq!(p, clamped);
    }

    #[test]
    fn test_corner_radius_clamped() {
        let policy = CompositePolicy { corner_roundness: 50.0, ..Default::default() };
        let p = plan((400, 400), (300, 100), 0.5, &policy).unwrap();
        let CleanZoneShape::RoundedRect { width, height, corner_radius } = p.zone else {
            panic!("Expected rounded rectangle");
        };
        assert!(corner_radius <= width.min(height) / 2);
    }

    #[test_case(0.0)]
    #[test_case(-0.25)]
    #[test_case(f64::NAN)]
    fn test_plan_rejects_non_positive_size(size_percent: f64) {
        let res = plan((370, 370), (200, 200), size_percent, &CompositePolicy::default());
        assert_eq!(res, Err(QRError::DegenerateLogo));
    }

    #[test_case((0, 10))]
    #[test_case((10, 0))]
    fn test_plan_rejects_empty_logo(logo: (u32, u32)) {
        let res = plan((370, 370), logo, 0.25, &CompositePolicy::default());
        assert_eq!(res, Err(QRError::DegenerateLogo));
    }

    #[test]
    fn test_plan_rejects_vanishing_logo() {
        // 1000:1 logo on a tiny raster rounds its short side to zero
        let res = plan((40, 40), (1000, 1), 0.25, &CompositePolicy::default());
        assert_eq!(res, Err(QRError::DegenerateLogo));
    }

    #[test]
    fn test_area() {
        let circle = CleanZoneShape::Circle { diameter: 10 };
        assert!((circle.area() - 78.539_816).abs() < 1e-3);
        let square = CleanZoneShape::RoundedRect { width: 10, height: 10, corner_radius: 0 };
        assert_eq!(square.area(), 100.0);
    }
}
