mod mask;
pub mod policy;
pub mod shape;
mod source;

pub use policy::{CompositePolicy, DamageBudget};
pub use shape::{plan, CleanZoneShape, Placement, ShapeKind};
pub use source::{
    decode_logo, LogoLimits, LogoSpec, DEFAULT_MAX_LOGO_BYTES, DEFAULT_MAX_LOGO_DIMENSION,
};

use image::{
    imageops::{self, FilterType},
    DynamicImage, GenericImageView, Rgba, RgbaImage,
};
use tracing::debug;

use crate::common::error::{QRError, QRResult};
use mask::{flatten, paint_through, zone_mask};

const MAX_FIT_ROUNDS: usize = 16;

// Background source
//------------------------------------------------------------------------------

/// Where the clean zone color comes from.
///
/// `TopLeft` reads pixel (0, 0), which is quiet zone only when the code has a border. With a
/// zero border that pixel belongs to a finder pattern and the patch comes out in the module
/// color, so callers that know the back color should pass it as `Fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundSource {
    #[default]
    TopLeft,
    Fixed(Rgba<u8>),
}

// Compositor
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Compositor {
    policy: CompositePolicy,
    background: BackgroundSource,
}

impl Compositor {
    pub fn new(policy: CompositePolicy) -> Self {
        Self { policy, background: BackgroundSource::TopLeft }
    }

    pub fn background(mut self, background: BackgroundSource) -> Self {
        self.background = background;
        self
    }

    pub fn policy(&self) -> &CompositePolicy {
        &self.policy
    }

    /// Paints a clean zone at the center of `qr` and pastes `logo` on it.
    pub fn compose(
        &self,
        qr: RgbaImage,
        logo: &DynamicImage,
        size_percent: f64,
    ) -> QRResult<RgbaImage> {
        let bg = self.sample_background(&qr);
        let placement = plan(qr.dimensions(), logo.dimensions(), size_percent, &self.policy)?;
        Ok(self.apply(qr, logo, &placement, bg))
    }

    /// Same as [`Compositor::compose`], shrinking the logo until the clean zone fits `budget`.
    pub fn compose_within(
        &self,
        qr: RgbaImage,
        logo: &DynamicImage,
        size_percent: f64,
        budget: &DamageBudget,
    ) -> QRResult<RgbaImage> {
        let bg = self.sample_background(&qr);
        let placement = self.fit(qr.dimensions(), logo.dimensions(), size_percent, budget)?;
        Ok(self.apply(qr, logo, &placement, bg))
    }

    /// Largest placement at or below `size_percent` that `budget` allows.
    ///
    /// Bisects on the size percent. Fails with [`QRError::DegenerateLogo`] when no size that
    /// still leaves a visible logo is allowed.
    pub fn fit(
        &self,
        qr_dims: (u32, u32),
        logo_dims: (u32, u32),
        size_percent: f64,
        budget: &DamageBudget,
    ) -> QRResult<Placement> {
        let placement = plan(qr_dims, logo_dims, size_percent, &self.policy)?;
        if budget.allows(&placement) {
            return Ok(placement);
        }

        let (mut lo, mut hi) = (0.0, size_percent.min(1.0));
        let mut best = None;
        for _ in 0..MAX_FIT_ROUNDS {
            let mid = (lo + hi) / 2.0;
            match plan(qr_dims, logo_dims, mid, &self.policy) {
                Ok(placement) if budget.allows(&placement) => {
                    lo = mid;
                    best = Some(placement);
                }
                Ok(_) => hi = mid,
                // Logo rounded away to nothing, go bigger
                Err(_) => lo = mid,
            }
        }

        debug!(size_percent = lo, allowance = budget.allowance(), "Shrunk clean zone");
        best.ok_or(QRError::DegenerateLogo)
    }

    fn sample_background(&self, qr: &RgbaImage) -> Rgba<u8> {
        match self.background {
            BackgroundSource::TopLeft => *qr.get_pixel(0, 0),
            BackgroundSource::Fixed(c) => c,
        }
    }

    fn apply(
        &self,
        mut qr: RgbaImage,
        logo: &DynamicImage,
        placement: &Placement,
        bg: Rgba<u8>,
    ) -> RgbaImage {
        debug!(?placement, "Painting clean zone...");
        let mask = zone_mask(&placement.zone);
        paint_through(&mut qr, &mask, placement.zone_origin(), bg);

        // Flattening before resampling keeps transparent edges free of stray color
        debug!("Pasting logo...");
        let flat = flatten(&logo.to_rgba8(), bg);
        let (w, h) = placement.logo_size;
        let scaled = if flat.dimensions() == (w, h) {
            flat
        } else {
            imageops::resize(&flat, w, h, FilterType::Lanczos3)
        };
        let (x, y) = placement.logo_origin();
        imageops::replace(&mut qr, &scaled, x, y);

        qr
    }
}

/// Composes with the default policy and a background sampled from pixel (0, 0).
pub fn compose(qr: RgbaImage, logo: &DynamicImage, size_percent: f64) -> QRResult<RgbaImage> {
    Compositor::default().compose(qr, logo, size_percent)
}
