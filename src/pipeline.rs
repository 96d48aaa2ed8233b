//! The one call the HTTP boundary makes: options in, composed raster out.

use image::RgbaImage;
use tracing::{debug, info_span};

use crate::builder::{QRBuilder, DEFAULT_BORDER, DEFAULT_BOX_SIZE};
use crate::common::{
    error::{QRError, QRResult},
    metadata::{Color, ECLevel, Version},
};
use crate::logo::{
    decode_logo, policy::DEFAULT_SIZE_PERCENT, BackgroundSource, CompositePolicy, Compositor,
    LogoLimits, LogoSpec,
};
use crate::transport::encode_to_transport;

pub const DEFAULT_MAX_BOX_SIZE: u32 = 40;
pub const DEFAULT_MAX_BORDER: u32 = 16;
pub const DEFAULT_MAX_IMAGE_SIDE: u32 = 4096;

// Options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub ec_level: ECLevel,
    pub version: Version,
    pub box_size: u32,
    pub border: u32,
    pub fill: Color,
    pub back: Color,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ec_level: ECLevel::M,
            version: Version::Auto,
            box_size: DEFAULT_BOX_SIZE,
            border: DEFAULT_BORDER,
            fill: Color::BLACK,
            back: Color::WHITE,
        }
    }
}

/// Resource caps checked before any raster is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub logo: LogoLimits,
    pub max_box_size: u32,
    pub max_border: u32,
    pub max_image_side: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            logo: LogoLimits::default(),
            max_box_size: DEFAULT_MAX_BOX_SIZE,
            max_border: DEFAULT_MAX_BORDER,
            max_image_side: DEFAULT_MAX_IMAGE_SIDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrRequest<'a> {
    pub url: &'a str,
    pub options: EncodeOptions,
    pub logo: Option<&'a str>,
    pub logo_size_percent: f64,
}

impl<'a> QrRequest<'a> {
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            options: EncodeOptions::default(),
            logo: None,
            logo_size_percent: DEFAULT_SIZE_PERCENT,
        }
    }
}

// Pipeline
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pipeline {
    limits: Limits,
    policy: CompositePolicy,
    force_high_ec_with_logo: bool,
    enforce_damage_budget: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Pipeline {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            policy: CompositePolicy::default(),
            force_high_ec_with_logo: true,
            enforce_damage_budget: true,
        }
    }

    pub fn policy(mut self, policy: CompositePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use level H whenever a logo is present, whatever the request asked for.
    pub fn force_high_ec_with_logo(mut self, force: bool) -> Self {
        self.force_high_ec_with_logo = force;
        self
    }

    /// Shrink logos whose clean zone would eat more than the level can restore.
    pub fn enforce_damage_budget(mut self, enforce: bool) -> Self {
        self.enforce_damage_budget = enforce;
        self
    }

    pub fn validate(&self, options: &EncodeOptions) -> QRResult<()> {
        let limits = &self.limits;
        if options.box_size == 0 || options.box_size > limits.max_box_size {
            return Err(QRError::InvalidOption(format!(
                "boxSize must be between 1 and {}",
                limits.max_box_size
            )));
        }
        if options.border > limits.max_border {
            return Err(QRError::InvalidOption(format!(
                "border must be between 0 and {}",
                limits.max_border
            )));
        }
        Ok(())
    }

    pub fn run(&self, request: &QrRequest) -> QRResult<RgbaImage> {
        let span = info_span!("pipeline", has_logo = request.logo.is_some());
        let _guard = span.enter();

        let mut options = request.options;
        self.validate(&options)?;
        if request.logo.is_some() && self.force_high_ec_with_logo {
            debug!(requested = %options.ec_level, "Logo present, forcing error level H");
            options.ec_level = ECLevel::H;
        }

        // 1. Encode
        let qr = QRBuilder::new(request.url.as_bytes())
            .version(options.version)
            .ec_level(options.ec_level)
            .box_size(options.box_size)
            .border(options.border)
            .fill(options.fill)
            .back(options.back)
            .build()?;
        if qr.side_px() > self.limits.max_image_side as u64 {
            return Err(QRError::InvalidOption(format!(
                "image side of {} px exceeds {} px",
                qr.side_px(),
                self.limits.max_image_side
            )));
        }
        let raster = qr.render();

        let Some(logo) = request.logo else {
            return Ok(raster);
        };

        // 2. Logo
        let logo = LogoSpec::new(decode_logo(logo, &self.limits.logo)?)
            .size_percent(request.logo_size_percent);
        let background = match qr.border() {
            0 => BackgroundSource::Fixed(qr.back_color().rgba()),
            _ => BackgroundSource::TopLeft,
        };
        let compositor = Compositor::new(self.policy).background(background);
        if self.enforce_damage_budget {
            let budget = qr.damage_budget()?;
            compositor.compose_within(raster, &logo.image, logo.size_percent, &budget)
        } else {
            compositor.compose(raster, &logo.image, logo.size_percent)
        }
    }

    pub fn run_to_transport(&self, request: &QrRequest) -> QRResult<String> {
        let raster = self.run(request)?;
        encode_to_transport(&raster)
    }
}
