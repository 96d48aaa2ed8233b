use std::io::Cursor;

use image::{error::ImageError, DynamicImage, ImageReader, Limits};
use tracing::debug;

use super::policy::DEFAULT_SIZE_PERCENT;
use crate::common::error::{QRError, QRResult};
use crate::transport::decode_payload;

pub const DEFAULT_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;
pub const DEFAULT_MAX_LOGO_DIMENSION: u32 = 4096;

// Logo
//------------------------------------------------------------------------------

/// A decoded logo and the share of the code's shorter side it asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoSpec {
    pub image: DynamicImage,
    pub size_percent: f64,
}

impl LogoSpec {
    pub fn new(image: DynamicImage) -> Self {
        Self { image, size_percent: DEFAULT_SIZE_PERCENT }
    }

    pub fn size_percent(mut self, size_percent: f64) -> Self {
        self.size_percent = size_percent;
        self
    }
}

// Limits
//------------------------------------------------------------------------------

/// Caps applied while decoding an untrusted logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoLimits {
    pub max_bytes: usize,
    pub max_dimension: u32,
}

impl Default for LogoLimits {
    fn default() -> Self {
        Self { max_bytes: DEFAULT_MAX_LOGO_BYTES, max_dimension: DEFAULT_MAX_LOGO_DIMENSION }
    }
}

/// Decodes a transport encoded logo.
///
/// A bad transport envelope is [`QRError::MalformedTransportString`], bytes that are not a
/// supported image are [`QRError::UnsupportedLogoFormat`] and anything past `limits` is
/// [`QRError::LogoTooLarge`]. Grayscale images are accepted and promoted to color later on.
pub fn decode_logo(transport: &str, limits: &LogoLimits) -> QRResult<DynamicImage> {
    let bytes = decode_payload(transport)?;
    if bytes.len() > limits.max_bytes {
        return Err(QRError::LogoTooLarge(format!(
            "{} bytes, at most {} allowed",
            bytes.len(),
            limits.max_bytes
        )));
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| QRError::UnsupportedLogoFormat(e.to_string()))?;
    let Some(format) = reader.format() else {
        return Err(QRError::UnsupportedLogoFormat("unrecognized image data".to_string()));
    };

    let mut decode_limits = Limits::default();
    decode_limits.max_image_width = Some(limits.max_dimension);
    decode_limits.max_image_height = Some(limits.max_dimension);
    reader.limits(decode_limits);

    let img = reader.decode().map_err(|e| match e {
        ImageError::Limits(_) => QRError::LogoTooLarge(e.to_string()),
        _ => QRError::UnsupportedLogoFormat(e.to_string()),
    })?;
    debug!(?format, width = img.width(), height = img.height(), "Decoded logo");

    Ok(img)
}

#[cfg(test)]
mod source_tests {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

    use super::{decode_logo, LogoLimits};
    use crate::common::error::QRError;
    use crate::transport::encode_to_transport;

    #[test]
    fn test_decode_logo() {
        let logo = RgbaImage::from_pixel(20, 10, Rgba([9, 8, 7, 255]));
        let encoded = encode_to_transport(&logo).unwrap();
        let decoded = decode_logo(&encoded, &LogoLimits::default()).unwrap();
        assert_eq!(decoded.width(), 20);
        assert_eq!(decoded.height(), 10);
    }

    #[test]
    fn test_decode_gray_logo() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([100])));
        let mut png = Vec::new();
        gray.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png).unwrap();
        let encoded = STANDARD.encode(png);
        let decoded = decode_logo(&encoded, &LogoLimits::default()).unwrap();
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0), &Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn test_not_an_image() {
        let encoded = format!("data:image/png;base64,{}", STANDARD.encode(b"hello there"));
        let res = decode_logo(&encoded, &LogoLimits::default());
        assert!(matches!(res, Err(QRError::UnsupportedLogoFormat(_))));
    }

    #[test]
    fn test_truncated_image() {
        let logo = RgbaImage::from_pixel(64, 64, Rgba([1, 2, 3, 255]));
        let encoded = encode_to_transport(&logo).unwrap();
        let bytes = crate::transport::decode_payload(&encoded).unwrap();
        let truncated = STANDARD.encode(&bytes[..bytes.len() / 2]);
        let res = decode_logo(&truncated, &LogoLimits::default());
        assert!(matches!(res, Err(QRError::UnsupportedLogoFormat(_))));
    }

    #[test]
    fn test_logo_limits() {
        let logo = RgbaImage::from_pixel(64, 32, Rgba([1, 2, 3, 255]));
        let encoded = encode_to_transport(&logo).unwrap();

        let small_dim = LogoLimits { max_dimension: 32, ..Default::default() };
        assert!(matches!(decode_logo(&encoded, &small_dim), Err(QRError::LogoTooLarge(_))));

        let small_bytes = LogoLimits { max_bytes: 10, ..Default::default() };
        assert!(matches!(decode_logo(&encoded, &small_bytes), Err(QRError::LogoTooLarge(_))));
    }

    #[test]
    fn test_bad_envelope() {
        let res = decode_logo("data:image/png;base64", &LogoLimits::default());
        assert!(matches!(res, Err(QRError::MalformedTransportString(_))));
    }
}
