//! Base64 PNG data URIs, the form rasters take on the wire.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::common::error::{QRError, QRResult};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Drops the alpha channel by blending every pixel over opaque white.
pub fn flatten_opaque(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y).0;
        let a = p[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

/// Flattens `img`, encodes it as an RGB PNG and wraps it in a data URI.
pub fn encode_to_transport(img: &RgbaImage) -> QRResult<String> {
    let flat = DynamicImage::ImageRgb8(flatten_opaque(img));

    let mut png = Vec::new();
    flat.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| QRError::InternalEncodingFailure(e.to_string()))?;

    Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(png)))
}

/// Extracts the raw bytes of a transport string.
///
/// Whatever precedes the first `,` is a scheme prefix and is dropped. A string without `,` is
/// taken as bare base64.
pub fn decode_payload(s: &str) -> QRResult<Vec<u8>> {
    let s = s.trim();
    let payload = s.split_once(',').map_or(s, |(_, payload)| payload);

    if payload.is_empty() {
        return Err(QRError::MalformedTransportString("empty payload".to_string()));
    }

    STANDARD.decode(payload).map_err(|e| QRError::MalformedTransportString(e.to_string()))
}

/// Decodes a transport string back into a raster.
pub fn decode_from_transport(s: &str) -> QRResult<DynamicImage> {
    let bytes = decode_payload(s)?;
    image::load_from_memory(&bytes).map_err(|e| QRError::MalformedTransportString(e.to_string()))
}

#[cfg(test)]
mod transport_tests {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{Rgb, Rgba, RgbaImage};
    use test_case::test_case;

    use super::{
        decode_from_transport, decode_payload, encode_to_transport, flatten_opaque,
        DATA_URI_PREFIX,
    };
    use crate::common::error::QRError;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(17, 9, |x, y| {
            Rgba([(x * 15) as u8, (y * 28) as u8, 99, if (x + y) % 3 == 0 { 255 } else { 90 }])
        })
    }

    #[test]
    fn test_round_trip_flattens() {
        let img = sample();
        let encoded = encode_to_transport(&img).unwrap();
        assert!(encoded.starts_with(DATA_URI_PREFIX));

        let decoded = decode_from_transport(&encoded).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!(decoded.to_rgb8(), flatten_opaque(&img));
    }

    #[test]
    fn test_bare_base64_accepted() {
        let encoded = encode_to_transport(&sample()).unwrap();
        let bare = encoded.trim_start_matches(DATA_URI_PREFIX);
        assert_eq!(decode_payload(bare).unwrap(), decode_payload(&encoded).unwrap());
    }

    #[test_case("data:image/jpeg;base64,"; "other media type")]
    #[test_case("image/png;base64,"; "no scheme")]
    #[test_case("base64,"; "encoding only")]
    #[test_case(","; "bare separator")]
    fn test_prefix_before_separator_dropped(prefix: &str) {
        let encoded = encode_to_transport(&sample()).unwrap();
        let relabeled = encoded.replace(DATA_URI_PREFIX, prefix);
        assert_eq!(decode_payload(&relabeled).unwrap(), decode_payload(&encoded).unwrap());
        assert!(decode_from_transport(&relabeled).is_ok());
    }

    #[test]
    fn test_flatten_opaque() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let flat = flatten_opaque(&img);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test_case("data:image/png;base64iVBORw0KGgo"; "missing separator")]
    #[test_case("data:image/png;base64,"; "empty payload")]
    #[test_case(""; "empty string")]
    #[test_case("not base64 at all!"; "bad alphabet")]
    fn test_malformed(s: &str) {
        assert!(matches!(decode_payload(s), Err(QRError::MalformedTransportString(_))));
    }

    #[test]
    fn test_not_an_image() {
        let s = format!("{DATA_URI_PREFIX}{}", STANDARD.encode(b"plain text"));
        assert!(matches!(decode_from_transport(&s), Err(QRError::MalformedTransportString(_))));
    }
}
