use serde::{Deserialize, Serialize};

use crate::common::{
    error::{QRError, QRResult},
    metadata::{Color, ECLevel, Version},
};
use crate::pipeline::EncodeOptions;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    pub url: Option<String>,
    #[serde(default)]
    pub options: GenerateOptions,
    pub logo: Option<String>,
}

impl GenerateRequest {
    /// The logo transport string, if one was sent. Blank strings count as absent.
    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Encoding options as they arrive on the wire. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    pub error_level: Option<String>,
    pub version: Option<i64>,
    pub box_size: Option<i64>,
    pub border: Option<i64>,
    pub fill_color: Option<String>,
    pub back_color: Option<String>,
    pub logo_size_percent: Option<f64>,
}

impl GenerateOptions {
    /// Checks every field once and turns them into typed options.
    pub fn to_encode_options(&self) -> QRResult<EncodeOptions> {
        let defaults = EncodeOptions::default();

        let ec_level =
            self.error_level.as_deref().map_or(defaults.ec_level, ECLevel::parse_lenient);
        let version = match self.version {
            Some(v) => Version::checked(v)?,
            None => defaults.version,
        };
        let box_size = match self.box_size {
            Some(b) => u32::try_from(b).ok().filter(|&b| b > 0).ok_or_else(|| {
                QRError::InvalidOption(format!("boxSize must be positive, got {b}"))
            })?,
            None => defaults.box_size,
        };
        let border = match self.border {
            Some(b) => u32::try_from(b).map_err(|_| {
                QRError::InvalidOption(format!("border must not be negative, got {b}"))
            })?,
            None => defaults.border,
        };
        let fill = self.fill_color.as_deref().map_or(Ok(defaults.fill), str::parse::<Color>)?;
        let back = self.back_color.as_deref().map_or(Ok(defaults.back), str::parse::<Color>)?;

        Ok(EncodeOptions { ec_level, version, box_size, border, fill, back })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub qr_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
