use serde::Deserialize;
use std::env::vars;
use std::time::Duration;
use tracing::info;

use crate::logo::{policy::DEFAULT_SIZE_PERCENT, LogoLimits};
use crate::pipeline::{
    Limits, Pipeline, DEFAULT_MAX_BORDER, DEFAULT_MAX_BOX_SIZE, DEFAULT_MAX_IMAGE_SIDE,
};

const DEFAULT_SERVER_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// The final, validated configuration struct.
#[derive(Debug, Clone)]
pub struct Config {
    server_addr: String,
    port: u16,
    cors_origins: Vec<String>,
    limits: Limits,
    logo_size_percent: f64,
    force_high_ec_with_logo: bool,
    request_timeout: Duration,
}

// An intermediate struct for deserializing environment variables, everything optional.
#[derive(Deserialize)]
struct RawConfig {
    server_addr: Option<String>,
    port: Option<u16>,
    // Comma separated list
    cors_origins: Option<String>,
    max_logo_bytes: Option<usize>,
    max_logo_dimension: Option<u32>,
    max_box_size: Option<u32>,
    max_border: Option<u32>,
    max_image_side: Option<u32>,
    logo_size_percent: Option<f64>,
    force_high_ec_with_logo: Option<bool>,
    request_timeout_ms: Option<u64>,
}

impl Config {
    /// Test configuration with every default applied.
    ///
    /// Available to integration tests, not meant for production code.
    pub fn new_for_test() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            limits: Limits::default(),
            logo_size_percent: DEFAULT_SIZE_PERCENT,
            force_high_ec_with_logo: true,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Same as [`Config::new_for_test`] with a different request timeout.
    pub fn new_for_test_with_timeout(timeout: Duration) -> Self {
        Self { request_timeout: timeout, ..Self::new_for_test() }
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Logo size used when a request does not carry `logoSizePercent`.
    pub fn logo_size_percent(&self) -> f64 {
        self.logo_size_percent
    }

    pub fn force_high_ec_with_logo(&self) -> bool {
        self.force_high_ec_with_logo
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Largest request body worth reading: the logo payload in base64 plus room for the rest.
    pub fn body_limit(&self) -> usize {
        self.limits.logo.max_bytes.div_ceil(3) * 4 + 64 * 1024
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.limits).force_high_ec_with_logo(self.force_high_ec_with_logo)
    }

    /// Initializes configuration by reading from environment variables and applying defaults.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            server_addr,
            port,
            cors_origins,
            max_logo_bytes,
            max_logo_dimension,
            max_box_size,
            max_border,
            max_image_side,
            logo_size_percent,
            force_high_ec_with_logo,
            request_timeout_ms,
        } = raw_config;

        let server_addr = server_addr.unwrap_or_else(|| {
            info!("SERVER_ADDR not set, defaulting to {}", DEFAULT_SERVER_ADDR);
            DEFAULT_SERVER_ADDR.to_string()
        });
        let port = port.unwrap_or(DEFAULT_PORT);

        let cors_origins: Vec<String> = match cors_origins {
            Some(list) => {
                list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
            }
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };
        if cors_origins.is_empty() {
            anyhow::bail!("CORS_ORIGINS must list at least one origin");
        }

        let defaults = LogoLimits::default();
        let limits = Limits {
            logo: LogoLimits {
                max_bytes: max_logo_bytes.unwrap_or(defaults.max_bytes),
                max_dimension: max_logo_dimension.unwrap_or(defaults.max_dimension),
            },
            max_box_size: max_box_size.unwrap_or(DEFAULT_MAX_BOX_SIZE),
            max_border: max_border.unwrap_or(DEFAULT_MAX_BORDER),
            max_image_side: max_image_side.unwrap_or(DEFAULT_MAX_IMAGE_SIDE),
        };

        let mut missing = Vec::new();
        if limits.logo.max_bytes == 0 {
            missing.push("MAX_LOGO_BYTES");
        }
        if limits.logo.max_dimension == 0 {
            missing.push("MAX_LOGO_DIMENSION");
        }
        if limits.max_box_size == 0 {
            missing.push("MAX_BOX_SIZE");
        }
        if limits.max_image_side == 0 {
            missing.push("MAX_IMAGE_SIDE");
        }
        if !missing.is_empty() {
            anyhow::bail!("{} must be positive", missing.join(", "));
        }

        let logo_size_percent = logo_size_percent.unwrap_or(DEFAULT_SIZE_PERCENT);
        if !(logo_size_percent > 0.0 && logo_size_percent <= 1.0) {
            anyhow::bail!("LOGO_SIZE_PERCENT must be in (0, 1], got {}", logo_size_percent);
        }

        let request_timeout_ms = request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        if request_timeout_ms == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_MS must be positive");
        }

        Ok(Self {
            server_addr,
            port,
            cors_origins,
            limits,
            logo_size_percent,
            force_high_ec_with_logo: force_high_ec_with_logo.unwrap_or(true),
            request_timeout: Duration::from_millis(request_timeout_ms),
        })
    }
}
