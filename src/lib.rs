//! # qrlogo
//!
//! QR code generation with an optional logo composited at the center, plus the HTTP service
//! that exposes it.
//!
//! ## Features
//!
//! - **QR Code Generation**: Payload to raster with configurable error correction level,
//!   minimum version, module size, quiet zone and colors
//! - **Logo Compositing**: Clean zone shaped after the logo (circle or rounded rectangle), sized
//!   so no Reed-Solomon block loses more codewords than its level can restore
//! - **Transport**: Rasters travel as `data:image/png;base64,...` strings
//! - **HTTP Service**: `POST /api/qr/generate` and `GET /api/qr/health` on axum
//!
//! ## Quick Start
//!
//! ### Simple QR Code Generation
//!
//! ```rust
//! use qrlogo::QRBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Only data is required, everything else has a default
//! let qr = QRBuilder::new(b"https://example.com").build()?;
//!
//! let img = qr.render(); // 10 px modules with a 4 module quiet zone
//! assert_eq!(img.width(), (qr.width() as u32 + 8) * 10);
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrlogo::{Color, ECLevel, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, World!")
//!     .version(Version::Normal(2))     // Minimum version, grows if the data does not fit
//!     .ec_level(ECLevel::Q)            // Defaults to ECLevel::M
//!     .box_size(6)                     // Pixels per module
//!     .border(2)                       // Quiet zone in modules
//!     .fill("#1E3A8A".parse::<Color>()?)
//!     .back(Color::WHITE)
//!     .build()?;
//!
//! assert!(qr.version() >= 2);
//! # Ok(())
//! # }
//! ```
//!
//! ### Adding a Logo
//!
//! ```rust
//! use image::{DynamicImage, Rgba, RgbaImage};
//! use qrlogo::{ECLevel, QRBuilder, Compositor, encode_to_transport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"https://example.com").ec_level(ECLevel::H).build()?;
//! let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 200, Rgba([200, 0, 0, 255])));
//!
//! let budget = qr.damage_budget()?;
//! let img = Compositor::default().compose_within(qr.render(), &logo, 0.25, &budget)?;
//! let transport = encode_to_transport(&img)?;
//! assert!(transport.starts_with("data:image/png;base64,"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction
//!
//! A logo always destroys the modules under its clean zone. The [`DamageBudget`] of a code
//! maps those modules to codewords and allows at most 60% of the codewords each block can
//! correct. Finder, timing, format and version modules may never be covered.

pub mod builder;
pub mod common;
pub mod logo;
pub mod pipeline;
pub mod server;
pub mod transport;

pub use builder::{QRBuilder, QR};
pub use common::error::{QRError, QRResult};
pub use common::metadata::{Color, ECLevel, Version};
pub use logo::{compose, BackgroundSource, CompositePolicy, Compositor, DamageBudget};
pub use pipeline::{EncodeOptions, Limits, Pipeline, QrRequest};
pub use transport::{decode_from_transport, encode_to_transport};
