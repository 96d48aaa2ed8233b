mod qr;

pub use qr::QR;

use qrcode::{types::QrError, QrCode};
use tracing::debug;

use crate::common::{
    error::{QRError, QRResult},
    metadata::{Color, ECLevel, Version, MAX_VERSION},
};

pub const DEFAULT_BOX_SIZE: u32 = 10;
pub const DEFAULT_BORDER: u32 = 4;

pub struct QRBuilder<'a> {
    data: &'a [u8],
    version: Version,
    ec_level: ECLevel,
    box_size: u32,
    border: u32,
    fill: Color,
    back: Color,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            version: Version::Auto,
            ec_level: ECLevel::M,
            box_size: DEFAULT_BOX_SIZE,
            border: DEFAULT_BORDER,
            fill: Color::BLACK,
            back: Color::WHITE,
        }
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = version;
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = Version::Auto;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn box_size(&mut self, box_size: u32) -> &mut Self {
        self.box_size = box_size;
        self
    }

    pub fn border(&mut self, border: u32) -> &mut Self {
        self.border = border;
        self
    }

    pub fn fill(&mut self, fill: Color) -> &mut Self {
        self.fill = fill;
        self
    }

    pub fn back(&mut self, back: Color) -> &mut Self {
        self.back = back;
        self
    }

    pub fn metadata(&self) -> String {
        match self.version {
            Version::Normal(v) => format!(
                "{{ Version: {v}+, Ec level: {}, Box: {}, Border: {} }}",
                self.ec_level, self.box_size, self.border
            ),
            Version::Auto => format!(
                "{{ Version: Auto, Ec level: {}, Box: {}, Border: {} }}",
                self.ec_level, self.box_size, self.border
            ),
        }
    }
}

#[cfg(test)]
mod qrbuilder_util_tests {
    use super::QRBuilder;
    use crate::common::{ECLevel, Version};

    #[test]
    fn test_metadata() {
        let data = "Hello, world!".as_bytes();
        let mut qr_builder = QRBuilder::new(data);
        qr_builder.version(Version::Normal(3)).ec_level(ECLevel::L).box_size(6).border(2);
        assert_eq!(qr_builder.metadata(), "{ Version: 3+, Ec level: L, Box: 6, Border: 2 }");
        qr_builder.unset_version();
        assert_eq!(qr_builder.metadata(), "{ Version: Auto, Ec level: L, Box: 6, Border: 2 }");
    }
}

impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        debug!("Generating QR {}...", self.metadata());
        if self.data.is_empty() {
            return Err(QRError::InvalidPayload);
        }
        if self.box_size == 0 {
            return Err(QRError::InvalidOption("box size must be positive".to_string()));
        }

        let start = self.version.start();
        if !(1..=MAX_VERSION).contains(&start) {
            return Err(QRError::InvalidVersion(start as i64));
        }

        // Smallest fitting version, then bumped to the requested minimum
        debug!("Finding best version...");
        let ecl = self.ec_level.into();
        let mut code = QrCode::with_error_correction_level(self.data, ecl).map_err(Self::map_err)?;
        let fitted = Self::version_number(&code);
        if fitted < start {
            debug!(fitted, start, "Raising version to requested minimum...");
            code = QrCode::with_version(self.data, qrcode::Version::Normal(start as i16), ecl)
                .map_err(Self::map_err)?;
        }

        let qr = QR::new(&code, self.ec_level, self.box_size, self.border, self.fill, self.back);
        debug!(
            version = qr.version(),
            width = qr.width(),
            dark_modules = qr.count_dark_modules(),
            "QR generated"
        );

        Ok(qr)
    }

    fn version_number(code: &QrCode) -> u8 {
        match code.version() {
            qrcode::Version::Normal(v) | qrcode::Version::Micro(v) => v as u8,
        }
    }

    fn map_err(err: QrError) -> QRError {
        match err {
            QrError::DataTooLong => QRError::DataTooLong,
            QrError::InvalidVersion => QRError::InvalidOption("unsupported version".to_string()),
            other => QRError::InternalEncodingFailure(other.to_string()),
        }
    }
}
