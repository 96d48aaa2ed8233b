use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum QRError {
    // Encoder
    #[error("Payload must not be empty")]
    InvalidPayload,
    #[error("Payload too long to fit any QR version")]
    DataTooLong,
    #[error("Invalid version {0}, expected 1 to 40")]
    InvalidVersion(i64),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    // Compositor
    #[error("Unsupported logo format: {0}")]
    UnsupportedLogoFormat(String),
    #[error("Logo has no area left after scaling")]
    DegenerateLogo,
    #[error("Logo exceeds limit: {0}")]
    LogoTooLarge(String),

    // Transport
    #[error("Malformed transport string: {0}")]
    MalformedTransportString(String),
    #[error("Internal encoding failure: {0}")]
    InternalEncodingFailure(String),
}

impl QRError {
    /// True when the caller supplied bad input, false for failures on our side.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::InternalEncodingFailure(_))
    }
}

pub type QRResult<T> = Result<T, QRError>;

#[cfg(test)]
mod error_tests {
    use test_case::test_case;

    use super::QRError;

    #[test_case(QRError::InvalidPayload, true)]
    #[test_case(QRError::DataTooLong, true)]
    #[test_case(QRError::InvalidColor("teal-ish".into()), true)]
    #[test_case(QRError::UnsupportedLogoFormat("bad header".into()), true)]
    #[test_case(QRError::DegenerateLogo, true)]
    #[test_case(QRError::MalformedTransportString("no separator".into()), true)]
    #[test_case(QRError::InternalEncodingFailure("png".into()), false)]
    fn test_error_class(err: QRError, client: bool) {
        assert_eq!(err.is_client_error(), client);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(QRError::InvalidVersion(41).to_string(), "Invalid version 41, expected 1 to 40");
        assert_eq!(QRError::InvalidColor("#zz".into()).to_string(), "Invalid color: #zz");
    }
}
