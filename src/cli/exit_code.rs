//! Exit code definitions for sshtap
//!
//! Provides standardized exit codes for different error conditions.

use crate::Error;

/// Exit codes for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// General/unspecified error
    GeneralError = 1,
    /// Configuration error (invalid config, missing required settings)
    ConfigError = 2,
    /// Connection error (cannot reach the remote host)
    ConnectionError = 3,
    /// Authentication error (all methods exhausted)
    AuthError = 4,
    /// Resource error (audit log not writable)
    ResourceError = 5,
}

impl ExitCode {
    /// Map an error to the exit code it should terminate with.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::TomlParse(_) => ExitCode::ConfigError,
            Error::Connection(_) => ExitCode::ConnectionError,
            Error::Authentication(_) => ExitCode::AuthError,
            Error::Resource(_) => ExitCode::ResourceError,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for u8 {
    fn from(code: ExitCode) -> Self {
        code as u8
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from_error(&Error::Config("bad".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Connection("refused".into())),
            ExitCode::ConnectionError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Authentication("denied".into())),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Resource("log dir".into())),
            ExitCode::ResourceError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Other("misc".into())),
            ExitCode::GeneralError
        );
    }
}
