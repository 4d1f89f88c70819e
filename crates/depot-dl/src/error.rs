use depot_utils::error::FileSystemError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(depot_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid requirement '{label}': {reason}")]
    #[diagnostic(
        code(depot_dl::invalid_requirement),
        help("Use a name optionally followed by specifiers, e.g. 'requests>=2,<3'")
    )]
    InvalidRequirement { label: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(depot_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(depot_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error(transparent)]
    #[diagnostic(code(depot_dl::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(depot_dl::filesystem))]
    FileSystem(#[from] FileSystemError),

    #[error("Invalid response from {url}")]
    #[diagnostic(
        code(depot_dl::invalid_response),
        help("The index did not return the expected JSON document")
    )]
    InvalidResponse { url: String },

    #[error("File name could not be determined")]
    #[diagnostic(
        code(depot_dl::no_filename),
        help("The URL must end with the distribution file name")
    )]
    NoFilename,
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<ureq::Error> for DownloadError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Io(io) => Self::Io(io),
            other => Self::Network(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_http_error() {
        let err = DownloadError::HttpError {
            status: 503,
            url: "https://pypi.org/pypi/foo/json".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("HTTP 503"));
        assert!(msg.contains("https://pypi.org/pypi/foo/json"));
    }

    #[test]
    fn test_invalid_requirement_message() {
        let err = DownloadError::InvalidRequirement {
            label: "foo>>1".to_string(),
            reason: "unknown operator".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid requirement 'foo>>1': unknown operator");
    }

    #[test]
    fn test_from_ureq_error() {
        let download_err: DownloadError = ureq::Error::ConnectionFailed.into();
        assert!(matches!(download_err, DownloadError::Network(_)));
    }

    #[test]
    fn test_error_source_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DownloadError::Io(io_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
