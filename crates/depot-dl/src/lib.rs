//! Locating and downloading Python distributions.
//!
//! A label is either a local file, a `file://` or `http(s)://` URL, or a
//! requirement such as `requests>=2,<3` resolved against the JSON API of a
//! package index.

pub mod download;
pub mod error;
pub mod http;
pub mod http_client;
pub mod index;
pub mod requirement;
pub mod traits;
pub mod types;
pub mod utils;
pub mod version;

pub use error::DownloadError;
pub use index::PackageIndex;
pub use requirement::Requirement;
pub use traits::DistributionResolver;
pub use version::ReleaseVersion;
