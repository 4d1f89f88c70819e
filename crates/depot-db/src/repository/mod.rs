//! Repository pattern implementations for database operations.
//!
//! Each repository handles the queries for one table:
//!
//! - [`UserRepository`](users::UserRepository) - Index users, the package owners
//! - [`PackageRepository`](packages::PackageRepository) - Packages by name
//! - [`ReleaseRepository`](releases::ReleaseRepository) - Versions of a package
//! - [`DistributionRepository`](distributions::DistributionRepository) - Stored files

pub mod distributions;
pub mod packages;
pub mod releases;
pub mod users;
