use error::DepotError;

pub mod database;
pub mod driver;
pub mod error;
pub mod list;
pub mod register;
pub mod storage;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub type DepotResult<T> = std::result::Result<T, DepotError>;
