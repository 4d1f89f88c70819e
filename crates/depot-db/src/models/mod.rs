pub mod index;
pub mod types;
