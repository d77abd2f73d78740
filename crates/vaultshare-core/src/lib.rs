//! # vaultshare-core
//!
//! Core crate for VaultShare. Contains the unified error system,
//! configuration schemas, typed identifiers, and the storage provider
//! trait implemented by `vaultshare-storage`.
//!
//! This crate has **no** internal dependencies on other VaultShare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorDetail, ErrorKind};
pub use result::AppResult;
