//! # vaultshare-entity
//!
//! Domain entity models for VaultShare. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.
//!
//! Key material (`encryption_key`, `iv`) is accepted on deserialization but
//! never serialized back out.

pub mod file;
