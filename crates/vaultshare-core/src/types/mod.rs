//! Core type definitions used across the VaultShare workspace.

pub mod id;

pub use id::*;
