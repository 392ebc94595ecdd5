//! Configuration types and loaders for fozboy.
//!
//! This crate owns the on-disk configuration schema so the app and its
//! tests share a single source of truth.

pub mod settings;

pub use settings::{config_path, Config, ImageConfig, InputConfig, InputPolicyKind};
