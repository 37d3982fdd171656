//! solc-adapter CLI library.
//!
//! This crate provides the command implementations behind the `solc-adapter`
//! binary: source discovery, toolchain selection, and the `compile` and
//! `doctor` commands.

pub mod commands;
pub mod logging;
pub mod sources;
pub mod toolchain;
