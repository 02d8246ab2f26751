//! sdkify library - expose modules for testing
//!
//! The binary is a thin shell over these modules: argument types, project
//! discovery and result reporting. Translation itself lives in `sdkify-core`.

pub mod commands;
pub mod common;
pub mod discovery;
pub mod errors;

pub use common::GlobalOpts;
