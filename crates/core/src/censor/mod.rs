//! Censor engine: the external pipeline that mutes or beeps profanity.
//!
//! The detection itself happens in the bleeptool command-line program.
//! This module only plans the output location, runs the tool with the
//! current settings and reports what it found.

mod bleeptool;
mod config;
mod error;
mod traits;

pub use bleeptool::{build_args, is_supported_input, plan_output_path, BleeptoolEngine};
pub use config::BleeptoolConfig;
pub use error::CensorError;
pub use traits::{CensorEngine, CensorOutcome};
