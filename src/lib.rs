//! Downloads audio files, concatenates them in order and exports one merged file.
//!
//! The HTTP service lives in `main.rs`; the `merge-audio` binary runs the same
//! pipeline from the command line.

pub mod app_state;
pub mod audio;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod services;
pub mod source;
pub mod utils;

#[cfg(test)]
mod test_support;
