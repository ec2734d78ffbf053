//! Test Helper Utilities
//!
//! Shared utilities for testing tagsync-core

#![allow(dead_code)]

pub mod audio_generator;
pub mod catalog;
pub mod log_capture;

pub use audio_generator::{
    generate_test_ape, generate_test_flac, generate_test_m4a, generate_test_mp3, generate_test_opus,
    generate_test_wav, generate_test_wma, write_test_cover, AudioConfig,
};
pub use catalog::{fully_populated_tag, populated_track_file};
pub use log_capture::{capture_logs, LogCapture};
