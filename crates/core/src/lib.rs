//! Arithmetic practice domain: problem generation, answer checking and
//! daily progress.

#![forbid(unsafe_code)]

pub mod generator;
pub mod model;
pub mod ops;
pub mod progress;
pub mod time;

pub use time::Clock;
