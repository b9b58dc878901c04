// LogSift - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, chrono, regex, serde and the output codecs.
// Must NOT depend on: platform or app.

pub mod export;
pub mod filter;
pub mod formats;
pub mod level;
pub mod model;
pub mod parser;
pub mod stats;
pub mod timestamp;
