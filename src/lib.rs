// LogSift - lib.rs
//
// Library entry point, exposing every layer for integration testing.
// The command-line front end lives in `main.rs`.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
