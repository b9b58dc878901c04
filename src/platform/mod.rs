// LogSift - platform/mod.rs
//
// Platform abstraction layer: filesystem access and config directories.
// Dependencies: standard library, directories, toml, core selection types.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
