// LogSift - app/mod.rs
//
// Application layer: orchestration of one-shot analysis and live follow.
// Dependencies: core and platform layers.

pub mod analysis;
pub mod follow;
