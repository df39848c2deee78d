// LogDeck - lib.rs
//
// Library entry point, exposing every layer for integration testing and
// for front ends that embed the presentation engine.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
