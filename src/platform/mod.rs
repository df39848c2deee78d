// LogDeck - platform/mod.rs
//
// Platform layer: config directories, config.toml, local filesystem backend.
// Dependencies: directories, walkdir, core model, the app-layer backend trait.

pub mod backend;
pub mod config;
