// LogDeck - core/mod.rs
//
// Core presentation engine: classification of file listings and the
// filter → sort → paginate record pipeline.
// Dependencies: serde, chrono, regex, glob. No I/O.
// Must NOT depend on: app or platform.

pub mod classify;
pub mod column;
pub mod filter;
pub mod model;
pub mod paginate;
pub mod rotation;
pub mod sort;
pub mod source;
pub mod value;
pub mod view;
