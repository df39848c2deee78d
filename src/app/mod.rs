// LogDeck - app/mod.rs
//
// Application layer: view state, search debouncing, background loads.
// Dependencies: core layer.
// Must NOT depend on: platform specifics.

pub mod commands;
pub mod debounce;
pub mod load;
pub mod state;
