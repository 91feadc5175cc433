//! Chunk types.
//!
//! - [`Chunk`] - Indexed slice of raw input, the unit of parallel work

mod data;

pub use data::Chunk;
