//! Loaders for recorded input data.

pub mod recording;
