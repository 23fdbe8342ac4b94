//! Spaced-repetition recap engine: pure scheduling queries plus the
//! store-backed learning log.

pub mod log;
pub mod schedule;
