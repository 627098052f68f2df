// src/gps/mod.rs
//! GPS report handling

pub mod fix;
pub mod gpspipe;

pub use fix::GpsFix;
