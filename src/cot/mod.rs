// src/cot/mod.rs
//! Cursor on Target marker generation

pub mod convert;
pub mod event;
pub mod time;

pub use convert::{gpspipe_to_cot, gpspipe_to_cot_xml};
pub use event::CotEvent;
