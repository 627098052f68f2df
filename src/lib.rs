// src/lib.rs
//! LINCOT: Linux GPS to TAK gateway
//!
//! Polls a GPS reporting command such as `gpspipe -w -n 5`, converts the
//! newest gpsd TPV report into a Cursor on Target marker and queues it for
//! delivery to a TAK server or multicast group.

pub mod config;
pub mod cot;
pub mod error;
pub mod gps;
pub mod node;
pub mod transport;
pub mod worker;

// Re-export main types for convenience
pub use config::LincotConfig;
pub use cot::{gpspipe_to_cot, gpspipe_to_cot_xml, CotEvent};
pub use error::{LincotError, Result};
pub use gps::GpsFix;
pub use transport::{CotSink, CotUrl, TxWorker};
pub use worker::LincotWorker;
