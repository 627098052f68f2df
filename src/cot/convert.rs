// src/cot/convert.rs
//! GPS fix to CoT conversion

use super::event::{Contact, CotEvent, Detail, Point, Track, COT_VERSION, HOW_GPS, UNKNOWN_ERROR};
use super::time::cot_time;
use crate::config::{LincotConfig, UID_PREFIX};
use crate::gps::fix::{attr_text, GpsFix};
use chrono::{DateTime, Utc};

/// Convert a gpsd TPV report into a CoT event.
///
/// Returns `None` for anything that is not a TPV report with both
/// coordinates set. A coordinate of exactly zero is treated as missing.
pub fn gpspipe_to_cot_xml(fix: &GpsFix, config: &LincotConfig) -> Option<CotEvent> {
    gpspipe_to_cot_xml_at(fix, config, Utc::now())
}

pub fn gpspipe_to_cot_xml_at(
    fix: &GpsFix,
    config: &LincotConfig,
    now: DateTime<Utc>,
) -> Option<CotEvent> {
    if !fix.is_tpv() || !fix.has_position() {
        return None;
    }

    let callsign = config.callsign();
    let uid = format!("{}-{}", UID_PREFIX, callsign);

    let point = Point {
        lat: attr_text(fix.get("lat")),
        lon: attr_text(fix.get("lon")),
        hae: fix
            .truthy("altHAE")
            .map_or_else(|| UNKNOWN_ERROR.to_string(), |v| attr_text(Some(v))),
        le: UNKNOWN_ERROR.to_string(),
        ce: UNKNOWN_ERROR.to_string(),
    };

    // Absent course/speed are written as "None" rather than omitted
    let detail = Detail {
        track: Track {
            course: attr_text(fix.get("track")),
            speed: attr_text(fix.get("speed")),
        },
        contact: Contact { callsign },
        remarks: config.cot_host_id().to_string(),
    };

    Some(CotEvent {
        version: COT_VERSION.to_string(),
        event_type: config.cot_type().to_string(),
        uid,
        how: HOW_GPS.to_string(),
        time: cot_time(now, 0),
        start: cot_time(now, 0),
        stale: cot_time(now, config.cot_stale()),
        point,
        detail,
    })
}

/// Convert a gpsd TPV report into the bytes handed to the transmit queue
pub fn gpspipe_to_cot(fix: &GpsFix, config: &LincotConfig) -> Option<Vec<u8>> {
    gpspipe_to_cot_xml(fix, config).map(|event| event.to_bytes())
}
