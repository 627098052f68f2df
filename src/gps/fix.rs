// src/gps/fix.rs
//! gpsd report records as produced by `gpspipe -w`

use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Report class carrying a time/position/velocity fix
pub const TPV_CLASS: &str = "TPV";

/// One gpsd JSON report, kept loosely typed.
///
/// gpsd adds fields between releases and omits the ones it has no data
/// for, so everything except `class` stays a raw JSON value. The textual
/// form of numbers is what ends up in the CoT attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GpsFix {
    #[serde(default)]
    pub class: Value,
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl GpsFix {
    /// Parse a single line of gpsd JSON. The line must hold a JSON object.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Whether this report is a TPV report
    pub fn is_tpv(&self) -> bool {
        self.class.as_str() == Some(TPV_CLASS)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Field value, only when it is set to something other than
    /// null, `0`, `false` or an empty string/array/object
    pub fn truthy(&self, field: &str) -> Option<&Value> {
        self.get(field).filter(|v| is_truthy(v))
    }

    /// Whether both coordinates are present. Zero counts as missing.
    pub fn has_position(&self) -> bool {
        self.truthy("lat").is_some() && self.truthy("lon").is_some()
    }
}

/// Truth value of a JSON value: null, zero, false and empty values are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text used for an attribute taken from a report field.
///
/// Integers print as-is, floats in their shortest round-trip form
/// (`37.7600501`, `10.0`, `1e-05`), booleans as `True`/`False`, strings
/// as-is and a missing field becomes the literal `None`. This is the
/// text existing consumers of the gateway have always received.
pub fn attr_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_f64() => {
            n.as_f64().map_or_else(|| n.to_string(), float_text)
        }
        Some(other) => other.to_string(),
    }
}

/// Shortest round-trip decimal for `f`. Positional notation is used for
/// exponents in `-4..16`, scientific (`1e-05`, `1.5e+16`) otherwise.
fn float_text(f: f64) -> String {
    if !f.is_finite() {
        return f.to_string();
    }

    // `{:e}` yields the shortest digits, e.g. "-3.77600501e1"
    let sci = format!("{:e}", f);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };

    if !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }

    let (sign, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits = unsigned.replace('.', "");

    if exp < 0 {
        let zeros = "0".repeat((-exp - 1) as usize);
        return format!("{}0.{}{}", sign, zeros, digits);
    }

    let int_len = exp as usize + 1;
    if digits.len() <= int_len {
        let zeros = "0".repeat(int_len - digits.len());
        format!("{}{}{}.0", sign, digits, zeros)
    } else {
        format!("{}{}.{}", sign, &digits[..int_len], &digits[int_len..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tpv_parsing() {
        let line = r#"{"class":"TPV","device":"/dev/ttyACM0","mode":3,"lat":37.760050100,"lon":-122.497702900,"altHAE":20.6260,"track":359.4589,"speed":0.027}"#;
        let fix = GpsFix::from_json(line).unwrap();

        assert!(fix.is_tpv());
        assert!(fix.has_position());
        assert_eq!(attr_text(fix.get("lat")), "37.7600501");
        assert_eq!(attr_text(fix.get("lon")), "-122.4977029");
        assert_eq!(attr_text(fix.get("altHAE")), "20.626");
        assert_eq!(attr_text(fix.get("device")), "/dev/ttyACM0");
    }

    #[test]
    fn test_other_classes() {
        let fix = GpsFix::from_json(r#"{"class":"SKY","hdop":1.2}"#).unwrap();
        assert!(!fix.is_tpv());

        let fix = GpsFix::from_json(r#"{"lat":1.0,"lon":2.0}"#).unwrap();
        assert!(!fix.is_tpv());
        assert_eq!(fix.class, Value::Null);
    }

    #[test]
    fn test_invalid_json() {
        assert!(GpsFix::from_json(r#"{"class": "TPV", lat"#).is_err());
        assert!(GpsFix::from_json(r#""TPV""#).is_err());
    }

    #[test]
    fn test_zero_coordinate_is_missing() {
        let fix = GpsFix::from_json(r#"{"class":"TPV","lat":0,"lon":-122.4}"#).unwrap();
        assert!(!fix.has_position());

        let fix = GpsFix::from_json(r#"{"class":"TPV","lat":"","lon":-122.4}"#).unwrap();
        assert!(!fix.has_position());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(-0.5)));
        assert!(is_truthy(&json!("x")));
    }

    #[test]
    fn test_attr_text() {
        assert_eq!(attr_text(None), "None");
        assert_eq!(attr_text(Some(&json!(null))), "None");
        assert_eq!(attr_text(Some(&json!(90))), "90");
        assert_eq!(attr_text(Some(&json!(10.0))), "10.0");
        assert_eq!(attr_text(Some(&json!(0.027))), "0.027");
        assert_eq!(attr_text(Some(&json!(true))), "True");
        assert_eq!(attr_text(Some(&json!(false))), "False");
    }

    #[test]
    fn test_float_text() {
        assert_eq!(float_text(37.7600501), "37.7600501");
        assert_eq!(float_text(-122.4977029), "-122.4977029");
        assert_eq!(float_text(0.0), "0.0");
        assert_eq!(float_text(-0.0), "-0.0");
        assert_eq!(float_text(1200.0), "1200.0");
        assert_eq!(float_text(0.0001), "0.0001");
        assert_eq!(float_text(1e-05), "1e-05");
        assert_eq!(float_text(-2.5e-07), "-2.5e-07");
        assert_eq!(float_text(1e16), "1e+16");
        assert_eq!(float_text(1.5e16), "1.5e+16");
        assert_eq!(float_text(123456789012345.6), "123456789012345.6");
    }

    #[test]
    fn test_small_coordinate_text() {
        let fix = GpsFix::from_json(r#"{"class":"TPV","lat":37.5,"lon":1e-05}"#).unwrap();
        assert_eq!(attr_text(fix.get("lon")), "1e-05");
    }
}
