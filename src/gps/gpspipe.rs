// src/gps/gpspipe.rs
//! Running the GPS info command and picking the fix out of its output

use super::fix::{GpsFix, TPV_CLASS};
use crate::error::{LincotError, Result};
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `cmd` through the shell and return its standard output.
///
/// The command is awaited to completion with no timeout. A non-zero exit
/// status is only logged: gpspipe exits non-zero on some gpsd hiccups
/// while still printing usable reports.
pub async fn run_gps_info_cmd(cmd: &str) -> Result<String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| LincotError::Command(format!("Failed to run '{}': {}", cmd, e)))?;

    if !output.status.success() {
        warn!(cmd, status = %output.status, "GPS info command exited unsuccessfully");
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Select the last line mentioning `TPV`, so the freshest fix in the
/// batch wins over earlier ones.
pub fn select_tpv_line(output: &str) -> Option<&str> {
    output.lines().rev().find(|line| line.contains(TPV_CLASS))
}

/// Extract the most recent fix from raw command output.
///
/// Returns `Ok(None)` when there is nothing to report; a selected line
/// that is not valid JSON is an error.
pub fn extract_fix(output: &str) -> Result<Option<GpsFix>> {
    if output.is_empty() {
        debug!("GPS info command produced no output");
        return Ok(None);
    }

    let Some(line) = select_tpv_line(output) else {
        debug!("No TPV report in GPS info output");
        return Ok(None);
    };

    debug!(gps_info = line, "Selected TPV report");
    GpsFix::from_json(line).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPSPIPE_OUTPUT: &str = concat!(
        r#"{"class":"VERSION","release":"3.22","rev":"3.22","proto_major":3,"proto_minor":14}"#, "\n",
        r#"{"class":"DEVICES","devices":[{"class":"DEVICE","path":"/dev/ttyACM0","driver":"u-blox"}]}"#, "\n",
        r#"{"class":"WATCH","enable":true,"json":true}"#, "\n",
        r#"{"class":"TPV","device":"/dev/ttyACM0","mode":3,"lat":37.7749,"lon":-122.4194}"#, "\n",
        r#"{"class":"TPV","device":"/dev/ttyACM0","mode":3,"lat":37.7600501,"lon":-122.4977029}"#, "\n",
    );

    #[test]
    fn test_last_tpv_wins() {
        let line = select_tpv_line(GPSPIPE_OUTPUT).unwrap();
        assert!(line.contains("37.7600501"));

        let fix = extract_fix(GPSPIPE_OUTPUT).unwrap().unwrap();
        assert_eq!(fix.get("lat").and_then(|v| v.as_f64()), Some(37.7600501));
    }

    #[test]
    fn test_no_tpv() {
        let output = concat!(
            r#"{"class":"VERSION","release":"3.22"}"#, "\n",
            r#"{"class":"SKY","hdop":1.2}"#, "\n",
        );
        assert!(select_tpv_line(output).is_none());
        assert!(extract_fix(output).unwrap().is_none());
    }

    #[test]
    fn test_single_line_without_newline() {
        assert_eq!(select_tpv_line(r#"{"class":"TPV"}"#), Some(r#"{"class":"TPV"}"#));

        let fix = extract_fix(r#"{"class":"TPV","lat":1.5,"lon":2.5}"#).unwrap();
        assert!(fix.unwrap().is_tpv());
    }

    #[test]
    fn test_empty_output() {
        assert!(extract_fix("").unwrap().is_none());
    }

    #[test]
    fn test_malformed_tpv_line() {
        let output = "{\"class\":\"TPV\",\"lat\":\n";
        assert!(extract_fix(output).is_err());
    }

    #[tokio::test]
    async fn test_run_command() {
        let output = run_gps_info_cmd("printf 'one\\ntwo\\n'").await.unwrap();
        assert_eq!(output, "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_failing_command_keeps_output() {
        let output = run_gps_info_cmd("echo partial; exit 3").await.unwrap();
        assert_eq!(output, "partial\n");
    }
}
