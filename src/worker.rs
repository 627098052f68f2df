// src/worker.rs
//! Poll loop: GPS info command in, CoT events out

use crate::{
    config::LincotConfig,
    cot::gpspipe_to_cot,
    error::Result,
    gps::{gpspipe, GpsFix},
    transport::CotSink,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Periodically runs the GPS info command and forwards the newest fix
/// as a CoT event to its sink.
pub struct LincotWorker<S> {
    config: LincotConfig,
    sink: S,
}

impl<S: CotSink> LincotWorker<S> {
    pub fn new(config: LincotConfig, sink: S) -> Self {
        Self { config, sink }
    }

    /// Run the poll loop.
    ///
    /// `iterations` bounds the number of polls; `None` polls until the
    /// task is cancelled. Poll interval and command are read once here.
    /// Command failures, unparsable reports and sink errors end the loop.
    pub async fn run(&mut self, iterations: Option<u64>) -> Result<()> {
        let poll_interval = Duration::from_secs(self.config.poll_interval());
        let gps_info_cmd = self.config.gps_info_cmd().to_string();

        let mut polled = 0u64;
        loop {
            info!("Polling every {}s: {}", poll_interval.as_secs(), gps_info_cmd);
            self.get_gps_info(&gps_info_cmd).await?;

            polled += 1;
            if iterations.is_some_and(|limit| polled >= limit) {
                return Ok(());
            }

            sleep(poll_interval).await;
        }
    }

    /// One poll cycle. Returns whether an event was queued.
    pub async fn get_gps_info(&mut self, gps_info_cmd: &str) -> Result<bool> {
        let output = gpspipe::run_gps_info_cmd(gps_info_cmd).await?;

        match gpspipe::extract_fix(&output)? {
            Some(fix) => self.handle_data(&fix).await,
            None => Ok(false),
        }
    }

    /// Convert a fix and queue it when it is a usable position
    pub async fn handle_data(&mut self, fix: &GpsFix) -> Result<bool> {
        match gpspipe_to_cot(fix, &self.config) {
            Some(event) => {
                self.sink.put(event).await?;
                Ok(true)
            }
            None => {
                debug!("GPS report is not a usable fix, skipping");
                Ok(false)
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LincotError;
    use crate::transport::{CotUrl, LogTarget, TxWorker};

    fn config_for(cmd: &str) -> LincotConfig {
        LincotConfig {
            gps_info_cmd: Some(cmd.to_string()),
            poll_interval: Some(0),
            callsign: Some("ROVER".to_string()),
            ..Default::default()
        }
    }

    fn printf_cmd(lines: &[&str]) -> String {
        let mut body = String::new();
        for line in lines {
            body.push_str(line);
            body.push_str("\\n");
        }
        format!("printf '%b' '{}'", body)
    }

    #[tokio::test]
    async fn test_last_tpv_is_sent() {
        let cmd = printf_cmd(&[
            r#"{"class":"VERSION","release":"3.22"}"#,
            r#"{"class":"TPV","mode":3,"lat":10.5,"lon":20.5}"#,
            r#"{"class":"SKY","hdop":1.2}"#,
            r#"{"class":"TPV","mode":3,"lat":37.7749,"lon":-122.4194,"altHAE":10,"track":90,"speed":10}"#,
        ]);
        let mut worker = LincotWorker::new(config_for(&cmd), Vec::<Vec<u8>>::new());

        worker.run(Some(1)).await.unwrap();

        let sent = worker.into_sink();
        assert_eq!(sent.len(), 1);
        let text = String::from_utf8(sent[0].clone()).unwrap();
        assert!(text.contains(r#"lat="37.7749" lon="-122.4194" hae="10""#));
        assert!(text.contains(r#"<track course="90" speed="10" />"#));
        assert!(text.contains(r#"uid="LINCOT-ROVER""#));
    }

    #[tokio::test]
    async fn test_no_tpv_sends_nothing() {
        let cmd = printf_cmd(&[r#"{"class":"VERSION","release":"3.22"}"#, r#"{"class":"SKY"}"#]);
        let mut worker = LincotWorker::new(config_for(&cmd), Vec::<Vec<u8>>::new());

        worker.run(Some(2)).await.unwrap();
        assert!(worker.sink().is_empty());
    }

    #[tokio::test]
    async fn test_empty_output_sends_nothing() {
        let mut worker = LincotWorker::new(config_for("true"), Vec::<Vec<u8>>::new());

        assert!(!worker.get_gps_info("true").await.unwrap());
        assert!(worker.sink().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_fix_is_skipped() {
        let cmd = printf_cmd(&[r#"{"class":"TPV","mode":1,"lat":0,"lon":0}"#]);
        let mut worker = LincotWorker::new(config_for(&cmd), Vec::<Vec<u8>>::new());

        assert!(!worker.get_gps_info(&cmd).await.unwrap());
        assert!(worker.sink().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_ends_loop() {
        let cmd = printf_cmd(&[r#"{"class":"TPV","lat":"#]);
        let mut worker = LincotWorker::new(config_for(&cmd), Vec::<Vec<u8>>::new());

        let result = worker.run(None).await;
        assert!(matches!(result, Err(LincotError::Json(_))));
    }

    #[tokio::test]
    async fn test_repeated_polls() {
        let cmd = printf_cmd(&[r#"{"class":"TPV","lat":1.25,"lon":2.5}"#]);
        let mut worker = LincotWorker::new(config_for(&cmd), Vec::<Vec<u8>>::new());

        worker.run(Some(3)).await.unwrap();
        assert_eq!(worker.sink().len(), 3);
    }

    #[tokio::test]
    async fn test_closed_sink_ends_loop() {
        let cmd = printf_cmd(&[r#"{"class":"TPV","lat":1.25,"lon":2.5}"#]);
        let (tx_worker, tx) = TxWorker::new(CotUrl::Log(LogTarget::Stdout));
        drop(tx_worker);

        let mut worker = LincotWorker::new(config_for(&cmd), tx);
        let result = worker.run(None).await;
        assert!(matches!(result, Err(LincotError::Transport(_))));
    }
}
