//! [`StreamExtractor`] backed by the external `yt-dlp` tool.

use super::{ServiceError, StreamExtractor};
use crate::scraper::chain::{non_empty, resolve_or, Strategy};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const DEFAULT_PROGRAM: &str = "yt-dlp";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Direct stream resolved from a playable page or playlist URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub title: String,
    pub thumbnail: String,
    /// Seconds, when the tool reports it.
    pub duration: Option<u32>,
    /// "720p"-style label, or "unknown".
    pub resolution: String,
    pub url: String,
    pub format_id: String,
    pub ext: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFormat {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawInfo {
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
    url: Option<String>,
    requested_formats: Vec<RawFormat>,
    format_id: Option<String>,
    ext: Option<String>,
    height: Option<u32>,
}

/// yt-dlp format selector capped at the requested height ("1080p" -> 1080).
pub fn format_selector(quality: Option<&str>) -> String {
    let height = quality
        .map(|q| q.trim().trim_end_matches(|c| c == 'p' || c == 'P'))
        .filter(|h| !h.is_empty() && h.chars().all(|c| c.is_ascii_digit()));
    match height {
        Some(h) => format!(
            "bestvideo[height<={h}]+bestaudio/best[height<={h}]/best",
            h = h
        ),
        None => "bestvideo+bestaudio/best".to_string(),
    }
}

/// Decode the tool's `--dump-json` output.
fn parse_stream_info(output: &[u8]) -> Result<StreamInfo, ServiceError> {
    let raw: RawInfo = serde_json::from_slice(output).map_err(|e| ServiceError::Decode {
        what: "yt-dlp output".to_string(),
        source: e,
    })?;
    let url_chain = [
        Strategy::new("url", |r: &RawInfo| r.url.as_deref().and_then(non_empty)),
        Strategy::new("requested_formats", |r: &RawInfo| {
            r.requested_formats
                .iter()
                .find_map(|f| f.url.as_deref().and_then(non_empty))
        }),
    ];
    let url = resolve_or(&raw, &url_chain, String::new());
    Ok(StreamInfo {
        title: raw.title.clone().unwrap_or_default(),
        thumbnail: raw.thumbnail.clone().unwrap_or_default(),
        duration: raw
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.round() as u32),
        resolution: raw
            .height
            .map(|h| format!("{}p", h))
            .unwrap_or_else(|| "unknown".to_string()),
        url,
        format_id: raw.format_id.clone().unwrap_or_default(),
        ext: raw.ext.clone().unwrap_or_default(),
    })
}

fn read_all(source: Option<impl Read>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut s) = source {
        if let Err(e) = s.read_to_end(&mut buf) {
            warn!(error = %e, "failed reading extractor output");
        }
    }
    buf
}

/// Runs `yt-dlp --dump-json` with a wall-clock bound; the process is killed on timeout.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    program: String,
    timeout: Duration,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl YtDlpExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn run(&self, args: &[String]) -> Result<Vec<u8>, ServiceError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ServiceError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_reader = std::thread::spawn(move || read_all(stdout));
        let err_reader = std::thread::spawn(move || read_all(stderr));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    warn!(program = %self.program, "extractor timed out, killing");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ServiceError::Timeout {
                        program: self.program.clone(),
                        secs: self.timeout.as_secs(),
                    });
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(ServiceError::Spawn {
                        program: self.program.clone(),
                        source: e,
                    })
                }
            }
        };
        let stdout = out_reader.join().unwrap_or_default();
        let stderr = err_reader.join().unwrap_or_default();
        if !status.success() {
            let message = String::from_utf8_lossy(&stderr).trim().to_string();
            return Err(ServiceError::ToolFailed {
                program: self.program.clone(),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }
        Ok(stdout)
    }
}

impl StreamExtractor for YtDlpExtractor {
    fn extract(&self, url: &str, quality: Option<&str>) -> Result<StreamInfo, ServiceError> {
        let args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--format".to_string(),
            format_selector(quality),
            url.to_string(),
        ];
        debug!(url, program = %self.program, "running extractor");
        let output = self.run(&args)?;
        let info = parse_stream_info(&output)?;
        info!(url, resolution = %info.resolution, "extracted stream");
        Ok(info)
    }
}
