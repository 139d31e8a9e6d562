//! Streaming video decode via an ffmpeg subprocess.
//!
//! - `ffprobe` probes metadata (dimensions, fps, duration) on the worker thread
//! - `ffmpeg -f rawvideo -pix_fmt rgba` streams frames through a pipe
//! - Frames cross to the UI thread on a bounded channel; the worker blocks
//!   when the player falls behind, so at most `EVENT_QUEUE_DEPTH` frames are
//!   held in memory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError};

use super::provider::{FrameProvider, ProviderStatus};
use super::types::{DecodedFrame, VideoMeta};

const EVENT_QUEUE_DEPTH: usize = 4;
const SEND_POLL: Duration = Duration::from_millis(50);

/// File extensions handed to ffmpeg.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi", "m4v"];

/// Check if ffmpeg/ffprobe are available on the system. Cached per process.
pub fn ffmpeg_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        Command::new("ffprobe")
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

/// Probe video metadata using ffprobe.
pub fn probe_video(path: &Path) -> Result<VideoMeta, String> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| format!("ffprobe failed to execute: {e}"))?;

    if !output.status.success() {
        return Err(format!("ffprobe could not read {}", path.display()));
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> Result<VideoMeta, String> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| format!("Failed to parse ffprobe JSON: {e}"))?;

    let streams = json["streams"]
        .as_array()
        .ok_or("No streams in ffprobe output")?;

    let video_stream = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or("No video stream found")?;

    let coded_width = video_stream["width"].as_u64().ok_or("Missing width")? as u32;
    let coded_height = video_stream["height"].as_u64().ok_or("Missing height")? as u32;
    if coded_width == 0 || coded_height == 0 {
        return Err(format!(
            "Video stream has empty size {coded_width}x{coded_height}"
        ));
    }
    // ffmpeg autorotates, so quarter turns swap the output size.
    let (width, height) = if stream_rotation(video_stream).rem_euclid(180) == 90 {
        (coded_height, coded_width)
    } else {
        (coded_width, coded_height)
    };

    let fps = parse_frame_rate(video_stream["r_frame_rate"].as_str().unwrap_or("30/1"));

    let duration_secs = json["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| {
            video_stream["duration"]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    Ok(VideoMeta {
        width,
        height,
        fps,
        duration_secs,
    })
}

/// Display rotation in degrees, from the display matrix side data or the
/// legacy `rotate` tag.
fn stream_rotation(stream: &serde_json::Value) -> i64 {
    stream["side_data_list"]
        .as_array()
        .and_then(|list| {
            list.iter()
                .find_map(|d| d["rotation"].as_f64().map(|r| r.round() as i64))
        })
        .or_else(|| {
            stream["tags"]["rotate"]
                .as_str()
                .and_then(|r| r.parse::<i64>().ok())
        })
        .unwrap_or(0)
}

fn parse_frame_rate(rate: &str) -> f64 {
    if let Some((num, den)) = rate.split_once('/') {
        let n: f64 = num.parse().unwrap_or(30.0);
        let d: f64 = den.parse().unwrap_or(1.0);
        if d > 0.0 && n > 0.0 { n / d } else { 30.0 }
    } else {
        rate.parse::<f64>().ok().filter(|r| *r > 0.0).unwrap_or(30.0)
    }
}

/// Messages from the decode worker to the provider.
enum DecoderEvent {
    Ready(VideoMeta),
    Frame(DecodedFrame),
    Finished,
    Failed(String),
}

struct DecodeWorker {
    events: Receiver<DecoderEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    /// Spawn a worker. With `meta` known the probe step is skipped.
    fn spawn(path: PathBuf, meta: Option<VideoMeta>) -> Result<Self, String> {
        let (tx, events) = crossbeam_channel::bounded(EVENT_QUEUE_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let thread = std::thread::Builder::new()
            .name("video-decode".into())
            .spawn(move || decode_thread(&path, meta, &tx, &shutdown_clone))
            .map_err(|e| format!("Failed to spawn decode thread: {e}"))?;

        Ok(Self {
            events,
            shutdown,
            thread: Some(thread),
        })
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Signal shutdown and join on a background thread. The caller never
    /// waits on the worker's send poll or on ffmpeg exiting.
    fn retire(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let Some(handle) = self.thread.take() else {
            return;
        };
        let reaper = std::thread::Builder::new()
            .name("video-decode-reaper".into())
            .spawn(move || {
                let _ = handle.join();
            });
        if let Err(e) = reaper {
            // The handle was dropped with the closure; the worker runs detached.
            log::warn!("Failed to spawn decode reaper: {e}");
        }
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Send, giving up when shutdown is requested or the receiver is gone.
fn send_event(tx: &Sender<DecoderEvent>, event: DecoderEvent, shutdown: &AtomicBool) -> bool {
    let mut event = event;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        match tx.send_timeout(event, SEND_POLL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(e)) => event = e,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

fn decode_thread(
    path: &Path,
    meta: Option<VideoMeta>,
    tx: &Sender<DecoderEvent>,
    shutdown: &AtomicBool,
) {
    let meta = match meta {
        Some(m) => m,
        None => match probe_video(path) {
            Ok(m) => {
                if !send_event(tx, DecoderEvent::Ready(m.clone()), shutdown) {
                    return;
                }
                m
            }
            Err(e) => {
                send_event(tx, DecoderEvent::Failed(e), shutdown);
                return;
            }
        },
    };

    let mut child = match Command::new("ffmpeg")
        .args(["-i"])
        .arg(path)
        .args([
            "-f", "rawvideo",
            "-pix_fmt", "rgba",
            "-s", &format!("{}x{}", meta.width, meta.height),
            "-v", "quiet",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            send_event(tx, DecoderEvent::Failed(format!("Failed to spawn ffmpeg: {e}")), shutdown);
            return;
        }
    };

    let Some(mut stdout) = child.stdout.take() else {
        send_event(tx, DecoderEvent::Failed("ffmpeg: no stdout pipe".into()), shutdown);
        let _ = child.kill();
        let _ = child.wait();
        return;
    };

    log::info!(
        "Decoding {}: {}x{} @ {:.2} fps",
        path.display(),
        meta.width,
        meta.height,
        meta.fps
    );

    let frame_size = (meta.width as usize) * (meta.height as usize) * 4;
    let mut index: u64 = 0;
    let mut buf = vec![0u8; frame_size];
    let mut completed = true;

    while stdout.read_exact(&mut buf).is_ok() {
        let frame = DecodedFrame {
            data: buf.clone(),
            width: meta.width,
            height: meta.height,
            pts: index as f64 / meta.fps,
        };
        index += 1;
        if !send_event(tx, DecoderEvent::Frame(frame), shutdown) {
            completed = false;
            break;
        }
    }

    let _ = child.kill();
    let _ = child.wait();

    if completed {
        log::info!("Decode finished: {index} frames");
        if index == 0 {
            send_event(tx, DecoderEvent::Failed("ffmpeg decoded zero frames".into()), shutdown);
        } else {
            send_event(tx, DecoderEvent::Finished, shutdown);
        }
    }
}

/// Frame provider backed by an ffmpeg decode worker.
pub struct FfmpegProvider {
    path: PathBuf,
    meta: Option<VideoMeta>,
    failure: Option<String>,
    worker: Option<DecodeWorker>,
    /// Next frame received but not yet due.
    pending: Option<DecodedFrame>,
    finished: bool,
}

impl FfmpegProvider {
    /// Start probing and decoding `path` in the background.
    pub fn open(path: &Path) -> Self {
        let mut provider = Self {
            path: path.to_path_buf(),
            meta: None,
            failure: None,
            worker: None,
            pending: None,
            finished: false,
        };
        match DecodeWorker::spawn(provider.path.clone(), None) {
            Ok(worker) => provider.worker = Some(worker),
            Err(e) => provider.failure = Some(e),
        }
        provider
    }

    /// Drain worker events until a frame is pending or the queue is empty.
    fn pump(&mut self) {
        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        while self.pending.is_none() && !self.finished {
            match worker.events.try_recv() {
                Ok(DecoderEvent::Ready(meta)) => self.meta = Some(meta),
                Ok(DecoderEvent::Frame(frame)) => self.pending = Some(frame),
                Ok(DecoderEvent::Finished) => self.finished = true,
                Ok(DecoderEvent::Failed(e)) => {
                    self.failure = Some(e);
                    self.finished = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    if self.meta.is_none() && self.failure.is_none() {
                        self.failure = Some("decode worker exited before probing".into());
                    }
                }
            }
        }
    }
}

impl FrameProvider for FfmpegProvider {
    fn status(&mut self) -> ProviderStatus {
        self.pump();
        if let Some(e) = &self.failure {
            return ProviderStatus::Failed(e.clone());
        }
        match &self.meta {
            Some(meta) => ProviderStatus::Ready(meta.clone()),
            None => ProviderStatus::Pending,
        }
    }

    fn has_new_frame(&mut self, item_time: f64) -> bool {
        self.pump();
        self.pending.as_ref().is_some_and(|f| f.pts <= item_time)
    }

    fn copy_frame(&mut self, item_time: f64) -> Option<DecodedFrame> {
        let mut latest = None;
        loop {
            self.pump();
            match self.pending.take() {
                Some(frame) if frame.pts <= item_time => latest = Some(frame),
                Some(frame) => {
                    self.pending = Some(frame);
                    break;
                }
                None => break,
            }
        }
        latest
    }

    fn rewind(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.retire();
        }
        self.pending = None;
        self.finished = false;
        match DecodeWorker::spawn(self.path.clone(), self.meta.clone()) {
            Ok(worker) => self.worker = Some(worker),
            Err(e) => {
                log::error!("Failed to restart decode for {}: {e}", self.path.display());
                self.failure = Some(e);
            }
        }
    }

    fn exhausted(&mut self) -> bool {
        self.pump();
        self.finished && self.pending.is_none() && self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn meta() -> VideoMeta {
        VideoMeta {
            width: 2,
            height: 2,
            fps: 10.0,
            duration_secs: 1.0,
        }
    }

    fn frame(pts: f64) -> DecodedFrame {
        DecodedFrame {
            data: vec![0; 16],
            width: 2,
            height: 2,
            pts,
        }
    }

    /// Provider fed by the returned sender instead of an ffmpeg worker.
    fn channel_provider(events: Vec<DecoderEvent>) -> (FfmpegProvider, Sender<DecoderEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(16);
        for event in events {
            tx.send(event).unwrap();
        }
        let worker = DecodeWorker {
            events: rx,
            shutdown: Arc::new(AtomicBool::new(false)),
            thread: None,
        };
        let provider = FfmpegProvider {
            path: PathBuf::from("unused.mp4"),
            meta: None,
            failure: None,
            worker: Some(worker),
            pending: None,
            finished: false,
        };
        (provider, tx)
    }

    /// Worker whose thread lingers for `linger` after shutdown is signalled.
    fn lingering_worker(linger: Duration) -> DecodeWorker {
        let (_tx, events) = crossbeam_channel::bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let thread = std::thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(2));
            }
            std::thread::sleep(linger);
        });
        DecodeWorker {
            events,
            shutdown,
            thread: Some(thread),
        }
    }

    #[test]
    fn parse_frame_rate_fraction() {
        assert!((parse_frame_rate("30000/1001") - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("25/1") - 25.0).abs() < 1e-9);
    }

    #[test]
    fn parse_frame_rate_fallbacks() {
        assert!((parse_frame_rate("0/0") - 30.0).abs() < 1e-9);
        assert!((parse_frame_rate("garbage") - 30.0).abs() < 1e-9);
        assert!((parse_frame_rate("60") - 60.0).abs() < 1e-9);
    }

    #[test]
    fn parse_probe_output_reads_video_stream() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 640, "height": 360, "r_frame_rate": "24/1"}
            ],
            "format": {"duration": "10.5"}
        }"#;
        let meta = parse_probe_output(json).unwrap();
        assert_eq!(meta.width, 640);
        assert_eq!(meta.height, 360);
        assert!((meta.fps - 24.0).abs() < 1e-9);
        assert!((meta.duration_secs - 10.5).abs() < 1e-9);
    }

    #[test]
    fn parse_probe_output_without_video_fails() {
        let json = br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        assert!(parse_probe_output(json).is_err());
    }

    #[test]
    fn parse_probe_output_rejects_garbage() {
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn parse_probe_output_swaps_size_for_quarter_turns() {
        let json = br#"{
            "streams": [{
                "codec_type": "video", "width": 1920, "height": 1080,
                "r_frame_rate": "30/1",
                "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]
            }],
            "format": {"duration": "3.0"}
        }"#;
        let meta = parse_probe_output(json).unwrap();
        assert_eq!((meta.width, meta.height), (1080, 1920));

        let json = br#"{
            "streams": [{
                "codec_type": "video", "width": 1920, "height": 1080,
                "tags": {"rotate": "270"}
            }]
        }"#;
        let meta = parse_probe_output(json).unwrap();
        assert_eq!((meta.width, meta.height), (1080, 1920));
    }

    #[test]
    fn parse_probe_output_keeps_size_for_half_turn() {
        let json = br#"{
            "streams": [{
                "codec_type": "video", "width": 640, "height": 360,
                "tags": {"rotate": "180"}
            }]
        }"#;
        let meta = parse_probe_output(json).unwrap();
        assert_eq!((meta.width, meta.height), (640, 360));
        assert!((meta.duration_secs - 0.0).abs() < 1e-12);
    }

    #[test]
    fn copy_frame_keeps_newest_due_and_holds_the_next() {
        let (mut p, _tx) = channel_provider(vec![
            DecoderEvent::Ready(meta()),
            DecoderEvent::Frame(frame(0.0)),
            DecoderEvent::Frame(frame(0.1)),
            DecoderEvent::Frame(frame(0.2)),
            DecoderEvent::Frame(frame(0.3)),
        ]);
        assert_eq!(p.status(), ProviderStatus::Ready(meta()));
        assert!(p.has_new_frame(0.25));

        let f = p.copy_frame(0.25).unwrap();
        assert!((f.pts - 0.2).abs() < 1e-9);

        // 0.3 is buffered but not yet due.
        assert!(!p.has_new_frame(0.25));
        assert!(p.copy_frame(0.25).is_none());
        assert!(p.has_new_frame(0.3));
        assert!((p.copy_frame(0.3).unwrap().pts - 0.3).abs() < 1e-9);
    }

    #[test]
    fn frames_arriving_later_are_picked_up() {
        let (mut p, tx) = channel_provider(vec![DecoderEvent::Ready(meta())]);
        assert_eq!(p.status(), ProviderStatus::Ready(meta()));
        assert!(!p.has_new_frame(1.0));

        tx.send(DecoderEvent::Frame(frame(0.0))).unwrap();
        assert!(p.has_new_frame(0.0));
        assert!(p.copy_frame(0.0).is_some());
        assert!(!p.exhausted());
    }

    #[test]
    fn failure_after_ready_is_reported() {
        let (mut p, _tx) = channel_provider(vec![
            DecoderEvent::Ready(meta()),
            DecoderEvent::Failed("ffmpeg decoded zero frames".into()),
        ]);
        assert_eq!(
            p.status(),
            ProviderStatus::Failed("ffmpeg decoded zero frames".into())
        );
        assert!(!p.exhausted());
    }

    #[test]
    fn finished_stream_is_exhausted_once_drained() {
        let (mut p, _tx) = channel_provider(vec![
            DecoderEvent::Ready(meta()),
            DecoderEvent::Frame(frame(0.0)),
            DecoderEvent::Finished,
        ]);
        assert_eq!(p.status(), ProviderStatus::Ready(meta()));
        assert!(!p.exhausted());

        assert!(p.copy_frame(0.0).is_some());
        assert!(p.exhausted());
        assert_eq!(p.status(), ProviderStatus::Ready(meta()));
    }

    #[test]
    fn worker_exit_after_ready_ends_the_stream() {
        let (mut p, tx) = channel_provider(vec![
            DecoderEvent::Ready(meta()),
            DecoderEvent::Frame(frame(0.0)),
        ]);
        drop(tx);
        assert!(p.copy_frame(0.0).is_some());
        assert!(p.exhausted());
        assert_eq!(p.status(), ProviderStatus::Ready(meta()));
    }

    #[test]
    fn worker_exit_before_ready_is_a_failure() {
        let (mut p, tx) = channel_provider(Vec::new());
        drop(tx);
        assert!(matches!(p.status(), ProviderStatus::Failed(_)));
    }

    #[test]
    fn retire_returns_without_joining() {
        let worker = lingering_worker(Duration::from_millis(500));
        let shutdown = worker.shutdown.clone();

        let start = Instant::now();
        worker.retire();
        assert!(start.elapsed() < Duration::from_millis(200));
        assert!(shutdown.load(Ordering::Relaxed));
    }

    #[test]
    fn rewind_does_not_wait_for_the_old_worker() {
        let dir = tempfile::tempdir().unwrap();
        let worker = lingering_worker(Duration::from_millis(500));
        let shutdown = worker.shutdown.clone();
        let (mut p, _tx) = channel_provider(vec![
            DecoderEvent::Ready(meta()),
            DecoderEvent::Frame(frame(0.0)),
        ]);
        p.path = dir.path().join("missing.mp4");
        p.worker = Some(worker);
        p.meta = Some(meta());
        p.finished = true;

        let start = Instant::now();
        p.rewind();
        assert!(start.elapsed() < Duration::from_millis(200));
        assert!(shutdown.load(Ordering::Relaxed));
        assert!(!p.finished);
        assert!(p.pending.is_none());
        assert!(p.worker.is_some());
    }

    #[test]
    fn missing_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = FfmpegProvider::open(&dir.path().join("missing.mp4"));
        // Worker either fails to run ffprobe or ffprobe rejects the path.
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        loop {
            match provider.status() {
                ProviderStatus::Failed(_) => break,
                ProviderStatus::Ready(_) => panic!("missing file reported ready"),
                ProviderStatus::Pending => {
                    assert!(std::time::Instant::now() < deadline, "no failure reported");
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
        assert!(!provider.has_new_frame(1.0));
    }
}
