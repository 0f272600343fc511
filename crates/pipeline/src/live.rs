//! Live capture detection loop.
//!
//! A producer thread pulls frames from a capture source and pushes them into
//! a small bounded queue; a blocking worker dequeues and runs detection.
//! When the queue is full the incoming frame is dropped, so a slow model
//! falls behind on frames instead of building unbounded latency. Stopping is
//! cooperative: the worker checks its cancellation token before every
//! dequeue and returns the aggregate counts seen so far.

use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbImage;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use agrivision_core::detection::ClassCounts;
use agrivision_detector::ObjectDetector;

use crate::error::PipelineError;

/// Frames queued between capture and inference before drops begin.
const DEFAULT_QUEUE_CAPACITY: usize = 4;

#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub confidence_threshold: f32,
    pub queue_capacity: usize,
}

impl LiveConfig {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Aggregate outcome of one live run.
#[derive(Debug, Clone, Default)]
pub struct LiveSummary {
    /// Counts summed over every frame that was actually inferred.
    pub class_counts: ClassCounts,
    pub frames_processed: u64,
    /// Frames discarded because the queue was full when they arrived.
    pub frames_dropped: u64,
}

/// Blocking source of capture frames. Returns `Ok(None)` when the stream
/// ends. Implementations may block in `next_frame`.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, PipelineError>;
}

/// A running live session: producer thread, worker task, and the token that
/// stops them.
pub struct LiveSession {
    cancel: CancellationToken,
    worker: JoinHandle<LiveSummary>,
    dropped: Arc<AtomicU64>,
}

impl LiveSession {
    /// Start capture and inference. Returns immediately; the session runs
    /// until [`LiveSession::stop`] or until the source ends.
    pub fn spawn(
        mut source: Box<dyn FrameSource>,
        detector: Arc<dyn ObjectDetector>,
        config: LiveConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let dropped = Arc::new(AtomicU64::new(0));
        let (tx, mut rx) = mpsc::channel::<RgbImage>(config.queue_capacity.max(1));

        let producer_cancel = cancel.clone();
        let producer_dropped = Arc::clone(&dropped);
        std::thread::spawn(move || loop {
            if producer_cancel.is_cancelled() {
                break;
            }
            match source.next_frame() {
                Ok(Some(frame)) => match tx.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        producer_dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    // Worker gone; nothing left to feed.
                    Err(TrySendError::Closed(_)) => break,
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "capture source failed, ending live session");
                    break;
                }
            }
        });

        let worker_cancel = cancel.clone();
        let threshold = config.confidence_threshold;
        let worker = tokio::task::spawn_blocking(move || {
            let mut summary = LiveSummary::default();
            loop {
                if worker_cancel.is_cancelled() {
                    break;
                }
                let Some(frame) = rx.blocking_recv() else {
                    break;
                };
                match detector.detect(&frame, threshold) {
                    Ok(output) => {
                        let frame_counts: ClassCounts = output.detections.iter().collect();
                        summary.class_counts.merge(&frame_counts);
                        summary.frames_processed += 1;
                    }
                    Err(e) => {
                        // One bad frame does not end the session.
                        warn!(error = %e, "inference failed on live frame");
                    }
                }
            }
            debug!(
                frames = summary.frames_processed,
                total = summary.class_counts.total(),
                "live worker finished"
            );
            summary
        });

        Self {
            cancel,
            worker,
            dropped,
        }
    }

    /// Signal the loop to stop and wait for the aggregate summary.
    pub async fn stop(self) -> Result<LiveSummary, PipelineError> {
        self.cancel.cancel();
        let mut summary = self.worker.await.map_err(|_| PipelineError::TaskFailed)?;
        summary.frames_dropped = self.dropped.load(Ordering::Relaxed);
        info!(
            frames = summary.frames_processed,
            dropped = summary.frames_dropped,
            "live session stopped"
        );
        Ok(summary)
    }

    /// True once the worker has exited (source ended or stop requested).
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

/// Capture source backed by an ffmpeg child process reading a camera device
/// and emitting raw rgb24 frames on stdout.
pub struct FfmpegCaptureSource {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
}

impl FfmpegCaptureSource {
    /// Open `device` (e.g. `/dev/video0`) at the given frame size.
    pub fn open(device: &str, width: u32, height: u32) -> Result<Self, PipelineError> {
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-f", "v4l2"])
            .args(["-video_size", &format!("{width}x{height}")])
            .args(["-i", device])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(PipelineError::ToolNotFound)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::Capture("ffmpeg stdout unavailable".to_string()))?;
        info!(device, width, height, "opened camera capture");
        Ok(Self {
            child,
            stdout,
            width,
            height,
        })
    }
}

impl FrameSource for FfmpegCaptureSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, PipelineError> {
        let frame_len = (self.width * self.height * 3) as usize;
        let mut buf = vec![0u8; frame_len];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {}
            // Stream ended mid-frame or cleanly; either way capture is over.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(PipelineError::Io(e)),
        }
        let frame = RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| PipelineError::Capture("short rgb24 frame".to_string()))?;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegCaptureSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
