//! Still-image sequence to video: a producer task composites frames into pooled buffers and an
//! encoder worker appends them, gated by a bounded queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;

use crate::assets::raster::RasterImage;
use crate::compose::draw::FrameCompositor;
use crate::encode::config::EncoderOpts;
use crate::encode::ffmpeg::FfmpegWriter;
use crate::encode::pool::{PixelBuffer, PixelBufferPool, PixelFormat};
use crate::encode::session::EncoderSession;
use crate::encode::writer::{OutputSettings, VideoCodec, VideoWriter};
use crate::foundation::core::{Canvas, Fps, FrameIndex, PresentationTime};
use crate::foundation::error::{RgbdError, RgbdResult};
use crate::library::MediaLibrary;

/// File name used when writing into the cache directory.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "OutputVideo.mp4";

/// Where the finished container is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputDestination {
    /// `OutputVideo.mp4` in the user cache directory (temp dir if there is none).
    CacheDir,
    /// An explicit file path.
    Path(PathBuf),
}

impl OutputDestination {
    /// Resolve to a concrete file path.
    pub fn resolve(&self) -> PathBuf {
        match self {
            OutputDestination::CacheDir => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(DEFAULT_OUTPUT_FILE_NAME),
            OutputDestination::Path(p) => p.clone(),
        }
    }
}

/// What happened when handing the finished file to the media library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Persistence {
    /// No library attached.
    Skipped,
    /// The library accepted the file.
    Saved,
    /// The library rejected the file; the encode itself still succeeded.
    Failed(String),
}

/// Result of a completed encode.
#[derive(Clone, Debug)]
pub struct EncodeOutcome {
    /// Finished container.
    pub path: PathBuf,
    /// Output frame size.
    pub canvas: Canvas,
    /// Frames in the output.
    pub frames_written: u64,
    /// End of the last frame on the output timeline.
    pub duration: PresentationTime,
    /// Media-library hand-off status.
    pub persistence: Persistence,
}

/// Point-in-time progress of an [`EncodeJob`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeProgress {
    /// Input images.
    pub total: u64,
    /// Frames composited and queued for the encoder.
    pub submitted: u64,
    /// Frames the encoder accepted.
    pub appended: u64,
}

#[derive(Debug, Default)]
struct ProgressCounters {
    submitted: AtomicU64,
    appended: AtomicU64,
}

/// Handle to an in-flight encode.
#[derive(Debug)]
pub struct EncodeJob {
    path: PathBuf,
    total: u64,
    cancel: CancellationToken,
    progress: Arc<ProgressCounters>,
    handle: JoinHandle<RgbdResult<EncodeOutcome>>,
}

impl EncodeJob {
    /// File the job writes to.
    pub fn output_path(&self) -> &Path {
        &self.path
    }

    /// Stop producing frames; what was already submitted is still finalized.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this job when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current progress counters.
    pub fn progress(&self) -> EncodeProgress {
        EncodeProgress {
            total: self.total,
            submitted: self.progress.submitted.load(Ordering::Relaxed),
            appended: self.progress.appended.load(Ordering::Relaxed),
        }
    }

    /// Wait for finalization and the media-library hand-off.
    pub async fn wait(self) -> RgbdResult<EncodeOutcome> {
        self.handle
            .await
            .map_err(|e| RgbdError::Other(anyhow::anyhow!("encode task failed: {e}")))?
    }
}

/// Assembles still images into a timed video stream.
#[derive(Clone, Default)]
pub struct FrameSequenceEncoder {
    opts: EncoderOpts,
    library: Option<Arc<dyn MediaLibrary>>,
}

impl std::fmt::Debug for FrameSequenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSequenceEncoder")
            .field("opts", &self.opts)
            .field("library", &self.library.is_some())
            .finish()
    }
}

impl FrameSequenceEncoder {
    /// Encoder with validated `opts`.
    pub fn new(opts: EncoderOpts) -> RgbdResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            library: None,
        })
    }

    /// Hand finished videos to `library`.
    pub fn with_library(mut self, library: Arc<dyn MediaLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    /// Active options.
    pub fn opts(&self) -> &EncoderOpts {
        &self.opts
    }

    /// Encode `images` to an H.264 MP4 through the system `ffmpeg`.
    pub fn encode_mp4(
        &self,
        images: Vec<RasterImage>,
        destination: &OutputDestination,
    ) -> RgbdResult<EncodeJob> {
        self.encode(
            images,
            destination,
            FfmpegWriter::new(self.opts.background_rgba),
        )
    }

    /// Start encoding `images` with `writer`.
    ///
    /// Preflight runs synchronously and fails fast: empty input, a pre-existing output file
    /// that cannot be removed, settings the writer rejects, or a session that cannot start.
    /// Frame production and finalization then run on the current Tokio runtime; the returned
    /// job reports completion.
    #[tracing::instrument(skip_all, fields(images = images.len()))]
    pub fn encode<W: VideoWriter>(
        &self,
        images: Vec<RasterImage>,
        destination: &OutputDestination,
        writer: W,
    ) -> RgbdResult<EncodeJob> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            RgbdError::configuration("encode must be called from within a Tokio runtime")
        })?;

        let Some(first) = images.first() else {
            return Err(RgbdError::validation("encode requires at least one image"));
        };
        let canvas = Canvas {
            width: first.width(),
            height: first.height(),
        };

        let out_path = destination.resolve();
        remove_existing_output(&out_path)?;

        let settings = OutputSettings {
            codec: VideoCodec::H264,
            width: canvas.width,
            height: canvas.height,
            fps: self.opts.fps,
            pixel_format: PixelFormat::Rgba8Premul,
            out_path: out_path.clone(),
        };
        let mut session = EncoderSession::new(writer, settings)?;
        let pool = session.start(self.opts.pool_opts())?;

        let total = images.len() as u64;
        let cancel = CancellationToken::new();
        let progress = Arc::new(ProgressCounters::default());
        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            frames = total,
            path = %out_path.display(),
            "encode started"
        );

        let ctx = RunContext {
            images: images.into(),
            fps: self.opts.fps,
            queue_depth: self.opts.queue_depth,
            compositor: FrameCompositor::new(canvas, self.opts.filter),
            cancel: cancel.clone(),
            progress: Arc::clone(&progress),
            library: self.library.clone(),
            out_path: out_path.clone(),
        };
        let span = tracing::info_span!("encode_job", path = %out_path.display());
        let handle = runtime.spawn(run_encode(ctx, session, pool).instrument(span));

        Ok(EncodeJob {
            path: out_path,
            total,
            cancel,
            progress,
            handle,
        })
    }
}

/// Remove a file left at `path` by an earlier run. Failing to do so stops the encode.
fn remove_existing_output(path: &Path) -> RgbdResult<()> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => {
            std::fs::remove_file(path).map_err(|e| {
                RgbdError::io(
                    format!("failed to remove existing output '{}'", path.display()),
                    e,
                )
            })?;
            tracing::debug!(path = %path.display(), "removed existing output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RgbdError::io(
            format!("failed to inspect output path '{}'", path.display()),
            e,
        )),
    }
}

struct RunContext {
    images: Arc<[RasterImage]>,
    fps: Fps,
    queue_depth: usize,
    compositor: FrameCompositor,
    cancel: CancellationToken,
    progress: Arc<ProgressCounters>,
    library: Option<Arc<dyn MediaLibrary>>,
    out_path: PathBuf,
}

struct QueuedFrame {
    idx: FrameIndex,
    pts: PresentationTime,
    buffer: PixelBuffer,
}

/// Index cursor over the immutable input sequence.
struct FrameCursor {
    images: Arc<[RasterImage]>,
    next: usize,
}

impl FrameCursor {
    fn new(images: Arc<[RasterImage]>) -> Self {
        Self { images, next: 0 }
    }

    fn remaining(&self) -> usize {
        self.images.len() - self.next
    }

    fn next_frame(&mut self) -> Option<(FrameIndex, RasterImage)> {
        let image = self.images.get(self.next)?.clone();
        let idx = FrameIndex(self.next as u64);
        self.next += 1;
        Some((idx, image))
    }
}

async fn run_encode<W: VideoWriter>(
    ctx: RunContext,
    mut session: EncoderSession<W>,
    pool: PixelBufferPool,
) -> RgbdResult<EncodeOutcome> {
    let canvas = ctx.compositor.canvas();
    let (tx, rx) = mpsc::channel::<QueuedFrame>(ctx.queue_depth);

    let worker_progress = Arc::clone(&ctx.progress);
    let worker = tokio::task::spawn_blocking(move || {
        let append_err = drain_queue(&mut session, rx, &worker_progress);
        let finished = session.finish();
        (append_err, finished, session.frames_appended())
    });

    let produced = produce(&ctx, &pool, tx).await;
    drop(pool);

    let (append_err, finished, frames_written) = worker
        .await
        .map_err(|e| RgbdError::Other(anyhow::anyhow!("encoder worker failed: {e}")))?;

    if let Some(err) = append_err.or(produced.err()) {
        match &finished {
            Ok(()) => tracing::warn!(
                error = %err,
                frames_written,
                "encode aborted; already-submitted frames were finalized"
            ),
            Err(fin) => tracing::warn!(
                error = %err,
                finalize_error = %fin,
                frames_written,
                "encode aborted and finalize failed"
            ),
        }
        return Err(err);
    }
    finished?;

    tracing::info!(frames_written, "encode finished");
    let persistence = persist(ctx.library.clone(), ctx.out_path.clone()).await;

    Ok(EncodeOutcome {
        path: ctx.out_path,
        canvas,
        frames_written,
        duration: PresentationTime::for_frame(FrameIndex(frames_written), ctx.fps),
        persistence,
    })
}

/// Producer: wait for queue capacity, draw the next image into a pool buffer, submit.
async fn produce(
    ctx: &RunContext,
    pool: &PixelBufferPool,
    tx: mpsc::Sender<QueuedFrame>,
) -> RgbdResult<()> {
    let mut cursor = FrameCursor::new(Arc::clone(&ctx.images));
    while let Some((idx, image)) = cursor.next_frame() {
        if ctx.cancel.is_cancelled() {
            return Err(RgbdError::cancelled(format!(
                "encode cancelled before frame {} ({} images left)",
                idx.0,
                cursor.remaining() + 1
            )));
        }

        // Queue capacity is the encoder's "ready for more data" signal.
        let permit = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                return Err(RgbdError::cancelled(format!(
                    "encode cancelled before frame {}",
                    idx.0
                )));
            }
            permit = tx.reserve() => match permit {
                Ok(permit) => permit,
                // The worker stopped consuming after an append failure and reports it.
                Err(_) => return Ok(()),
            },
        };

        let mut buffer = pool.acquire().inspect_err(|e| {
            tracing::warn!(frame = idx.0, remaining = cursor.remaining(), error = %e, "no pixel buffer");
        })?;
        let compositor = ctx.compositor;
        let buffer = tokio::task::spawn_blocking(move || {
            compositor.compose(&image, &mut buffer).map(|_| buffer)
        })
        .await
        .map_err(|e| RgbdError::append(idx.0, format!("compositing task failed: {e}")))?
        .map_err(|e| e.into_append(idx.0))?;

        let pts = PresentationTime::for_frame(idx, ctx.fps);
        permit.send(QueuedFrame { idx, pts, buffer });
        ctx.progress.submitted.fetch_add(1, Ordering::Relaxed);
    }
    Ok(())
}

/// Encoder worker: append queued frames in order until the queue closes or an append fails.
fn drain_queue<W: VideoWriter>(
    session: &mut EncoderSession<W>,
    mut rx: mpsc::Receiver<QueuedFrame>,
    progress: &ProgressCounters,
) -> Option<RgbdError> {
    while let Some(frame) = rx.blocking_recv() {
        let idx = frame.idx;
        if let Err(e) = session.append(idx, frame.buffer, frame.pts) {
            // Closing stops the producer; frames still queued are dropped with the receiver.
            rx.close();
            return Some(e);
        }
        progress.appended.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(frame = idx.0, "frame appended");
    }
    None
}

async fn persist(library: Option<Arc<dyn MediaLibrary>>, path: PathBuf) -> Persistence {
    let Some(library) = library else {
        return Persistence::Skipped;
    };
    match tokio::task::spawn_blocking(move || library.save_video(&path)).await {
        Ok(Ok(())) => Persistence::Saved,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "saving video to media library failed");
            Persistence::Failed(e.to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "media library task failed");
            Persistence::Failed(format!("media library task failed: {e}"))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequence.rs"]
mod tests;
