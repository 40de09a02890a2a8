use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::audio_models::{CaptureDiagnostics, CaptureSession};
use crate::models::clip_result::ClipResult;
use crate::models::config::{validate_connect_args, CaptureConfiguration};
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;
use crate::processing::progress::{self, ProgressReporter};
use crate::processing::ring_buffer::RingBuffer;
use crate::session::cancel::CancellationToken;
use crate::storage::clip_writer::ClipWriter;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::chunk_source::{ChunkSource, ChunkStream};

/// Internal mutable session state, protected by `parking_lot::Mutex`.
struct SessionState {
    state: CaptureState,
    status: String,
    session: Option<CaptureSession>,
    diagnostics: CaptureDiagnostics,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            status: String::new(),
            session: None,
            diagnostics: CaptureDiagnostics::default(),
        }
    }
}

/// Publishes state, status and progress to the shared state and the delegate.
///
/// Cloned into the ingestion and clip-writer threads. Callbacks run after the
/// state lock is released.
#[derive(Clone)]
struct EventSink {
    session_state: Arc<Mutex<SessionState>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl EventSink {
    fn set_state(&self, new_state: CaptureState) {
        self.session_state.lock().state = new_state;
        self.notify_state(new_state);
    }

    /// Change state only while `token` is live. The check happens under the
    /// state lock, which `stop` also holds while cancelling, so a finishing
    /// ingestion thread can never overwrite `Stopped`.
    fn set_state_if_live(&self, token: &CancellationToken, new_state: CaptureState) -> bool {
        {
            let mut s = self.session_state.lock();
            if token.is_cancelled() {
                return false;
            }
            if s.state == new_state {
                return true;
            }
            s.state = new_state;
        }
        self.notify_state(new_state);
        true
    }

    fn status(&self, message: String) {
        log::info!("{}", message);
        self.session_state.lock().status = message.clone();
        if let Some(ref delegate) = self.delegate {
            delegate.on_status(&message);
        }
    }

    fn status_if_live(&self, token: &CancellationToken, message: String) -> bool {
        {
            let mut s = self.session_state.lock();
            if token.is_cancelled() {
                return false;
            }
            s.status = message.clone();
        }
        log::info!("{}", message);
        if let Some(ref delegate) = self.delegate {
            delegate.on_status(&message);
        }
        true
    }

    fn error(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }

    fn progress(&self, fullness: f64) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_progress(fullness);
        }
    }

    fn clip_saved(&self, result: &ClipResult) {
        self.session_state.lock().diagnostics.clips_saved += 1;
        let name = result
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.status(format!("Audio clip saved to {}", name));
        if let Some(ref delegate) = self.delegate {
            delegate.on_clip_saved(result);
        }
    }

    fn update_diagnostics(&self, f: impl FnOnce(&mut CaptureDiagnostics)) {
        f(&mut self.session_state.lock().diagnostics);
    }

    fn notify_state(&self, state: CaptureState) {
        log::debug!("capture state -> {}", state.label());
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&state);
        }
    }
}

/// Instant-replay capture engine.
///
/// Generic over the stream backend via the `ChunkSource` trait. Owns the
/// rolling buffer and the session lifecycle; one session at a time.
///
/// ```text
/// [ChunkSource] → (ingestion thread) → [RingBuffer] → snapshot → (clip-writer thread) → file
///                                            ↓
///                                    [ProgressReporter]
/// ```
///
/// Control methods never wait on network I/O: `connect` spawns the
/// ingestion thread and returns, `stop` cancels it and returns, and
/// `save_clip` hands file I/O to its own thread.
pub struct CaptureEngine<S: ChunkSource> {
    source: Arc<S>,
    config: CaptureConfiguration,
    output_directory: PathBuf,
    file_prefix: String,
    session_state: Arc<Mutex<SessionState>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,

    // Shared between the ingestion thread, snapshots and progress readers
    buffer: Arc<Mutex<RingBuffer>>,

    // Ingestion thread control
    token: Option<CancellationToken>,
    ingestion_handle: Option<thread::JoinHandle<()>>,
}

impl<S: ChunkSource> CaptureEngine<S> {
    pub fn new(source: S, config: CaptureConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::Configuration)?;

        Ok(Self {
            source: Arc::new(source),
            output_directory: config.output_directory.clone(),
            file_prefix: config.file_prefix.clone(),
            buffer: Arc::new(Mutex::new(RingBuffer::new(1, config.sample_rate, config.chunk_size))),
            config,
            session_state: Arc::new(Mutex::new(SessionState::new())),
            delegate: None,
            token: None,
            ingestion_handle: None,
        })
    }

    /// Takes effect from the next `connect` or `save_clip`.
    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> CaptureState {
        self.session_state.lock().state
    }

    /// Latest status line.
    pub fn status(&self) -> String {
        self.session_state.lock().status.clone()
    }

    /// The active session, if connected.
    pub fn session(&self) -> Option<CaptureSession> {
        self.session_state.lock().session.clone()
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.session_state.lock().diagnostics.clone()
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    pub fn fullness(&self) -> f64 {
        let buf = self.buffer.lock();
        progress::fullness(buf.len(), buf.capacity())
    }

    /// A handle for polling fullness from other threads.
    pub fn progress(&self) -> ProgressReporter {
        ProgressReporter::new(Arc::clone(&self.buffer))
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer.lock().capacity()
    }

    pub fn window_minutes(&self) -> u32 {
        self.buffer.lock().window_minutes()
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Start capturing `url` with a window of `window_minutes`.
    /// Transitions: idle/stopped → connecting → listening.
    pub fn connect(&mut self, url: &str, window_minutes: u32) -> Result<(), CaptureError> {
        let events = self.events();

        if let Err(reason) = validate_connect_args(url, window_minutes) {
            let err = CaptureError::Configuration(reason);
            events.status(format!("Cannot connect: {}", err));
            return Err(err);
        }

        if let Some(session) = self.session() {
            let err = CaptureError::State(format!("already connected to {}", session.url));
            events.status(format!("Cannot connect: {}", err));
            return Err(err);
        }

        if let Some(handle) = self.ingestion_handle.take() {
            if !handle.is_finished() {
                self.ingestion_handle = Some(handle);
                let err = CaptureError::State("previous capture is still shutting down".into());
                events.status(format!("Cannot connect: {}", err));
                return Err(err);
            }
            Self::join_ingestion(handle);
        }

        let url = url.trim().to_string();
        let token = CancellationToken::new();

        {
            let mut s = self.session_state.lock();
            s.state = CaptureState::Connecting;
            s.session = Some(CaptureSession::new(
                &url,
                window_minutes,
                self.config.sample_rate,
                self.config.chunk_size,
            ));
            s.diagnostics = CaptureDiagnostics::default();
        }
        events.notify_state(CaptureState::Connecting);
        events.status(format!("Connecting to {}", url));

        {
            let mut buf = self.buffer.lock();
            buf.clear();
            buf.set_window_minutes(window_minutes);
        }
        events.progress(0.0);

        events.set_state(CaptureState::Listening);
        events.status(format!("Listening... (audio from {})", url));

        let ingestion = Ingestion {
            source: Arc::clone(&self.source),
            url: url.clone(),
            timeout: self.config.connect_timeout,
            chunk_size: self.config.chunk_size,
            retry_delay: self.config.retry_delay,
            token: token.clone(),
            buffer: Arc::clone(&self.buffer),
            events: events.clone(),
        };

        let handle = thread::Builder::new()
            .name("stream-ingest".into())
            .spawn(move || ingestion.run());

        match handle {
            Ok(handle) => {
                self.token = Some(token);
                self.ingestion_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                {
                    let mut s = self.session_state.lock();
                    s.state = CaptureState::Stopped;
                    s.session = None;
                }
                events.notify_state(CaptureState::Stopped);
                let err = CaptureError::State(format!("failed to spawn ingestion thread: {}", e));
                events.status(format!("Cannot connect: {}", err));
                Err(err)
            }
        }
    }

    /// Stop capturing and empty the buffer. Transitions: any → stopped.
    ///
    /// Returns without waiting for the ingestion thread, which may still be
    /// blocked in a read; it exits as soon as that read returns and never
    /// touches the buffer again. Use `wait_for_shutdown` to join it.
    /// Calling `stop` again is a no-op apart from re-clearing the buffer.
    pub fn stop(&mut self) {
        let events = self.events();

        let (previous, session) = {
            let mut s = self.session_state.lock();
            if let Some(ref token) = self.token {
                token.cancel();
            }
            let previous = s.state;
            s.state = CaptureState::Stopped;
            (previous, s.session.take())
        };
        self.token = None;

        self.buffer.lock().clear();

        if previous != CaptureState::Stopped {
            events.notify_state(CaptureState::Stopped);
            events.progress(0.0);
        }
        if let Some(session) = session {
            events.status(format!("Disconnected from {}", session.url));
        }
    }

    /// Block until the ingestion thread of a stopped session has exited.
    ///
    /// This can take up to one read timeout if the thread is blocked on the
    /// network.
    pub fn wait_for_shutdown(&mut self) -> Result<(), CaptureError> {
        if self.state().is_active() {
            return Err(CaptureError::State("capture is still running; stop it first".into()));
        }
        if let Some(handle) = self.ingestion_handle.take() {
            Self::join_ingestion(handle);
        }
        Ok(())
    }

    /// Change the window length live. The next push enforces the new capacity.
    pub fn reconfigure_window(&mut self, window_minutes: u32) -> Result<(), CaptureError> {
        if window_minutes == 0 {
            return Err(CaptureError::Configuration(
                "buffer size must be a positive number of minutes".into(),
            ));
        }

        let fullness = {
            let mut buf = self.buffer.lock();
            buf.set_window_minutes(window_minutes);
            log::info!(
                "buffer window set to {} min ({} chunks)",
                window_minutes,
                buf.capacity()
            );
            progress::fullness(buf.len(), buf.capacity())
        };
        self.events().progress(fullness);
        Ok(())
    }

    /// Change where the next clips are written.
    pub fn set_clip_destination(&mut self, output_directory: PathBuf, file_prefix: String) {
        self.output_directory = output_directory;
        self.file_prefix = file_prefix;
    }

    /// Snapshot the buffer now and write it to a clip on a background thread.
    ///
    /// The snapshot holds exactly the chunks pushed before this call. The
    /// returned handle yields the write result, which is also published to
    /// the delegate. A failed write never affects ingestion.
    pub fn save_clip(&self) -> Result<thread::JoinHandle<Result<ClipResult, CaptureError>>, CaptureError> {
        let events = self.events();

        let (state, url) = {
            let s = self.session_state.lock();
            (s.state, s.session.as_ref().map(|session| session.url.clone()))
        };
        let url = match url {
            Some(url) if state.can_save() => url,
            _ => {
                let err = CaptureError::State(format!("cannot save a clip while {}; connect first", state.label()));
                events.status(format!("Cannot save clip: {}", err));
                return Err(err);
            }
        };

        let contents = self.buffer.lock().snapshot_contents();
        let writer = ClipWriter::new(&self.config).with_source_url(&url);
        let output_directory = self.output_directory.clone();
        let file_prefix = self.file_prefix.clone();

        thread::Builder::new()
            .name("clip-writer".into())
            .spawn(move || match writer.save(&contents, &output_directory, &file_prefix) {
                Ok(result) => {
                    events.clip_saved(&result);
                    Ok(result)
                }
                Err(e) => {
                    log::error!("Failed to save clip: {}", e);
                    events.status(format!("Failed to save clip to {}: {}", output_directory.display(), e));
                    events.error(&e);
                    Err(e)
                }
            })
            .map_err(|e| CaptureError::Storage(format!("failed to spawn clip writer: {}", e)))
    }

    // --- Internal helpers ---

    fn events(&self) -> EventSink {
        EventSink {
            session_state: Arc::clone(&self.session_state),
            delegate: self.delegate.clone(),
        }
    }

    fn join_ingestion(handle: thread::JoinHandle<()>) {
        if handle.join().is_err() {
            log::error!("ingestion thread panicked");
        }
    }
}

impl<S: ChunkSource> Drop for CaptureEngine<S> {
    fn drop(&mut self) {
        if let Some(ref token) = self.token {
            token.cancel();
        }
    }
}

/// Why one open → read cycle ended.
enum PumpExit {
    Cancelled,
    EndOfStream,
    Failed(CaptureError),
}

/// Everything the ingestion thread needs, moved into it at connect time.
struct Ingestion<S: ChunkSource> {
    source: Arc<S>,
    url: String,
    timeout: Duration,
    chunk_size: usize,
    retry_delay: Duration,
    token: CancellationToken,
    buffer: Arc<Mutex<RingBuffer>>,
    events: EventSink,
}

impl<S: ChunkSource> Ingestion<S> {
    /// Open, read until the stream fails or ends, wait, reopen; until cancelled.
    fn run(self) {
        let mut failures = 0u32;

        while !self.token.is_cancelled() {
            self.events.update_diagnostics(|d| d.connect_attempts += 1);

            let (message, error) = match self.pump(&mut failures) {
                PumpExit::Cancelled => break,
                PumpExit::EndOfStream => {
                    failures += 1;
                    let message = format!("Stream from {} ended (attempt {}); reconnecting", self.url, failures);
                    (message, None)
                }
                PumpExit::Failed(e) => {
                    failures += 1;
                    self.events.update_diagnostics(|d| d.capture_errors += 1);
                    let message = format!("Error capturing audio (attempt {}): {}", failures, e);
                    (message, Some(e))
                }
            };

            log::warn!("{}; retrying in {:?}", message, self.retry_delay);
            if self.status_if_live(message) {
                if let Some(ref e) = error {
                    self.events.error(e);
                }
            }
            if !self.events.set_state_if_live(&self.token, CaptureState::Retrying { attempt: failures }) {
                break;
            }
            if self.token.wait_timeout(self.retry_delay) {
                break;
            }
        }

        log::info!("ingestion from {} stopped", self.url);
    }

    fn pump(&self, failures: &mut u32) -> PumpExit {
        let mut stream = match self.source.open(&self.url, self.timeout, self.chunk_size) {
            Ok(stream) => stream,
            Err(e) => return PumpExit::Failed(e),
        };

        loop {
            let chunk = match stream.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => return PumpExit::EndOfStream,
                Err(e) => return PumpExit::Failed(e),
            };
            let len = chunk.len() as u64;

            let fullness = {
                let mut buf = self.buffer.lock();
                // Checked under the buffer lock so nothing lands after stop's clear.
                if self.token.is_cancelled() {
                    return PumpExit::Cancelled;
                }
                buf.push(chunk);
                progress::fullness(buf.len(), buf.capacity())
            };

            self.events.update_diagnostics(|d| {
                d.chunks_received += 1;
                d.bytes_received += len;
            });

            if *failures > 0 {
                *failures = 0;
                self.events.set_state_if_live(&self.token, CaptureState::Listening);
                self.status_if_live(format!("Listening... (reconnected to {})", self.url));
            }

            if !self.token.is_cancelled() {
                self.events.progress(fullness);
            }
        }
    }

    fn status_if_live(&self, message: String) -> bool {
        self.events.status_if_live(&self.token, message)
    }
}
