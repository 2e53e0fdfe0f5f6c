//! The screenshot action: a single-flight capture → encode → write → reload
//! state machine with two output signals.
//!
//! An action is created with [`ScreenshotAction::take_screenshot`] and started
//! with [`ScreenshotAction::activate`]. Capturing happens synchronously on the
//! calling thread; encoding and writing run on the worker pool; the result is
//! handled on the main thread once it drains its
//! [`MainThreadQueue`](super::MainThreadQueue).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;

use crate::capture::{
    dependencies::CaptureDependencies,
    file,
    pipeline::WriteTask,
    sources::CaptureStrategy,
    types::{CaptureError, CaptureOptions, CaptureStatus, Texture},
};

type Listener = Arc<dyn Fn(Option<&Texture>, &Path) + Send + Sync>;

/// A multicast signal carrying the texture (if any) and the screenshot path.
#[derive(Default)]
pub struct OutputPin {
    listeners: Mutex<Vec<Listener>>,
}

impl OutputPin {
    pub fn add(&self, listener: impl Fn(Option<&Texture>, &Path) + Send + Sync + 'static) {
        lock(&self.listeners).push(Arc::new(listener));
    }

    fn broadcast(&self, texture: Option<&Texture>, path: &Path) {
        // Listeners may register more listeners or re-activate the action.
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener(texture, path);
        }
    }
}

#[derive(Debug)]
struct ActionState {
    status: CaptureStatus,
    file_path: PathBuf,
    texture: Option<Texture>,
}

impl ActionState {
    fn reset(&mut self) {
        self.status = CaptureStatus::Idle;
        self.file_path = PathBuf::new();
        self.texture = None;
    }
}

struct ActionInner {
    options: CaptureOptions,
    base_filename: String,
    dependencies: CaptureDependencies,
    state: Mutex<ActionState>,
    completed: OutputPin,
    failed: OutputPin,
}

/// Takes a screenshot, saves it and loads it back as a [`Texture`].
///
/// Only one capture runs per action at a time. Every accepted activation ends
/// with exactly one `completed` or `failed` signal, after which the action is
/// idle again and may be re-activated.
pub struct ScreenshotAction {
    inner: Arc<ActionInner>,
}

impl ScreenshotAction {
    /// Create an idle action for `options`.
    pub fn take_screenshot(options: CaptureOptions, dependencies: CaptureDependencies) -> Self {
        let base_filename = file::base_filename(&options.filename);
        Self {
            inner: Arc::new(ActionInner {
                options,
                base_filename,
                dependencies,
                state: Mutex::new(ActionState {
                    status: CaptureStatus::Idle,
                    file_path: PathBuf::new(),
                    texture: None,
                }),
                completed: OutputPin::default(),
                failed: OutputPin::default(),
            }),
        }
    }

    /// Registers a listener for successful captures.
    pub fn on_completed(&self, listener: impl Fn(&Texture, &Path) + Send + Sync + 'static) {
        self.inner.completed.add(move |texture, path| {
            if let Some(texture) = texture {
                listener(texture, path);
            }
        });
    }

    /// Registers a listener for failed or rejected activations.
    pub fn on_failed(&self, listener: impl Fn(Option<&Texture>, &Path) + Send + Sync + 'static) {
        self.inner.failed.add(listener);
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.inner.options
    }

    pub fn status(&self) -> CaptureStatus {
        self.inner.state().status
    }

    pub fn is_active(&self) -> bool {
        self.status() != CaptureStatus::Idle
    }

    /// Path of the capture in flight, empty when idle.
    pub fn file_path(&self) -> PathBuf {
        self.inner.state().file_path.clone()
    }

    /// Starts a capture. Must be called on the main thread.
    ///
    /// While a capture is in flight, further activations fire `failed` with
    /// no texture and an empty path and leave the running capture alone.
    pub fn activate(&self) {
        let inner = &self.inner;
        {
            let mut state = inner.state();
            if state.status != CaptureStatus::Idle {
                drop(state);
                log::warn!("{}", CaptureError::AlreadyActive);
                inner.failed.broadcast(None, Path::new(""));
                return;
            }
            state.reset();
            state.status = CaptureStatus::Validating;
        }

        if let Err(err) = file::validate_filename(&inner.options.filename) {
            inner.fail(err);
            return;
        }

        let timestamp = inner
            .options
            .prefix_timestamp
            .then(|| Local::now().naive_local());
        let path = file::screenshot_path(
            &inner.options.directory,
            &inner.base_filename,
            timestamp,
        );
        inner.update(|state| {
            state.file_path = path.clone();
            state.status = CaptureStatus::Capturing;
        });

        let strategy = CaptureStrategy::select(&inner.options);
        log::info!("Taking screenshot {} ({:?})", path.display(), strategy);
        let buffer = match strategy.produce_buffer(&inner.dependencies.render, inner.options.with_hdr)
        {
            Ok(buffer) => buffer,
            Err(err) => {
                inner.fail(err);
                return;
            }
        };

        let path = file::append_extension(&path, buffer.format().extension());
        inner.update(|state| {
            state.file_path = path.clone();
            state.status = CaptureStatus::Encoding;
        });

        let queue = &inner.dependencies.write_queue;
        let write = queue.enqueue(WriteTask { buffer, path });
        let weak = Arc::downgrade(inner);
        queue.then_on_main(
            write,
            inner.dependencies.main_thread.clone(),
            move |written| match weak.upgrade() {
                Some(inner) => inner.on_write_finished(written),
                None => log::debug!("Screenshot action dropped before its write finished"),
            },
        );
    }
}

impl ActionInner {
    fn state(&self) -> MutexGuard<'_, ActionState> {
        lock(&self.state)
    }

    fn update(&self, f: impl FnOnce(&mut ActionState)) {
        f(&mut self.state());
    }

    fn on_write_finished(&self, written: bool) {
        let path = self.state().file_path.clone();
        if !written {
            self.fail(CaptureError::EncodeOrWriteFailed(path));
            return;
        }

        self.update(|state| state.status = CaptureStatus::Reloading);
        if self.state().texture.is_none() {
            let texture = self.dependencies.loader.load(&path);
            self.state().texture = texture;
        }

        let texture = self.state().texture.clone();
        match texture {
            Some(texture) => self.complete(&texture),
            None => self.fail(CaptureError::ReloadFailed(path)),
        }
    }

    fn complete(&self, texture: &Texture) {
        let (_, path) = self.finish(CaptureStatus::Completed);
        log::info!(
            "Screenshot completed: {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        self.completed.broadcast(Some(texture), &path);
    }

    /// Single exit for every failure: log, reset, then notify.
    fn fail(&self, err: CaptureError) {
        let (texture, path) = self.finish(CaptureStatus::Failed);
        log::warn!("Screenshot failed: {} (path: {})", err, path.display());
        self.failed.broadcast(texture.as_ref(), &path);
    }

    fn finish(&self, terminal: CaptureStatus) -> (Option<Texture>, PathBuf) {
        let mut state = self.state();
        state.status = terminal;
        log::debug!("Screenshot action reached {:?}", terminal);
        let texture = state.texture.take();
        let path = std::mem::take(&mut state.file_path);
        state.reset();
        (texture, path)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
