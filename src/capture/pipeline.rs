use std::{fmt, path::PathBuf, sync::Arc};

use crate::capture::{
    dependencies::ImageWriter, dispatch::MainThreadHandle, types::PixelBuffer,
};
use tokio::{runtime::Handle, task::JoinHandle};

/// A buffer and its final destination (extension included).
pub(crate) struct WriteTask {
    pub(crate) buffer: PixelBuffer,
    pub(crate) path: PathBuf,
}

impl fmt::Debug for WriteTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteTask")
            .field("format", &self.buffer.format())
            .field("width", &self.buffer.width())
            .field("height", &self.buffer.height())
            .field("path", &self.path)
            .finish()
    }
}

/// Encodes and writes screenshots on the runtime's blocking pool.
#[derive(Clone)]
pub struct WriteQueue {
    runtime: Handle,
    writer: Arc<dyn ImageWriter>,
}

impl WriteQueue {
    pub fn new(runtime: Handle, writer: Arc<dyn ImageWriter>) -> Self {
        Self { runtime, writer }
    }

    pub(crate) fn with_writer(mut self, writer: Arc<dyn ImageWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Moves `task` to a worker thread. The handle resolves to `true` once the
    /// file is written; failures are logged and resolve to `false`.
    pub(crate) fn enqueue(&self, task: WriteTask) -> JoinHandle<bool> {
        log::debug!("Enqueueing screenshot write: {:?}", task);
        let writer = Arc::clone(&self.writer);
        self.runtime.spawn_blocking(move || {
            let WriteTask { buffer, path } = task;
            match writer.write(buffer, &path) {
                Ok(()) => {
                    log::info!("Screenshot written: {}", path.display());
                    true
                }
                Err(e) => {
                    log::error!("Failed to write screenshot {}: {}", path.display(), e);
                    false
                }
            }
        })
    }

    /// Waits for `write` off the main thread, then posts `continuation` with
    /// its result to `main_thread`.
    pub(crate) fn then_on_main<F>(
        &self,
        write: JoinHandle<bool>,
        main_thread: MainThreadHandle,
        continuation: F,
    ) where
        F: FnOnce(bool) + Send + 'static,
    {
        self.runtime.spawn(async move {
            let written = match write.await {
                Ok(written) => written,
                Err(e) => {
                    log::error!("Screenshot write task failed: {}", e);
                    false
                }
            };
            if !main_thread.post(move || continuation(written)) {
                log::warn!("Main thread queue closed; dropping screenshot continuation");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{dispatch::MainThreadQueue, types::CaptureError};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingWriter {
        fail: bool,
        paths: Mutex<Vec<PathBuf>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&self, _buffer: PixelBuffer, path: &Path) -> Result<(), CaptureError> {
            self.paths.lock().unwrap().push(path.to_path_buf());
            if self.fail {
                Err(CaptureError::ImageError("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    fn run_write(fail: bool) -> (Option<bool>, Arc<RecordingWriter>) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let writer = Arc::new(RecordingWriter {
            fail,
            paths: Mutex::new(Vec::new()),
        });
        let queue = WriteQueue::new(runtime.handle().clone(), writer.clone());
        let main = MainThreadQueue::new();
        let result = Arc::new(Mutex::new(None));

        let task = WriteTask {
            buffer: PixelBuffer::ldr(1, 1, vec![1, 2, 3, 4]).unwrap(),
            path: PathBuf::from("/tmp/never-written.png"),
        };
        let write = queue.enqueue(task);
        let slot = result.clone();
        queue.then_on_main(write, main.handle(), move |ok| {
            *slot.lock().unwrap() = Some(ok);
        });

        main.run_until(Duration::from_secs(5), || result.lock().unwrap().is_some());
        let outcome = *result.lock().unwrap();
        (outcome, writer)
    }

    #[test]
    fn successful_write_resolves_true_on_main_queue() {
        let (outcome, writer) = run_write(false);
        assert_eq!(outcome, Some(true));
        assert_eq!(
            *writer.paths.lock().unwrap(),
            vec![PathBuf::from("/tmp/never-written.png")]
        );
    }

    #[test]
    fn failed_write_resolves_false() {
        let (outcome, _) = run_write(true);
        assert_eq!(outcome, Some(false));
    }
}
