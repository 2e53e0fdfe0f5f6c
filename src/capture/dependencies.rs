use std::{path::Path, sync::Arc};

use crate::capture::{
    context::RenderContext,
    dispatch::MainThreadHandle,
    encode,
    pipeline::WriteQueue,
    types::{CaptureError, PixelBuffer, Texture},
};

/// Abstraction over encoding a pixel buffer to disk. Runs on a worker thread.
pub trait ImageWriter: Send + Sync {
    fn write(&self, buffer: PixelBuffer, path: &Path) -> Result<(), CaptureError>;
}

/// Abstraction over importing a written screenshot as a texture. Runs on the
/// main thread.
pub trait TextureLoader: Send + Sync {
    fn load(&self, path: &Path) -> Option<Texture>;
}

/// Bundle of collaborators used by a screenshot action. Each component can be
/// mocked in tests.
#[derive(Clone)]
pub struct CaptureDependencies {
    pub render: RenderContext,
    pub write_queue: WriteQueue,
    pub main_thread: MainThreadHandle,
    pub loader: Arc<dyn TextureLoader>,
}

impl CaptureDependencies {
    /// Dependencies using the PNG/EXR writer and loader, with encoding
    /// scheduled on `runtime`'s blocking pool.
    pub fn new(
        render: RenderContext,
        runtime: &tokio::runtime::Handle,
        main_thread: MainThreadHandle,
    ) -> Self {
        Self {
            render,
            write_queue: WriteQueue::new(runtime.clone(), Arc::new(DefaultImageWriter)),
            main_thread,
            loader: Arc::new(DefaultTextureLoader),
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn ImageWriter>) -> Self {
        self.write_queue = self.write_queue.with_writer(writer);
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn TextureLoader>) -> Self {
        self.loader = loader;
        self
    }
}

struct DefaultImageWriter;
struct DefaultTextureLoader;

impl ImageWriter for DefaultImageWriter {
    fn write(&self, buffer: PixelBuffer, path: &Path) -> Result<(), CaptureError> {
        encode::write_screenshot(buffer, path)
    }
}

impl TextureLoader for DefaultTextureLoader {
    fn load(&self, path: &Path) -> Option<Texture> {
        encode::load_screenshot(path)
    }
}
