//! Shared fixtures for integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use recto::{
    BlockRenderer, Margins, PageContent, PageImage, PageRenderer, ReaderConfig, RenderError,
    Viewport,
};

use recto::MonospaceShaper;

/// Install a test subscriber once; `RUST_LOG` filters as usual
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Renderer wrapper that counts rasterize invocations
pub struct CountingRenderer {
    inner: BlockRenderer,
    renders: AtomicUsize,
}

impl CountingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: BlockRenderer::default(),
            renders: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for CountingRenderer {
    async fn rasterize(
        &self,
        page: PageContent<'_>,
        viewport: Viewport,
    ) -> Result<PageImage, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.inner.rasterize(page, viewport).await
    }
}

/// Unit-advance shaper: one char is one unit wide, one row is one unit tall
pub fn unit_shaper() -> Arc<MonospaceShaper> {
    Arc::new(MonospaceShaper::new(1.0, 1.0))
}

/// Margin-free config so geometry stays legible in assertions
pub fn bare_config() -> ReaderConfig {
    ReaderConfig {
        margins: Margins::zero(),
        ..ReaderConfig::default()
    }
}

/// A document of `words` four-letter words; at width 9 two words fit a row
pub fn word_doc(words: usize) -> String {
    (0..words)
        .map(|i| {
            let letter = (b'a' + (i % 26) as u8) as char;
            std::iter::repeat(letter).take(4).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
