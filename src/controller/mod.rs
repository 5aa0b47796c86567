//! Reader-facing navigation
//!
//! `NavigationController` owns the current page number and coordinates the
//! Paginator, the renderer collaborator, and the page cache to satisfy
//! "give me page N" requests.
//!
//! # Concurrency
//!
//! Navigation calls are issued sequentially by one caller, but repeated or
//! concurrent requests for the same uncomputed page coalesce onto a single
//! in-flight render through a per-page `OnceCell` marker; unrelated pages
//! stay independent, and the cache is never locked around a render. Every
//! reset bumps an epoch; a render compares its dispatch epoch against the
//! current one before inserting into the cache, so work superseded by a
//! reset is silently discarded rather than cached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info};

use crate::cache::{CachedPage, PageCache};
use crate::config::ReaderConfig;
use crate::error::{NavigationError, ReaderError, Result, SourceError};
use crate::paginate::Paginator;
use crate::source::FileSource;
use crate::traits::{PageContent, PageRenderer, TextShaper, TextSource};
use crate::types::{SourceIdentity, Viewport};

/// Controller lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReaderPhase {
    /// No source loaded, or the last reset failed
    Uninitialized,
    /// Page 1 produced; navigation available
    Ready,
}

/// Snapshot of the navigation state machine
///
/// The cache is a side effect; this snapshot is the single source of truth
/// for "what page am I on". Serializable so a host can persist a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationState {
    pub phase: ReaderPhase,
    /// Current 1-based page number; 0 while uninitialized
    pub current_page: u32,
    pub viewport: Option<Viewport>,
    pub source: Option<SourceIdentity>,
    /// Highest page number paginated since the last reset
    pub frontier: u32,
    /// Last page number, once the end of the document is known
    pub last_page: Option<u32>,
}

impl NavigationState {
    fn uninitialized(viewport: Option<Viewport>) -> Self {
        Self {
            phase: ReaderPhase::Uninitialized,
            current_page: 0,
            viewport,
            source: None,
            frontier: 0,
            last_page: None,
        }
    }
}

/// One loaded (source, viewport) pair and its pagination state
struct Session {
    epoch: u64,
    viewport: Viewport,
    source: Arc<dyn TextSource>,
    paginator: Mutex<Paginator>,
}

type ReadyListener = Box<dyn Fn() + Send + Sync>;

/// The reader core's host-facing controller
pub struct NavigationController {
    shaper: Arc<dyn TextShaper>,
    renderer: Arc<dyn PageRenderer>,
    config: ReaderConfig,
    cache: PageCache,
    epoch: AtomicU64,
    session: RwLock<Option<Arc<Session>>>,
    inflight: parking_lot::Mutex<HashMap<u32, Arc<OnceCell<Arc<CachedPage>>>>>,
    nav: parking_lot::RwLock<NavigationState>,
    first_page_listener: parking_lot::Mutex<Option<ReadyListener>>,
}

impl NavigationController {
    pub fn new(
        shaper: Arc<dyn TextShaper>,
        renderer: Arc<dyn PageRenderer>,
        config: ReaderConfig,
    ) -> Self {
        let cache = PageCache::new(config.cache.clone());
        Self {
            shaper,
            renderer,
            config,
            cache,
            epoch: AtomicU64::new(0),
            session: RwLock::new(None),
            inflight: parking_lot::Mutex::new(HashMap::new()),
            nav: parking_lot::RwLock::new(NavigationState::uninitialized(None)),
            first_page_listener: parking_lot::Mutex::new(None),
        }
    }

    /// Register the one-shot "first page ready" observer
    ///
    /// Fired exactly once per successful reset; holds no reference back to
    /// the host beyond the closure itself.
    pub fn on_first_page_ready(&self, listener: impl Fn() + Send + Sync + 'static) {
        *self.first_page_listener.lock() = Some(Box::new(listener));
    }

    /// Load a file and eagerly produce page 1
    pub async fn reset_source<P: AsRef<Path>>(&self, path: P, viewport: Viewport) -> Result<()> {
        let source = FileSource::open(path)?;
        self.reset_with(Arc::new(source), viewport).await
    }

    /// Load any text source and eagerly produce page 1
    pub async fn reset_text(&self, source: Arc<dyn TextSource>, viewport: Viewport) -> Result<()> {
        self.reset_with(source, viewport).await
    }

    async fn reset_with(&self, source: Arc<dyn TextSource>, viewport: Viewport) -> Result<()> {
        // supersede any in-flight work for the prior source
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inflight.lock().clear();
        self.cache.invalidate_all().await;
        *self.nav.write() = NavigationState::uninitialized(Some(viewport));
        *self.session.write().await = None;

        let identity = source.identity().clone();
        if source.is_empty() {
            return Err(SourceError::Empty(identity.name).into());
        }

        let paginator = Paginator::new(
            source.clone(),
            self.shaper.clone(),
            viewport,
            self.config.margins,
        );
        let session = Arc::new(Session {
            epoch,
            viewport,
            source,
            paginator: Mutex::new(paginator),
        });
        *self.session.write().await = Some(session);

        match self.ensure_page(1).await {
            Ok(_) => {
                {
                    let mut nav = self.nav.write();
                    nav.phase = ReaderPhase::Ready;
                    nav.current_page = 1;
                    nav.source = Some(identity.clone());
                }
                info!(source = %identity.name, "first page ready");
                if let Some(listener) = self.first_page_listener.lock().as_ref() {
                    listener();
                }
                Ok(())
            }
            Err(err) => {
                *self.session.write().await = None;
                // a source that lays out to zero rows has no pages
                if err.is_end_of_document() {
                    return Err(SourceError::Empty(identity.name).into());
                }
                Err(err)
            }
        }
    }

    /// Bitmap and rows of the current page, computing them if absent
    pub async fn current_page_image(&self) -> Result<Arc<CachedPage>> {
        let current = self.ready_current()?;
        self.ensure_page(current).await
    }

    /// Advance one page and return the new current page
    ///
    /// Fails with `EndOfDocument` at the last page; the current page is
    /// then unchanged.
    pub async fn to_next_page_once(&self) -> Result<Arc<CachedPage>> {
        let current = self.ready_current()?;
        let page = self.ensure_page(current + 1).await?;
        self.nav.write().current_page = current + 1;
        Ok(page)
    }

    /// Retreat one page and return the new current page
    ///
    /// Fails with `AtStart` on page 1; the current page is then unchanged.
    pub async fn to_previous_page_once(&self) -> Result<Arc<CachedPage>> {
        let current = self.ready_current()?;
        if current <= 1 {
            return Err(NavigationError::AtStart.into());
        }
        let page = self.ensure_page(current - 1).await?;
        self.nav.write().current_page = current - 1;
        Ok(page)
    }

    /// Jump to an arbitrary page, paginating forward as needed
    ///
    /// Cold-start bookmark replay: boundaries of unvisited text are only
    /// discovered sequentially, so seeking far ahead costs a forward scan.
    pub async fn seek_to_page(&self, page: u32) -> Result<Arc<CachedPage>> {
        self.ready_current()?;
        let view = self.ensure_page(page).await?;
        self.nav.write().current_page = page;
        Ok(view)
    }

    /// Current 1-based page number, once ready
    pub fn current_page(&self) -> Option<u32> {
        let nav = self.nav.read();
        (nav.phase == ReaderPhase::Ready).then_some(nav.current_page)
    }

    /// Total page count, known only after the last page was discovered
    pub fn page_count(&self) -> Option<u32> {
        self.nav.read().last_page
    }

    /// Snapshot of the navigation state
    pub fn state(&self) -> NavigationState {
        self.nav.read().clone()
    }

    /// The page cache (side-effect store, never navigation truth)
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    fn ready_current(&self) -> Result<u32> {
        let nav = self.nav.read();
        if nav.phase != ReaderPhase::Ready {
            return Err(NavigationError::NotReady.into());
        }
        Ok(nav.current_page)
    }

    /// Resolve a page view, rendering at most once per page number
    async fn ensure_page(&self, page: u32) -> Result<Arc<CachedPage>> {
        if page == 0 {
            return Err(NavigationError::InvalidPage(page).into());
        }
        if let Some(hit) = self.cache.get(page).await {
            return Ok(hit);
        }

        let cell = self
            .inflight
            .lock()
            .entry(page)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        let result = cell
            .get_or_try_init(|| self.produce_page(page))
            .await
            .cloned();
        self.inflight.lock().remove(&page);
        result
    }

    /// Paginate, rasterize, and cache one page
    async fn produce_page(&self, page: u32) -> Result<Arc<CachedPage>> {
        // a marker created just after a finished render lands here
        if let Some(hit) = self.cache.get(page).await {
            return Ok(hit);
        }

        let session = self
            .session
            .read()
            .await
            .clone()
            .ok_or(NavigationError::NotReady)?;
        let dispatch_epoch = session.epoch;

        let page_rows = {
            let mut paginator = session.paginator.lock().await;
            let result = paginator.page_at(page);
            // keep the public snapshot in step with the scan
            let mut nav = self.nav.write();
            nav.frontier = paginator.frontier();
            nav.last_page = paginator.last_page();
            drop(nav);
            result?
        };

        let text = session.source.read_from(0).map_err(ReaderError::from)?;
        let content = PageContent {
            descriptor: page_rows.descriptor,
            rows: &page_rows.rows,
            text,
        };
        let image = self.renderer.rasterize(content, session.viewport).await?;

        let cached = Arc::new(CachedPage {
            descriptor: page_rows.descriptor,
            image,
            rows: page_rows.rows,
        });

        if self.epoch.load(Ordering::SeqCst) == dispatch_epoch {
            self.cache.put(cached.clone()).await;
        } else {
            // the source or viewport changed while this render was in flight
            debug!(page, "discarding render superseded by a reset");
        }
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::monospace::{BlockRenderer, MonospaceShaper};
    use crate::source::InMemorySource;
    use crate::types::{Margins, PageImage};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Renderer wrapper that counts rasterize invocations
    struct CountingRenderer {
        inner: BlockRenderer,
        renders: AtomicUsize,
    }

    impl CountingRenderer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: BlockRenderer::default(),
                renders: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.renders.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageRenderer for CountingRenderer {
        async fn rasterize(
            &self,
            page: PageContent<'_>,
            viewport: Viewport,
        ) -> std::result::Result<PageImage, RenderError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            self.inner.rasterize(page, viewport).await
        }
    }

    fn test_config() -> ReaderConfig {
        ReaderConfig {
            margins: Margins::zero(),
            ..ReaderConfig::default()
        }
    }

    fn controller(renderer: Arc<dyn PageRenderer>) -> NavigationController {
        NavigationController::new(
            Arc::new(MonospaceShaper::new(1.0, 1.0)),
            renderer,
            test_config(),
        )
    }

    fn source(text: &str) -> Arc<dyn TextSource> {
        Arc::new(InMemorySource::new("test", text))
    }

    // two words per row at width 9, two rows per page
    const DOC: &str = "aaaa bbbb cccc dddd eeee ffff gggg hhhh iiii jjjj";
    const VIEW: Viewport = Viewport {
        width: 9.0,
        height: 2.0,
    };

    #[tokio::test]
    async fn not_ready_before_reset() {
        let ctl = controller(CountingRenderer::new());
        let err = ctl.current_page_image().await.unwrap_err();
        assert!(matches!(
            err,
            ReaderError::Navigation(NavigationError::NotReady)
        ));
        assert_eq!(ctl.current_page(), None);
    }

    #[tokio::test]
    async fn reset_produces_page_one_and_fires_listener_once() {
        let renderer = CountingRenderer::new();
        let ctl = controller(renderer.clone());
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in = fired.clone();
        ctl.on_first_page_ready(move || {
            fired_in.fetch_add(1, Ordering::SeqCst);
        });

        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        assert_eq!(ctl.current_page(), Some(1));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.count(), 1);

        // repeated reads come from the cache
        ctl.current_page_image().await.unwrap();
        assert_eq!(renderer.count(), 1);

        // each reset fires once more
        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_source_fails_without_notification() {
        let ctl = controller(CountingRenderer::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in = fired.clone();
        ctl.on_first_page_ready(move || {
            fired_in.fetch_add(1, Ordering::SeqCst);
        });

        let err = ctl.reset_text(source(""), VIEW).await.unwrap_err();
        assert!(matches!(err, ReaderError::Source(SourceError::Empty(_))));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(ctl.state().phase, ReaderPhase::Uninitialized);
        assert_eq!(ctl.current_page(), None);
    }

    #[tokio::test]
    async fn next_and_previous_navigate_by_one() {
        let ctl = controller(CountingRenderer::new());
        ctl.reset_text(source(DOC), VIEW).await.unwrap();

        let page2 = ctl.to_next_page_once().await.unwrap();
        assert_eq!(page2.number(), 2);
        assert_eq!(ctl.current_page(), Some(2));

        let page1 = ctl.to_previous_page_once().await.unwrap();
        assert_eq!(page1.number(), 1);
        assert_eq!(ctl.current_page(), Some(1));
    }

    #[tokio::test]
    async fn at_start_and_end_leave_current_page_unchanged() {
        let ctl = controller(CountingRenderer::new());
        ctl.reset_text(source(DOC), VIEW).await.unwrap();

        assert!(ctl.to_previous_page_once().await.unwrap_err().is_at_start());
        assert_eq!(ctl.current_page(), Some(1));

        ctl.seek_to_page(3).await.unwrap();
        assert!(ctl
            .to_next_page_once()
            .await
            .unwrap_err()
            .is_end_of_document());
        assert_eq!(ctl.current_page(), Some(3));
        assert_eq!(ctl.page_count(), Some(3));
    }

    #[tokio::test]
    async fn exact_fit_single_page_document() {
        let ctl = controller(CountingRenderer::new());
        ctl.reset_text(source("AAAA BBBB CCCC DDDD"), VIEW)
            .await
            .unwrap();

        let page = ctl.current_page_image().await.unwrap();
        let texts: Vec<&str> = page
            .rows
            .iter()
            .map(|r| &"AAAA BBBB CCCC DDDD"[r.range()])
            .collect();
        assert_eq!(texts, vec!["AAAA BBBB", "CCCC DDDD"]);
        assert_eq!(ctl.page_count(), Some(1));
        assert!(ctl
            .to_next_page_once()
            .await
            .unwrap_err()
            .is_end_of_document());
    }

    #[tokio::test]
    async fn concurrent_requests_render_once() {
        let renderer = CountingRenderer::new();
        let ctl = Arc::new(controller(renderer.clone()));
        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        assert_eq!(renderer.count(), 1);

        // page 2 is uncached; two concurrent requests must coalesce
        let a = ctl.ensure_page(2);
        let b = ctl.ensure_page(2);
        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra.unwrap().number(), 2);
        assert_eq!(rb.unwrap().number(), 2);
        assert_eq!(renderer.count(), 2);
    }

    #[tokio::test]
    async fn reset_invalidates_cache_and_bumps_epoch() {
        let renderer = CountingRenderer::new();
        let ctl = controller(renderer.clone());
        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        ctl.to_next_page_once().await.unwrap();
        assert_eq!(ctl.cache().len().await, 2);

        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        // only the eagerly rendered page 1 is resident again
        assert_eq!(ctl.cache().len().await, 1);
        assert!(ctl.cache().get(2).await.is_none());
        assert_eq!(ctl.current_page(), Some(1));
    }

    #[tokio::test]
    async fn state_snapshot_tracks_frontier_and_identity() {
        let ctl = controller(CountingRenderer::new());
        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        ctl.seek_to_page(2).await.unwrap();

        let state = ctl.state();
        assert_eq!(state.phase, ReaderPhase::Ready);
        assert_eq!(state.current_page, 2);
        assert_eq!(state.frontier, 2);
        assert_eq!(state.last_page, None);
        assert_eq!(state.viewport, Some(VIEW));
        assert_eq!(state.source.as_ref().unwrap().name, "test");
    }

    #[tokio::test]
    async fn seek_to_page_zero_is_invalid() {
        let ctl = controller(CountingRenderer::new());
        ctl.reset_text(source(DOC), VIEW).await.unwrap();
        let err = ctl.seek_to_page(0).await.unwrap_err();
        assert!(matches!(
            err,
            ReaderError::Navigation(NavigationError::InvalidPage(0))
        ));
        assert_eq!(ctl.current_page(), Some(1));
    }
}
