//! Resumable forward-only pagination
//!
//! Drives the row layout engine page-by-page. Page start offsets are
//! recorded in an append-only index as pages are discovered, so any page at
//! or behind the frontier resolves without rescanning from the document
//! start. Row boundaries of unvisited text are unknown, so requests beyond
//! the frontier advance it sequentially; there is no random seek.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{NavigationError, ReaderError};
use crate::layout::{RowBatch, RowLayoutEngine};
use crate::traits::{TextShaper, TextSource};
use crate::types::{Margins, PageDescriptor, RowRect, Viewport};

/// A resolved page: identity, rows, and whether it ends the document
#[derive(Debug, Clone)]
pub struct PageRows {
    pub descriptor: PageDescriptor,
    pub rows: Vec<RowRect>,
    pub is_last: bool,
}

/// Forward-scanning paginator over one (source, viewport) pair
///
/// Pagination is a deterministic pure function of (source, offset,
/// viewport); the recorded start offsets are only a scan cache, never a
/// second source of truth.
pub struct Paginator {
    source: Arc<dyn TextSource>,
    shaper: Arc<dyn TextShaper>,
    viewport: Viewport,
    margins: Margins,
    /// Start offsets for pages `1..=frontier`, discovered in order
    page_starts: Vec<usize>,
    /// Where the page after the frontier begins
    next_offset: usize,
    /// Last page number, once discovered
    last_page: Option<u32>,
}

impl Paginator {
    pub fn new(
        source: Arc<dyn TextSource>,
        shaper: Arc<dyn TextShaper>,
        viewport: Viewport,
        margins: Margins,
    ) -> Self {
        Self {
            source,
            shaper,
            viewport,
            margins,
            page_starts: Vec::new(),
            next_offset: 0,
            last_page: None,
        }
    }

    /// Highest page number laid out since the last reset
    pub fn frontier(&self) -> u32 {
        self.page_starts.len() as u32
    }

    /// Last page number, if the end of the document has been reached
    pub fn last_page(&self) -> Option<u32> {
        self.last_page
    }

    /// Recorded start offset of an already-visited page
    pub fn start_offset_of(&self, page: u32) -> Option<usize> {
        (page >= 1)
            .then(|| self.page_starts.get((page - 1) as usize).copied())
            .flatten()
    }

    /// Resolve a page to its rows, advancing the frontier as needed
    pub fn page_at(&mut self, page: u32) -> Result<PageRows, ReaderError> {
        if page == 0 {
            return Err(NavigationError::InvalidPage(page).into());
        }
        if let Some(last) = self.last_page {
            if page > last {
                return Err(NavigationError::EndOfDocument.into());
            }
        }

        let mut scanned: Option<RowBatch> = None;
        while self.frontier() < page {
            if self.last_page.is_some() {
                // the document ended before the requested page
                return Err(NavigationError::EndOfDocument.into());
            }

            let start = self.next_offset;
            let batch = self.engine().layout_rows_from(start)?;
            if batch.rows.is_empty() {
                // exhausted exactly at a page boundary: the frontier page was last
                self.last_page = Some(self.frontier());
                debug!(last_page = self.frontier(), "document end discovered");
                return Err(NavigationError::EndOfDocument.into());
            }

            self.page_starts.push(start);
            self.next_offset = batch.next_offset;
            if batch.reached_end {
                self.last_page = Some(self.frontier());
                debug!(last_page = self.frontier(), "document end discovered");
            }
            trace!(
                page = self.frontier(),
                start,
                rows = batch.rows.len(),
                "page laid out"
            );
            scanned = Some(batch);
        }

        let start = self.page_starts[(page - 1) as usize];
        let batch = match scanned {
            // the scan ended on the requested page; reuse its rows
            Some(batch) => batch,
            None => self.engine().layout_rows_from(start)?,
        };

        Ok(PageRows {
            descriptor: PageDescriptor {
                number: page,
                start_offset: start,
            },
            rows: batch.rows,
            is_last: self.last_page == Some(page),
        })
    }

    fn engine(&self) -> RowLayoutEngine<'_> {
        RowLayoutEngine::new(&*self.source, &*self.shaper, self.viewport, self.margins)
    }
}
