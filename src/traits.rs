//! Collaborator seams
//!
//! Format-agnostic interfaces for the external collaborators the core
//! coordinates: the text source, the glyph-metrics engine, and the page
//! renderer. The core owns wrapping, pagination, caching, and navigation;
//! collaborators own bytes, metrics, and pixels.

use async_trait::async_trait;

use crate::error::{RenderError, SourceError};
use crate::types::{PageDescriptor, PageImage, RowRect, SourceIdentity, Viewport};

/// A readable, normalized text stream
///
/// Sources expose already-normalized text (the core performs no encoding
/// detection) and support sequential reads from an arbitrary byte offset.
pub trait TextSource: Send + Sync {
    /// Identity of this source (display name + content revision)
    fn identity(&self) -> &SourceIdentity;

    /// Total length of the normalized text in bytes
    fn len(&self) -> usize;

    /// Whether the source holds no text at all
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text from `offset` to the end of the source
    ///
    /// Fails if `offset` is past the end or not on a char boundary.
    fn read_from(&self, offset: usize) -> Result<&str, SourceError>;
}

/// Result of measuring a span of text against an available width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMeasure {
    /// Byte length of the longest prefix that fits, on a cluster boundary
    pub fit: usize,
    /// Laid-out width of that prefix
    pub width: f32,
    /// Row height for that prefix; nominal line height for an empty span
    pub height: f32,
}

/// Glyph-metrics engine
///
/// Reports how much of a span fits a given width. The layout engine owns the
/// wrapping decision (word boundaries, height accumulation); the shaper owns
/// only the metrics.
pub trait TextShaper: Send + Sync {
    /// Measure `span` against `max_width`
    ///
    /// `fit` must never split a character cluster, and an empty span must
    /// still report the nominal line height.
    fn measure(&self, span: &str, max_width: f32) -> RowMeasure;
}

/// A page handed to the renderer: its descriptor, rows, and backing text
///
/// Row offsets index into `text` (the full normalized source).
#[derive(Debug, Clone, Copy)]
pub struct PageContent<'a> {
    pub descriptor: PageDescriptor,
    pub rows: &'a [RowRect],
    pub text: &'a str,
}

impl<'a> PageContent<'a> {
    /// The text of one row
    pub fn row_text(&self, row: &RowRect) -> &'a str {
        &self.text[row.range()]
    }
}

/// Page renderer collaborator
///
/// Turns a page's row rectangles into a bitmap. Stateless from the core's
/// perspective; implementations may offload to the blocking pool.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Rasterize a page's rows into a viewport-sized bitmap
    async fn rasterize(
        &self,
        page: PageContent<'_>,
        viewport: Viewport,
    ) -> Result<PageImage, RenderError>;
}
