//! Reader error types
//!
//! Unified error handling for sources, layout, rendering, and navigation.

use thiserror::Error;

/// Errors opening or reading a text source; fatal to a reset attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source path unreadable
    #[error("Source not found: {0}")]
    NotFound(String),

    /// Source yields zero rows (no pages)
    #[error("Source has no content: {0}")]
    Empty(String),

    /// Other IO failure while reading the source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors during row layout
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Offset outside the source's valid range (or not on a char boundary)
    #[error("Unreadable source at offset {0}")]
    UnreadableSource(usize),
}

/// Non-fatal navigation errors; never corrupt navigation state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// Page numbers are 1-based; zero is never a page
    #[error("Invalid page number: {0}")]
    InvalidPage(u32),

    /// Already at the last page
    #[error("End of document")]
    EndOfDocument,

    /// Already at the first page
    #[error("Already at the first page")]
    AtStart,

    /// Navigation requested before a source was loaded
    #[error("Reader is not initialized")]
    NotReady,
}

/// Errors from a page renderer collaborator
#[derive(Debug, Error)]
pub enum RenderError {
    /// Rasterization failed
    #[error("Render error: {0}")]
    Failed(String),
}

/// Unified reader error type
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl ReaderError {
    /// True for the recoverable "no further page" case
    pub fn is_end_of_document(&self) -> bool {
        matches!(
            self,
            ReaderError::Navigation(NavigationError::EndOfDocument)
        )
    }

    /// True for the recoverable "already at page 1" case
    pub fn is_at_start(&self) -> bool {
        matches!(self, ReaderError::Navigation(NavigationError::AtStart))
    }
}

/// Result type alias for reader operations
pub type Result<T> = std::result::Result<T, ReaderError>;
