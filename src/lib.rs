//! Recto is a paginated plain-text reader core.
//!
//! Given a text source and a fixed viewport, recto lazily computes row
//! layout, partitions rows into pages, renders each page into a reusable
//! bitmap, and exposes sequential forward/backward navigation, without
//! materializing the whole document's layout or every page bitmap at once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  NavigationController                    │
//! │   (state machine, per-page in-flight markers, epochs)    │
//! └──────────────────────────────────────────────────────────┘
//!          │                  │                   │
//!          ▼                  ▼                   ▼
//!   ┌────────────┐    ┌──────────────┐    ┌─────────────┐
//!   │ Paginator  │    │ PageRenderer │    │  PageCache  │
//!   │ (frontier, │    │ (collaborator│    │ (LRU window │
//!   │  offsets)  │    │  trait)      │    │  of pages)  │
//!   └────────────┘    └──────────────┘    └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────────┐
//!   │ RowLayoutEngine │──▶ TextShaper (collaborator trait)
//!   └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `controller`: reader-facing navigation API and state machine
//! - `paginate`: resumable forward-only pagination
//! - `layout`: row layout for a single page
//! - `cache`: bounded LRU store of rendered pages
//! - `source`: text source implementations (file, in-memory)
//! - `monospace`: built-in fixed-metrics shaper and block renderer
//! - `traits`: collaborator seams (source, shaper, renderer)

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod layout;
pub mod monospace;
pub mod paginate;
pub mod source;
pub mod traits;
pub mod types;

pub use cache::{CacheConfig, CacheStats, CachedPage, PageCache};
pub use config::ReaderConfig;
pub use controller::{NavigationController, NavigationState, ReaderPhase};
pub use error::{LayoutError, NavigationError, ReaderError, RenderError, Result, SourceError};
pub use layout::{RowBatch, RowLayoutEngine};
pub use monospace::{BlockRenderer, MonospaceShaper};
pub use paginate::{PageRows, Paginator};
pub use source::{FileSource, InMemorySource};
pub use traits::{PageContent, PageRenderer, RowMeasure, TextShaper, TextSource};
pub use types::{Margins, PageDescriptor, PageImage, RowRect, SourceIdentity, Viewport};
