//! Services module - Pure business logic for the export workflow.
//!
//! This module contains the document-export pipeline. The service is
//! **framework-agnostic** and has no dependencies on the UI layer, making it
//! testable and reusable.
//!
//! # Components
//!
//! - [`ExportService`]: the main service for producing a paginated PDF from a
//!   rasterized page. Handles:
//!   - Upscaling the snapshot by the configured raster scale (sharper output)
//!   - Slicing the raster into page-height strips
//!   - JPEG-encoding each strip and embedding one per PDF page
//!   - Lazy acquisition of the [`PdfEngine`] (first export pays the cost,
//!     later exports reuse it)
//!
//! - [`ExportOutcome`]: result of a successful export (path, page count,
//!   wall time)
//! - [`ExportError`]: the failure taxonomy; every variant is recoverable and
//!   [`ExportError::NotReady`] is the distinguishable "nothing rendered yet"
//!   result
//! - [`Snapshot`]: the workflow input, a plain RGBA8 pixel buffer
//! - [`ExportSettings`]: fixed job configuration (margin, file name, JPEG
//!   quality, raster scale, page format and orientation)
//!
//! # Design Philosophy
//!
//! The services layer is designed to be:
//! - **Pure**: no side effects beyond writing the requested file
//! - **Async**: the CPU-bound pipeline runs on tokio's blocking pool so the
//!   UI event loop never stalls
//! - **Testable**: all inputs are explicit parameters; tests drive it with
//!   synthetic snapshots
//! - **Framework-agnostic**: no Slint, no GUI code, only the conversion logic

pub mod export;

pub use export::{
    ExportError, ExportOutcome, ExportService, ExportSettings, Orientation, PageFormat, PdfEngine,
    Snapshot,
};
