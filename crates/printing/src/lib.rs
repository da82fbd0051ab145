//! Printing pipeline for exam requests: composition, HTML rendering, and print surfaces.

pub mod composer;
pub mod controller;
pub mod document;
pub mod job;
pub mod platform;
pub mod template;

pub use composer::{CopyPlan, PrintComposer};
pub use controller::{compose_and_print, run_print_job, PrintJobError, PrintJobResult};
pub use document::{escape_html, PrintDocument, RequestBlock, DOCUMENT_HEADING};
pub use job::{
    Margin, Orientation, PaperId, PrintJobControllerState, PrintJobId, PrintJobOptions,
    SurfaceGeometry,
};
pub use platform::{
    FilePrintSurface, FileSurfaceError, FileSurfaceProvider, PrintSurface, PrintSurfaceProvider,
    SurfaceTarget,
};
pub use template::{
    CaptionContext, CaptionSegment, CaptionTemplate, CaptionToken, RenderedCaption,
    StyleTemplate, TemplateError,
};
