use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintJobId(u64);

impl PrintJobId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PrintJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrintJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "print-job-{}", self.0)
    }
}

/// Orientation of a print page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn css_keyword(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Supported paper identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaperId {
    #[default]
    A4,
    Letter,
}

impl PaperId {
    pub fn css_keyword(&self) -> &'static str {
        match self {
            PaperId::A4 => "A4",
            PaperId::Letter => "letter",
        }
    }
}

/// Margin values expressed in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margin {
    pub const fn uniform(mm: f32) -> Self {
        Self {
            top: mm,
            bottom: mm,
            left: mm,
            right: mm,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// Size of the rendering surface opened for printing, in pixels.
/// Tamanho da janela aberta para impressão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// Options supplied when requesting a print job.
#[derive(Debug, Clone)]
pub struct PrintJobOptions {
    pub job_id: PrintJobId,
    pub title: String,
    pub paper: PaperId,
    pub orientation: Orientation,
    pub margins: Margin,
    pub surface: SurfaceGeometry,
}

impl PrintJobOptions {
    pub fn new(
        title: impl Into<String>,
        paper: PaperId,
        orientation: Orientation,
        margins: Margin,
        surface: SurfaceGeometry,
    ) -> Self {
        Self {
            job_id: PrintJobId::new(),
            title: title.into(),
            paper,
            orientation,
            margins,
            surface,
        }
    }
}

impl Default for PrintJobOptions {
    fn default() -> Self {
        Self::new(
            "Imprimir Pedido",
            PaperId::default(),
            Orientation::default(),
            Margin::default(),
            SurfaceGeometry::default(),
        )
    }
}

/// Controller state for logging/UI markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintJobControllerState {
    Composing,
    Opening,
    Loading,
    Printing,
    Completed,
    Failed,
}

impl fmt::Display for PrintJobControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrintJobControllerState::Composing => "composing",
            PrintJobControllerState::Opening => "opening",
            PrintJobControllerState::Loading => "loading",
            PrintJobControllerState::Printing => "printing",
            PrintJobControllerState::Completed => "completed",
            PrintJobControllerState::Failed => "failed",
        };
        f.write_str(label)
    }
}
