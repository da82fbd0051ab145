use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::job::PrintJobOptions;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// A rendering surface that loads one document and shows the print dialog.
/// Superfície de renderização aberta para uma impressão.
pub trait PrintSurface {
    type Error;

    fn load(&mut self, html: &str) -> Result<(), Self::Error>;
    fn print(&mut self) -> Result<(), Self::Error>;
    fn close(self);
}

/// Abstraction over whatever opens print surfaces (a browser window, a file, ...).
/// Abstração sobre quem abre superfícies de impressão.
pub trait PrintSurfaceProvider {
    type Error;
    type Surface: PrintSurface<Error = Self::Error>;

    /// Opens a surface for one job. Window-backed hosts should size it to
    /// `options.surface` and title it with `options.title`.
    fn open(&self, options: &PrintJobOptions) -> Result<Self::Surface, Self::Error>;
}

/// Where a [`FileSurfaceProvider`] writes the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceTarget {
    File(PathBuf),
    Stdout,
}

/// Errors raised by the file-backed print surface.
#[derive(Debug, Error)]
pub enum FileSurfaceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write print document: {0}")]
    Write(#[source] io::Error),
    #[error("print requested before any document was loaded")]
    NotLoaded,
}

/// Print surface provider that writes the loaded document to a file or stdout.
#[derive(Debug, Clone)]
pub struct FileSurfaceProvider {
    target: SurfaceTarget,
}

impl FileSurfaceProvider {
    pub fn new(target: SurfaceTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &SurfaceTarget {
        &self.target
    }
}

pub struct FilePrintSurface {
    writer: Box<dyn Write>,
    loaded: bool,
}

impl PrintSurfaceProvider for FileSurfaceProvider {
    type Error = FileSurfaceError;
    type Surface = FilePrintSurface;

    /// Files have no window, so the surface geometry is only logged.
    fn open(&self, options: &PrintJobOptions) -> Result<Self::Surface, Self::Error> {
        debug!(
            job_id = %options.job_id,
            width = options.surface.width,
            height = options.surface.height,
            "opening file print surface"
        );
        let writer: Box<dyn Write> = match &self.target {
            SurfaceTarget::Stdout => Box::new(io::stdout()),
            SurfaceTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|source| FileSurfaceError::Open {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                let file = File::create(path).map_err(|source| FileSurfaceError::Open {
                    path: path.clone(),
                    source,
                })?;
                Box::new(BufWriter::new(file))
            }
        };
        Ok(FilePrintSurface {
            writer,
            loaded: false,
        })
    }
}

impl PrintSurface for FilePrintSurface {
    type Error = FileSurfaceError;

    fn load(&mut self, html: &str) -> Result<(), Self::Error> {
        self.writer
            .write_all(html.as_bytes())
            .map_err(FileSurfaceError::Write)?;
        self.loaded = true;
        Ok(())
    }

    fn print(&mut self) -> Result<(), Self::Error> {
        if !self.loaded {
            return Err(FileSurfaceError::NotLoaded);
        }
        self.writer.flush().map_err(FileSurfaceError::Write)
    }

    fn close(mut self) {
        let _ = self.writer.flush();
    }
}

/// Recorded surface activity produced by the mock provider.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordedSurface {
    pub html: Option<String>,
    pub printed: bool,
    pub closed: bool,
}

/// In-memory implementation of [`PrintSurfaceProvider`] used for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockSurfaceProvider {
    surfaces: Arc<Mutex<Vec<RecordedSurface>>>,
    refuse_open: bool,
    fail_print: bool,
}

#[cfg(test)]
impl MockSurfaceProvider {
    pub fn refusing_open() -> Self {
        Self {
            refuse_open: true,
            ..Self::default()
        }
    }

    pub fn failing_print() -> Self {
        Self {
            fail_print: true,
            ..Self::default()
        }
    }

    pub fn drain(&self) -> Vec<RecordedSurface> {
        self.surfaces.lock().expect("lock poisoned").drain(..).collect()
    }
}

#[cfg(test)]
pub struct MockSurface {
    record: RecordedSurface,
    fail_print: bool,
    sink: Arc<Mutex<Vec<RecordedSurface>>>,
}

#[cfg(test)]
impl PrintSurfaceProvider for MockSurfaceProvider {
    type Error = String;
    type Surface = MockSurface;

    fn open(&self, _options: &PrintJobOptions) -> Result<Self::Surface, Self::Error> {
        if self.refuse_open {
            return Err("pop-up blocked".to_string());
        }
        Ok(MockSurface {
            record: RecordedSurface::default(),
            fail_print: self.fail_print,
            sink: self.surfaces.clone(),
        })
    }
}

#[cfg(test)]
impl PrintSurface for MockSurface {
    type Error = String;

    fn load(&mut self, html: &str) -> Result<(), Self::Error> {
        self.record.html = Some(html.to_string());
        Ok(())
    }

    fn print(&mut self) -> Result<(), Self::Error> {
        if self.fail_print {
            return Err("no printer".to_string());
        }
        self.record.printed = true;
        Ok(())
    }

    fn close(mut self) {
        self.record.closed = true;
        self.sink.lock().expect("lock poisoned").push(self.record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_surface_writes_loaded_document() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out").join("pedido.html");
        let provider = FileSurfaceProvider::new(SurfaceTarget::File(path.clone()));

        let mut surface = provider.open(&PrintJobOptions::default()).unwrap();
        surface.load("<html></html>").unwrap();
        surface.print().unwrap();
        surface.close();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn file_surface_refuses_print_before_load() {
        let dir = tempdir().expect("tempdir");
        let provider =
            FileSurfaceProvider::new(SurfaceTarget::File(dir.path().join("empty.html")));
        let mut surface = provider.open(&PrintJobOptions::default()).unwrap();
        assert!(matches!(surface.print(), Err(FileSurfaceError::NotLoaded)));
    }

    #[test]
    fn mock_provider_records_surfaces() {
        let provider = MockSurfaceProvider::default();
        let mut surface = provider.open(&PrintJobOptions::default()).unwrap();
        surface.load("doc").unwrap();
        surface.print().unwrap();
        surface.close();

        let recorded = provider.drain();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].html.as_deref(), Some("doc"));
        assert!(recorded[0].printed && recorded[0].closed);
    }
}
