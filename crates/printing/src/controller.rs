use std::fmt::Display;

use exam_request_core::PrintSelection;
use thiserror::Error;
use tracing::{info, warn};

use crate::composer::PrintComposer;
use crate::document::PrintDocument;
use crate::job::{PrintJobControllerState, PrintJobId, PrintJobOptions};
use crate::platform::{PrintSurface, PrintSurfaceProvider};

/// Result produced after executing a print job.
/// Resultado de uma impressão concluída.
#[derive(Debug, Clone)]
pub struct PrintJobResult {
    pub job_id: PrintJobId,
    pub copies: usize,
    pub document_bytes: usize,
    pub state: PrintJobControllerState,
}

/// Errors raised while running the print pipeline. None of them is fatal to the form.
/// Erros da impressão; o formulário continua utilizável.
#[derive(Debug, Error)]
pub enum PrintJobError {
    #[error("print document has no request copies")]
    EmptyDocument,
    #[error("could not open a print surface ({0}); reload the page and try again")]
    SurfaceUnavailable(String),
    #[error("print surface failed to load the document ({0}); reload the page and try again")]
    Load(String),
    #[error("print dialog failed ({0})")]
    Print(String),
}

/// Opens a surface, loads the document, prints it, and closes the surface.
///
/// The surface is closed on every path once it has been opened. No retry is
/// attempted and the surface load is not bounded by a timeout.
pub fn run_print_job<P>(
    document: &PrintDocument,
    options: &PrintJobOptions,
    provider: &P,
) -> Result<PrintJobResult, PrintJobError>
where
    P: PrintSurfaceProvider,
    P::Error: Display,
{
    let job_id = options.job_id;
    if document.blocks.is_empty() {
        warn!(%job_id, state = %PrintJobControllerState::Failed, "refusing to print an empty document");
        return Err(PrintJobError::EmptyDocument);
    }

    let html = document.to_html();
    info!(%job_id, state = %PrintJobControllerState::Opening, copies = document.copy_count());
    let mut surface = provider.open(options).map_err(|err| {
        warn!(%job_id, state = %PrintJobControllerState::Failed, error = %err, "print surface unavailable");
        PrintJobError::SurfaceUnavailable(err.to_string())
    })?;

    info!(%job_id, state = %PrintJobControllerState::Loading, bytes = html.len());
    if let Err(err) = surface.load(&html) {
        warn!(%job_id, state = %PrintJobControllerState::Failed, error = %err, "document load failed");
        let err = PrintJobError::Load(err.to_string());
        surface.close();
        return Err(err);
    }

    info!(%job_id, state = %PrintJobControllerState::Printing);
    if let Err(err) = surface.print() {
        warn!(%job_id, state = %PrintJobControllerState::Failed, error = %err, "print failed");
        let err = PrintJobError::Print(err.to_string());
        surface.close();
        return Err(err);
    }
    surface.close();

    info!(%job_id, state = %PrintJobControllerState::Completed);
    Ok(PrintJobResult {
        job_id,
        copies: document.copy_count(),
        document_bytes: html.len(),
        state: PrintJobControllerState::Completed,
    })
}

/// Composes the selected requests and prints them in one step.
pub fn compose_and_print<P>(
    composer: &PrintComposer,
    selection: &PrintSelection<'_>,
    provider: &P,
) -> Result<PrintJobResult, PrintJobError>
where
    P: PrintSurfaceProvider,
    P::Error: Display,
{
    info!(job_id = %composer.options().job_id, state = %PrintJobControllerState::Composing);
    let document = composer.compose_selection(selection);
    run_print_job(&document, composer.options(), provider)
}
