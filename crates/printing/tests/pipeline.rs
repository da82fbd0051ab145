use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use exam_request_core::{Field, FormSession};
use exam_request_printing::{
    compose_and_print, CaptionTemplate, PrintComposer, PrintJobControllerState, PrintJobError,
    PrintJobOptions, PrintSurface, PrintSurfaceProvider, StyleTemplate, SurfaceGeometry,
};

#[derive(Clone, Default)]
struct RecordingProvider {
    jobs: Arc<Mutex<Vec<RecordedJob>>>,
    fail_load: bool,
}

#[derive(Clone)]
struct RecordedJob {
    title: String,
    surface: SurfaceGeometry,
    html: String,
    printed: bool,
}

struct RecordingSurface {
    job: RecordedJob,
    fail_load: bool,
    sink: Arc<Mutex<Vec<RecordedJob>>>,
}

impl PrintSurfaceProvider for RecordingProvider {
    type Error = String;
    type Surface = RecordingSurface;

    fn open(&self, options: &PrintJobOptions) -> Result<Self::Surface, Self::Error> {
        Ok(RecordingSurface {
            job: RecordedJob {
                title: options.title.clone(),
                surface: options.surface,
                html: String::new(),
                printed: false,
            },
            fail_load: self.fail_load,
            sink: self.jobs.clone(),
        })
    }
}

impl PrintSurface for RecordingSurface {
    type Error = String;

    fn load(&mut self, html: &str) -> Result<(), Self::Error> {
        if self.fail_load {
            return Err("surface never became ready".to_string());
        }
        self.job.html = html.to_string();
        Ok(())
    }

    fn print(&mut self) -> Result<(), Self::Error> {
        self.job.printed = true;
        Ok(())
    }

    fn close(self) {
        self.sink.lock().unwrap().push(self.job);
    }
}

fn filled_session() -> FormSession {
    let mut session = FormSession::new(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    let primary = session.primary_mut();
    primary.edit(Field::PatientName, "Beatriz Lima").unwrap();
    primary.edit(Field::Dob, "05061980").unwrap();
    primary.edit(Field::Sex, "Feminino").unwrap();
    primary.edit(Field::MotherName, "Helena Lima").unwrap();
    primary.edit(Field::RecordNumber, "55821").unwrap();
    primary.edit(Field::OriginSector, "Clínica Médica").unwrap();
    primary.edit(Field::BedNumber, "7").unwrap();
    primary
        .edit(Field::RequestedExams, "Hemograma completo\nPCR")
        .unwrap();
    primary
        .edit(Field::ClinicalIndication, "Febre há 3 dias")
        .unwrap();

    let second = session.second_mut();
    second
        .edit(Field::RequestedExams, "Ultrassonografia abdominal")
        .unwrap();
    second.edit(Field::ClinicalIndication, "Dor em FID").unwrap();
    second.edit(Field::RequestDate, "18102026").unwrap();
    session
}

fn composer() -> PrintComposer {
    PrintComposer::new(PrintJobOptions::default(), StyleTemplate::builtin())
}

#[test]
fn second_request_overrides_duplicate_in_printed_document() {
    let mut session = filled_session();
    assert!(session.set_duplicate(true));
    session.set_second_request_active(true);
    assert!(!session.duplicate_enabled());
    assert!(!session.set_duplicate(true));

    let provider = RecordingProvider::default();
    let result = compose_and_print(&composer(), &session.print_selection(), &provider)
        .expect("print job");
    assert_eq!(result.state, PrintJobControllerState::Completed);
    assert_eq!(result.copies, 2);

    let jobs = provider.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].printed);
    assert_eq!(jobs[0].title, "Imprimir Pedido");

    let html = &jobs[0].html;
    assert_eq!(html.matches("<section class=\"request-copy\"").count(), 2);
    assert_eq!(html.matches("Beatriz Lima").count(), 2);
    assert_eq!(html.matches("55821").count(), 2);
    assert_eq!(html.matches("<li>Hemograma completo</li>").count(), 1);
    assert_eq!(html.matches("<li>Ultrassonografia abdominal</li>").count(), 1);
    assert!(html.contains("Dor em FID"));
    assert!(html.contains("18/10/2026"));
    assert!(html.contains("17/10/2026"));
    assert!(html.contains("05/06/1980"));
}

#[test]
fn duplicate_prints_primary_twice() {
    let mut session = filled_session();
    session.set_duplicate(true);

    let provider = RecordingProvider::default();
    compose_and_print(&composer(), &session.print_selection(), &provider).expect("print job");

    let jobs = provider.jobs.lock().unwrap();
    let html = &jobs[0].html;
    assert_eq!(html.matches("<li>Hemograma completo</li>").count(), 2);
    assert!(!html.contains("Ultrassonografia"));
}

#[test]
fn caption_marks_each_copy() {
    let mut session = filled_session();
    session.set_duplicate(true);
    let caption = CaptionTemplate::parse("&lProntuário &m&rVia &p de &P").unwrap();

    let provider = RecordingProvider::default();
    compose_and_print(
        &composer().with_caption(caption),
        &session.print_selection(),
        &provider,
    )
    .expect("print job");

    let jobs = provider.jobs.lock().unwrap();
    assert!(jobs[0].html.contains("<span>Via 1 de 2</span>"));
    assert!(jobs[0].html.contains("<span>Via 2 de 2</span>"));
    assert!(jobs[0].html.contains("<span>Prontuário 55821</span>"));
}

#[test]
fn surface_is_opened_with_configured_geometry() {
    let session = filled_session();
    let mut options = PrintJobOptions::default();
    options.surface = SurfaceGeometry {
        width: 900,
        height: 640,
    };
    let composer = PrintComposer::new(options, StyleTemplate::builtin());

    let provider = RecordingProvider::default();
    compose_and_print(&composer, &session.print_selection(), &provider).expect("print job");

    let jobs = provider.jobs.lock().unwrap();
    assert_eq!(
        jobs[0].surface,
        SurfaceGeometry {
            width: 900,
            height: 640
        }
    );
}

#[test]
fn load_failure_is_reported_and_surface_closed() {
    let session = filled_session();
    let provider = RecordingProvider {
        fail_load: true,
        ..Default::default()
    };

    let err = compose_and_print(&composer(), &session.print_selection(), &provider).unwrap_err();
    assert!(matches!(err, PrintJobError::Load(_)));
    assert!(err.to_string().contains("reload the page and try again"));

    let jobs = provider.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(!jobs[0].printed);
}
