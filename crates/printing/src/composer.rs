use exam_request_core::{PrintSelection, RequestDetails, RequestRecord};
use tracing::debug;

use crate::document::{PrintDocument, RequestBlock};
use crate::job::PrintJobOptions;
use crate::template::{CaptionContext, CaptionTemplate, RenderedCaption, StyleTemplate};

/// Quais vias serão impressas. / Which copies end up in the printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPlan {
    Single,
    /// The primary request printed twice, identically.
    Duplicate,
    /// The primary request plus a distinct second request for the same patient.
    SecondRequest,
}

impl CopyPlan {
    /// The second request wins over the duplicate toggle.
    pub fn from_toggles(second_active: bool, duplicate: bool) -> Self {
        if second_active {
            CopyPlan::SecondRequest
        } else if duplicate {
            CopyPlan::Duplicate
        } else {
            CopyPlan::Single
        }
    }

    pub fn copy_count(&self) -> u32 {
        match self {
            CopyPlan::Single => 1,
            CopyPlan::Duplicate | CopyPlan::SecondRequest => 2,
        }
    }
}

/// Monta o documento imprimível. / Assembles the printable document from one or two requests.
#[derive(Debug, Clone)]
pub struct PrintComposer {
    options: PrintJobOptions,
    styles: StyleTemplate,
    caption: CaptionTemplate,
}

impl PrintComposer {
    pub fn new(options: PrintJobOptions, styles: StyleTemplate) -> Self {
        Self {
            options,
            styles,
            caption: CaptionTemplate::default(),
        }
    }

    pub fn with_caption(mut self, caption: CaptionTemplate) -> Self {
        self.caption = caption;
        self
    }

    pub fn options(&self) -> &PrintJobOptions {
        &self.options
    }

    pub fn compose(
        &self,
        primary: &RequestRecord,
        second_active: bool,
        second_details: &RequestDetails,
        duplicate: bool,
    ) -> PrintDocument {
        let plan = CopyPlan::from_toggles(second_active, duplicate);
        let mut records = vec![primary.clone()];
        match plan {
            CopyPlan::Single => {}
            CopyPlan::Duplicate => records.push(primary.clone()),
            CopyPlan::SecondRequest => records.push(RequestRecord::with_details(
                primary.identity.clone(),
                second_details.clone(),
            )),
        }
        debug!(?plan, copies = records.len(), "composed print document");

        let copy_count = plan.copy_count();
        let blocks = records
            .into_iter()
            .zip(1..)
            .map(|(record, copy_number)| {
                let caption = self.render_caption(&record, copy_number, copy_count);
                RequestBlock {
                    record,
                    copy_number,
                    caption,
                }
            })
            .collect();

        PrintDocument::new(&self.options, self.styles.clone(), blocks)
    }

    pub fn compose_selection(&self, selection: &PrintSelection<'_>) -> PrintDocument {
        self.compose(
            selection.primary,
            selection.second_active,
            selection.second_details,
            selection.duplicate,
        )
    }

    fn render_caption(
        &self,
        record: &RequestRecord,
        copy_number: u32,
        copy_count: u32,
    ) -> Option<RenderedCaption> {
        if self.caption.is_empty() {
            return None;
        }
        let context = CaptionContext {
            patient_name: Some(&record.identity.patient_name),
            record_number: Some(&record.identity.record_number),
            request_date: Some(&record.details.request_date),
            copy_number,
            copy_count: Some(copy_count),
        };
        Some(self.caption.render(&context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
    }

    fn primary() -> RequestRecord {
        let mut record = RequestRecord::new(day());
        record.identity.patient_name = "José".into();
        record.identity.record_number = "991".into();
        record.details.requested_exams = "Hemograma".into();
        record
    }

    fn second() -> RequestDetails {
        RequestDetails {
            requested_exams: "Raio-X de tórax".into(),
            clinical_indication: "Tosse".into(),
            request_date: "18/10/2026".into(),
        }
    }

    fn composer() -> PrintComposer {
        PrintComposer::new(PrintJobOptions::default(), StyleTemplate::builtin())
    }

    #[test]
    fn plan_prefers_second_request() {
        assert_eq!(CopyPlan::from_toggles(false, false), CopyPlan::Single);
        assert_eq!(CopyPlan::from_toggles(false, true), CopyPlan::Duplicate);
        assert_eq!(CopyPlan::from_toggles(true, false), CopyPlan::SecondRequest);
        assert_eq!(CopyPlan::from_toggles(true, true), CopyPlan::SecondRequest);
    }

    #[test]
    fn single_request_prints_once() {
        let document = composer().compose(&primary(), false, &second(), false);
        assert_eq!(document.copy_count(), 1);
        assert_eq!(document.blocks[0].record, primary());
    }

    #[test]
    fn duplicate_prints_identical_copies() {
        let document = composer().compose(&primary(), false, &second(), true);
        assert_eq!(document.copy_count(), 2);
        assert_eq!(document.blocks[0].record, document.blocks[1].record);
        assert_eq!(document.blocks[1].copy_number, 2);
    }

    #[test]
    fn second_request_shares_identity_only() {
        let document = composer().compose(&primary(), true, &second(), true);
        assert_eq!(document.copy_count(), 2);
        let copy = &document.blocks[1].record;
        assert_eq!(copy.identity, primary().identity);
        assert_eq!(copy.details, second());
    }

    #[test]
    fn captions_render_per_copy() {
        let caption = CaptionTemplate::parse("&l&n (&m)&rVia &p/&P").unwrap();
        let document = composer()
            .with_caption(caption)
            .compose(&primary(), false, &second(), true);
        let rendered: Vec<_> = document
            .blocks
            .iter()
            .map(|block| block.caption.clone().expect("caption"))
            .collect();
        assert_eq!(rendered[0].left, "José (991)");
        assert_eq!(rendered[0].right, "Via 1/2");
        assert_eq!(rendered[1].right, "Via 2/2");
    }

    #[test]
    fn no_caption_by_default() {
        let document = composer().compose(&primary(), false, &second(), false);
        assert!(document.blocks[0].caption.is_none());
    }
}
