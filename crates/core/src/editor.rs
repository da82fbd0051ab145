use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::date_mask::format_date_mask;
use crate::exam_lines::{analyze_exam_lines, ExamLineAnalysis};
use crate::indication::{char_len, collapse_line_breaks, indication_budget, truncate_to_budget};
use crate::record::{RequestDetails, RequestRecord};

/// Aviso exibido quando a 16ª linha de exames é tentada. / Warning shown on a rejected 16th exam line.
pub const EXAM_LIMIT_WARNING: &str = "Limite de 15 exames atingido.";

/// Aviso exibido enquanto a indicação clínica está limitada. / Notice shown while the indication is budgeted.
pub const BUDGET_NOTICE: &str = "O espaço é limitado para garantir a legibilidade do documento.";

/// Campos editáveis do formulário. / Editable form fields, addressed by their control names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PatientName,
    Dob,
    Sex,
    MotherName,
    RecordNumber,
    OriginSector,
    BedNumber,
    RequestedExams,
    ClinicalIndication,
    RequestDate,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 10] = [
        Field::PatientName,
        Field::Dob,
        Field::Sex,
        Field::MotherName,
        Field::RecordNumber,
        Field::OriginSector,
        Field::BedNumber,
        Field::RequestedExams,
        Field::ClinicalIndication,
        Field::RequestDate,
    ];

    /// Fields carried by [`RequestDetails`], in form order.
    pub const DETAILS: [Field; 3] = [
        Field::RequestedExams,
        Field::ClinicalIndication,
        Field::RequestDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PatientName => "patientName",
            Field::Dob => "dob",
            Field::Sex => "sex",
            Field::MotherName => "motherName",
            Field::RecordNumber => "recordNumber",
            Field::OriginSector => "originSector",
            Field::BedNumber => "bedNumber",
            Field::RequestedExams => "requestedExams",
            Field::ClinicalIndication => "clinicalIndication",
            Field::RequestDate => "requestDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = EditorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| EditorError::UnknownField(name.to_string()))
    }
}

/// Erros do editor de pedidos. / Errors raised by the request editor for malformed host input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' is not part of the request details form")]
    FieldNotEditable { field: Field },
    #[error("unrecognised sex value '{0}' (expected Masculino, Feminino or empty)")]
    InvalidSex(String),
}

/// Motivo da recusa de uma edição. / Why an edit was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ExamLineLimit { attempted_lines: usize },
    IndicationBudget { budget: usize, attempted_len: usize },
}

/// Resultado de uma edição. / Result of applying one `(field, raw value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The stored value to redisplay, possibly corrected (masked or collapsed).
    Accepted(String),
    /// The field kept its previous value.
    Rejected(RejectReason),
}

impl EditOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, EditOutcome::Accepted(_))
    }
}

/// Estado de validação derivado. / Validation state derived from the current field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationState {
    pub exams: ExamLineAnalysis,
    pub exam_limit_reached: bool,
    pub budget: Option<usize>,
    pub indication_len: usize,
}

impl ValidationState {
    /// The indication has used its whole budget.
    pub fn at_budget(&self) -> bool {
        matches!(self.budget, Some(budget) if self.indication_len >= budget)
    }

    pub fn exam_warning(&self) -> Option<&'static str> {
        self.exam_limit_reached.then_some(EXAM_LIMIT_WARNING)
    }

    /// Notice shown while the indication is limited by the exam count.
    pub fn budget_notice(&self) -> Option<&'static str> {
        self.budget.map(|_| BUDGET_NOTICE)
    }

    /// Counter shown under the indication field, e.g. `Caracteres: 12/288`.
    pub fn counter(&self) -> Option<String> {
        self.budget
            .map(|budget| format!("Caracteres: {}/{}", self.indication_len, budget))
    }
}

/// Registro que pode ser editado por um [`RequestEditor`]. / A request shape the editor can drive.
pub trait EditableRequest {
    fn details(&self) -> &RequestDetails;
    fn details_mut(&mut self) -> &mut RequestDetails;
    /// Applies a pass-through field that is not part of [`RequestDetails`].
    fn set_identity_field(&mut self, field: Field, raw: &str) -> Result<String, EditorError>;
    fn blank(today: NaiveDate) -> Self;
}

impl EditableRequest for RequestRecord {
    fn details(&self) -> &RequestDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut RequestDetails {
        &mut self.details
    }

    fn set_identity_field(&mut self, field: Field, raw: &str) -> Result<String, EditorError> {
        let identity = &mut self.identity;
        let slot = match field {
            Field::PatientName => &mut identity.patient_name,
            Field::MotherName => &mut identity.mother_name,
            Field::RecordNumber => &mut identity.record_number,
            Field::OriginSector => &mut identity.origin_sector,
            Field::BedNumber => &mut identity.bed_number,
            Field::Dob => {
                identity.dob = format_date_mask(raw);
                return Ok(identity.dob.clone());
            }
            Field::Sex => {
                identity.sex = raw.parse()?;
                return Ok(identity.sex.as_str().to_string());
            }
            Field::RequestedExams | Field::ClinicalIndication | Field::RequestDate => {
                return Err(EditorError::FieldNotEditable { field });
            }
        };
        *slot = raw.to_string();
        Ok(slot.clone())
    }

    fn blank(today: NaiveDate) -> Self {
        RequestRecord::new(today)
    }
}

impl EditableRequest for RequestDetails {
    fn details(&self) -> &RequestDetails {
        self
    }

    fn details_mut(&mut self) -> &mut RequestDetails {
        self
    }

    fn set_identity_field(&mut self, field: Field, _raw: &str) -> Result<String, EditorError> {
        Err(EditorError::FieldNotEditable { field })
    }

    fn blank(today: NaiveDate) -> Self {
        RequestDetails::new(today)
    }
}

/// Editor de um pedido com regras de linhas e orçamento. / Applies field edits under the exam/indication rules.
///
/// Budget and overflow are re-derived from the current text on every edit.
/// The only stored flag is whether the last exam edit hit the line limit.
#[derive(Debug, Clone)]
pub struct RequestEditor<R = RequestRecord> {
    request: R,
    exam_limit_reached: bool,
}

/// Editor do segundo pedido. / Editor over the standalone second-request details.
pub type DetailsEditor = RequestEditor<RequestDetails>;

impl<R: EditableRequest> RequestEditor<R> {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            request: R::blank(today),
            exam_limit_reached: false,
        }
    }

    pub fn request(&self) -> &R {
        &self.request
    }

    pub fn details(&self) -> &RequestDetails {
        self.request.details()
    }

    /// Resolves a control name and applies the edit.
    pub fn edit_named(&mut self, name: &str, raw: &str) -> Result<EditOutcome, EditorError> {
        let field = name.parse::<Field>()?;
        self.edit(field, raw)
    }

    /// Applies `raw` to `field`, returning the value to redisplay or the rejection reason.
    pub fn edit(&mut self, field: Field, raw: &str) -> Result<EditOutcome, EditorError> {
        match field {
            Field::RequestedExams => Ok(self.edit_exams(raw)),
            Field::ClinicalIndication => Ok(self.edit_indication(raw)),
            Field::RequestDate => {
                let masked = format_date_mask(raw);
                self.request.details_mut().request_date = masked.clone();
                Ok(EditOutcome::Accepted(masked))
            }
            other => self
                .request
                .set_identity_field(other, raw)
                .map(EditOutcome::Accepted),
        }
    }

    pub fn validation(&self) -> ValidationState {
        let details = self.request.details();
        let exams = analyze_exam_lines(&details.requested_exams);
        ValidationState {
            exams,
            exam_limit_reached: self.exam_limit_reached || exams.overflow,
            budget: indication_budget(exams.filled_line_count),
            indication_len: char_len(&details.clinical_indication),
        }
    }

    /// Resets every field, dating the request `today`.
    pub fn clear(&mut self, today: NaiveDate) {
        self.request = R::blank(today);
        self.exam_limit_reached = false;
    }

    fn edit_exams(&mut self, raw: &str) -> EditOutcome {
        let attempted = analyze_exam_lines(raw);
        if attempted.overflow {
            self.exam_limit_reached = true;
            debug!(
                lines = attempted.line_count,
                "rejected requested-exams edit past the line limit"
            );
            return EditOutcome::Rejected(RejectReason::ExamLineLimit {
                attempted_lines: attempted.line_count,
            });
        }

        self.exam_limit_reached = false;
        self.request.details_mut().requested_exams = raw.to_string();
        self.enforce_budget();
        EditOutcome::Accepted(raw.to_string())
    }

    fn edit_indication(&mut self, raw: &str) -> EditOutcome {
        let value = collapse_line_breaks(raw);
        let attempted_len = char_len(&value);
        if let Some(budget) = self.current_budget() {
            if attempted_len > budget {
                debug!(budget, attempted_len, "rejected clinical-indication edit over budget");
                return EditOutcome::Rejected(RejectReason::IndicationBudget {
                    budget,
                    attempted_len,
                });
            }
        }

        self.request.details_mut().clinical_indication = value.clone();
        self.enforce_budget();
        EditOutcome::Accepted(value)
    }

    fn current_budget(&self) -> Option<usize> {
        let filled = analyze_exam_lines(&self.request.details().requested_exams).filled_line_count;
        indication_budget(filled)
    }

    fn enforce_budget(&mut self) {
        let Some(budget) = self.current_budget() else {
            return;
        };
        let details = self.request.details_mut();
        if truncate_to_budget(&mut details.clinical_indication, budget) {
            debug!(budget, "clinical indication truncated to the reduced budget");
        }
    }
}
