//! Regras do formulário de pedido de exames. / Field rules and state for the exam request form.

pub mod date_mask;
pub mod editor;
pub mod exam_lines;
pub mod indication;
pub mod record;
pub mod session;

pub use date_mask::{format_date_mask, local_today, mask_date};
pub use editor::{
    DetailsEditor, EditOutcome, EditableRequest, EditorError, Field, RejectReason, RequestEditor,
    ValidationState, BUDGET_NOTICE, EXAM_LIMIT_WARNING,
};
pub use exam_lines::{analyze_exam_lines, filled_lines, ExamLineAnalysis, MAX_EXAM_LINES};
pub use indication::{collapse_line_breaks, indication_budget};
pub use record::{PatientIdentity, RequestDetails, RequestRecord, Sex};
pub use session::{FormSession, PrintSelection};
