use chrono::NaiveDate;
use tracing::debug;

use crate::editor::{DetailsEditor, RequestEditor};
use crate::record::{RequestDetails, RequestRecord};

/// Estado completo do formulário. / Whole-form state: both editors plus the copy toggles.
///
/// "Second distinct request" and "duplicate copy" are mutually exclusive;
/// turning the former on forces the latter off and disables it.
#[derive(Debug, Clone)]
pub struct FormSession {
    primary: RequestEditor,
    second: DetailsEditor,
    second_active: bool,
    duplicate: bool,
}

/// Entradas do compositor de impressão. / What the print composer reads from a session.
#[derive(Debug, Clone, Copy)]
pub struct PrintSelection<'a> {
    pub primary: &'a RequestRecord,
    pub second_active: bool,
    pub second_details: &'a RequestDetails,
    pub duplicate: bool,
}

impl FormSession {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            primary: RequestEditor::new(today),
            second: DetailsEditor::new(today),
            second_active: false,
            duplicate: false,
        }
    }

    pub fn primary(&self) -> &RequestEditor {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut RequestEditor {
        &mut self.primary
    }

    pub fn second(&self) -> &DetailsEditor {
        &self.second
    }

    pub fn second_mut(&mut self) -> &mut DetailsEditor {
        &mut self.second
    }

    pub fn is_second_request_active(&self) -> bool {
        self.second_active
    }

    pub fn set_second_request_active(&mut self, active: bool) {
        self.second_active = active;
        if active && self.duplicate {
            debug!("duplicate copy switched off by second request");
            self.duplicate = false;
        }
    }

    /// Reports whether the duplicate toggle is currently usable.
    pub fn duplicate_enabled(&self) -> bool {
        !self.second_active
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate && !self.second_active
    }

    /// Sets the duplicate toggle; returns `false` and changes nothing while disabled.
    pub fn set_duplicate(&mut self, duplicate: bool) -> bool {
        if !self.duplicate_enabled() {
            debug!("ignored duplicate toggle while second request is active");
            return false;
        }
        self.duplicate = duplicate;
        true
    }

    /// Limpa ambos os pedidos e desliga as opções. / Resets both requests and both toggles.
    pub fn clear(&mut self, today: NaiveDate) {
        self.primary.clear(today);
        self.second.clear(today);
        self.second_active = false;
        self.duplicate = false;
    }

    pub fn print_selection(&self) -> PrintSelection<'_> {
        PrintSelection {
            primary: self.primary.request(),
            second_active: self.second_active,
            second_details: self.second.request(),
            duplicate: self.is_duplicate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Field;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
    }

    #[test]
    fn second_request_disables_duplicate() {
        let mut session = FormSession::new(day());
        assert!(session.set_duplicate(true));
        assert!(session.is_duplicate());

        session.set_second_request_active(true);
        assert!(!session.duplicate_enabled());
        assert!(!session.is_duplicate());
        assert!(!session.set_duplicate(true));
        assert!(!session.print_selection().duplicate);

        session.set_second_request_active(false);
        assert!(session.duplicate_enabled());
        assert!(!session.is_duplicate());
    }

    #[test]
    fn editors_do_not_share_state() {
        let mut session = FormSession::new(day());
        session
            .primary_mut()
            .edit(Field::RequestedExams, "Hemograma")
            .unwrap();
        session
            .second_mut()
            .edit(Field::RequestedExams, "Ureia\nCreatinina")
            .unwrap();
        assert_eq!(session.primary().details().requested_exams, "Hemograma");
        assert_eq!(
            session.second().details().requested_exams,
            "Ureia\nCreatinina"
        );
    }
}
