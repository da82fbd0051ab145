use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_mask::mask_date;
use crate::editor::EditorError;

/// Sexo do paciente. / Patient sex as offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    #[serde(rename = "")]
    Unset,
    Masculino,
    Feminino,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Unset => "",
            Sex::Masculino => "Masculino",
            Sex::Feminino => "Feminino",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = EditorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" => Ok(Sex::Unset),
            "Masculino" => Ok(Sex::Masculino),
            "Feminino" => Ok(Sex::Feminino),
            other => Err(EditorError::InvalidSex(other.to_string())),
        }
    }
}

/// Identificação do paciente compartilhada entre pedidos. / Patient identity shared by both requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdentity {
    pub patient_name: String,
    pub dob: String,
    pub sex: Sex,
    pub mother_name: String,
    pub record_number: String,
    pub origin_sector: String,
    pub bed_number: String,
}

/// Exames, indicação clínica e data de um pedido. / Exams, indication, and date of one request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub requested_exams: String,
    pub clinical_indication: String,
    pub request_date: String,
}

impl RequestDetails {
    /// Empty details dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            request_date: mask_date(today),
            ..Self::default()
        }
    }
}

/// Pedido completo: identificação + detalhes. / A full exam request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub identity: PatientIdentity,
    pub details: RequestDetails,
}

impl RequestRecord {
    /// Empty record dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            identity: PatientIdentity::default(),
            details: RequestDetails::new(today),
        }
    }

    /// Builds a record from an identity and independently edited details.
    pub fn with_details(identity: PatientIdentity, details: RequestDetails) -> Self {
        Self { identity, details }
    }
}
