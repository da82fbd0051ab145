use chrono::{Local, NaiveDate};

/// Número máximo de dígitos aceitos pela máscara. / Maximum digits kept by the `DD/MM/YYYY` mask.
pub const MAX_DATE_DIGITS: usize = 8;

/// Aplica a máscara `DD/MM/AAAA` à entrada bruta. / Applies the progressive `DD/MM/YYYY` mask to raw keystrokes.
///
/// Every non-digit is discarded first, so the result only ever contains ASCII
/// digits and slashes. Calendar correctness is not checked.
pub fn format_date_mask(raw: &str) -> String {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}/{}", &digits[..2], &digits[2..]),
        len => {
            let end = len.min(MAX_DATE_DIGITS);
            format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..end])
        }
    }
}

/// Formata uma data de calendário já com a máscara completa. / Renders a calendar date in masked form.
pub fn mask_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Data local de hoje. / Today's date in the local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
