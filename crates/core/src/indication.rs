use crate::exam_lines::MAX_EXAM_LINES;

/// Filled exam lines from which the indication field becomes limited.
pub const BUDGET_THRESHOLD: usize = 9;

/// Characters granted for every printable line left unused by exams.
pub const CHARS_PER_FREE_LINE: usize = 48;

/// Limite de caracteres da indicação clínica. / Character budget for the clinical indication.
///
/// `None` means unlimited. Counts above [`MAX_EXAM_LINES`] are treated as the
/// fifteen-line budget.
pub fn indication_budget(filled_line_count: usize) -> Option<usize> {
    if filled_line_count < BUDGET_THRESHOLD {
        return None;
    }
    let filled = filled_line_count.min(MAX_EXAM_LINES);
    Some(CHARS_PER_FREE_LINE * (MAX_EXAM_LINES + 1 - filled))
}

/// Substitui cada quebra de linha por um espaço. / Replaces every CRLF, LF, or CR with a single space.
pub fn collapse_line_breaks(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                output.push(' ');
            }
            '\n' => output.push(' '),
            other => output.push(other),
        }
    }
    output
}

/// Comprimento em caracteres. / Length in Unicode scalar values.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Trunca o texto ao limite; retorna `true` se algo foi removido. / Truncates to `budget` chars.
pub fn truncate_to_budget(text: &mut String, budget: usize) -> bool {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => {
            text.truncate(cut);
            true
        }
        None => false,
    }
}
