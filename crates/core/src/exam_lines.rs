use serde::Serialize;

/// Quantidade máxima de linhas no campo de exames. / Maximum number of lines in the requested-exams field.
pub const MAX_EXAM_LINES: usize = 15;

/// Resultado da análise do texto de exames. / Line statistics for the requested-exams text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExamLineAnalysis {
    /// Segments produced by splitting on `\n`; never zero.
    pub line_count: usize,
    /// Segments whose trimmed content is non-empty.
    pub filled_line_count: usize,
    pub overflow: bool,
}

impl Default for ExamLineAnalysis {
    fn default() -> Self {
        analyze_exam_lines("")
    }
}

/// Conta linhas e linhas preenchidas. / Counts lines and filled lines of the exam text.
pub fn analyze_exam_lines(text: &str) -> ExamLineAnalysis {
    let mut line_count = 0;
    let mut filled_line_count = 0;
    for line in text.split('\n') {
        line_count += 1;
        if !line.trim().is_empty() {
            filled_line_count += 1;
        }
    }
    ExamLineAnalysis {
        line_count,
        filled_line_count,
        overflow: line_count > MAX_EXAM_LINES,
    }
}

/// Linhas preenchidas, já aparadas, na ordem original. / Filled lines, trimmed, in their original order.
pub fn filled_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
}
