use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Tokens recognised by the caption parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionToken {
    PatientName,
    RecordNumber,
    RequestDate,
    CopyNumber,
    CopyCount,
}

impl CaptionToken {
    fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'n' | 'N' => Some(CaptionToken::PatientName),
            'm' | 'M' => Some(CaptionToken::RecordNumber),
            'd' | 'D' => Some(CaptionToken::RequestDate),
            'p' => Some(CaptionToken::CopyNumber),
            'P' => Some(CaptionToken::CopyCount),
            _ => None,
        }
    }
}

/// Caption segments per alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionSegment {
    Literal(String),
    Token(CaptionToken),
}

/// Parsed caption printed above each request copy.
///
/// Syntax: `&l`, `&c`, `&r` switch alignment; `&n` patient name, `&m` record
/// number, `&d` request date, `&p` copy number, `&P` copy count; `&&` is a
/// literal ampersand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptionTemplate {
    pub left: Vec<CaptionSegment>,
    pub center: Vec<CaptionSegment>,
    pub right: Vec<CaptionSegment>,
}

#[derive(Clone, Copy)]
enum Alignment {
    Left,
    Center,
    Right,
}

impl CaptionTemplate {
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        let mut template = Self::default();
        let mut alignment = Alignment::Left;
        let mut buffer = String::new();

        let mut chars = input.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '&' {
                buffer.push(ch);
                continue;
            }

            let Some(next) = chars.peek().copied() else {
                buffer.push('&');
                break;
            };
            chars.next();

            let switch_to = match next {
                '&' => {
                    buffer.push('&');
                    continue;
                }
                'l' | 'L' => Some(Alignment::Left),
                'c' | 'C' => Some(Alignment::Center),
                'r' | 'R' => Some(Alignment::Right),
                _ => None,
            };

            template.flush(&mut buffer, alignment);
            match switch_to {
                Some(target) => alignment = target,
                None => {
                    let token = CaptionToken::from_marker(next)
                        .ok_or(TemplateError::UnknownToken(next))?;
                    template.slot(alignment).push(CaptionSegment::Token(token));
                }
            }
        }

        template.flush(&mut buffer, alignment);
        Ok(template)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }

    pub fn render(&self, context: &CaptionContext<'_>) -> RenderedCaption {
        RenderedCaption {
            left: render_segments(&self.left, context),
            center: render_segments(&self.center, context),
            right: render_segments(&self.right, context),
        }
    }

    fn slot(&mut self, alignment: Alignment) -> &mut Vec<CaptionSegment> {
        match alignment {
            Alignment::Left => &mut self.left,
            Alignment::Center => &mut self.center,
            Alignment::Right => &mut self.right,
        }
    }

    fn flush(&mut self, buffer: &mut String, alignment: Alignment) {
        if buffer.is_empty() {
            return;
        }
        let literal = CaptionSegment::Literal(std::mem::take(buffer));
        self.slot(alignment).push(literal);
    }
}

fn render_segments(segments: &[CaptionSegment], context: &CaptionContext<'_>) -> String {
    let mut output = String::new();
    for segment in segments {
        match segment {
            CaptionSegment::Literal(text) => output.push_str(text),
            CaptionSegment::Token(token) => token.append_to(&mut output, context),
        }
    }
    output
}

/// Runtime context for caption rendering.
#[derive(Debug, Clone, Default)]
pub struct CaptionContext<'a> {
    pub patient_name: Option<&'a str>,
    pub record_number: Option<&'a str>,
    pub request_date: Option<&'a str>,
    pub copy_number: u32,
    pub copy_count: Option<u32>,
}

/// Rendered caption strings for each alignment slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCaption {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl RenderedCaption {
    pub fn is_blank(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }
}

impl CaptionToken {
    fn append_to(&self, buffer: &mut String, context: &CaptionContext<'_>) {
        match self {
            CaptionToken::PatientName => buffer.push_str(context.patient_name.unwrap_or_default()),
            CaptionToken::RecordNumber => {
                buffer.push_str(context.record_number.unwrap_or_default())
            }
            CaptionToken::RequestDate => buffer.push_str(context.request_date.unwrap_or_default()),
            CaptionToken::CopyNumber => {
                let _ = write!(buffer, "{}", context.copy_number);
            }
            CaptionToken::CopyCount => {
                if let Some(total) = context.copy_count {
                    let _ = write!(buffer, "{}", total);
                }
            }
        }
    }
}

/// Estilos aplicados ao documento impresso. / Stylesheet embedded in the printable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTemplate {
    css: String,
}

const BUILTIN_STYLES: &str = r#"body { font-family: Arial, Helvetica, sans-serif; color: #000; margin: 0; }
#printable-area { display: flex; flex-direction: column; gap: 6mm; }
.request-copy { border: 1px solid #000; padding: 4mm 6mm; break-inside: avoid; page-break-inside: avoid; }
.request-copy h1 { font-size: 14pt; text-align: center; margin: 0 0 3mm 0; }
.request-copy h2 { font-size: 10pt; border-bottom: 1px solid #444; margin: 3mm 0 2mm 0; }
.caption { display: flex; justify-content: space-between; font-size: 8pt; color: #333; }
.field-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1mm 4mm; font-size: 10pt; }
.field-wide { grid-column: 1 / -1; }
.label { font-weight: bold; }
.exam-list { margin: 0; padding-left: 5mm; font-size: 10pt; }
.indication { font-size: 10pt; overflow-wrap: anywhere; margin: 0; }
.request-date { font-size: 10pt; text-align: right; margin-top: 3mm; }
"#;

impl StyleTemplate {
    /// The stylesheet shipped with the application.
    pub fn builtin() -> Self {
        Self {
            css: BUILTIN_STYLES.to_string(),
        }
    }

    /// Wraps caller-provided CSS; blank content counts as a missing template.
    pub fn from_css(css: impl Into<String>) -> Result<Self, TemplateError> {
        let css = css.into();
        if css.trim().is_empty() {
            return Err(TemplateError::MissingStyles);
        }
        Ok(Self { css })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let css = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_css(css)
    }

    pub fn css(&self) -> &str {
        &self.css
    }
}

impl Default for StyleTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Errors raised while preparing caption or style templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown caption token '&{0}'")]
    UnknownToken(char),
    #[error("print style template is empty; reload the page and try again")]
    MissingStyles,
    #[error("failed to read print style template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_alignment_and_tokens() {
        let template = CaptionTemplate::parse("&lPaciente: &n&cVia &p&rde &P").unwrap();
        assert_eq!(
            template.left,
            vec![
                CaptionSegment::Literal("Paciente: ".into()),
                CaptionSegment::Token(CaptionToken::PatientName)
            ]
        );
        assert_eq!(
            template.center,
            vec![
                CaptionSegment::Literal("Via ".into()),
                CaptionSegment::Token(CaptionToken::CopyNumber)
            ]
        );
        assert_eq!(
            template.right,
            vec![
                CaptionSegment::Literal("de ".into()),
                CaptionSegment::Token(CaptionToken::CopyCount)
            ]
        );
    }

    #[test]
    fn render_caption() {
        let template = CaptionTemplate::parse("&l&m && &d&r&p/&P").unwrap();
        let context = CaptionContext {
            patient_name: Some("Maria"),
            record_number: Some("4471"),
            request_date: Some("17/10/2026"),
            copy_number: 2,
            copy_count: Some(2),
        };
        let rendered = template.render(&context);
        assert_eq!(rendered.left, "4471 & 17/10/2026");
        assert_eq!(rendered.right, "2/2");
        assert!(rendered.center.is_empty());
        assert!(!rendered.is_blank());
    }

    #[test]
    fn trailing_ampersand_is_literal() {
        let template = CaptionTemplate::parse("A&").unwrap();
        assert_eq!(template.left, vec![CaptionSegment::Literal("A&".into())]);
    }

    #[test]
    fn unknown_token() {
        match CaptionTemplate::parse("&x") {
            Err(TemplateError::UnknownToken('x')) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn blank_styles_are_missing() {
        assert!(matches!(
            StyleTemplate::from_css("  \n"),
            Err(TemplateError::MissingStyles)
        ));
        assert!(StyleTemplate::builtin().css().contains(".request-copy"));
    }

    #[test]
    fn unreadable_style_file_reports_path() {
        let err = StyleTemplate::load("/nonexistent/print-styles.css").unwrap_err();
        match err {
            TemplateError::Read { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/print-styles.css"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
