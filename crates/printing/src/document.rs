use std::fmt::Write as _;

use exam_request_core::{filled_lines, RequestRecord};

use crate::job::PrintJobOptions;
use crate::template::{RenderedCaption, StyleTemplate};

/// Título impresso no topo de cada via. / Heading printed on every copy.
pub const DOCUMENT_HEADING: &str = "Solicitação de Pedido de Exames";

/// One printed copy of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBlock {
    pub record: RequestRecord,
    pub copy_number: u32,
    pub caption: Option<RenderedCaption>,
}

/// Self-contained printable document: markup plus the styles it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintDocument {
    pub title: String,
    pub styles: StyleTemplate,
    pub page_rule: String,
    pub blocks: Vec<RequestBlock>,
}

impl PrintDocument {
    pub fn new(options: &PrintJobOptions, styles: StyleTemplate, blocks: Vec<RequestBlock>) -> Self {
        Self {
            title: options.title.clone(),
            styles,
            page_rule: page_rule(options),
            blocks,
        }
    }

    pub fn copy_count(&self) -> usize {
        self.blocks.len()
    }

    /// Renders the complete HTML document handed to the print surface.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(4096);
        html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_html(&self.title));
        html.push_str("<style>\n");
        html.push_str(&self.page_rule);
        html.push('\n');
        html.push_str(self.styles.css());
        html.push_str("</style>\n</head>\n<body>\n<div id=\"printable-area\">\n");
        for block in &self.blocks {
            render_block(&mut html, block);
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }
}

fn page_rule(options: &PrintJobOptions) -> String {
    let m = options.margins;
    format!(
        "@page {{ size: {} {}; margin: {}mm {}mm {}mm {}mm; }}",
        options.paper.css_keyword(),
        options.orientation.css_keyword(),
        fmt_mm(m.top),
        fmt_mm(m.right),
        fmt_mm(m.bottom),
        fmt_mm(m.left)
    )
}

fn fmt_mm(value: f32) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    if value.fract() == 0.0 {
        format!("{}", value as u32)
    } else {
        format!("{:.1}", value)
    }
}

fn render_block(html: &mut String, block: &RequestBlock) {
    let identity = &block.record.identity;
    let details = &block.record.details;

    let _ = writeln!(
        html,
        "<section class=\"request-copy\" data-copy=\"{}\">",
        block.copy_number
    );
    if let Some(caption) = block.caption.as_ref().filter(|caption| !caption.is_blank()) {
        let _ = writeln!(
            html,
            "<div class=\"caption\"><span>{}</span><span>{}</span><span>{}</span></div>",
            escape_html(&caption.left),
            escape_html(&caption.center),
            escape_html(&caption.right)
        );
    }
    let _ = writeln!(html, "<h1>{}</h1>", DOCUMENT_HEADING);

    html.push_str("<h2>Informações do Paciente</h2>\n<div class=\"field-grid\">\n");
    push_field(html, "Nome do paciente", &identity.patient_name, true);
    push_field(html, "Data de Nascimento", &identity.dob, false);
    push_field(html, "Nome da mãe", &identity.mother_name, false);
    push_field(html, "Sexo", identity.sex.as_str(), false);
    html.push_str("</div>\n");

    html.push_str("<h2>Informações de Atendimento</h2>\n<div class=\"field-grid\">\n");
    push_field(html, "Prontuário/Atend.", &identity.record_number, false);
    push_field(html, "Setor de Origem", &identity.origin_sector, false);
    push_field(html, "Nº do Leito", &identity.bed_number, false);
    html.push_str("</div>\n");

    html.push_str("<h2>Exames Solicitados</h2>\n<ol class=\"exam-list\">\n");
    for line in filled_lines(&details.requested_exams) {
        let _ = writeln!(html, "<li>{}</li>", escape_html(line));
    }
    html.push_str("</ol>\n");

    html.push_str("<h2>Indicação Clínica</h2>\n");
    let _ = writeln!(
        html,
        "<p class=\"indication\">{}</p>",
        escape_html(&details.clinical_indication)
    );
    let _ = writeln!(
        html,
        "<p class=\"request-date\"><span class=\"label\">Data da Solicitação:</span> {}</p>",
        escape_html(&details.request_date)
    );
    html.push_str("</section>\n");
}

fn push_field(html: &mut String, label: &str, value: &str, wide: bool) {
    let class = if wide { " class=\"field-wide\"" } else { "" };
    let _ = writeln!(
        html,
        "<p{class}><span class=\"label\">{label}:</span> {}</p>",
        escape_html(value)
    );
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }
    output
}
