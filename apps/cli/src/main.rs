use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use exam_request_core::{
    analyze_exam_lines, format_date_mask, indication_budget, local_today, EditOutcome,
    EditableRequest, Field, FormSession, RequestEditor,
};
use exam_request_printing::{compose_and_print, FileSurfaceProvider, SurfaceTarget};
use exam_request_settings::PreferencesStore;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "exam-request",
    about = "Utility commands for the exam request form",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aplica a máscara DD/MM/AAAA. / Apply the DD/MM/YYYY mask to raw input.
    MaskDate(MaskDateArgs),
    /// Analisa as linhas de exames. / Analyse exam lines and report the indication budget.
    Budget(BudgetArgs),
    /// Monta e imprime um formulário. / Replay a form description and print it.
    Compose(ComposeArgs),
}

#[derive(Args)]
struct MaskDateArgs {
    /// Texto digitado no campo de data. / Raw text typed into a date field.
    raw: String,
}

#[derive(Args)]
struct BudgetArgs {
    /// Arquivo com os exames; lê stdin quando omitido. / File holding the exam text; stdin when omitted.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Saída em JSON. / Emit the analysis as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ComposeArgs {
    /// Descrição do formulário em JSON. / JSON form description to replay.
    #[arg(long, value_name = "PATH")]
    form: PathBuf,

    /// Destino do documento; stdout quando omitido. / Where to write the printable document (stdout when omitted).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Arquivo de preferências de impressão. / Print preferences file.
    #[arg(long, value_name = "PATH")]
    preferences: Option<PathBuf>,

    /// Data usada como "hoje" (AAAA-MM-DD). / Date used as "today" (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", value_parser = parse_iso_date)]
    today: Option<NaiveDate>,
}

/// Form description replayed by `compose`, keyed by form control names.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormInput {
    #[serde(default)]
    primary: BTreeMap<String, String>,
    #[serde(default)]
    second: BTreeMap<String, String>,
    #[serde(default)]
    second_active: bool,
    #[serde(default)]
    duplicate: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_tracing()?;
    let Cli { command } = Cli::parse();
    match command {
        Commands::MaskDate(args) => execute_mask_date(args),
        Commands::Budget(args) => execute_budget(args),
        Commands::Compose(args) => execute_compose(args),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("exam_request=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .context("failed to initialise logging")
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| format!("invalid date '{raw}': {err}"))
}

fn execute_mask_date(args: MaskDateArgs) -> Result<()> {
    println!("{}", format_date_mask(&args.raw));
    Ok(())
}

fn execute_budget(args: BudgetArgs) -> Result<()> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read exam list {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("failed to read exam list from stdin")?,
    };
    let analysis = analyze_exam_lines(&text);
    let budget = indication_budget(analysis.filled_line_count);

    if args.json {
        let payload = serde_json::json!({
            "lineCount": analysis.line_count,
            "filledLineCount": analysis.filled_line_count,
            "overflow": analysis.overflow,
            "budget": budget,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Lines: {}", analysis.line_count);
    println!("Filled lines: {}", analysis.filled_line_count);
    println!("Overflow: {}", if analysis.overflow { "yes" } else { "no" });
    match budget {
        Some(budget) => println!("Indication budget: {budget} characters"),
        None => println!("Indication budget: unlimited"),
    }
    Ok(())
}

fn execute_compose(args: ComposeArgs) -> Result<()> {
    let input = load_form(&args.form)?;
    let today = args.today.unwrap_or_else(local_today);

    let prefs = match &args.preferences {
        Some(path) => PreferencesStore::load(path)
            .with_context(|| format!("failed to load preferences {}", path.display()))?
            .preferences()
            .clone(),
        None => Default::default(),
    };
    let composer = prefs
        .print
        .composer()
        .context("failed to prepare print templates")?;

    let mut session = FormSession::new(today);
    replay_fields(session.primary_mut(), &input.primary, &Field::ALL, "primary")?;
    replay_fields(session.second_mut(), &input.second, &Field::DETAILS, "second")?;
    session.set_second_request_active(input.second_active);
    if input.duplicate && !session.set_duplicate(true) {
        warn!("duplicate copy ignored while the second request is active");
    }

    let target = match &args.output {
        Some(path) => SurfaceTarget::File(path.clone()),
        None => SurfaceTarget::Stdout,
    };
    let provider = FileSurfaceProvider::new(target);
    let result = compose_and_print(&composer, &session.print_selection(), &provider)?;
    info!(
        job_id = %result.job_id,
        copies = result.copies,
        bytes = result.document_bytes,
        "print job finished"
    );

    if let Some(path) = &args.output {
        println!(
            "Wrote {} request cop{} to {}",
            result.copies,
            if result.copies == 1 { "y" } else { "ies" },
            path.display()
        );
    }
    Ok(())
}

fn load_form(path: &Path) -> Result<FormInput> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read form {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse form {}", path.display()))
}

/// Applies the provided values in form order so exam lines land before the indication.
fn replay_fields<R: EditableRequest>(
    editor: &mut RequestEditor<R>,
    values: &BTreeMap<String, String>,
    order: &[Field],
    section: &str,
) -> Result<()> {
    for name in values.keys() {
        let field: Field = name
            .parse()
            .with_context(|| format!("invalid field in {section} request"))?;
        if !order.contains(&field) {
            bail!("field '{field}' cannot be set on the {section} request");
        }
    }

    for field in order {
        let Some(raw) = values.get(field.as_str()) else {
            continue;
        };
        match editor.edit(*field, raw)? {
            EditOutcome::Accepted(_) => {}
            EditOutcome::Rejected(reason) => {
                warn!(section, %field, ?reason, "edit rejected; field keeps its previous value");
            }
        }
    }

    let validation = editor.validation();
    if let Some(warning) = validation.exam_warning() {
        warn!(section, "{warning}");
    }
    if let Some(notice) = validation.budget_notice() {
        info!(section, "{notice}");
    }
    if let Some(counter) = validation.counter() {
        info!(section, "{counter}");
    }
    Ok(())
}
