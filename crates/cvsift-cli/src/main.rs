use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use cvsift_core::config_file;
use cvsift_core::{BackendError, NlpError, PdfBackend, RecordSink};
use cvsift_extract::{EntityExtractor, PipelineError, process_resume};
use cvsift_pdf_mupdf::MupdfBackend;
use cvsift_reporting::{ColorMode, ConsoleSink, CsvAppendSink, RenderFormat};
use cvsift_spacy::SpacyBackend;

mod settings;

use settings::Overrides;

/// Resume Field Extractor - Pull contact details, names, skills and entities out of resume PDFs
#[derive(Parser, Debug)]
#[command(name = "cvsift", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract structured fields from a resume PDF
    Extract {
        /// Path to the resume PDF
        file_path: PathBuf,

        /// Append the record to a CSV file (default: resume_data.csv) and print only the status line
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        csv: Option<Option<PathBuf>>,

        /// How to print the record (defaults to text, or quiet with --csv)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Python interpreter with spaCy installed
        #[arg(long)]
        python: Option<String>,

        /// spaCy model to load
        #[arg(long)]
        model: Option<String>,

        /// Placeholder for fields with no value
        #[arg(long)]
        sentinel: Option<String>,

        /// Read settings from this TOML file instead of the default locations
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the text extracted from a PDF without running the NLP model
    Text {
        /// Path to the PDF
        file_path: PathBuf,

        /// Write the text to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Quiet,
}

impl From<OutputFormat> for RenderFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => RenderFormat::Text,
            OutputFormat::Json => RenderFormat::Json,
            OutputFormat::Quiet => RenderFormat::Quiet,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Extract {
            file_path,
            csv,
            format,
            no_color,
            python,
            model,
            sentinel,
            config,
        } => {
            let overrides = Overrides {
                python,
                model,
                sentinel,
                csv_path: csv.clone().flatten(),
            };
            extract(
                &file_path,
                csv.is_some(),
                format,
                no_color,
                overrides,
                config,
            )
        }
        Command::Text {
            file_path,
            output,
            no_color,
        } => text(&file_path, output, no_color),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("CVSIFT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 2 input, 3 extraction, 4 model, 5 sink, 1 anything else (usage, config).
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        return match e {
            PipelineError::Input(_) => 2,
            PipelineError::Extraction(_) => 3,
            PipelineError::Model(_) => 4,
            PipelineError::Sink(_) => 5,
        };
    }
    if err.downcast_ref::<NlpError>().is_some() {
        return 4;
    }
    1
}

fn extract(
    file_path: &Path,
    append_csv: bool,
    format: Option<OutputFormat>,
    no_color: bool,
    overrides: Overrides,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let file_config = match config {
        Some(path) => config_file::load_strict(&path)?,
        None => config_file::load_config(),
    };
    let settings = settings::resolve(overrides, |key| std::env::var(key).ok(), &file_config)?;

    // Fail on a bad path before paying for model startup.
    if !file_path.is_file() {
        return Err(PipelineError::Input(BackendError::Open(format!(
            "file not found: {}",
            file_path.display()
        )))
        .into());
    }

    let nlp = SpacyBackend::start(&settings.python, &settings.model)?;
    let extractor = EntityExtractor::with_config(Box::new(nlp), settings.extraction);

    let color = ColorMode(!no_color && std::io::stdout().is_terminal());
    let default_format = if append_csv {
        RenderFormat::Quiet
    } else {
        RenderFormat::Text
    };
    let console = ConsoleSink::stdout()
        .color(color)
        .format(format.map(RenderFormat::from).unwrap_or(default_format))
        .sentinel(&settings.sentinel);

    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if append_csv {
        let csv = CsvAppendSink::new(&settings.csv_path).sentinel(&settings.sentinel);
        tracing::info!(csv = %csv.path().display(), "appending to CSV");
        sinks.push(Box::new(csv));
    }
    sinks.push(Box::new(console));

    process_resume(file_path, &MupdfBackend::new(), &extractor, &mut sinks)?;
    Ok(())
}

fn text(file_path: &Path, output: Option<PathBuf>, no_color: bool) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let use_color = !no_color && output.is_none() && std::io::stdout().is_terminal();

    let text = MupdfBackend::new()
        .extract_text(file_path)
        .map_err(PipelineError::from)?;

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());

    if use_color {
        writeln!(
            writer,
            "{} {} ({} chars)\n",
            "TEXT:".bold().cyan(),
            file_name.bold(),
            text.chars().count()
        )?;
    } else if output.is_none() {
        writeln!(
            writer,
            "TEXT: {} ({} chars)\n",
            file_name,
            text.chars().count()
        )?;
    }
    writeln!(writer, "{}", text)?;
    writer.flush()?;

    Ok(())
}
