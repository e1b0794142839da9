use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use syllabus_core::config_file::{self, ConfigFile};
use syllabus_parsing::AssignmentExtractor;

mod output;
mod settings;

use output::ColorMode;
use settings::Overrides;

/// Threshold used by `report` when nothing else sets one.
const REPORT_THRESHOLD: f64 = 0.6;

/// Syllabus Scanner - Find assignments and due dates in course syllabi
#[derive(Parser, Debug)]
#[command(name = "syllabus-scan", version, about, long_about = None)]
struct Cli {
    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List assignment mentions, dates, and linked assignment/date pairs
    Extract {
        #[command(flatten)]
        common: CommonArgs,

        /// Drop assignments scored below the threshold before linking
        #[arg(long)]
        filter_real: bool,
    },

    /// Score every assignment mention
    Score {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Page-grouped report with potential assignments
    Report {
        #[command(flatten)]
        common: CommonArgs,

        /// Drop assignments scored below the threshold before linking
        #[arg(long)]
        filter_real: bool,
    },

    /// Show the effective config file, optionally saving new values into it
    Config {
        /// Store this assignment threshold (0-1)
        #[arg(long)]
        threshold: Option<f64>,

        /// Store this context window size
        #[arg(long)]
        context_window: Option<usize>,

        /// Write the result to the platform config directory
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to the PDF (or form-feed paged .txt) file
    file_path: PathBuf,

    /// Confidence at or above which an assignment counts as real (0-1)
    #[arg(long)]
    threshold: Option<f64>,

    /// Characters of context kept on each side of a match
    #[arg(long)]
    context_window: Option<usize>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: json, or `display.format` from the config file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    fn from_config(file: &ConfigFile) -> Option<Self> {
        let name = file.display.as_ref()?.format.as_deref()?;
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            other => {
                tracing::warn!(format = other, "unknown display.format in config file");
                None
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_file = config_file::load_config();

    match cli.command {
        Command::Extract {
            common,
            filter_real,
        } => run(&common, &config_file, None, |path, extractor, w, format, color| {
            let result = syllabus_ingest::extract_assignments(path, extractor, filter_real)?;
            match format {
                OutputFormat::Json => write_json(w, &result),
                OutputFormat::Text => {
                    output::print_file_header(w, &display_name(path), color)?;
                    Ok(output::print_extraction(w, &result, color)?)
                }
            }
        }),
        Command::Score { common } => {
            run(&common, &config_file, None, |path, extractor, w, format, color| {
                let scored = syllabus_ingest::score_assignments(path, extractor)?;
                match format {
                    OutputFormat::Json => write_json(w, &scored),
                    OutputFormat::Text => {
                        output::print_file_header(w, &display_name(path), color)?;
                        Ok(output::print_scores(w, &scored, color)?)
                    }
                }
            })
        }
        Command::Report {
            common,
            filter_real,
        } => run(
            &common,
            &config_file,
            Some(REPORT_THRESHOLD),
            |path, extractor, w, format, color| {
                let report = syllabus_ingest::structured_report(path, extractor, filter_real)?;
                match format {
                    OutputFormat::Json => write_json(w, &report),
                    OutputFormat::Text => {
                        output::print_file_header(w, &display_name(path), color)?;
                        Ok(output::print_report(w, &report, color)?)
                    }
                }
            },
        ),
        Command::Config {
            threshold,
            context_window,
            save,
        } => {
            let flags = Overrides {
                threshold,
                context_window,
            };
            let updated = settings::apply(flags, config_file)?;
            if save {
                let path = config_file::save_config(&updated).map_err(anyhow::Error::msg)?;
                eprintln!("Saved config to {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&updated)?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve settings, open the output, and hand both to `body`.
fn run<F>(
    common: &CommonArgs,
    config_file: &ConfigFile,
    fallback_threshold: Option<f64>,
    body: F,
) -> anyhow::Result<()>
where
    F: FnOnce(
        &Path,
        &AssignmentExtractor,
        &mut dyn Write,
        OutputFormat,
        ColorMode,
    ) -> anyhow::Result<()>,
{
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let flags = Overrides {
        threshold: common.threshold,
        context_window: common.context_window,
    };
    let env = settings::env_overrides(|name| std::env::var(name).ok());
    let config = settings::resolve(flags.or(env), config_file, fallback_threshold)?;
    let extractor = AssignmentExtractor::with_config(config);

    let format = common
        .format
        .or_else(|| OutputFormat::from_config(config_file))
        .unwrap_or(OutputFormat::Json);

    // Determine color mode and output writer
    let color_allowed = config_file
        .display
        .as_ref()
        .and_then(|d| d.color)
        .unwrap_or(true);
    let color = ColorMode(!common.no_color && common.output.is_none() && color_allowed);

    if !common.file_path.exists() {
        anyhow::bail!("File not found: {}", common.file_path.display());
    }

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = common.output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    body(&common.file_path, &extractor, writer.as_mut(), format, color)?;
    writer.flush()?;
    Ok(())
}

fn write_json<T: serde::Serialize>(w: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
