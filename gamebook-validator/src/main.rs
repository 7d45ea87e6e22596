mod reports;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use gamebook_content::{ValidationOptions, ValidationResult, WarningPolicy, validate_content};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Debug, Parser)]
#[command(name = "gamebook-validator", version)]
#[command(
    about = "Validate gamebook content: schemas, scene references and reachability"
)]
struct Args {
    /// Content root holding manifest.json, scenes/, items.json and stats.json
    #[arg(long, value_name = "DIR", default_value = "./content")]
    content_path: PathBuf,

    /// Exit with failure when any warning is reported
    #[arg(long)]
    fail_on_warnings: bool,

    /// Emit the validation result as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Directory with manifest/scene/items/stats schema files to use instead
    /// of the bundled schemas
    #[arg(long, value_name = "DIR")]
    schemas: Option<PathBuf>,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> ValidationOptions {
        let options = ValidationOptions::new(&self.content_path);
        match &self.schemas {
            Some(dir) => options.with_schema_dir(dir),
            None => options,
        }
    }

    const fn policy(&self) -> WarningPolicy {
        if self.fail_on_warnings {
            WarningPolicy::Fail
        } else {
            WarningPolicy::Allow
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "❌ Fatal:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn run(args: &Args) -> Result<ExitCode> {
    if !args.json {
        announce_banner(args);
    }

    if let Some(dir) = &args.schemas {
        log::info!("using schemas from {}", dir.display());
    }

    let start_time = Instant::now();
    let result = validate_content(&args.options())
        .await
        .with_context(|| format!("cannot validate {}", args.content_path.display()))?;

    write_report(args, &result, start_time.elapsed())?;

    Ok(exit_code(&result, args.policy()))
}

fn announce_banner(args: &Args) {
    println!("{}", "📖 Gamebook Content Validator".bright_cyan().bold());
    println!("{}", "================================".cyan());
    println!("Content: {}", args.content_path.display());
}

fn exit_code(result: &ValidationResult, policy: WarningPolicy) -> ExitCode {
    if result.passes_with(policy) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn write_report(args: &Args, result: &ValidationResult, duration: Duration) -> Result<()> {
    let mut sink = ReportSink::open(args.output.as_deref())?;
    if !sink.is_terminal_stream() {
        colored::control::set_override(false);
    }

    if args.json {
        reports::generate_json_report(sink.writer(), result)?;
    } else {
        reports::generate_console_report(sink.writer(), result, args.policy(), duration)?;
    }

    sink.finish()
}

/// Destination of the rendered report: buffered stdout, or a file named by
/// `--output`.
struct ReportSink {
    writer: BufWriter<Box<dyn Write>>,
    path: Option<PathBuf>,
}

impl ReportSink {
    fn open(path: Option<&Path>) -> Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(path) => Box::new(
                File::create(path)
                    .with_context(|| format!("failed to create report {}", path.display()))?,
            ),
            None => Box::new(stdout()),
        };
        Ok(Self {
            writer: BufWriter::new(writer),
            path: path.map(Path::to_path_buf),
        })
    }

    /// Colour codes only make sense when the report goes to stdout.
    const fn is_terminal_stream(&self) -> bool {
        self.path.is_none()
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.writer
    }

    fn finish(mut self) -> Result<()> {
        let target = self
            .path
            .as_ref()
            .map_or_else(|| "stdout".to_string(), |path| path.display().to_string());
        self.writer
            .flush()
            .with_context(|| format!("failed to write report to {target}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamebook_content::ReportBuilder;

    fn base_args() -> Args {
        Args {
            content_path: PathBuf::from("./content"),
            fail_on_warnings: false,
            json: false,
            schemas: None,
            output: None,
            verbose: false,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "gamebook-validator-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn warning_only_result() -> ValidationResult {
        let mut builder = ReportBuilder::new();
        builder.warning("Unreachable scenes: sc_3");
        builder.finish()
    }

    #[test]
    fn parses_content_path_with_equals_sign() {
        let args = Args::try_parse_from([
            "gamebook-validator",
            "--content-path=demo/content",
            "--fail-on-warnings",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.content_path, PathBuf::from("demo/content"));
        assert!(args.fail_on_warnings);
        assert!(args.json);
    }

    #[test]
    fn defaults_to_local_content_directory() {
        let args = Args::try_parse_from(["gamebook-validator"]).unwrap();
        assert_eq!(args.content_path, PathBuf::from("./content"));
        assert!(args.schemas.is_none());
        assert_eq!(args.policy(), WarningPolicy::Allow);
    }

    #[test]
    fn short_help_flag_is_recognised() {
        let err = Args::try_parse_from(["gamebook-validator", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn options_carry_schema_directory() {
        let args = Args {
            schemas: Some(PathBuf::from("schemas")),
            ..base_args()
        };
        let options = args.options();
        assert_eq!(options.content_path, PathBuf::from("./content"));
        assert_eq!(options.schema_dir, Some(PathBuf::from("schemas")));
    }

    #[test]
    fn warnings_fail_only_when_escalated() {
        let result = warning_only_result();
        assert_eq!(exit_code(&result, WarningPolicy::Allow), ExitCode::SUCCESS);
        assert_eq!(exit_code(&result, WarningPolicy::Fail), ExitCode::FAILURE);
    }

    #[test]
    fn write_report_emits_json_to_file() {
        let temp = temp_path("report.json");
        let args = Args {
            json: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        write_report(&args, &warning_only_result(), Duration::ZERO).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("\"unreachableScenes\""));
        assert!(content.contains("\"passed\": true"));
    }

    #[test]
    fn write_report_emits_console_text_to_file() {
        let temp = temp_path("report.txt");
        let args = Args {
            output: Some(temp.clone()),
            fail_on_warnings: true,
            ..base_args()
        };
        write_report(&args, &warning_only_result(), Duration::ZERO).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Warnings (1)"));
        assert!(content.contains("warnings treated as failures"));
    }

    #[test]
    fn run_reports_unreadable_content_root() {
        let args = Args {
            content_path: temp_path("absent"),
            json: true,
            ..base_args()
        };
        let err = tokio_test::block_on(run(&args)).unwrap_err();
        assert!(format!("{err:#}").contains("manifest.json"));
    }

    #[test]
    fn stdout_sink_keeps_colour_and_flushes() {
        let mut sink = ReportSink::open(None).unwrap();
        assert!(sink.is_terminal_stream());
        sink.writer().write_all(b"").unwrap();
        sink.finish().unwrap();
    }

    #[test]
    fn report_sink_fails_for_unwritable_path() {
        let missing_dir = temp_path("no-such-dir").join("report.txt");
        let err = ReportSink::open(Some(missing_dir.as_path())).err().unwrap();
        assert!(format!("{err:#}").contains("failed to create report"));
    }
}
