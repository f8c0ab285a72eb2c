//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use qastruct_core::{
    BatchReport, FileOutcome, FileReport, HandoffReport, PipelineReport, ProgressReporter, RunStamp,
    RunStatus,
};
use qastruct_shared::{AppConfig, BatchConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// QaStruct: structure marker-annotated meeting transcripts.
#[derive(Parser)]
#[command(
    name = "qastruct",
    version,
    about = "Structure marker-annotated transcripts into Q/A records and split them by department.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.qastruct/qastruct.toml).
    #[arg(long, global = true, env = "QASTRUCT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print batch reports as JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Directory overrides shared by the batch stages.
#[derive(Args, Debug)]
pub(crate) struct StageArgs {
    /// Input directory (overrides the config file).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output directory (overrides the config file).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Leave processed inputs in place instead of moving them to done/.
    #[arg(long)]
    pub no_move: bool,
}

impl StageArgs {
    fn apply(&self, mut config: BatchConfig) -> BatchConfig {
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.no_move {
            config.move_done = false;
        }
        config
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Structure every transcript in the input directory.
    Structure(StageArgs),

    /// Copy structured documents into the department input directory.
    Handoff,

    /// Split structured documents by department.
    Split(StageArgs),

    /// Structure, hand off and split in one run.
    Run,

    /// Validate one file and print its violations or its structured form.
    Check {
        /// File to check.
        file: PathBuf,

        /// File name used for the date prefix (defaults to FILE's name).
        #[arg(long)]
        name: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Command {
    /// Commands that write a per-run log file.
    fn is_batch(&self) -> bool {
        matches!(
            self,
            Command::Structure(_) | Command::Handoff | Command::Split(_) | Command::Run
        )
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags, plus a plain-text log file when given.
pub(crate) fn init_tracing(cli: &Cli, log_file: Option<std::fs::File>) {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let filter = match cli.verbose {
        0 => "qastruct=info",
        1 => "qastruct=debug",
        _ => "qastruct=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let console = match cli.log_format {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    let file = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .boxed()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();
}

/// Per-run log file for batch commands. An empty `log_dir` disables it.
fn log_file_for(command: &Command, log_dir: &Path, stamp: &RunStamp) -> Result<Option<std::fs::File>> {
    if !command.is_batch() || log_dir.as_os_str().is_empty() {
        return Ok(None);
    }
    open_log_file(log_dir, stamp).map(Some)
}

/// `{log_dir}/qastruct_{stamp}.log`
fn open_log_file(log_dir: &Path, stamp: &RunStamp) -> Result<std::fs::File> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("cannot create log directory {}", log_dir.display()))?;
    let path = log_dir.join(format!("qastruct_{stamp}.log"));
    std::fs::File::create(&path).wrap_err_with(|| format!("cannot create log file {}", path.display()))
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command, returning the process exit code.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let stamp = RunStamp::now();

    let log_file = log_file_for(&cli.command, &config.paths.log_dir, &stamp)?;
    init_tracing(&cli, log_file);

    let json = cli.json;
    let status = match cli.command {
        Command::Structure(args) => {
            let batch = args.apply(BatchConfig::structure(&config));
            cmd_structure(&batch, &stamp, json).await?
        }
        Command::Handoff => cmd_handoff(&config, json)?,
        Command::Split(args) => {
            let batch = args.apply(BatchConfig::department(&config));
            cmd_split(&batch, &stamp, json).await?
        }
        Command::Run => cmd_run(&config, &stamp, json).await?,
        Command::Check { file, name } => cmd_check(&file, name.as_deref())?,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init()?,
            ConfigAction::Show => cmd_config_show(&config)?,
        },
    };

    Ok(ExitCode::from(status.exit_code()))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_structure(config: &BatchConfig, stamp: &RunStamp, json: bool) -> Result<RunStatus> {
    info!(input = %config.input_dir.display(), %stamp, "structuring");
    let reporter = CliProgress::new();
    let report = qastruct_core::run_structure(config, stamp, &reporter).await;
    reporter.finish();

    let report = report?;
    emit_batch(&report, json)?;
    Ok(report.status())
}

fn cmd_handoff(config: &AppConfig, json: bool) -> Result<RunStatus> {
    let department = BatchConfig::department(config);
    let report = qastruct_core::handoff(
        &config.paths.structure_output,
        &department.input_dir,
        &department.extension,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_handoff(&report);
    }

    Ok(if report.warnings.is_empty() {
        RunStatus::Clean
    } else {
        RunStatus::CompletedWithIssues
    })
}

async fn cmd_split(config: &BatchConfig, stamp: &RunStamp, json: bool) -> Result<RunStatus> {
    info!(input = %config.input_dir.display(), %stamp, "splitting by department");
    let reporter = CliProgress::new();
    let report = qastruct_core::run_departments(config, stamp, &reporter).await;
    reporter.finish();

    let report = report?;
    emit_batch(&report, json)?;
    Ok(report.status())
}

async fn cmd_run(config: &AppConfig, stamp: &RunStamp, json: bool) -> Result<RunStatus> {
    let structure = BatchConfig::structure(config);
    let department = BatchConfig::department(config);

    info!(%stamp, "starting run");
    let reporter = CliProgress::new();
    let report = qastruct_core::run_pipeline(&structure, &department, stamp, &reporter).await;
    reporter.finish();

    let report = report?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_pipeline(&report);
    }
    Ok(report.status())
}

fn cmd_check(file: &Path, name: Option<&str>) -> Result<RunStatus> {
    let text = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("cannot read {}", file.display()))?;
    let name = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| eyre!("not a file path: {}", file.display()))?,
    };

    let violations = qastruct_structure::check(&text);
    if !violations.is_empty() {
        println!("{}: {} violation(s)", file.display(), violations.len());
        for violation in &violations {
            println!("  - {violation}");
        }
        return Ok(RunStatus::CompletedWithIssues);
    }

    match qastruct_structure::transform(&text, &name) {
        Ok(structured) => {
            print!("{}", structured.text);
            Ok(RunStatus::Clean)
        }
        Err(e) => {
            print!("{}", qastruct_structure::render_diagnostic(&e));
            Ok(RunStatus::CompletedWithIssues)
        }
    }
}

fn cmd_config_init() -> Result<RunStatus> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(RunStatus::Clean)
}

fn cmd_config_show(config: &AppConfig) -> Result<RunStatus> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(RunStatus::Clean)
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

fn emit_batch(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_batch(report);
    }
    Ok(())
}

fn print_batch(report: &BatchReport) {
    println!();
    println!("  Stage:     {}", report.stage);
    println!("  Run:       {}", report.stamp);
    println!("  Files:     {}", report.files.len());
    println!("  Succeeded: {}", report.succeeded());
    println!("  Failed:    {}", report.failed());
    println!("  Warnings:  {}", report.warnings());
    if report.totals.parents > 0 {
        println!(
            "  Records:   {} ({} follow-ups)",
            report.totals.parents, report.totals.follow_ups
        );
    }
    for file in report.files.iter().filter(|f| !f.is_success()) {
        if let FileOutcome::Failed { reason, diagnostic } = &file.outcome {
            println!("  ✗ {}: {reason}", file.name());
            if let Some(path) = diagnostic {
                println!("      see {}", path.display());
            }
        }
    }
    println!();
}

fn print_handoff(report: &HandoffReport) {
    println!(
        "  Handed off {} file(s), left {} diagnostic(s) in place.",
        report.copied.len(),
        report.skipped.len()
    );
    for warning in &report.warnings {
        println!("  ! {warning}");
    }
}

fn print_pipeline(report: &PipelineReport) {
    print_batch(&report.structure);
    print_handoff(&report.handoff);
    match &report.department {
        Some(department) => print_batch(department),
        None => println!("  Nothing to split.\n"),
    }
    println!("  Time: {:.1}s", report.elapsed.as_secs_f64());
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_started(&self, name: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("[{current}/{total}] {name}"));
    }

    fn file_finished(&self, report: &FileReport) {
        if let FileOutcome::Failed { reason, .. } = &report.outcome {
            self.spinner.println(format!("  ✗ {}: {reason}", report.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn stage_flags_override_config() {
        let cli = Cli::try_parse_from([
            "qastruct", "-vv", "--json", "structure", "--input", "in", "--no-move",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);

        let Command::Structure(args) = cli.command else {
            panic!("expected structure command");
        };
        let batch = args.apply(BatchConfig::structure(&AppConfig::default()));
        assert_eq!(batch.input_dir, PathBuf::from("in"));
        assert_eq!(batch.output_dir, AppConfig::default().paths.structure_output);
        assert!(!batch.move_done);
    }

    #[test]
    fn check_takes_a_name_override() {
        let cli = Cli::try_parse_from(["qastruct", "check", "doc.txt", "--name", "240115_doc.txt"]).unwrap();
        assert!(!cli.command.is_batch());
        let Command::Check { file, name } = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(file, PathBuf::from("doc.txt"));
        assert_eq!(name.as_deref(), Some("240115_doc.txt"));
    }

    #[test]
    fn empty_log_dir_disables_the_log_file() {
        let stamp = RunStamp::now();
        assert!(log_file_for(&Command::Run, Path::new(""), &stamp).unwrap().is_none());
        assert!(!Path::new(&format!("qastruct_{stamp}.log")).exists());

        let dir = std::env::temp_dir().join(format!("qastruct-logs-{}", std::process::id()));
        assert!(log_file_for(&Command::Run, &dir, &stamp).unwrap().is_some());
        assert!(dir.join(format!("qastruct_{stamp}.log")).exists());

        let check = Command::Check {
            file: PathBuf::from("doc.txt"),
            name: None,
        };
        assert!(log_file_for(&check, &dir, &stamp).unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn check_reports_violations_as_issues() {
        let tmp = std::env::temp_dir().join(format!("qastruct-check-{}.txt", std::process::id()));
        std::fs::write(&tmp, "no markers here\n").unwrap();
        let status = cmd_check(&tmp, Some("240115_x.txt")).unwrap();
        assert_eq!(status, RunStatus::CompletedWithIssues);
        let _ = std::fs::remove_file(&tmp);
    }
}
