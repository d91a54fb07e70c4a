use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use stills::{
    ExternalTools, ExtractionReport, ExtractionRequest, FfmpegLogLevel, ProgressCallback,
    ProgressInfo, StillsError, StrategyChoice, StrategySelector,
};

const CLI_AFTER_HELP: &str = "Examples:\n  stills IMG_0343.MOV frames_IMG_0343 --interval 1\n  stills IMG_0343.MOV frames_2sec --interval 2 --start 5 --end 15\n  stills clip.mp4 frames --strategy tool --strict\n  stills --completions zsh > _stills";

#[derive(Debug, Parser)]
#[command(
    name = "stills",
    version,
    about = "Extract still frames every N seconds from a video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the input video (e.g. IMG_0343.MOV).
    #[arg(required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output directory for frames (created if missing).
    #[arg(required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Seconds between frames.
    #[arg(long, default_value_t = 1.0)]
    interval: f64,

    /// Start time in seconds.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    start: f64,

    /// End time in seconds (default: end of the video).
    #[arg(long, allow_negative_numbers = true)]
    end: Option<f64>,

    /// JPEG quality 1-100.
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Overwrite existing frames.
    #[arg(long)]
    overwrite: bool,

    /// Extraction strategy (auto, library, tool).
    #[arg(long, default_value = "auto")]
    strategy: StrategyChoice,

    /// Exit with status 1 when the ffmpeg fallback fails instead of
    /// reporting 0 extracted frames.
    #[arg(long)]
    strict: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg library log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    log_level: FfmpegLogLevel,

    /// The ffmpeg binary used by the fallback strategy.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// The ffprobe binary used to read the video duration.
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            let label = match record.level() {
                log::Level::Error => "error:".red().bold(),
                log::Level::Warn => "warning:".yellow().bold(),
                log::Level::Info => "info:".green().bold(),
                log::Level::Debug | log::Level::Trace => "debug:".dimmed(),
            };
            out.finish(format_args!("{label} {message}"))
        })
        .chain(std::io::stderr())
        .apply()
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new_spinner();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        let verb = if info.skipped { "kept" } else { "saved" };
        self.bar.set_message(format!("{verb} {:.1}s", info.instant));
    }
}

fn build_request(cli: &Cli, input: &Path, output: &Path) -> ExtractionRequest {
    ExtractionRequest::new(input, output)
        .with_interval(cli.interval)
        .with_start(cli.start)
        .with_end(cli.end)
        .with_quality(cli.quality)
        .with_overwrite(cli.overwrite)
        .with_tools(ExternalTools {
            ffmpeg: cli.ffmpeg.clone(),
            ffprobe: cli.ffprobe.clone(),
        })
}

fn print_report(report: &ExtractionReport, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let payload = json!({
            "extracted": report.extracted,
            "output": report.output.display().to_string(),
            "strategy": report.strategy,
            "error": report.failure.as_ref().map(|error| error.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let summary = format!(
        "Extracted {} frame(s) to {}",
        report.extracted,
        report.output.display()
    );
    if report.is_success() {
        println!("{} {}", "success:".green().bold(), summary.green());
    } else {
        println!("{} {}", "warning:".yellow().bold(), summary.yellow());
    }
    Ok(())
}

fn run() -> Result<i32, Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "stills", &mut std::io::stdout());
        return Ok(0);
    }

    let input = cli.input.as_deref().ok_or("missing <INPUT>")?;
    let output = cli.output.as_deref().ok_or("missing <OUTPUT>")?;

    if !input.exists() {
        let error = StillsError::InputNotFound(input.to_path_buf());
        eprintln!("{} {error}", "error:".red().bold());
        return Ok(1);
    }

    stills::set_ffmpeg_log_level(cli.log_level);

    let mut request = build_request(&cli, input, output);
    let progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        request = request.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let selector = StrategySelector::for_choice(cli.strategy);
    log::debug!("Strategies: {}", selector.strategy_names().join(" -> "));
    let result = selector.run(&request);

    if let Some(progress) = progress {
        progress.bar.finish_and_clear();
    }

    let report = result?;
    print_report(&report, cli.json)?;
    Ok(report.exit_code(cli.strict))
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
