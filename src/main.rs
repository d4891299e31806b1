use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};
use macslang::cli::{generate_completions, Args, Commands};
use macslang::config::AppConfig;
use macslang::diagnostic::render_diagnostics;
use macslang::interpreter;
use owo_colors::OwoColorize;
use std::path::Path;

/// Writes `[macslang:<level>] message` lines to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("macslang")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = match record.level() {
                Level::Error => "error",
                Level::Warn => "warn",
                Level::Info => "info",
                Level::Debug => "debug",
                Level::Trace => "trace",
            };
            eprintln!("[macslang:{}] {}", level, record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            std::process::exit(code);
        }
    };

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    init_logging(&config);

    let Some(path) = args.file.as_deref() else {
        error_message(&config, "No program file given");
        std::process::exit(1);
    };

    let source = match read_file(path) {
        Ok(source) => source,
        Err(e) => {
            error_message(&config, &e);
            std::process::exit(1);
        }
    };
    log::debug!("read {} bytes from {}", source.len(), path.display());

    let file_name = path.display().to_string();
    if let Err(diagnostics) = interpreter::parse_and_run_with_diagnostics(&source, config.limits) {
        eprint!(
            "{}",
            render_diagnostics(&source, &file_name, &diagnostics, config.color_enabled)
        );
        std::process::exit(1);
    }
}

fn init_logging(config: &AppConfig) {
    let level = config.log_level();
    if level == LevelFilter::Off {
        return;
    }
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
