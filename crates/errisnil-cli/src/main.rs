use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use errisnil_core::config::{self, Config};
use errisnil_core::orchestrator;
use errisnil_diagnostics::rules;

#[derive(Parser)]
#[command(name = "errisnil")]
#[command(about = "Finds uses of Go error variables that are already known to be nil")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check SSA IR JSON files produced by the Go bridge
    Check {
        /// IR JSON files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
        /// Severity threshold: info, warning, error, critical
        #[arg(long, value_parser = ["info", "warning", "error", "critical"])]
        severity: Option<String>,
        /// Max diagnostics to report (0 = unlimited)
        #[arg(long)]
        max_diagnostics: Option<usize>,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Explain a rule in detail
    Explain {
        /// Rule code (e.g., ERRNIL001)
        rule: String,
    },
    /// Write a default errisnil.toml in the current directory
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Json,
    Sarif,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to stderr so stdout stays clean for machine output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Check {
            files,
            format,
            severity,
            max_diagnostics,
            no_color,
        } => run_check(CheckArgs {
            files,
            format,
            severity_override: severity,
            max_diagnostics,
            no_color,
        }),
        Commands::Explain { rule } => run_explain(&rule),
        Commands::Init => run_init(),
    }
}

struct CheckArgs {
    files: Vec<PathBuf>,
    format: Format,
    severity_override: Option<String>,
    max_diagnostics: Option<usize>,
    no_color: bool,
}

fn run_check(args: CheckArgs) -> ExitCode {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config: Config = config::load_config(&cwd);

    if let Some(sev) = args.severity_override {
        config.errisnil.severity_threshold = sev;
    }
    if let Some(max) = args.max_diagnostics {
        config.errisnil.max_diagnostics = max;
    }

    tracing::debug!(
        files = args.files.len(),
        threshold = %config.errisnil.severity_threshold,
        max_diagnostics = config.errisnil.max_diagnostics,
        "running check"
    );

    let output = match orchestrator::analyze_files(&args.files, &config) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    for failure in &output.failures {
        eprintln!("warning: {failure}");
    }

    let rendered = match args.format {
        Format::Json => errisnil_diagnostics::to_json(&output.diagnostics),
        Format::Sarif => {
            errisnil_diagnostics::sarif::to_sarif(&output.diagnostics, env!("CARGO_PKG_VERSION"))
        }
        Format::Human => Ok(errisnil_diagnostics::human::format_human(
            &output.diagnostics,
            !args.no_color,
        )),
    };
    match rendered {
        Ok(text) if text.ends_with('\n') => print!("{text}"),
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    }

    // Exit code: 0 clean, 1 issues found
    if output.summary.total > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_explain(rule: &str) -> ExitCode {
    let Some(info) = rules::get_rule(rule) else {
        let known: Vec<String> = rules::get_all_rules().into_iter().map(|r| r.code).collect();
        eprintln!("Unknown rule: {rule}. Known rules: {}", known.join(", "));
        return ExitCode::from(2);
    };

    let mut text = format!(
        "{}: {}\n\nSeverity: {}\nConfig: [rules.{}]\n\n{}\n",
        info.code, info.title, info.severity, info.name, info.description
    );
    if let Some(bad) = &info.example_bad {
        text.push_str(&format!("\nExample:\n{}\n", indent(bad)));
    }
    if let Some(good) = &info.example_good {
        text.push_str(&format!("\nFix:\n{}\n", indent(good)));
    }
    text.push_str(&format!("\n{}", rules::ANALYZER_DOC));
    print!("{text}");
    ExitCode::SUCCESS
}

fn indent(code: &str) -> String {
    code.lines()
        .map(|l| format!("  {}", l.replace('\t', "    ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn run_init() -> ExitCode {
    let config_path = config::CONFIG_FILE_NAME;
    if std::path::Path::new(config_path).exists() {
        eprintln!("{config_path} already exists");
        return ExitCode::from(2);
    }

    match std::fs::write(config_path, config::DEFAULT_CONFIG_TOML) {
        Ok(()) => {
            println!("Created {config_path}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
