//! CodeMeta CLI: extract namespace/class/method metadata from a source tree.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use codemeta_core::config::{AnalysisConfig, AnalysisResult};
use codemeta_core::output::{modules_json, write_output};
use codemeta_core::pipeline;
use codemeta_core::AnalysisError;

#[derive(Parser)]
#[command(
    name = "codemeta",
    version,
    about = "CodeMeta - Extract structural metadata and modules from a source tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a source tree written in one language
    Analyze {
        /// Language identifier: java, kotlin, php or python
        language: String,

        /// Root folder of the source tree
        path: PathBuf,

        /// Root namespace handed to the reference resolver
        #[arg(long, default_value = "")]
        root_namespace: String,

        /// Output JSON file path for the namespace metadata
        #[arg(short, long)]
        output: Option<String>,

        /// Also write the module partition to this JSON file
        #[arg(long)]
        modules_output: Option<String>,

        /// Directory or file names to exclude (nothing is excluded by default)
        #[arg(long)]
        exclude: Vec<String>,

        /// Skip files larger than this many bytes
        #[arg(long)]
        max_file_size: Option<u64>,

        /// Louvain resolution parameter
        #[arg(long, default_value = "1.0")]
        resolution: f64,

        /// Parse files on a single thread
        #[arg(long)]
        no_parallel: bool,

        /// Show per-phase timing breakdown
        #[arg(long)]
        verbose: bool,

        /// Suppress all output except errors
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            language,
            path,
            root_namespace,
            output,
            modules_output,
            exclude,
            max_file_size,
            resolution,
            no_parallel,
            verbose,
            quiet,
        } => {
            init_logging(verbose, quiet);

            let root = path.canonicalize().unwrap_or(path);
            let root_name = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "source".to_string());
            let output_path = output.unwrap_or_else(|| format!("{root_name}.codemeta.json"));

            let config = AnalysisConfig {
                language,
                root_folder: root.to_string_lossy().to_string(),
                root_namespace,
                output_path: Some(output_path),
                modules_output_path: modules_output,
                exclude_patterns: exclude,
                max_file_size,
                resolution,
                parallel: !no_parallel,
                verbose,
                quiet,
                ..Default::default()
            };

            let outcome = if quiet {
                pipeline::run_pipeline(&config, None).and_then(|result| write_results(&config, &result))
            } else {
                run_with_progress(&config)
            };

            match outcome {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{} {e}", style("Analysis failed:").red().bold());
                    e.exit_code()
                }
            }
        }
    }
}

/// Route the core's `log` records to stderr.
fn init_logging(verbose: bool, quiet: bool) {
    let default_directive = if quiet {
        "warn"
    } else if verbose {
        "codemeta_core=debug"
    } else {
        "codemeta_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_results(config: &AnalysisConfig, result: &AnalysisResult) -> Result<(), AnalysisError> {
    if let Some(path) = &config.output_path {
        write_output(&result.namespaces, path)?;
    }
    if let Some(path) = &config.modules_output_path {
        write_output(&modules_json(&result.modules), path)?;
    }
    Ok(())
}

fn run_with_progress(config: &AnalysisConfig) -> Result<(), AnalysisError> {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(spinner.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message("Initialising...");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let progress: pipeline::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |_name, label| {
            pb.set_message(label.to_string());
        })
    };

    let start = Instant::now();
    let result = pipeline::run_pipeline(config, Some(progress));
    pb.finish_and_clear();
    let result = result?;

    print_summary(config, &result, start);
    write_results(config, &result)?;

    if let Some(path) = &config.output_path {
        println!("\n  {} {}", style("Metadata written to:").green(), path);
    }
    if let Some(path) = &config.modules_output_path {
        println!("  {} {}", style("Modules written to:").green(), path);
    }
    Ok(())
}

fn print_summary(config: &AnalysisConfig, result: &AnalysisResult, start: Instant) {
    println!(
        "\n{}  CodeMeta Analysis: {} ({})",
        style("✓").green().bold(),
        style(
            Path::new(&config.root_folder)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        )
        .bold(),
        config.language
    );

    let zero = serde_json::json!(0);
    for (label, key) in [
        ("Files:", "files"),
        ("Namespaces:", "namespaces"),
        ("Classes:", "classes"),
        ("Methods:", "methods"),
        ("Invocations:", "invocations"),
        ("Modules:", "modules"),
    ] {
        println!("  {:<14} {}", label, result.stats.get(key).unwrap_or(&zero));
    }
    println!("  {:<14} {:.4}", "Modularity:", result.modules.modularity);
    println!(
        "  {:<14} {:.1}ms",
        "Duration:",
        start.elapsed().as_secs_f64() * 1000.0
    );

    if config.verbose {
        if let Some(serde_json::Value::Object(timings)) = result.metadata.get("phase_timings") {
            println!("\n  Phase Timings:");
            for (phase, secs) in timings {
                if let Some(val) = secs.as_f64() {
                    println!("    {:<14} {:.1}ms", phase, val * 1000.0);
                }
            }
        }
    }
}
