mod commands;
mod error;
mod scene_json;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

const DEFAULT_BENCHMARK_SCENE: &str = "data/benchmark.json";

/// Distributed path-traced image renderer.
#[derive(Parser, Debug)]
#[command(name = "raybun", version, about = "Distributed path-traced image renderer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an HTTP master server that hands out tiles to local and remote workers.
    Master {
        port: u16,
        scene: PathBuf,
        #[arg(default_value = "output.ppm")]
        output: PathBuf,
    },
    /// Connect to a master and render tiles it assigns.
    Worker {
        master_url: String,
        device_id: Option<String>,
    },
    /// Render a scene locally with no HTTP distribution.
    Standalone {
        scene: PathBuf,
        #[arg(default_value = "output.ppm")]
        output: PathBuf,
    },
    /// Report this machine's perf score, optionally timing a real render.
    Benchmark { scene: Option<PathBuf> },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Master { port, scene, output } => commands::master::run(port, &scene, &output),
        Command::Worker { master_url, device_id } => commands::worker::run(&master_url, device_id),
        Command::Standalone { scene, output } => commands::standalone::run(&scene, &output),
        Command::Benchmark { scene } => {
            let scene = scene.unwrap_or_else(|| PathBuf::from(DEFAULT_BENCHMARK_SCENE));
            commands::benchmark::run(Some(&scene))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
