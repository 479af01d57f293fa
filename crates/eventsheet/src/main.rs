//! Event Sheet Runner
//!
//! Loads an event sheet project, runs its scenes headlessly and checks their
//! events against the instruction registry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use event_runtime::{InstructionRegistry, Runtime};
use eventsheet::project::{Project, ProjectLoader};

/// Headless event sheet runner
#[derive(Parser, Debug)]
#[command(name = "eventsheet")]
#[command(about = "Run and check event sheet projects", long_about = None)]
struct Args {
    /// Path to the project directory
    #[arg(short, long, default_value = "./project")]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scene and print its variables
    Run {
        /// Scene to run (defaults to the project's first scene)
        #[arg(long)]
        scene: Option<String>,

        /// Number of steps (defaults to the project's runtime.steps)
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Validate every scene against the instruction registry
    Check,
    /// List the function events of every scene
    Functions,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eventsheet=info,event_runtime=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    info!("Starting eventsheet v{}", env!("CARGO_PKG_VERSION"));

    let project = ProjectLoader::load(&args.project)
        .await
        .with_context(|| format!("Failed to load project from {}", args.project.display()))?;
    info!("Loaded project: {} ({})", project.name(), project.id());

    let registry = Arc::new(InstructionRegistry::with_builtins());

    match args.command {
        Command::Run { scene, steps } => run_scene(&project, registry, scene.as_deref(), steps),
        Command::Check => check_scenes(&project, &registry),
        Command::Functions => {
            list_functions(&project);
            Ok(())
        }
    }
}

fn run_scene(
    project: &Project,
    registry: Arc<InstructionRegistry>,
    scene: Option<&str>,
    steps: Option<u32>,
) -> Result<()> {
    let layout = match scene {
        Some(name) => project
            .get_scene(name)
            .ok_or_else(|| anyhow!("Scene not found: {}", name))?,
        None => project
            .first_scene()
            .ok_or_else(|| anyhow!("Project has no scene to run"))?,
    };
    let steps = steps.unwrap_or(project.manifest.runtime.steps);

    let mut runtime = Runtime::new(registry).with_time_step(project.manifest.runtime.time_step);
    let id = runtime.start_scene(layout);
    for _ in 0..steps {
        runtime
            .step(id)
            .with_context(|| format!("Scene {} failed", layout.name))?;
    }

    let scene = runtime
        .stop_scene(id)
        .ok_or_else(|| anyhow!("Scene {} vanished", layout.name))?;
    info!(
        "Ran {} for {} steps ({:.3}s, {} objects)",
        layout.name,
        scene.step_count(),
        scene.elapsed(),
        scene.objects.len()
    );
    println!("{}", serde_json::to_string_pretty(&scene.variables)?);
    Ok(())
}

fn check_scenes(project: &Project, registry: &InstructionRegistry) -> Result<()> {
    let mut failures = 0;
    for (name, layout) in &project.scenes {
        let errors = registry.validate_events(&layout.events);
        if errors.is_empty() {
            println!("{}: ok ({} events)", name, layout.events.count_events());
            continue;
        }
        for e in &errors {
            println!("{}: {}", name, e);
        }
        failures += errors.len();
    }

    if failures > 0 {
        bail!("{} problems found", failures);
    }
    Ok(())
}

fn list_functions(project: &Project) {
    for (name, layout) in &project.scenes {
        for (function, symbol) in layout.function_symbols() {
            println!("{}\t{}\t{}", name, function, symbol);
        }
    }
}
