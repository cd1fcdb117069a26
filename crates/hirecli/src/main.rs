// crates/hirecli/src/main.rs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hirecore::{ExecutionEvent, Node, NodeEvent, Payload, Severity, Workflow};
use hirenodes::{MistralClient, Services, ServicesConfig};
use hireruntime::{HireRuntime, RunnerConfig, RuntimeConfig};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hire")]
#[command(about = "Recruiting workflow CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Initial payload as a JSON object
        #[arg(short, long)]
        input: Option<String>,

        /// Maximum number of node executions
        #[arg(long)]
        max_steps: Option<usize>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create an example screening workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            file,
            input,
            max_steps,
            ..
        } => run_workflow(&file, input.as_deref(), max_steps).await,
        Commands::Validate { file } => validate_workflow(&file),
        Commands::Nodes => list_nodes(),
        Commands::Init { output } => create_example_workflow(&output),
    }
}

fn load_workflow(file: &Path) -> Result<Workflow> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a valid workflow", file.display()))
}

/// Services that need no network: in-memory counter, plus the AI client when configured
fn offline_services(config: &ServicesConfig) -> Result<Services> {
    let mut services = Services::in_memory();
    if let Some(mistral) = &config.mistral {
        services = services.with_completion(Arc::new(MistralClient::new(mistral.clone())?));
    }
    Ok(services)
}

async fn run_workflow(file: &Path, input: Option<&str>, max_steps: Option<usize>) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow = load_workflow(file)?;
    println!("📋 Workflow: {}", workflow.name.as_deref().unwrap_or(&workflow.id));
    println!("   Nodes: {}", workflow.nodes().len());
    println!("   Edges: {}", workflow.edges().len());
    println!();

    let payload = match input {
        Some(text) => Payload::from_json(serde_json::from_str(text)?)
            .context("input must be a JSON object")?,
        None => Payload::new(),
    };
    tracing::debug!(keys = payload.len(), "Initial payload parsed");

    let services = Services::from_config(&ServicesConfig::from_env()).await?;
    let mut runner = RunnerConfig::default();
    if let Some(limit) = max_steps {
        runner.max_steps = limit;
    }
    let runtime = HireRuntime::with_registry(
        Arc::new(hirenodes::default_registry(&services)),
        RuntimeConfig {
            runner,
            ..RuntimeConfig::default()
        },
    );

    runtime.preflight(&workflow)?;

    let mut events = runtime.subscribe_events();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::RunStarted { run_id, .. } => {
                    println!("▶️  Run {} started", run_id);
                }
                ExecutionEvent::NodeStarted { node_id, node_type, .. } => {
                    println!("  ⚡ Node {} ({})", node_id, node_type);
                }
                ExecutionEvent::NodeCompleted {
                    node_id,
                    branch,
                    duration_ms,
                    ..
                } => match branch {
                    Some(taken) => println!("  ✅ Node {} chose {} in {}ms", node_id, taken, duration_ms),
                    None => println!("  ✅ Node {} completed in {}ms", node_id, duration_ms),
                },
                ExecutionEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ❌ Node {} failed: {}", node_id, error);
                }
                ExecutionEvent::NodeEvent { node_id, event, .. } => match event {
                    NodeEvent::Info { message } => println!("     ℹ️  [{}] {}", node_id, message),
                    NodeEvent::Warning { message } => println!("     ⚠️  [{}] {}", node_id, message),
                },
                ExecutionEvent::RunCompleted {
                    success,
                    steps,
                    duration_ms,
                    ..
                } => {
                    if success {
                        println!("✨ Run completed: {} steps in {}ms", steps, duration_ms);
                    } else {
                        println!("💥 Run failed after {} steps ({}ms)", steps, duration_ms);
                    }
                    break;
                }
            }
        }
    });

    let result = runtime.execute(&workflow, payload).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), printer).await;
    let outcome = result?;

    println!();
    println!("📊 Execution Summary:");
    println!("   Run ID: {}", outcome.run_id);
    println!("   Visited: {}", outcome.visited.join(" → "));

    if !outcome.warnings.is_empty() {
        println!();
        println!("⚠️  Warnings:");
        for warning in &outcome.warnings {
            println!("   [{}] {}", warning.node_id, warning.message);
        }
    }

    println!();
    println!("📤 Final payload:");
    println!("{}", serde_json::to_string_pretty(&outcome.payload)?);

    Ok(())
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    let report = workflow.validate();

    for issue in &report.issues {
        let marker = match issue.severity {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
        };
        println!("   {} {}", marker, issue.message);
    }

    let services = offline_services(&ServicesConfig::from_env())?;
    let runtime = HireRuntime::with_registry(
        Arc::new(hirenodes::default_registry(&services)),
        RuntimeConfig::default(),
    );
    let preflight = runtime.preflight(&workflow);
    if let Err(e) = &preflight {
        println!("   ❌ {}", e);
    }

    let errors = report.errors().count() + usize::from(preflight.is_err());
    if errors > 0 {
        bail!("workflow {} has {} error(s)", workflow.id, errors);
    }

    println!("✅ Workflow is valid:");
    println!("   Nodes: {}", workflow.nodes().len());
    println!("   Edges: {}", workflow.edges().len());

    Ok(())
}

fn list_nodes() -> Result<()> {
    println!("📦 Available Node Types:");
    println!();

    let config = ServicesConfig::from_env();
    let registry = hirenodes::default_registry(&offline_services(&config)?);

    for node_type in registry.list_node_types() {
        if let Some(metadata) = registry.get_metadata(&node_type) {
            println!("  • {} ({})", node_type, metadata.category);
            println!("    {}", metadata.description);
        } else {
            println!("  • {}", node_type);
        }
    }

    if config.mistral.is_none() {
        println!();
        println!("  invokeAI is unavailable until MISTRAL_API_KEY is set");
    }

    Ok(())
}

fn create_example_workflow(output: &Path) -> Result<()> {
    let mut workflow = Workflow::new("screening").with_name("Screen incoming resumes");

    workflow.add_node(Node::new("1", "newCandidate", json!({}))?.with_position(100.0, 100.0));
    workflow.add_node(
        Node::new(
            "2",
            "analyzeResume",
            json!({ "job_requirements": "Rust, PostgreSQL, Docker" }),
        )?
        .with_position(300.0, 100.0),
    );
    workflow.add_node(
        Node::new("3", "condition", json!({ "conditionType": "matchScoreAbove", "threshold": 80 }))?
            .with_position(500.0, 100.0),
    );
    workflow.add_node(
        Node::new(
            "4",
            "sendCommunication",
            json!({ "message": "Hi {{name}}, we'd love to talk about the role", "channel": "email" }),
        )?
        .with_position(700.0, 0.0),
    );
    workflow.add_node(
        Node::new(
            "5",
            "sendCommunication",
            json!({ "message": "Hi {{name}}, thanks for applying", "channel": "email" }),
        )?
        .with_position(700.0, 200.0),
    );

    workflow.connect("1", "2");
    workflow.connect("2", "3");
    workflow.connect_branch("3", true, "4");
    workflow.connect_branch("3", false, "5");

    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!(
        "  hire run --file {} --input '{{\"name\": \"Ada\", \"resume\": \"6 years of Rust and PostgreSQL\"}}'",
        output.display()
    );

    Ok(())
}
