//! SpecGuard CLI - datasheet extraction and IoT plan feasibility from the command line.

mod query;

use clap::{Args, Parser, Subcommand, ValueEnum};
use specguard::config::ProviderKind;
use specguard::datasheets::StoreDiagnostic;
use specguard::feasibility::{device_ids, load_plan, parse_execution_plan, save_plan};
use specguard::{
    AIError, AIRouter, CompletionService, DeviceEstimate, DeviceSpecStore, Extractor,
    FeasibilityOutcome, PipelineConfig, ProtocolTable, ResponseShape, SpecGuardCore,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specguard")]
#[command(about = "IoT datasheet extraction and deployment feasibility tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Pipeline configuration file (JSON); defaults apply when missing
    #[arg(long, global = true, value_name = "FILE", default_value = "specguard.json")]
    config: PathBuf,

    /// Preferred completion provider
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderArg>,

    /// Model name for the preferred provider
    #[arg(long, global = true)]
    model: Option<String>,

    /// Ollama server URL
    #[arg(long, global = true)]
    ollama_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every datasheet to a per-device JSON file (existing files are skipped)
    Convert {
        /// Directory of <device_id>.pdf / <device_id>.txt datasheets
        #[arg(long, value_name = "DIR")]
        datasheet_dir: Option<PathBuf>,

        /// Output directory for <device_id>.json files
        #[arg(long, value_name = "DIR")]
        specs_dir: Option<PathBuf>,

        /// Response shape requested from the model
        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,
    },

    /// Extract devices and modules from a free-form execution plan
    Plan {
        /// Plan description file, or "-" for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Where to write the parsed plan
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build (or load) the combined specification store for the plan's devices
    Build {
        #[arg(long, value_name = "FILE")]
        plan: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        datasheet_dir: Option<PathBuf>,

        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,
    },

    /// Ask for an energy and transmission feasibility verdict on the plan
    Validate {
        #[arg(long, value_name = "FILE")]
        plan: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        datasheet_dir: Option<PathBuf>,

        /// Read per-device JSON files from the specs directory instead of the combined store
        #[arg(long)]
        from_specs_dir: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code when the verdict is not feasible
        #[arg(long)]
        fail_on_infeasible: bool,
    },

    /// Estimate radio energy for one stored device
    Estimate {
        /// Device id as stored
        device: String,

        /// Wireless protocol (e.g. Wi-Fi, BLE, ZigBee, Thread)
        protocol: String,

        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Interactive device lookup: show records or compute energy
    Query {
        #[arg(long, value_name = "FILE")]
        store: Option<PathBuf>,
    },

    /// List known wireless protocol profiles
    Protocols {
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Show which completion provider would be used
    Providers {
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Ollama,
    Claude,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    /// {"Specification": {...}, "notes": [...]}
    Json,
    /// Plain "key: value" lines
    Lines,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl From<ShapeArg> for ResponseShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Json => ResponseShape::Json,
            ShapeArg::Lines => ResponseShape::Lines,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Commands::Convert {
            datasheet_dir,
            specs_dir,
            shape,
        } => {
            let datasheet_dir = datasheet_dir.unwrap_or_else(|| config.datasheet_dir.clone());
            let specs_dir = specs_dir.unwrap_or_else(|| config.specs_dir.clone());
            let shape = shape.map(Into::into).unwrap_or(config.response_shape);
            handle_convert(&config, &datasheet_dir, &specs_dir, shape).await
        }
        Commands::Plan { input, output } => {
            let output = output.unwrap_or_else(|| config.plan_file.clone());
            handle_plan(&config, &input, &output).await
        }
        Commands::Build {
            plan,
            store,
            datasheet_dir,
            shape,
        } => {
            let paths = StorePaths::resolve(&config, plan, store, datasheet_dir);
            let shape = shape.map(Into::into).unwrap_or(config.response_shape);
            handle_build(&config, &paths, shape).await
        }
        Commands::Validate {
            plan,
            store,
            datasheet_dir,
            from_specs_dir,
            format,
            fail_on_infeasible,
        } => {
            let paths = StorePaths::resolve(&config, plan, store, datasheet_dir);
            handle_validate(&config, &paths, from_specs_dir, format, fail_on_infeasible).await
        }
        Commands::Estimate {
            device,
            protocol,
            store,
            format,
        } => {
            let store = store.unwrap_or_else(|| config.store_file.clone());
            handle_estimate(&config, &store, &device, &protocol, format)
        }
        Commands::Query { store } => {
            let store = store.unwrap_or_else(|| config.store_file.clone());
            handle_query(&config, &store)
        }
        Commands::Protocols { format } => handle_protocols(&config, format),
        Commands::Providers { format } => handle_providers(&config, format).await,
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(global: &GlobalArgs) -> Result<PipelineConfig, specguard::SpecGuardError> {
    let mut config = PipelineConfig::load(&global.config)?;
    if let Some(provider) = global.provider {
        config.provider.kind = match provider {
            ProviderArg::Ollama => ProviderKind::Ollama,
            ProviderArg::Claude => ProviderKind::Claude,
        };
    }
    if let Some(ref model) = global.model {
        match config.provider.kind {
            ProviderKind::Ollama => config.provider.ollama_model = model.clone(),
            ProviderKind::Claude => config.provider.claude_model = Some(model.clone()),
        }
    }
    if let Some(ref url) = global.ollama_url {
        config.provider.ollama_url = url.clone();
    }
    tracing::debug!(
        "Provider {} (ollama {} / {})",
        config.provider.kind,
        config.provider.ollama_url,
        config.provider.ollama_model
    );
    Ok(config)
}

fn router(config: &PipelineConfig) -> AIRouter {
    AIRouter::from_config(&config.provider, PipelineConfig::claude_api_key())
}

async fn connect(config: &PipelineConfig) -> Result<Arc<dyn CompletionService>, AIError> {
    router(config).require_provider().await
}

struct StorePaths {
    plan: PathBuf,
    store: PathBuf,
    datasheet_dir: PathBuf,
    specs_dir: PathBuf,
}

impl StorePaths {
    fn resolve(
        config: &PipelineConfig,
        plan: Option<PathBuf>,
        store: Option<PathBuf>,
        datasheet_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            plan: plan.unwrap_or_else(|| config.plan_file.clone()),
            store: store.unwrap_or_else(|| config.store_file.clone()),
            datasheet_dir: datasheet_dir.unwrap_or_else(|| config.datasheet_dir.clone()),
            specs_dir: config.specs_dir.clone(),
        }
    }
}

async fn handle_convert(
    config: &PipelineConfig,
    datasheet_dir: &Path,
    specs_dir: &Path,
    shape: ResponseShape,
) -> i32 {
    let gateway = match connect(config).await {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let extractor = Extractor::new(gateway.as_ref(), shape);

    match SpecGuardCore::convert_datasheets(datasheet_dir, specs_dir, &extractor).await {
        Ok(report) => {
            for path in &report.converted {
                println!("Saved {}", path.display());
            }
            for device in &report.degraded {
                println!("  {}: response was not structured, raw text kept in notes", device);
            }
            println!(
                "\nDone! {} converted, {} skipped.",
                report.converted.len(),
                report.skipped.len()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn handle_plan(config: &PipelineConfig, input: &Path, output: &Path) -> i32 {
    let plan_text = if input == Path::new("-") {
        let mut text = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut text) {
            eprintln!("Error: {}", e);
            return 1;
        }
        text
    } else {
        match std::fs::read_to_string(input) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                return 1;
            }
        }
    };

    let gateway = match connect(config).await {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let plan = match parse_execution_plan(&plan_text, gateway.as_ref()).await {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if plan.is_empty() {
        eprintln!("No devices extracted; {} left unchanged.", output.display());
        return 1;
    }

    println!("Extracted devices and modules:");
    println!("{}", serde_json::to_string_pretty(&plan).unwrap_or_default());

    match save_plan(output, &plan) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn handle_build(config: &PipelineConfig, paths: &StorePaths, shape: ResponseShape) -> i32 {
    let plan = match load_plan(&paths.plan) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}: {}", paths.plan.display(), e);
            return 1;
        }
    };

    let store = if paths.store.exists() {
        // Loading never needs the gateway
        DeviceSpecStore::load_for(&paths.store, &device_ids(&plan))
    } else {
        let gateway = match connect(config).await {
            Ok(gateway) => gateway,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        let extractor = Extractor::new(gateway.as_ref(), shape);
        SpecGuardCore::build_store(&paths.store, &paths.datasheet_dir, &plan, &extractor).await
    };

    match store {
        Ok(store) => {
            print_diagnostics(store.diagnostics());
            println!("Store {}: {} devices", paths.store.display(), store.len());
            for id in store.device_ids() {
                println!("  - {}", id);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn handle_validate(
    config: &PipelineConfig,
    paths: &StorePaths,
    from_specs_dir: bool,
    format: OutputFormat,
    fail_on_infeasible: bool,
) -> i32 {
    let plan = match load_plan(&paths.plan) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}: {}", paths.plan.display(), e);
            return 1;
        }
    };

    let gateway = match connect(config).await {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let store = if from_specs_dir {
        DeviceSpecStore::from_spec_dir(&paths.specs_dir, &device_ids(&plan))
    } else {
        let extractor = Extractor::new(gateway.as_ref(), config.response_shape);
        SpecGuardCore::build_store(&paths.store, &paths.datasheet_dir, &plan, &extractor).await
    };
    let store = match store {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    print_diagnostics(store.diagnostics());

    match SpecGuardCore::evaluate_plan(&plan, &store, gateway.as_ref()).await {
        Ok(outcome) => {
            output_outcome(&outcome, format);
            match outcome.verdict() {
                Some(verdict) if fail_on_infeasible && !verdict.is_feasible() => 1,
                _ => 0,
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_outcome(outcome: &FeasibilityOutcome, format: OutputFormat) {
    match (outcome, format) {
        (FeasibilityOutcome::Verdict(verdict), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(verdict).unwrap_or_default());
        }
        (FeasibilityOutcome::Raw { text, failure }, OutputFormat::Json) => {
            let output = serde_json::json!({
                "raw": text,
                "error": failure.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }
        (FeasibilityOutcome::Verdict(verdict), OutputFormat::Human) => {
            println!("\n===== ENERGY & TRANSMISSION VALIDATION =====");
            println!("  Energy feasible:       {}", yes_no(verdict.energy_feasible));
            println!("  Transmission feasible: {}", yes_no(verdict.transmission_feasible));
            if !verdict.reasons.is_empty() {
                println!("\n  Reasons:");
                for reason in &verdict.reasons {
                    println!("    - {}", reason);
                }
            }
            if !verdict.recommendations.is_empty() {
                println!("\n  Recommendations:");
                for rec in &verdict.recommendations {
                    println!("    - {}", rec);
                }
            }
        }
        (FeasibilityOutcome::Raw { text, failure }, OutputFormat::Human) => {
            eprintln!("Response was not a structured verdict ({}); raw output follows.", failure);
            println!("\n===== ENERGY & TRANSMISSION VALIDATION =====");
            println!("{}", text);
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_diagnostics(diagnostics: &[StoreDiagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }
}

fn load_table(config: &PipelineConfig) -> Option<ProtocolTable> {
    match config.protocol_table() {
        Ok(table) => Some(table),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn handle_estimate(
    config: &PipelineConfig,
    store_path: &Path,
    device: &str,
    protocol: &str,
    format: OutputFormat,
) -> i32 {
    let Some(table) = load_table(config) else {
        return 1;
    };
    let store = match DeviceSpecStore::load(store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}: {}", store_path.display(), e);
            return 1;
        }
    };

    match SpecGuardCore::estimate_device(&store, device, protocol, &table) {
        Ok(estimate) => {
            match format {
                OutputFormat::Human => output_estimate_human(&estimate),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&estimate).unwrap_or_default())
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_estimate_human(estimate: &DeviceEstimate) {
    println!("\nDevice:   {}", estimate.device_id);
    println!("Protocol: {}", estimate.protocol);
    println!("{}", "─".repeat(40));
    println!("  TX energy:    {:.3} mJ", estimate.energy.tx_energy_mj);
    println!("  RX energy:    {:.3} mJ", estimate.energy.rx_energy_mj);
    println!("  Total energy: {:.3} mJ", estimate.energy.total_energy_mj);
    match estimate.profile {
        Some(ref profile) => {
            println!("\n  Transmission ({}):", profile.name);
            println!("    Range:       {} m", profile.range_m);
            println!("    Latency:     {} ms", profile.latency_ms);
            println!("    Throughput:  {} kbps", profile.throughput_kbps);
            println!("    Reliability: {}", profile.reliability);
        }
        None => println!("\n  Unsupported protocol: {}", estimate.protocol),
    }
}

fn handle_query(config: &PipelineConfig, store_path: &Path) -> i32 {
    let Some(table) = load_table(config) else {
        return 1;
    };
    let store = match DeviceSpecStore::load(store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}: {}", store_path.display(), e);
            return 1;
        }
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    match query::run(&store, &table, stdin.lock(), &mut stdout) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn handle_protocols(config: &PipelineConfig, format: OutputFormat) -> i32 {
    let Some(table) = load_table(config) else {
        return 1;
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(table.profiles()).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!("Known protocols:\n");
            for p in table.profiles() {
                println!("  {}", p.name);
                println!(
                    "    range {} m, latency {} ms, {} kbps, reliability {}",
                    p.range_m, p.latency_ms, p.throughput_kbps, p.reliability
                );
                println!();
            }
        }
    }
    0
}

async fn handle_providers(config: &PipelineConfig, format: OutputFormat) -> i32 {
    let status = router(config).get_status().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!("Preferred provider: {}", status.preferred);
            println!("  Claude configured: {}", yes_no(status.claude_configured));
            println!(
                "  Ollama reachable:  {} ({})",
                yes_no(status.ollama_available),
                config.provider.ollama_url
            );
            for model in &status.ollama_models {
                println!("    - {}", model);
            }
            match status.active_model {
                Some(ref model) => {
                    println!("\nActive: {} / {}", model.provider, model.model_name);
                    println!("  Local:          {}", yes_no(model.is_local));
                    println!("  Context window: {} tokens", model.context_window);
                    println!("  Reliable JSON:  {}", yes_no(model.supports_json));
                }
                None => println!("\nNo usable provider."),
            }
        }
    }
    0
}
