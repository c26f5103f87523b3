use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "kv-server")]
#[command(author, version, about = "Password-gated key-value store over HTTP", long_about = None)]
struct Args {
    /// Path to the configuration file (.json or .toml)
    #[arg(short, long, env = "CONFIG_PATH", default_value = configs::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Emit JSON formatted logs
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    if json {
        common::utils::logging::init_logging_json();
    } else {
        common::utils::logging::init_logging_default();
    }
    info!(service = "kv-server", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    // load .env before clap so CONFIG_PATH / RUST_LOG from it take effect
    dotenv().ok();
    let args = Args::parse();
    init_logging(args.json_logs);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "kv-server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match configs::AppConfig::load_and_validate_from(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "kv-server", event = "config_failed", config = %args.config.display(), error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "kv-server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "kv-server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.worker_threads.unwrap_or_default(),
        data_file = %cfg.data_file.display(),
        "kv-server starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "kv-server", event = "stop", %service_id, pid, "server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "kv-server", event = "run_failed", error = %e, "server::run returned error");
            ExitCode::FAILURE
        }
    }
}
