use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // .env first so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "canarie", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    init_logging();

    // Process context for log correlation (no secrets)
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic hook: route panics through tracing so they land in the same log stream
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "canarie", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    // config.toml when present, else env vars; server::run reports config errors itself
    let worker_threads = configs::AppConfig::load_or_env()
        .ok()
        .and_then(|cfg| cfg.server.worker_threads)
        .or_else(|| std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()));

    // Multi-threaded runtime, worker count from config when given
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "canarie", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    // Startup event
    info!(
        service = "canarie",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "canarie service starting"
    );

    // Serve on a separate task and race it against Ctrl+C
    rt.block_on(async move {
        let server_task = tokio::spawn(async move {
            server::run().await.inspect_err(|e| {
                error!(service = "canarie", event = "run_failed", error = %e, "server::run returned error");
            })
        });

        tokio::select! {
            res = server_task => match res {
                Ok(Ok(())) => {
                    info!(service = "canarie", event = "stop", %service_id, pid, "server stopped");
                    ExitCode::SUCCESS
                }
                // already logged by the task
                Ok(Err(_)) => ExitCode::FAILURE,
                Err(e) => {
                    error!(service = "canarie", event = "task_join_error", error = %e, "server task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                // server::run has no graceful shutdown hook; the server task is
                // dropped with the runtime and in-flight transactions roll back
                info!(service = "canarie", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
