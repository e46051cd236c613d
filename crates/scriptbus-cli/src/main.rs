use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use scriptbus_runner::{
    execute, init_logging, scripts::EndingLogger, ConfigError, LocalHost, RunnerConfig, Script,
    ScriptConfig, Session, ThreadWaiter,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode (-dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Argument string passed to the script's on_start
    #[arg(long, default_value = "")]
    args: String,

    /// Stop the script after this many loops
    #[arg(long)]
    max_loops: Option<u64>,

    /// Pause between loops, overriding the config file
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<RunnerConfig, ConfigError> {
    let loaded = match path {
        Some(path) => RunnerConfig::load_from(path),
        None => RunnerConfig::load(),
    };

    match loaded {
        Err(ConfigError::NotFound) if path.is_none() => Ok(RunnerConfig::default()),
        other => other,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let level = match cli.debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let _log_guard = init_logging("cli", config.file_logging, level)?;

    let interval = cli
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.loop_interval());

    let mut script = EndingLogger::new();
    if let Some(max_loops) = cli.max_loops {
        script = script.with_max_loops(max_loops);
    }

    let mut script_config = ScriptConfig::default();
    script.configure(&mut script_config);
    config.script.apply(&mut script_config);
    info!("Running {} (interval: {:?})", script.name(), interval);

    let host = LocalHost::new();
    host.set_script_config(script_config);
    let session = Session::new(host.clone());

    let signal_host = host.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, ending run");
            signal_host.end_run();
        }
    });

    let args = cli.args;
    let run = tokio::task::spawn_blocking(move || {
        execute(&mut script, &session, &ThreadWaiter, &args, interval)
    })
    .await?;

    // A script that stopped itself still gets its ending notification
    host.end_run();

    match run {
        Ok(loops) => {
            info!("Run finished after {} loops", loops);
            Ok(())
        }
        Err(e) => {
            warn!("Run failed: {:#}", e);
            Err(e.into())
        }
    }
}
