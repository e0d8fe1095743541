use clap::Parser;
use log::{error, info};

use relock::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::ModuleOutcome,
    },
    config::RelockConfig,
    LockMode, Relock,
};

async fn run() -> anyhow::Result<()> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = RelockConfig::load()?;

    let mut builder = Relock::builder();
    if let Some(root) = cli_args.root {
        builder = builder.root(root);
    }
    if let Some(snapshot_file) = cli_args.snapshot.map(Into::into).or(config.snapshot_file) {
        builder = builder.snapshot_file_name(snapshot_file);
    }
    if let Some(lock_file) = cli_args.lock_file.map(Into::into).or(config.lock_file) {
        builder = builder.lock_file_name(lock_file);
    }
    let relock = builder.try_build()?;

    match cli_args.cmd {
        Command::Lock { locked } => {
            let lock_mode = if locked {
                LockMode::Locked
            } else {
                LockMode::Update
            };
            let report = relock.lock(lock_mode).await?;
            info!(
                "{} lock files updated, {} up to date, {} modules without a lock file",
                report.modules_with(ModuleOutcome::Updated).len(),
                report.modules_with(ModuleOutcome::UpToDate).len(),
                report.modules_with(ModuleOutcome::Skipped).len(),
            );
        }
        Command::Print { module } => {
            print!("{}", relock.print(&module)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
