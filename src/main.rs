use actiongate::cli::Cli;
use actiongate::config::Settings;
use actiongate::crashlog::reporter_from_settings;
use actiongate::dispatcher::Dispatcher;
use actiongate::echo::echo_action;
use actiongate::server::Router;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    may::config().set_stack_size(settings.stack_size());

    let mut dispatcher = Dispatcher::new();
    dispatcher.register_action("echo", echo_action);

    let reporter = reporter_from_settings(&settings);
    let mut router = Router::bind(cli.port, &settings, Arc::new(dispatcher), reporter)?;
    info!(addr = %router.addr(), "actiongate up");

    wait_for_shutdown()?;
    info!("shutdown requested, draining");
    router.close().wait();
    info!("drained, exiting");
    Ok(())
}

#[cfg(unix)]
fn wait_for_shutdown() -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    signals.forever().next();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> anyhow::Result<()> {
    loop {
        std::thread::sleep(std::time::Duration::from_secs(3600));
    }
}
