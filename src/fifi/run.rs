use std::env;

use anyhow::Result;
use clap::Args;

use crate::{
    channels::{
        FifiChannel,
        http::{HTTPChannel, state::HTTPState},
        terminal::TerminalChannel,
    },
    config::{FifiConfig, HTTPChannelConfig},
    dependencies::FifiDependencies,
};

const DEFAULT_HTTP_PORT: u32 = 8080;

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[arg(
        short,
        long,
        value_name = "PATH",
        value_hint = clap::ValueHint::FilePath,
        help = "path to fifi config.toml file",
    )]
    config: Option<std::path::PathBuf>,

    #[arg(short, long, help = "override the http port from config")]
    port: Option<u32>,
}

fn init_logging(level: log::LevelFilter) {
    if env::var("RUST_LOG").is_err() {
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .filter_module("rig", log::LevelFilter::Error)
            .filter_module("reqwest", log::LevelFilter::Error)
            .filter_module("hyper", log::LevelFilter::Error)
            .filter_module("h2", log::LevelFilter::Error)
            .filter_module("surrealdb", log::LevelFilter::Error)
            .filter_module("tungstenite", log::LevelFilter::Error)
            .filter_module("tracing", log::LevelFilter::Off)
            .filter_module("rustls", log::LevelFilter::Off)
            .init();
    } else {
        pretty_env_logger::init();
    }
}

pub async fn run(args: RunArgs) -> Result<()> {
    init_logging(log::LevelFilter::Debug);

    let config = FifiConfig::load(args.config.clone())?;
    let deps = FifiDependencies::new(&config).await?;

    let http = match (args.port, config.channels.http.clone()) {
        (Some(port), Some(http)) => HTTPChannelConfig { port, ..http },
        (Some(port), None) => HTTPChannelConfig::new(port),
        (None, Some(http)) => http,
        (None, None) => HTTPChannelConfig::new(DEFAULT_HTTP_PORT),
    };

    let state = HTTPState::new(deps.agents, deps.accounts).with_session_ttl(http.session_ttl());
    let mut channel = HTTPChannel::new(http, state)?;
    channel.run().await?;

    Ok(())
}

pub async fn chat(args: RunArgs) -> Result<()> {
    // the prompt owns the terminal, only warnings get through
    init_logging(log::LevelFilter::Warn);

    let config = FifiConfig::load(args.config.clone())?;
    let deps = FifiDependencies::new(&config).await?;

    let mut channel = TerminalChannel::new(deps.agents, deps.accounts);
    channel.run().await?;

    Ok(())
}
