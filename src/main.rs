extern crate pretty_env_logger;
#[allow(unused)]
#[macro_use]
extern crate log;

use anyhow::Result;

mod agent;
mod augment;
mod channels;
mod config;
mod constant;
mod database;
mod dependencies;
mod error;
mod fifi;
mod utils;

#[tokio::main(flavor = "multi_thread", worker_threads = 8)]
async fn main() -> Result<()> {
    fifi::cli().await
}
