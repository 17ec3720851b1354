use anyhow::Result;

pub mod http;
pub mod terminal;
pub mod view;

pub trait FifiChannel {
    async fn run(&mut self) -> Result<()>;
}
