use anyhow::Result;

use crate::{
    agent::{FifiAgent, FifiAgents},
    config::FifiConfig,
    database::{FifiDatabases, chats::ChatArchive, users::Accounts},
};

#[derive(Clone)]
pub struct FifiDependencies {
    pub agents: FifiAgents<FifiAgent>,
    pub accounts: Accounts,
}

impl FifiDependencies {
    pub async fn new(config: &FifiConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.storage.workspace)?;

        let database = FifiDatabases::new(config.storage.workspace.clone()).await?;
        let completion = FifiAgent::new(&config.model, config.completion.clone())?;
        let agents = FifiAgents::new(completion, ChatArchive::new(database.clone()), config);

        Ok(Self {
            accounts: Accounts::new(database),
            agents,
        })
    }
}
