use std::sync::Arc;

use anyhow::Result;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::constant::{DB_NAME, DB_NAMESPACE, USERS_TABLE};

pub mod chats;
pub mod schema;
pub mod users;

#[derive(Debug, Clone)]
pub struct FifiDatabases {
    pub conn: Arc<Surreal<Db>>,
}

impl FifiDatabases {
    pub async fn new(workspace: String) -> Result<Self> {
        let db = Surreal::new::<RocksDb>(format!("{workspace}/fifi.db")).await?;
        db.use_ns(DB_NAMESPACE).use_db(DB_NAME).await?;
        define_schema(&db).await?;

        log::info!("document store opened at {workspace}/fifi.db");
        Ok(Self { conn: Arc::new(db) })
    }

    pub async fn in_memory() -> Result<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns(DB_NAMESPACE).use_db(DB_NAME).await?;
        define_schema(&db).await?;

        Ok(Self { conn: Arc::new(db) })
    }
}

/// One account per email, enforced by the store rather than by a prior lookup.
async fn define_schema(db: &Surreal<Db>) -> Result<()> {
    db.query(format!(
        "DEFINE INDEX IF NOT EXISTS unique_email ON TABLE {USERS_TABLE} FIELDS email UNIQUE"
    ))
    .await?
    .check()?;

    Ok(())
}
