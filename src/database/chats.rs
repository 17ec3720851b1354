use crate::{
    agent::memory::Message,
    constant::CHATS_TABLE,
    database::{FifiDatabases, schema::ChatDocument},
    error::{FifiError, error},
};

/// Whole-history persistence for authenticated users. Every save rewrites the
/// full document; concurrent sessions of one user are last-write-wins.
#[derive(Debug, Clone)]
pub struct ChatArchive {
    db: FifiDatabases,
}

impl ChatArchive {
    pub fn new(db: FifiDatabases) -> Self {
        Self { db }
    }

    pub async fn load(&self, user_id: &str) -> Result<Option<Vec<Message>>, FifiError> {
        let document: Option<ChatDocument> = match self
            .db
            .conn
            .select((CHATS_TABLE, user_id.to_string()))
            .await
        {
            Ok(document) => document,
            Err(err) => return error(FifiError::Persistence, "chats: load", err),
        };

        Ok(document.map(|doc| doc.history))
    }

    pub async fn save(&self, user_id: &str, history: &[Message]) -> Result<(), FifiError> {
        let document = ChatDocument {
            history: history.to_vec(),
        };

        let saved: Result<Option<ChatDocument>, _> = self
            .db
            .conn
            .upsert((CHATS_TABLE, user_id.to_string()))
            .content(document)
            .await;

        if let Err(err) = saved {
            return error(FifiError::Persistence, "chats: save", err);
        }

        log::debug!("saved {} messages for {}", history.len(), user_id);
        Ok(())
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<usize, FifiError> {
        let documents: Vec<ChatDocument> = match self.db.conn.select(CHATS_TABLE).await {
            Ok(documents) => documents,
            Err(err) => return error(FifiError::Persistence, "chats: count", err),
        };

        Ok(documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn archive() -> ChatArchive {
        ChatArchive::new(FifiDatabases::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let archive = archive().await;

        assert_eq!(archive.load("nobody").await.unwrap(), None);
        assert_eq!(archive.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let archive = archive().await;
        let history = vec![
            Message::system("You are Fifi"),
            Message::user("When does the belly button fall off?"),
            Message::assistant("Usually within one to three weeks."),
        ];

        archive.save("user-1", &history).await.unwrap();

        assert_eq!(archive.load("user-1").await.unwrap(), Some(history));
        assert_eq!(archive.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_history() {
        let archive = archive().await;
        let first = vec![Message::system("seed"), Message::user("a")];
        let second = vec![Message::system("seed")];

        archive.save("user-1", &first).await.unwrap();
        archive.save("user-1", &second).await.unwrap();

        assert_eq!(archive.load("user-1").await.unwrap(), Some(second));
    }
}
