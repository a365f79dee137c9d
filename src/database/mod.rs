use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use std::time::Duration;

use crate::models::{User, USERS_COLLECTION};
use crate::utils::AppError;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.app_name = Some("true-feedback".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Fail fast if the server is unreachable
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique indexes back the username/email uniqueness invariant
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<Document>(USERS_COLLECTION);

        for field in ["username", "email"] {
            let mut keys = Document::new();
            keys.insert(field, 1);

            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();

            match users.create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: users({}) unique", field),
                Err(e) => log::warn!("   ⚠️  Could not create index users({}): {}", field, e),
            }
        }

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn users(&self) -> Collection<User> {
        self.collection(USERS_COLLECTION)
    }

    #[cfg(test)]
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn test_db() -> MongoDB {
    dotenv::dotenv().ok();
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let name = format!("truefeedback_test_{}", uuid::Uuid::new_v4().simple());
    MongoDB::new(&uri, &name).await.expect("MongoDB must be running for ignored tests")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        let db = test_db().await;
        assert!(db.ping().await.is_ok());
        db.database().drop().await.unwrap();
    }
}
