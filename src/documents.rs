// Document store - denormalized copies of the list batches
//
// Collections are named after their relational tables. Inserts are plain
// insert_many calls: re-running a loader creates duplicate documents, and a
// later relational failure does not remove documents already written.

use anyhow::{Context, Result};
use mongodb::bson::Document;
use mongodb::{Client, Database};

use crate::config::Config;

/// Connect to the document store named in the configuration.
pub async fn connect(config: &Config) -> Result<Database> {
    let client = Client::with_uri_str(&config.mongo_uri)
        .await
        .with_context(|| format!("failed to connect to document store at {}", config.mongo_uri))?;

    Ok(client.database(&config.mongo_database))
}

/// Write a full batch of documents to one collection.
pub async fn insert_documents(
    db: &Database,
    collection: &str,
    documents: Vec<Document>,
) -> Result<usize> {
    if documents.is_empty() {
        return Ok(0);
    }

    let result = db
        .collection::<Document>(collection)
        .insert_many(documents, None)
        .await
        .with_context(|| format!("failed to insert into collection {:?}", collection))?;

    Ok(result.inserted_ids.len())
}
