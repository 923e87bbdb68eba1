use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{IngestError, IngestResult};
use crate::event::ParsedLocation;

/// Raw object read result. The store contract allows the body to be
/// absent, which the fetcher treats as fatal.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub body: Option<Vec<u8>>,
}

/// Read side of the upload store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, container: &str, key: &str) -> anyhow::Result<FetchedObject>;
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, container: &str, key: &str) -> anyhow::Result<FetchedObject> {
        let response = self
            .client
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await?;
        let bytes = response.body.collect().await?.into_bytes();
        Ok(FetchedObject {
            body: Some(bytes.to_vec()),
        })
    }
}

/// Retrieves certificate documents from the upload store.
pub struct ObjectFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ObjectFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Method to retrieve the object named by the location and decode it
    /// as text. Transport failure, an absent body, and an undecodable
    /// body are all fetch failures, each keeping the underlying message.
    pub async fn fetch_object(&self, location: &ParsedLocation) -> IngestResult<String> {
        let ParsedLocation {
            container,
            object_key,
        } = location;
        let object = self.store.get(container, object_key).await.map_err(|e| {
            IngestError::Fetch(format!(
                "failed to fetch object {object_key} from container {container}: {e}"
            ))
        })?;
        let bytes = object.body.ok_or_else(|| {
            IngestError::Fetch(format!(
                "no body for container {container} and key {object_key}"
            ))
        })?;
        String::from_utf8(bytes).map_err(|e| {
            IngestError::Fetch(format!(
                "failed to decode body for container {container} and key {object_key}: {e}"
            ))
        })
    }
}
