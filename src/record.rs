use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::common::{IngestError, IngestResult};

/// The persisted unit, keyed by common name. Writing a common name that
/// already exists overwrites the prior record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub common_name: String,
    pub signed_pub_key: String,
}

/// Write side of the record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put(&self, table: &str, record: &CertificateRecord) -> anyhow::Result<()>;
}

/// DynamoDB-backed record store.
pub struct DynamoRecordStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoRecordStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put(&self, table: &str, record: &CertificateRecord) -> anyhow::Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .item(
                "commonName",
                AttributeValue::S(record.common_name.clone()),
            )
            .item(
                "signedPubKey",
                AttributeValue::S(record.signed_pub_key.clone()),
            )
            .send()
            .await?;
        Ok(())
    }
}

/// Writer over the single configured record table.
pub struct RecordWriter {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl RecordWriter {
    pub fn new(store: Arc<dyn RecordStore>, table: String) -> Self {
        Self { store, table }
    }

    /// Upserts the record for a common name. No conditional write is
    /// used: overlapping invocations for one common name race and the
    /// last write wins.
    pub async fn write_record(&self, common_name: &str, signed_pub_key: &str) -> IngestResult<()> {
        let record = CertificateRecord {
            common_name: common_name.to_string(),
            signed_pub_key: signed_pub_key.to_string(),
        };
        self.store.put(&self.table, &record).await.map_err(|e| {
            IngestError::Persistence(format!("failed to write record for {common_name}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::anyhow;

    use super::*;

    #[derive(Default)]
    struct CapturingStore {
        writes: Mutex<Vec<(String, CertificateRecord)>>,
        fail: bool,
    }

    #[async_trait]
    impl RecordStore for CapturingStore {
        async fn put(&self, table: &str, record: &CertificateRecord) -> anyhow::Result<()> {
            if self.fail {
                return Err(anyhow!("put item fail"));
            }
            self.writes
                .lock()
                .unwrap()
                .push((table.to_string(), record.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn writes_record_to_configured_table() {
        let store = Arc::new(CapturingStore::default());
        let writer = RecordWriter::new(store.clone(), "certificates".to_string());

        writer.write_record("mandarin", "00ff").await.unwrap();

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "certificates");
        assert_eq!(
            writes[0].1,
            CertificateRecord {
                common_name: "mandarin".to_string(),
                signed_pub_key: "00ff".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn wraps_store_rejection() {
        let store = Arc::new(CapturingStore {
            writes: Mutex::new(Vec::new()),
            fail: true,
        });
        let writer = RecordWriter::new(store, "certificates".to_string());

        match writer.write_record("mandarin", "00ff").await {
            Err(IngestError::Persistence(message)) => {
                assert!(message.contains("put item fail"));
                assert!(message.contains("mandarin"));
            }
            other => panic!("expected a persistence error, got {other:?}"),
        }
    }
}
