use std::sync::Arc;

use crate::certificate::parse_certificate;
use crate::common::IngestResult;
use crate::config::Config;
use crate::event::{parse_notification, S3Event};
use crate::fetcher::{ObjectFetcher, ObjectStore, S3ObjectStore};
use crate::record::{DynamoRecordStore, RecordStore, RecordWriter};
use crate::signing::{generate_key_pair, sign, KEY_ALGORITHM};

/// Sequences the ingestion stages. The only entry point reachable from
/// the hosting platform's trigger glue.
pub struct Handler {
    fetcher: ObjectFetcher,
    writer: RecordWriter,
    config: Config,
}

impl Handler {
    /// Builds a handler around explicit store implementations. This is
    /// the seam used for test substitution.
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
        config: Config,
    ) -> Self {
        Self {
            fetcher: ObjectFetcher::new(objects),
            writer: RecordWriter::new(records, config.record_table.clone()),
            config,
        }
    }

    /// Cold-start wiring: reads the configuration, loads the shared
    /// provider configuration once and builds both store clients from it.
    pub async fn from_env() -> IngestResult<Self> {
        let _ = env_logger::try_init();
        let config = Config::from_env()?;
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let objects = Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config)));
        let records = Arc::new(DynamoRecordStore::new(aws_sdk_dynamodb::Client::new(
            &sdk_config,
        )));
        Ok(Self::new(objects, records, config))
    }

    /// Runs the pipeline for one upload notification: parse the event,
    /// fetch the certificate, extract its key and common name, sign the
    /// key under a fresh signer, persist the record. The first failing
    /// stage aborts the rest and its error propagates unchanged; there is
    /// no retry and no compensating action.
    pub async fn handle(&self, event: &S3Event) -> IngestResult<()> {
        let location = parse_notification(event)?;
        log::info!(
            "ingesting object {} from container {}",
            location.object_key,
            location.container
        );

        let document = self.fetcher.fetch_object(&location).await?;
        let certificate = parse_certificate(&document)?;
        log::debug!("parsed certificate for {}", certificate.common_name);

        let key_pair = generate_key_pair(KEY_ALGORITHM, &self.config.key_passphrase)?;
        log::debug!("generated fresh {KEY_ALGORITHM} signer key");
        let signature = sign(&key_pair.private_key, &certificate.public_key)?;
        let signed_pub_key = hex::encode(signature);

        self.writer
            .write_record(&certificate.common_name, &signed_pub_key)
            .await?;
        log::info!(
            "stored signed public key for {}",
            certificate.common_name
        );
        Ok(())
    }
}
