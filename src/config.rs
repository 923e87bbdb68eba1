use std::env;

use crate::common::{IngestError, IngestResult};

/// Environment variable naming the record-store table.
pub const RECORD_TABLE_VAR: &str = "DYNAMO_TABLE";
/// Environment variable holding the private-key container passphrase.
pub const KEY_PASSPHRASE_VAR: &str = "SIGNING_KEY_PASSPHRASE";

/// Process-wide configuration, read once at cold start. Both settings are
/// required and have no defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub record_table: String,
    pub key_passphrase: String,
}

impl Config {
    pub fn from_env() -> IngestResult<Self> {
        Ok(Self {
            record_table: required_var(RECORD_TABLE_VAR)?,
            key_passphrase: required_var(KEY_PASSPHRASE_VAR)?,
        })
    }
}

fn required_var(name: &str) -> IngestResult<String> {
    env::var(name).map_err(|_| IngestError::Config(format!("{name} must be set")))
}
