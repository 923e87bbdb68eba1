use serde::Deserialize;

use crate::common::{IngestError, IngestResult};

/// Upload notification delivered by the object store trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records")]
    pub records: Vec<S3Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Record {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// Object location extracted from a notification, with the key decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    pub container: String,
    pub object_key: String,
}

/// Validates the notification and extracts the object location.
///
/// Exactly one record is expected; zero or several records is a fatal
/// input error, not a batch to iterate.
pub fn parse_notification(event: &S3Event) -> IngestResult<ParsedLocation> {
    if event.records.len() != 1 {
        return Err(IngestError::InvalidInput(format!(
            "expected exactly 1 record in the upload notification, got {}",
            event.records.len()
        )));
    }
    let record = &event.records[0].s3;
    Ok(ParsedLocation {
        container: record.bucket.name.clone(),
        object_key: decode_object_key(&record.object.key)?,
    })
}

/// Decodes an object key per the upload store's convention: literal plus
/// signs are spaces, then the whole key is percent-decoded.
fn decode_object_key(raw: &str) -> IngestResult<String> {
    percent_decode(&raw.replace('+', " "))
}

fn percent_decode(input: &str) -> IngestResult<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let value = bytes
                .get(i + 1..i + 3)
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| {
                    IngestError::InvalidInput(format!(
                        "malformed percent escape in object key: {input}"
                    ))
                })?;
            decoded.push(value);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).map_err(|e| {
        IngestError::InvalidInput(format!("object key is not valid UTF-8 once decoded: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(container: &str, key: &str) -> S3Record {
        S3Record {
            s3: S3Entity {
                bucket: S3Bucket {
                    name: container.into(),
                },
                object: S3Object { key: key.into() },
            },
        }
    }

    #[test]
    fn rejects_empty_notification() {
        let event = S3Event { records: vec![] };
        assert!(matches!(
            parse_notification(&event),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_multi_record_notification() {
        let event = S3Event {
            records: vec![
                sample_record("certificates-bucket-serverless", "publickey.cer"),
                sample_record("certificates-bucket-serverless", "publickey.cer"),
            ],
        };
        assert!(matches!(
            parse_notification(&event),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn extracts_container_and_key() {
        let event = S3Event {
            records: vec![sample_record("certificates-bucket-serverless", "publickey.cer")],
        };
        let location = parse_notification(&event).unwrap();
        assert_eq!(
            location,
            ParsedLocation {
                container: "certificates-bucket-serverless".into(),
                object_key: "publickey.cer".into(),
            }
        );
    }

    #[test]
    fn decodes_plus_and_percent_escapes() {
        let event = S3Event {
            records: vec![sample_record("bucket1", "folder/my+certificate%2Bv2.cer")],
        };
        let location = parse_notification(&event).unwrap();
        assert_eq!(location.object_key, "folder/my certificate+v2.cer");
    }

    #[test]
    fn rejects_malformed_percent_escape() {
        let event = S3Event {
            records: vec![sample_record("bucket1", "bad%zzkey")],
        };
        assert!(matches!(
            parse_notification(&event),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn deserializes_platform_payload() {
        let payload = r#"{
            "Records": [
                {
                    "eventVersion": "2.0",
                    "eventSource": "aws:s3",
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "s3SchemaVersion": "1.0",
                        "bucket": {
                            "name": "certificates-bucket-serverless",
                            "arn": "arn:aws:s3:::certificates-bucket-serverless"
                        },
                        "object": {
                            "key": "publickey.cer",
                            "size": 1400
                        }
                    }
                }
            ]
        }"#;
        let event: S3Event = serde_json::from_str(payload).unwrap();
        let location = parse_notification(&event).unwrap();
        assert_eq!(location.container, "certificates-bucket-serverless");
        assert_eq!(location.object_key, "publickey.cer");
    }
}
