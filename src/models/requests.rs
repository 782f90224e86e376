//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;

/// One key/value pair inside a SET batch
#[derive(Debug, Clone, Deserialize)]
pub struct SetItem {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds, passed to the backend as a hint
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub items: Vec<SetItem>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.items.is_empty() {
            return Some("At least one item is required".to_string());
        }
        if self.items.iter().any(|item| item.key.is_empty()) {
            return Some("Key cannot be empty".to_string());
        }
        None
    }

    /// Splits the batch into the parallel sequences the storage front expects.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<u8>>, Vec<Option<Duration>>) {
        let mut keys = Vec::with_capacity(self.items.len());
        let mut values = Vec::with_capacity(self.items.len());
        let mut expirations = Vec::with_capacity(self.items.len());

        for item in self.items {
            keys.push(item.key);
            values.push(item.value.into_bytes());
            expirations.push(item.ttl.map(Duration::from_secs));
        }
        (keys, values, expirations)
    }
}

/// Request body for batched GET and DELETE (POST /get, POST /del)
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    pub keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"items": [{"key": "test", "value": "hello"}]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].key, "test");
        assert_eq!(req.items[0].value, "hello");
        assert!(req.items[0].ttl.is_none());
    }

    #[test]
    fn test_into_parts_keeps_order() {
        let json = r#"{"items": [
            {"key": "a", "value": "1", "ttl": 60},
            {"key": "b", "value": "2"}
        ]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();

        let (keys, values, expirations) = req.into_parts();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(values, vec![b"1".to_vec(), b"2".to_vec()]);
        assert_eq!(expirations, vec![Some(Duration::from_secs(60)), None]);
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            items: vec![SetItem {
                key: "".to_string(),
                value: "test".to_string(),
                ttl: None,
            }],
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_empty_batch() {
        let req = SetRequest { items: vec![] };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_keys_request_deserialize() {
        let req: KeysRequest = serde_json::from_str(r#"{"keys": ["a", "b"]}"#).unwrap();
        assert_eq!(req.keys, vec!["a", "b"]);
    }
}
