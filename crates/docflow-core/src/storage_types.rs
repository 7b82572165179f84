use serde::{Deserialize, Serialize};

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Some(StorageBackend::S3),
            "local" => Some(StorageBackend::Local),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!(StorageBackend::parse("s3"), Some(StorageBackend::S3));
        assert_eq!(StorageBackend::parse("S3"), Some(StorageBackend::S3));
        assert_eq!(StorageBackend::parse("local"), Some(StorageBackend::Local));
        assert_eq!(StorageBackend::parse("nfs"), None);
    }
}
