/// S3 configuration shared across services
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters that must be percent-encoded in a URL path; `/` separates segments
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint (LocalStack, MinIO); `None` uses the AWS default
    pub endpoint_url: Option<String>,
    /// Base URL for public object links; defaults to `https://{bucket}`
    pub public_base_url: Option<String>,
    /// Whether to use path-style requests (required by most S3 emulators)
    pub path_style: bool,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| "posts-images".to_string());
        if bucket.trim().is_empty() {
            return Err("S3_BUCKET cannot be empty".to_string());
        }

        Ok(Self {
            bucket,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: non_empty_var("S3_ENDPOINT_URL"),
            public_base_url: non_empty_var("S3_PUBLIC_BASE_URL"),
            path_style: std::env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Publicly addressable URL of an object
    pub fn object_url(&self, key: &str) -> String {
        let path = encode_key(key);
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), path),
            None => format!("https://{}/{}", self.bucket, path),
        }
    }
}

/// Percent-encode an object key for use as a URL path
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, PATH_SET).to_string()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(public_base_url: Option<&str>) -> S3Config {
        S3Config {
            bucket: "images.example.com".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            public_base_url: public_base_url.map(str::to_string),
            path_style: false,
        }
    }

    #[test]
    fn test_object_url_uses_bucket_host() {
        let url = config(None).object_url("abc/cat.png");
        assert_eq!(url, "https://images.example.com/abc/cat.png");
    }

    #[test]
    fn test_object_url_with_public_base() {
        let url = config(Some("https://cdn.example.com/")).object_url("abc/cat.png");
        assert_eq!(url, "https://cdn.example.com/abc/cat.png");
    }

    #[test]
    fn test_object_url_encodes_reserved_characters() {
        let url = config(None).object_url("abc/my photo#1?.png");
        assert_eq!(url, "https://images.example.com/abc/my%20photo%231%3F.png");
    }

    #[test]
    fn test_encode_key_keeps_unreserved_characters() {
        assert_eq!(encode_key("abc/a-b_c.~d.png"), "abc/a-b_c.~d.png");
        assert_eq!(encode_key("abc/caf\u{e9}.png"), "abc/caf%C3%A9.png");
    }
}
