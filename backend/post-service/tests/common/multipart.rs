//! Raw multipart/form-data body builder
//!
//! Produces the exact bytes a browser form submission would send, so tests
//! exercise the real multipart extractor.

pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----post-service-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
            self.boundary, name
        ));
        self.push_str(value);
        self.push_str("\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            self.boundary, name, filename, content_type
        ));
        self.body.extend_from_slice(bytes);
        self.push_str("\r\n");
        self
    }

    /// `(content-type header value, body bytes)`
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let closing = format!("--{}--\r\n", self.boundary);
        self.push_str(&closing);
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }

    fn push_str(&mut self, s: &str) {
        self.body.extend_from_slice(s.as_bytes());
    }
}
