// ABOUTME: Wire and domain types exchanged with the easyads backend.
// ABOUTME: Products, generations, users, token responses, and local upload payloads.

use serde::{Deserialize, Serialize};

/// Server-assigned product identifier.
pub type ProductId = i64;

/// A user-uploaded product image plus metadata, used as generation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Lifecycle of a generation as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl GenerationStatus {
    /// True once the backend will no longer change this generation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One AI-produced image/video result tied to a product and a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub id: i64,
    pub prompt: String,
    #[serde(default)]
    pub result_image_url: Option<String>,
    #[serde(default)]
    pub result_video_url: Option<String>,
    pub status: GenerationStatus,
}

/// Body of `POST /generate/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub product_id: ProductId,
    pub prompt: String,
}

/// Account record returned by registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// Email and password as typed into the auth form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `POST /token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A file selected for upload, already read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Build an upload, inferring the content type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Map an image file name to its MIME type.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_decodes_nullable_results() {
        let json = r#"{"id":7,"prompt":"neon street","result_image_url":null,"result_video_url":null,"status":"processing"}"#;
        let generation: Generation = serde_json::from_str(json).unwrap();

        assert_eq!(generation.id, 7);
        assert_eq!(generation.status, GenerationStatus::Processing);
        assert!(generation.result_image_url.is_none());
        assert!(!generation.status.is_terminal());
    }

    #[test]
    fn unknown_generation_status_does_not_fail_decoding() {
        let json = r#"{"id":1,"prompt":"p","status":"queued"}"#;
        let generation: Generation = serde_json::from_str(json).unwrap();
        assert_eq!(generation.status, GenerationStatus::Unknown);
    }

    #[test]
    fn product_accepts_server_owner_field() {
        let json = r#"{"id":3,"name":"Jacket","description":"Denim","image_url":"http://localhost:8000/uploads/j.png","user_id":9}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.user_id, Some(9));
        assert_eq!(product.name, "Jacket");
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("shot.JPG"), "image/jpeg");
        assert_eq!(content_type_for("shot.png"), "image/png");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }
}
