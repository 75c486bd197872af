//! Wire payloads exchanged with a front end.
//!
//! Front ends (HTTP, CLI) deserialize a body into [`BatchRequestBody`] or
//! [`SingleRequestBody`], and serialize back a [`SingleCodeResponse`] or an
//! [`ErrorResponse`].

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::batch::QrRequest;
use crate::error::{QrBatchError, Result};
use crate::qrcode::parse_size;
use crate::range::RangeDescriptor;

/// Message shown to users for any failed generation.
pub const GENERIC_ERROR_MESSAGE: &str = "Error while generating the QR code";

/// Foreground color used when a request leaves it out.
pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
}

/// Accepts a JSON string or integer and keeps it as text.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
    })
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Body of a batch request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequestBody {
    /// Ranges to expand, in order.
    pub fields: Vec<RangeDescriptor>,
    /// Prefix of every payload; each code is encoded as `<contents>/<code>`.
    pub contents: String,
    /// Pixel size, as text or integer.
    #[serde(deserialize_with = "scalar_string")]
    pub size: String,
    /// Hex foreground color.
    #[serde(default = "default_color")]
    pub color: String,
}

impl BatchRequestBody {
    /// Parses a JSON body.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| QrBatchError::InvalidRequest(e.to_string()))
    }

    /// Builds the core request, attaching an optional logo already on disk.
    ///
    /// # Errors
    ///
    /// [`QrBatchError::Encode`] if `size` does not start with a positive
    /// integer.
    pub fn into_request(self, logo_path: Option<PathBuf>) -> Result<QrRequest> {
        Ok(QrRequest {
            fields: self.fields,
            content_prefix: self.contents,
            size: parse_size(&self.size)?,
            color: self.color,
            logo_path,
        })
    }
}

/// Body of a single-code request; `contents` is encoded verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleRequestBody {
    /// Literal payload text.
    pub contents: String,
    /// Pixel size, as text or integer.
    #[serde(deserialize_with = "scalar_string")]
    pub size: String,
    /// Hex foreground color.
    #[serde(default = "default_color")]
    pub color: String,
}

impl SingleRequestBody {
    /// Parses a JSON body.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| QrBatchError::InvalidRequest(e.to_string()))
    }
}

/// Successful single-code answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCodeResponse {
    /// `data:image/png;base64,...`
    pub qr_code_image_url: String,
}

/// Failure answer; the same shape for every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

impl ErrorResponse {
    /// The single generic failure users see. Details stay in the logs.
    pub fn generic() -> Self {
        Self { error: GENERIC_ERROR_MESSAGE.to_string() }
    }
}
