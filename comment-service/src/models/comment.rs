use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize};

/// Credentials issued by Google AI Studio carry this prefix.
pub const GEMINI_KEY_PREFIX: &str = "AIza";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Opaque product title. Required, but an empty string is accepted.
    pub title: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    /// Caller's own Gemini credential. Redacted in `Debug` output.
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
}

impl CommentRequest {
    /// Price, if present and non-empty.
    pub fn price(&self) -> Option<&str> {
        non_empty(self.price.as_deref())
    }

    /// Site, if present and non-empty.
    pub fn site(&self) -> Option<&str> {
        non_empty(self.site.as_deref())
    }

    /// The credential, only when it looks like a Gemini API key.
    pub fn usable_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .filter(|key| key.starts_with(GEMINI_KEY_PREFIX))
    }

    pub fn key_provided(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Accept `"500 TL"` as well as a bare JSON number such as `499.9`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

/// Which path produced the comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSource {
    UserGemini,
    KeyError,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub success: bool,
    pub yorum: String,
    pub source: CommentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_provided: Option<bool>,
}

impl CommentResponse {
    pub fn generated(yorum: impl Into<String>) -> Self {
        Self {
            success: true,
            yorum: yorum.into(),
            source: CommentSource::UserGemini,
            key_provided: None,
        }
    }

    pub fn key_error(message: impl std::fmt::Display) -> Self {
        Self {
            success: true,
            yorum: format!("API key hatası: {}", message),
            source: CommentSource::KeyError,
            key_provided: None,
        }
    }

    pub fn fallback(yorum: impl Into<String>, key_provided: bool) -> Self {
        Self {
            success: true,
            yorum: yorum.into(),
            source: CommentSource::Fallback,
            key_provided: Some(key_provided),
        }
    }
}
