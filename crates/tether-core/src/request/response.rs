//! Response types.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::options::DataType;
use crate::error::ServerError;
use crate::headers::Headers;

/// A response body as read by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Decoded JSON.
    Json(Value),
    /// Text that was not (or was not asked to be) decoded.
    Text(String),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl ResponseBody {
    /// Interprets a textual body according to `data_type`.
    pub fn decode_text(text: String, data_type: DataType) -> Self {
        match data_type {
            DataType::Json => match serde_json::from_str(&text) {
                Ok(value) => Self::Json(value),
                Err(_) => Self::Text(text),
            },
            DataType::Text => Self::Text(text),
        }
    }

    /// The application-level `error` field of a JSON object body.
    ///
    /// Non-string values are rendered as JSON text; `null` counts as absent.
    pub fn error_field(&self) -> Option<String> {
        match self {
            Self::Json(Value::Object(map)) => match map.get("error") {
                None | Some(Value::Null) => None,
                Some(Value::String(message)) => Some(message.clone()),
                Some(other) => Some(other.to_string()),
            },
            _ => None,
        }
    }

    /// The body as a JSON value.
    ///
    /// Text becomes a JSON string; bytes become an array of numbers.
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Binary(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
        }
    }

    /// Returns the JSON value if the body decoded as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text if the body is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T = ResponseBody> {
    /// Response payload.
    pub data: T,
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: Headers,
    /// `Set-Cookie` values in arrival order.
    pub cookies: Vec<String>,
}

impl<T> Response<T> {
    /// Maps the payload, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            data: f(self.data),
            status_code: self.status_code,
            headers: self.headers,
            cookies: self.cookies,
        }
    }
}

impl Response<ResponseBody> {
    /// Deserializes the payload into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<Response<T>, ServerError> {
        let Response {
            data,
            status_code,
            headers,
            cookies,
        } = self;
        let data = serde_json::from_value(data.into_value()).map_err(|e| {
            ServerError::new(i32::from(status_code), format!("invalid response body: {e}"))
        })?;
        Ok(Response {
            data,
            status_code,
            headers,
            cookies,
        })
    }
}
