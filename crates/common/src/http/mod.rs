//! Request vocabulary shared by the signer and the transport.
//!
//! [`Method`] and [`Param`] are deliberately kept in this crate rather than
//! next to the transport: the signature engine consumes the same parameter
//! list the transport later puts on the wire, and keeping one type for both
//! prevents the two views from drifting apart.

use std::fmt;

/// HTTP methods supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    /// Uppercase wire representation, as used in the signature base string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Whether requests with this method carry parameters in the body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request parameter: either a text pair or a file upload.
///
/// Wire order is the order parameters were added to the request; the
/// canonical order required for signing is computed separately by the codec
/// and never mutates this list.
#[derive(Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    value: ParamValue,
}

#[derive(Clone, PartialEq, Eq)]
enum ParamValue {
    Text(String),
    File { file_name: String, content_type: String, data: Vec<u8> },
}

impl Param {
    /// An ordinary text parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: ParamValue::Text(value.into()) }
    }

    /// A file-upload parameter. File parameters force a multipart body and
    /// are excluded from the request signature.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: ParamValue::File {
                file_name: file_name.into(),
                content_type: content_type.into(),
                data,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_file(&self) -> bool {
        matches!(self.value, ParamValue::File { .. })
    }

    /// Text value, or `None` for file parameters.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            ParamValue::Text(v) => Some(v),
            ParamValue::File { .. } => None,
        }
    }

    /// File payload as `(file_name, content_type, data)`, or `None` for
    /// text parameters.
    pub fn file_payload(&self) -> Option<(&str, &str, &[u8])> {
        match &self.value {
            ParamValue::Text(_) => None,
            ParamValue::File { file_name, content_type, data } => {
                Some((file_name, content_type, data))
            }
        }
    }
}

/// True when at least one parameter is a file upload.
pub fn contains_file(params: &[Param]) -> bool {
    params.iter().any(Param::is_file)
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ParamValue::Text(v) => {
                f.debug_struct("Param").field("name", &self.name).field("value", v).finish()
            }
            ParamValue::File { file_name, content_type, data } => f
                .debug_struct("Param")
                .field("name", &self.name)
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("bytes", &data.len())
                .finish(),
        }
    }
}
