use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    Gbk,
    Gb18030,
    Big5,
    Windows1252,
    ShiftJis,
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::GBK) {
            Self::Gbk
        } else if ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gb18030
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else {
            Self::Other(encoding.name().to_string())
        }
    }

    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gbk => encoding_rs::GBK,
            Self::Gb18030 => encoding_rs::GB18030,
            Self::Big5 => encoding_rs::BIG5,
            Self::Windows1252 => encoding_rs::WINDOWS_1252,
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::Other(name) => {
                encoding_rs::Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8)
            }
        }
    }
}

/// A successfully fetched HTML page, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// URL after redirects; relative image sources resolve against it.
    pub url_final: Url,
    pub body_utf8: String,
    /// Encoding the body was decoded from.
    pub charset: Charset,
}

#[cfg(test)]
impl PageResponse {
    /// A 200 UTF-8 response carrying `html`, as if fetched from `url`.
    pub(crate) fn from_html(html: impl Into<String>, url: &str) -> Self {
        Self {
            url_final: Url::parse(url).unwrap(),
            body_utf8: html.into(),
            charset: Charset::Utf8,
        }
    }
}
