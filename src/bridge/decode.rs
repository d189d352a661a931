// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response body decoding
//!
//! Decoding never fails. The chain is:
//! 1. `Content-Encoding: br` with a decompressor available: decompress,
//!    then UTF-8 with replacement
//! 2. declared charset, unless absent or the ISO-8859-1 default
//! 3. best guess: byte-order mark, then UTF-8
//! 4. UTF-8 with replacement

use encoding_rs::{Encoding, UTF_8};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::http::Response;

lazy_static! {
    static ref CHARSET: Regex =
        Regex::new(r#"(?i)charset\s*=\s*"?([^";\s]+)"?"#).expect("charset pattern is valid");
}

/// Labels servers send by default that are usually wrong for forum JSON
const FALLBACK_CHARSETS: &[&str] = &["iso-8859-1", "iso8859-1", "latin1", "latin-1", "l1"];

/// Which step of the chain produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// Manually decompressed Brotli, UTF-8 with replacement
    Brotli,
    /// The charset declared in `Content-Type`
    Declared(&'static str),
    /// Byte-order mark or UTF-8 validation
    Detected(&'static str),
    /// Nothing decoded cleanly; UTF-8 with replacement
    LossyUtf8,
}

/// A decoded response body
#[derive(Debug, Clone)]
pub struct DecodedBody {
    pub text: String,
    pub strategy: DecodeStrategy,
}

/// Turns raw response bytes into text
#[derive(Debug, Clone, Copy)]
pub struct BodyDecoder {
    brotli: bool,
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BodyDecoder {
    /// Create a decoder; Brotli is only used if it is both requested and
    /// compiled in
    pub fn new(manual_brotli: bool) -> Self {
        Self {
            brotli: manual_brotli && cfg!(feature = "brotli"),
        }
    }

    /// Check if `br` bodies can be decompressed
    pub fn has_brotli(&self) -> bool {
        self.brotli
    }

    /// Decode a response body
    pub fn decode(&self, response: &Response) -> DecodedBody {
        self.decode_bytes(
            response.content_encoding().as_deref(),
            response.content_type(),
            &response.body,
        )
    }

    /// Decode raw bytes given the response's `Content-Encoding` and
    /// `Content-Type`
    pub fn decode_bytes(
        &self,
        content_encoding: Option<&str>,
        content_type: Option<&str>,
        raw: &[u8],
    ) -> DecodedBody {
        let is_brotli = content_encoding
            .map(|e| e.trim().eq_ignore_ascii_case("br"))
            .unwrap_or(false);

        if is_brotli {
            if self.brotli {
                match decompress_brotli(raw) {
                    Ok(bytes) => {
                        return DecodedBody {
                            text: String::from_utf8_lossy(&bytes).into_owned(),
                            strategy: DecodeStrategy::Brotli,
                        };
                    }
                    Err(e) => debug!(error = %e, "Brotli decompression failed, decoding body as-is"),
                }
            } else {
                debug!("Body is Brotli-encoded but no decompressor is available");
            }
        }

        decode_text(content_type, raw)
    }
}

/// Decode a response body with every capability compiled in
pub fn decode_body(response: &Response) -> DecodedBody {
    BodyDecoder::default().decode(response)
}

/// Charset label from a `Content-Type` value
pub fn charset_label(content_type: &str) -> Option<&str> {
    CHARSET
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn is_fallback_charset(label: &str) -> bool {
    FALLBACK_CHARSETS
        .iter()
        .any(|fallback| label.eq_ignore_ascii_case(fallback))
}

fn decode_text(content_type: Option<&str>, raw: &[u8]) -> DecodedBody {
    let declared = content_type
        .and_then(charset_label)
        .filter(|label| !is_fallback_charset(label))
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    if let Some(encoding) = declared {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(raw) {
            return DecodedBody {
                text: text.into_owned(),
                strategy: DecodeStrategy::Declared(encoding.name()),
            };
        }
        debug!(charset = encoding.name(), "Body does not match declared charset");
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(raw) {
        if let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&raw[bom_len..])
        {
            return DecodedBody {
                text: text.into_owned(),
                strategy: DecodeStrategy::Detected(encoding.name()),
            };
        }
    }

    match std::str::from_utf8(raw) {
        Ok(text) => DecodedBody {
            text: text.to_string(),
            strategy: DecodeStrategy::Detected(UTF_8.name()),
        },
        Err(_) => DecodedBody {
            text: String::from_utf8_lossy(raw).into_owned(),
            strategy: DecodeStrategy::LossyUtf8,
        },
    }
}

#[cfg(feature = "brotli")]
fn decompress_brotli(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    use std::io::Read;

    let mut out = Vec::new();
    brotli::Decompressor::new(raw, 4096).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "brotli"))]
fn decompress_brotli(_raw: &[u8]) -> std::io::Result<Vec<u8>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "brotli support not compiled in",
    ))
}
