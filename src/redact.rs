// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Secret masking for diagnostic output

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HEADER_SECRET: Regex = Regex::new(
        r#"(?i)("?(?:user-api-key|api-key|authorization|x-csrf-token)"?\s*[:=]\s*)("[^"]*"|(?:(?:bearer|basic)\s+)?[^\s,}]+)"#
    )
    .expect("header secret pattern is valid");
    static ref PASSWORD_FIELD: Regex =
        Regex::new(r#"(?i)("password"\s*:\s*)"(?:[^"\\]|\\.)*""#).expect("password pattern is valid");
}

const REDACTED: &str = "<redacted>";

/// Mask credential-bearing header values and JSON password fields
pub fn redact_secrets(input: &str) -> String {
    let masked = HEADER_SECRET.replace_all(input, format!("${{1}}{}", REDACTED).as_str());
    PASSWORD_FIELD
        .replace_all(&masked, format!("${{1}}\"{}\"", REDACTED).as_str())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_header_lines() {
        let out = redact_secrets("Api-Key: abc123 Authorization: Bearer xyz");
        assert_eq!(out, "Api-Key: <redacted> Authorization: <redacted>");
    }

    #[test]
    fn test_masks_header_map_debug() {
        let out = redact_secrets(r#"{"x-csrf-token": "tok-1", "accept": "application/json"}"#);
        assert!(!out.contains("tok-1"));
        assert!(out.contains("\"accept\": \"application/json\""));
    }

    #[test]
    fn test_masks_password_field() {
        let out = redact_secrets(r#"{"login":"alice","password":"s3\"cret","remember":true}"#);
        assert_eq!(out, r#"{"login":"alice","password":"<redacted>","remember":true}"#);
    }
}
