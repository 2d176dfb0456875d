use std::io::Read;

use anyhow::{bail, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use modlog_application::LogSubmission;
use modlog_domain::RuntimeConfig;

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Decodes a JSON submission. `max_bytes` caps the decompressed size.
pub fn parse_submission(
    headers: &HeaderMap,
    body: &[u8],
    max_bytes: u64,
) -> Result<LogSubmission> {
    let content = maybe_gunzip(headers, body, max_bytes)?;
    Ok(serde_json::from_str(&content)?)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], max_bytes: u64) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("").trim().eq_ignore_ascii_case("gzip") {
            let mut decoder = GzDecoder::new(body).take(max_bytes.saturating_add(1));
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            if out.len() as u64 > max_bytes {
                bail!("decompressed body exceeds {} bytes", max_bytes);
            }
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::http::HeaderValue;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    fn config(api_token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: api_token.map(ToString::to_string),
            allowed_channel_ids: Vec::new(),
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
        }
    }

    const LIMIT: u64 = 1024;

    fn gzip(raw: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).expect("compress");
        encoder.finish().expect("finish gzip")
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn bearer_token_is_extracted_and_trimmed() {
        let map = headers(&[("authorization", "Bearer  secret ")]);
        assert_eq!(extract_bearer(&map).as_deref(), Some("secret"));
        assert_eq!(extract_bearer(&headers(&[("authorization", "Basic abc")])), None);
        assert_eq!(extract_bearer(&headers(&[("authorization", "Bearer   ")])), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn authorize_only_checks_when_token_configured() {
        assert!(authorize(&config(None), &HeaderMap::new()));
        let secured = config(Some("secret"));
        assert!(!authorize(&secured, &HeaderMap::new()));
        assert!(!authorize(&secured, &headers(&[("authorization", "Bearer wrong")])));
        assert!(authorize(&secured, &headers(&[("authorization", "Bearer secret")])));
    }

    #[test]
    fn parses_plain_submission_with_defaults() {
        let submission = parse_submission(
            &HeaderMap::new(),
            br#"{"content":"Kick @ ...","channel_id":42}"#,
            LIMIT,
        )
        .expect("parse");
        assert_eq!(submission.content, "Kick @ ...");
        assert_eq!(submission.channel_id, Some(42));
        assert!(submission.attachments.is_empty());
        assert!(!submission.direct_message);
    }

    #[test]
    fn parses_gzip_submission() {
        let body = gzip(br#"{"content":"hello","direct_message":true}"#);

        let submission = parse_submission(&headers(&[("content-encoding", "gzip")]), &body, LIMIT)
            .expect("parse");
        assert_eq!(submission.content, "hello");
        assert!(submission.direct_message);
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert!(parse_submission(&HeaderMap::new(), b"not json", LIMIT).is_err());
        assert!(
            parse_submission(&headers(&[("content-encoding", "gzip")]), b"plain", LIMIT).is_err()
        );
        assert!(parse_submission(&HeaderMap::new(), &[0xff, 0xfe], LIMIT).is_err());
    }

    #[test]
    fn rejects_gzip_that_expands_past_the_limit() {
        let mut raw = br#"{"content":""#.to_vec();
        raw.extend(std::iter::repeat(b'0').take(64 * 1024));
        raw.extend_from_slice(br#""}"#);
        let body = gzip(&raw);
        assert!((body.len() as u64) < LIMIT);

        let err = parse_submission(&headers(&[("content-encoding", "gzip")]), &body, LIMIT)
            .expect_err("oversized body");
        assert!(err.to_string().contains("exceeds 1024 bytes"));

        let exact = gzip(&raw[..LIMIT as usize]);
        let err = parse_submission(&headers(&[("content-encoding", "gzip")]), &exact, LIMIT)
            .expect_err("truncated json is still invalid");
        assert!(!err.to_string().contains("exceeds"));
    }
}
