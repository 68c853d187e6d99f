// src/redis/tls.rs

use crate::error::{AppError, AppResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;

const PEM_BEGIN: &str = "-----BEGIN";

/// Read a base64-encoded PEM CA certificate and return the decoded PEM bytes.
pub fn load_root_cert(path: &Path) -> AppResult<Vec<u8>> {
    let encoded = fs::read_to_string(path).map_err(|e| cert_err(path, format!("unreadable: {e}")))?;
    decode_root_cert(&encoded).map_err(|reason| cert_err(path, reason))
}

/// Base64 -> PEM. Line breaks and surrounding whitespace in the encoded form
/// are ignored.
pub fn decode_root_cert(encoded: &str) -> Result<Vec<u8>, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err("file is empty".into());
    }

    let decoded = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("not valid base64: {e}"))?;

    let pem = std::str::from_utf8(&decoded).map_err(|_| "decoded certificate is not UTF-8 PEM".to_string())?;
    if !pem.contains(PEM_BEGIN) {
        return Err("decoded content has no PEM block".into());
    }

    Ok(decoded)
}

fn cert_err(path: &Path, reason: impl Into<String>) -> AppError {
    AppError::Certificate {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUQ==\n-----END CERTIFICATE-----\n";

    fn encoded() -> String {
        STANDARD.encode(PEM)
    }

    #[test]
    fn decodes_wrapped_base64() {
        let enc = encoded();
        let (a, b) = enc.split_at(enc.len() / 2);
        let wrapped = format!("{a}\n{b}\n");

        let pem = decode_root_cert(&wrapped).unwrap();
        assert_eq!(pem, PEM.as_bytes());
    }

    #[test]
    fn rejects_plain_pem() {
        // a raw PEM file is not what REDIS_CERT_PATH is expected to hold
        let err = decode_root_cert(PEM).unwrap_err();
        assert!(err.contains("base64"), "{err}");
    }

    #[test]
    fn rejects_base64_that_is_not_pem() {
        let err = decode_root_cert(&STANDARD.encode("hello world")).unwrap_err();
        assert!(err.contains("PEM"), "{err}");
    }

    #[test]
    fn rejects_empty() {
        assert!(decode_root_cert(" \n").is_err());
    }

    #[test]
    fn missing_file_is_certificate_error() {
        let path = std::env::temp_dir().join(format!("redis-metrics-missing-{}", std::process::id()));
        let err = load_root_cert(&path).unwrap_err();
        assert!(matches!(err, AppError::Certificate { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("redis-metrics-ca-{}.b64", std::process::id()));
        fs::write(&path, encoded()).unwrap();

        let pem = load_root_cert(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert!(std::str::from_utf8(&pem).unwrap().starts_with(PEM_BEGIN));
    }
}
