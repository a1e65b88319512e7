//! Credential loading for the Google backends.
//!
//! Obtaining and refreshing tokens is out of scope for this tool; it reads
//! an already-provisioned bearer token from a credentials file (the token
//! cache written by whatever OAuth flow the operator uses). Two shapes are
//! accepted:
//!
//! * JSON with an `access_token` (or `token`) string field
//! * a bare token on a single line
//!
//! A missing or unusable file is fatal to the whole run: no document could
//! be processed without it.

use crate::error::MigrateError;
use std::path::Path;

/// Read the bearer token from the credentials/token-cache file.
pub fn load_access_token(path: &Path) -> Result<String, MigrateError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MigrateError::CredentialsNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(MigrateError::CredentialsInvalid {
                path: path.to_path_buf(),
                detail: e.to_string(),
            });
        }
    };

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
        for key in ["access_token", "token"] {
            if let Some(token) = value.get(key).and_then(|v| v.as_str()) {
                if !token.is_empty() {
                    return Ok(token.to_string());
                }
            }
        }
        return Err(MigrateError::CredentialsInvalid {
            path: path.to_path_buf(),
            detail: "JSON has no non-empty \"access_token\" or \"token\" field".to_string(),
        });
    }

    // Bare token file: a single non-empty line.
    let trimmed = raw.trim();
    if !trimmed.is_empty() && !trimmed.contains(char::is_whitespace) {
        return Ok(trimmed.to_string());
    }

    Err(MigrateError::CredentialsInvalid {
        path: path.to_path_buf(),
        detail: "neither JSON nor a bare token".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_creds(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn json_access_token_field() {
        let f = write_creds(r#"{"access_token": "ya29.abc", "expiry": "2026-01-01"}"#);
        assert_eq!(load_access_token(f.path()).unwrap(), "ya29.abc");
    }

    #[test]
    fn json_token_field_fallback() {
        let f = write_creds(r#"{"token": "ya29.xyz"}"#);
        assert_eq!(load_access_token(f.path()).unwrap(), "ya29.xyz");
    }

    #[test]
    fn bare_token_line() {
        let f = write_creds("ya29.bare-token\n");
        assert_eq!(load_access_token(f.path()).unwrap(), "ya29.bare-token");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_access_token(Path::new("/no/such/creds.json")).unwrap_err();
        assert!(matches!(err, MigrateError::CredentialsNotFound { .. }));
    }

    #[test]
    fn json_without_token_is_invalid() {
        let f = write_creds(r#"{"refresh_token": "only"}"#);
        let err = load_access_token(f.path()).unwrap_err();
        assert!(matches!(err, MigrateError::CredentialsInvalid { .. }));
    }
}
