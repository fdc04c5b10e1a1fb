use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};
use common::error::{ConsoleError, ConsoleResult};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tokens handed out by `auth/login/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tokens {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry of an access token. The signature is the server's business, only
/// the `exp` claim is read here.
pub fn expires_at(token: &str) -> ConsoleResult<Option<DateTime<Utc>>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ConsoleError::Common(format!("malformed access token: {}", e)))?;
    Ok(data.claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)))
}

/// A token nobody can read counts as expired; one without `exp` does not.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Ok(Some(exp)) => exp <= now,
        Ok(None) => false,
        Err(e) => {
            debug!("{}", e);
            true
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> ConsoleResult<Option<Tokens>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(serde_json::from_str(&s)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save(path: impl AsRef<Path>, tokens: &Tokens) -> ConsoleResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(tokens)?)?;
    Ok(())
}

pub fn clear(path: impl AsRef<Path>) -> ConsoleResult<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
