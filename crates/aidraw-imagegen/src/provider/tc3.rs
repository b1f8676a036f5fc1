//! TC3-HMAC-SHA256 request signing for Tencent Cloud API 3.0

use hmac::{Hmac, Mac};
use jiff::{Timestamp, tz::TimeZone};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::error::{ImageGenError, Result};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub(crate) const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Signs JSON POST requests for a single service
#[derive(Clone)]
pub(crate) struct Tc3Signer {
    secret_id: String,
    secret_key: SecretString,
    service: &'static str,
}

impl Tc3Signer {
    pub fn new(secret_id: String, secret_key: SecretString, service: &'static str) -> Self {
        Self {
            secret_id,
            secret_key,
            service,
        }
    }

    /// Build the `Authorization` header value
    ///
    /// `timestamp` is unix seconds and must match the `X-TC-Timestamp` header.
    pub fn authorization(&self, host: &str, action: &str, payload: &[u8], timestamp: i64) -> Result<String> {
        let date = utc_date(timestamp)?;

        let canonical_request = format!(
            "POST\n/\n\ncontent-type:{CONTENT_TYPE}\nhost:{host}\nx-tc-action:{}\n\n{SIGNED_HEADERS}\n{}",
            action.to_ascii_lowercase(),
            sha256_hex(payload),
        );

        let scope = format!("{date}/{}/tc3_request", self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac_sha256(format!("TC3{}", self.secret_key.expose_secret()).as_bytes(), &date)?;
        let secret_service = hmac_sha256(&secret_date, self.service)?;
        let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
        let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

        Ok(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.secret_id
        ))
    }
}

/// Credential scope date (`YYYY-MM-DD`, UTC) for a unix timestamp
fn utc_date(timestamp: i64) -> Result<String> {
    let ts = Timestamp::from_second(timestamp)
        .map_err(|e| ImageGenError::InvalidRequest(format!("invalid signing timestamp {timestamp}: {e}")))?;

    Ok(ts.to_zoned(TimeZone::UTC).date().to_string())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ImageGenError::InvalidRequest(format!("tc3 invalid hmac key: {e}")))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
