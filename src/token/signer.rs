use std::fmt;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac, digest::InvalidLength};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::clock::{Clock, SystemClock};
use crate::error::{IssueError, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Reserved claim holding the absolute expiry in epoch milliseconds.
pub const EXPIRY_CLAIM: &str = "exp";

pub type Payload = serde_json::Map<String, Value>;

/// Issues and validates `<base64url(json)>.<base64url(hmac)>` tokens.
///
/// Nothing is stored server side: a token is accepted when its signature
/// recomputes under the signer's secret and the clock is still before `exp`.
#[derive(Clone)]
pub struct TokenSigner<C = SystemClock> {
    mac: HmacSha256,
    clock: C,
}

impl TokenSigner<SystemClock> {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, InvalidLength> {
        Self::with_clock(secret, SystemClock)
    }
}

impl<C: Clock> TokenSigner<C> {
    pub fn with_clock(secret: impl AsRef<[u8]>, clock: C) -> Result<Self, InvalidLength> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())?;
        Ok(Self { mac, clock })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Signs `claims` with an expiry of now plus `validity`.
    ///
    /// A caller-supplied `exp` key is overwritten.
    pub fn issue<T>(&self, claims: &T, validity: Duration) -> Result<String, IssueError>
    where
        T: Serialize + ?Sized,
    {
        let validity_ms =
            i64::try_from(validity.as_millis()).map_err(|_| IssueError::ExpiryOverflow)?;
        if validity_ms <= 0 {
            return Err(IssueError::NonPositiveValidity);
        }
        let exp = self
            .clock
            .now_millis()
            .checked_add(validity_ms)
            .ok_or(IssueError::ExpiryOverflow)?;

        self.issue_with_expiry(claims, exp)
    }

    /// Signs `claims` with a fixed expiry. Identical inputs give identical tokens.
    pub fn issue_with_expiry<T>(&self, claims: &T, exp: i64) -> Result<String, IssueError>
    where
        T: Serialize + ?Sized,
    {
        let mut payload = match serde_json::to_value(claims)? {
            Value::Object(map) => map,
            _ => return Err(IssueError::NotAnObject),
        };
        payload.insert(EXPIRY_CLAIM.to_owned(), Value::from(exp));

        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);
        let signature = self.sign(&encoded);
        Ok(format!("{encoded}.{signature}"))
    }

    /// Checks a presented token and returns its payload, `exp` included.
    pub fn validate(&self, token: &str) -> Result<Payload, TokenError> {
        let (encoded, signature) = split_token(token)?;

        let expected = self.sign(encoded);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(TokenError::BadSignature);
        }

        let payload = decode_payload(encoded)?;

        // Every issued token carries an expiry; one without is not ours.
        let exp = payload
            .get(EXPIRY_CLAIM)
            .and_then(Value::as_i64)
            .ok_or(TokenError::Malformed)?;
        if self.clock.now_millis() >= exp {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }

    /// Validates and then deserializes the payload into typed claims.
    pub fn validate_as<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let payload = self.validate(token)?;
        serde_json::from_value(Value::Object(payload)).map_err(|_| TokenError::Malformed)
    }

    fn sign(&self, encoded: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(encoded.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

impl<C> fmt::Debug for TokenSigner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

fn split_token(token: &str) -> Result<(&str, &str), TokenError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(encoded), Some(signature), None) if !encoded.is_empty() && !signature.is_empty() => {
            Ok((encoded, signature))
        }
        _ => Err(TokenError::Malformed),
    }
}

fn decode_payload(encoded: &str) -> Result<Payload, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| TokenError::Malformed)?;
    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(TokenError::Malformed),
    }
}
