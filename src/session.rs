//! Student account creation and sign-in.
//!
//! Both end by handing out a fresh session token, the same way the portal
//! does after it has checked the password.

use std::time::Duration;

use thiserror::Error;

use crate::{
    error::IssueError,
    password::{PasswordError, PasswordHash, hash_password, validate_new_password, verify_password},
    token::{Clock, StudentClaims, TokenSigner},
};

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("गलत कक्षा, रोल नंबर या पासवर्ड।")]
    InvalidCredentials,
    #[error("इस छात्र का खाता पहले से बन चुका है। लॉगिन करें।")]
    AccountExists,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Issue(#[from] IssueError),
}

/// A newly created account: the hash to store and the first session token.
#[derive(Debug)]
pub struct NewAccount {
    pub password: PasswordHash,
    pub token: String,
}

/// Checks `password` against the stored hash and issues a session token.
///
/// `stored` is `None` for a student the teacher registered who has not
/// created an account yet.
pub fn sign_in<C: Clock>(
    signer: &TokenSigner<C>,
    student_id: &str,
    stored: Option<&PasswordHash>,
    password: &str,
    validity: Duration,
) -> Result<String, SignInError> {
    let stored = stored.ok_or(SignInError::InvalidCredentials)?;
    if !verify_password(password, stored) {
        tracing::debug!("password mismatch for student {}", student_id);
        return Err(SignInError::InvalidCredentials);
    }

    Ok(signer.issue(&StudentClaims::new(student_id), validity)?)
}

/// Sets the first password of a teacher-registered student.
pub fn create_account<C: Clock>(
    signer: &TokenSigner<C>,
    student_id: &str,
    existing: Option<&PasswordHash>,
    password: &str,
    confirm: &str,
    validity: Duration,
) -> Result<NewAccount, SignInError> {
    if existing.is_some_and(|stored| !stored.hash.is_empty() && !stored.salt.is_empty()) {
        return Err(SignInError::AccountExists);
    }
    validate_new_password(password, confirm)?;

    let token = signer.issue(&StudentClaims::new(student_id), validity)?;
    tracing::info!("created account for student {}", student_id);
    Ok(NewAccount {
        password: hash_password(password),
        token,
    })
}
