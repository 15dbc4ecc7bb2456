//! Stateless signed session tokens.

mod claims;
mod clock;
#[cfg(any(test, feature = "test-util"))]
mod manual_clock;
mod signer;

pub use claims::StudentClaims;
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use manual_clock::ManualClock;
pub use signer::{EXPIRY_CLAIM, Payload, TokenSigner};

pub use crate::error::{IssueError, TokenError};
