use std::sync::Arc;

use config::{Config, ConfigError};
use token::{Clock, TokenSigner};

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod result;
pub mod routes;
pub mod session;
pub mod token;

pub type SharedClock = Arc<dyn Clock>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub signer: Arc<TokenSigner<SharedClock>>,
}

impl AppState {
    pub fn new(config: Config, clock: SharedClock) -> Result<Self, ConfigError> {
        let signer = TokenSigner::with_clock(config.token_secret.as_bytes(), clock)
            .map_err(|_| ConfigError::InvalidSecret)?;
        Ok(Self {
            config,
            signer: Arc::new(signer),
        })
    }
}
