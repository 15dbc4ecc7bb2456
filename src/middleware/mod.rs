mod auth;

pub use auth::{auth_middleware, extract_token, token_from_body};
