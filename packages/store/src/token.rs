use crate::models::AuthToken;

/// Persistent slot for the session token.
///
/// Implementations swallow storage failures: a token that can't be read is
/// the same as no token, and the user simply signs in again.
pub trait TokenStore {
    fn load(&self) -> Option<AuthToken>;
    fn save(&self, token: &AuthToken);
    fn clear(&self);
}
