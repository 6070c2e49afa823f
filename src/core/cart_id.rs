//! Cart identity - Correlates cart rows to a shopper's session without a login.
//!
//! The session is passed in explicitly as anything implementing [`Session`]; the
//! identifier lives under [`CART_ID_SESSION_KEY`]. An absent or empty value means
//! "no cart yet" and a fresh random token is generated and stored.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Session key holding the cart token.
pub const CART_ID_SESSION_KEY: &str = "cart_id";

/// Length of a generated cart token.
pub const CART_ID_LENGTH: usize = 50;

/// Symbols a generated token is drawn from.
pub const CART_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz1234567890!@#$%^&*()";

/// Opaque cart token.
///
/// Not guaranteed unique: no lookup against existing carts is made, and a collision
/// would merge two carts. With 72^50 possible tokens this is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(String);

impl CartId {
    /// Wraps a token read from a session or another trusted source.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps into the raw token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CartId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// String key/value session storage the cart id is kept in.
pub trait Session {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<&str>;
    /// Stores `value` under `key`, replacing any previous value.
    fn insert(&mut self, key: &str, value: String);
}

/// In-memory [`Session`] backed by a `HashMap`.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Session for MemorySession {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Generates a random token of [`CART_ID_LENGTH`] symbols from [`CART_ID_ALPHABET`].
pub fn generate_cart_id<R: Rng + ?Sized>(rng: &mut R) -> CartId {
    let token = (0..CART_ID_LENGTH)
        .map(|_| char::from(CART_ID_ALPHABET[rng.gen_range(0..CART_ID_ALPHABET.len())]))
        .collect();
    CartId(token)
}

/// Returns the session's cart id, generating and storing one if absent or empty.
pub fn resolve_or_create_cart_id<S: Session + ?Sized>(session: &mut S) -> CartId {
    resolve_or_create_cart_id_with(session, &mut rand::thread_rng())
}

/// [`resolve_or_create_cart_id`] with an explicit random source.
pub fn resolve_or_create_cart_id_with<S, R>(session: &mut S, rng: &mut R) -> CartId
where
    S: Session + ?Sized,
    R: Rng + ?Sized,
{
    if let Some(existing) = session.get(CART_ID_SESSION_KEY).filter(|v| !v.is_empty()) {
        return CartId::new(existing);
    }

    let cart_id = generate_cart_id(rng);
    session.insert(CART_ID_SESSION_KEY, cart_id.as_str().to_string());
    debug!("Assigned new cart id to session");
    cart_id
}
