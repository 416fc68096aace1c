// Data shapes exchanged with the catalog API.
//
// `Product` keeps only the fields the repricing flow reads as typed
// fields; everything else the backend sends (stock, reviews, dimensions,
// images, ...) is captured verbatim in `extra` so nothing is lost when a
// record is displayed or logged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Username/password pair collected from the user. Only lives for the
/// duration of the login call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Bearer token returned by a successful login. Read-only for the rest
/// of the run.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        SessionToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// A catalog product. `id` is assigned by the server and never changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Every other attribute the backend returned, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Price after applying a percentage increase.
    pub fn increased_by(&self, percent: u32) -> f64 {
        self.price + self.price * f64::from(percent) / 100.0
    }
}

/// Envelope of the category endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    pub total: Option<u64>,
}

/// Login request payload.
#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Expected response from the login endpoint. Only `accessToken` is
/// needed; `id` and `username` are logged. Other profile fields are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub id: Option<u64>,
    pub username: Option<String>,
}

/// Body of the price update call.
#[derive(Serialize, Debug, PartialEq)]
pub struct PriceUpdate {
    pub price: f64,
}
