// API client module: a small blocking HTTP client for the catalog API.
// One method per remote operation (login, category fetch, price update),
// each issuing exactly one request and never retrying.
//
// `CatalogApi` is the seam the pipeline talks to, so tests (and the UI
// spinner decorator) can stand in for the real client.

use crate::error::{AuthError, FetchError, UpdateError};
use crate::models::{
    Credentials, LoginRequest, LoginResponse, PriceUpdate, Product, ProductPage, SessionToken,
};
use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::Error as _;
use std::time::Duration;

/// What to ask the category endpoint for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub category: String,
    pub limit: usize,
    /// Ask the backend to sort by price descending and cut at `limit`.
    /// When false the whole category is requested unsorted.
    pub server_sorted: bool,
}

/// The three remote operations the repricing flow needs.
pub trait CatalogApi {
    fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError>;

    fn fetch_category(
        &self,
        token: &SessionToken,
        query: &CategoryQuery,
    ) -> Result<Vec<Product>, FetchError>;

    fn update_price(
        &self,
        token: &SessionToken,
        product_id: u64,
        new_price: f64,
    ) -> Result<Product, UpdateError>;
}

/// Blocking client bound to one API base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client for `base_url`. The timeout applies to every call.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Self::with_client(client, base_url)
    }

    /// Use an already configured `reqwest` client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            bail!("API base URL cannot carry a path: {}", base_url);
        }
        Ok(ApiClient { client, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Base URL extended by `segments`, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was ruled out in `with_client`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn category_url(&self, query: &CategoryQuery) -> Url {
        let mut url = self.endpoint(&["auth", "products", "category", &query.category]);
        if query.server_sorted {
            url.query_pairs_mut()
                .append_pair("sortBy", "price")
                .append_pair("order", "desc")
                .append_pair("limit", &query.limit.to_string());
        } else {
            // limit=0 asks the backend for the whole category
            url.query_pairs_mut().append_pair("limit", "0");
        }
        url
    }
}

/// Send a request and read the whole body. Returns the status code and
/// the body text, or the transport error. Bodies are not logged here:
/// the login response carries the access token.
fn exchange(req: RequestBuilder) -> std::result::Result<(u16, String), reqwest::Error> {
    let res: Response = req.send()?;
    let status = res.status();
    let body = res.text()?;
    tracing::info!(status = status.as_u16(), bytes = body.len(), "response received");
    Ok((status.as_u16(), body))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

impl CatalogApi for ApiClient {
    fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let url = self.endpoint(&["auth", "login"]);
        tracing::info!(%url, username = %credentials.username, "POST login");

        let payload = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let (status, body) =
            exchange(self.client.post(url).json(&payload)).map_err(AuthError::TransportError)?;
        if !is_success(status) {
            return Err(AuthError::InvalidCredentials { status, body });
        }

        let resp: LoginResponse = serde_json::from_str(&body).map_err(AuthError::ParseError)?;
        if resp.access_token.is_empty() {
            return Err(AuthError::ParseError(serde_json::Error::custom(
                "accessToken is empty",
            )));
        }
        tracing::debug!(user_id = ?resp.id, username = ?resp.username, "login accepted");
        Ok(SessionToken::new(resp.access_token))
    }

    fn fetch_category(
        &self,
        token: &SessionToken,
        query: &CategoryQuery,
    ) -> Result<Vec<Product>, FetchError> {
        let url = self.category_url(query);
        tracing::info!(%url, "GET category");

        let req = self.client.get(url).bearer_auth(token.as_str());
        let (status, body) = exchange(req).map_err(FetchError::TransportError)?;
        tracing::debug!(%body, "category response body");
        if !is_success(status) {
            return Err(FetchError::FetchFailed { status, body });
        }

        let page: ProductPage = serde_json::from_str(&body).map_err(FetchError::ParseError)?;
        tracing::info!(
            count = page.products.len(),
            total = ?page.total,
            "category page received"
        );
        Ok(page.products)
    }

    fn update_price(
        &self,
        token: &SessionToken,
        product_id: u64,
        new_price: f64,
    ) -> Result<Product, UpdateError> {
        let url = self.endpoint(&["auth", "products", &product_id.to_string()]);
        tracing::info!(%url, new_price, "PUT price");

        let req = self
            .client
            .put(url)
            .bearer_auth(token.as_str())
            .json(&PriceUpdate { price: new_price });
        let (status, body) = exchange(req).map_err(UpdateError::TransportError)?;
        tracing::debug!(%body, "update response body");
        if !is_success(status) {
            return Err(UpdateError::UpdateFailed { status, body });
        }

        serde_json::from_str(&body).map_err(UpdateError::ParseError)
    }
}
