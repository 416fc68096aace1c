// Repricing pipeline: login, fetch a category, keep the top-N by price,
// ask for a percentage, then update each selected product in turn.
//
// Login and fetch faults end the run. A rejected fetch is tolerated and
// leaves nothing to update. Update failures are per item: every selected
// product gets its own attempt and its own outcome, and successes are
// never rolled back.

use crate::api::{CatalogApi, CategoryQuery};
use crate::error::{PipelineError, UpdateError};
use crate::models::{Credentials, Product, SessionToken};
use crate::ranking;
use serde::Deserialize;
use std::fmt;
use std::io;
use std::num::NonZeroU32;

/// Where a run currently is. `Failed` is entered when login, the fetch or
/// the terminal itself fails; update failures never lead there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Authenticating,
    Fetching,
    Selecting,
    AwaitingPercentage,
    Updating,
    Reporting,
    Done,
    Failed,
}

/// Who orders the category: the backend (`sortBy=price&order=desc`) or
/// this client after fetching the whole category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    #[default]
    Server,
    Client,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub category: String,
    pub top_n: usize,
    pub ranking: RankingMode,
}

/// The interactive side of a run.
pub trait Console {
    /// Non-empty username and password.
    fn credentials(&mut self) -> io::Result<Credentials>;

    /// Percentage to raise prices by. Implementations keep asking until
    /// they get a positive integer.
    fn percentage(&mut self) -> io::Result<NonZeroU32>;

    fn show_selection(&mut self, products: &[Product]);

    fn show_outcome(&mut self, outcome: &UpdateOutcome);

    fn show_notice(&mut self, message: &str);
}

/// How the catalog fetch went. A failed fetch and a successful empty page
/// both leave nothing to update but are reported differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Fetched { count: usize },
    FetchFailed { reason: String },
}

/// Result of one price update attempt.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// `updated` is the record returned by the server; its price is the
    /// one to show even if it differs from what was requested.
    Updated { original: Product, updated: Product },
    Failed {
        original: Product,
        requested_price: f64,
        error: UpdateError,
    },
}

impl UpdateOutcome {
    pub fn original(&self) -> &Product {
        match self {
            UpdateOutcome::Updated { original, .. } | UpdateOutcome::Failed { original, .. } => {
                original
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::Updated { updated, .. } => write!(
                f,
                "Updated {} - {}: ${:.2}",
                updated.brand, updated.title, updated.price
            ),
            UpdateOutcome::Failed {
                original, error, ..
            } => write!(f, "Failed to update {}: {}", original.title, error),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub fetch: FetchStatus,
    pub selected: Vec<Product>,
    pub outcomes: Vec<UpdateOutcome>,
}

impl RunReport {
    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.updated_count()
    }
}

pub struct Pipeline<A, C> {
    api: A,
    console: C,
    options: PipelineOptions,
    stage: Stage,
}

impl<A: CatalogApi, C: Console> Pipeline<A, C> {
    pub fn new(api: A, console: C, options: PipelineOptions) -> Self {
        Pipeline {
            api,
            console,
            options,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn enter(&mut self, stage: Stage) {
        tracing::info!(from = ?self.stage, to = ?stage, "stage transition");
        self.stage = stage;
    }

    /// Run the whole flow once.
    pub fn run(&mut self) -> Result<RunReport, PipelineError> {
        let result = self.run_stages();
        if result.is_err() {
            self.enter(Stage::Failed);
        }
        result
    }

    fn run_stages(&mut self) -> Result<RunReport, PipelineError> {
        self.enter(Stage::Authenticating);
        let token = self.authenticate()?;

        self.enter(Stage::Fetching);
        let (fetch, products) = self.fetch(&token)?;

        self.enter(Stage::Selecting);
        let selected = self.select(products);
        self.console.show_selection(&selected);

        if selected.is_empty() {
            let notice = match &fetch {
                FetchStatus::Fetched { .. } => {
                    format!("No products found in category '{}'.", self.options.category)
                }
                FetchStatus::FetchFailed { .. } => {
                    "Could not load products; nothing to update.".to_string()
                }
            };
            self.console.show_notice(&notice);
            self.enter(Stage::Reporting);
            self.enter(Stage::Done);
            return Ok(RunReport {
                fetch,
                selected,
                outcomes: Vec::new(),
            });
        }

        self.enter(Stage::AwaitingPercentage);
        let percent = self.console.percentage()?;
        tracing::info!(percent = percent.get(), "price increase chosen");

        self.enter(Stage::Updating);
        let outcomes = self.update_all(&token, &selected, percent.get());

        self.enter(Stage::Reporting);
        for outcome in &outcomes {
            self.console.show_outcome(outcome);
        }
        let report = RunReport {
            fetch,
            selected,
            outcomes,
        };
        tracing::info!(
            updated = report.updated_count(),
            failed = report.failed_count(),
            "run finished"
        );
        self.enter(Stage::Done);
        Ok(report)
    }

    fn authenticate(&mut self) -> Result<SessionToken, PipelineError> {
        // Credentials are dropped as soon as the login call returns.
        let credentials = self.console.credentials()?;
        match self.api.login(&credentials) {
            Ok(token) => {
                tracing::info!(user = %credentials.username, "login successful");
                Ok(token)
            }
            Err(e) => {
                tracing::error!(user = %credentials.username, error = %e, "login failed");
                Err(e.into())
            }
        }
    }

    fn fetch(&self, token: &SessionToken) -> Result<(FetchStatus, Vec<Product>), PipelineError> {
        let query = CategoryQuery {
            category: self.options.category.clone(),
            limit: self.options.top_n,
            server_sorted: self.options.ranking == RankingMode::Server,
        };
        match self.api.fetch_category(token, &query) {
            Ok(products) => {
                let status = FetchStatus::Fetched {
                    count: products.len(),
                };
                Ok((status, products))
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    category = %query.category,
                    error = %e,
                    "catalog fetch rejected, continuing with no products"
                );
                let status = FetchStatus::FetchFailed {
                    reason: e.to_string(),
                };
                Ok((status, Vec::new()))
            }
            Err(e) => {
                tracing::error!(category = %query.category, error = %e, "catalog fetch failed");
                Err(e.into())
            }
        }
    }

    fn select(&self, products: Vec<Product>) -> Vec<Product> {
        let n = self.options.top_n;
        match self.options.ranking {
            RankingMode::Server if ranking::is_ranked(&products, n) => products,
            RankingMode::Server => {
                tracing::warn!(
                    count = products.len(),
                    top_n = n,
                    "server ordering not as requested, re-ranking locally"
                );
                ranking::top_n(&products, n)
            }
            RankingMode::Client => ranking::top_n(&products, n),
        }
    }

    fn update_all(
        &self,
        token: &SessionToken,
        selected: &[Product],
        percent: u32,
    ) -> Vec<UpdateOutcome> {
        selected
            .iter()
            .map(|product| self.update_one(token, product, percent))
            .collect()
    }

    fn update_one(&self, token: &SessionToken, product: &Product, percent: u32) -> UpdateOutcome {
        let requested_price = product.increased_by(percent);
        if !requested_price.is_finite() || requested_price < 0.0 {
            tracing::warn!(id = product.id, requested_price, "skipping invalid price");
            return UpdateOutcome::Failed {
                original: product.clone(),
                requested_price,
                error: UpdateError::InvalidPrice(requested_price),
            };
        }

        match self.api.update_price(token, product.id, requested_price) {
            Ok(updated) => {
                if updated.price != requested_price {
                    tracing::info!(
                        id = product.id,
                        requested_price,
                        server_price = updated.price,
                        "server adjusted price"
                    );
                }
                UpdateOutcome::Updated {
                    original: product.clone(),
                    updated,
                }
            }
            Err(error) => {
                tracing::error!(id = product.id, %error, "price update failed");
                UpdateOutcome::Failed {
                    original: product.clone(),
                    requested_price,
                    error,
                }
            }
        }
    }
}
