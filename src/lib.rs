// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive
// repricing tool; tests drive the same modules with fakes.
//
// Module responsibilities:
// - `models`: product, credential and token types plus wire payloads.
// - `error`: error kinds for login, fetch, update and the whole run.
// - `api`: the `CatalogApi` seam and the blocking HTTP client behind it.
// - `ranking`: client-side top-N by price.
// - `pipeline`: the login -> fetch -> rank -> prompt -> update flow.
// - `config`: settings from TOML and environment.
// - `ui`: terminal prompts, spinner and result rendering.
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod ui;
