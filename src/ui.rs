// UI layer: the terminal side of a repricing run, built on `dialoguer`
// prompts, an `indicatif` spinner while requests are in flight, and
// `crossterm` colours for the result lines.

use crate::api::{CatalogApi, CategoryQuery};
use crate::error::{AuthError, FetchError, PipelineError, UpdateError};
use crate::models::{Credentials, Product, SessionToken};
use crate::pipeline::{Console, RunReport, UpdateOutcome};
use crossterm::style::{style, Stylize};
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::num::NonZeroU32;
use std::time::Duration;

/// `Console` backed by the real terminal.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn credentials(&mut self) -> io::Result<Credentials> {
        // `Password` refuses empty input by default and hides it.
        let username: String = Input::new()
            .with_prompt("Please enter a Username")
            .validate_with(|u: &String| check_username(u))
            .interact_text()?;
        let password: String = Password::new()
            .with_prompt("Please enter a Password")
            .interact()?;
        Ok(Credentials::new(username.trim(), password))
    }

    fn percentage(&mut self) -> io::Result<NonZeroU32> {
        // Non-numeric input is re-prompted by `interact_text` itself; the
        // validator catches zero.
        let percent: u32 = Input::new()
            .with_prompt("Enter percentage to increase price")
            .validate_with(|p: &u32| -> Result<(), &'static str> {
                if *p > 0 {
                    Ok(())
                } else {
                    Err("Invalid input. Please enter a positive integer.")
                }
            })
            .interact_text()?;
        NonZeroU32::new(percent).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "percentage must be positive")
        })
    }

    fn show_selection(&mut self, products: &[Product]) {
        if products.is_empty() {
            return;
        }
        println!(
            "{}",
            style(format!("The {} most expensive products:", products.len())).bold()
        );
        for p in products {
            println!("{} - {}: ${}", p.brand, p.title, p.price);
        }
    }

    fn show_outcome(&mut self, outcome: &UpdateOutcome) {
        let line = outcome.to_string();
        if outcome.is_success() {
            println!("{}", style(line).green());
        } else {
            println!("{}", style(line).red());
        }
    }

    fn show_notice(&mut self, message: &str) {
        println!("{}", style(message).yellow());
    }
}

/// Usernames made only of whitespace would reach the login call empty.
fn check_username(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("Username must not be empty")
    } else {
        Ok(())
    }
}

/// Print the closing tally of a finished run.
pub fn print_summary(report: &RunReport) {
    if report.outcomes.is_empty() {
        return;
    }
    println!(
        "{} updated, {} failed.",
        report.updated_count(),
        report.failed_count()
    );
}

/// Turn a fatal pipeline error into the message shown to the user.
pub fn failure_message(err: &PipelineError) -> String {
    match err {
        PipelineError::Auth(AuthError::InvalidCredentials { .. }) => {
            "Login failed: Invalid credentials\n\
             This application requires a valid username and password."
                .to_string()
        }
        PipelineError::Auth(e) => format!("Login failed: {}", e),
        PipelineError::Fetch(e) => format!("Could not load products: {}", e),
        PipelineError::Console(e) => format!("Terminal input failed: {}", e),
    }
}

pub fn print_failure(message: &str) {
    eprintln!("{}", style(message).red().bold());
}

/// Wraps any `CatalogApi` and shows a spinner while each call runs.
pub struct Spinning<A> {
    inner: A,
}

impl<A> Spinning<A> {
    pub fn new(inner: A) -> Self {
        Spinning { inner }
    }

    fn with_spinner<T>(&self, message: &'static str, call: impl FnOnce(&A) -> T) -> T {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        let out = call(&self.inner);
        spinner.finish_and_clear();
        out
    }
}

impl<A: CatalogApi> CatalogApi for Spinning<A> {
    fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        self.with_spinner("Logging in...", |api| api.login(credentials))
    }

    fn fetch_category(
        &self,
        token: &SessionToken,
        query: &CategoryQuery,
    ) -> Result<Vec<Product>, FetchError> {
        self.with_spinner("Loading products...", |api| api.fetch_category(token, query))
    }

    fn update_price(
        &self,
        token: &SessionToken,
        product_id: u64,
        new_price: f64,
    ) -> Result<Product, UpdateError> {
        self.with_spinner("Updating price...", |api| {
            api.update_price(token, product_id, new_price)
        })
    }
}
