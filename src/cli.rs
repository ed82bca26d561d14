//! CLI argument parsing, startup helpers and plain-text rendering of pages.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use url::Url;

use crate::api::models::Place;
use crate::config::{DEFAULT_API_BASE, PortalConfig, parse_api_base};
use crate::error::Error;
use crate::pages::{
    self, AddReviewView, FormError, IndexView, Loaded, PageOutcome, PlaceDetailsView, PriceFilter,
    ReviewForm, Route, format_price,
};
use crate::portal::Portal;
use crate::session::{DEFAULT_TOKEN_TTL_DAYS, FileCookieJar, MAX_TOKEN_TTL_DAYS};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "hbnb", about = "Browse places and post reviews on an HBnB API")]
pub struct Args {
    /// Base URL of the REST API
    #[arg(long, default_value = DEFAULT_API_BASE, value_parser = validate_api_base)]
    pub api_base: Url,

    /// File the session cookie is kept in between runs
    #[arg(long, default_value = "hbnb-cookies.json")]
    pub cookie_file: PathBuf,

    /// Days a login stays valid
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TOKEN_TTL_DAYS)))]
    pub ttl_days: u32,

    /// Per-request timeout in seconds. Waits indefinitely when omitted
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and keep the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// List places
    Places {
        /// Maximum price per night, or "all"
        #[arg(long, default_value = "all")]
        max_price: PriceFilter,
        #[arg(long)]
        country: Option<String>,
    },
    /// Show one place with its reviews
    Place { id: String },
    /// Review a place (requires login)
    Review {
        place_id: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        rating: Option<u8>,
    },
}

fn validate_api_base(s: &str) -> Result<Url, String> {
    parse_api_base(s).map_err(|e| e.to_string())
}

/// Initialize logging based on the specified format. Logs go to stderr so
/// page output on stdout stays clean.
pub fn init_logging(format: &LogFormat) {
    let builder = tracing_subscriber::fmt().with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Build the portal config from the command line.
pub fn build_config(args: &Args) -> PortalConfig {
    PortalConfig::new(args.api_base.clone())
        .with_token_ttl_days(args.ttl_days)
        .with_request_timeout(args.timeout_secs.map(Duration::from_secs))
}

/// Open the cookie file and wire up the portal.
pub fn open_portal(args: &Args) -> Result<Portal, Error> {
    let jar = FileCookieJar::open(&args.cookie_file)?;
    Portal::new(build_config(args), Arc::new(jar))
}

/// Run one subcommand and print the result.
pub async fn run(portal: &Portal, command: &Command) -> ExitCode {
    match command {
        Command::Login { email, password } => {
            let outcome = pages::submit_login(portal, email, password).await;
            if !outcome.is_redirect() {
                return report_form(outcome);
            }
            println!("Logged in as {email}");
            ExitCode::SUCCESS
        }
        Command::Logout => {
            let outcome = pages::logout(portal);
            if !outcome.is_redirect() {
                return report_form(outcome);
            }
            println!("Logged out");
            ExitCode::SUCCESS
        }
        Command::Status => {
            if portal.session().is_authenticated() {
                println!("Logged in");
            } else {
                println!("Not logged in");
            }
            ExitCode::SUCCESS
        }
        Command::Places { max_price, country } => {
            let view = pages::load_index(portal).await;
            print!("{}", render_index(&view, *max_price, country.as_deref()));
            exit_for(view.places.error().is_none())
        }
        Command::Place { id } => {
            let view = pages::load_place_details(portal, id).await;
            print!("{}", render_place_details(&view));
            exit_for(view.ready().is_some())
        }
        Command::Review {
            place_id,
            text,
            rating,
        } => {
            let view = match pages::load_add_review(portal, place_id).await {
                PageOutcome::Render(view) => view,
                redirect => return report_form(redirect),
            };
            print!("{}", render_add_review(&view));
            if view.heading.error().is_some() {
                return ExitCode::FAILURE;
            }

            let form = ReviewForm {
                place_id: view.place_id,
                text: text.clone(),
                rating: *rating,
            };
            report_form(pages::submit_review(portal, &form).await)
        }
    }
}

fn exit_for(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print a form result. Redirects away from the requested page and inline
/// errors both exit with 1, except the success redirects of the forms.
fn report_form<V>(outcome: PageOutcome<V>) -> ExitCode
where
    V: Into<FormErrorText>,
{
    match outcome {
        PageOutcome::Render(view) => {
            let FormErrorText(text) = view.into();
            println!("{text}");
            ExitCode::FAILURE
        }
        PageOutcome::Redirect { to, notice } => {
            if let Some(notice) = &notice {
                println!("{notice}");
            }
            info!(to = %to, "Redirected");
            exit_for(matches!(to, Route::Place(_)))
        }
    }
}

/// Text of an inline form error.
struct FormErrorText(String);

impl From<FormError> for FormErrorText {
    fn from(error: FormError) -> Self {
        Self(error.message)
    }
}

impl From<AddReviewView> for FormErrorText {
    fn from(view: AddReviewView) -> Self {
        Self(view.heading.error().unwrap_or_default().to_string())
    }
}

fn location(place: &Place) -> String {
    [place.city.as_deref(), place.country.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per place that passes the filters.
pub fn render_index(view: &IndexView, price: PriceFilter, country: Option<&str>) -> String {
    let places = match &view.places {
        Loaded::Ready(_) => view.filtered(price, country),
        Loaded::Failed(message) => return format!("{message}\n"),
    };

    let mut out = String::new();
    if places.is_empty() {
        out.push_str("No places found.\n");
    }
    for place in places {
        let _ = write!(out, "{}  {}/night", place.name, format_price(place.price));
        let location = location(place);
        if !location.is_empty() {
            let _ = write!(out, "  {location}");
        }
        let _ = writeln!(out, "  [{}]", place.id);
    }

    let countries = view.countries();
    if !countries.is_empty() {
        let _ = writeln!(out, "Countries: {}", countries.join(", "));
    }
    if !view.authenticated {
        let _ = writeln!(out, "Not logged in. See {}", Route::Login);
    }
    out
}

pub fn render_place_details(view: &Loaded<PlaceDetailsView>) -> String {
    let view = match view {
        Loaded::Ready(view) => view,
        Loaded::Failed(message) => return format!("{message}\n"),
    };
    let place = &view.place;

    let mut out = String::new();
    let _ = writeln!(out, "{}", place.name);
    let _ = writeln!(out, "Host: {}", view.host);
    let _ = writeln!(out, "Price per night: {}", format_price(place.price));
    let location = location(place);
    if !location.is_empty() {
        let _ = writeln!(out, "Location: {location}");
    }
    if let Some(description) = place.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out, "Description: {description}");
    }
    if view.amenities.is_empty() {
        out.push_str("Amenities: none listed\n");
    } else {
        let _ = writeln!(out, "Amenities: {}", view.amenities.join(", "));
    }

    out.push_str("\nReviews\n");
    match &view.reviews {
        Loaded::Failed(message) => {
            let _ = writeln!(out, "{message}");
        }
        Loaded::Ready(reviews) if reviews.is_empty() => out.push_str("No reviews yet.\n"),
        Loaded::Ready(reviews) => {
            for review in reviews {
                let _ = write!(out, "- {}", review.author);
                if let Some(rating) = review.rating {
                    let _ = write!(out, " ({rating}/5)");
                }
                let _ = writeln!(out, ": {}", review.text);
            }
        }
    }

    if let Some(route) = &view.add_review {
        let _ = writeln!(out, "\nAdd a review: {route}");
    }
    out
}

pub fn render_add_review(view: &AddReviewView) -> String {
    match &view.heading {
        Loaded::Ready(heading) => format!("{heading}\n"),
        Loaded::Failed(message) => format!("{message}\n"),
    }
}
