//! # Places
//!
//! Client for the upstream places-search API.
//!
//! Stateless request/response wrapper: nearby search, page-token
//! continuation, text search for autocomplete, detail lookup, and the photo
//! proxy. Continuation tokens are not valid immediately after the upstream
//! issues them, so [`PlacesClient::search_continuation`] waits a settle delay
//! before the first attempt and retries exactly once before treating the
//! token as exhausted.

use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

pub mod models;

use models::{DetailsResponse, Page, Photo, PlaceSummary, Restaurant, SearchResponse};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
pub const STATUS_INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// How long a freshly issued page token needs before the upstream accepts it.
pub const TOKEN_SETTLE: Duration = Duration::from_secs(2);
/// Backoff before the single retry when a token is still propagating.
pub const TOKEN_RETRY: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places API error: {status} {message}")]
    Status { status: String, message: String },

    #[error("Place not found")]
    UnknownPlace,

    #[error("Places API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

enum TokenPage {
    Ready(Page),
    NotReady,
}

pub struct PlacesClient {
    http: Client,
    base_url: String,
    api_key: String,
    token_settle: Duration,
    token_retry: Duration,
}

impl PlacesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            token_settle: TOKEN_SETTLE,
            token_retry: TOKEN_RETRY,
        }
    }

    /// Override the token pacing, mainly so tests run without real sleeps.
    pub fn with_delays(mut self, settle: Duration, retry: Duration) -> Self {
        self.token_settle = settle;
        self.token_retry = retry;
        self
    }

    pub async fn search_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius: u32,
    ) -> Result<Page, PlacesError> {
        let response: SearchResponse = self
            .http
            .get(format!("{}/nearbysearch/json", self.base_url))
            .query(&[
                ("location", format!("{latitude},{longitude}")),
                ("radius", radius.to_string()),
                ("type", "restaurant".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .json()
            .await?;

        into_page(response)
    }

    /// Fetch the page behind a continuation token.
    ///
    /// A token that never becomes valid is reported as an empty page with no
    /// follow-up token rather than an error, so callers treat it the same as
    /// running out of results.
    pub async fn search_continuation(&self, token: &str) -> Result<Page, PlacesError> {
        sleep(self.token_settle).await;

        match self.fetch_token_page(token).await? {
            TokenPage::Ready(page) => Ok(page),
            TokenPage::NotReady => {
                sleep(self.token_retry).await;
                match self.fetch_token_page(token).await? {
                    TokenPage::Ready(page) => Ok(page),
                    TokenPage::NotReady => {
                        warn!("page token never became valid, treating as end of results");
                        Ok(Page::default())
                    }
                }
            }
        }
    }

    async fn fetch_token_page(&self, token: &str) -> Result<TokenPage, PlacesError> {
        let response: SearchResponse = self
            .http
            .get(format!("{}/nearbysearch/json", self.base_url))
            .query(&[("pagetoken", token), ("key", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if response.status == STATUS_INVALID_REQUEST {
            return Ok(TokenPage::NotReady);
        }
        into_page(response).map(TokenPage::Ready)
    }

    pub async fn search_by_text(&self, query: &str) -> Result<Vec<PlaceSummary>, PlacesError> {
        let response: SearchResponse = self
            .http
            .get(format!("{}/textsearch/json", self.base_url))
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        match response.status.as_str() {
            STATUS_OK => Ok(response
                .results
                .into_iter()
                .map(PlaceSummary::from)
                .collect()),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            _ => Err(status_error(response.status, response.error_message)),
        }
    }

    pub async fn lookup_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<Restaurant, PlacesError> {
        let fields = fields.join(",");
        let response: DetailsResponse = self
            .http
            .get(format!("{}/details/json", self.base_url))
            .query(&[
                ("place_id", place_id),
                ("fields", fields.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        match response.status.as_str() {
            STATUS_OK => response
                .result
                .map(Restaurant::from)
                .ok_or(PlacesError::UnknownPlace),
            STATUS_NOT_FOUND | STATUS_ZERO_RESULTS => Err(PlacesError::UnknownPlace),
            _ => Err(status_error(response.status, response.error_message)),
        }
    }

    pub async fn fetch_photo(
        &self,
        photo_reference: &str,
        max_width: u32,
    ) -> Result<Photo, PlacesError> {
        let max_width = max_width.to_string();
        let response = self
            .http
            .get(format!("{}/photo", self.base_url))
            .query(&[
                ("photoreference", photo_reference),
                ("maxwidth", max_width.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(Photo {
            status,
            content_type,
            bytes,
        })
    }
}

fn into_page(response: SearchResponse) -> Result<Page, PlacesError> {
    match response.status.as_str() {
        STATUS_OK => Ok(Page {
            restaurants: response
                .results
                .into_iter()
                .map(Restaurant::from)
                .collect(),
            next_page_token: response.next_page_token,
        }),
        STATUS_ZERO_RESULTS => Ok(Page::default()),
        _ => Err(status_error(response.status, response.error_message)),
    }
}

fn status_error(status: String, message: Option<String>) -> PlacesError {
    PlacesError::Status {
        status,
        message: message.unwrap_or_default(),
    }
}
