//! Pagination and background prefetch for battle sessions.
//!
//! Each session iterates a growing restaurant list two-at-a-time. Advancing
//! the cursor never blocks on the upstream: when the reader gets within a few
//! slots of the end of the current page window and a continuation token is
//! available, a background task fetches the next page and appends it once it
//! resolves. A per-session flag keeps at most one fetch outstanding, and the
//! cursor is clamped to the known frontier so the reader can never outrun the
//! prefetch.

use std::sync::Arc;

use places::{PlacesError, models::{Page, Restaurant}};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    session::{FALLBACK_PAGE_SIZE, Session},
    state::AppState,
};

/// How few unread slots may remain in the current page window before the
/// next page is requested.
pub const PREFETCH_THRESHOLD: usize = 5;

pub struct Advanced {
    pub restaurant: Restaurant,
    pub remaining_count: usize,
}

/// Resume an existing session's current two-restaurant window, or run the
/// first search and open a new session.
///
/// A search that finds nothing is reported as [`AppError::NoRestaurants`]
/// and leaves no session behind.
pub async fn get_or_create_view(
    state: &Arc<AppState>,
    session_id: &str,
    latitude: f64,
    longitude: f64,
    radius: u32,
) -> Result<Vec<Restaurant>, AppError> {
    if let Some(session) = state.sessions.get(session_id) {
        return Ok(session.lock().window());
    }

    let page = state.places.search_nearby(latitude, longitude, radius).await?;
    if page.restaurants.is_empty() {
        return Err(AppError::NoRestaurants);
    }

    let opening_pair: Vec<Restaurant> = page.restaurants.iter().take(2).cloned().collect();

    match state
        .sessions
        .create(session_id, page.restaurants, page.next_page_token)
    {
        Ok(_) => Ok(opening_pair),
        // Another request opened this session while we were searching; its
        // page won, ours is discarded.
        Err(AppError::DuplicateSession) => {
            let session = state
                .sessions
                .get(session_id)
                .ok_or(AppError::UnknownSession)?;
            let window = session.lock().window();
            Ok(window)
        }
        Err(e) => Err(e),
    }
}

/// Move a session's cursor one restaurant forward and kick off a background
/// page fetch if the reader is close to the end of the current window.
pub fn advance(state: &Arc<AppState>, session_id: &str) -> Result<Advanced, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .ok_or(AppError::UnknownSession)?;

    let (advanced, fetch_token) = {
        let mut session = session.lock();
        advance_cursor(&mut session)
    };

    if let Some(token) = fetch_token {
        spawn_prefetch(state.clone(), session_id.to_string(), token);
    }

    Ok(advanced)
}

/// Delete a session if it exists. Absent sessions are fine; any page fetch
/// still in flight for it will find the session gone and discard its result.
pub fn reset(state: &Arc<AppState>, session_id: &str) {
    if state.sessions.delete(session_id) {
        debug!("session {session_id} reset");
    }
}

/// Fold a finished background fetch back into its session.
pub fn complete_fetch(state: &Arc<AppState>, session_id: &str, outcome: Result<Page, PlacesError>) {
    let Some(session) = state.sessions.get(session_id) else {
        debug!("session {session_id} gone before its page fetch finished, discarding");
        return;
    };

    merge_outcome(&mut session.lock(), session_id, outcome);
}

/// Cursor update and trigger evaluation in one step, under the session lock,
/// so two racing advances can never both claim the same trigger. Returns the
/// continuation token to fetch when this advance claimed it.
fn advance_cursor(session: &mut Session) -> (Advanced, Option<String>) {
    session.cursor = (session.cursor + 1).min(session.all.len().saturating_sub(1));

    let token = if session.next_page_token.is_some()
        && !session.fetch_in_flight
        && near_window_end(session.cursor, session.last_page_size)
    {
        session.fetch_in_flight = true;
        session.next_page_token.clone()
    } else {
        None
    };

    let advanced = Advanced {
        restaurant: session.all[session.cursor].clone(),
        remaining_count: session.remaining(),
    };

    (advanced, token)
}

/// True once the reader is within [`PREFETCH_THRESHOLD`] slots of the end of
/// the current page-sized window.
fn near_window_end(cursor: usize, last_page_size: usize) -> bool {
    let page = if last_page_size == 0 {
        FALLBACK_PAGE_SIZE
    } else {
        last_page_size
    };

    if page <= PREFETCH_THRESHOLD {
        return true;
    }

    (cursor + 1) % page >= page - PREFETCH_THRESHOLD
}

fn spawn_prefetch(state: Arc<AppState>, session_id: String, token: String) {
    tokio::spawn(async move {
        debug!("prefetching next page for session {session_id}");
        let outcome = state.places.search_continuation(&token).await;
        complete_fetch(&state, &session_id, outcome);
    });
}

/// A successful non-empty page is appended in order and takes over the
/// pagination fields. Anything else — a failure or an exhausted continuation
/// — only clears the in-flight flag and is never surfaced to a client.
fn merge_outcome(session: &mut Session, session_id: &str, outcome: Result<Page, PlacesError>) {
    match outcome {
        Ok(page) if !page.restaurants.is_empty() => {
            session.last_page_size = page.restaurants.len();
            session.next_page_token = page.next_page_token;
            session.all.extend(page.restaurants);
            debug!(
                "merged prefetched page into session {session_id}, {} known",
                session.all.len()
            );
        }
        Ok(_) => debug!("continuation for session {session_id} returned no results"),
        Err(e) => warn!("background page fetch for session {session_id} failed: {e}"),
    }

    session.fetch_in_flight = false;
}
