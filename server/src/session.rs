//! Per-client battle session state.
//!
//! One [`Session`] per client-supplied session id. The restaurant list is
//! append-only and keeps the upstream result order; only the cursor, the
//! continuation token, and the fetch flag ever change after creation.

use std::{collections::HashMap, sync::Arc};

use parking_lot::{Mutex, RwLock};
use places::models::Restaurant;

use crate::error::AppError;

/// Page size assumed for prefetch scheduling until the upstream reports one.
pub const FALLBACK_PAGE_SIZE: usize = 20;

pub struct Session {
    pub all: Vec<Restaurant>,
    pub cursor: usize,
    pub next_page_token: Option<String>,
    pub last_page_size: usize,
    pub fetch_in_flight: bool,
}

impl Session {
    /// The opening request hands the first two restaurants to the client, so
    /// a fresh session starts with the cursor on the second entry (clamped
    /// when the first page has a single result).
    pub fn new(restaurants: Vec<Restaurant>, next_page_token: Option<String>) -> Self {
        let last_page_size = restaurants.len();

        Self {
            cursor: 1.min(restaurants.len().saturating_sub(1)),
            all: restaurants,
            next_page_token,
            last_page_size,
            fetch_in_flight: false,
        }
    }

    /// Up to two restaurants starting at the cursor.
    pub fn window(&self) -> Vec<Restaurant> {
        let end = (self.cursor + 2).min(self.all.len());
        self.all[self.cursor..end].to_vec()
    }

    /// Restaurants known beyond the cursor.
    pub fn remaining(&self) -> usize {
        self.all.len().saturating_sub(self.cursor + 1)
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn create(
        &self,
        id: &str,
        restaurants: Vec<Restaurant>,
        next_page_token: Option<String>,
    ) -> Result<Arc<Mutex<Session>>, AppError> {
        let mut sessions = self.sessions.write();

        if sessions.contains_key(id) {
            return Err(AppError::DuplicateSession);
        }

        let session = Arc::new(Mutex::new(Session::new(restaurants, next_page_token)));
        sessions.insert(id.to_string(), session.clone());

        Ok(session)
    }

    pub fn delete(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use places::models::{LatLng, Restaurant};

    use super::{Session, SessionStore};

    fn restaurant(n: usize) -> Restaurant {
        Restaurant {
            place_id: format!("place-{n}"),
            name: format!("Restaurant {n}"),
            vicinity: format!("{n} Main St"),
            rating: 4.0,
            user_ratings_total: 10,
            price_level: 1,
            photo_reference: String::new(),
            location: LatLng { lat: 40.4, lng: -86.9 },
            open_now: Some(true),
        }
    }

    fn restaurants(count: usize) -> Vec<Restaurant> {
        (0..count).map(restaurant).collect()
    }

    #[test]
    fn fresh_session_starts_past_the_opening_pair() {
        let session = Session::new(restaurants(20), Some("tok".into()));

        assert_eq!(session.cursor, 1);
        assert_eq!(session.last_page_size, 20);
        assert_eq!(session.remaining(), 18);
        assert!(!session.fetch_in_flight);
    }

    #[test]
    fn single_result_session_clamps_cursor() {
        let session = Session::new(restaurants(1), None);

        assert_eq!(session.cursor, 0);
        assert_eq!(session.remaining(), 0);
        assert_eq!(session.window().len(), 1);
    }

    #[test]
    fn window_is_two_wide_until_the_list_ends() {
        let mut session = Session::new(restaurants(3), None);
        assert_eq!(
            session
                .window()
                .iter()
                .map(|r| r.place_id.as_str())
                .collect::<Vec<_>>(),
            vec!["place-1", "place-2"]
        );

        session.cursor = 2;
        assert_eq!(session.window().len(), 1);
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let store = SessionStore::default();
        store.create("abc", restaurants(2), None).unwrap();

        assert!(store.create("abc", restaurants(2), None).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = SessionStore::default();
        store.create("abc", restaurants(2), None).unwrap();

        assert!(store.delete("abc"));
        assert!(!store.delete("abc"));
        assert!(store.is_empty());
    }
}
