//! Route groups and the in-memory data they serve.
//!
//! # Data Flow
//! ```text
//! Dispatched request (RequestContext in extensions)
//!     → group handler (tours, users, reviews, bookings, views)
//!     → Store (Repository per entity)
//!     → success envelope, or AppError to the global error handler
//! ```
//!
//! # Design Decisions
//! - Handlers read input only from the RequestContext, never the raw body
//! - Storage is process-local; there is no persistence layer

pub mod bookings;
pub mod query;
pub mod repository;
pub mod response;
pub mod reviews;
pub mod tours;
pub mod users;
pub mod views;

use std::path::{Path, PathBuf};

use axum::Router;

use crate::config::DataConfig;
use crate::http::AppState;
use crate::routing::RouteGroup;

use bookings::Booking;
use repository::Repository;
use reviews::Review;
use tours::{NewTour, Tour};
use users::UserDirectory;

/// Errors loading seed data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid tour {name:?} in seed file: {message}")]
    InvalidTour { name: String, message: String },
}

/// Every repository the route groups share.
#[derive(Debug, Default)]
pub struct Store {
    pub tours: Repository<Tour>,
    pub users: UserDirectory,
    pub reviews: Repository<Review>,
    pub bookings: Repository<Booking>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from the configured data files.
    pub fn from_config(config: &DataConfig) -> Result<Self, StoreError> {
        let store = Self::new();
        if let Some(path) = &config.tours_file {
            let count = store.seed_tours(path)?;
            tracing::info!(path = %path.display(), count, "Seeded tours");
        }
        Ok(store)
    }

    /// Load a JSON array of tours. Returns how many were added.
    pub fn seed_tours(&self, path: &Path) -> Result<usize, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tours: Vec<NewTour> = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let count = tours.len();
        for tour in tours {
            tour.validate().map_err(|err| StoreError::InvalidTour {
                name: tour.name.clone(),
                message: err.client_message().to_owned(),
            })?;
            self.tours.insert(tour.into_tour());
        }
        Ok(count)
    }
}

/// Router serving one route group, relative to its prefix.
pub fn router_for(group: RouteGroup) -> Router<AppState> {
    match group {
        RouteGroup::Views => views::router(),
        RouteGroup::Tours => tours::router(),
        RouteGroup::Users => users::router(),
        RouteGroup::Reviews => reviews::router(),
        RouteGroup::Bookings => bookings::router(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_seed_tours() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "The Forest Hiker", "duration": 5, "maxGroupSize": 25, "difficulty": "easy", "price": 397}},
                {{"name": "The Sea Explorer", "duration": 7, "maxGroupSize": 15, "difficulty": "medium", "price": 497}}
            ]"#
        )
        .unwrap();

        let store = Store::from_config(&DataConfig {
            tours_file: Some(file.path().to_path_buf()),
        })
        .unwrap();

        let slugs: Vec<_> = store.tours.list().into_iter().map(|t| t.slug).collect();
        assert_eq!(slugs, ["the-forest-hiker", "the-sea-explorer"]);
    }

    #[test]
    fn test_seed_rejects_invalid_tour() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "", "duration": 5, "maxGroupSize": 25, "difficulty": "easy", "price": 397}}]"#
        )
        .unwrap();

        let err = Store::new().seed_tours(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTour { .. }));
    }

    #[test]
    fn test_missing_seed_file() {
        let err = Store::new()
            .seed_tours(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
