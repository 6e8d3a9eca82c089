//! Reviews route group.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::http::AppState;
use crate::pipeline::RequestContext;
use crate::resources::repository::Entity;
use crate::resources::response::{self, parse_body, parse_id, to_values};
use crate::resources::Store;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub review: String,
    pub rating: u8,
    pub tour: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Entity for Review {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub review: String,
    pub rating: u8,
    pub tour: Uuid,
    pub user: Uuid,
}

impl NewReview {
    /// Check the review against the store it will be written to.
    pub fn validate(&self, store: &Store) -> AppResult<()> {
        if self.review.trim().is_empty() {
            return Err(AppError::bad_request("Review can not be empty!"));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::bad_request("Rating must be between 1 and 5"));
        }
        if !store.tours.contains(self.tour) {
            return Err(AppError::not_found("No tour found with that ID"));
        }
        if !store.users.contains(self.user) {
            return Err(AppError::not_found("No user found with that ID"));
        }
        Ok(())
    }

    pub fn into_review(self) -> Review {
        Review {
            id: Uuid::new_v4(),
            review: self.review.trim().to_owned(),
            rating: self.rating,
            tour: self.tour,
            user: self.user,
            created_at: Utc::now(),
        }
    }
}

async fn list_reviews(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let reviews = match ctx.query.get("tour").and_then(|v| v.as_str()) {
        Some(tour) => {
            let tour = parse_id(tour)?;
            state.store.reviews.find(|review| review.tour == tour)
        }
        None => state.store.reviews.list(),
    };
    Ok(response::many("reviews", to_values(&reviews)?))
}

async fn create_review(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let input: NewReview = parse_body(&ctx.body)?;
    input.validate(&state.store)?;
    let review = state.store.reviews.insert(input.into_review());
    response::one(StatusCode::CREATED, "review", review)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_reviews).post(create_review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tour_is_not_found() {
        let store = Store::new();
        let input = NewReview {
            review: "Amazing!".into(),
            rating: 5,
            tour: Uuid::new_v4(),
            user: Uuid::new_v4(),
        };

        let err = input.validate(&store).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "No tour found with that ID");
    }

    #[test]
    fn test_rating_range() {
        let store = Store::new();
        let input = NewReview {
            review: "Meh".into(),
            rating: 0,
            tour: Uuid::new_v4(),
            user: Uuid::new_v4(),
        };
        assert_eq!(
            input.validate(&store).unwrap_err().client_message(),
            "Rating must be between 1 and 5"
        );
    }
}
