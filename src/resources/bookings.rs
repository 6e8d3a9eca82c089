//! Bookings route group.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::http::extract::Path;
use crate::http::AppState;
use crate::pipeline::RequestContext;
use crate::resources::query::ListQuery;
use crate::resources::repository::Entity;
use crate::resources::response::{self, parse_body, parse_id, to_values};
use crate::resources::Store;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub tour: Uuid,
    pub user: Uuid,
    pub price: f64,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Booking {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub tour: Uuid,
    pub user: Uuid,
    pub price: Option<f64>,
}

impl NewBooking {
    /// Resolve references and the price; the tour price is used when none is given.
    pub fn into_booking(self, store: &Store) -> AppResult<Booking> {
        let tour = store
            .tours
            .get(self.tour)
            .ok_or_else(|| AppError::not_found("No tour found with that ID"))?;
        if !store.users.contains(self.user) {
            return Err(AppError::not_found("No user found with that ID"));
        }

        let price = self.price.unwrap_or(tour.price);
        if !(price.is_finite() && price > 0.0) {
            return Err(AppError::bad_request("Booking must have a positive price"));
        }

        Ok(Booking {
            id: Uuid::new_v4(),
            tour: tour.id,
            user: self.user,
            price,
            paid: true,
            created_at: Utc::now(),
        })
    }
}

fn no_booking() -> AppError {
    AppError::not_found("No booking found with that ID")
}

async fn list_bookings(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let query = ListQuery::from_query(&ctx.query)?;
    let records = to_values(&state.store.bookings.list())?;
    Ok(response::many("bookings", query.apply(records)))
}

async fn create_booking(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let input: NewBooking = parse_body(&ctx.body)?;
    let booking = state
        .store
        .bookings
        .insert(input.into_booking(&state.store)?);
    tracing::info!(booking_id = %booking.id, tour_id = %booking.tour, "Booking created");
    response::one(StatusCode::CREATED, "booking", booking)
}

async fn get_booking(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let booking = state
        .store
        .bookings
        .get(parse_id(&id)?)
        .ok_or_else(no_booking)?;
    response::one(StatusCode::OK, "booking", booking)
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state
        .store
        .bookings
        .remove(parse_id(&id)?)
        .ok_or_else(no_booking)?;
    Ok(response::deleted())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/{id}", get(get_booking).delete(delete_booking))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tours::NewTour;
    use crate::resources::users::User;
    use serde_json::json;

    fn seeded() -> (Store, Uuid, Uuid) {
        let store = Store::new();
        let tour: NewTour = serde_json::from_value(json!({
            "name": "The Park Camper",
            "duration": 10,
            "maxGroupSize": 15,
            "difficulty": "medium",
            "price": 1497
        }))
        .unwrap();
        let tour = store.tours.insert(tour.into_tour());
        let user = store
            .users
            .register(User {
                id: Uuid::new_v4(),
                name: "Jonas".into(),
                email: "jonas@example.com".into(),
                role: "user".into(),
                created_at: Utc::now(),
                password_hash: String::new(),
            })
            .unwrap();
        (store, tour.id, user.id)
    }

    #[test]
    fn test_price_defaults_to_tour_price() {
        let (store, tour, user) = seeded();
        let booking = NewBooking {
            tour,
            user,
            price: None,
        }
        .into_booking(&store)
        .unwrap();

        assert_eq!(booking.price, 1497.0);
        assert!(booking.paid);
    }

    #[test]
    fn test_unknown_user() {
        let (store, tour, _) = seeded();
        let err = NewBooking {
            tour,
            user: Uuid::new_v4(),
            price: Some(10.0),
        }
        .into_booking(&store)
        .unwrap_err();
        assert_eq!(err.client_message(), "No user found with that ID");
    }
}
