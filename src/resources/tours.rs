//! Tours route group.

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

const NAME_MAX_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub duration: u32,
    pub max_group_size: u32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: u32,
    pub price: f64,
    pub summary: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Tour {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn default_rating() -> f64 {
    4.5
}

/// Fields accepted when creating a tour.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTour {
    pub name: String,
    pub duration: u32,
    pub max_group_size: u32,
    pub difficulty: Difficulty,
    pub price: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_rating")]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_quantity: u32,
}

impl NewTour {
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_rating(self.ratings_average)
    }

    pub fn into_tour(self) -> Tour {
        Tour {
            id: Uuid::new_v4(),
            slug: slugify(&self.name),
            name: self.name.trim().to_owned(),
            duration: self.duration,
            max_group_size: self.max_group_size,
            difficulty: self.difficulty,
            ratings_average: self.ratings_average,
            ratings_quantity: self.ratings_quantity,
            price: self.price,
            summary: self.summary.trim().to_owned(),
            description: self.description.trim().to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// Fields accepted when updating a tour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPatch {
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub max_group_size: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub ratings_average: Option<f64>,
}

impl TourPatch {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(rating) = self.ratings_average {
            validate_rating(rating)?;
        }
        Ok(())
    }

    pub fn apply(self, tour: &mut Tour) {
        if let Some(name) = self.name {
            tour.slug = slugify(&name);
            tour.name = name.trim().to_owned();
        }
        if let Some(duration) = self.duration {
            tour.duration = duration;
        }
        if let Some(size) = self.max_group_size {
            tour.max_group_size = size;
        }
        if let Some(difficulty) = self.difficulty {
            tour.difficulty = difficulty;
        }
        if let Some(price) = self.price {
            tour.price = price;
        }
        if let Some(summary) = self.summary {
            tour.summary = summary;
        }
        if let Some(description) = self.description {
            tour.description = description;
        }
        if let Some(rating) = self.ratings_average {
            tour.ratings_average = rating;
        }
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("A tour must have a name"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::bad_request(
            "A tour name must have less or equal then 40 characters",
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> AppResult<()> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(AppError::bad_request("A tour must have a positive price"))
    }
}

fn validate_rating(rating: f64) -> AppResult<()> {
    if (1.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::bad_request("Rating must be between 1 and 5"))
    }
}

/// URL-safe form of a tour name: `"The Forest Hiker"` → `"the-forest-hiker"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn no_tour() -> AppError {
    AppError::not_found("No tour found with that ID")
}

async fn list_tours(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let query = ListQuery::from_query(&ctx.query)?;
    let records = to_values(&state.store.tours.list())?;
    Ok(response::many("tours", query.apply(records)))
}

async fn create_tour(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let input: NewTour = parse_body(&ctx.body)?;
    input.validate()?;
    let tour = state.store.tours.insert(input.into_tour());
    tracing::info!(tour_id = %tour.id, slug = %tour.slug, "Tour created");
    response::one(StatusCode::CREATED, "tour", tour)
}

async fn get_tour(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let tour = state.store.tours.get(parse_id(&id)?).ok_or_else(no_tour)?;
    response::one(StatusCode::OK, "tour", tour)
}

async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let patch: TourPatch = parse_body(&ctx.body)?;
    patch.validate()?;
    let tour = state
        .store
        .tours
        .update(id, |tour| patch.apply(tour))
        .ok_or_else(no_tour)?;
    response::one(StatusCode::OK, "tour", tour)
}

async fn delete_tour(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    state.store.tours.remove(parse_id(&id)?).ok_or_else(no_tour)?;
    Ok(response::deleted())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tours).post(create_tour))
        .route("/{id}", get(get_tour).patch(update_tour).delete(delete_tour))
}
