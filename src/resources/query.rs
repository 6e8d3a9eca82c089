//! Filtering, sorting, pagination and projection of listed records.
//!
//! Records are handled as JSON objects so the same query language works for
//! every resource. Query keys come from the sanitized request query:
//!
//! ```text
//! ?difficulty=easy                 equality
//! ?price=397&price=497             any of (whitelisted keys stay arrays)
//! ?duration[gte]=5&price[lt]=1500  numeric comparisons
//! ?sort=price,-ratingsAverage      ascending, "-" for descending
//! ?fields=name,price               projection ("-field" to exclude)
//! ?page=2&limit=10                 pagination
//! ```

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::AppError;

pub const DEFAULT_LIMIT: usize = 100;

const RESERVED: [&str; 4] = ["page", "sort", "limit", "fields"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gte,
    Gt,
    Lte,
    Lt,
}

impl CompareOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "gte" => Some(Self::Gte),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }

    fn holds(self, actual: f64, bound: f64) -> bool {
        match self {
            Self::Gte => actual >= bound,
            Self::Gt => actual > bound,
            Self::Lte => actual <= bound,
            Self::Lt => actual < bound,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(String),
    AnyOf(Vec<String>),
    Compare(CompareOp, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

/// Parsed list query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, Condition)>,
    pub sort: Vec<SortKey>,
    pub projection: Projection,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: Vec::new(),
            projection: Projection::All,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn comma_list(value: &Value) -> Vec<String> {
    scalar(value)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn positive(value: Option<&Value>, default: usize) -> usize {
    value
        .and_then(scalar)
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

impl ListQuery {
    /// Parse a sanitized request query.
    pub fn from_query(query: &Map<String, Value>) -> Result<Self, AppError> {
        let mut list = Self {
            page: positive(query.get("page"), 1),
            limit: positive(query.get("limit"), DEFAULT_LIMIT),
            ..Self::default()
        };

        if let Some(sort) = query.get("sort") {
            list.sort = comma_list(sort)
                .into_iter()
                .map(|field| match field.strip_prefix('-') {
                    Some(field) => SortKey {
                        field: field.to_owned(),
                        descending: true,
                    },
                    None => SortKey {
                        field,
                        descending: false,
                    },
                })
                .collect();
        }

        if let Some(fields) = query.get("fields") {
            let fields = comma_list(fields);
            if !fields.is_empty() {
                list.projection = if fields.iter().all(|f| f.starts_with('-')) {
                    Projection::Exclude(fields.iter().map(|f| f[1..].to_owned()).collect())
                } else {
                    Projection::Include(fields)
                };
            }
        }

        for (field, value) in query {
            if RESERVED.contains(&field.as_str()) {
                continue;
            }
            match value {
                Value::Array(items) => list.filters.push((
                    field.clone(),
                    Condition::AnyOf(items.iter().filter_map(scalar).collect()),
                )),
                Value::Object(ops) => {
                    for (op, bound) in ops {
                        let op_kind = CompareOp::parse(op).ok_or_else(|| {
                            AppError::bad_request(format!("Unsupported filter operator: {op}"))
                        })?;
                        let bound = scalar(bound)
                            .and_then(|s| s.parse::<f64>().ok())
                            .ok_or_else(|| {
                                AppError::bad_request(format!("Invalid value for {field}[{op}]"))
                            })?;
                        list.filters
                            .push((field.clone(), Condition::Compare(op_kind, bound)));
                    }
                }
                other => {
                    if let Some(expected) = scalar(other) {
                        list.filters.push((field.clone(), Condition::Equals(expected)));
                    }
                }
            }
        }

        Ok(list)
    }

    /// Filter, sort, paginate and project `records`.
    pub fn apply(&self, records: Vec<Value>) -> Vec<Value> {
        let mut records: Vec<Value> = records
            .into_iter()
            .filter(|record| {
                self.filters
                    .iter()
                    .all(|(field, condition)| matches(record.get(field), condition))
            })
            .collect();

        if !self.sort.is_empty() {
            records.sort_by(|a, b| {
                self.sort
                    .iter()
                    .map(|key| {
                        let ordering = compare(a.get(&key.field), b.get(&key.field));
                        if key.descending {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        let skip = (self.page - 1).saturating_mul(self.limit);
        records
            .into_iter()
            .skip(skip)
            .take(self.limit)
            .map(|record| self.project(record))
            .collect()
    }

    fn project(&self, record: Value) -> Value {
        let Value::Object(mut object) = record else {
            return record;
        };
        match &self.projection {
            Projection::All => {}
            Projection::Include(fields) => {
                object.retain(|key, _| key == "_id" || fields.iter().any(|f| f == key));
            }
            Projection::Exclude(fields) => {
                object.retain(|key, _| !fields.iter().any(|f| f == key));
            }
        }
        Value::Object(object)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn equals(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::Number(n) => expected
            .parse::<f64>()
            .ok()
            .zip(n.as_f64())
            .is_some_and(|(e, a)| e == a),
        Value::String(s) => s == expected,
        Value::Bool(b) => expected == if *b { "true" } else { "false" },
        _ => false,
    }
}

fn matches(actual: Option<&Value>, condition: &Condition) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match condition {
        Condition::Equals(expected) => equals(actual, expected),
        Condition::AnyOf(options) => options.iter().any(|o| equals(actual, o)),
        Condition::Compare(op, bound) => as_number(actual).is_some_and(|a| op.holds(a, *bound)),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tours() -> Vec<Value> {
        vec![
            json!({ "_id": "1", "name": "Forest Hiker", "price": 397, "duration": 5, "difficulty": "easy" }),
            json!({ "_id": "2", "name": "Sea Explorer", "price": 497, "duration": 7, "difficulty": "medium" }),
            json!({ "_id": "3", "name": "Snow Adventurer", "price": 997, "duration": 4, "difficulty": "difficult" }),
            json!({ "_id": "4", "name": "City Wanderer", "price": 1197, "duration": 9, "difficulty": "easy" }),
        ]
    }

    fn query(value: Value) -> ListQuery {
        ListQuery::from_query(value.as_object().unwrap()).unwrap()
    }

    fn names(records: &[Value]) -> Vec<&str> {
        records.iter().map(|r| r["name"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_equality_and_any_of() {
        let result = query(json!({ "difficulty": "easy" })).apply(tours());
        assert_eq!(names(&result), ["Forest Hiker", "City Wanderer"]);

        let result = query(json!({ "price": ["397", "997"] })).apply(tours());
        assert_eq!(names(&result), ["Forest Hiker", "Snow Adventurer"]);
    }

    #[test]
    fn test_comparisons() {
        let result = query(json!({ "duration": { "gte": "5" }, "price": { "lt": "1000" } }))
            .apply(tours());
        assert_eq!(names(&result), ["Forest Hiker", "Sea Explorer"]);
    }

    #[test]
    fn test_sort_and_paginate() {
        let result = query(json!({ "sort": "-price", "limit": "2", "page": "2" })).apply(tours());
        assert_eq!(names(&result), ["Sea Explorer", "Forest Hiker"]);

        let result = query(json!({ "sort": "difficulty,-duration" })).apply(tours());
        assert_eq!(
            names(&result),
            ["Snow Adventurer", "City Wanderer", "Forest Hiker", "Sea Explorer"]
        );
    }

    #[test]
    fn test_projection() {
        let result = query(json!({ "fields": "name,price" })).apply(tours());
        assert_eq!(result[0], json!({ "_id": "1", "name": "Forest Hiker", "price": 397 }));

        let result = query(json!({ "fields": "-difficulty,-duration" })).apply(tours());
        assert!(result[0].get("difficulty").is_none());
        assert!(result[0].get("price").is_some());
    }

    #[test]
    fn test_lenient_pagination() {
        let list = query(json!({ "page": "zero", "limit": "-3" }));
        assert_eq!(list.page, 1);
        assert_eq!(list.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_bad_operator_rejected() {
        let err = ListQuery::from_query(json!({ "price": { "near": "5" } }).as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.client_message(), "Unsupported filter operator: near");

        let err = ListQuery::from_query(json!({ "price": { "gt": "cheap" } }).as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.client_message(), "Invalid value for price[gt]");
    }
}
