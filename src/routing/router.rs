//! Route group table and dispatch.
//!
//! # Responsibilities
//! - Name the five route groups and their mount prefixes
//! - Resolve a path to the group that owns it
//! - Assemble the group routers into one dispatching router
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Table is ordered longest prefix first, so the first match wins
//! - Group routers are replaceable before assembly, which keeps
//!   dispatch independent from what each group does

use std::collections::HashMap;
use std::fmt;

use axum::Router;

use crate::http::error_handler::not_found;
use crate::http::AppState;
use crate::resources;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// A domain-specific collection of routes mounted under one prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGroup {
    Views,
    Tours,
    Users,
    Reviews,
    Bookings,
}

impl RouteGroup {
    pub const ALL: [RouteGroup; 5] = [
        Self::Views,
        Self::Tours,
        Self::Users,
        Self::Reviews,
        Self::Bookings,
    ];

    /// Mount prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Views => "/",
            Self::Tours => "/api/v1/tours",
            Self::Users => "/api/v1/users",
            Self::Reviews => "/api/v1/reviews",
            Self::Bookings => "/api/v1/bookings",
        }
    }

    /// Label used in logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Tours => "tours",
            Self::Users => "users",
            Self::Reviews => "reviews",
            Self::Bookings => "bookings",
        }
    }
}

impl fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
struct Route {
    group: RouteGroup,
    matcher: PathPrefixMatcher,
}

/// Prefix table for the route groups.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Table holding every group at its standard prefix.
    pub fn standard() -> Self {
        let mut routes: Vec<Route> = RouteGroup::ALL
            .into_iter()
            .map(|group| Route {
                group,
                matcher: PathPrefixMatcher::new(group.prefix()),
            })
            .collect();

        // Longest prefix first; stable sort keeps declaration order on ties.
        routes.sort_by_key(|route| std::cmp::Reverse(route.matcher.prefix().len()));
        Self { routes }
    }

    /// Group owning `path`, if any.
    pub fn resolve(&self, path: &str) -> Option<RouteGroup> {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(path))
            .map(|route| route.group)
    }

    /// Groups in match order.
    pub fn groups(&self) -> impl Iterator<Item = RouteGroup> + '_ {
        self.routes.iter().map(|route| route.group)
    }
}

/// The routers behind each group, assembled into the dispatch router.
pub struct RouteGroups {
    routers: HashMap<RouteGroup, Router<AppState>>,
}

impl RouteGroups {
    /// Every group backed by its resource handlers.
    pub fn standard() -> Self {
        let routers = RouteGroup::ALL
            .into_iter()
            .map(|group| (group, resources::router_for(group)))
            .collect();
        Self { routers }
    }

    /// Swap the router behind one group.
    pub fn replace(mut self, group: RouteGroup, router: Router<AppState>) -> Self {
        self.routers.insert(group, router);
        self
    }

    /// Mount every group at its prefix. The root group is merged, the rest nested.
    pub fn into_dispatch(mut self, table: &RouteTable) -> Router<AppState> {
        table.groups().fold(Router::new(), |dispatch, group| {
            let Some(router) = self.routers.remove(&group) else {
                return dispatch;
            };
            tracing::debug!(group = %group, prefix = group.prefix(), "Mounting route group");
            // A known path with the wrong method is still an unmatched route.
            let router = router.method_not_allowed_fallback(not_found);
            if group.prefix() == "/" {
                dispatch.merge(router)
            } else {
                dispatch.nest(group.prefix(), router)
            }
        })
    }
}

impl fmt::Debug for RouteGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroups")
            .field("groups", &self.routers.keys().collect::<Vec<_>>())
            .finish()
    }
}
