//! Client-side navigation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Moves the user to another location.
pub trait Navigator: Send + Sync {
    fn assign(&self, location: &str);
}

/// Announces navigations on stdout, resolved against a base URL.
#[derive(Debug, Clone)]
pub struct PrintNavigator {
    base: url::Url,
}

impl PrintNavigator {
    pub fn new(base: url::Url) -> Self {
        Self { base }
    }
}

impl Navigator for PrintNavigator {
    fn assign(&self, location: &str) {
        match self.base.join(location) {
            Ok(target) => println!("Redirecting to {target}"),
            Err(_) => println!("Redirecting to {location}"),
        }
    }
}

/// Records every location assigned.
#[derive(Debug, Default)]
pub struct NavigationLog {
    visited: Mutex<Vec<String>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Navigator for NavigationLog {
    fn assign(&self, location: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(location.to_owned());
        }
    }
}

/// Navigate to `location` after `delay`, in the background.
pub fn navigate_after(
    navigator: Arc<dyn Navigator>,
    location: impl Into<String>,
    delay: Duration,
) -> JoinHandle<()> {
    let location = location.into();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        navigator.assign(&location);
    })
}
