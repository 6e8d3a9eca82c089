//! Transient user notifications.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long an alert stays up before it is hidden.
pub const ALERT_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// Somewhere alerts are shown. Showing an alert replaces the current one.
pub trait AlertPresenter: Send + Sync {
    fn show(&self, kind: AlertKind, message: &str);

    fn hide(&self);
}

/// Replace the current alert with a new one and hide it after `duration`.
///
/// The returned handle resolves once the alert was hidden.
pub fn show_alert(
    presenter: Arc<dyn AlertPresenter>,
    kind: AlertKind,
    message: &str,
    duration: Duration,
) -> JoinHandle<()> {
    presenter.hide();
    presenter.show(kind, message);
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        presenter.hide();
    })
}

/// Prints alerts to the terminal; errors go to stderr.
#[derive(Debug, Default)]
pub struct TerminalAlerts;

impl AlertPresenter for TerminalAlerts {
    fn show(&self, kind: AlertKind, message: &str) {
        match kind {
            AlertKind::Success => println!("[{kind}] {message}"),
            AlertKind::Error => eprintln!("[{kind}] {message}"),
        }
    }

    fn hide(&self) {}
}

/// Keeps every alert shown, plus the one currently visible.
#[derive(Debug, Default)]
pub struct AlertLog {
    state: Mutex<AlertLogState>,
}

#[derive(Debug, Default)]
struct AlertLogState {
    history: Vec<Alert>,
    visible: Option<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Alert> {
        self.state
            .lock()
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }

    pub fn visible(&self) -> Option<Alert> {
        self.state.lock().ok().and_then(|state| state.visible.clone())
    }
}

impl AlertPresenter for AlertLog {
    fn show(&self, kind: AlertKind, message: &str) {
        let alert = Alert {
            kind,
            message: message.to_owned(),
        };
        if let Ok(mut state) = self.state.lock() {
            state.history.push(alert.clone());
            state.visible = Some(alert);
        }
    }

    fn hide(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.visible = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_log_replaces_visible() {
        let log = AlertLog::new();
        log.show(AlertKind::Error, "first");
        log.show(AlertKind::Success, "second");

        assert_eq!(log.history().len(), 2);
        assert_eq!(log.visible().map(|a| a.message), Some("second".to_owned()));

        log.hide();
        assert!(log.visible().is_none());
        assert_eq!(log.history().len(), 2);
    }

    #[tokio::test]
    async fn test_show_alert_is_transient() {
        let log = Arc::new(AlertLog::new());
        let hidden = show_alert(log.clone(), AlertKind::Success, "saved", Duration::from_millis(50));

        assert_eq!(log.visible().map(|a| a.message), Some("saved".to_owned()));

        hidden.await.unwrap();
        assert!(log.visible().is_none());
        assert_eq!(log.history().len(), 1);
    }
}
