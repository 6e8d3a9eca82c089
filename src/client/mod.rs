//! Client-side helpers for the signup flow.
//!
//! # Data Flow
//! ```text
//! SignupData
//!     → signup.rs (one POST, cookies kept)
//!     → success: alerts.rs "success" → navigation.rs after 1500 ms → "/"
//!     → failure: alerts.rs "error" with the server message
//! ```

pub mod alerts;
pub mod navigation;
pub mod signup;

pub use alerts::{show_alert, Alert, AlertKind, AlertLog, AlertPresenter, TerminalAlerts};
pub use navigation::{NavigationLog, Navigator, PrintNavigator};
pub use signup::{SignupClient, SignupData, SignupError, SignupOutcome};
