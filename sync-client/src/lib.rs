//! Sync Client — typed gateway and client-side state for Standup-Sync
//!
//! The Remote Data Gateway ([`HttpClient`]) wraps every server endpoint in a
//! typed call; the rest of the crate is the client-side state the dashboard
//! screens run on: the live session view, the feedback filter controller,
//! the onboarding wizard and the role-gated navigation shell.

pub mod config;
pub mod error;
pub mod feedback;
pub mod http;
pub mod message;
pub mod nav;
pub mod onboarding;
pub mod session_watch;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use feedback::{FeedbackController, FeedbackFilter, SummaryState};
pub use http::HttpClient;
pub use message::MessageClient;
pub use nav::{AdminState, AuthState, NavigationShell, Route};
pub use onboarding::{OnboardingWizard, WizardStep};
pub use session_watch::SessionWatcher;

// Re-export shared wire types for convenience
pub use shared::client::{
    EmployeeView, FeedbackSummaryResponse, LoginResponse, SessionView, UserInfo,
};
pub use shared::message::{BusMessage, EventType};
pub use shared::types::{AttendanceStatus, SessionKind, SessionStatus, TimeFrame};
