//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth
pub mod employee;

// Sessions
pub mod attendance;
pub mod session;

// Feedback
pub mod feedback;

// Onboarding
pub mod onboarding;

// Re-exports
pub use attendance::{AttendanceId, AttendanceRecord};
pub use employee::{Employee, EmployeeCreate, EmployeeId, EmployeeUpdate};
pub use feedback::{FeedbackCreate, FeedbackEntry, FeedbackId, Sentiment};
pub use onboarding::{OnboardingId, OnboardingStatus, OnboardingUpdate};
pub use session::{Session, SessionId, SessionSchedule};
