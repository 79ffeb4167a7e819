pub mod types;
pub mod verifier;

pub use types::{Notification, NotificationKind, RedirectCheckResult, RedirectOutcome};
pub use verifier::{classify, RedirectVerifier};
