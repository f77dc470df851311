//! Alert evaluation and notification
//!
//! Decides which pools are unhealthy and delivers the resulting messages.

mod evaluator;
mod message;
mod notifier;

pub use evaluator::HealthEvaluator;
pub use message::{body, subject, Notification, DEFAULT_PREAMBLE, DEFAULT_SUBJECT_PREFIX};
pub use notifier::{build_message, Notifier, SendmailNotifier, SmtpNotifier, TerminalNotifier};
