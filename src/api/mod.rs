//! Backend API Wrappers
//!
//! Typed bindings to the REST endpoints, organized by domain. Every
//! function takes the shared [`ApiClient`](crate::http::ApiClient).

mod announcements;
mod courses;
mod feedbacks;
mod persons;
mod reminders;
mod students;
mod tasks;
mod visits;

use crate::http::encode_segment;

// Re-export all public items
pub use announcements::*;
pub use courses::*;
pub use feedbacks::*;
pub use persons::*;
pub use reminders::*;
pub use students::*;
pub use tasks::*;
pub use visits::*;

/// `"{base}{id}/"` with the id percent-encoded
fn detail_path(base: &str, id: &str) -> String {
    format!("{}{}/", base, encode_segment(id))
}
