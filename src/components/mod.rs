//! UI Components
//!
//! Reusable Leptos components.

mod board;
mod delete_confirm_button;
mod empty_state;
mod modal;
mod notice;
mod pager;
mod student_picker;

pub use board::{AnnouncementBoard, ReminderBoard};
pub use delete_confirm_button::DeleteConfirmButton;
pub use empty_state::{EmptyState, ListStatus};
pub use modal::Modal;
pub use notice::NoticeToast;
pub use pager::{NumberedPager, Pager};
pub use student_picker::{StudentPicker, StudentSource};
