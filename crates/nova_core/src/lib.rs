pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod i18n;
pub mod model;
pub mod notes;
pub mod notify;
pub mod pomodoro;
pub mod stats;
pub mod storage;
pub mod todos;

pub use dashboard::{Dashboard, DashboardView, Event, Update};
pub use error::AppError;
