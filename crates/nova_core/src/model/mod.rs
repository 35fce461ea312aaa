mod note;
mod theme;
mod todo;

pub use note::Note;
pub use theme::Theme;
pub use todo::{Category, CompletedTaskRecord, Tab, Todo};
