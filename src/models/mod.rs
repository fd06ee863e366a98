mod note;
mod profile;
mod session;
mod task;

pub use note::Note;
pub use profile::{Stats, UserProfile};
pub use session::{ActiveSession, SessionStatus};
pub use task::{Task, TaskPriority, TaskStatus, TaskTag};
