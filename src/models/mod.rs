pub mod task;
pub mod user;

pub use task::{is_unset, Task, TaskInput, TaskListing, TaskScope, MAX_SUMMARY_LEN};
pub use user::{Credentials, Role, User};
