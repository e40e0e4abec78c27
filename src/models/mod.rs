pub mod datetime;
pub mod task;
pub mod user;

pub use task::{ShareTaskRequest, Task, TaskCreate, TaskListQuery, TaskRow, TaskUpdate};
pub use user::{User, UserResponse};
