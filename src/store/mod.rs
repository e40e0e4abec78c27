//! Persistence for users, tasks and the task sharing relation.

pub mod tasks;
pub mod users;
