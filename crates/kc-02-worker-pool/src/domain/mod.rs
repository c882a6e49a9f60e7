//! Domain layer for the worker pool.

pub mod work;
pub mod worker;

pub use work::{task, Task, TaskFuture, TaskId, WorkRecord, WorkResult};
pub use worker::Worker;
