pub mod check;
pub mod drag;
pub mod hierarchy;
pub mod nav;
pub mod task_ops;
