//! Small shared utilities.

pub mod debounce;
pub mod notify;
