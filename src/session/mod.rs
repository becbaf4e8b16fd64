mod manager;

pub use manager::{SessionManager, STREAM_ERROR_TEXT};
