mod host;

pub use host::{RunResult, Session};
