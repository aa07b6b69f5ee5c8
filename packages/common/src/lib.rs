pub mod config;
pub mod resume;
pub mod storage;

pub use resume::{FileSummary, ResumeError, ResumeStore, StreamMode};
