pub mod common;
pub mod langflow;
pub mod query;
