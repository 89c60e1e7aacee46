pub mod langflow;
