//! Pipeline utilities for standardized batch/task execution
//!
//! This module provides reusable components for analysis phases:
//! - **batch**: Concurrent execution with a fixed in-flight ceiling
//! - **task**: Task-level event logging
//! - **json**: Fence stripping and strict decoding of LLM output

pub mod batch;
pub mod json;
pub mod task;

// Re-export commonly used types and functions
pub use batch::{execute_batch, TaskContext};
pub use json::{extract_json, parse_json, DecodeError};
pub use task::execute_task;
