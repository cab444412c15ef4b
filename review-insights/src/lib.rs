// Configuration and credential resolution
pub mod config;

// LLM completion client
pub mod llm;

// Batch execution, task events and JSON decoding
pub mod pipeline_utils;

// Map-reduce analysis, fallback, Q&A and refund diagnosis
pub mod analysis;

// Command-line interface
pub mod cli;

// Output rendering
pub mod render;
