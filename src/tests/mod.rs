//! Integration testing module
//!
//! End-to-end tests for the subtitle pipeline:
//! - Parsing and compiling documents
//! - Segmentation across boundaries
//! - Segment file and playlist validation
