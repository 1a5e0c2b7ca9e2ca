//! Core library for stackpipe
//!
//! This crate implements the **Functional Core** of the stackpipe application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`stackpipe_core`** (this crate): data model and transformations with no network I/O
//! - **`stackpipe`**: HTTP fetching, file output and orchestration (the Imperative Shell)
//!
//! A run takes each resource type through the same three steps:
//!
//! 1. the shell fetches pages and decodes them with [`page::parse_page`], asking
//!    [`page::next_step`] whether to continue
//! 2. [`dates::transform_records`] rewrites epoch-second date fields
//! 3. [`table::write_csv`] serializes the records onto the output file
//!
//! Progress flows through a [`report::Reporter`] passed to each step.
//!
//! # Module Organization
//!
//! - [`resource`]: the five resource types and their endpoints, sort keys and file names
//! - [`record`]: the schema-free record model
//! - [`dates`]: date field normalization
//! - [`page`]: response envelope decoding and pagination decisions
//! - [`table`]: CSV serialization
//! - [`report`]: pipeline stages and the reporting interface
//! - [`error`]: fetch, transform and write errors
//!
//! # Example Usage
//!
//! ```rust
//! use stackpipe_core::dates::transform_record;
//! use stackpipe_core::record::{Record, Value};
//!
//! let mut record = Record::new();
//! record.insert("creation_date", Value::Integer(1609459200));
//!
//! let (record, errors) = transform_record(record);
//!
//! assert!(errors.is_empty());
//! assert_eq!(record.get("creation_date"), Some(&Value::Text("01-01-2021".into())));
//! ```

pub mod dates;
pub mod error;
pub mod page;
pub mod record;
pub mod report;
pub mod resource;
pub mod table;
