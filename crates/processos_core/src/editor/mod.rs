//! Editor session for creating and changing records.

pub mod form;
