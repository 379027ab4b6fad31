//! Presentation projections built from the record sequence.

pub mod list_view;
