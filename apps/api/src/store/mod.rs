//! Repository functions over the three tables.
//!
//! Each function runs explicit SQL against the pool and returns plain rows;
//! nothing here loads related records implicitly.

pub mod page_views;
pub mod portfolios;
pub mod users;
