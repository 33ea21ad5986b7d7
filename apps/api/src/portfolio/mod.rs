// Portfolio lifecycle: slugs, re-upload merge, owner CRUD, public serving
// and view analytics.

pub mod analytics;
pub mod handlers;
pub mod merge;
pub mod service;
pub mod slug;
