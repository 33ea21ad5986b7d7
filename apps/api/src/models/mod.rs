pub mod page_view;
pub mod portfolio;
pub mod resume;
pub mod user;
