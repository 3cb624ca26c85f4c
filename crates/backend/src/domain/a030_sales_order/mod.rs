pub mod line_items;
pub mod repository;
