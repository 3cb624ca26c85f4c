pub mod customer_status;
pub mod segment;
