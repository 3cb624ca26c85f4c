pub mod a030_sales_order;
pub mod a031_customer;
pub mod a032_sales_rep;
pub mod a033_commission_rate;
pub mod a034_commission_rules;
pub mod a035_spiff;
