pub mod u510_calculate_commissions;
