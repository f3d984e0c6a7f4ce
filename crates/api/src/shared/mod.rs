pub mod single_flight;
pub mod usecase;
