pub mod basic;
pub mod logic;
pub mod math;
