pub mod averages;
pub mod gap;
