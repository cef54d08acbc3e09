pub mod addons;
pub mod profiles;
pub mod start;
