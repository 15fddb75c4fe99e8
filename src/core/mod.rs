pub mod filter;
pub mod profile;
pub mod trip;
pub mod weather;
