pub mod cache;
pub mod platform;
pub mod timer;
