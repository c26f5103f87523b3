pub mod store;
pub mod service;
