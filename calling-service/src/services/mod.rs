pub mod service_b;
pub mod token;
