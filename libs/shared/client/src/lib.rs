pub mod rest;

pub use rest::{ClientError, RestClient};
