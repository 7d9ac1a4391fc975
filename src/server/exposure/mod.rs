//! API exposure
//!
//! An exposure consumes a `ServerHost` and produces a Router for one
//! protocol. REST is the only one the API speaks.

pub mod rest;

pub use rest::RestExposure;
