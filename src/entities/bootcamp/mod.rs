//! Bootcamp entity module

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::BootcampDescriptor;
pub use model::{Bootcamp, Career};
