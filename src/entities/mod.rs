//! Entities module - contains all business entities

pub mod bootcamp;
pub mod course;
pub mod user;

// Re-export models for convenience
pub use bootcamp::{Bootcamp, BootcampDescriptor};
pub use course::{Course, CourseDescriptor};
pub use user::{CurrentUser, User, UserDescriptor};
