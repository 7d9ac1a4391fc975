//! User entity module

pub mod descriptor;
pub mod extractor;
pub mod handlers;
pub mod model;

pub use descriptor::UserDescriptor;
pub use extractor::CurrentUser;
pub use model::{User, UserProfile};
