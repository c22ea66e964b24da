pub mod core_auth;
pub mod error;
pub mod helper;

pub use core_auth::{ConfigUserManager, User, UserConfig, UserManager};
pub use error::AuthError;
