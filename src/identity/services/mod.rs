//! Application services for user identity.

mod current_user;
mod session;

pub use current_user::CurrentUser;
pub use session::{IdentitySession, IdentitySessionError, IdentitySessionResult};
