pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{extract_session_token, MaybeUser, RequireUser};
pub use password::{hash_password, verify_password};
pub use session::generate_session_token;
