//! Authentication module
//!
//! JWT sessions issued by the backend, plus argon2 hashing for the
//! flat-file user store.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenKind};
pub use middleware::AuthUser;
pub use password::PasswordService;
