mod actor;
mod claims;
mod jwt;
mod password;
mod role;

pub use actor::Actor;
pub use claims::Claims;
pub use jwt::{JwtIssuer, JwtValidator};
pub use password::{hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH};
pub use role::Role;
