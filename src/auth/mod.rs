/// Authentication core
///
/// Password hashing, token issuance/verification, and the policy service
/// that ties them to the user store.

mod claims;
mod password;
mod service;
mod token;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use password::hash_password;
pub use password::verify_password;
pub use service::AuthService;
pub use token::peek_expiry;
pub use token::TokenCodec;
pub use token::TokenPair;
pub use token::AUDIENCE;
pub use token::ISSUER;
