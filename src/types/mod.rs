pub mod records;
pub mod response;

pub use records::*;
pub use response::{AuthSession, AuthUser, SignUpOutcome};
