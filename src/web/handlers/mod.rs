pub mod account_handlers;
pub mod auth_handlers;
pub mod landing_handlers;
pub mod system_handlers;
pub mod worker_handlers;

pub use account_handlers::*;
pub use auth_handlers::*;
pub use landing_handlers::*;
pub use system_handlers::*;
pub use worker_handlers::*;
