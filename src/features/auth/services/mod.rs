mod auth_service;
pub mod password;
mod session_service;
mod token_service;

pub use auth_service::AuthService;
pub use session_service::SessionService;
pub use token_service::TokenService;
