//! Browser front end: session login and HTML pages over the same services as
//! the JSON API.

pub mod forms;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod views;

pub use handlers::WebState;
pub use views::Templates;
