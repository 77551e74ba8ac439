pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod reports;
pub mod stats;
pub mod users;
pub mod web;
