pub mod auth;
pub mod evaluation;
pub mod health;
pub mod import;
pub mod template;
