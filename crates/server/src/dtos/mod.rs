pub mod evaluation;
pub mod import;
pub mod template;
