pub mod evaluation;
pub mod import;
mod natural_key;
pub mod person;
pub mod results;
pub mod submission;
pub mod template;
