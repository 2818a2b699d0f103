pub mod answer_sets;
pub mod answers;
pub mod credential_notices;
pub mod disciplines;
pub mod evaluation_sections;
pub mod evaluations;
pub mod people;
pub mod questions;
pub mod section_members;
pub mod sections;
pub mod templates;
