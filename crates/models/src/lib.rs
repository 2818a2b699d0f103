pub mod answer;
pub mod import_data;
pub mod import_report;
pub mod question;
pub mod results;
