pub mod clock;
pub mod db;
pub mod entities;
pub mod provisioning;
pub mod services;
