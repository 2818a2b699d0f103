pub use sea_orm_migration::prelude::*;

mod m20260301_create_evaluation_tables;
mod m20260301_create_roster_tables;
mod m20260302_add_natural_key_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_create_roster_tables::Migration),
            Box::new(m20260301_create_evaluation_tables::Migration),
            Box::new(m20260302_add_natural_key_indexes::Migration),
        ]
    }
}
