pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_table;
mod m20250318_000002_create_original_video;
mod m20250506_000003_add_import_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_table::Migration),
            Box::new(m20250318_000002_create_original_video::Migration),
            Box::new(m20250506_000003_add_import_index::Migration),
        ]
    }
}
