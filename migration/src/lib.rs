pub use sea_orm_migration::prelude::*;

mod m20211025_133151_create_orphanages;
// Add new migrations below, in apply order

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20211025_133151_create_orphanages::Migration)]
    }
}
