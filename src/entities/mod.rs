pub mod orphanage;

pub use orphanage::Entity as Orphanage;
