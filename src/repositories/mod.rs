pub mod orphanage;

pub use orphanage::{NewOrphanage, OrphanageForm, OrphanageRepository};
