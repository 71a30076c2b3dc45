//! Application services and ports for relation-derived access control.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod access_strategy;
mod principal_classifier;
mod relation_registry;
mod relation_write_service;

#[cfg(test)]
mod test_fakes;

pub use access_ports::{AccessCache, BridgeRepository, PrincipalDirectory};
pub use access_service::RelationAccessService;
pub use access_strategy::{
    AccessContext, BridgeAccessStrategy, EntityAccessStrategy, RegionAccessStrategy,
};
pub use principal_classifier::PrincipalClassifier;
pub use relation_registry::{RegisteredRelation, RelationRegistry, RelationRegistryBuilder};
pub use relation_write_service::RelationWriteService;
