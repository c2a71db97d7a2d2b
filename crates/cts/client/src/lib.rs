//! Protocol client for repository conformance probes.
//!
//! Probes never talk HTTP directly. They receive a [`RepositoryClient`]
//! handle bound to one target server and user, and branch on the
//! [`ClientError`] values it returns. [`HttpRepositoryClient`] is the REST
//! implementation used against live servers.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod http;
pub mod model;

pub use client::RepositoryClient;
pub use error::{ClientError, ClientResult};
pub use http::{ClientConfig, HttpRepositoryClient};
pub use model::{
    AttributeDef, EntityDetail, InstanceStatus, InstanceType, NewEntity, NewRelationship,
    RegisteredService, Relationship, TypeDef, TypeDefCategory,
};
