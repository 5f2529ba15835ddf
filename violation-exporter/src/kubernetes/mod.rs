//! Kubernetes integration
//!
//! Client construction and the namespaced event watch feeding the
//! violation pipeline.

pub mod client;
pub mod events;
pub mod types;

pub use client::K8sClient;
pub use types::{AdmissionEvent, ObjectRef};
