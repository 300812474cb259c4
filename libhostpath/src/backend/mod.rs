//! Concrete provisioner backends.
//!
//! Each backend module provides a type that implements
//! [`Provisioner`](crate::Provisioner) and
//! [`ProvisionerIdentity`](crate::ProvisionerIdentity).

pub mod hostpath;
