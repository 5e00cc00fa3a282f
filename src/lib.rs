//! node-pip: public IP reconciliation for cluster nodes
//!
//! A library for giving cluster nodes on Azure Resource Manager public
//! connectivity: attaching a public IP to a standalone VM's primary
//! interface, detaching it and cleaning up the interface after scale-in,
//! deleting public IPs, and enabling per-instance public IPs on scale sets.
//!
//! The [`reconcile::PublicIpReconciler`] trait is the seam consumed by the
//! cluster layer; [`reconcile::Reconciler`] implements it on top of the
//! management API client in [`arm`] and the operation waiter in [`lro`].

pub mod arm;
pub mod config;
pub mod lro;
pub mod reconcile;
pub mod resource;
pub mod time;
