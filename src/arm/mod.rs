//! Azure Resource Manager access layer.
//!
//! This module provides:
//! - HTTP request/response types and the injectable [`HttpClient`] seam
//! - The production HTTP client ([`ReqwestClient`])
//! - Resource models for public IPs, NICs, VMs and scale sets ([`model`])
//! - Per-resource-kind client traits ([`PublicIpAddresses`], [`NetworkInterfaces`],
//!   [`VirtualMachines`], [`ScaleSets`]) and their union [`ControlPlane`]
//! - The REST implementation of those traits ([`ArmClient`]) bound to an [`ArmScope`]
//! - Bearer token acquisition ([`TokenCredential`])

mod api;
mod client;
mod credential;
mod error;
mod http;
pub mod model;
mod rest;
mod scope;


pub use api::{ControlPlane, NetworkInterfaces, PublicIpAddresses, ScaleSets, VirtualMachines};
pub use client::ReqwestClient;
pub use credential::{AccessToken, StaticTokenCredential, TokenCredential};
pub use error::{ArmError, HttpError};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use rest::ArmClient;
pub use scope::{ArmScope, ResourceKind};
