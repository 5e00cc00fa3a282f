//! Resource identifier resolution.
//!
//! Pure string transforms over ARM resource identifiers and the
//! classification of cluster nodes into standalone VMs or scale-set
//! instances. Nothing in this module performs I/O.

mod id;
mod node;


pub use id::{extract_scale_set_name, interface_name_from_ip_config_id, short_name};
pub use node::{NodeIdentity, NodeKind, public_ip_name, scale_set_public_ip_name};
