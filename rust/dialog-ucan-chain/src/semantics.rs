//! Ready-made [`CapabilitySemantics`](crate::CapabilitySemantics)
//! implementations.
//!
//! - [`email`]: permission to send mail from an address
//! - [`wnfs`]: leveled access to the public half of a WNFS file system

pub mod email;
pub mod wnfs;
