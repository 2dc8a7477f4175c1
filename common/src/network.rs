//! # Network Specifications
//!
//! Turns the raw strings a user types into concrete scan inputs.
//!
//! * [`target`]: hosts, hostnames, CIDR blocks and dashed ranges → IPv4 addresses.
//! * [`ports`]: single ports, dashed ranges and the `top` keyword → port numbers.
//! * [`range`]: inclusive IPv4 ranges and the deduplicating [`range::IpCollection`].
//! * [`resolver`]: the hostname lookup seam.

pub mod ports;
pub mod range;
pub mod resolver;
pub mod target;
