//! Firewall object resources

pub mod resource_address;
pub mod resource_addrgrp;

pub use resource_address::FirewallAddress;
pub use resource_addrgrp::FirewallAddrgrp;
