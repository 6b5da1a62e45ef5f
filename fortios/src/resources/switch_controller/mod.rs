//! FortiSwitch controller resources

pub mod resource_managed_switch;

pub use resource_managed_switch::{SwitchControllerManagedSwitch, POE_DETECTION};
