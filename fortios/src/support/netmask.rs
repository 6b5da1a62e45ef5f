//! IP/mask reconciliation between user-authored CIDR and API dotted masks
//!
//! The API reports subnets as `"10.0.0.0 255.255.255.0"` while users usually
//! write `"10.0.0.0/24"`. Flatten code keeps the user's spelling whenever both
//! describe the same network.

use std::net::Ipv4Addr;

use serde_json::Value;

use crate::error::{FortiosError, Result};

/// Pick the state value for an IP/mask attribute.
///
/// `new_value` is the configured value and `old_value` the API-reported one.
/// When the configured value is in CIDR form and the API reports `ip mask`,
/// the API value is rewritten as `ip/prefix`. Anything else passes `old_value`
/// through untouched.
pub fn reconcile_ip_mask(new_value: &str, old_value: &str) -> Result<String> {
    if new_value == old_value || !new_value.contains('/') {
        return Ok(old_value.to_string());
    }

    let Some((ip, mask)) = split_ip_mask(old_value) else {
        return Ok(old_value.to_string());
    };

    let prefix = mask_to_prefix(mask)?;
    Ok(format!("{}/{}", ip, prefix))
}

/// Split `ip mask` when the second token looks like a dotted quad
fn split_ip_mask(value: &str) -> Option<(&str, &str)> {
    let trimmed = value.trim();
    let (ip, rest) = trimmed.split_once(char::is_whitespace)?;
    let mask = rest.trim_start().split_whitespace().next()?;
    is_dotted_quad(mask).then_some((ip, mask))
}

fn is_dotted_quad(token: &str) -> bool {
    let octets: Vec<&str> = token.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.bytes().all(|b| b.is_ascii_digit()))
}

/// Prefix length of a dotted-decimal IPv4 netmask. Non-contiguous masks are rejected
pub fn mask_to_prefix(mask: &str) -> Result<u8> {
    let addr: Ipv4Addr = mask
        .parse()
        .map_err(|_| FortiosError::MalformedNetmask(mask.to_string()))?;

    ipnetwork::ipv4_mask_to_prefix(addr).map_err(|_| FortiosError::MalformedNetmask(mask.to_string()))
}

/// Render an API subnet value as `ip mask`. Some firmware returns the pair
/// as a two element list
pub fn join_ip_mask(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) if parts.len() >= 2 => {
            let ip = parts[0].as_str()?;
            let mask = parts[1].as_str()?;
            Some(format!("{} {}", ip, mask))
        }
        _ => None,
    }
}

/// True when two IP/mask spellings describe the same address and prefix
pub fn ip_mask_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (canonical_cidr(a), canonical_cidr(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn canonical_cidr(value: &str) -> Option<(Ipv4Addr, u8)> {
    if let Some((ip, prefix)) = value.trim().split_once('/') {
        let prefix: u8 = prefix.trim().parse().ok()?;
        if prefix > 32 {
            return None;
        }
        return Some((ip.trim().parse().ok()?, prefix));
    }

    let (ip, mask) = split_ip_mask(value)?;
    Some((ip.parse().ok()?, mask_to_prefix(mask).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_inputs_short_circuit() {
        for value in ["10.0.0.0/24", "10.0.0.0 255.255.255.0", "", "garbage 1.2.3"] {
            assert_eq!(reconcile_ip_mask(value, value).unwrap(), value);
        }
    }

    #[test]
    fn dotted_mask_collapses_to_cidr() {
        assert_eq!(
            reconcile_ip_mask("10.0.0.0/24", "10.0.0.0 255.255.255.0").unwrap(),
            "10.0.0.0/24"
        );
        assert_eq!(
            reconcile_ip_mask("192.168.1.10/32", "192.168.1.10   255.255.255.255").unwrap(),
            "192.168.1.10/32"
        );
        assert_eq!(
            reconcile_ip_mask("0.0.0.0/0", "0.0.0.0 0.0.0.0").unwrap(),
            "0.0.0.0/0"
        );
    }

    #[test]
    fn api_value_wins_when_network_changed() {
        // the user asked for /24, the target still has /16
        assert_eq!(
            reconcile_ip_mask("10.0.0.0/24", "10.0.0.0 255.255.0.0").unwrap(),
            "10.0.0.0/16"
        );
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(reconcile_ip_mask("anything", "10.0.0.5").unwrap(), "10.0.0.5");
        assert_eq!(reconcile_ip_mask("10.0.0.0/24", "10.0.0.5").unwrap(), "10.0.0.5");
        assert_eq!(
            reconcile_ip_mask("10.0.0.0 255.255.255.0", "10.0.0.0 255.255.0.0").unwrap(),
            "10.0.0.0 255.255.0.0"
        );
    }

    #[test]
    fn non_dotted_second_token_passes_through() {
        for old in ["10.0.0.0 abc", "10.0.0.0 24", "10.0.0.0 255.255.0", "fqdn example.com"] {
            assert_eq!(reconcile_ip_mask("10.0.0.0/24", old).unwrap(), old);
        }
    }

    #[test]
    fn malformed_masks_fail() {
        assert!(matches!(
            reconcile_ip_mask("10.0.0.0/24", "10.0.0.0 255.255.300.0"),
            Err(FortiosError::MalformedNetmask(_))
        ));
        assert!(matches!(
            reconcile_ip_mask("10.0.0.0/24", "10.0.0.0 255.0.255.0"),
            Err(FortiosError::MalformedNetmask(_))
        ));
        assert!(matches!(
            mask_to_prefix("not-a-mask"),
            Err(FortiosError::MalformedNetmask(_))
        ));
    }

    #[test]
    fn prefix_lengths() {
        assert_eq!(mask_to_prefix("255.255.255.0").unwrap(), 24);
        assert_eq!(mask_to_prefix("255.255.255.128").unwrap(), 25);
        assert_eq!(mask_to_prefix("255.240.0.0").unwrap(), 12);
        assert_eq!(mask_to_prefix("0.0.0.0").unwrap(), 0);
    }

    #[test]
    fn join_handles_list_and_string_forms() {
        assert_eq!(
            join_ip_mask(&json!(["10.0.0.0", "255.255.255.0"])).as_deref(),
            Some("10.0.0.0 255.255.255.0")
        );
        assert_eq!(
            join_ip_mask(&json!("10.0.0.0 255.255.255.0")).as_deref(),
            Some("10.0.0.0 255.255.255.0")
        );
        assert!(join_ip_mask(&json!(["10.0.0.0"])).is_none());
        assert!(join_ip_mask(&json!(24)).is_none());
    }

    #[test]
    fn equivalence_across_spellings() {
        assert!(ip_mask_equivalent("10.0.0.0/24", "10.0.0.0 255.255.255.0"));
        assert!(ip_mask_equivalent("10.0.0.0 255.255.255.0", "10.0.0.0/24"));
        assert!(!ip_mask_equivalent("10.0.0.0/24", "10.0.0.0 255.255.0.0"));
        assert!(!ip_mask_equivalent("10.0.0.0/24", "10.0.1.0/24"));
        assert!(!ip_mask_equivalent("10.0.0.0/33", "10.0.0.0/33 "));
    }
}
