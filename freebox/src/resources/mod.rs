//! Resource implementations

pub mod dhcp_config;
pub mod dhcp_lease;
pub mod port_forward;
pub mod validators;

pub use dhcp_config::DhcpConfigResource;
pub use dhcp_lease::DhcpLeaseResource;
pub use port_forward::PortForwardResource;

use tfplug::types::{AttributePath, Dynamic, DynamicValue};

/// The router reports absent strings as ""; Terraform state wants null
pub(crate) fn string_or_null(value: &str) -> Dynamic {
    if value.is_empty() {
        Dynamic::Null
    } else {
        Dynamic::String(value.to_string())
    }
}

/// DNS list as read back from the router. It always answers with a fixed
/// number of slots, so trailing empty slots are dropped and interior ones
/// become null.
pub(crate) fn dns_to_state(dns: &[String]) -> Dynamic {
    let used = dns
        .iter()
        .rposition(|server| !server.is_empty())
        .map_or(0, |last| last + 1);
    Dynamic::List(dns[..used].iter().map(|s| string_or_null(s)).collect())
}

/// DNS list after an apply. Slots the router left empty take the planned
/// spelling ("" or null) and the list keeps at least the planned length.
pub(crate) fn dns_after_apply(dns: &[String], planned: &[Dynamic]) -> Dynamic {
    let used = dns
        .iter()
        .rposition(|server| !server.is_empty())
        .map_or(0, |last| last + 1);
    let servers = (0..used.max(planned.len()))
        .map(|index| match dns.get(index) {
            Some(server) if !server.is_empty() => Dynamic::String(server.clone()),
            _ => match planned.get(index) {
                Some(Dynamic::String(server)) if server.is_empty() => Dynamic::from(""),
                _ => Dynamic::Null,
            },
        })
        .collect();
    Dynamic::List(servers)
}

/// Known string at `name`; None when null, unknown or not a string
pub(crate) fn known_string(value: &DynamicValue, name: &str) -> Option<String> {
    value.get_string(&AttributePath::new(name)).ok()
}

pub(crate) fn known_bool(value: &DynamicValue, name: &str) -> Option<bool> {
    value.get_bool(&AttributePath::new(name)).ok()
}

pub(crate) fn known_int(value: &DynamicValue, name: &str) -> Option<i64> {
    value.get_int(&AttributePath::new(name)).ok()
}

/// Fully known list of strings at `name`, null elements sent as ""
pub(crate) fn known_string_list(value: &DynamicValue, name: &str) -> Option<Vec<String>> {
    let items = value.get_list(&AttributePath::new(name)).ok()?;
    items
        .into_iter()
        .map(|item| match item {
            Dynamic::String(s) => Some(s),
            Dynamic::Null => Some(String::new()),
            _ => None,
        })
        .collect()
}
