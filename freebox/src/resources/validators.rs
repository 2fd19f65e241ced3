//! Address validators shared by the Freebox resources

use std::net::Ipv4Addr;
use tfplug::schema::{Validator, ValidatorRequest, ValidatorResponse};
use tfplug::types::{Diagnostic, Dynamic};

/// Accepts `aa:bb:cc:dd:ee:ff`, any case
pub struct MacAddressValidator;

pub fn is_mac_address(value: &str) -> bool {
    let octets: Vec<&str> = value.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()))
}

impl Validator for MacAddressValidator {
    fn description(&self) -> String {
        "value must be a MAC address such as 00:24:d4:7e:00:4c".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(s) = &request.config_value.value {
            if !is_mac_address(s) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid MAC address",
                        format!("Attribute {} {}, got: {:?}", request.path, self.description(), s),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}

/// Accepts dotted-quad IPv4 addresses
pub struct Ipv4AddressValidator;

impl Validator for Ipv4AddressValidator {
    fn description(&self) -> String {
        "value must be an IPv4 address".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = vec![];

        if let Dynamic::String(s) = &request.config_value.value {
            if s.parse::<Ipv4Addr>().is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid IPv4 address",
                        format!("Attribute {} {}, got: {:?}", request.path, self.description(), s),
                    )
                    .with_attribute(request.path),
                );
            }
        }

        ValidatorResponse { diagnostics }
    }
}
