//! Data source implementations

pub mod dhcp_config;
pub mod dhcp_leases;
pub mod port_forwardings;

pub use dhcp_config::DhcpConfigDataSource;
pub use dhcp_leases::DhcpLeasesDataSource;
pub use port_forwardings::PortForwardingsDataSource;
