//! Well-known label keys, environment variable names and runtime conventions.
//!
//! These strings form the contract between the provisioner, the proxy image and the worker image.
//! The config generator writes the labels and the registry view reads them back,
//! so both sides must use the constants below and nothing else.

/// Label carrying the owner identifier of a worker, or [`PROXY_OWNER`] on proxy containers.
pub const LABEL_TASK_OWNER: &str = "TaskOwner";

/// Label carrying the human readable scrape target name.
pub const LABEL_TARGET: &str = "Target";

/// Label carrying the VPN region of a proxy (copied onto the workers it serves).
pub const LABEL_VPN_REGION: &str = "vpn.region";

/// Label set by the proxy image with its SOCKS listener port.
pub const LABEL_VPN_SOCKS_PORT: &str = "vpn.socks.port";

/// Label set by the proxy image with its HTTP listener port.
pub const LABEL_VPN_HTTP_PORT: &str = "vpn.http.port";

/// Sentinel value of [`LABEL_TASK_OWNER`] marking a proxy container.
pub const PROXY_OWNER: &str = "PROXY";

/// Virtual network shared by proxies and workers.
pub const PROXY_NETWORK: &str = "scraper_vpn";

/// Prefix of lease keys in the lease store (`proxy-usage:<container-id>`).
pub const LEASE_KEY_PREFIX: &str = "proxy-usage:";

/// Length of the short container identifier.
pub const SHORT_ID_LEN: usize = 12;

pub const ENV_SCRAPE_MODE: &str = "SCRAPE_MODE";
pub const ENV_PROXY_ADDRESS: &str = "PROXY_ADDRESS";
pub const ENV_CONCURRENCY: &str = "CONCURRENCY";
pub const ENV_IS_PROVISIONER: &str = "IS_PROVISIONER";
