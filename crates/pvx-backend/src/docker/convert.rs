use std::collections::BTreeMap;

use bollard::{errors::Error as DockerError, models::ContainerSummary};

use pvx_core::{GatewayError, RawContainer};
use pvx_model::Labels;

/// Byte range of the octal size field in a ustar header.
const TAR_SIZE_FIELD: std::ops::Range<usize> = 124..136;

/// Project a Docker summary onto the runtime-neutral shape. Summaries without an id are dropped.
pub fn to_raw_container(summary: ContainerSummary) -> Option<RawContainer> {
    let id = summary.id?;
    let labels = summary.labels.map(Labels::from).unwrap_or_default();
    let networks: BTreeMap<String, String> = summary
        .network_settings
        .and_then(|ns| ns.networks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, ep)| ep.ip_address.map(|ip| (name, ip)))
        .collect();

    Some(RawContainer {
        id,
        labels,
        networks,
    })
}

/// Size recorded in the first header of a tar archive.
pub fn size_from_tar_header(header: &[u8]) -> Option<u64> {
    let field = header.get(TAR_SIZE_FIELD)?;
    let text = std::str::from_utf8(field).ok()?;
    let digits = text.trim_matches(|c: char| c == '\0' || c.is_ascii_whitespace());
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 8).ok()
}

pub(crate) fn is_not_found(err: &DockerError) -> bool {
    matches!(err, DockerError::DockerResponseServerError { status_code: 404, .. })
}

/// Daemon rejections become the operation error; anything else means the daemon is unreachable.
pub(crate) fn map_err<F>(err: DockerError, op: F) -> GatewayError
where
    F: FnOnce(String) -> GatewayError,
{
    match err {
        DockerError::DockerResponseServerError { status_code, message } => {
            op(format!("{status_code}: {message}"))
        }
        other => GatewayError::RuntimeUnavailable(other.to_string()),
    }
}
