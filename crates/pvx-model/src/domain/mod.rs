mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod labels;
pub use labels::Labels;

mod constants;
pub use constants::*;

/// Short form of a runtime container identifier (see [`SHORT_ID_LEN`]).
pub type ContainerId = String;

/// Truncate a full runtime identifier to its stable short form.
///
/// Identifiers shorter than [`SHORT_ID_LEN`] are returned unchanged.
pub fn short_id(id: &str) -> ContainerId {
    id.chars().take(SHORT_ID_LEN).collect()
}
