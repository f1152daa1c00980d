mod provision;
pub use provision::{ProvisionOutcome, ProvisionRequest, Provisioned, Rejection};
