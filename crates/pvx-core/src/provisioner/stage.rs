use std::fmt;

/// Intermediate states a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    Received,
    Validated,
    LeaseAcquisition,
    Configuring,
    Creating,
    /// Creation failed and the lease was handed back.
    LeaseReleased,
}

impl ProvisionStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProvisionStage::Received => "received",
            ProvisionStage::Validated => "validated",
            ProvisionStage::LeaseAcquisition => "lease_acquisition",
            ProvisionStage::Configuring => "configuring",
            ProvisionStage::Creating => "creating",
            ProvisionStage::LeaseReleased => "lease_released",
        }
    }
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
