pub mod config;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod intake;
pub mod lease;
pub mod metrics;
pub mod provisioner;
pub mod registry;
pub mod store;
pub mod supervisor;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use config::ProvisionerConfig;
pub use error::CoreError;
pub use gateway::{GatewayError, LogStream, RawContainer, RuntimeGateway};
pub use generator::ConfigGenerator;
pub use intake::{Acknowledgment, Intake, TripAdvisorValidator, Validator};
pub use lease::LeaseManager;
pub use metrics::{LeaseEvent, MetricsBackend, MetricsHandle, ProvisionVerdict, noop_metrics};
pub use provisioner::{ProvisionStage, Provisioner};
pub use registry::RegistryView;
pub use store::{LeaseStore, MemoryLeaseStore, StoreError};
pub use supervisor::{Dispatcher, PROVISION_TASK_PREFIX, ProvisionHandle, ProvisionSupervisor};
