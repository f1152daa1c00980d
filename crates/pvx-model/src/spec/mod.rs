mod container;
pub use container::ContainerConfig;

mod record;
pub use record::{ContainerRecord, ProxyEndpoint, RecordRole, WorkerInfo};

mod lease;
pub use lease::ProxyLease;
