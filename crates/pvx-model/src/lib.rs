mod domain;
pub use domain::{ContainerId, Env, KeyValue, Labels, short_id};
pub use domain::{
    ENV_CONCURRENCY, ENV_IS_PROVISIONER, ENV_PROXY_ADDRESS, ENV_SCRAPE_MODE, LABEL_TARGET,
    LABEL_TASK_OWNER, LABEL_VPN_HTTP_PORT, LABEL_VPN_REGION, LABEL_VPN_SOCKS_PORT,
    LEASE_KEY_PREFIX, PROXY_NETWORK, PROXY_OWNER, SHORT_ID_LEN,
};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::{Role, TargetType};

mod spec;
pub use spec::{ContainerConfig, ContainerRecord, ProxyEndpoint, ProxyLease, RecordRole, WorkerInfo};

mod api;
pub use api::{ProvisionOutcome, ProvisionRequest, Provisioned, Rejection};
