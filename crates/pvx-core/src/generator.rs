use pvx_model::{
    ContainerConfig, ENV_CONCURRENCY, ENV_IS_PROVISIONER, ENV_PROXY_ADDRESS, ENV_SCRAPE_MODE, Env,
    LABEL_TARGET, LABEL_TASK_OWNER, LABEL_VPN_REGION, Labels, ProxyEndpoint, TargetType,
};

use crate::config::ProvisionerConfig;

/// Builds worker container configurations.
///
/// Pure: the same inputs always produce an identical [`ContainerConfig`]. The labels written
/// here are the ones [`crate::RegistryView`] classifies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigGenerator {
    image: String,
    concurrency: u32,
}

impl ConfigGenerator {
    pub fn new(image: impl Into<String>, concurrency: u32) -> Self {
        Self {
            image: image.into(),
            concurrency,
        }
    }

    pub fn from_config(cfg: &ProvisionerConfig) -> Self {
        Self::new(cfg.image.clone(), cfg.concurrency)
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn generate(
        &self,
        target: TargetType,
        target_name: &str,
        target_url: &str,
        owner: &str,
        proxy: &ProxyEndpoint,
    ) -> ContainerConfig {
        let mut env = Env::new();
        env.push(ENV_CONCURRENCY, self.concurrency.to_string());
        env.push(ENV_IS_PROVISIONER, "true");
        env.push(ENV_SCRAPE_MODE, target.as_str());
        env.push(target.url_var(), target_url);
        env.push(target.name_var(), target_name);
        env.push(ENV_PROXY_ADDRESS, proxy.socks_url());

        let mut labels = Labels::new();
        labels
            .insert(LABEL_TASK_OWNER, owner)
            .insert(LABEL_TARGET, target_name)
            .insert(LABEL_VPN_REGION, proxy.region.as_str());

        ContainerConfig::new(self.image.clone(), env, labels)
    }
}
