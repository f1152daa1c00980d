use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;
use taskvisor::{ControllerConfig, Subscribe, SupervisorConfig};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use pvx_backend::{docker::DockerGateway, redis::RedisLeaseStore};
use pvx_core::{
    Intake, LeaseStore, MemoryLeaseStore, MetricsHandle, ProvisionSupervisor, Provisioner,
    RuntimeGateway, TripAdvisorValidator,
};
use pvx_model::Role;
use pvx_observe::ProvisionEventLogger;
use pvx_prometheus::PrometheusMetrics;

use crate::{cli::Command, config::AgentConfig};

/// Wired capabilities shared by every subcommand.
pub struct App {
    cfg: AgentConfig,
    gateway: Arc<dyn RuntimeGateway>,
    provisioner: Provisioner,
    metrics: PrometheusMetrics,
}

impl App {
    pub async fn build(cfg: AgentConfig) -> anyhow::Result<Self> {
        let docker = match &cfg.docker.socket {
            Some(path) => DockerGateway::connect_socket(path)?,
            None => DockerGateway::connect_local()?,
        };
        docker.ping().await.context("docker daemon is unreachable")?;
        let gateway: Arc<dyn RuntimeGateway> = Arc::new(docker);

        let store: Arc<dyn LeaseStore> = match &cfg.redis_url {
            Some(url) => Arc::new(RedisLeaseStore::connect(url, cfg.lease_holder.as_deref()).await?),
            None => {
                warn!("no redis_url configured, leases are local to this process");
                Arc::new(MemoryLeaseStore::new())
            }
        };

        let metrics = PrometheusMetrics::new().context("registering metrics")?;
        let handle: MetricsHandle = Arc::new(metrics.clone());
        let provisioner = Provisioner::new(gateway.clone(), store, &cfg.provisioner, handle);

        Ok(Self {
            cfg,
            gateway,
            provisioner,
            metrics,
        })
    }

    pub fn metrics_text(&self) -> anyhow::Result<String> {
        Ok(self.metrics.encode()?)
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Provision { url, email, wait } => self.provision(&url, &email, wait).await,
            Command::Workers => self.list(Role::Worker).await,
            Command::Proxies => self.list(Role::Proxy).await,
            Command::Release { proxy_id } => {
                self.provisioner.leases().release(&proxy_id).await?;
                println!("released {proxy_id}");
                Ok(())
            }
            Command::Remove { container_id } => {
                self.gateway.remove_container(&container_id).await?;
                println!("removed {container_id}");
                Ok(())
            }
            Command::Logs { container_id } => self.logs(&container_id).await,
            Command::Pull => self.pull().await,
            Command::ResultSize { container_id } => {
                let path = &self.cfg.provisioner.result_path;
                match self.gateway.stat_path(&container_id, path).await? {
                    Some(size) => println!("{size}"),
                    None => println!("{path} not present in {container_id}"),
                }
                Ok(())
            }
        }
    }

    async fn provision(&self, url: &str, email: &str, wait: bool) -> anyhow::Result<()> {
        if self.cfg.pull_on_start {
            self.pull().await?;
        }

        let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ProvisionEventLogger)];
        let supervisor = ProvisionSupervisor::new(
            self.provisioner.clone(),
            SupervisorConfig::default(),
            ControllerConfig::default(),
            subscribers,
        )
        .await;
        let intake = Intake::new(
            self.provisioner.clone(),
            Arc::new(supervisor),
            Arc::new(TripAdvisorValidator),
            &self.cfg.provisioner,
        );

        let ack = intake.submit(email, url).await?;
        println!("{}", ack.message);
        if let Some(output) = &ack.output_url {
            println!("{output}");
        }

        // The request runs on this process's supervisor; stay up until it settles.
        if let Some(handle) = ack.handle {
            let request = handle.request_id();
            match handle.wait().await {
                Ok(outcome) => {
                    info!(%request, provisioned = outcome.is_provisioned(), "request settled");
                    if wait {
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    }
                }
                Err(e) if wait => return Err(e.into()),
                Err(e) => warn!(%request, error = %e, "request failed"),
            }
        }
        Ok(())
    }

    async fn list(&self, role: Role) -> anyhow::Result<()> {
        let records = self.provisioner.registry().list_by_role(role).await?;
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        info!(%role, count = records.len(), "listed containers");
        Ok(())
    }

    async fn logs(&self, id: &str) -> anyhow::Result<()> {
        let mut stream = self.gateway.stream_logs(id);
        let mut out = tokio::io::stdout();
        while let Some(chunk) = stream.next().await {
            out.write_all(&chunk?).await?;
        }
        out.flush().await?;
        Ok(())
    }

    async fn pull(&self) -> anyhow::Result<()> {
        let image = &self.cfg.provisioner.image;
        self.gateway
            .pull_image(image)
            .await
            .with_context(|| format!("pulling {image}"))?;
        println!("pulled {image}");
        Ok(())
    }
}
