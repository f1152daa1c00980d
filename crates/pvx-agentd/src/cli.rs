use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pvx-agentd", version, about = "Provision scraper workers behind leased VPN proxies")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print collected metrics in Prometheus text format before exiting.
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Submit a hotel scrape request.
    Provision {
        #[arg(long)]
        url: String,
        #[arg(long)]
        email: String,
        /// Print the terminal outcome of the request.
        #[arg(long)]
        wait: bool,
    },
    /// List running workers.
    Workers,
    /// List running proxies.
    Proxies,
    /// Hand a proxy back to the pool once its worker is done.
    Release { proxy_id: String },
    /// Force-remove a container and its volumes.
    Remove { container_id: String },
    /// Follow the output of a container.
    Logs { container_id: String },
    /// Pull the configured worker image.
    Pull,
    /// Size of the result file inside a worker.
    ResultSize { container_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provision() {
        let cli = Cli::try_parse_from([
            "pvx-agentd",
            "--config",
            "/etc/pvx.toml",
            "provision",
            "--url",
            "https://www.tripadvisor.com/Hotel_Review-g1-d2-Reviews-X.html",
            "--email",
            "a@b.ch",
            "--wait",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/pvx.toml")));
        assert!(matches!(cli.command, Command::Provision { wait: true, .. }));
    }

    #[test]
    fn subcommands_are_kebab_case() {
        let cli = Cli::try_parse_from(["pvx-agentd", "result-size", "0123456789ab", "--metrics"]).unwrap();
        assert!(cli.metrics);
        assert_eq!(
            cli.command,
            Command::ResultSize {
                container_id: "0123456789ab".into()
            }
        );
    }

    #[test]
    fn release_requires_an_id() {
        assert!(Cli::try_parse_from(["pvx-agentd", "release"]).is_err());
    }
}
