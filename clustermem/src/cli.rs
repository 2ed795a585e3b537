use clap::Parser;
use std::path::PathBuf;

use clustermem_core::ReportFormat;

#[derive(Parser, Debug)]
#[command(name = "clustermem")]
#[command(
    about = "Report memory reservation and limit totals committed on a vSphere cluster",
    long_about = None,
    version
)]
pub struct Cli {
    /// vCenter/ESXi SDK URL [default: https://127.0.0.1/sdk]
    #[arg(long)]
    pub url: Option<String>,

    /// Login user name [default: administrator@vsphere.local]
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Login password (or CLUSTERMEM_PASSWORD)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Name of the cluster whose VMs are totalled
    #[arg(short = 'c', long)]
    pub cluster: String,

    /// Accept self-signed TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// VI/JSON API release, e.g. 8.0.1.0
    #[arg(long)]
    pub api_release: Option<String>,

    /// TOML file with connection settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read the inventory from a JSON or YAML snapshot instead of an endpoint
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["url", "user", "password", "insecure", "timeout", "api_release", "config"]
    )]
    pub snapshot: Option<PathBuf>,

    /// Output format: plain or json
    #[arg(long, default_value = "plain")]
    pub format: ReportFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags_match_long_flags() {
        let cli = Cli::try_parse_from([
            "clustermem", "-u", "ops@vsphere.local", "-p", "secret", "-c", "C1", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("ops@vsphere.local"));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(cli.cluster, "C1");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, ReportFormat::Plain);
    }

    #[test]
    fn test_cluster_is_required() {
        assert!(Cli::try_parse_from(["clustermem", "-p", "secret"]).is_err());
    }

    #[test]
    fn test_snapshot_conflicts_with_endpoint_flags() {
        assert!(Cli::try_parse_from([
            "clustermem",
            "-c",
            "C1",
            "--snapshot",
            "inventory.json",
            "--url",
            "https://vc/sdk",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "clustermem",
            "-c",
            "C1",
            "--snapshot",
            "inventory.json",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["clustermem", "-c", "C1", "--format", "csv"]).is_err());
    }
}
