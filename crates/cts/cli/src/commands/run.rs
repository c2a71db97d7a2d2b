//! `cts run`

use crate::error::{CliError, CliResult, EXIT_NOT_CONFORMANT, EXIT_OK};
use crate::output;
use crate::LogArgs;
use clap::Args;
use cts_client::HttpRepositoryClient;
use cts_harness::{persist, HarnessConfig, TestLab};
use cts_types::ServerIdentity;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the server under test
    #[arg(long, env = "CTS_SERVER_NAME")]
    pub server_name: String,

    /// Root URL of the platform hosting the server
    #[arg(long, env = "CTS_SERVER_URL")]
    pub server_url: String,

    /// User id every call is made on behalf of
    #[arg(short, long)]
    pub user: Option<String>,

    /// Run only this workbench (repeatable)
    #[arg(short, long = "workbench", value_name = "ID")]
    pub workbenches: Vec<String>,

    /// Directory the result record is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "CTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run workbenches concurrently
    #[arg(long)]
    pub parallel: bool,
}

impl RunArgs {
    /// Flags win over file and environment settings.
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(user) = &self.user {
            config.client.user_id = user.clone();
        }
        if let Some(directory) = &self.output_dir {
            config.output.directory = directory.clone();
        }
        if self.parallel {
            config.lab.parallel_workbenches = true;
        }
    }
}

pub async fn execute(args: RunArgs, logging: &LogArgs) -> CliResult<u8> {
    let mut config = HarnessConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    logging.install(&config.logging);
    debug!(
        user = %config.client.user_id,
        output = %config.output.directory.display(),
        "Configuration loaded"
    );

    let server = ServerIdentity::new(args.server_name, args.server_url);
    let client = HttpRepositoryClient::new(config.client_config(server.clone()))?;
    let lab_config = config.lab_config();
    let workbenches = cts_workbenches::registry(Arc::new(client), &lab_config)?;
    let lab = TestLab::new(lab_config, workbenches)?.select(&args.workbenches)?;

    let results = lab.run(&server).await?;
    output::print_summary(&results);

    let path = persist::save(&results, &config.output.directory).map_err(CliError::Persist)?;
    output::print_success(&format!("Results written to {}", path.display()));

    Ok(if results.verdict {
        EXIT_OK
    } else {
        EXIT_NOT_CONFORMANT
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "cts",
            "run",
            "--server-name",
            "cocoMDS1",
            "--server-url",
            "https://localhost:9443",
            "--user",
            "erinoverview",
            "--workbench",
            "platform-services",
            "--workbench",
            "repository-services",
            "--output-dir",
            "/tmp/cts",
            "--parallel",
        ])
        .unwrap();
        let crate::Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.workbenches, vec!["platform-services", "repository-services"]);

        let mut config = HarnessConfig::default();
        args.apply(&mut config);
        assert_eq!(config.client.user_id, "erinoverview");
        assert_eq!(config.output.directory, PathBuf::from("/tmp/cts"));
        assert!(config.lab.parallel_workbenches);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let cli = Cli::try_parse_from([
            "cts",
            "run",
            "--server-name",
            "cocoMDS1",
            "--server-url",
            "https://localhost:9443",
        ])
        .unwrap();
        let crate::Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let mut config = HarnessConfig::default();
        config.client.user_id = "garygeeke".into();
        args.apply(&mut config);
        assert_eq!(config.client.user_id, "garygeeke");
        assert!(!config.lab.parallel_workbenches);
        assert!(args.workbenches.is_empty());
    }
}
