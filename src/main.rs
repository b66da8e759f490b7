use build_trigger::error::{Result, TriggerError};
use build_trigger::github::{Client, ClientBuilder};
use build_trigger::logging::setup_logging;
use build_trigger::pipeline::run_once;
use build_trigger::TriggerConfig;
use tracing::{error, info};

fn build_client(config: &TriggerConfig) -> Result<Client> {
    let client = ClientBuilder::new(config.token.clone())
        .base_url(config.api_url.as_str())?
        .timeout(config.timeout)
        .build()?;
    Ok(client)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    let config = match TriggerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            let log_dir = std::env::var_os("LOG_DIR").filter(|v| !v.is_empty());
            let guard = setup_logging(log_dir.map(Into::into));
            error!("{}", TriggerError::from(e));
            drop(guard);
            std::process::exit(1);
        }
    };
    let guard = setup_logging(config.log_dir.clone());

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            drop(guard);
            std::process::exit(1);
        }
    };

    info!(
        "Source {}, target {} ({} on {}), API {}",
        config.source_repo,
        config.target_repo,
        config.workflow_id,
        config.branch,
        client.base_url()
    );

    let run = run_once(&client, &config).await;
    info!(
        run_id = %run.id,
        status = ?run.status,
        commits = run.commits_seen,
        "Run finished"
    );
    drop(guard);
}
