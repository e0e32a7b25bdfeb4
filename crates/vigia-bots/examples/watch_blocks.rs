use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vigia_bots::{BotRegistry, BotsConfig};
use vigia_core::traits::RpcProvider;
use vigia_core::Finding;
use vigia_rpc::{RpcConfig, VigiaRpcClient};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

fn report(findings: &[Finding]) -> Result<()> {
    for finding in findings {
        let json = serde_json::to_string(finding).context("falha ao serializar finding")?;
        info!(alert_id = %finding.alert_id, finding = %json, "finding");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: {} <RPC_ENDPOINT> [CONFIG_JSON]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(2) {
        Some(path) => BotsConfig::from_file(path).context("configuração inválida")?,
        None => BotsConfig::shipped().context("configuração padrão inválida")?,
    };

    let client = Arc::new(
        VigiaRpcClient::new(RpcConfig::new(args[1].as_str()))
            .await
            .context("falha ao conectar ao node")?,
    );
    let chain_id = client.chain_id().await.context("falha ao obter chain id")?;
    let registry = BotRegistry::from_config(Arc::clone(&client), &config, chain_id)?;
    if registry.is_empty() {
        warn!(chain_id, "nenhum bot configurado para esta rede");
        return Ok(());
    }

    let mut last = client.get_block_number().await?;
    info!(chain_id, block = last, "acompanhando novos blocos");

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        let head = match client.get_block_number().await {
            Ok(head) => head,
            Err(err) => {
                warn!(%err, "falha ao consultar o bloco atual");
                continue;
            }
        };

        for number in last + 1..=head {
            // em caso de falha o bloco é tentado de novo na próxima rodada
            let block = match client.get_block(number).await {
                Ok(block) => block,
                Err(err) => {
                    warn!(block = number, %err, "falha ao buscar o bloco");
                    break;
                }
            };
            let txs = match client.get_block_transactions(number).await {
                Ok(txs) => txs,
                Err(err) => {
                    warn!(block = number, %err, "falha ao buscar as transações do bloco");
                    break;
                }
            };

            if let Some(block) = block {
                report(&registry.handle_block(&block).await)?;
            }
            for tx in txs {
                report(&registry.handle_transaction(&tx).await)?;
            }
            last = number;
        }
    }
}
