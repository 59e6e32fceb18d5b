use std::process::ExitCode;
use std::sync::Arc;

use carebox::cache::{MemorySessionCache, RedisSessionCache, SessionCache};
use carebox::middleware::cors::Cors;
use carebox::observability::init_tracing;
use carebox::store::{MemoryHealthRecords, MemoryUserStore};
use carebox::{Config, Error, Server, Services, TokenService, app};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("carebox: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let sessions: Arc<dyn SessionCache> = match &config.redis_url {
        Some(url) => {
            info!("using redis session cache");
            Arc::new(RedisSessionCache::connect(url).await?)
        }
        None => {
            warn!("REDIS_URL not set, sessions are kept in process memory");
            Arc::new(MemorySessionCache::new())
        }
    };

    let services = Arc::new(Services {
        users: Arc::new(MemoryUserStore::new()),
        records: Arc::new(MemoryHealthRecords::new()),
        sessions,
        tokens: TokenService::new(config.token_secret.clone(), config.access_token_ttl)?,
        cors: Cors::new(config.cors_allow_origin.clone()),
        session_ttl: config.session_ttl,
        bcrypt_cost: config.bcrypt_cost,
    });

    Server::bind(config.addr).serve(app::build(services)?).await
}
