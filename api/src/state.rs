use std::sync::Arc;

use sea_orm::DatabaseConnection;
use shared::{get_db_connection, BybitClient, Config, CryptomusClient, MetaApiClient, TelegramNotifier};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Arc<DatabaseConnection>,
    pub cryptomus: CryptomusClient,
    pub bybit: BybitClient,
    pub metaapi: MetaApiClient,
    pub notifier: TelegramNotifier,
}

impl AppState {
    pub async fn new() -> Result<Self, anyhow::Error> {
        let config = Config::from_env()?;
        let db = get_db_connection(&config.database_url).await?;
        tracing::info!("Connected to database successfully");

        Ok(AppState {
            cryptomus: CryptomusClient::new(config.cryptomus.clone()),
            bybit: BybitClient::new(config.bybit.clone()),
            metaapi: MetaApiClient::new(config.metaapi.clone()),
            notifier: TelegramNotifier::new(config.telegram.clone()),
            db: Arc::new(db),
            config,
        })
    }
}
