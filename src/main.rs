use std::sync::Arc;

use coinkeeper::bot::{run_dispatcher, spawn_daily_reset, JsonFile, ResetPolicy, Store};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting coinkeeper bot...");

    let store_path = std::env::var("STORE_PATH").unwrap_or_else(|_| "db.json".to_string());
    let store = match Store::open(JsonFile::new(&store_path)) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            log::error!("Failed to open store at {store_path}: {error}");
            return;
        }
    };

    let bot = teloxide::Bot::from_env();

    spawn_daily_reset(Arc::clone(&store), ResetPolicy::from_env());

    log::info!("coinkeeper bot started successfully!");

    run_dispatcher(bot, store).await;
}
