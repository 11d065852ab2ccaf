use anyhow::anyhow;
use shuttle_runtime::{SecretStore, Secrets};

use discord::build_bot;

mod assets;
mod commands;
mod database;
mod discord;
mod model;
mod services;
mod tournament;

struct HeraldService(serenity::Client);

#[shuttle_runtime::async_trait]
impl shuttle_runtime::Service for HeraldService {
    async fn bind(mut self, _addr: std::net::SocketAddr) -> Result<(), shuttle_runtime::Error> {
        self.0
            .start()
            .await
            .map_err(shuttle_runtime::CustomError::new)?;
        Ok(())
    }
}

#[shuttle_runtime::main]
async fn main(#[Secrets] secret_store: SecretStore) -> Result<HeraldService, shuttle_runtime::Error> {
    // Tokens come from `Secrets[.dev].toml`
    let discord_token = secret_store
        .get("DISCORD_TOKEN")
        .ok_or_else(|| anyhow!("Discord token missing! (secret `DISCORD_TOKEN`)"))?;
    let riot_token = secret_store
        .get("RIOT_TOKEN")
        .ok_or_else(|| anyhow!("Riot token missing! (secret `RIOT_TOKEN`)"))?;
    let db_url = secret_store
        .get("DATABASE_URL")
        .ok_or_else(|| anyhow!("URL for database missing! (secret `DATABASE_URL`)"))?;

    let client = build_bot(discord_token, riot_token, db_url).await;

    Ok(HeraldService(client))
}
