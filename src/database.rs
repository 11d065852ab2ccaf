use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::model::{LoLAccount, TournamentRow};

pub struct DBHandler {
    pub pool: PgPool,
}

impl DBHandler {
    pub async fn connect(db_url: &str) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .map_err(|e| format!("Database connection failed: {e}"))?;
        let h = Self { pool };
        h.bootstrap().await?;
        Ok(h)
    }

    async fn bootstrap(&self) -> Result<(), String> {
        for stmt in [
            "CREATE TABLE IF NOT EXISTS lol_account (
                user_id BIGINT NOT NULL,
                server TEXT NOT NULL,
                name TEXT NOT NULL,
                UNIQUE (user_id, server, name)
            )",
            "CREATE TABLE IF NOT EXISTS lore (
                user_id BIGINT PRIMARY KEY,
                text TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS tournament (
                guild_id BIGINT NOT NULL,
                name TEXT NOT NULL,
                state TEXT NOT NULL,
                active BOOL NOT NULL DEFAULT TRUE,
                UNIQUE (guild_id, name)
            )",
        ] {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| format!("Schema bootstrap failed: {e}"))?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait HeraldDBClient {
    async fn create_lol_account(
        &self,
        user_id: u64,
        server: String,
        name: String,
    ) -> Result<(), String>;
    async fn delete_lol_account(
        &self,
        user_id: u64,
        server: String,
        name: String,
    ) -> Result<(), String>;
    async fn get_lol_accounts(&self, user_id: u64) -> Result<Vec<LoLAccount>, String>;
    async fn get_lore(&self, user_id: u64) -> Result<Option<String>, String>;
    async fn set_lore(&self, user_id: u64, text: String) -> Result<(), String>;
    async fn save_tournament(&self, guild_id: u64, name: &str, state: String)
        -> Result<(), String>;
    async fn get_active_tournaments(&self) -> Result<Vec<TournamentRow>, String>;
    async fn set_tournament_inactive(&self, guild_id: u64, name: &str) -> Result<(), String>;
}

#[async_trait]
impl HeraldDBClient for DBHandler {
    async fn create_lol_account(
        &self,
        user_id: u64,
        server: String,
        name: String,
    ) -> Result<(), String> {
        sqlx::query(
            "INSERT INTO lol_account (user_id, server, name) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id as i64)
        .bind(server)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|_| "Failed to create lol_account".to_owned())?;
        Ok(())
    }

    async fn delete_lol_account(
        &self,
        user_id: u64,
        server: String,
        name: String,
    ) -> Result<(), String> {
        let r = sqlx::query(
            "DELETE FROM lol_account WHERE user_id = $1 AND server = $2 AND name = $3",
        )
        .bind(user_id as i64)
        .bind(server)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|_| "Failed to delete lol_account".to_owned())?;
        if r.rows_affected() == 0 {
            return Err("No such account".to_owned());
        }
        Ok(())
    }

    async fn get_lol_accounts(&self, user_id: u64) -> Result<Vec<LoLAccount>, String> {
        sqlx::query_as::<_, LoLAccount>(
            "SELECT server, name FROM lol_account WHERE user_id = $1 ORDER BY server, name",
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|_| "Failed to get accounts".to_owned())
    }

    async fn get_lore(&self, user_id: u64) -> Result<Option<String>, String> {
        sqlx::query_scalar::<_, String>("SELECT text FROM lore WHERE user_id = $1")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| "Failed to get lore".to_owned())
    }

    async fn set_lore(&self, user_id: u64, text: String) -> Result<(), String> {
        sqlx::query(
            "INSERT INTO lore (user_id, text) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET text = $2",
        )
        .bind(user_id as i64)
        .bind(text)
        .execute(&self.pool)
        .await
        .map_err(|_| "Failed to set lore".to_owned())?;
        Ok(())
    }

    async fn save_tournament(
        &self,
        guild_id: u64,
        name: &str,
        state: String,
    ) -> Result<(), String> {
        sqlx::query(
            "INSERT INTO tournament (guild_id, name, state, active) VALUES ($1, $2, $3, TRUE)
             ON CONFLICT (guild_id, name) DO UPDATE SET state = $3, active = TRUE",
        )
        .bind(guild_id as i64)
        .bind(name)
        .bind(state)
        .execute(&self.pool)
        .await
        .map_err(|_| "Failed to save tournament".to_owned())?;
        Ok(())
    }

    async fn get_active_tournaments(&self) -> Result<Vec<TournamentRow>, String> {
        sqlx::query_as::<_, TournamentRow>(
            "SELECT guild_id, name, state FROM tournament WHERE active",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|_| "Failed to load tournaments".to_owned())
    }

    async fn set_tournament_inactive(&self, guild_id: u64, name: &str) -> Result<(), String> {
        sqlx::query("UPDATE tournament SET active = FALSE WHERE guild_id = $1 AND name = $2")
            .bind(guild_id as i64)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|_| "Failed to archive tournament".to_owned())?;
        Ok(())
    }
}
