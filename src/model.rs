#[derive(sqlx::FromRow)]
pub struct LoLAccount {
    pub server: String,
    pub name: String,
}

#[derive(sqlx::FromRow)]
pub struct TournamentRow {
    pub guild_id: i64,
    pub name: String,
    pub state: String,
}
