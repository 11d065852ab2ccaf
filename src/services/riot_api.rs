//! Thin wrapper around the riven client for the endpoints the bot uses.

use chrono::{Duration, Utc};
pub use riven::consts::PlatformRoute;
use riven::{
    consts::RegionalRoute,
    models::{champion_mastery_v4, clash_v1, league_v4, spectator_v4, summoner_v4},
    RiotApi, RiotApiError,
};
use tracing::trace;

pub struct RiotClient {
    client: RiotApi,
}

impl RiotClient {
    pub fn new(riot_token: &str) -> Self {
        Self {
            client: RiotApi::new(riot_token),
        }
    }

    pub async fn get_summoner(
        &self,
        server: PlatformRoute,
        summoner_name: &str,
    ) -> Result<Option<summoner_v4::Summoner>, RiotApiError> {
        self.client
            .summoner_v4()
            .get_by_summoner_name(server, summoner_name)
            .await
    }

    pub async fn get_summoner_by_id(
        &self,
        server: PlatformRoute,
        summoner_id: &str,
    ) -> Result<summoner_v4::Summoner, RiotApiError> {
        self.client
            .summoner_v4()
            .get_by_summoner_id(server, summoner_id)
            .await
    }

    pub async fn get_league_entries(
        &self,
        server: PlatformRoute,
        summoner_id: &str,
    ) -> Result<Vec<league_v4::LeagueEntry>, RiotApiError> {
        self.client
            .league_v4()
            .get_league_entries_for_summoner(server, summoner_id)
            .await
    }

    pub async fn get_champion_masteries(
        &self,
        server: PlatformRoute,
        summoner_id: &str,
    ) -> Result<Vec<champion_mastery_v4::ChampionMastery>, RiotApiError> {
        self.client
            .champion_mastery_v4()
            .get_all_champion_masteries(server, summoner_id)
            .await
    }

    pub async fn get_live_game(
        &self,
        server: PlatformRoute,
        summoner_id: &str,
    ) -> Result<Option<spectator_v4::CurrentGameInfo>, RiotApiError> {
        self.client
            .spectator_v4()
            .get_current_game_info_by_summoner(server, summoner_id)
            .await
    }

    /// The Clash team the summoner is currently registered in, if any.
    pub async fn get_clash_team(
        &self,
        server: PlatformRoute,
        summoner_id: &str,
    ) -> Result<Option<clash_v1::Team>, RiotApiError> {
        let players = self
            .client
            .clash_v1()
            .get_players_by_summoner(server, summoner_id)
            .await?;
        let Some(team_id) = players.into_iter().find_map(|p| p.team_id) else {
            return Ok(None);
        };
        self.client.clash_v1().get_team_by_id(server, &team_id).await
    }

    /// `(games, seconds)` played over the last 7 days.
    pub async fn get_weekly_playtime(
        &self,
        region: RegionalRoute,
        puuid: &str,
    ) -> Result<(usize, i64), RiotApiError> {
        let start_time = (Utc::now() - Duration::days(7)).timestamp();
        let matches = self
            .client
            .match_v5()
            .get_match_ids_by_puuid(
                region,
                puuid,
                Some(100),
                None,
                None,
                Some(start_time),
                None,
                None,
            )
            .await?;
        let mut secs = 0;
        for m_id in &matches {
            match self.client.match_v5().get_match(region, m_id).await? {
                Some(m) => secs += m.info.game_duration,
                None => trace!("match {m_id} disappeared between listing and fetch"),
            }
        }
        Ok((matches.len(), secs))
    }
}
