//! Lazy Data Dragon / static-docs client.
//!
//! Everything here is fetched once on first use and kept for the lifetime of
//! the process: patch version, champion index, champion sheets, summoner
//! spells and the queue descriptions from the static developer docs.

use std::collections::HashMap;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::info;

const VERSIONS_URL: &str = "https://ddragon.leagueoflegends.com/api/versions.json";
const QUEUES_URL: &str = "https://static.developer.riotgames.com/docs/lol/queues.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ChampionSummary {
    /// Data Dragon identifier, e.g. `MissFortune`.
    pub id: String,
    /// Numeric key as a string, e.g. `21`.
    pub key: String,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChampionStats {
    pub hp: f64,
    pub hpperlevel: f64,
    pub mp: f64,
    pub mpperlevel: f64,
    pub movespeed: f64,
    pub armor: f64,
    pub armorperlevel: f64,
    pub spellblock: f64,
    pub spellblockperlevel: f64,
    pub attackrange: f64,
    pub hpregen: f64,
    pub hpregenperlevel: f64,
    pub mpregen: f64,
    pub mpregenperlevel: f64,
    pub attackdamage: f64,
    pub attackdamageperlevel: f64,
    pub attackspeed: f64,
    pub attackspeedperlevel: f64,
}

impl ChampionStats {
    /// `(level 1, level 18)` for a flat + per-level stat.
    pub fn scaled(base: f64, per_level: f64) -> (f64, f64) {
        (base, base + 17.0 * per_level)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChampionPassive {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChampionSpell {
    pub name: String,
    #[serde(rename = "cooldownBurn")]
    pub cooldown_burn: String,
    #[serde(rename = "costBurn")]
    pub cost_burn: String,
    #[serde(rename = "rangeBurn")]
    pub range_burn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChampionDetail {
    pub id: String,
    pub name: String,
    pub title: String,
    pub stats: ChampionStats,
    pub passive: ChampionPassive,
    pub spells: Vec<ChampionSpell>,
}

#[derive(Debug, Clone, Deserialize)]
struct Queue {
    #[serde(rename = "queueId")]
    queue_id: i64,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ChampionIndex {
    data: HashMap<String, ChampionSummary>,
}

#[derive(Deserialize)]
struct ChampionDetailFile {
    data: HashMap<String, ChampionDetail>,
}

#[derive(Deserialize)]
struct SummonerSpellEntry {
    name: String,
    key: String,
}

#[derive(Deserialize)]
struct SummonerSpellFile {
    data: HashMap<String, SummonerSpellEntry>,
}

/// Strips everything that is not a letter, so "Miss Fortune", "missfortune"
/// and "MissFortune" compare equal.
fn fold_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

pub struct DataDragon {
    http: HttpClient,
    version: OnceCell<String>,
    champions: OnceCell<Vec<ChampionSummary>>,
    spells: OnceCell<HashMap<i64, String>>,
    queues: OnceCell<Vec<Queue>>,
}

impl Default for DataDragon {
    fn default() -> Self {
        Self::new()
    }
}

impl DataDragon {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
            version: OnceCell::new(),
            champions: OnceCell::new(),
            spells: OnceCell::new(),
            queues: OnceCell::new(),
        }
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, String> {
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Data Dragon injoignable : {e}"))?
            .json()
            .await
            .map_err(|e| format!("Réponse Data Dragon invalide : {e}"))
    }

    pub async fn version(&self) -> Result<&str, String> {
        self.version
            .get_or_try_init(|| async {
                let versions: Vec<String> = self.fetch(VERSIONS_URL).await?;
                let v = versions.into_iter().next().ok_or("Aucune version")?;
                info!("Data Dragon patch {v}");
                Ok::<_, String>(v)
            })
            .await
            .map(String::as_str)
    }

    async fn champions(&self) -> Result<&[ChampionSummary], String> {
        self.champions
            .get_or_try_init(|| async {
                let v = self.version().await?;
                let url =
                    format!("https://ddragon.leagueoflegends.com/cdn/{v}/data/en_US/champion.json");
                let index: ChampionIndex = self.fetch(&url).await?;
                Ok::<_, String>(index.data.into_values().collect())
            })
            .await
            .map(Vec::as_slice)
    }

    /// Case- and space-insensitive lookup over identifiers and display names.
    pub async fn find_champion(&self, query: &str) -> Result<Option<ChampionSummary>, String> {
        let folded = fold_name(query);
        if folded.is_empty() {
            return Ok(None);
        }
        Ok(self
            .champions()
            .await?
            .iter()
            .find(|c| fold_name(&c.id) == folded || fold_name(&c.name) == folded)
            .cloned())
    }

    pub async fn champion_detail(&self, id: &str) -> Result<ChampionDetail, String> {
        let v = self.version().await?;
        let url =
            format!("https://ddragon.leagueoflegends.com/cdn/{v}/data/en_US/champion/{id}.json");
        let file: ChampionDetailFile = self.fetch(&url).await?;
        file.data
            .into_values()
            .next()
            .ok_or_else(|| format!("Pas de données pour {id}"))
    }

    pub async fn champion_icon_url(&self, id: &str) -> Result<String, String> {
        let v = self.version().await?;
        Ok(format!(
            "https://ddragon.leagueoflegends.com/cdn/{v}/img/champion/{id}.png"
        ))
    }

    pub async fn spell_name(&self, spell_id: i64) -> Result<String, String> {
        let spells = self
            .spells
            .get_or_try_init(|| async {
                let v = self.version().await?;
                let url =
                    format!("https://ddragon.leagueoflegends.com/cdn/{v}/data/en_US/summoner.json");
                let file: SummonerSpellFile = self.fetch(&url).await?;
                Ok::<_, String>(
                    file.data
                        .into_values()
                        .filter_map(|s| Some((s.key.parse().ok()?, s.name)))
                        .collect::<HashMap<i64, String>>(),
                )
            })
            .await?;
        Ok(spells
            .get(&spell_id)
            .cloned()
            .unwrap_or_else(|| "?".to_owned()))
    }

    /// Queue description from the static docs, without the " games" suffix
    /// they all carry.
    pub async fn queue_description(&self, queue_id: i64) -> Result<String, String> {
        let queues = self
            .queues
            .get_or_try_init(|| async { self.fetch::<Vec<Queue>>(QUEUES_URL).await })
            .await?;
        Ok(queues
            .iter()
            .find(|q| q.queue_id == queue_id)
            .and_then(|q| q.description.as_deref())
            .map(|d| d.trim_end_matches(" games").to_owned())
            .unwrap_or_else(|| "Mode inconnu".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_folding_ignores_case_spaces_and_punctuation() {
        assert_eq!(fold_name("Miss Fortune"), "missfortune");
        assert_eq!(fold_name("missfortune"), "missfortune");
        assert_eq!(fold_name("Kai'Sa"), "kaisa");
        assert_eq!(fold_name("Rek'Sai"), "reksai");
        assert_eq!(fold_name("42"), "");
    }

    #[test]
    fn stat_scaling_covers_seventeen_levels() {
        assert_eq!(ChampionStats::scaled(600.0, 100.0), (600.0, 2300.0));
    }

    #[tokio::test]
    #[ignore = "hits the live CDN"]
    async fn live_champion_lookup() {
        let dd = DataDragon::new();
        let c = dd.find_champion("miss fortune").await.unwrap().unwrap();
        assert_eq!(c.id, "MissFortune");
        let detail = dd.champion_detail(&c.id).await.unwrap();
        assert_eq!(detail.spells.len(), 4);
    }
}
