use std::str::FromStr;

use riven::{
    consts::{Champion, Division, QueueType, Team, Tier},
    models::league_v4::LeagueEntry,
};
use serenity::{
    builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage},
    client::Context,
    framework::standard::{
        macros::{command, group},
        Args, CommandResult,
    },
    model::prelude::Message,
};

use crate::{
    assets,
    database::HeraldDBClient,
    discord::{get_db_handler, get_ddragon, get_riot_client},
    services::riot_api::PlatformRoute,
};

#[group]
#[commands(lol)]
struct LoL;

#[command]
#[sub_commands(add, remove, accounts, summoner, game, champion, clash, playtime)]
#[description("Tout ce qui touche à League of Legends.")]
async fn lol(_ctx: &Context, _msg: &Message, mut _args: Args) -> CommandResult {
    Err(Box::new(serenity::Error::Other(
        "Sous-commandes : add, remove, accounts, summoner, game, champion, clash, playtime",
    )))
}

/// `"EUW:Name With Spaces"` → `(EUW1, "Name With Spaces")`.
fn parse_server_summoner(s: &str) -> Result<(PlatformRoute, String), String> {
    let (server, name) = s
        .trim_matches('"')
        .split_once(':')
        .ok_or("Format attendu : SERVEUR:Nom")?;
    Ok((parse_route(server)?, name.to_owned()))
}

/// Accepts both riven route names ("EUW1") and the shorthands people type.
fn parse_route(server: &str) -> Result<PlatformRoute, String> {
    let server = server.trim().to_uppercase();
    let alias = match server.as_str() {
        "EUW" => "EUW1",
        "EUNE" => "EUN1",
        "NA" => "NA1",
        "BR" => "BR1",
        "LAN" => "LA1",
        "LAS" => "LA2",
        "OCE" => "OC1",
        "TR" => "TR1",
        "JP" => "JP1",
        s => s,
    };
    PlatformRoute::from_str(alias).map_err(|_| format!("Serveur inconnu : {server}"))
}

fn tier_name(tier: Tier) -> &'static str {
    match tier {
        Tier::IRON => "IRON",
        Tier::BRONZE => "BRONZE",
        Tier::SILVER => "SILVER",
        Tier::GOLD => "GOLD",
        Tier::PLATINUM => "PLATINUM",
        Tier::EMERALD => "EMERALD",
        Tier::DIAMOND => "DIAMOND",
        Tier::MASTER => "MASTER",
        Tier::GRANDMASTER => "GRANDMASTER",
        Tier::CHALLENGER => "CHALLENGER",
        _ => "UNRANKED",
    }
}

fn division_name(division: Division) -> &'static str {
    match division {
        Division::I => "I",
        Division::II => "II",
        Division::III => "III",
        Division::IV => "IV",
        _ => "?",
    }
}

/// Total order over ranks: tier dominates, then division, then LP.
fn rank_score(tier: Tier, division: Division, lp: i32) -> i64 {
    let tier_idx: i64 = match tier {
        Tier::IRON => 0,
        Tier::BRONZE => 1,
        Tier::SILVER => 2,
        Tier::GOLD => 3,
        Tier::PLATINUM => 4,
        Tier::EMERALD => 5,
        Tier::DIAMOND => 6,
        Tier::MASTER => 7,
        Tier::GRANDMASTER => 8,
        Tier::CHALLENGER => 9,
        _ => -1,
    };
    let division_idx: i64 = match division {
        Division::IV => 0,
        Division::III => 1,
        Division::II => 2,
        Division::I => 3,
        _ => 0,
    };
    tier_idx * 10_000 + division_idx * 1_000 + i64::from(lp)
}

/// Three significant digits with a K/M/B/T suffix.
fn format_mastery_points(points: i64) -> String {
    let mut value = points as f64;
    let mut unit = "";
    for next in ["K", "M", "B", "T"] {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }
    let s = if unit.is_empty() {
        format!("{value:.0}")
    } else if value >= 100.0 {
        format!("{value:.0}")
    } else if value >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    };
    format!("{s}{unit}")
}

fn seconds_to_hms(mut secs: i64) -> (i64, i64, i64) {
    let hrs = secs / 3600;
    secs -= 3600 * hrs;
    let mins = secs / 60;
    secs -= 60 * mins;
    (hrs, mins, secs)
}

/// Lanes in pick-order, for Clash rosters.
fn position_order(position: &str) -> usize {
    match position {
        "TOP" => 0,
        "JUNGLE" => 1,
        "MIDDLE" => 2,
        "BOTTOM" => 3,
        "UTILITY" => 4,
        "FILL" => 5,
        _ => 6,
    }
}

fn champion_name(c: Champion) -> &'static str {
    c.name().unwrap_or("?")
}

fn rank_line(entry: Option<&LeagueEntry>) -> String {
    match entry {
        Some(e) => {
            let tier = e.tier.map(tier_name).unwrap_or("UNRANKED");
            let division = e.rank.map(division_name).unwrap_or("");
            format!(
                "{} {tier} {division} · {} LP ({}W/{}L)",
                assets::tier_emote(tier),
                e.league_points,
                e.wins,
                e.losses
            )
        }
        None => format!("{} Unranked", assets::tier_emote("")),
    }
}

fn find_queue(entries: &[LeagueEntry], queue: QueueType) -> Option<&LeagueEntry> {
    entries.iter().find(|e| e.queue_type == queue)
}

/// `SERVEUR:Nom` from the args, or the caller's first registered account.
async fn resolve_account(
    ctx: &Context,
    msg: &Message,
    args: &Args,
) -> Result<(PlatformRoute, String), String> {
    if let Some(arg) = args.remains() {
        return parse_server_summoner(arg);
    }
    let db = get_db_handler(ctx).await;
    let accounts = db.get_lol_accounts(msg.author.id.get()).await?;
    let account = accounts
        .first()
        .ok_or("Aucun compte enregistré. Utilise `!lol add SERVEUR:Nom`.")?;
    Ok((parse_route(&account.server)?, account.name.clone()))
}

#[command]
#[min_args(1)]
#[description("Enregistre un de tes comptes LoL.")]
#[usage("<SERVEUR:Nom>")]
#[example("\"EUW:Px de Fou\"")]
async fn add(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let (server, name) = parse_server_summoner(args.rest())?;
    let client = get_riot_client(ctx).await;
    // refuse typos before they land in the database
    client
        .get_summoner(server, &name)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Invocateur introuvable sur ce serveur.")?;
    let db = get_db_handler(ctx).await;
    db.create_lol_account(msg.author.id.get(), server.to_string(), name.clone())
        .await?;
    msg.channel_id
        .say(ctx, format!("Compte [{server}] {name} enregistré."))
        .await?;
    Ok(())
}

#[command]
#[min_args(1)]
#[description("Oublie un de tes comptes LoL.")]
#[usage("<SERVEUR:Nom>")]
async fn remove(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let (server, name) = parse_server_summoner(args.rest())?;
    let db = get_db_handler(ctx).await;
    db.delete_lol_account(msg.author.id.get(), server.to_string(), name.clone())
        .await?;
    msg.channel_id
        .say(ctx, format!("Compte [{server}] {name} oublié."))
        .await?;
    Ok(())
}

#[command]
#[description("Liste tes comptes enregistrés.")]
async fn accounts(ctx: &Context, msg: &Message) -> CommandResult {
    let db = get_db_handler(ctx).await;
    let accounts = db.get_lol_accounts(msg.author.id.get()).await?;
    if accounts.is_empty() {
        msg.channel_id
            .say(ctx, "Aucun compte enregistré. Utilise `!lol add SERVEUR:Nom`.")
            .await?;
        return Ok(());
    }
    let list = accounts
        .iter()
        .map(|a| format!("[{}] {}", a.server, a.name))
        .collect::<Vec<_>>()
        .join("\n");
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::new().embed(
                CreateEmbed::new()
                    .author(CreateEmbedAuthor::new(&msg.author.name))
                    .title("Comptes enregistrés")
                    .colour((0, 123, 255))
                    .description(list),
            ),
        )
        .await?;
    Ok(())
}

#[command]
#[aliases(profile)]
#[description("Profil d'un invocateur : niveau, rangs, meilleures maîtrises.")]
#[usage("[SERVEUR:Nom]")]
async fn summoner(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let (server, name) = resolve_account(ctx, msg, &args).await?;
    let client = get_riot_client(ctx).await;
    let typing = msg.channel_id.start_typing(&ctx.http);
    let summoner = client
        .get_summoner(server, &name)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Invocateur introuvable sur ce serveur.")?;
    let entries = client
        .get_league_entries(server, &summoner.id)
        .await
        .map_err(|e| e.to_string())?;
    let masteries = client
        .get_champion_masteries(server, &summoner.id)
        .await
        .map_err(|e| e.to_string())?;
    let top = masteries
        .iter()
        .take(3)
        .map(|m| {
            format!(
                "**{}** · niveau {} · {} pts",
                champion_name(m.champion_id),
                m.champion_level,
                format_mastery_points(i64::from(m.champion_points))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let opgg = assets::opgg_summoner_url(
        server.to_string().to_lowercase().trim_end_matches('1'),
        &name,
    );
    let embed = CreateEmbed::new()
        .author(CreateEmbedAuthor::new(format!("[{server}]")).icon_url(assets::LOL_ICON))
        .title(name.to_uppercase())
        .url(opgg)
        .colour((0, 123, 255))
        .thumbnail(assets::profile_icon_url(summoner.profile_icon_id))
        .field(
            "Solo/Duo",
            rank_line(find_queue(&entries, QueueType::RANKED_SOLO_5x5)),
            false,
        )
        .field(
            "Flexible",
            rank_line(find_queue(&entries, QueueType::RANKED_FLEX_SR)),
            false,
        )
        .field(
            "Maîtrises",
            if top.is_empty() { "Aucune".to_owned() } else { top },
            false,
        )
        .footer(CreateEmbedFooter::new(format!(
            "Niveau {}",
            summoner.summoner_level
        )));
    typing.stop();
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[aliases(live)]
#[description("La partie en cours d'un invocateur.")]
#[usage("[SERVEUR:Nom]")]
async fn game(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let (server, name) = resolve_account(ctx, msg, &args).await?;
    let client = get_riot_client(ctx).await;
    let dd = get_ddragon(ctx).await;
    let typing = msg.channel_id.start_typing(&ctx.http);
    let summoner = client
        .get_summoner(server, &name)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Invocateur introuvable sur ce serveur.")?;
    let Some(game) = client
        .get_live_game(server, &summoner.id)
        .await
        .map_err(|e| e.to_string())?
    else {
        typing.stop();
        msg.channel_id
            .say(ctx, format!("{name} n'est pas en partie."))
            .await?;
        return Ok(());
    };
    let queue = match game.game_queue_config_id {
        Some(q) => dd.queue_description(i64::from(q.0)).await?,
        None => "Mode inconnu".to_owned(),
    };
    let mut embed = CreateEmbed::new()
        .author(CreateEmbedAuthor::new(format!("[{server}]")).icon_url(assets::LOL_ICON))
        .title(format!("Partie de {name}"))
        .colour((0, 123, 255))
        .description(format!(
            "**{queue}** · ⏱️ {}:{:02}",
            game.game_length / 60,
            game.game_length % 60
        ));
    for (team, team_name) in [(Team::BLUE, "🟦 Équipe bleue"), (Team::RED, "🟥 Équipe rouge")] {
        let mut lines = Vec::new();
        for p in game.participants.iter().filter(|p| p.team_id == team) {
            let entries = client
                .get_league_entries(server, &p.summoner_id)
                .await
                .unwrap_or_default();
            let solo = find_queue(&entries, QueueType::RANKED_SOLO_5x5);
            let tier = solo.and_then(|e| e.tier).map(tier_name).unwrap_or("");
            let score = solo
                .map(|e| {
                    rank_score(
                        e.tier.unwrap_or(Tier::UNRANKED),
                        e.rank.unwrap_or(Division::IV),
                        e.league_points,
                    )
                })
                .unwrap_or(-1);
            // flash first, people read spells that way
            let (s1, s2) = if p.spell2_id == 4 {
                (p.spell2_id, p.spell1_id)
            } else {
                (p.spell1_id, p.spell2_id)
            };
            lines.push((
                score,
                format!(
                    "{} **{}** ({}/{}) · {}",
                    assets::tier_emote(tier),
                    p.summoner_name,
                    dd.spell_name(s1).await?,
                    dd.spell_name(s2).await?,
                    champion_name(p.champion_id),
                ),
            ));
        }
        // best ranked first
        lines.sort_by_key(|(score, _)| -score);
        let mut lines: Vec<String> = lines.into_iter().map(|(_, l)| l).collect();
        let mut team_bans: Vec<_> = game
            .banned_champions
            .iter()
            .filter(|b| b.team_id == team)
            .collect();
        team_bans.sort_by_key(|b| b.pick_turn);
        let bans = team_bans
            .iter()
            .map(|b| champion_name(b.champion_id))
            .collect::<Vec<_>>()
            .join(", ");
        if !bans.is_empty() {
            lines.push(format!("⛔ {bans}"));
        }
        embed = embed.field(team_name, lines.join("\n"), false);
    }
    typing.stop();
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[aliases(champ)]
#[min_args(1)]
#[description("Fiche d'un champion : stats niveau 1 → 18 et sorts.")]
#[usage("<champion>")]
#[example("miss fortune")]
async fn champion(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let dd = get_ddragon(ctx).await;
    let query = args.rest();
    let Some(found) = dd.find_champion(query).await? else {
        msg.channel_id
            .say(ctx, format!("Je ne connais pas de champion \"{query}\"."))
            .await?;
        return Ok(());
    };
    let c = dd.champion_detail(&found.id).await?;
    let stat = |label: &str, base: f64, per: f64| {
        let (lvl1, lvl18) = crate::services::ddragon::ChampionStats::scaled(base, per);
        format!("{label} : {lvl1:.0} → {lvl18:.0}")
    };
    let stats = [
        stat("PV", c.stats.hp, c.stats.hpperlevel),
        stat("Mana", c.stats.mp, c.stats.mpperlevel),
        stat("AD", c.stats.attackdamage, c.stats.attackdamageperlevel),
        stat("Armure", c.stats.armor, c.stats.armorperlevel),
        stat("RM", c.stats.spellblock, c.stats.spellblockperlevel),
        format!("Vitesse : {:.0}", c.stats.movespeed),
        format!("Portée : {:.0}", c.stats.attackrange),
    ]
    .join("\n");
    let mut embed = CreateEmbed::new()
        .title(format!("{}, {}", c.name, c.title))
        .colour((0, 123, 255))
        .thumbnail(dd.champion_icon_url(&c.id).await?)
        .field("📊 Stats (niv. 1 → 18)", stats, false)
        .field(format!("🔹 Passif : {}", c.passive.name), &c.passive.description, false);
    for (key, spell) in ["Q", "W", "E", "R"].iter().zip(c.spells.iter()) {
        embed = embed.field(
            format!("{key} : {}", spell.name),
            format!(
                "⏳ {} s · 💧 {} · 📏 {}",
                spell.cooldown_burn, spell.cost_burn, spell.range_burn
            ),
            true,
        );
    }
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[description("L'équipe Clash d'un invocateur.")]
#[usage("[SERVEUR:Nom]")]
async fn clash(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let (server, name) = resolve_account(ctx, msg, &args).await?;
    let client = get_riot_client(ctx).await;
    let typing = msg.channel_id.start_typing(&ctx.http);
    let summoner = client
        .get_summoner(server, &name)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Invocateur introuvable sur ce serveur.")?;
    let Some(team) = client
        .get_clash_team(server, &summoner.id)
        .await
        .map_err(|e| e.to_string())?
    else {
        typing.stop();
        msg.channel_id
            .say(ctx, format!("{name} n'est pas inscrit en Clash."))
            .await?;
        return Ok(());
    };
    let mut players = team.players.clone();
    players.sort_by_key(|p| position_order(&p.position.to_uppercase()));
    let mut lines = Vec::new();
    let mut names = Vec::new();
    for p in &players {
        let member = client
            .get_summoner_by_id(server, &p.summoner_id)
            .await
            .map_err(|e| e.to_string())?;
        let entries = client
            .get_league_entries(server, &p.summoner_id)
            .await
            .unwrap_or_default();
        let solo = find_queue(&entries, QueueType::RANKED_SOLO_5x5);
        let tier = solo.and_then(|e| e.tier).map(tier_name).unwrap_or("");
        let captain = if p.summoner_id == team.captain { " 👑" } else { "" };
        lines.push(format!(
            "{} {} **{}**{captain}",
            assets::position_emote(&p.position.to_uppercase()),
            assets::tier_emote(tier),
            member.name
        ));
        names.push(member.name);
    }
    let region = server.to_string().to_lowercase();
    let region = region.trim_end_matches('1');
    let embed = CreateEmbed::new()
        .author(CreateEmbedAuthor::new(format!("[{server}]")).icon_url(assets::LOL_ICON))
        .title(format!("[{}] {}", team.abbreviation, team.name))
        .url(assets::opgg_multi_url(region, &names))
        .colour((0, 123, 255))
        .image(assets::CLASH_BANNER)
        .description(lines.join("\n"));
    typing.stop();
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[aliases(pt)]
#[description("Temps de jeu des 7 derniers jours.")]
#[usage("[summoners...]")]
#[example("\"EUW:Px de Fou\" \"EUNE:Smol Herald\"")]
async fn playtime(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let client = get_riot_client(ctx).await;
    let mut targets: Vec<(PlatformRoute, String)> = Vec::new();
    if args.is_empty() {
        let db = get_db_handler(ctx).await;
        for a in db.get_lol_accounts(msg.author.id.get()).await? {
            targets.push((parse_route(&a.server)?, a.name));
        }
        if targets.is_empty() {
            return Err("Aucun compte enregistré. Utilise `!lol add SERVEUR:Nom`.".into());
        }
    } else {
        for arg in args.quoted().iter::<String>().filter_map(|s| s.ok()) {
            targets.push(parse_server_summoner(&arg)?);
        }
    }
    let typing = msg.channel_id.start_typing(&ctx.http);
    let mut s = String::from("**Temps de jeu cette semaine :**\n");
    for (server, name) in targets {
        let summoner = match client
            .get_summoner(server, &name)
            .await
            .map_err(|e| e.to_string())
            .and_then(|o| o.ok_or_else(|| "introuvable".to_owned()))
        {
            Ok(a) => a,
            Err(e) => {
                s.push_str(&format!("[{server}] {name} : {e}\n"));
                continue;
            }
        };
        match client
            .get_weekly_playtime(server.to_regional(), &summoner.puuid)
            .await
        {
            Ok((games, secs)) => {
                let (hrs, mins, secs) = seconds_to_hms(secs);
                s.push_str(&format!(
                    "[{server}] {name} : {games} parties, {hrs}h{mins}m{secs}s\n"
                ));
            }
            Err(e) => s.push_str(&format!("[{server}] {name} : {e}\n")),
        }
    }
    typing.stop();
    msg.channel_id.say(ctx, s).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_summoner_parsing() {
        let (server, name) = parse_server_summoner("EUW:Px de Fou").unwrap();
        assert_eq!(server, PlatformRoute::EUW1);
        assert_eq!(name, "Px de Fou");
        let (server, _) = parse_server_summoner("\"eune:Smol\"").unwrap();
        assert_eq!(server, PlatformRoute::EUN1);
        assert!(parse_server_summoner("NoColon").is_err());
        assert!(parse_server_summoner("XYZ:Name").is_err());
    }

    #[test]
    fn route_aliases() {
        assert_eq!(parse_route("euw").unwrap(), PlatformRoute::EUW1);
        assert_eq!(parse_route("EUN1").unwrap(), PlatformRoute::EUN1);
        assert_eq!(parse_route("na").unwrap(), PlatformRoute::NA1);
        assert_eq!(parse_route("oce").unwrap(), PlatformRoute::OC1);
        assert!(parse_route("mars").is_err());
    }

    #[test]
    fn rank_scores_are_totally_ordered() {
        let challenger = rank_score(Tier::CHALLENGER, Division::I, 900);
        let d4 = rank_score(Tier::DIAMOND, Division::IV, 50);
        let e1 = rank_score(Tier::EMERALD, Division::I, 99);
        let g2_high = rank_score(Tier::GOLD, Division::II, 80);
        let g2_low = rank_score(Tier::GOLD, Division::II, 12);
        assert!(challenger > d4);
        assert!(d4 > e1);
        assert!(g2_high > g2_low);
    }

    #[test]
    fn mastery_points_keep_three_significant_digits() {
        assert_eq!(format_mastery_points(999), "999");
        assert_eq!(format_mastery_points(1_234), "1.23K");
        assert_eq!(format_mastery_points(12_345), "12.3K");
        assert_eq!(format_mastery_points(123_456), "123K");
        assert_eq!(format_mastery_points(1_234_567), "1.23M");
        assert_eq!(format_mastery_points(7_000_000_000), "7.00B");
    }

    #[test]
    fn hms_split() {
        assert_eq!(seconds_to_hms(3_661), (1, 1, 1));
        assert_eq!(seconds_to_hms(0), (0, 0, 0));
        assert_eq!(seconds_to_hms(86_399), (23, 59, 59));
    }

    #[test]
    fn positions_sort_in_pick_order() {
        let mut v = vec!["UTILITY", "TOP", "BOTTOM", "JUNGLE", "MIDDLE"];
        v.sort_by_key(|p| position_order(p));
        assert_eq!(v, vec!["TOP", "JUNGLE", "MIDDLE", "BOTTOM", "UTILITY"]);
    }
}
