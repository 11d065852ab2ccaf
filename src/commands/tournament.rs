use serenity::{
    builder::CreateMessage,
    client::Context,
    framework::standard::{
        macros::{command, group},
        Args, CommandResult,
    },
    model::prelude::Message,
    utils::{parse_role_mention, parse_user_mention},
};

use crate::{
    discord::{get_db_handler, get_tournament_registry, update_presence},
    tournament::{
        embeds, rank,
        manager::{LiveTournament, StartOrder},
        score::parse_kind,
    },
};

#[group]
#[prefixes("t", "tournoi")]
#[commands(create, start, score, codes, classement, regles, annonce, finale, delete)]
#[description("Tournois de rolls 2v2")]
struct Tournament;

/// `1`/`2` or `a`/`b`... for the match within a round.
fn parse_match_index(s: &str) -> Option<usize> {
    let s = s.trim().to_lowercase();
    if let Ok(n) = s.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='h'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

fn parse_team_index(s: &str) -> Option<usize> {
    match s.trim() {
        "1" | "a" => Some(0),
        "2" | "b" => Some(1),
        _ => None,
    }
}

#[command]
#[only_in(guilds)]
#[min_args(1)]
#[required_permissions("ADMINISTRATOR")]
#[description("Crée les salons d'un tournoi pour les membres d'un rôle.")]
#[usage("<@rôle> [nom]")]
#[example("@Rollers Tournoi d'été")]
async fn create(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    if registry.get(guild_id).await.is_some() {
        return Err("Un tournoi existe déjà sur ce serveur. `!t delete` d'abord.".into());
    }
    let role_id = args
        .current()
        .and_then(parse_role_mention)
        .ok_or("Mentionne le rôle des participants.")?;
    args.advance();
    let name = match args.rest().trim() {
        "" => "Tournoi".to_owned(),
        rest => rest.to_owned(),
    };
    let size = msg
        .guild(&ctx.cache)
        .ok_or("Serveur introuvable dans le cache")?
        .members
        .values()
        .filter(|m| m.roles.contains(&role_id))
        .count();
    let typing = msg.channel_id.start_typing(&ctx.http);
    let lt = LiveTournament::build(ctx, guild_id, role_id, size, name).await?;
    let db = get_db_handler(ctx).await;
    lt.save(&db).await;
    registry.insert(lt).await;
    typing.stop();
    update_presence(ctx).await;
    let _ = msg.react(ctx, '🏆').await;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[required_permissions("ADMINISTRATOR")]
#[description("Lance le tournoi. Sans argument (ou `alea`) l'ordre est tiré au sort.")]
#[usage("[alea | @joueur1 @joueur2 ...]")]
async fn start(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur. `!t create` d'abord.")?;
    let order = if args.is_empty() || args.current() == Some("alea") {
        StartOrder::Shuffle
    } else {
        let mut ids = Vec::new();
        for arg in args.iter::<String>().filter_map(|a| a.ok()) {
            let id = parse_user_mention(&arg).ok_or(format!("Mention invalide : {arg}"))?;
            ids.push(id.get());
        }
        StartOrder::Explicit(ids)
    };
    let db = get_db_handler(ctx).await;
    lt.lock().await.start(ctx, &db, order).await?;
    update_presence(ctx).await;
    let _ = msg.react(ctx, '🚀').await;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[min_args(4)]
#[required_permissions("ADMINISTRATOR")]
#[description("Corrige un score à la main. Un delta négatif rouvre un match.")]
#[usage("<round> <match> <équipe 1|2> <k|t|c> [delta]")]
#[example("2 a 1 k -1")]
async fn score(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur.")?;
    let round: usize = args.single::<usize>().map_err(|_| "Round invalide")?;
    let round = round.checked_sub(1).ok_or("Les rounds commencent à 1")?;
    let m = args
        .single::<String>()
        .ok()
        .as_deref()
        .and_then(parse_match_index)
        .ok_or("Match invalide (1, 2 ou a, b)")?;
    let team = args
        .single::<String>()
        .ok()
        .as_deref()
        .and_then(parse_team_index)
        .ok_or("Équipe invalide (1 ou 2)")?;
    let kind = args
        .single::<String>()
        .ok()
        .as_deref()
        .and_then(parse_kind)
        .ok_or("Type de score invalide (k, t ou c)")?;
    let delta: i8 = args.single().unwrap_or(1);
    let db = get_db_handler(ctx).await;
    lt.lock()
        .await
        .apply_score(ctx, &db, round, m, team, kind, delta)
        .await?;
    let _ = msg.react(ctx, '✅').await;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[min_args(2)]
#[required_permissions("ADMINISTRATOR")]
#[description("Renseigne les codes de tournoi Riot d'un round.")]
#[usage("<round> <code...>")]
#[example("1 EUW04b53-aaaa EUW04b53-bbbb")]
async fn codes(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur.")?;
    let round: usize = args.single::<usize>().map_err(|_| "Round invalide")?;
    let round = round.checked_sub(1).ok_or("Les rounds commencent à 1")?;
    let codes: Vec<String> = args.iter::<String>().filter_map(|a| a.ok()).collect();
    let db = get_db_handler(ctx).await;
    let mut lt = lt.lock().await;
    lt.tournament.set_codes(round, codes)?;
    lt.update(ctx, &db).await;
    let _ = msg.react(ctx, '🎫').await;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[description("Affiche le classement ici.")]
async fn classement(ctx: &Context, msg: &Message) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur.")?;
    let embed = embeds::standings_embed(&lt.lock().await.tournament);
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[description("Les règles des tournois de rolls.")]
async fn regles(ctx: &Context, msg: &Message) -> CommandResult {
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embeds::generic_rules_embed()))
        .await?;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[min_args(1)]
#[required_permissions("ADMINISTRATOR")]
#[description("Publie une annonce dans le salon du tournoi.")]
#[usage("<titre> | <texte>")]
#[example("Pause | Reprise des matchs à 21h !")]
async fn annonce(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur.")?;
    let (title, text) = args
        .rest()
        .split_once('|')
        .ok_or("Format attendu : titre | texte")?;
    lt.lock()
        .await
        .send_notif(ctx, title.trim(), text.trim())
        .await;
    let _ = msg.react(ctx, '📣').await;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[description("Affiche la finale (une fois tous les rounds joués).")]
async fn finale(ctx: &Context, msg: &Message) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur.")?;
    let lt = lt.lock().await;
    let Some(f) = rank::finale(&lt.tournament) else {
        return Err("Le tournoi n'est pas terminé, pas encore de finale.".into());
    };
    let embed = embeds::finale_embed(&lt.tournament, &f);
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[required_permissions("ADMINISTRATOR")]
#[description("Supprime le tournoi, ses salons et son rôle. Le récap part en MP.")]
async fn delete(ctx: &Context, msg: &Message) -> CommandResult {
    let registry = get_tournament_registry(ctx).await;
    let guild_id = msg.guild_id.ok_or("Commande de serveur uniquement")?;
    let lt = registry
        .get(guild_id)
        .await
        .ok_or("Pas de tournoi sur ce serveur.")?;
    let db = get_db_handler(ctx).await;
    lt.lock().await.delete(ctx, &db, msg.author.id).await;
    registry.remove(guild_id).await;
    update_presence(ctx).await;
    let _ = msg.channel_id.say(ctx, "Tournoi supprimé. 🧹").await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_indices_accept_letters_and_numbers() {
        assert_eq!(parse_match_index("a"), Some(0));
        assert_eq!(parse_match_index("B"), Some(1));
        assert_eq!(parse_match_index("1"), Some(0));
        assert_eq!(parse_match_index("2"), Some(1));
        assert_eq!(parse_match_index("0"), None);
        assert_eq!(parse_match_index("z"), None);
        assert_eq!(parse_match_index("ab"), None);
    }

    #[test]
    fn team_indices() {
        assert_eq!(parse_team_index("1"), Some(0));
        assert_eq!(parse_team_index("b"), Some(1));
        assert_eq!(parse_team_index("3"), None);
    }
}
