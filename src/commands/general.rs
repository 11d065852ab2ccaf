use rand::{rngs::StdRng, Rng, SeedableRng};
use serenity::{
    builder::{
        CreateActionRow, CreateButton, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter,
        CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, GetMessages,
    },
    client::Context,
    framework::standard::{
        macros::{command, group},
        Args, CommandResult,
    },
    model::application::ComponentInteraction,
    model::prelude::{Message, ReactionType},
    utils::parse_user_mention,
};

use crate::{
    assets,
    database::HeraldDBClient,
    discord::{get_db_handler, herald_version},
    services::translate::translate,
};

#[group]
#[commands(ping, version, beer, dice, porosnack, clear, lore, translate_reply)]
#[description("Commandes diverses")]
struct General;

#[command]
#[description("Vérifie que je suis en vie.")]
async fn ping(ctx: &Context, msg: &Message) -> CommandResult {
    let _ = tokio::join!(msg.react(ctx, '👍'), msg.channel_id.say(ctx, "Pong!"));
    Ok(())
}

#[command]
#[description("Ma version actuelle.")]
async fn version(ctx: &Context, msg: &Message) -> CommandResult {
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::new().embed(
                CreateEmbed::new()
                    .author(CreateEmbedAuthor::new("Rift Herald"))
                    .title(herald_version())
                    .colour((0, 123, 255))
                    .thumbnail(assets::LOL_ICON),
            ),
        )
        .await?;
    Ok(())
}

const MAX_BEERS: usize = 50;

fn beer_embed(beers: usize, latency: Option<f64>) -> CreateEmbed {
    let mut description = "🍺".repeat(beers);
    if beers >= MAX_BEERS {
        description.push_str("\n🤢 Ça suffit pour ce soir.");
    }
    let mut e = CreateEmbed::new()
        .title("Voilà tes bières !")
        .colour((255, 204, 0))
        .description(description);
    if let Some(latency) = latency {
        e = e.footer(CreateEmbedFooter::new(format!(
            "Après {latency:.2} secondes d'attente seulement !"
        )));
    }
    e
}

fn beer_button() -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new("beer").emoji('🍺').label("Encore une !"),
    ])]
}

#[command]
#[description("Sers une tournée de bières.")]
async fn beer(ctx: &Context, msg: &Message) -> CommandResult {
    let latency =
        (chrono::Utc::now().timestamp_millis() - msg.timestamp.timestamp_millis()) as f64 / 1000.0;
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::new()
                .embed(beer_embed(1, Some(latency)))
                .components(beer_button()),
        )
        .await?;
    Ok(())
}

pub async fn handle_beer_button(ctx: &Context, ci: &ComponentInteraction) {
    let beers = ci
        .message
        .embeds
        .first()
        .and_then(|e| e.description.as_deref())
        .map(|d| d.matches('🍺').count())
        .unwrap_or(0);
    let response = if beers >= MAX_BEERS {
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("Le bar est fermé ! 🍻")
                .ephemeral(true),
        )
    } else {
        CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .embed(beer_embed(beers + 1, None))
                .components(beer_button()),
        )
    };
    let _ = ci.create_response(&ctx.http, response).await;
}

const MAX_FACES: u64 = 120;
const MAX_DICE: u64 = 10;

fn roll_dice<R: Rng>(rng: &mut R, faces: u64, count: u64) -> Vec<u64> {
    (0..count).map(|_| rng.gen_range(1..=faces)).collect()
}

/// `dice:roll:{faces}:{count}:{rolls}:{total}` carries the running state, so
/// the buttons survive a bot restart.
fn dice_custom_id(faces: u64, count: u64, rolls: u64, total: u64) -> String {
    format!("dice:roll:{faces}:{count}:{rolls}:{total}")
}

pub fn parse_dice_custom_id(id: &str) -> Option<(u64, u64, u64, u64)> {
    let mut it = id.strip_prefix("dice:roll:")?.splitn(4, ':');
    let faces = it.next()?.parse().ok()?;
    let count = it.next()?.parse().ok()?;
    let rolls = it.next()?.parse().ok()?;
    let total = it.next()?.parse().ok()?;
    Some((faces, count, rolls, total))
}

fn dice_embed(faces: u64, count: u64, last: &[u64], rolls: u64, total: u64) -> CreateEmbed {
    let width = faces.to_string().len();
    let results = last
        .iter()
        .map(|&r| assets::number_to_emotes(r, width))
        .collect::<Vec<_>>()
        .join(" ");
    let last_total: u64 = last.iter().sum();
    let mut e = CreateEmbed::new()
        .title(format!("🎲 Lancé de {count} dé(s) à {faces} face(s)"))
        .colour((155, 89, 182))
        .field("Résultats du dernier lancé :", results, false)
        .field(
            "Total du dernier lancé :",
            assets::number_to_emotes(last_total, 1),
            false,
        );
    if rolls > 1 {
        e = e.field(
            format!("Total des {rolls} lancés :"),
            assets::number_to_emotes(total, 1),
            false,
        );
    }
    e
}

fn dice_components(faces: u64, count: u64, rolls: u64, total: u64) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(dice_custom_id(faces, count, rolls, total))
            .emoji('🎲')
            .label("Relancer"),
        CreateButton::new("dice:stop").emoji('🛑').label("Stop"),
    ])]
}

#[command]
#[aliases(roll)]
#[description("Lance des dés.")]
#[usage("[faces] [nombre]")]
#[example("20 3")]
async fn dice(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let faces: u64 = args.single().unwrap_or(6);
    let count: u64 = args.single().unwrap_or(1);
    if !(2..=MAX_FACES).contains(&faces) || !(1..=MAX_DICE).contains(&count) {
        msg.channel_id
            .say(
                ctx,
                format!("Il me faut entre 2 et {MAX_FACES} faces, et entre 1 et {MAX_DICE} dés."),
            )
            .await?;
        return Ok(());
    }
    let mut rng: StdRng = SeedableRng::from_entropy();
    let results = roll_dice(&mut rng, faces, count);
    let total: u64 = results.iter().sum();
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::new()
                .embed(dice_embed(faces, count, &results, 1, total))
                .components(dice_components(faces, count, 1, total)),
        )
        .await?;
    Ok(())
}

pub async fn handle_dice_button(ctx: &Context, ci: &ComponentInteraction) {
    if ci.data.custom_id == "dice:stop" {
        let _ = ci
            .create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new().components(Vec::new()),
                ),
            )
            .await;
        return;
    }
    let Some((faces, count, rolls, total)) = parse_dice_custom_id(&ci.data.custom_id) else {
        return;
    };
    let mut rng: StdRng = SeedableRng::from_entropy();
    let results = roll_dice(&mut rng, faces, count);
    let rolls = rolls + 1;
    let total = total + results.iter().sum::<u64>();
    let _ = ci
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(dice_embed(faces, count, &results, rolls, total))
                    .components(dice_components(faces, count, rolls, total)),
            ),
        )
        .await;
}

const PORO_FULL: usize = 10;

fn poro_embed(feedings: usize) -> CreateEmbed {
    let e = CreateEmbed::new().colour((137, 207, 240));
    if feedings >= PORO_FULL {
        e.title("💥 BOOM !")
            .image(assets::PORO_POP)
            .footer(CreateEmbedFooter::new("Tout est à refaire..."))
    } else {
        e.title("Nourris le poro !")
            .image(assets::PORO_GROWINGS[feedings])
            .footer(CreateEmbedFooter::new(format!("{feedings}/{PORO_FULL}")))
    }
}

fn poro_button() -> Vec<CreateActionRow> {
    let emoji = ReactionType::try_from(assets::POROSNACK_EMOTE).unwrap_or_else(|_| '🍪'.into());
    vec![CreateActionRow::Buttons(vec![CreateButton::new("poro")
        .emoji(emoji)
        .label("Miam")])]
}

#[command]
#[description("Nourris un poro jusqu'à ce qu'il explose.")]
async fn porosnack(ctx: &Context, msg: &Message) -> CommandResult {
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::new()
                .embed(poro_embed(0))
                .components(poro_button()),
        )
        .await?;
    Ok(())
}

fn parse_poro_footer(footer: &str) -> usize {
    footer
        .split_once('/')
        .and_then(|(n, _)| n.parse().ok())
        .unwrap_or(0)
}

pub async fn handle_poro_button(ctx: &Context, ci: &ComponentInteraction) {
    let feedings = ci
        .message
        .embeds
        .first()
        .and_then(|e| e.footer.as_ref())
        .map(|f| parse_poro_footer(&f.text))
        .unwrap_or(0)
        + 1;
    let components = if feedings >= PORO_FULL {
        Vec::new()
    } else {
        poro_button()
    };
    let _ = ci
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(poro_embed(feedings))
                    .components(components),
            ),
        )
        .await;
}

#[command]
#[only_in(guilds)]
#[num_args(1)]
#[required_permissions("ADMINISTRATOR")]
#[description("Supprime les derniers messages du salon.")]
#[usage("<1-100>")]
async fn clear(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let n: u8 = args.single().map_err(|_| "Nombre invalide")?;
    if !(1..=100).contains(&n) {
        return Err("Il me faut un nombre entre 1 et 100.".into());
    }
    let messages = msg
        .channel_id
        .messages(&ctx.http, GetMessages::new().before(msg.id).limit(n))
        .await?;
    msg.channel_id.delete_messages(&ctx.http, &messages).await?;
    let _ = msg.delete(ctx).await;
    let confirmation = msg
        .channel_id
        .say(ctx, format!(":broom: {n} messages supprimés ! :broom:"))
        .await?;
    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    let _ = confirmation.delete(ctx).await;
    Ok(())
}

#[command]
#[sub_commands(set)]
#[description("Raconte la légende d'un membre du serveur.")]
#[usage("[@membre]")]
async fn lore(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let db = get_db_handler(ctx).await;
    let target = args
        .current()
        .and_then(parse_user_mention)
        .unwrap_or(msg.author.id);
    let name = target.to_user(ctx).await.map(|u| u.name).unwrap_or_default();
    let embed = match db.get_lore(target.get()).await? {
        Some(text) => CreateEmbed::new()
            .title(format!("📖 La légende de {name}"))
            .colour((241, 196, 15))
            .description(text),
        None => CreateEmbed::new()
            .description(format!(
                "*{name}* n'a pas encore de lore...\nDemande à un admin de l'écrire !"
            ))
            .thumbnail(assets::PORO_SWEAT),
    };
    msg.channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

#[command]
#[min_args(2)]
#[required_permissions("ADMINISTRATOR")]
#[description("Écris la légende d'un membre.")]
#[usage("<@membre> <texte>")]
async fn set(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let target = args
        .current()
        .and_then(parse_user_mention)
        .ok_or("Mentionne le membre dont tu écris la légende.")?;
    args.advance();
    let db = get_db_handler(ctx).await;
    db.set_lore(target.get(), args.rest().to_owned()).await?;
    let _ = msg.react(ctx, '📖').await;
    Ok(())
}

#[command("translate")]
#[aliases(tr)]
#[description("Traduis le message auquel tu réponds.")]
#[usage("[langue cible]")]
#[example("fr")]
async fn translate_reply(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let Some(source) = msg.referenced_message.as_deref() else {
        msg.channel_id
            .say(ctx, "Réponds au message à traduire avec cette commande.")
            .await?;
        return Ok(());
    };
    let target = args.current().unwrap_or("en");
    let typing = msg.channel_id.start_typing(&ctx.http);
    if !source.content.is_empty() {
        let translated = translate(&source.content, target).await?;
        msg.channel_id.say(ctx, translated).await?;
    }
    for embed in &source.embeds {
        let mut e = CreateEmbed::new().colour((52, 152, 219));
        if let Some(title) = &embed.title {
            e = e.title(translate(title, target).await?);
        }
        if let Some(description) = &embed.description {
            e = e.description(translate(description, target).await?);
        }
        if let Some(author) = &embed.author {
            e = e.author(CreateEmbedAuthor::new(&author.name));
        }
        if let Some(footer) = &embed.footer {
            e = e.footer(CreateEmbedFooter::new(translate(&footer.text, target).await?));
        }
        for field in &embed.fields {
            e = e.field(
                translate(&field.name, target).await?,
                translate(&field.value, target).await?,
                field.inline,
            );
        }
        msg.channel_id
            .send_message(ctx, CreateMessage::new().embed(e))
            .await?;
    }
    typing.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn dice_custom_ids_round_trip() {
        assert_eq!(
            parse_dice_custom_id(&dice_custom_id(20, 3, 2, 47)),
            Some((20, 3, 2, 47))
        );
        assert_eq!(parse_dice_custom_id("dice:stop"), None);
        assert_eq!(parse_dice_custom_id("dice:roll:6:1"), None);
        assert_eq!(parse_dice_custom_id("beer"), None);
    }

    #[test]
    fn dice_rolls_stay_in_range() {
        let mut rng = StepRng::new(0, 0x9E3779B97F4A7C15);
        for _ in 0..100 {
            for r in roll_dice(&mut rng, 6, 5) {
                assert!((1..=6).contains(&r));
            }
        }
    }

    #[test]
    fn poro_footer_parsing() {
        assert_eq!(parse_poro_footer("3/10"), 3);
        assert_eq!(parse_poro_footer("0/10"), 0);
        assert_eq!(parse_poro_footer("Tout est à refaire..."), 0);
    }
}
