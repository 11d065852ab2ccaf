use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serenity::{
    async_trait,
    client::{Client as DiscordClient, Context, EventHandler},
    framework::standard::{
        help_commands::with_embeds,
        macros::{help, hook},
        Args, CommandError, CommandGroup, CommandResult, Configuration, DispatchError,
        HelpOptions, StandardFramework,
    },
    gateway::ActivityData,
    http::Http,
    model::application::Interaction,
    model::prelude::{GatewayIntents, GuildId, Message, Ready, ResumedEvent, UserId},
    prelude::TypeMapKey,
};
use tracing::{error, info};

use crate::{
    commands::{
        general::{
            handle_beer_button, handle_dice_button, handle_poro_button, GENERAL_GROUP,
        },
        lol::LOL_GROUP,
        tournament::TOURNAMENT_GROUP,
    },
    database::{DBHandler, HeraldDBClient},
    services::{ddragon::DataDragon, riot_api::RiotClient},
    tournament::manager::TournamentRegistry,
};

pub fn herald_version() -> String {
    format!(
        "v{}{}",
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) {
            " (development)"
        } else {
            ""
        },
    )
}

pub async fn build_bot(discord_token: String, riot_token: String, db_url: String) -> DiscordClient {
    let http = Http::new(&discord_token);
    let owners = match http.get_current_application_info().await {
        Ok(info) => {
            let mut owners = HashSet::new();
            if let Some(team) = info.team {
                owners.insert(team.owner_user_id);
            } else if let Some(owner) = info.owner {
                owners.insert(owner.id);
            }
            owners
        }
        Err(why) => panic!("Could not access application info: {why:?}"),
    };

    let framework = StandardFramework::new();
    framework.configure(Configuration::new().prefix("!").owners(owners));
    let framework = framework
        .unrecognised_command(unknown_command_hook)
        .before(before_hook)
        .after(after_hook)
        .on_dispatch_error(dispatch_error_hook)
        .group(&GENERAL_GROUP)
        .group(&LOL_GROUP)
        .group(&TOURNAMENT_GROUP)
        .help(&HELP_COMMAND);
    let client = DiscordClient::builder(
        discord_token,
        GatewayIntents::non_privileged()
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_VOICE_STATES,
    )
    .event_handler(Handler)
    .framework(framework)
    .await
    .expect("Error creating Discord client");

    let dbh = DBHandler::connect(&db_url)
        .await
        .expect("Database connection failed.");
    info!("Connected to database!");

    {
        let mut data = client.data.write().await;
        data.insert::<HeraldRiot>(Arc::new(RiotClient::new(&riot_token)));
        data.insert::<HeraldDB>(Arc::new(dbh));
        data.insert::<HeraldDragon>(Arc::new(DataDragon::new()));
        data.insert::<HeraldTournaments>(Arc::new(TournamentRegistry::new()));
    }

    client
}

struct HeraldRiot;
impl TypeMapKey for HeraldRiot {
    type Value = Arc<RiotClient>;
}
pub async fn get_riot_client(ctx: &Context) -> Arc<RiotClient> {
    let data_read = ctx.data.read().await;
    data_read
        .get::<HeraldRiot>()
        .expect("Expected Riot Client in TypeMap.")
        .clone()
}

struct HeraldDB;
impl TypeMapKey for HeraldDB {
    type Value = Arc<DBHandler>;
}
pub async fn get_db_handler(ctx: &Context) -> Arc<DBHandler> {
    let data_read = ctx.data.read().await;
    data_read
        .get::<HeraldDB>()
        .expect("Expected DB Handler in TypeMap.")
        .clone()
}

struct HeraldDragon;
impl TypeMapKey for HeraldDragon {
    type Value = Arc<DataDragon>;
}
pub async fn get_ddragon(ctx: &Context) -> Arc<DataDragon> {
    let data_read = ctx.data.read().await;
    data_read
        .get::<HeraldDragon>()
        .expect("Expected Data Dragon in TypeMap.")
        .clone()
}

struct HeraldTournaments;
impl TypeMapKey for HeraldTournaments {
    type Value = Arc<TournamentRegistry>;
}
pub async fn get_tournament_registry(ctx: &Context) -> Arc<TournamentRegistry> {
    let data_read = ctx.data.read().await;
    data_read
        .get::<HeraldTournaments>()
        .expect("Expected Tournament Registry in TypeMap.")
        .clone()
}

/// Activity line: the live tournaments when there are any, a default
/// otherwise.
pub async fn update_presence(ctx: &Context) {
    let registry = get_tournament_registry(ctx).await;
    let names = registry.names().await;
    let activity = if names.is_empty() {
        ActivityData::watching(format!("la Faille | !help | {}", herald_version()))
    } else {
        ActivityData::competing(format!("{} | {}", names.join(", "), herald_version()))
    };
    ctx.set_activity(Some(activity));
}

const REACTIONS: &[char] = &['📯', '👀', '🔔', '🏆'];
struct Handler;
#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, data: Ready) {
        info!("{} is connected!", data.user.name);
        update_presence(&ctx).await;
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        info!("Loaded {} guilds.", guilds.len());
        let registry = get_tournament_registry(&ctx).await;
        let db = get_db_handler(&ctx).await;
        match db.get_active_tournaments().await {
            Ok(rows) => {
                let n = registry.restore(rows).await;
                if n > 0 {
                    info!("Restored {n} tournament(s).");
                    update_presence(&ctx).await;
                }
            }
            Err(e) => error!("Could not restore tournaments: {e}"),
        }
    }

    async fn resume(&self, _ctx: Context, _r: ResumedEvent) {
        info!("Reconnected.");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        if msg.content.to_uppercase().contains("HERALD") {
            let mut rng: StdRng = SeedableRng::from_entropy();
            let _ = msg
                .react(&ctx, REACTIONS[rng.gen_range(0..REACTIONS.len())])
                .await;
        }
        if msg.content.starts_with('!') {
            return;
        }
        // champion submissions during a draft phase
        let registry = get_tournament_registry(&ctx).await;
        let db = get_db_handler(&ctx).await;
        let dd = get_ddragon(&ctx).await;
        registry.handle_message(&ctx, &db, &dd, &msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(ci) = interaction else {
            return;
        };
        let custom_id = ci.data.custom_id.clone();
        if custom_id == "beer" {
            handle_beer_button(&ctx, &ci).await;
        } else if custom_id.starts_with("dice:") {
            handle_dice_button(&ctx, &ci).await;
        } else if custom_id == "poro" {
            handle_poro_button(&ctx, &ci).await;
        } else if custom_id.starts_with("t:") {
            let registry = get_tournament_registry(&ctx).await;
            let db = get_db_handler(&ctx).await;
            registry.handle_component(&ctx, &db, &ci).await;
        }
    }
}

#[hook]
async fn unknown_command_hook(ctx: &Context, msg: &Message, unknown_command_name: &str) {
    let _ = msg
        .channel_id
        .say(
            ctx,
            format!("Je ne connais pas '{unknown_command_name}' 🤔"),
        )
        .await;
}

#[hook]
async fn before_hook(ctx: &Context, msg: &Message, _cmd_name: &str) -> bool {
    if !cfg!(debug_assertions) {
        return true;
    }
    // dev build: only listen in test channels and DMs
    match msg.channel_id.name(ctx).await {
        Ok(n) => {
            if n.contains("test") {
                true
            } else {
                info!("[DEV] Ignoring command in {n}.");
                false
            }
        }
        Err(_) => matches!(
            msg.channel_id.to_channel(ctx).await.map(|c| c.private()),
            Ok(Some(_))
        ),
    }
}

#[hook]
async fn after_hook(ctx: &Context, msg: &Message, cmd_name: &str, error: Result<(), CommandError>) {
    if let Err(why) = error {
        error!("[{}] Error in {cmd_name}: {why:?}", Utc::now());
        let _ = msg.channel_id.say(ctx, format!("⚠️ {why}")).await;
    }
}

#[hook]
async fn dispatch_error_hook(ctx: &Context, msg: &Message, err: DispatchError, cmd_name: &str) {
    let s = match err {
        DispatchError::NotEnoughArguments { min, given } => {
            format!("Il me faut {min} arguments, je n'en ai que {given} 😋")
        }
        DispatchError::TooManyArguments { max, given } => {
            format!("Maximum {max} arguments, j'en ai reçu {given} 😋")
        }
        DispatchError::LackingPermissions(_) | DispatchError::LackingRole => {
            "Tu n'as pas le droit de faire ça 😋".to_owned()
        }
        DispatchError::OnlyForGuilds => "Ça ne se fait que sur un serveur 😋".to_owned(),
        _ => {
            error!("[{}] Unhandled dispatch error in {cmd_name}. {err:?}", Utc::now());
            "Quelque chose cloche avec cette commande... 🙃".to_owned()
        }
    };
    let _ = msg.channel_id.say(ctx, &s).await;
}

#[help]
#[embed_success_colour("#007bff")]
#[max_levenshtein_distance(2)]
async fn help_command(
    context: &Context,
    msg: &Message,
    args: Args,
    help_options: &'static HelpOptions,
    groups: &[&'static CommandGroup],
    owners: HashSet<UserId>,
) -> CommandResult {
    let _ = with_embeds(context, msg, args, help_options, groups, owners).await;
    Ok(())
}
