//! Live Discord side of a tournament: category, channels, role, messages,
//! score buttons, draft boards, and the registry shared through the TypeMap.
//!
//! Every mutation ends with [`LiveTournament::save`], which serializes the
//! whole state into Postgres so a restart can pick the tournament back up in
//! `cache_ready`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serenity::{
    builder::{
        CreateActionRow, CreateButton, CreateChannel, CreateEmbed, CreateInteractionResponse,
        CreateInteractionResponseMessage, CreateMessage, EditMessage, EditRole,
    },
    client::Context,
    model::application::ComponentInteraction,
    model::prelude::{
        ChannelId, ChannelType, GuildId, Message, PermissionOverwrite, PermissionOverwriteType,
        Permissions, ReactionType, RoleId, UserId,
    },
};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::assets;
use crate::database::{DBHandler, HeraldDBClient};
use crate::model::TournamentRow;
use crate::services::ddragon::DataDragon;

use super::draft::{Draft, DraftProgress};
use super::embeds;
use super::rank;
use super::score::SCORE_KINDS;
use super::seeding;
use super::{Player, Tournament, TournamentError};

/// Channel and message ids a tournament owns, as raw u64 so the whole set
/// serializes cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelSet {
    pub category: u64,
    pub notif: u64,
    pub classement: u64,
    pub rounds: u64,
    pub rules: u64,
    pub admin: u64,
    pub voice_general: u64,
    /// One pair of team voice channels per parallel match.
    pub voice_teams: Vec<[u64; 2]>,
    pub classement_msg: u64,
    pub rules_msg: u64,
    /// One bracket message per round, posted at start.
    pub rounds_msgs: Vec<u64>,
    /// Admin interface: the embeds message first, then one button message
    /// per started round.
    pub admin_msgs: Vec<u64>,
}

/// A pick/ban board armed for one match of the current round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftBoard {
    pub round: usize,
    pub m: usize,
    pub draft: Draft,
    /// `(voice channel, board message)` per team.
    pub messages: [(u64, u64); 2],
}

#[derive(Serialize, Deserialize)]
pub struct LiveTournament {
    pub guild_id: u64,
    pub tournament: Tournament,
    pub participant_role_id: u64,
    pub size: usize,
    pub started: bool,
    pub role_id: Option<u64>,
    pub channels: ChannelSet,
    pub drafts: Vec<DraftBoard>,
}

pub enum StartOrder {
    /// Uniform shuffle of the seats.
    Shuffle,
    /// Explicit seat order, one user id per seed.
    Explicit(Vec<u64>),
}

fn everyone(guild_id: GuildId) -> RoleId {
    // The @everyone role id equals the guild id.
    RoleId::new(guild_id.get())
}

fn locked_overwrite(guild_id: GuildId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::CONNECT,
        kind: PermissionOverwriteType::Role(everyone(guild_id)),
    }
}

fn open_overwrite(guild_id: GuildId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::CONNECT,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Role(everyone(guild_id)),
    }
}

fn hidden_overwrite(guild_id: GuildId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL,
        kind: PermissionOverwriteType::Role(everyone(guild_id)),
    }
}

/// `t:{round}:{match}:{team}:{kind}` — the admin score buttons.
pub fn score_custom_id(round: usize, m: usize, team: usize, kind: usize) -> String {
    format!("t:{round}:{m}:{team}:{kind}")
}

pub fn parse_score_custom_id(id: &str) -> Option<(usize, usize, usize, usize)> {
    let mut it = id.strip_prefix("t:")?.splitn(4, ':');
    let round = it.next()?.parse().ok()?;
    let m = it.next()?.parse().ok()?;
    let team = it.next()?.parse().ok()?;
    let kind = it.next()?.parse().ok()?;
    Some((round, m, team, kind))
}

/// Discord refuses button labels over 80 characters.
fn clip_label(label: String) -> String {
    const MAX: usize = 80;
    if label.chars().count() <= MAX {
        return label;
    }
    let mut clipped: String = label.chars().take(MAX - 1).collect();
    clipped.push('…');
    clipped
}

/// One button row per team per match: ⚔️ 🗼 🌾, +1 each. Corrections go
/// through `!t score` with a negative delta.
fn score_rows(t: &Tournament, round: usize) -> Vec<CreateActionRow> {
    let Ok(r) = t.round(round) else {
        return Vec::new();
    };
    let multi = r.matches.len() > 1;
    let mut rows = Vec::new();
    for (m, tm) in r.matches.iter().enumerate() {
        for (team, side) in tm.teams.iter().enumerate() {
            let label = clip_label(if multi {
                format!("Match {} · {}", assets::match_letter(m), t.team_names(side))
            } else {
                t.team_names(side)
            });
            let buttons = SCORE_KINDS
                .iter()
                .enumerate()
                .map(|(kind, k)| {
                    CreateButton::new(score_custom_id(round, m, team, kind))
                        .emoji(ReactionType::Unicode(k.emoji.to_owned()))
                        .label(label.clone())
                })
                .collect();
            rows.push(CreateActionRow::Buttons(buttons));
        }
    }
    rows
}

impl LiveTournament {
    /// Creates the whole channel tree, locked while it is assembled, then
    /// opens it up (the admin channel stays hidden).
    pub async fn build(
        ctx: &Context,
        guild_id: GuildId,
        participant_role_id: RoleId,
        size: usize,
        name: String,
    ) -> Result<Self, String> {
        if !seeding::SIZES.contains(&size) {
            return Err(TournamentError::UnsupportedSize(size).to_string());
        }
        let nb_matches = seeding::matches_per_round(size).map_err(|e| e.to_string())?;
        let err = |e: serenity::Error| format!("Création des salons impossible : {e}");

        let category = guild_id
            .create_channel(
                &ctx.http,
                CreateChannel::new(name.to_uppercase()).kind(ChannelType::Category),
            )
            .await
            .map_err(err)?;
        category
            .id
            .create_permission(&ctx.http, locked_overwrite(guild_id))
            .await
            .map_err(err)?;

        let text = |n: &str| CreateChannel::new(n).category(category.id);
        let notif = guild_id.create_channel(&ctx.http, text("🔔 Annonces")).await.map_err(err)?;
        let classement = guild_id
            .create_channel(&ctx.http, text("🏅 Classement"))
            .await
            .map_err(err)?;
        let rounds = guild_id.create_channel(&ctx.http, text("📅 Rounds")).await.map_err(err)?;
        let rules = guild_id.create_channel(&ctx.http, text("📜 Règles")).await.map_err(err)?;
        let admin = guild_id.create_channel(&ctx.http, text("🔧 Admin")).await.map_err(err)?;
        admin
            .id
            .create_permission(&ctx.http, hidden_overwrite(guild_id))
            .await
            .map_err(err)?;
        let voice_general = guild_id
            .create_channel(
                &ctx.http,
                CreateChannel::new("🏆 General")
                    .kind(ChannelType::Voice)
                    .category(category.id),
            )
            .await
            .map_err(err)?;
        let mut voice_teams = Vec::new();
        for m in 0..nb_matches {
            let mut pair = [0u64; 2];
            for (team, slot) in pair.iter_mut().enumerate() {
                let vc_name = if nb_matches == 1 {
                    format!("Équipe {}", team + 1)
                } else {
                    format!("Match {} Équipe {}", (b'A' + m as u8) as char, team + 1)
                };
                let vc = guild_id
                    .create_channel(
                        &ctx.http,
                        CreateChannel::new(vc_name)
                            .kind(ChannelType::Voice)
                            .category(category.id),
                    )
                    .await
                    .map_err(err)?;
                *slot = vc.id.get();
            }
            voice_teams.push(pair);
        }

        let tournament = Tournament::new(name);
        let classement_msg = classement
            .id
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(embeds::standings_embed(&tournament)),
            )
            .await
            .map_err(err)?;
        let _ = rounds
            .id
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(embeds::rounds_header_embed()),
            )
            .await;
        let rules_msg = rules
            .id
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(embeds::generic_rules_embed()),
            )
            .await
            .map_err(err)?;
        let admin_msg = admin
            .id
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(
                    CreateEmbed::new()
                        .thumbnail(assets::HOURGLASS_IMAGE)
                        .description(
                            "Utilisez **!t start** pour sélectionner les joueurs et démarrer le tournoi.",
                        ),
                ),
            )
            .await
            .map_err(err)?;

        // open up now that everything is in place
        category
            .id
            .create_permission(&ctx.http, open_overwrite(guild_id))
            .await
            .map_err(err)?;

        info!("tournament '{}' built in guild {guild_id}", tournament.name);
        Ok(Self {
            guild_id: guild_id.get(),
            tournament,
            participant_role_id: participant_role_id.get(),
            size,
            started: false,
            role_id: None,
            channels: ChannelSet {
                category: category.id.get(),
                notif: notif.id.get(),
                classement: classement.id.get(),
                rounds: rounds.id.get(),
                rules: rules.id.get(),
                admin: admin.id.get(),
                voice_general: voice_general.id.get(),
                voice_teams,
                classement_msg: classement_msg.id.get(),
                rules_msg: rules_msg.id.get(),
                rounds_msgs: Vec::new(),
                admin_msgs: vec![admin_msg.id.get()],
            },
            drafts: Vec::new(),
        })
    }

    /// Snapshots the participant role, generates the rounds and posts the
    /// whole live interface.
    pub async fn start(
        &mut self,
        ctx: &Context,
        db: &DBHandler,
        order: StartOrder,
    ) -> Result<(), String> {
        if self.started {
            return Err("Le tournoi est déjà lancé.".to_owned());
        }
        let guild_id = GuildId::new(self.guild_id);
        let role_id = RoleId::new(self.participant_role_id);
        let members = guild_id
            .members(&ctx.http, None, None)
            .await
            .map_err(|e| format!("Lecture des membres impossible : {e}"))?;
        let participants: Vec<_> = members
            .into_iter()
            .filter(|m| m.roles.contains(&role_id))
            .collect();
        if participants.len() != self.size {
            return Err(format!(
                "Le rôle contient {} joueurs, le tournoi en attend {}.",
                participants.len(),
                self.size
            ));
        }
        let players: Vec<Player> = participants
            .iter()
            .map(|m| Player {
                user_id: m.user.id.get(),
                name: m.display_name().to_owned(),
            })
            .collect();
        let order = match order {
            StartOrder::Shuffle => {
                use rand::{rngs::StdRng, SeedableRng};
                let mut rng: StdRng = SeedableRng::from_entropy();
                seeding::shuffled_order(players.len(), &mut rng)
            }
            StartOrder::Explicit(ids) => {
                let mut order = Vec::with_capacity(ids.len());
                for id in &ids {
                    let idx = players
                        .iter()
                        .position(|p| p.user_id == *id)
                        .ok_or_else(|| format!("<@{id}> n'a pas le rôle des participants."))?;
                    if order.contains(&idx) {
                        return Err(format!("<@{id}> est mentionné deux fois."));
                    }
                    order.push(idx);
                }
                order
            }
        };
        self.tournament.set_players(players).map_err(|e| e.to_string())?;
        self.tournament
            .generate_rounds(&order)
            .map_err(|e| e.to_string())?;

        // dedicated role, so match channels can be restricted to players
        let role = guild_id
            .create_role(&ctx.http, EditRole::new().name(&self.tournament.name))
            .await
            .map_err(|e| format!("Création du rôle impossible : {e}"))?;
        self.role_id = Some(role.id.get());
        for p in &self.tournament.players {
            let _ = ctx
                .http
                .add_member_role(guild_id, UserId::new(p.user_id), role.id, Some("tournoi"))
                .await;
        }
        let player_overwrite = PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::CONNECT,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(role.id),
        };
        for pair in &self.channels.voice_teams {
            for &vc in pair {
                let _ = ChannelId::new(vc)
                    .create_permission(&ctx.http, player_overwrite.clone())
                    .await;
            }
        }

        // bracket messages, one per round
        let rounds_channel = ChannelId::new(self.channels.rounds);
        for round in 0..self.tournament.nb_rounds() {
            let msg = rounds_channel
                .send_message(
                    &ctx.http,
                    CreateMessage::new().embed(embeds::round_embed(&self.tournament, round)),
                )
                .await
                .map_err(|e| format!("Envoi des rounds impossible : {e}"))?;
            self.channels.rounds_msgs.push(msg.id.get());
        }

        // sized rules replace the generic ones
        let nb_matches = self.channels.voice_teams.len();
        let _ = ChannelId::new(self.channels.rules)
            .edit_message(
                &ctx.http,
                self.channels.rules_msg,
                EditMessage::new()
                    .embed(embeds::rules_embed(self.tournament.nb_rounds(), nb_matches)),
            )
            .await;

        // admin interface: embeds in the placeholder, then the round buttons
        let admin_channel = ChannelId::new(self.channels.admin);
        let _ = admin_channel
            .edit_message(
                &ctx.http,
                self.channels.admin_msgs[0],
                EditMessage::new().embeds(embeds::admin_embeds(&self.tournament)),
            )
            .await;
        self.post_score_buttons(ctx, 0).await;
        self.arm_drafts(ctx, 0).await;

        self.started = true;
        self.send_notif(
            ctx,
            "🚀 C'est parti !",
            "Le tournoi est lancé. Direction le salon 📅 Rounds pour vos matchs !",
        )
        .await;
        self.update(ctx, db).await;
        Ok(())
    }

    async fn post_score_buttons(&mut self, ctx: &Context, round: usize) {
        let rows = score_rows(&self.tournament, round);
        if rows.is_empty() {
            return;
        }
        match ChannelId::new(self.channels.admin)
            .send_message(
                &ctx.http,
                CreateMessage::new()
                    .content(format!("**Scores du round {}**", round + 1))
                    .components(rows),
            )
            .await
        {
            Ok(msg) => self.channels.admin_msgs.push(msg.id.get()),
            Err(e) => warn!("failed to post score buttons: {e}"),
        }
    }

    /// Posts one draft board per match of `round` in both team voice chats.
    async fn arm_drafts(&mut self, ctx: &Context, round: usize) {
        self.drafts.clear();
        let Ok(r) = self.tournament.round(round) else {
            return;
        };
        let nb_matches = r.matches.len();
        for m in 0..nb_matches {
            let draft = Draft::new();
            let embed =
                embeds::draft_embed(&self.tournament, round, m, &draft, self.tournament.code(round, m));
            let mut messages = [(0u64, 0u64); 2];
            for (team, slot) in messages.iter_mut().enumerate() {
                let vc = ChannelId::new(self.channels.voice_teams[m][team]);
                match vc
                    .send_message(&ctx.http, CreateMessage::new().embed(embed.clone()))
                    .await
                {
                    Ok(msg) => *slot = (vc.get(), msg.id.get()),
                    Err(e) => warn!("failed to post draft board: {e}"),
                }
            }
            self.drafts.push(DraftBoard {
                round,
                m,
                draft,
                messages,
            });
        }
    }

    async fn refresh_draft_board(&self, ctx: &Context, board: &DraftBoard) {
        let embed = embeds::draft_embed(
            &self.tournament,
            board.round,
            board.m,
            &board.draft,
            self.tournament.code(board.round, board.m),
        );
        for (vc, msg) in board.messages {
            let _ = ChannelId::new(vc)
                .edit_message(&ctx.http, msg, EditMessage::new().embed(embed.clone()))
                .await;
        }
    }

    /// Re-renders every live message, then snapshots the state to Postgres.
    pub async fn update(&self, ctx: &Context, db: &DBHandler) {
        let _ = ChannelId::new(self.channels.classement)
            .edit_message(
                &ctx.http,
                self.channels.classement_msg,
                EditMessage::new().embed(embeds::standings_embed(&self.tournament)),
            )
            .await;
        let rounds_channel = ChannelId::new(self.channels.rounds);
        for (round, &msg) in self.channels.rounds_msgs.iter().enumerate() {
            let _ = rounds_channel
                .edit_message(
                    &ctx.http,
                    msg,
                    EditMessage::new().embed(embeds::round_embed(&self.tournament, round)),
                )
                .await;
        }
        if self.started {
            let _ = ChannelId::new(self.channels.admin)
                .edit_message(
                    &ctx.http,
                    self.channels.admin_msgs[0],
                    EditMessage::new().embeds(embeds::admin_embeds(&self.tournament)),
                )
                .await;
        }
        self.save(db).await;
    }

    pub async fn save(&self, db: &DBHandler) {
        match serde_json::to_string(self) {
            Ok(state) => {
                if let Err(e) = db
                    .save_tournament(self.guild_id, &self.tournament.name, state)
                    .await
                {
                    warn!("failed to persist tournament: {e}");
                }
            }
            Err(e) => warn!("failed to serialize tournament: {e}"),
        }
    }

    pub async fn send_notif(&self, ctx: &Context, title: &str, description: &str) {
        let _ = ChannelId::new(self.channels.notif)
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(embeds::notif_embed(
                    &self.tournament.name,
                    title,
                    description,
                )),
            )
            .await;
    }

    /// Applies a score change and drives everything that hangs off it:
    /// winner announcement, next round drafts and buttons, finale.
    pub async fn apply_score(
        &mut self,
        ctx: &Context,
        db: &DBHandler,
        round: usize,
        m: usize,
        team: usize,
        kind: usize,
        delta: i8,
    ) -> Result<(), String> {
        if !self.started {
            return Err("Le tournoi n'est pas encore lancé.".to_owned());
        }
        let up = self
            .tournament
            .set_score(round, m, team, kind, delta)
            .map_err(|e| e.to_string())?;
        if up.match_over {
            let tm = self.tournament.team_match(round, m).map_err(|e| e.to_string())?;
            let winner = tm.winner.unwrap_or(team);
            let names = self.tournament.team_names(&tm.teams[winner]);
            self.send_notif(
                ctx,
                "⚔️ Match terminé",
                &format!(
                    "**Round {}** : victoire de *{names}* ({}) !",
                    round + 1,
                    tm.score_line()
                ),
            )
            .await;
        }
        if up.tournament_over {
            if let Some(f) = rank::finale(&self.tournament) {
                let _ = ChannelId::new(self.channels.notif)
                    .send_message(
                        &ctx.http,
                        CreateMessage::new().embed(embeds::finale_embed(&self.tournament, &f)),
                    )
                    .await;
            }
        } else if up.round_over {
            if let Some(next) = self.tournament.current_round() {
                self.send_notif(
                    ctx,
                    &format!("📅 Round {}", next + 1),
                    "Le round suivant est ouvert, les drafts sont lancées dans vos salons d'équipe.",
                )
                .await;
                self.post_score_buttons(ctx, next).await;
                self.arm_drafts(ctx, next).await;
            }
        }
        self.update(ctx, db).await;
        Ok(())
    }

    /// A chat message in a team voice channel while a draft is running is a
    /// champion submission for that side.
    pub async fn handle_draft_message(
        &mut self,
        ctx: &Context,
        db: &DBHandler,
        dd: &DataDragon,
        msg: &Message,
    ) {
        let channel = msg.channel_id.get();
        let Some(idx) = self.drafts.iter().position(|b| {
            !b.draft.is_finished() && b.messages.iter().any(|(vc, _)| *vc == channel)
        }) else {
            return;
        };
        let board = &self.drafts[idx];
        let team = usize::from(board.messages[1].0 == channel);
        // only the two players of that side may draft
        let on_team = self
            .tournament
            .team_match(board.round, board.m)
            .map(|tm| {
                tm.teams[team]
                    .players
                    .iter()
                    .any(|&p| self.tournament.players[p].user_id == msg.author.id.get())
            })
            .unwrap_or(false);
        if !on_team {
            return;
        }
        let champion = match dd.find_champion(&msg.content).await {
            Ok(Some(c)) => c.name,
            Ok(None) => {
                let _ = msg.react(ctx, '❓').await;
                return;
            }
            Err(e) => {
                warn!("champion lookup failed: {e}");
                return;
            }
        };
        let board = &mut self.drafts[idx];
        match board.draft.submit(team, champion) {
            Ok(progress) => {
                // keep the phase blind
                let _ = msg.delete(ctx).await;
                let board = self.drafts[idx].clone();
                self.refresh_draft_board(ctx, &board).await;
                if progress == DraftProgress::Finished {
                    info!(
                        "draft finished for round {} match {}",
                        board.round + 1,
                        board.m + 1
                    );
                }
                self.save(db).await;
            }
            Err(e) => {
                let _ = msg.reply(ctx, e.to_string()).await;
            }
        }
    }

    /// Tears the whole thing down, after sending the admin recap by DM.
    pub async fn delete(&self, ctx: &Context, db: &DBHandler, recipient: UserId) {
        if self.started {
            if let Ok(dm) = recipient.create_dm_channel(&ctx).await {
                let _ = dm
                    .id
                    .send_message(
                        &ctx.http,
                        CreateMessage::new().embeds(embeds::admin_embeds(&self.tournament)),
                    )
                    .await;
            }
        }
        let c = &self.channels;
        let mut ids = vec![c.notif, c.classement, c.rounds, c.rules, c.admin, c.voice_general];
        ids.extend(c.voice_teams.iter().flatten().copied());
        ids.push(c.category);
        for id in ids {
            let _ = ChannelId::new(id).delete(&ctx.http).await;
        }
        if let Some(role) = self.role_id {
            let _ = GuildId::new(self.guild_id)
                .delete_role(&ctx.http, RoleId::new(role))
                .await;
        }
        if let Err(e) = db
            .set_tournament_inactive(self.guild_id, &self.tournament.name)
            .await
        {
            warn!("failed to archive tournament: {e}");
        }
        info!("tournament '{}' deleted", self.tournament.name);
    }
}

/// Live tournaments by guild, shared through the client TypeMap.
#[derive(Default)]
pub struct TournamentRegistry {
    inner: RwLock<HashMap<u64, Arc<Mutex<LiveTournament>>>>,
}

impl TournamentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, guild_id: GuildId) -> Option<Arc<Mutex<LiveTournament>>> {
        self.inner.read().await.get(&guild_id.get()).cloned()
    }

    pub async fn insert(&self, lt: LiveTournament) -> Arc<Mutex<LiveTournament>> {
        let guild = lt.guild_id;
        let arc = Arc::new(Mutex::new(lt));
        self.inner.write().await.insert(guild, arc.clone());
        arc
    }

    pub async fn remove(&self, guild_id: GuildId) {
        self.inner.write().await.remove(&guild_id.get());
    }

    pub async fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for lt in self.inner.read().await.values() {
            names.push(lt.lock().await.tournament.name.clone());
        }
        names
    }

    /// Reloads the persisted tournaments at `cache_ready`.
    pub async fn restore(&self, rows: Vec<TournamentRow>) -> usize {
        let mut n = 0;
        for row in rows {
            match serde_json::from_str::<LiveTournament>(&row.state) {
                Ok(lt) => {
                    if lt.guild_id != row.guild_id as u64 {
                        warn!(
                            "tournament '{}' stored under guild {} but its state says {}, skipping",
                            row.name, row.guild_id, lt.guild_id
                        );
                        continue;
                    }
                    self.insert(lt).await;
                    n += 1;
                }
                Err(e) => warn!("could not restore tournament '{}': {e}", row.name),
            }
        }
        n
    }

    /// Routes an admin score button press.
    pub async fn handle_component(
        &self,
        ctx: &Context,
        db: &DBHandler,
        ci: &ComponentInteraction,
    ) {
        let Some((round, m, team, kind)) = parse_score_custom_id(&ci.data.custom_id) else {
            return;
        };
        let Some(guild_id) = ci.guild_id else {
            return;
        };
        let Some(lt) = self.get(guild_id).await else {
            return;
        };
        let result = lt
            .lock()
            .await
            .apply_score(ctx, db, round, m, team, kind, 1)
            .await;
        let response = match result {
            Ok(()) => CreateInteractionResponse::Acknowledge,
            Err(e) => CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(e)
                    .ephemeral(true),
            ),
        };
        let _ = ci.create_response(&ctx.http, response).await;
    }

    /// Routes a possible draft submission.
    pub async fn handle_message(
        &self,
        ctx: &Context,
        db: &DBHandler,
        dd: &DataDragon,
        msg: &Message,
    ) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        let Some(lt) = self.get(guild_id).await else {
            return;
        };
        lt.lock().await.handle_draft_message(ctx, db, dd, msg).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_custom_ids_round_trip() {
        assert_eq!(parse_score_custom_id("t:0:1:0:2"), Some((0, 1, 0, 2)));
        assert_eq!(
            parse_score_custom_id(&score_custom_id(6, 1, 1, 0)),
            Some((6, 1, 1, 0))
        );
        assert_eq!(parse_score_custom_id("beer"), None);
        assert_eq!(parse_score_custom_id("t:0:1"), None);
        assert_eq!(parse_score_custom_id("t:a:b:c:d"), None);
    }

    #[test]
    fn button_labels_stay_under_the_discord_limit() {
        assert_eq!(clip_label("Alice & Bob".to_owned()), "Alice & Bob");
        let clipped = clip_label("noms".repeat(50));
        assert_eq!(clipped.chars().count(), 80);
        assert!(clipped.ends_with('…'));
    }

    fn live(guild_id: u64) -> LiveTournament {
        LiveTournament {
            guild_id,
            tournament: Tournament::new("Tournoi".to_owned()),
            participant_role_id: 42,
            size: 4,
            started: false,
            role_id: None,
            channels: ChannelSet::default(),
            drafts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn restore_skips_rows_stored_under_the_wrong_guild() {
        let registry = TournamentRegistry::new();
        let rows = vec![
            TournamentRow {
                guild_id: 10,
                name: "Tournoi".to_owned(),
                state: serde_json::to_string(&live(10)).unwrap(),
            },
            TournamentRow {
                guild_id: 11,
                name: "Tournoi".to_owned(),
                state: serde_json::to_string(&live(99)).unwrap(),
            },
        ];
        assert_eq!(registry.restore(rows).await, 1);
        assert!(registry.get(GuildId::new(10)).await.is_some());
        assert!(registry.get(GuildId::new(11)).await.is_none());
        assert!(registry.get(GuildId::new(99)).await.is_none());
    }

    #[test]
    fn channel_set_survives_serde() {
        let c = ChannelSet {
            category: 1,
            voice_teams: vec![[2, 3], [4, 5]],
            rounds_msgs: vec![6, 7],
            ..Default::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: ChannelSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.category, 1);
        assert_eq!(back.voice_teams, vec![[2, 3], [4, 5]]);
        assert_eq!(back.rounds_msgs, vec![6, 7]);
    }
}
