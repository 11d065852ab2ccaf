//! Embed rendering for the tournament channels. Pure builders, no I/O.

use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};
use serenity::model::Colour;

use crate::assets;

use super::draft::Draft;
use super::rank::{self, Finale};
use super::score::{TeamMatch, CS, KILL, SCORE_KINDS, TURRET};
use super::Tournament;

const CLASSEMENT_TITLE: &str = "🏅 __**CLASSEMENT**__ 🏅";
const ROUNDS_TITLE: &str = "📅 __**ROUNDS**__ 📅";
const RULES_TITLE: &str = "📜 __**RÈGLES**__ 📜";
const ADMIN_TITLE: &str = "🔧 __**ADMIN**__ 🔧";
const SEPARATOR: &str = "➖➖➖➖➖➖➖➖➖➖➖➖➖";

fn kill_emote() -> &'static str {
    SCORE_KINDS[KILL].emoji
}
fn turret_emote() -> &'static str {
    SCORE_KINDS[TURRET].emoji
}
fn cs_emote() -> &'static str {
    SCORE_KINDS[CS].emoji
}

/// The two inline columns of the standings embed: ranked players with
/// their evolution arrow, and their rounded points.
pub fn standings_columns(t: &Tournament) -> (String, String) {
    let standings = rank::standings(t);
    let evolutions = rank::evolutions(t, &standings);
    let players = standings
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{} {} *{}*",
                assets::rank_emote(i),
                evolutions[i].emote(),
                t.player_name(s.player)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let points = standings
        .iter()
        .map(|s| format!(" **{}**", s.rounded_points()))
        .collect::<Vec<_>>()
        .join("\n");
    (players, points)
}

/// Points column with the per-kind detail, for the admin view.
pub fn detailed_points_column(t: &Tournament) -> String {
    rank::standings(t)
        .iter()
        .map(|s| {
            let detail = s
                .counters
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            format!("**{}** *({detail})*", s.rounded_points())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn points_formula() -> String {
    format!(
        "> **Calcul des points**\n> 💎 Points **=** {k} Kill  **+**  {t} Tour  **+** {c} 100cs\n> **En cas d'égalité**\n> {k} Kill  **>**  {t} Tour  **>** {c} 100cs",
        k = kill_emote(),
        t = turret_emote(),
        c = cs_emote(),
    )
}

pub fn standings_embed(t: &Tournament) -> CreateEmbed {
    let (players, points) = standings_columns(t);
    CreateEmbed::new()
        .title(CLASSEMENT_TITLE)
        .colour(Colour::GOLD)
        .field("🎖️ ➖ __**Joueurs**__", players, true)
        .field("💎 __**Points**__", points, true)
        .field(SEPARATOR, points_formula(), false)
}

pub fn rounds_header_embed() -> CreateEmbed {
    CreateEmbed::new().title(ROUNDS_TITLE).colour(Colour::PURPLE)
}

/// One line per team with its live counters, winner ticked.
pub fn match_lines(t: &Tournament, m: &TeamMatch) -> String {
    m.teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let counters = team
                .counters
                .iter()
                .zip(SCORE_KINDS.iter())
                .map(|(&c, k)| format!("{}{}", k.emoji, assets::number_to_emotes(u64::from(c), 1)))
                .collect::<Vec<_>>()
                .join(" ");
            let tick = match m.winner {
                Some(w) if w == i => " ✅",
                Some(_) => " ❌",
                None => "",
            };
            format!("{counters} ▸ *{}*{tick}", t.team_names(team))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn match_field_name(t: &Tournament, round: usize, m: usize) -> String {
    let multi = t
        .rounds
        .get(round)
        .map(|r| r.matches.len() > 1)
        .unwrap_or(false);
    if multi {
        format!("Match {}", assets::match_letter(m))
    } else {
        "Match".to_owned()
    }
}

pub fn round_embed(t: &Tournament, round: usize) -> CreateEmbed {
    let mut e = CreateEmbed::new()
        .title(format!("__**Round {}**__", round + 1))
        .colour(Colour::PURPLE);
    if let Ok(r) = t.round(round) {
        for (i, m) in r.matches.iter().enumerate() {
            let mut value = match_lines(t, m);
            if let Some(code) = t.code(round, i) {
                value.push_str(&format!("\n🎫 `{code}`"));
            }
            e = e.field(match_field_name(t, round, i), value, false);
        }
    }
    e
}

pub fn rules_embed(nb_rounds: usize, nb_matches_per_round: usize) -> CreateEmbed {
    let parallel = if nb_matches_per_round > 1 {
        format!(" avec **{nb_matches_per_round} matchs** en parallèle.")
    } else {
        ".".to_owned()
    };
    let advance_gap = ((nb_rounds as f64 * 2.0) / 5.0).round().max(1.0) as i64;
    CreateEmbed::new()
        .title(RULES_TITLE)
        .colour(Colour::PURPLE)
        .field(
            "__**Format du tournoi**__",
            format!(
                "Le tournoi se joue individuellement mais les matchs se font par **équipe de 2**. Ces équipes changent à chaque match. Ceci est fait en s'assurant que chacun joue\n> ✅ __avec__ chaque autre joueur exactement :one: fois\n> ❌ __contre__ chaque autre joueur exactement :two: fois.\nIl y aura donc **{nb_rounds} rounds**{parallel}"
            ),
            false,
        )
        .field(
            "__**Format d'un match**__",
            "Les matchs sont en **BO1** se jouant en 2v2 selon le format suivant :\n> 🌉 __Map__ : Abîme hurlante\n> Ⓜ️ __Mode__ : Blind\n> ⛔ __Pick & Bans__ : La draft se fait sur Discord, via le bot, dans le chat du salon vocal de votre équipe. Chaque équipe ban/pick en même temps avec l'ordre suivant : **ban 1** -> **ban 2** -> **pick 1** -> **ban 3** -> **pick 2**\nUne fois les picks et bans finis, vous obtiendrez un code tournoi à rentrer dans le client *(cliquez sur **Jouer**, puis sur le symbole de trophée en haut à droite)*. Vous devez bien sûr respecter les picks établis durant la draft lors de la création de la partie.",
            false,
        )
        .field(
            "__**Règles d'un match**__",
            "> ⛔ __Interdiction__ de prendre les reliques de vie **extérieures** *(celles entre la **T1** et la **T2**)*.\n> ✅ __Le suicide__ est autorisé et ne compte pas comme un kill.\n> ✅ __L'achat d'objet__ lors d'une mort est autorisé.",
            false,
        )
        .field(
            "__**Score d'un match**__",
            format!(
                "Le match se finit lorsque l'une des deux équipes a **2 points**. Une équipe gagne **1 point** pour :\n> {}   __Chaque kill__\n> {}  __1re tourelle de la game__\n> {} __1er joueur d'une équipe à 100cs__",
                kill_emote(),
                turret_emote(),
                cs_emote(),
            ),
            false,
        )
        .field(
            "__**Score personnel**__",
            format!(
                "Les points obtenus en équipe lors d'un match sont ajoutés au score personnel de chaque joueur *(indépendamment de qui a marqué le point)*.\nÀ la fin des {nb_rounds} rounds, ce sont les points personnels qui détermineront le classement."
            ),
            false,
        )
        .field(
            "__**Égalité**__",
            format!(
                "En cas d'égalité, on départage avec {} **kills** > {} **tourelles** > {} **100cs**.\nEn cas d'égalité parfaite pour la 2e place, un **1v1** en BO1 est organisé *(mêmes règles, mais **1 point** suffit pour gagner)*.",
                kill_emote(),
                turret_emote(),
                cs_emote(),
            ),
            false,
        )
        .field(
            "__**Finale**__",
            format!(
                "À la fin des {nb_rounds} rounds, un BO5 en **1v1** sera joué entre le **1er** et le **2e** du classement pour déterminer le grand vainqueur. Pour chaque **{advance_gap} point(s)** d'écart, un match d'avance sera accordé au **1er** *(jusqu'à un maximum de 2 matchs d'avance)*."
            ),
            false,
        )
}

/// The rules as posted outside any live tournament.
pub fn generic_rules_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title(RULES_TITLE)
        .colour(Colour::PURPLE)
        .field(
            "__**Format du tournoi**__",
            "Le tournoi se joue individuellement mais les matchs se font par **équipe de 2**. Ces équipes changent à chaque match. Ceci est fait en s'assurant que chacun joue\n> ✅ __avec__ chaque autre joueur exactement :one: fois\n> ❌ __contre__ chaque autre joueur exactement :two: fois.",
            false,
        )
        .field(
            "__**Tailles possibles**__",
            "**4**, **5** ou **8** joueurs *(avec 5 joueurs, chacun saute exactement un round)*.",
            false,
        )
        .field(
            "__**Score d'un match**__",
            format!(
                "Le match se finit lorsque l'une des deux équipes a **2 points**. Une équipe gagne **1 point** pour :\n> {}   __Chaque kill__\n> {}  __1re tourelle de la game__\n> {} __1er joueur d'une équipe à 100cs__",
                kill_emote(),
                turret_emote(),
                cs_emote(),
            ),
            false,
        )
        .field(
            "__**Égalité**__",
            format!(
                "En cas d'égalité, on départage avec {} **kills** > {} **tourelles** > {} **100cs**.\nEn cas d'égalité parfaite pour la 2e place, un **1v1** en BO1 est organisé *(mêmes règles, mais **1 point** suffit pour gagner)*.",
                kill_emote(),
                turret_emote(),
                cs_emote(),
            ),
            false,
        )
        .field(
            "__**Finale**__",
            "À la fin des rounds, un BO5 en **1v1** sera joué entre le **1er** et le **2e** du classement. Si le 1er a beaucoup de points d'avance *(relativement au nombre de joueurs)*, des matchs d'avance lui seront accordés *(jusqu'à un maximum de 2)*.\n> __*Exemple d'un tournoi à 8 joueurs (3 points d'écart = 1 match d'avance) :*__\n> **Lỳf** est 1er avec **14 points** mais **Gay Prime** est 2e avec **10 points**\n> ⏭️ **BO5** commençant à **1-0** en faveur de **Lỳf**.",
            false,
        )
}

pub fn admin_embeds(t: &Tournament) -> Vec<CreateEmbed> {
    let standings = rank::standings(t);
    let (players, _) = standings_columns(t);
    let mut embeds = vec![
        CreateEmbed::new().title(ADMIN_TITLE).colour(Colour::RED),
        CreateEmbed::new()
            .title("🏆 __**CLASSEMENT**__ 🏆")
            .colour(Colour::GOLD)
            .field("🎖️ ➖ __**Joueurs**__", players, true)
            .field("💎 __**Points**__", detailed_points_column(t), true)
            .field(
                SEPARATOR,
                format!("> MSE = {:.3}", rank::spread_mse(&standings)),
                false,
            ),
    ];
    for round in 0..t.nb_rounds() {
        embeds.push(round_embed(t, round));
    }
    embeds
}

pub fn notif_embed(tournament_name: &str, title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .author(
            CreateEmbedAuthor::new(tournament_name.to_uppercase()).icon_url(assets::LOL_ICON),
        )
        .title(title.to_owned())
        .description(description.to_owned())
        .colour(Colour::BLUE)
}

pub fn finale_embed(t: &Tournament, f: &Finale) -> CreateEmbed {
    let mut description = format!(
        "**BO5** en **1v1** : 🥇 *{first}* 🆚 🥈 *{second}*\nLe BO5 commence à **{advance}-0** en faveur de *{first}* *(1 match d'avance par {gap} point(s) d'écart, max 2)*.",
        first = t.player_name(f.first),
        second = t.player_name(f.second),
        advance = f.advance,
        gap = f.gap_per_advance,
    );
    if f.tied_for_second {
        description.push_str(
            "\n\n⚠️ Égalité parfaite pour la 2e place : un **1v1** en BO1 *(1 point)* doit d'abord départager les prétendants.",
        );
    }
    CreateEmbed::new()
        .title("👑 __**FINALE**__ 👑")
        .colour(Colour::GOLD)
        .description(description)
}

/// Draft board shown in both team channels. Committed phases are public,
/// the running phase only shows who is still expected.
pub fn draft_embed(
    t: &Tournament,
    round: usize,
    m: usize,
    draft: &Draft,
    code: Option<&str>,
) -> CreateEmbed {
    let teams = t
        .team_match(round, m)
        .map(|tm| {
            format!(
                "*{}* 🆚 *{}*",
                t.team_names(&tm.teams[0]),
                t.team_names(&tm.teams[1])
            )
        })
        .unwrap_or_default();
    let list = |side: &[String]| {
        if side.is_empty() {
            "—".to_owned()
        } else {
            side.join(", ")
        }
    };
    let mut e = CreateEmbed::new()
        .title(format!("⚔️ Draft — {}", match_field_name(t, round, m)))
        .colour(Colour::ORANGE)
        .description(teams)
        .field(
            "⛔ __Bans__",
            format!(
                "Équipe 1 : {}\nÉquipe 2 : {}",
                list(&draft.bans[0]),
                list(&draft.bans[1])
            ),
            true,
        )
        .field(
            "✅ __Picks__",
            format!(
                "Équipe 1 : {}\nÉquipe 2 : {}",
                list(&draft.picks[0]),
                list(&draft.picks[1])
            ),
            true,
        );
    if let Some((_, label)) = draft.current_phase() {
        let status = (0..2)
            .map(|team| {
                if draft.is_waiting_on(team) {
                    format!("Équipe {} : {} en attente", team + 1, assets::HOURGLASS_EMOTE)
                } else {
                    format!("Équipe {} : ✅ reçu", team + 1)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        e = e.field(format!("➡️ {label}"), status, false).footer(
            CreateEmbedFooter::new(
                "Tapez le nom d'un champion dans le chat de votre salon vocal.",
            ),
        );
    } else {
        let value = match code {
            Some(code) => format!("🎫 `{code}`"),
            None => "🎫 Demandez le code tournoi à un admin.".to_owned(),
        };
        e = e.field("Draft terminée !", value, false);
    }
    e
}

#[cfg(test)]
mod tests {
    use super::super::score::KILL;
    use super::super::{Player, Tournament};
    use super::*;

    fn tournament() -> Tournament {
        let mut t = Tournament::new("Tournoi".to_owned());
        t.set_players(
            (0..4)
                .map(|i| Player {
                    user_id: i,
                    name: format!("P{i}"),
                })
                .collect(),
        )
        .unwrap();
        t.generate_rounds(&[0, 1, 2, 3]).unwrap();
        t
    }

    #[test]
    fn standings_columns_align() {
        let mut t = tournament();
        t.set_score(0, 0, 0, KILL, 2).unwrap();
        let (players, points) = standings_columns(&t);
        assert_eq!(players.lines().count(), 4);
        assert_eq!(points.lines().count(), 4);
        assert!(players.lines().next().unwrap().starts_with("🥇"));
        assert_eq!(points.lines().next().unwrap(), " **2**");
    }

    #[test]
    fn match_lines_mark_the_winner() {
        let mut t = tournament();
        t.set_score(0, 0, 1, KILL, 2).unwrap();
        let lines = match_lines(&t, t.team_match(0, 0).unwrap());
        let mut it = lines.lines();
        let first = it.next().unwrap();
        let second = it.next().unwrap();
        assert!(first.ends_with('❌'));
        assert!(second.ends_with('✅'));
        assert!(second.contains("*P2 & P3*"));
        assert!(second.contains("⚔️2⃣"));
    }

    #[test]
    fn detailed_points_show_per_kind_counters() {
        let mut t = tournament();
        t.set_score(0, 0, 0, KILL, 1).unwrap();
        t.set_score(0, 0, 0, TURRET, 1).unwrap();
        let col = detailed_points_column(&t);
        assert!(col.lines().next().unwrap().contains("(1 1 0)"));
    }
}
