//! Static emotes, images and URL builders shared by the embeds.

pub const RANK_EMOTES: [&str; 15] = [
    "🥇", "🥈", "🥉", "4⃣", "5⃣", "6⃣", "7⃣", "8⃣", "9⃣", "🔟", "🇦", "🇧", "🇨", "🇩", "🇪",
];

pub const NUM_EMOTES: [&str; 10] = ["0⃣", "1⃣", "2⃣", "3⃣", "4⃣", "5⃣", "6⃣", "7⃣", "8⃣", "9⃣"];

pub const ALPHA_EMOTES: [&str; 8] = ["🇦", "🇧", "🇨", "🇩", "🇪", "🇫", "🇬", "🇭"];

pub const HOURGLASS_EMOTE: &str = "<a:Hourglass:829248200350367754>";
pub const POROSNACK_EMOTE: &str = "<:porosnack:908477364135161877>";

/// Position in the rank list, medal style.
pub fn rank_emote(position: usize) -> &'static str {
    RANK_EMOTES.get(position).copied().unwrap_or("▫️")
}

/// 🇦, 🇧, ... for match labels.
pub fn match_letter(m: usize) -> &'static str {
    ALPHA_EMOTES.get(m).copied().unwrap_or("❓")
}

/// A number as keycap emotes, zero-padded to `width` digits.
pub fn number_to_emotes(n: u64, width: usize) -> String {
    let digits = format!("{n:0width$}");
    digits
        .chars()
        .map(|c| NUM_EMOTES[c as usize - '0' as usize])
        .collect()
}

pub fn position_emote(position: &str) -> &'static str {
    match position {
        "TOP" => "<:Top:797548227004071956>",
        "JUNGLE" => "<:Jungle:797548226998829078>",
        "MIDDLE" => "<:Mid:797548226944565298>",
        "BOTTOM" => "<:Bot:829047436563054632>",
        "UTILITY" => "<:Support:797548227347480593>",
        "FILL" => "<:Fill:829062843717386261>",
        _ => "<:Missing:908411949405069352>",
    }
}

pub fn tier_emote(tier: &str) -> &'static str {
    match tier {
        "IRON" => "<:Iron:829240724871577600>",
        "BRONZE" => "<:Bronze:829240724754792449>",
        "SILVER" => "<:Silver:829240724867514378>",
        "GOLD" => "<:Gold:829240724842872872>",
        "PLATINUM" => "<:Platinum:829240724797128754>",
        "DIAMOND" => "<:Diamond:829240724830027796>",
        "MASTER" => "<:Master:829240724943405096>",
        "GRANDMASTER" => "<:Grandmaster:829240724767768576>",
        "CHALLENGER" => "<:Challenger:829240724712456193>",
        _ => "<:Unranked:829242191020032001>",
    }
}

/// Poro being fed, from starving to about to pop.
pub const PORO_GROWINGS: [&str; 11] = [
    "https://i.imgur.com/Eex5g5J.png",
    "https://i.imgur.com/52LLvqI.png",
    "https://i.imgur.com/2vEGssv.png",
    "https://i.imgur.com/PcXqiub.png",
    "https://i.imgur.com/7ohi1cB.png",
    "https://i.imgur.com/VBmrv8w.png",
    "https://i.imgur.com/7bIdncF.png",
    "https://i.imgur.com/gQ79HSq.png",
    "https://i.imgur.com/2gBVwgr.png",
    "https://i.imgur.com/LGM3liY.png",
    "https://i.imgur.com/sGvrPcj.png",
];

pub const PORO_SWEAT: &str = "https://i.imgur.com/KbWJZkD.png";
pub const PORO_POP: &str = "https://i.imgur.com/CiZdJAd.png";

pub const CLASH_BANNER: &str = "https://i.imgur.com/GoV9WVk.jpg";
pub const LOL_ICON: &str = "https://i.imgur.com/0Fyu6yl.png";
pub const HOURGLASS_IMAGE: &str = "https://i.imgur.com/2V0xDMW.png";

pub fn profile_icon_url(icon_id: i32) -> String {
    format!(
        "https://raw.communitydragon.org/latest/plugins/rcp-be-lol-game-data/global/default/v1/profile-icons/{icon_id}.jpg"
    )
}

/// op.gg expects its own lowercase region names ("euw", "na", ...).
pub fn opgg_summoner_url(region: &str, name: &str) -> String {
    format!("https://www.op.gg/summoners/{region}/{}", name.replace(' ', "%20"))
}

pub fn opgg_multi_url(region: &str, names: &[String]) -> String {
    format!(
        "https://www.op.gg/multisearch/{region}?summoners={}",
        names.join(",").replace(' ', "%20")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_as_keycaps() {
        assert_eq!(number_to_emotes(7, 1), "7⃣");
        assert_eq!(number_to_emotes(7, 2), "0⃣7⃣");
        assert_eq!(number_to_emotes(42, 1), "4⃣2⃣");
        assert_eq!(number_to_emotes(120, 3), "1⃣2⃣0⃣");
    }

    #[test]
    fn rank_emotes_degrade_gracefully() {
        assert_eq!(rank_emote(0), "🥇");
        assert_eq!(rank_emote(9), "🔟");
        assert_eq!(rank_emote(40), "▫️");
    }

    #[test]
    fn opgg_urls_escape_spaces() {
        assert_eq!(
            opgg_summoner_url("euw", "Miss Fortune"),
            "https://www.op.gg/summoners/euw/Miss%20Fortune"
        );
        let names = vec!["A B".to_owned(), "C".to_owned()];
        assert_eq!(
            opgg_multi_url("euw", &names),
            "https://www.op.gg/multisearch/euw?summoners=A%20B,C"
        );
    }
}
