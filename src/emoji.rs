//! Emoji cluster extraction.
//!
//! One pattern, following the UTS #51 "possible emoji" grammar:
//!
//! ```text
//! emoji       := keycap | element (ZWJ element)*
//! keycap      := [0-9#*] FE0F? 20E3
//! element     := RI RI | base modifier?
//! base        := (Extended_Pictographic | Emoji_Presentation) - RI - Emoji_Modifier
//! modifier    := Emoji_Modifier | FE0F | tag_spec
//! tag_spec    := [E0020-E007E]+ E007F
//! ```
//!
//! A ZWJ sequence is a single key. A lone regional indicator or a lone
//! skin-tone modifier is not an emoji. Keys are returned exactly as written.

use regex::Regex;
use std::sync::OnceLock;

const BASE: &str = r"[[\p{Extended_Pictographic}\p{Emoji_Presentation}]--[\p{Regional_Indicator}\p{Emoji_Modifier}]]";
const MODIFIER: &str = r"(?:\p{Emoji_Modifier}\x{FE0F}?|\x{FE0F}|[\x{E0020}-\x{E007E}]+\x{E007F})";
const FLAG: &str = r"\p{Regional_Indicator}{2}";
const KEYCAP: &str = r"[0-9#*]\x{FE0F}?\x{20E3}";

fn emoji_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let element = format!("(?:{FLAG}|{BASE}{MODIFIER}?)");
        let pattern = format!(r"{KEYCAP}|{element}(?:\x{{200D}}{element})*");
        Regex::new(&pattern).expect("emoji pattern compiles")
    })
}

/// Iterate every emoji cluster in `text`, left to right.
pub fn emoji_clusters(text: &str) -> impl Iterator<Item = &str> + '_ {
    emoji_regex().find_iter(text).map(|m| m.as_str())
}
