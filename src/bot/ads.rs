// src/bot/ads.rs - Advertisement heuristics

use once_cell::sync::Lazy;
use regex::Regex;

/// Invite-link shapes that commonly carry group-join spam.
static LINK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"https?://t\.me/joinchat/").unwrap(),
        Regex::new(r"https?://t\.me/\+").unwrap(),
        Regex::new(r"https?://t\.me/c/\d+").unwrap(),
        Regex::new(r"https?://(www\.)?(telegram|tg)\.(me|org)/").unwrap(),
    ]
});

/// Sales and recruitment phrases. Matched per entry, case-insensitively;
/// entries never contain each other so a single phrase counts once.
const AD_KEYWORDS: &[&str] = &[
    "promo",
    "discount",
    "casino",
    "gambling",
    "betting",
    "lottery",
    "jackpot",
    "crypto",
    "forex",
    "investment",
    "earn money",
    "loan",
    "credit card",
    "wholesale",
    "reseller",
    "job offer",
    "dm me",
    "contact me",
    "add me on",
    "vip signals",
    "airdrop",
];

fn contains_ad_link(lower: &str) -> bool {
    LINK_PATTERNS.iter().any(|pattern| pattern.is_match(lower))
}

fn count_keywords(lower: &str) -> usize {
    AD_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .count()
}

/// Heuristic ad check: an invite link together with at least one sales
/// keyword, or two distinct keywords on their own. A bare link or a
/// single keyword is normal conversation and never flags.
pub fn is_advertisement(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    let keywords = count_keywords(&lower);
    (contains_ad_link(&lower) && keywords >= 1) || keywords >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invite_link_is_not_an_ad() {
        assert!(!is_advertisement("https://t.me/joinchat/AbCdEf123"));
        assert!(!is_advertisement("check https://t.me/+secretgroup"));
        assert!(!is_advertisement("see https://t.me/c/12345/99"));
        assert!(!is_advertisement("docs at https://telegram.org/faq"));
    }

    #[test]
    fn single_keyword_is_not_an_ad() {
        assert!(!is_advertisement("there is a discount at the store today"));
        assert!(!is_advertisement("I work in crypto, ask me anything"));
    }

    #[test]
    fn link_plus_keyword_is_an_ad() {
        assert!(is_advertisement(
            "big promo! join https://t.me/joinchat/AbCdEf123"
        ));
        assert!(is_advertisement(
            "vip signals inside https://t.me/+tradersclub"
        ));
    }

    #[test]
    fn two_distinct_keywords_are_an_ad() {
        assert!(is_advertisement("casino promo all week, best odds"));
        assert!(is_advertisement("earn money with crypto, no experience"));
    }

    #[test]
    fn repeating_one_keyword_does_not_count_twice() {
        assert!(!is_advertisement("promo promo promo"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(is_advertisement("PROMO and DISCOUNT for members"));
        assert!(is_advertisement("HTTPS://T.ME/JOINCHAT/abc with a jackpot"));
    }

    #[test]
    fn ordinary_chatter_passes() {
        assert!(!is_advertisement(""));
        assert!(!is_advertisement("lunch anyone?"));
        assert!(!is_advertisement("the build is green again, finally"));
        assert!(!is_advertisement("https://example.com/blog/post"));
    }
}
