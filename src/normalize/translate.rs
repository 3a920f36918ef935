//! Pattern-based English → Korean translation of effect text
//!
//! Rules are tried in order against the cleaned, lower-cased text and the
//! first match produces the whole output sentence. Text no rule understands
//! is returned untranslated behind [`UNTRANSLATED_PREFIX`] so mixed-language
//! sentences never reach the wiki.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Prefix marking English text that no rule matched
pub const UNTRANSLATED_PREFIX: &str = "(영문 설명)";

static FOOTNOTE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\{[^}]+\}").expect("valid footnote pattern"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Stat names as they appear in English prose
const STAT_NAMES: &[(&str, &str)] = &[
    ("special defense", "특수방어"),
    ("special attack", "특수공격"),
    ("attack", "공격"),
    ("defense", "방어"),
    ("speed", "스피드"),
    ("accuracy", "명중"),
    ("evasion", "회피"),
];

const STAGE_WORDS: &[(&str, &str)] = &[
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
];

enum Matcher {
    Regex(Regex),
    Contains(&'static [&'static str]),
    /// Any one of the phrases
    ContainsAny(&'static [&'static str]),
}

struct TranslationRule {
    name: &'static str,
    matcher: Matcher,
    render: fn(Option<&Captures>) -> String,
}

impl TranslationRule {
    fn regex(name: &'static str, pattern: &str, render: fn(Option<&Captures>) -> String) -> Self {
        Self {
            name,
            matcher: Matcher::Regex(Regex::new(pattern).expect("valid translation pattern")),
            render,
        }
    }

    fn contains(
        name: &'static str,
        phrases: &'static [&'static str],
        render: fn(Option<&Captures>) -> String,
    ) -> Self {
        Self {
            name,
            matcher: Matcher::Contains(phrases),
            render,
        }
    }

    fn apply(&self, low: &str) -> Option<String> {
        match &self.matcher {
            Matcher::Regex(re) => re.captures(low).map(|caps| (self.render)(Some(&caps))),
            Matcher::Contains(phrases) => phrases
                .iter()
                .all(|p| low.contains(p))
                .then(|| (self.render)(None)),
            Matcher::ContainsAny(phrases) => phrases
                .iter()
                .any(|p| low.contains(p))
                .then(|| (self.render)(None)),
        }
    }
}

fn group<'c>(caps: Option<&'c Captures>, idx: usize) -> &'c str {
    caps.and_then(|c| c.get(idx)).map_or("", |m| m.as_str())
}

fn lookup<'a>(table: &[(&str, &'a str)], key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| *to)
}

fn stat_and_stage(caps: Option<&Captures>) -> (String, String) {
    let stat = group(caps, 1).trim();
    let stage = group(caps, 2);
    (
        lookup(STAT_NAMES, stat).to_string(),
        lookup(STAGE_WORDS, stage).to_string(),
    )
}

static RULES: Lazy<Vec<TranslationRule>> = Lazy::new(|| {
    vec![
        TranslationRule::regex("flinch", r"(\d+)% chance to make the target flinch\.?", |caps| {
            format!("{}% 확률로 상대를 풀죽게 한다.", group(caps, 1))
        }),
        TranslationRule::contains(
            "regular_damage",
            &["inflicts regular damage with no additional effect"],
            |_| "추가 효과 없이 일반적인 데미지를 준다.".to_string(),
        ),
        TranslationRule::contains("one_hit_ko", &["causes one-hit ko"], |_| {
            "일격에 상대를 쓰러뜨릴 수 있다.".to_string()
        }),
        TranslationRule::contains("confusion", &["confuses the target"], |_| {
            "상대를 혼란 상태로 만든다.".to_string()
        }),
        TranslationRule::contains("half_heal", &["heals the user by half its max hp"], |_| {
            "사용자의 최대 HP 절반만큼 회복한다.".to_string()
        }),
        TranslationRule {
            name: "level_damage",
            matcher: Matcher::ContainsAny(&[
                "equal to the user's level",
                "equal to the user\u{2019}s level",
            ]),
            render: |_| "사용자의 레벨과 같은 데미지를 준다.".to_string(),
        },
        TranslationRule::contains(
            "substitute",
            &[
                "protecting the user from further damage or status changes until it breaks",
                "1/4",
            ],
            |_| {
                "사용자의 최대 HP의 1/4을 소비해 분신인 인형을 만들고, 인형이 사라질 때까지 데미지와 상태이상을 막는다."
                    .to_string()
            },
        ),
        TranslationRule::regex(
            "lower_target_stat",
            r"lowers the target'?s? (special defense|special attack|attack|defense|speed|accuracy|evasion) by (one|two|three|four|five|six) stages?",
            |caps| {
                let (stat, stage) = stat_and_stage(caps);
                format!("상대의 {}(을/를) {}랭크 떨어뜨린다.", stat, stage)
            },
        ),
        TranslationRule::regex(
            "raise_user_stat",
            r"raises the user'?s? (special defense|special attack|attack|defense|speed|accuracy|evasion) by (one|two|three|four|five|six) stages?",
            |caps| {
                let (stat, stage) = stat_and_stage(caps);
                format!("사용자의 {}(을/를) {}랭크 올린다.", stat, stage)
            },
        ),
        TranslationRule::contains("paralysis_immunity", &["prevents paralysis"], |_| {
            "마비 상태가 되지 않는다.".to_string()
        }),
        TranslationRule::contains(
            "sandstorm_immunity",
            &["protects against sandstorm damage"],
            |_| "모래바람 데미지를 받지 않는다.".to_string(),
        ),
        TranslationRule::contains("sandstorm_evasion", &["increases evasion", "sandstorm"], |_| {
            "모래바람일 때 회피율이 상승한다.".to_string()
        }),
    ]
});

/// Strip `[label]{ref}` footnote links, drop stray brackets and collapse
/// whitespace
pub fn clean_effect_text(text: &str) -> String {
    let text = text.replace('\n', " ");
    let text = FOOTNOTE_LINK.replace_all(text.trim(), "$1");
    let text = text.replace(&['[', ']'][..], "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Name of the first rule matching the text, if any
pub fn matching_rule(text: &str) -> Option<&'static str> {
    let low = clean_effect_text(text).to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.apply(&low).is_some())
        .map(|rule| rule.name)
}

/// Translate English effect text. Never returns a mixed-language sentence:
/// unmatched input comes back whole behind [`UNTRANSLATED_PREFIX`].
pub fn translate(text: &str) -> String {
    let cleaned = clean_effect_text(text);
    let low = cleaned.to_lowercase();

    RULES
        .iter()
        .find_map(|rule| rule.apply(&low))
        .unwrap_or_else(|| format!("{} {}", UNTRANSLATED_PREFIX, cleaned))
}
