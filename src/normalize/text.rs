//! Localized text selection
//!
//! Source tables carry the same fact in several languages and, for flavor
//! text, once per game revision. This module reduces those rows to one
//! display string per entity.

use std::collections::HashMap;

use crate::parser::{Record, Table};

use super::translate::translate;

/// Shown when no language has any text for an entity
pub const NO_EFFECT_MARKER: &str = "효과 정보가 없습니다.";

/// Token in move prose replaced by the move's effect chance
pub const EFFECT_CHANCE_TOKEN: &str = "$effect_chance";

/// Trim and fold newlines into spaces
pub fn collapse_lines(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

/// Language id of a localized row. Name and prose tables use
/// `local_language_id`, flavor-text tables use `language_id`.
pub fn language_of<'a>(record: &Record<'a>) -> &'a str {
    record
        .opt("local_language_id")
        .or_else(|| record.opt("language_id"))
        .unwrap_or("")
}

/// Latest non-blank text per entity key for one language.
///
/// Rows are filtered to `lang_id`; the greatest `order_column` value wins and
/// ties go to the row seen last.
pub fn latest_localized_text(
    table: &Table,
    id_column: &str,
    text_column: &str,
    lang_id: &str,
    order_column: &str,
) -> HashMap<String, String> {
    let mut out: HashMap<String, (i64, String)> = HashMap::new();

    for record in table.records() {
        if language_of(&record) != lang_id {
            continue;
        }
        let text = collapse_lines(record.get(text_column));
        if text.is_empty() {
            continue;
        }
        let order = record.int(order_column, 0);
        let key = record.get(id_column).to_string();

        match out.get(&key) {
            Some((prev, _)) if order < *prev => {}
            _ => {
                out.insert(key, (order, text));
            }
        }
    }

    out.into_iter().map(|(key, (_, text))| (key, text)).collect()
}

/// Short prose per entity key for one language: `short_effect`, else `effect`.
/// A later row for the same key replaces an earlier one.
pub fn prose_text(table: &Table, id_column: &str, lang_id: &str) -> HashMap<String, String> {
    table
        .records()
        .filter(|record| language_of(record) == lang_id)
        .map(|record| {
            let text = record
                .opt("short_effect")
                .or_else(|| record.opt("effect"))
                .unwrap_or("");
            (record.get(id_column).to_string(), text.to_string())
        })
        .collect()
}

/// Whether a candidate is already in the display language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateLanguage {
    Target,
    Source,
}

/// One tier of the fallback chain
#[derive(Debug, Clone, Copy)]
pub struct TextCandidate<'a> {
    pub language: CandidateLanguage,
    pub text: Option<&'a str>,
}

impl<'a> TextCandidate<'a> {
    pub fn target(text: Option<&'a str>) -> Self {
        Self {
            language: CandidateLanguage::Target,
            text,
        }
    }

    pub fn source(text: Option<&'a str>) -> Self {
        Self {
            language: CandidateLanguage::Source,
            text,
        }
    }
}

/// Pick the first candidate that is still non-blank after cleanup, translating
/// source-language text. Falls back to [`NO_EFFECT_MARKER`].
pub fn choose_text(candidates: &[TextCandidate<'_>]) -> String {
    candidates
        .iter()
        .find_map(|candidate| {
            let text = candidate.text.filter(|t| !t.trim().is_empty())?;
            let text = match candidate.language {
                CandidateLanguage::Target => super::translate::clean_effect_text(text),
                CandidateLanguage::Source => translate(text),
            };
            (!text.trim().is_empty()).then_some(text)
        })
        .unwrap_or_else(|| NO_EFFECT_MARKER.to_string())
}

/// The four standard tiers: target latest-revision, target prose,
/// source latest-revision, source prose
pub fn choose_localized_text(
    target_latest: Option<&str>,
    target_prose: Option<&str>,
    source_latest: Option<&str>,
    source_prose: Option<&str>,
) -> String {
    choose_text(&[
        TextCandidate::target(target_latest),
        TextCandidate::target(target_prose),
        TextCandidate::source(source_latest),
        TextCandidate::source(source_prose),
    ])
}

/// Replace the effect-chance token, using `-` when the move has no chance
pub fn substitute_effect_chance(text: &str, chance: Option<&str>) -> String {
    let chance = chance.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("-");
    text.replace(EFFECT_CHANCE_TOKEN, chance)
}
