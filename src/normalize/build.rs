//! Raw tables → store rows
//!
//! Every lookup map built here lives inside one [`BuildContext`] and is
//! dropped with it, so repeated builds never share memoized state.

use anyhow::Result;
use std::collections::{HashMap, HashSet};

use crate::config::{Languages, RECENT_GENERATION_THRESHOLD};
use crate::download::SourceTables;
use crate::parser::{parse_int, Record, Table};
use crate::ui::Ui;

use super::evolution::{
    build_topology, ConditionNames, EntityNode, EvolutionCondition, EvolutionEdge,
    EvolutionMember, SpeciesNode, DEFAULT_SORT_ORDER,
};
use super::rows::*;
use super::text::{
    choose_localized_text, language_of, latest_localized_text, prose_text,
    substitute_effect_chance,
};

const DEFAULT_FORM_ORDER: i64 = 9999;

/// Every row of one full build
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizedRows {
    pub pokemon: Vec<PokemonRow>,
    pub form_meta: Vec<FormMetaRow>,
    pub stats: Vec<StatRow>,
    pub abilities: Vec<AbilityRow>,
    pub types: Vec<TypeSlotRow>,
    pub efficacy: Vec<EfficacyRow>,
    pub egg_moves: Vec<EggMoveRow>,
    pub level_moves: Vec<LevelMoveRow>,
    pub evolution_members: Vec<EvolutionMember>,
    pub evolution_edges: Vec<EvolutionEdge>,
}

impl NormalizedRows {
    pub fn total_rows(&self) -> usize {
        self.pokemon.len()
            + self.form_meta.len()
            + self.stats.len()
            + self.abilities.len()
            + self.types.len()
            + self.efficacy.len()
            + self.egg_moves.len()
            + self.level_moves.len()
            + self.evolution_members.len()
            + self.evolution_edges.len()
    }
}

/// Pick the target and source language ids out of `languages.csv`
pub fn resolve_language_ids(languages: &Table, config: &Languages) -> (String, String) {
    let find = |identifier: &str, default: &str| {
        languages
            .records()
            .find(|r| r.get("identifier") == identifier)
            .map(|r| r.get("id").to_string())
            .unwrap_or_else(|| default.to_string())
    };
    (
        find(&config.target, &config.target_default_id),
        find(&config.source, &config.source_default_id),
    )
}

/// `id_column → name_column` for one language, skipping blank names
fn localized_names(table: &Table, id_column: &str, name_column: &str, lang: &str) -> HashMap<String, String> {
    table
        .records()
        .filter(|r| language_of(r) == lang)
        .filter_map(|r| {
            let name = r.opt(name_column)?.trim();
            Some((r.get(id_column).to_string(), name.to_string()))
        })
        .collect()
}

/// `id → column` over every row
fn column_by_id(table: &Table, column: &str) -> HashMap<String, String> {
    table
        .records()
        .map(|r| (r.get("id").to_string(), r.get(column).to_string()))
        .collect()
}

fn int_by_id(table: &Table, column: &str, default: i64) -> HashMap<String, i64> {
    table
        .records()
        .map(|r| (r.get("id").to_string(), r.int(column, default)))
        .collect()
}

fn is_recent(generation: i64) -> bool {
    generation > RECENT_GENERATION_THRESHOLD
}

/// State for one normalization run
pub struct BuildContext<'t> {
    tables: &'t SourceTables,
    target_lang: String,
    source_lang: String,
    known_pokemon: HashSet<i64>,
    type_names: HashMap<String, String>,
    /// Child rows dropped because they point at an unknown entity or record
    dropped: usize,
}

impl<'t> BuildContext<'t> {
    pub fn new(tables: &'t SourceTables, languages: &Languages) -> Self {
        let (target_lang, source_lang) = resolve_language_ids(tables.get("languages"), languages);
        let type_names = localized_names(tables.get("type_names"), "type_id", "name", &target_lang);
        Self {
            tables,
            target_lang,
            source_lang,
            known_pokemon: HashSet::new(),
            type_names,
            dropped: 0,
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn table(&self, name: &str) -> &'t Table {
        self.tables.get(name)
    }

    fn type_name(&self, type_id: &str) -> String {
        self.type_names
            .get(type_id)
            .cloned()
            .unwrap_or_else(|| type_id.to_string())
    }

    /// Keep only rows whose entity survived the pokemon pass
    fn owner(&mut self, record: &Record<'_>) -> Option<i64> {
        let pokemon_id = record.int("pokemon_id", 0);
        if self.known_pokemon.contains(&pokemon_id) {
            Some(pokemon_id)
        } else {
            self.dropped += 1;
            None
        }
    }

    /// The form row describing each entity: its default form when it has
    /// several, otherwise the first seen
    fn forms_by_pokemon(&self) -> HashMap<&'t str, Record<'t>> {
        let mut forms: HashMap<&str, Record> = HashMap::new();
        for form in self.table("pokemon_forms").records() {
            let key = form.get("pokemon_id");
            let replace = match forms.get(key) {
                None => true,
                Some(existing) => !existing.flag("is_default", false) && form.flag("is_default", false),
            };
            if replace {
                forms.insert(key, form);
            }
        }
        forms
    }

    /// Entities, their form metadata, and the nodes the topology builder needs
    pub fn build_pokemon(&mut self) -> (Vec<PokemonRow>, Vec<FormMetaRow>, Vec<EntityNode>) {
        let species = self.table("pokemon_species");
        let species_identifier = column_by_id(species, "identifier");
        let species_generation = int_by_id(species, "generation_id", 0);
        let species_chain = int_by_id(species, "evolution_chain_id", 0);
        let species_name = localized_names(
            self.table("pokemon_species_names"),
            "pokemon_species_id",
            "name",
            &self.target_lang,
        );
        let version_group_generation = int_by_id(self.table("version_groups"), "generation_id", 0);

        let forms = self.forms_by_pokemon();
        let form_names: HashMap<String, String> = self
            .table("pokemon_form_names")
            .records()
            .filter(|r| language_of(r) == self.target_lang)
            .filter_map(|r| {
                let name = r.opt("pokemon_name").or_else(|| r.opt("form_name"))?.trim();
                Some((r.get("pokemon_form_id").to_string(), name.to_string()))
            })
            .collect();

        let mut pokemon_rows = Vec::new();
        let mut meta_rows = Vec::new();
        let mut entities = Vec::new();

        for p in self.table("pokemon").records() {
            let pid = p.int("id", 0);
            if pid <= 0 || !self.known_pokemon.insert(pid) {
                self.dropped += 1;
                continue;
            }
            let identifier = p.get("identifier");
            let sid = p.get("species_id");
            let base_identifier = species_identifier.get(sid).map_or(identifier, String::as_str);
            let base_name = species_name
                .get(sid)
                .map(String::as_str)
                .unwrap_or(base_identifier)
                .to_string();
            let form = forms.get(p.get("id"));

            let mut introduced_generation = species_generation.get(sid).copied().unwrap_or(0);
            // A variant is the species default only if both the entity and its form say so
            let mut is_default = p.flag("is_default", true);
            let mut is_mega = false;
            let mut is_gmax = identifier.contains("gmax");
            let mut form_order = DEFAULT_FORM_ORDER;

            if let Some(form) = form {
                if let Some(vg) = form.opt("introduced_in_version_group_id") {
                    introduced_generation = version_group_generation
                        .get(vg)
                        .copied()
                        .unwrap_or(introduced_generation);
                }
                is_default = is_default && form.flag("is_default", false);
                is_mega = form.flag("is_mega", false);
                form_order = form.int("form_order", DEFAULT_FORM_ORDER);
                is_gmax = is_gmax || form.get("form_identifier").contains("gmax");
            }

            let display_name = match form.and_then(|f| form_names.get(f.get("id"))) {
                Some(name) => name.clone(),
                None if identifier != base_identifier => format!("{} ({})", base_name, identifier),
                None => base_name.clone(),
            };

            let species_id = parse_int(Some(sid), 0);
            let sort_order = p.int("order", DEFAULT_SORT_ORDER);

            pokemon_rows.push(PokemonRow {
                id: pid,
                identifier: identifier.to_string(),
                name: base_name,
                display_name: display_name.clone(),
                species_id,
                evolution_chain_id: species_chain.get(sid).copied().unwrap_or(0),
                is_recent: is_recent(introduced_generation),
            });
            meta_rows.push(FormMetaRow {
                pokemon_id: pid,
                is_default,
                is_mega,
                is_gmax,
                introduced_generation,
                form_order,
                sort_order,
            });
            entities.push(EntityNode {
                id: pid,
                species_id,
                identifier: identifier.to_string(),
                display_name,
                is_default,
                is_mega,
                is_gmax,
                sort_order,
            });
        }

        (pokemon_rows, meta_rows, entities)
    }

    pub fn build_stats(&mut self) -> Vec<StatRow> {
        let stat_identifier = column_by_id(self.table("stats"), "identifier");
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for r in self.table("pokemon_stats").records() {
            let Some(pokemon_id) = self.owner(&r) else {
                continue;
            };
            let Some(stat) = stat_identifier.get(r.get("stat_id")) else {
                self.dropped += 1;
                continue;
            };
            if seen.insert((pokemon_id, stat.clone())) {
                rows.push(StatRow {
                    pokemon_id,
                    stat_identifier: stat.clone(),
                    base_stat: r.int("base_stat", 0),
                });
            }
        }
        rows
    }

    pub fn build_abilities(&mut self) -> Vec<AbilityRow> {
        let abilities = self.table("abilities");
        let identifier = column_by_id(abilities, "identifier");
        let generation = int_by_id(abilities, "generation_id", 0);
        let names = localized_names(self.table("ability_names"), "ability_id", "name", &self.target_lang);

        let prose = self.table("ability_prose");
        let prose_target = prose_text(prose, "ability_id", &self.target_lang);
        let prose_source = prose_text(prose, "ability_id", &self.source_lang);
        let flavor = self.table("ability_flavor_text");
        let flavor_target =
            latest_localized_text(flavor, "ability_id", "flavor_text", &self.target_lang, "version_group_id");
        let flavor_source =
            latest_localized_text(flavor, "ability_id", "flavor_text", &self.source_lang, "version_group_id");

        let mut effects: HashMap<&str, String> = HashMap::new();
        let mut rows = Vec::new();

        for r in self.table("pokemon_abilities").records() {
            let Some(pokemon_id) = self.owner(&r) else {
                continue;
            };
            let aid = r.get("ability_id");
            let effect = effects
                .entry(aid)
                .or_insert_with(|| {
                    choose_localized_text(
                        flavor_target.get(aid).map(String::as_str),
                        prose_target.get(aid).map(String::as_str),
                        flavor_source.get(aid).map(String::as_str),
                        prose_source.get(aid).map(String::as_str),
                    )
                })
                .clone();

            rows.push(AbilityRow {
                pokemon_id,
                ability_id: parse_int(Some(aid), 0),
                name: names
                    .get(aid)
                    .or_else(|| identifier.get(aid))
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                effect,
                is_recent: is_recent(generation.get(aid).copied().unwrap_or(0)),
                is_hidden: r.flag("is_hidden", false),
            });
        }
        rows
    }

    pub fn build_types(&mut self) -> Vec<TypeSlotRow> {
        let mut rows = Vec::new();
        for r in self.table("pokemon_types").records() {
            let Some(pokemon_id) = self.owner(&r) else {
                continue;
            };
            rows.push(TypeSlotRow {
                pokemon_id,
                type_id: r.int("type_id", 0),
                slot: r.int("slot", 0),
                type_name: self.type_name(r.get("type_id")),
            });
        }
        rows
    }

    /// Static damage factors; a blank factor reads as neutral
    pub fn build_efficacy(&self) -> Vec<EfficacyRow> {
        let mut seen = HashSet::new();
        self.table("type_efficacy")
            .records()
            .map(|r| EfficacyRow {
                attack_type_id: r.int("damage_type_id", 0),
                target_type_id: r.int("target_type_id", 0),
                damage_factor: r.int("damage_factor", 100),
            })
            .filter(|row| seen.insert((row.attack_type_id, row.target_type_id)))
            .collect()
    }

    /// Breeding and level-up learnsets; the first source row per key wins
    pub fn build_moves(&mut self) -> (Vec<EggMoveRow>, Vec<LevelMoveRow>) {
        let methods = self.table("pokemon_move_methods");
        let method_ids = |identifier: &str| -> HashSet<&str> {
            methods
                .records()
                .filter(|r| r.get("identifier") == identifier)
                .map(|r| r.get("id"))
                .collect()
        };
        let egg_methods = method_ids("egg");
        let level_methods = method_ids("level-up");

        let moves: HashMap<&str, Record> = self
            .table("moves")
            .records()
            .map(|r| (r.get("id"), r))
            .collect();
        let names = localized_names(self.table("move_names"), "move_id", "name", &self.target_lang);
        let prose = self.table("move_effect_prose");
        let prose_target = prose_text(prose, "move_effect_id", &self.target_lang);
        let prose_source = prose_text(prose, "move_effect_id", &self.source_lang);
        let flavor = self.table("move_flavor_text");
        let flavor_target =
            latest_localized_text(flavor, "move_id", "flavor_text", &self.target_lang, "version_group_id");
        let flavor_source =
            latest_localized_text(flavor, "move_id", "flavor_text", &self.source_lang, "version_group_id");
        let class_identifier = column_by_id(self.table("move_damage_classes"), "identifier");
        let class_names = localized_names(
            self.table("move_damage_class_prose"),
            "move_damage_class_id",
            "name",
            &self.target_lang,
        );

        let mut infos: HashMap<&str, MoveInfo> = HashMap::new();
        let mut seen_egg = HashSet::new();
        let mut seen_level = HashSet::new();
        let mut egg_rows = Vec::new();
        let mut level_rows = Vec::new();

        for r in self.table("pokemon_moves").records() {
            let method = r.get("pokemon_move_method_id");
            let is_egg = egg_methods.contains(method);
            let is_level = level_methods.contains(method);
            if !is_egg && !is_level {
                continue;
            }

            let move_id = r.get("move_id");
            let Some(m) = moves.get(move_id) else {
                self.dropped += 1;
                continue;
            };
            let Some(pokemon_id) = self.owner(&r) else {
                continue;
            };

            let info = infos.entry(move_id).or_insert_with(|| {
                let chance = m.opt("effect_chance");
                let effect_id = m.get("effect_id");
                let with_chance = |text: Option<&String>| text.map(|t| substitute_effect_chance(t, chance));
                let effect = choose_localized_text(
                    with_chance(flavor_target.get(move_id)).as_deref(),
                    with_chance(prose_target.get(effect_id)).as_deref(),
                    with_chance(flavor_source.get(move_id)).as_deref(),
                    with_chance(prose_source.get(effect_id)).as_deref(),
                );
                let identifier = m.opt("identifier").unwrap_or("unknown").to_string();
                let class_id = m.get("damage_class_id");

                MoveInfo {
                    name: names.get(move_id).cloned().unwrap_or_else(|| identifier.clone()),
                    identifier,
                    type_name: self
                        .type_names
                        .get(m.get("type_id"))
                        .cloned()
                        .unwrap_or_else(|| m.get("type_id").to_string()),
                    damage_class: class_names
                        .get(class_id)
                        .or_else(|| class_identifier.get(class_id))
                        .cloned()
                        .unwrap_or_else(|| "미상".to_string()),
                    power: m.int("power", 0),
                    accuracy: m.int("accuracy", 0),
                    pp: m.int("pp", 0),
                    effect,
                    is_recent: is_recent(m.int("generation_id", 0)),
                }
            });

            if is_egg && seen_egg.insert((pokemon_id, move_id)) {
                egg_rows.push(EggMoveRow {
                    pokemon_id,
                    info: info.clone(),
                });
            }
            if is_level {
                let level = r.int("level", 0);
                if seen_level.insert((pokemon_id, move_id, level)) {
                    level_rows.push(LevelMoveRow {
                        pokemon_id,
                        info: info.clone(),
                        level,
                    });
                }
            }
        }

        (egg_rows, level_rows)
    }

    fn condition_names(&self) -> ConditionNames {
        let mut items = column_by_id(self.table("items"), "identifier");
        items.retain(|_, identifier| !identifier.is_empty());
        items.extend(localized_names(self.table("item_names"), "item_id", "name", &self.target_lang));

        ConditionNames {
            items,
            trigger_names: localized_names(
                self.table("evolution_trigger_prose"),
                "evolution_trigger_id",
                "name",
                &self.target_lang,
            ),
            trigger_identifiers: column_by_id(self.table("evolution_triggers"), "identifier"),
        }
    }

    pub fn species_nodes(&self) -> Vec<SpeciesNode> {
        self.table("pokemon_species")
            .records()
            .map(|r| SpeciesNode {
                id: r.int("id", 0),
                identifier: r.get("identifier").to_string(),
                parent: r
                    .opt("evolves_from_species_id")
                    .map(|parent| parse_int(Some(parent), 0)),
                chain_id: r.int("evolution_chain_id", 0),
            })
            .collect()
    }

    /// Evolution trigger per evolved species; a later row replaces an earlier one
    pub fn evolution_conditions(&self) -> HashMap<i64, EvolutionCondition> {
        let names = self.condition_names();
        self.table("pokemon_evolution")
            .records()
            .map(|r| {
                (
                    r.int("evolved_species_id", 0),
                    EvolutionCondition::from_record(&r, &names),
                )
            })
            .collect()
    }
}

/// Run the whole normalization over a loaded set of source tables
pub fn normalize(tables: &SourceTables, languages: &Languages, ui: &mut impl Ui) -> Result<NormalizedRows> {
    let mut ctx = BuildContext::new(tables, languages);
    let steps = 7;
    let mut rows = NormalizedRows::default();

    ui.set_progress(0, steps, "pokemon");
    let (pokemon, form_meta, entities) = ctx.build_pokemon();
    rows.pokemon = pokemon;
    rows.form_meta = form_meta;

    ui.set_progress(1, steps, "stats");
    rows.stats = ctx.build_stats();

    ui.set_progress(2, steps, "abilities");
    rows.abilities = ctx.build_abilities();

    ui.set_progress(3, steps, "types");
    rows.types = ctx.build_types();
    rows.efficacy = ctx.build_efficacy();

    ui.set_progress(4, steps, "moves");
    let (egg_moves, level_moves) = ctx.build_moves();
    rows.egg_moves = egg_moves;
    rows.level_moves = level_moves;

    ui.set_progress(5, steps, "evolution");
    let species = ctx.species_nodes();
    let conditions = ctx.evolution_conditions();
    let topology = build_topology(&species, &entities, &conditions)?;
    rows.evolution_members = topology.members;
    rows.evolution_edges = topology.edges;

    ui.set_progress(steps, steps, "normalized");
    ui.clear_progress();

    if !topology.repaired_species.is_empty() {
        ui.log(format!(
            "Treated {} species with a missing or cross-chain parent as chain roots: {:?}",
            topology.repaired_species.len(),
            topology.repaired_species
        ));
    }
    if ctx.dropped() > 0 {
        ui.log(format!("Dropped {} rows with dangling references", ctx.dropped()));
    }
    ui.log(format!(
        "Normalized {} pokemon into {} rows",
        rows.pokemon.len(),
        rows.total_rows()
    ));

    Ok(rows)
}
