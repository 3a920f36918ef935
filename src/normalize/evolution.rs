//! Evolution chain topology
//!
//! Species carry a parent pointer and a chain id; entities (playable
//! variants) hang off species. Depth is measured on the species graph, and
//! edges are drawn between entities: default variant to default variant for
//! real evolutions, default variant to alternate variant for special forms.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::DatasetError;
use crate::parser::{Record, SqlValue, ToSqlRow};

/// Spacing between depths in edge sort ordinals
pub const DEPTH_STRIDE: i64 = 10_000;

/// Special-form edges start halfway into their depth's band so they always
/// follow the ordinary edges of that depth
pub const SPECIAL_FORM_OFFSET: i64 = DEPTH_STRIDE / 2;

/// Sort ordinal used when an entity has none
pub const DEFAULT_SORT_ORDER: i64 = 99_999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesNode {
    pub id: i64,
    /// Slug of the species' base variant
    pub identifier: String,
    pub parent: Option<i64>,
    /// 0 when the species belongs to no chain
    pub chain_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNode {
    pub id: i64,
    pub species_id: i64,
    pub identifier: String,
    pub display_name: String,
    pub is_default: bool,
    pub is_mega: bool,
    pub is_gmax: bool,
    pub sort_order: i64,
}

impl EntityNode {
    /// Alternate appearances that are not evolutions of their own
    pub fn is_special(&self, species_identifier: &str) -> bool {
        self.is_mega || self.is_gmax || (!self.is_default && self.identifier != species_identifier)
    }

    fn special_form_label(&self) -> &'static str {
        if self.is_mega {
            "메가진화"
        } else if self.is_gmax {
            "거다이맥스"
        } else {
            "폼변화"
        }
    }
}

/// What it takes to evolve, in the order the wiki reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvolutionCondition {
    Level(i64),
    UseItem(String),
    HeldItem(String),
    Friendship(String),
    KnownMove,
    KnownMoveType,
    Location,
    TimeOfDay(String),
    Trade,
    Trigger(String),
    Unspecified,
}

/// Localized names needed to describe evolution triggers
#[derive(Debug, Default)]
pub struct ConditionNames {
    /// Item id → display name (localized, else slug)
    pub items: HashMap<String, String>,
    /// Trigger id → localized name
    pub trigger_names: HashMap<String, String>,
    /// Trigger id → slug
    pub trigger_identifiers: HashMap<String, String>,
}

impl EvolutionCondition {
    /// Read one `pokemon_evolution` row
    pub fn from_record(record: &Record<'_>, names: &ConditionNames) -> Self {
        let item_name = |id: &str, fallback: &str| {
            names
                .items
                .get(id)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let min_level = record.int("minimum_level", 0);
        if min_level > 0 {
            return EvolutionCondition::Level(min_level);
        }
        if let Some(item) = record.opt("trigger_item_id") {
            return EvolutionCondition::UseItem(item_name(item, "진화아이템"));
        }
        if let Some(item) = record.opt("held_item_id") {
            return EvolutionCondition::HeldItem(item_name(item, "아이템"));
        }
        if let Some(happiness) = record.opt("minimum_happiness") {
            return EvolutionCondition::Friendship(happiness.trim().to_string());
        }
        if record.opt("known_move_id").is_some() {
            return EvolutionCondition::KnownMove;
        }
        if record.opt("known_move_type_id").is_some() {
            return EvolutionCondition::KnownMoveType;
        }
        if record.opt("location_id").is_some() {
            return EvolutionCondition::Location;
        }
        if let Some(time) = record.opt("time_of_day") {
            return EvolutionCondition::TimeOfDay(time.trim().to_string());
        }
        if let Some(trigger) = record.opt("evolution_trigger_id") {
            let identifier = names.trigger_identifiers.get(trigger);
            if identifier.map(String::as_str) == Some("trade") {
                return EvolutionCondition::Trade;
            }
            let name = names
                .trigger_names
                .get(trigger)
                .or(identifier)
                .cloned()
                .unwrap_or_else(|| "진화".to_string());
            return EvolutionCondition::Trigger(name);
        }
        EvolutionCondition::Unspecified
    }

    pub fn label(&self) -> String {
        match self {
            EvolutionCondition::Level(level) => format!("Lv.{}", level),
            EvolutionCondition::UseItem(item) => format!("{} 사용", item),
            EvolutionCondition::HeldItem(item) => format!("{} 지니고", item),
            EvolutionCondition::Friendship(value) => format!("친밀도 {}+", value),
            EvolutionCondition::KnownMove => "특정 기술 습득".to_string(),
            EvolutionCondition::KnownMoveType => "특정 타입 기술 습득".to_string(),
            EvolutionCondition::Location => "특정 장소".to_string(),
            EvolutionCondition::TimeOfDay(time) => time.clone(),
            EvolutionCondition::Trade => "교환".to_string(),
            EvolutionCondition::Trigger(name) => name.clone(),
            EvolutionCondition::Unspecified => "진화".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EvolutionMember {
    pub chain_id: i64,
    pub depth: i64,
    pub pokemon_id: i64,
    pub display_name: String,
    pub is_special: bool,
    pub sort_order: i64,
}

impl ToSqlRow for EvolutionMember {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.chain_id.into(),
            self.depth.into(),
            self.pokemon_id.into(),
            self.display_name.as_str().into(),
            self.is_special.into(),
            self.sort_order.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EvolutionEdge {
    pub chain_id: i64,
    pub from_pokemon_id: i64,
    pub to_pokemon_id: i64,
    pub condition_text: String,
    pub sort_order: i64,
}

impl ToSqlRow for EvolutionEdge {
    fn to_sql_row(&self) -> Vec<SqlValue> {
        vec![
            self.chain_id.into(),
            self.from_pokemon_id.into(),
            self.to_pokemon_id.into(),
            self.condition_text.as_str().into(),
            self.sort_order.into(),
        ]
    }
}

/// Memoized species depth, keyed by (species, chain)
pub struct DepthResolver<'a> {
    species: HashMap<i64, &'a SpeciesNode>,
    memo: HashMap<(i64, i64), i64>,
    repaired: HashSet<i64>,
}

impl<'a> DepthResolver<'a> {
    pub fn new(species: &'a [SpeciesNode]) -> Self {
        Self {
            species: species.iter().map(|s| (s.id, s)).collect(),
            memo: HashMap::new(),
            repaired: HashSet::new(),
        }
    }

    /// Parent of `species_id` if it exists and sits in `chain_id`. A dangling
    /// or cross-chain parent makes the species a root and is remembered.
    fn parent_in_chain(&mut self, species_id: i64, chain_id: i64) -> Option<i64> {
        let parent = self.species.get(&species_id)?.parent?;
        match self.species.get(&parent) {
            Some(node) if node.chain_id == chain_id => Some(parent),
            _ => {
                self.repaired.insert(species_id);
                None
            }
        }
    }

    /// Distance of `species_id` from the root of `chain_id`
    pub fn depth(&mut self, species_id: i64, chain_id: i64) -> Result<i64, DatasetError> {
        if let Some(&depth) = self.memo.get(&(species_id, chain_id)) {
            return Ok(depth);
        }

        // Walk up until a memoized ancestor or a root, then assign downwards.
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut current = species_id;
        let anchor = loop {
            if let Some(&depth) = self.memo.get(&(current, chain_id)) {
                break Some(depth);
            }
            if !on_path.insert(current) {
                return Err(DatasetError::EvolutionCycle {
                    species_id: current,
                    chain_id,
                });
            }
            path.push(current);
            match self.parent_in_chain(current, chain_id) {
                Some(parent) => current = parent,
                None => break None,
            }
        };

        let mut next = anchor.map_or(0, |depth| depth + 1);
        for &node in path.iter().rev() {
            self.memo.insert((node, chain_id), next);
            next += 1;
        }

        Ok(self.memo[&(species_id, chain_id)])
    }

    /// Species whose parent pointer was ignored, sorted
    pub fn repaired(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.repaired.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Members and edges of every chain
#[derive(Debug, Default)]
pub struct Topology {
    pub members: Vec<EvolutionMember>,
    pub edges: Vec<EvolutionEdge>,
    /// Species treated as roots because their parent was missing or in another chain
    pub repaired_species: Vec<i64>,
}

/// Build chain membership and edges.
///
/// `conditions` maps an evolved species id to its trigger. Species without a
/// chain (id 0) are left out.
pub fn build_topology(
    species: &[SpeciesNode],
    entities: &[EntityNode],
    conditions: &HashMap<i64, EvolutionCondition>,
) -> Result<Topology, DatasetError> {
    let mut chains: BTreeMap<i64, Vec<&SpeciesNode>> = BTreeMap::new();
    for node in species.iter().filter(|s| s.chain_id > 0) {
        chains.entry(node.chain_id).or_default().push(node);
    }

    let mut by_species: HashMap<i64, Vec<&EntityNode>> = HashMap::new();
    let mut default_entity: HashMap<i64, i64> = HashMap::new();
    for entity in entities {
        by_species.entry(entity.species_id).or_default().push(entity);
        if entity.is_default {
            default_entity.insert(entity.species_id, entity.id);
        }
    }

    let mut resolver = DepthResolver::new(species);
    let mut topology = Topology::default();

    for (&chain_id, members) in &chains {
        for node in members {
            let depth = resolver.depth(node.id, chain_id)?;
            for entity in by_species.get(&node.id).into_iter().flatten() {
                topology.members.push(EvolutionMember {
                    chain_id,
                    depth,
                    pokemon_id: entity.id,
                    display_name: entity.display_name.clone(),
                    is_special: entity.is_special(&node.identifier),
                    sort_order: entity.sort_order,
                });
            }
        }

        for node in members {
            let Some(parent) = node.parent else {
                continue;
            };
            let (Some(&from), Some(&to)) = (default_entity.get(&parent), default_entity.get(&node.id))
            else {
                continue;
            };
            let depth = resolver.depth(node.id, chain_id)?;
            topology.edges.push(EvolutionEdge {
                chain_id,
                from_pokemon_id: from,
                to_pokemon_id: to,
                condition_text: conditions.get(&node.id).map(|c| c.label()).unwrap_or_default(),
                sort_order: depth * DEPTH_STRIDE + to,
            });
        }

        for node in members {
            let Some(&base) = default_entity.get(&node.id) else {
                continue;
            };
            let depth = resolver.depth(node.id, chain_id)?;
            for entity in by_species.get(&node.id).into_iter().flatten() {
                if entity.id == base {
                    continue;
                }
                topology.edges.push(EvolutionEdge {
                    chain_id,
                    from_pokemon_id: base,
                    to_pokemon_id: entity.id,
                    condition_text: entity.special_form_label().to_string(),
                    sort_order: depth * DEPTH_STRIDE
                        + SPECIAL_FORM_OFFSET
                        + entity.sort_order.clamp(0, SPECIAL_FORM_OFFSET - 1),
                });
            }
        }
    }

    topology.repaired_species = resolver.repaired();
    Ok(topology)
}
