//! End-to-end tests: fixture CSV directory → normalized rows → SQLite store → queries.
//!
//! The fixture is a tiny slice of the PokeAPI export covering one linear
//! chain with mega and gigantamax variants, a branching chain, an orphaned
//! species and a recent-generation entity.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rusqlite::Connection;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

use pokewiki_db::config::{Languages, SCHEMA_VERSION};
use pokewiki_db::download::{DirSource, SourceTables, SOURCE_TABLES};
use pokewiki_db::normalize::{normalize, DamageFactors};
use pokewiki_db::schema::ALL_TABLES;
use pokewiki_db::store::{inspect_store, refresh_store, Refresh, Store, StoreStatus};
use pokewiki_db::{ensure_store, DatasetError, SilentUi};

// =============================================================================
// Fixture Data
// =============================================================================

/// Random seed for reproducible sampling
const RANDOM_SEED: u64 = 42;

const FIXTURE_TABLES: &[(&str, &str)] = &[
    ("languages", "id,iso639,iso3166,identifier,official,order\n3,ko,kr,ko,1,3\n9,en,us,en,1,9\n"),
    (
        "pokemon_species",
        "id,identifier,generation_id,evolves_from_species_id,evolution_chain_id,order\n\
         1,bulbasaur,1,,1,1\n\
         2,ivysaur,1,1,1,2\n\
         3,venusaur,1,2,1,3\n\
         133,eevee,1,,67,133\n\
         134,vaporeon,1,133,67,134\n\
         135,jolteon,1,133,67,135\n\
         800,lonely,7,999,500,800\n\
         906,sprigatito,9,,470,906\n",
    ),
    (
        "pokemon_species_names",
        "pokemon_species_id,local_language_id,name,genus\n\
         1,3,이상해씨,씨앗포켓몬\n\
         1,9,Bulbasaur,Seed Pokémon\n\
         2,3,이상해풀,씨앗포켓몬\n\
         3,3,이상해꽃,씨앗포켓몬\n\
         133,3,이브이,진화포켓몬\n\
         134,3,샤미드,거품뿜기포켓몬\n\
         135,3,쥬피썬더,번개포켓몬\n\
         906,3,나오하,풀고양이포켓몬\n",
    ),
    (
        "pokemon",
        "id,identifier,species_id,height,weight,base_experience,order,is_default\n\
         1,bulbasaur,1,7,69,64,1,1\n\
         2,ivysaur,2,10,130,142,2,1\n\
         3,venusaur,3,20,1000,263,3,1\n\
         10033,venusaur-mega,3,24,1555,281,4,0\n\
         10195,venusaur-gmax,3,240,10000,263,5,0\n\
         133,eevee,133,3,65,65,200,1\n\
         134,vaporeon,134,10,290,184,201,1\n\
         135,jolteon,135,8,245,184,202,1\n\
         800,lonely,800,5,50,50,,1\n\
         906,sprigatito,906,4,41,62,1100,1\n",
    ),
    (
        "pokemon_forms",
        "id,identifier,form_identifier,pokemon_id,introduced_in_version_group_id,is_default,is_battle_only,is_mega,form_order,order\n\
         1,bulbasaur,,1,1,1,0,0,1,1\n\
         2,ivysaur,,2,1,1,0,0,1,2\n\
         3,venusaur,,3,1,1,0,0,1,3\n\
         10033,venusaur-mega,mega,10033,15,1,1,1,2,4\n\
         10195,venusaur-gmax,gmax,10195,20,1,1,0,3,5\n\
         133,eevee,,133,1,1,0,0,1,200\n\
         134,vaporeon,,134,1,1,0,0,1,201\n\
         135,jolteon,,135,1,1,0,0,1,202\n\
         906,sprigatito,,906,25,1,0,0,1,1100\n",
    ),
    (
        "pokemon_form_names",
        "pokemon_form_id,local_language_id,form_name,pokemon_name\n\
         10033,3,메가,메가이상해꽃\n\
         10195,3,,\n",
    ),
    (
        "version_groups",
        "id,identifier,generation_id,order\n1,red-blue,1,1\n15,x-y,6,15\n20,sword-shield,8,20\n25,scarlet-violet,9,25\n",
    ),
    (
        "pokemon_evolution",
        "id,evolved_species_id,evolution_trigger_id,trigger_item_id,minimum_level,gender_id,location_id,held_item_id,time_of_day,known_move_id,known_move_type_id,minimum_happiness\n\
         1,2,1,,16,,,,,,,\n\
         2,3,1,,32,,,,,,,\n\
         3,134,3,84,,,,,,,,\n\
         4,135,3,83,,,,,,,,\n",
    ),
    ("evolution_triggers", "id,identifier\n1,level-up\n2,trade\n3,use-item\n"),
    (
        "evolution_trigger_prose",
        "evolution_trigger_id,local_language_id,name\n1,3,레벨업\n2,3,통신교환\n3,3,아이템 사용\n",
    ),
    ("items", "id,identifier,category_id,cost\n83,thunder-stone,10,3000\n84,water-stone,10,3000\n"),
    ("item_names", "item_id,local_language_id,name\n84,3,물의돌\n84,9,Water Stone\n"),
    (
        "stats",
        "id,damage_class_id,identifier,is_battle_only,game_index\n\
         1,,hp,0,1\n2,2,attack,0,2\n3,2,defense,0,3\n4,3,special-attack,0,5\n5,3,special-defense,0,6\n6,,speed,0,4\n7,,accuracy,1,\n",
    ),
    (
        "pokemon_stats",
        "pokemon_id,stat_id,base_stat,effort\n\
         1,1,45,0\n1,2,49,0\n1,3,49,0\n1,4,65,1\n1,5,65,0\n1,6,45,0\n1,7,100,0\n\
         3,1,80,0\n3,2,82,0\n3,3,83,0\n3,4,100,2\n3,5,100,1\n\
         999,1,10,0\n",
    ),
    (
        "abilities",
        "id,identifier,generation_id,is_main_series\n34,chlorophyll,3,1\n65,overgrow,3,1\n50,run-away,3,1\n",
    ),
    ("ability_names", "ability_id,local_language_id,name\n65,3,심록\n50,3,도주\n"),
    (
        "ability_prose",
        "ability_id,local_language_id,short_effect,effect\n\
         65,9,Strengthens grass moves to inflict 1.5× damage at 1/3 max HP or less.,\n\
         50,3,,\n",
    ),
    (
        "ability_flavor_text",
        "ability_id,version_group_id,language_id,flavor_text\n\
         34,15,3,맑을 때 스피드가 올라간다.\n\
         34,20,3,\"날씨가 맑을 때\n스피드가 올라간다.\"\n\
         34,20,9,Boosts the Pokémon's Speed stat in harsh sunlight.\n",
    ),
    (
        "pokemon_abilities",
        "pokemon_id,ability_id,is_hidden,slot\n1,34,1,3\n1,65,0,1\n133,50,0,1\n",
    ),
    (
        "pokemon_types",
        "pokemon_id,type_id,slot\n\
         1,12,1\n1,4,2\n2,12,1\n2,4,2\n3,12,1\n3,4,2\n10033,12,1\n10033,4,2\n10195,12,1\n10195,4,2\n\
         133,1,1\n134,11,1\n135,13,1\n800,8,1\n906,12,1\n",
    ),
    (
        "type_names",
        "type_id,local_language_id,name\n1,3,노말\n4,3,독\n8,3,고스트\n11,3,물\n12,3,풀\n13,3,전기\n12,9,Grass\n",
    ),
    (
        "type_efficacy",
        "damage_type_id,target_type_id,damage_factor\n\
         11,12,50\n12,12,50\n13,12,50\n4,4,50\n8,4,200\n8,8,200\n8,1,0\n1,8,0\n12,11,200\n13,11,200\n11,11,50\n",
    ),
    ("pokemon_move_methods", "id,identifier\n1,level-up\n2,egg\n4,machine\n"),
    (
        "moves",
        "id,identifier,generation_id,type_id,power,pp,accuracy,priority,target_id,damage_class_id,effect_id,effect_chance\n\
         29,headbutt,1,1,70,15,100,0,10,2,32,30\n\
         33,tackle,1,1,40,35,100,0,10,2,1,\n\
         45,growl,1,1,,40,100,0,11,1,19,\n\
         75,razor-leaf,1,12,55,25,95,0,11,2,44,\n\
         999,mystery,9,1,,,,0,10,9,1,\n",
    ),
    ("move_names", "move_id,local_language_id,name\n33,3,몸통박치기\n45,3,울음소리\n75,3,잎날가르기\n"),
    (
        "move_effect_prose",
        "move_effect_id,local_language_id,short_effect,effect\n\
         1,9,Inflicts [regular damage]{mechanic:regular-damage} with no additional effect.,\n\
         19,9,Lowers the target's [Attack]{mechanic:attack} by one [stage]{mechanic:stat-modifier}.,\n\
         32,9,Has a $effect_chance% chance to make the target [flinch]{mechanic:flinch}.,\n\
         44,9,Has an increased chance for a critical hit.,\n",
    ),
    (
        "move_flavor_text",
        "move_id,version_group_id,language_id,flavor_text\n75,20,3,급소에 맞기 쉽다.\n",
    ),
    ("move_damage_classes", "id,identifier\n1,status\n2,physical\n3,special\n"),
    (
        "move_damage_class_prose",
        "move_damage_class_id,local_language_id,name,description\n1,3,변화,\n2,3,물리,\n",
    ),
    (
        "pokemon_moves",
        "pokemon_id,version_group_id,move_id,pokemon_move_method_id,level,order\n\
         1,1,33,1,1,1\n\
         1,20,33,1,1,1\n\
         1,1,45,1,3,2\n\
         1,20,75,1,20,\n\
         1,1,29,2,0,\n\
         1,20,29,2,0,\n\
         1,1,75,4,0,\n\
         1,1,999,1,9,\n\
         133,1,33,1,1,\n\
         999,1,33,1,1,\n\
         1,1,404,1,5,\n",
    ),
];

fn write_fixture(dir: &Path) {
    fs::create_dir_all(dir).expect("Failed to create fixture dir");
    for (name, csv) in FIXTURE_TABLES {
        fs::write(dir.join(format!("{}.csv", name)), csv).expect("Failed to write fixture table");
    }
}

// =============================================================================
// Shared Test Store
// =============================================================================

/// Shared store - built once and reused by the read-only tests
static TEST_STORE: Lazy<Mutex<TestStore>> = Lazy::new(|| Mutex::new(TestStore::new()));

struct TestStore {
    dir: TempDir,
    csv_dir: PathBuf,
    db_path: PathBuf,
}

impl TestStore {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let csv_dir = dir.path().join("csv");
        write_fixture(&csv_dir);
        let db_path = dir.path().join("pokewiki.db");

        let mut ui = SilentUi::new();
        ensure_store(&db_path, &DirSource::new(&csv_dir), &Languages::default(), &mut ui)
            .expect("Failed to build fixture store");

        Self { dir, csv_dir, db_path }
    }

    fn store(&self) -> Store {
        Store::open(&self.db_path).expect("Failed to open store")
    }

    fn connection(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open database")
    }

    /// A scratch path for tests that build their own store
    fn scratch(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        for suffix in ["", "-wal", "-shm"] {
            fs::remove_file(format!("{}{}", path.display(), suffix)).ok();
        }
        path
    }
}

fn fixture() -> MutexGuard<'static, TestStore> {
    TEST_STORE.lock().unwrap_or_else(|e| e.into_inner())
}

fn load_tables(csv_dir: &Path) -> SourceTables {
    let mut ui = SilentUi::new();
    SourceTables::load(&DirSource::new(csv_dir), &mut ui).expect("Failed to load fixture tables")
}

/// Every row of every table, sorted, as text
fn dump(conn: &Connection) -> Vec<String> {
    let mut out = Vec::new();
    for schema in ALL_TABLES {
        let columns = schema.column_names().join(" || '|' || ");
        let sql = format!("SELECT '{}|' || {} FROM {}", schema.name, columns, schema.name);
        let mut stmt = conn.prepare(&sql).unwrap();
        let rows = stmt
            .query_map([], |r| r.get::<_, Option<String>>(0))
            .unwrap()
            .map(|r| r.unwrap().unwrap_or_default());
        out.extend(rows);
    }
    out.sort();
    out
}

// =============================================================================
// Store Contents
// =============================================================================

#[test]
fn test_fixture_store_is_ready() {
    let fx = fixture();
    assert_eq!(inspect_store(&fx.db_path), StoreStatus::Ready);

    let conn = fx.connection();
    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
    assert_eq!(version, SCHEMA_VERSION);
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM pokemon", [], |r| r.get(0)).unwrap();
    assert_eq!(count, 10);
}

#[test]
fn test_display_names() {
    let fx = fixture();
    let conn = fx.connection();
    let names: HashMap<i64, (String, String)> = conn
        .prepare("SELECT id, name, display_name FROM pokemon")
        .unwrap()
        .query_map([], |r| Ok((r.get(0)?, (r.get(1)?, r.get(2)?))))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(names[&1].1, "이상해씨");
    assert_eq!(names[&10033], ("이상해꽃".to_string(), "메가이상해꽃".to_string()));
    assert_eq!(names[&10195].1, "이상해꽃 (venusaur-gmax)");
    assert_eq!(names[&800], ("lonely".to_string(), "lonely".to_string()));
}

#[test]
fn test_form_metadata() {
    let fx = fixture();
    let conn = fx.connection();
    let meta = |id: i64| -> (bool, bool, bool, i64, i64) {
        conn.query_row(
            "SELECT is_default, is_mega, is_gmax, introduced_generation, sort_order
             FROM pokemon_form_meta WHERE pokemon_id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
        )
        .unwrap()
    };

    assert_eq!(meta(3), (true, false, false, 1, 3));
    assert_eq!(meta(10033), (false, true, false, 6, 4));
    assert_eq!(meta(10195), (false, false, true, 8, 5));
    // No form row at all
    assert_eq!(meta(800), (true, false, false, 7, 99_999));

    let recent: bool = conn
        .query_row("SELECT is_recent FROM pokemon WHERE id = 906", [], |r| r.get(0))
        .unwrap();
    assert!(recent);
}

#[test]
fn test_stats_sum_to_total() {
    let fx = fixture();
    let store = fx.store();

    let bulbasaur = store.pokemon(1).unwrap().unwrap();
    assert_eq!(bulbasaur.stats.len(), 6);
    assert_eq!(bulbasaur.stat_total, 318);
    assert_eq!(bulbasaur.stats.iter().map(|s| s.value).sum::<i64>(), bulbasaur.stat_total);

    let venusaur = store.pokemon(3).unwrap().unwrap();
    let speed = venusaur.stats.iter().find(|s| s.key == "speed").unwrap();
    assert_eq!(speed.value, 0);
    assert_eq!(venusaur.stat_total, 445);

    let mega = store.pokemon(10033).unwrap().unwrap();
    assert!(mega.stats.iter().all(|s| s.value == 0));
    assert_eq!(mega.stat_total, 0);
}

#[test]
fn test_dangling_rows_are_dropped() {
    let fx = fixture();
    let conn = fx.connection();
    for table in ["pokemon_stat", "pokemon_level_move", "pokemon_egg_move"] {
        let orphans: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE pokemon_id NOT IN (SELECT id FROM pokemon)",
                    table
                ),
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0, "{} has dangling rows", table);
    }
}

// =============================================================================
// Evolution Topology
// =============================================================================

#[test]
fn test_depth_increases_along_parent_edges() {
    let fx = fixture();
    let conn = fx.connection();

    let depths: HashMap<(i64, i64), i64> = conn
        .prepare(
            "SELECT m.chain_id, p.species_id, m.depth
             FROM evolution_member m JOIN pokemon p ON p.id = m.pokemon_id",
        )
        .unwrap()
        .query_map([], |r| Ok(((r.get(0)?, r.get(1)?), r.get(2)?)))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    let tables = load_tables(&fx.csv_dir);
    for species in tables.get("pokemon_species").records() {
        let chain = species.int("evolution_chain_id", 0);
        let id = species.int("id", 0);
        let Some(parent) = species.opt("evolves_from_species_id") else {
            continue;
        };
        let parent: i64 = parent.parse().unwrap();
        if let (Some(child), Some(parent)) = (depths.get(&(chain, id)), depths.get(&(chain, parent))) {
            assert_eq!(*child, parent + 1, "species {} in chain {}", id, chain);
        }
    }

    let mut chains: Vec<i64> = depths.keys().map(|(chain, _)| *chain).collect();
    chains.sort_unstable();
    chains.dedup();
    assert_eq!(chains, vec![1, 67, 470, 500]);
    for chain in chains {
        assert!(
            depths.iter().any(|((c, _), d)| *c == chain && *d == 0),
            "chain {} has no root",
            chain
        );
    }

    // The orphan's missing parent is repaired into a root
    assert_eq!(depths[&(500, 800)], 0);
}

#[test]
fn test_mega_edge_sorts_after_evolution() {
    let fx = fixture();
    let detail = fx.store().pokemon(2).unwrap().unwrap();

    let edges: Vec<(i64, i64, &str)> = detail
        .evolution_edges
        .iter()
        .map(|e| (e.from, e.to, e.condition.as_str()))
        .collect();
    assert_eq!(
        edges,
        vec![
            (1, 2, "Lv.16"),
            (2, 3, "Lv.32"),
            (3, 10033, "메가진화"),
            (3, 10195, "거다이맥스"),
        ]
    );

    let tree: Vec<(i64, i64, bool)> = detail
        .evolution_tree
        .iter()
        .map(|n| (n.depth, n.pokemon_id, n.is_special))
        .collect();
    assert_eq!(
        tree,
        vec![
            (0, 1, false),
            (1, 2, false),
            (2, 3, false),
            (2, 10033, true),
            (2, 10195, true),
        ]
    );
}

#[test]
fn test_branching_item_conditions() {
    let fx = fixture();
    let detail = fx.store().pokemon(133).unwrap().unwrap();

    let conditions: Vec<&str> = detail.evolution_edges.iter().map(|e| e.condition.as_str()).collect();
    assert_eq!(conditions, vec!["물의돌 사용", "thunder-stone 사용"]);
}

// =============================================================================
// Text Resolution
// =============================================================================

#[test]
fn test_ability_text() {
    let fx = fixture();
    let detail = fx.store().pokemon(1).unwrap().unwrap();

    let abilities: Vec<(&str, bool)> = detail
        .abilities
        .iter()
        .map(|a| (a.name.as_str(), a.hidden))
        .collect();
    assert_eq!(abilities, vec![("심록", false), ("chlorophyll", true)]);

    assert!(detail.abilities[0].description.starts_with("(영문 설명)"));
    assert_eq!(detail.abilities[1].description, "날씨가 맑을 때 스피드가 올라간다.");
}

#[test]
fn test_level_moves() {
    let fx = fixture();
    let detail = fx.store().pokemon(1).unwrap().unwrap();

    let moves: Vec<(Option<i64>, &str, &str)> = detail
        .level_moves
        .iter()
        .map(|m| (m.level, m.name.as_str(), m.effect.as_str()))
        .collect();
    assert_eq!(
        moves,
        vec![
            (Some(1), "몸통박치기", "추가 효과 없이 일반적인 데미지를 준다."),
            (Some(3), "울음소리", "상대의 공격(을/를) 1랭크 떨어뜨린다."),
            (Some(9), "mystery", "추가 효과 없이 일반적인 데미지를 준다."),
            (Some(20), "잎날가르기", "급소에 맞기 쉽다."),
        ]
    );

    let growl = &detail.level_moves[1];
    assert_eq!(growl.damage_class, "변화");
    assert_eq!(growl.power, 0);
    assert_eq!(detail.level_moves[2].damage_class, "미상");
    assert!(detail.level_moves[2].is_recent);
}

#[test]
fn test_egg_moves_substitute_chance() {
    let fx = fixture();
    let detail = fx.store().pokemon(1).unwrap().unwrap();

    assert_eq!(detail.egg_moves.len(), 1);
    let headbutt = &detail.egg_moves[0];
    assert_eq!(headbutt.name, "headbutt");
    assert_eq!(headbutt.level, None);
    assert_eq!(headbutt.effect, "30% 확률로 상대를 풀죽게 한다.");
}

#[test]
fn test_move_keys_are_unique() {
    let fx = fixture();
    let conn = fx.connection();

    let egg_dupes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (SELECT pokemon_id, move_identifier FROM pokemon_egg_move
             GROUP BY pokemon_id, move_identifier HAVING COUNT(*) > 1)",
            [],
            |r| r.get(0),
        )
        .unwrap();
    let level_dupes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (SELECT pokemon_id, move_identifier, learn_level FROM pokemon_level_move
             GROUP BY pokemon_id, move_identifier, learn_level HAVING COUNT(*) > 1)",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!((egg_dupes, level_dupes), (0, 0));
}

// =============================================================================
// Type Matchups
// =============================================================================

#[test]
fn test_bulbasaur_matchups() {
    let fx = fixture();
    let m = fx.store().pokemon(1).unwrap().unwrap().type_matchups;

    let names = |bucket: &[pokewiki_db::normalize::TypeMultiplier]| -> Vec<String> {
        bucket.iter().map(|t| t.type_name.clone()).collect()
    };
    assert_eq!(names(&m.weakness), vec!["고스트"]);
    assert_eq!(names(&m.resistance), vec!["독", "물", "전기", "풀"]);
    assert!(m.immune.is_empty());

    let eevee = fx.store().pokemon(133).unwrap().unwrap().type_matchups;
    assert_eq!(names(&eevee.immune), vec!["고스트"]);
    assert_eq!(eevee.immune[0].multiplier, 0.0);
}

#[test]
fn test_matchups_partition_known_types() {
    let fx = fixture();
    let store = fx.store();
    let conn = fx.connection();

    let known: Vec<i64> = conn
        .prepare("SELECT DISTINCT type_id FROM pokemon_type")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .map(Result::unwrap)
        .collect();
    let factors = DamageFactors::new(
        conn.prepare("SELECT attack_type_id, target_type_id, damage_factor FROM type_efficacy")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .map(Result::unwrap)
            .collect::<Vec<(i64, i64, i64)>>(),
    );
    let neutral_count = |defending: &[i64]| {
        known
            .iter()
            .filter(|&&atk| factors.combined(atk, defending) == 1.0)
            .count()
    };

    let mut rng = rand::rngs::StdRng::seed_from_u64(RANDOM_SEED);
    for _ in 0..20 {
        let defending: Vec<i64> = known.choose_multiple(&mut rng, 2).copied().collect();
        let m = store.matchups(&defending).unwrap();

        let bucketed = m.weakness.len() + m.resistance.len() + m.immune.len();
        assert_eq!(bucketed + neutral_count(&defending), known.len());
        assert!(m.weakness.iter().all(|t| t.multiplier > 1.0));
        assert!(m.resistance.iter().all(|t| t.multiplier > 0.0 && t.multiplier < 1.0));
        assert!(m.immune.iter().all(|t| t.multiplier == 0.0));
        for bucket in [&m.weakness, &m.resistance, &m.immune] {
            assert!(bucket
                .windows(2)
                .all(|w| (w[0].multiplier, &w[0].type_name) <= (w[1].multiplier, &w[1].type_name)));
        }
    }
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_prefix() {
    let fx = fixture();
    let store = fx.store();

    let ids: Vec<i64> = store.search("이상해").unwrap().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![3, 10033, 10195, 1, 2]);

    let ids: Vec<i64> = store.search("메가").unwrap().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![10033]);

    assert!(store.search("").unwrap().is_empty());
    assert!(store.search("%").unwrap().is_empty());
    assert!(store.pokemon(424242).unwrap().is_none());
}

// =============================================================================
// Rebuilds
// =============================================================================

#[test]
fn test_normalize_is_idempotent() {
    let fx = fixture();
    let tables = load_tables(&fx.csv_dir);
    let mut ui = SilentUi::new();

    let first = normalize(&tables, &Languages::default(), &mut ui).unwrap();
    let second = normalize(&tables, &Languages::default(), &mut ui).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rebuild_produces_identical_store() {
    let fx = fixture();
    let other = fx.scratch("again.db");
    let mut ui = SilentUi::new();

    let outcome = refresh_store(&other, &DirSource::new(&fx.csv_dir), &Languages::default(), &mut ui).unwrap();
    assert!(matches!(outcome, Refresh::Rebuilt { .. }));

    let a = dump(&fx.connection());
    let b = dump(&Connection::open(&other).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_current_store_is_reused() {
    let fx = fixture();
    let mut ui = SilentUi::new();
    let outcome =
        refresh_store(&fx.db_path, &DirSource::new(&fx.csv_dir), &Languages::default(), &mut ui).unwrap();
    assert_eq!(outcome, Refresh::Reused);
}

#[test]
fn test_concurrent_startups_build_once() {
    let fx = fixture();
    let path = fx.scratch("shared.db");
    let source = DirSource::new(&fx.csv_dir);

    let outcomes: Vec<Refresh> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let mut ui = SilentUi::new();
                    refresh_store(&path, &source, &Languages::default(), &mut ui)
                        .expect("Concurrent refresh failed")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("Refresh thread panicked"))
            .collect()
    });

    let rebuilt = outcomes
        .iter()
        .filter(|o| matches!(o, Refresh::Rebuilt { .. }))
        .count();
    assert_eq!(rebuilt, 1);
    assert_eq!(outcomes.iter().filter(|o| **o == Refresh::Reused).count(), 7);
    assert_eq!(inspect_store(&path), StoreStatus::Ready);
}

#[test]
fn test_missing_column_triggers_rebuild() {
    let fx = fixture();
    let path = fx.scratch("stale.db");
    let source = DirSource::new(&fx.csv_dir);
    let mut ui = SilentUi::new();

    refresh_store(&path, &source, &Languages::default(), &mut ui).unwrap();
    Connection::open(&path)
        .unwrap()
        .execute_batch("ALTER TABLE pokemon_level_move DROP COLUMN effect_text")
        .unwrap();
    assert!(matches!(inspect_store(&path), StoreStatus::MissingColumns { .. }));

    let outcome = refresh_store(&path, &source, &Languages::default(), &mut ui).unwrap();
    assert!(matches!(outcome, Refresh::Rebuilt { .. }));
    assert_eq!(inspect_store(&path), StoreStatus::Ready);
}

#[test]
fn test_version_mismatch_triggers_rebuild() {
    let fx = fixture();
    let path = fx.scratch("old.db");
    let source = DirSource::new(&fx.csv_dir);
    let mut ui = SilentUi::new();

    refresh_store(&path, &source, &Languages::default(), &mut ui).unwrap();
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", SCHEMA_VERSION - 1)
        .unwrap();
    assert_eq!(
        inspect_store(&path),
        StoreStatus::VersionMismatch {
            found: SCHEMA_VERSION - 1
        }
    );

    let outcome = refresh_store(&path, &source, &Languages::default(), &mut ui).unwrap();
    assert!(matches!(outcome, Refresh::Rebuilt { .. }));
}

#[test]
fn test_failed_build_leaves_no_store() {
    let fx = fixture();
    let broken = fx.dir.path().join("broken-csv");
    write_fixture(&broken);
    fs::remove_file(broken.join(format!("{}.csv", SOURCE_TABLES[5]))).unwrap();

    // A stale store at the target is removed too
    let path = fx.scratch("failed.db");
    fs::write(&path, b"stale").unwrap();

    let mut ui = SilentUi::new();
    let err = refresh_store(&path, &DirSource::new(&broken), &Languages::default(), &mut ui).unwrap_err();
    assert!(matches!(err, DatasetError::Init { .. }));
    assert!(err.to_string().contains("데이터셋을 초기화할 수 없습니다"));
    assert!(!path.exists());
}

#[test]
fn test_evolution_cycle_fails_build() {
    let fx = fixture();
    let cyclic = fx.dir.path().join("cyclic-csv");
    write_fixture(&cyclic);
    fs::write(
        cyclic.join("pokemon_species.csv"),
        "id,identifier,generation_id,evolves_from_species_id,evolution_chain_id,order\n\
         1,bulbasaur,1,3,1,1\n\
         2,ivysaur,1,1,1,2\n\
         3,venusaur,1,2,1,3\n",
    )
    .unwrap();

    let path = fx.scratch("cyclic.db");
    let mut ui = SilentUi::new();
    let err = refresh_store(&path, &DirSource::new(&cyclic), &Languages::default(), &mut ui).unwrap_err();
    assert!(matches!(err, DatasetError::Init { .. }));
    assert!(!path.exists());
}
