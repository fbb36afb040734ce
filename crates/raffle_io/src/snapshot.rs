//! Snapshot loader: read one local JSON file (config, entrants, exclusions,
//! result history), validate cross-references, and return the typed
//! `Snapshot` the pipeline draws against. No network I/O.
//!
//! Wire shape:
//! ```json
//! {
//!   "config":   { "name": "Annual raffle",
//!                 "categories": [ { "key": "firstPrize", "name": "First prize",
//!                                   "count": 1, "preset": "10,20" } ] },
//!   "entrants": [ { "key": 10, "name": "Ada", "allowedPrizes": ["firstPrize"] } ],
//!   "exclude":  [ { "key": 99, "name": "Host" } ],
//!   "result":   { "firstPrize": [1, 2] }
//! }
//! ```
//! `preset` may also be an array of ids. `exclude`, `result`, `preset` and
//! `allowedPrizes` are optional.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use raffle_core::{
    entities::{CategorySpec, DrawConfig, Entrant, PresetList, ResultHistory},
    ids::{CategoryId, EntrantId},
};

use crate::{hasher, looks_like_url_strict, IoError, IoResult};

/// Snapshot files larger than this are rejected before parsing.
pub const MAX_SNAPSHOT_BYTES: u64 = 16 * 1024 * 1024;

// ----------------------------- Public wire-facing types -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDoc {
    pub config: ConfigDoc,
    pub entrants: Vec<EntrantDoc>,
    #[serde(default)]
    pub exclude: Vec<ExcludeDoc>,
    #[serde(default)]
    pub result: BTreeMap<String, Vec<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDoc {
    #[serde(default)]
    pub name: String,
    pub categories: Vec<CategoryDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDoc {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetDoc>,
}

/// Preset as typed by an organiser ("10, 20") or as a list of ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetDoc {
    Text(String),
    Ids(Vec<u64>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrantDoc {
    pub key: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "allowedPrizes", skip_serializing_if = "Vec::is_empty")]
    pub allowed_prizes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludeDoc {
    pub key: u64,
    #[serde(default)]
    pub name: String,
}

// ----------------------------- Typed snapshot -----------------------------

/// Validated draw state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub config: DrawConfig,
    pub entrants: Vec<Entrant>,
    pub excluded: BTreeSet<EntrantId>,
    /// Names carried by `exclude` entries; excluded people need no entrant record.
    pub excluded_names: BTreeMap<EntrantId, String>,
    pub history: ResultHistory,
}

impl Snapshot {
    pub fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    /// Display name for `id`, or the id itself when the entrant is unknown.
    pub fn display_name(&self, id: EntrantId) -> String {
        self.entrant(id)
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Name an `exclude` entry was listed under, falling back to [`Self::display_name`].
    pub fn excluded_name(&self, id: EntrantId) -> String {
        match self.excluded_names.get(&id) {
            Some(name) => name.clone(),
            None => self.display_name(id),
        }
    }
}

/// Snapshot plus the digest of the exact bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub sha256: String,
}

// ----------------------------- Orchestration -----------------------------

/// Read, parse and validate a snapshot file.
pub fn load_snapshot(path: &Path) -> IoResult<LoadedSnapshot> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Path(format!("snapshot must be a local file: {}", path.display())));
    }
    let f = File::open(path).map_err(IoError::Read)?;
    let mut buf = Vec::new();
    f.take(MAX_SNAPSHOT_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(IoError::Read)?;
    if buf.len() as u64 > MAX_SNAPSHOT_BYTES {
        return Err(IoError::Limit(format!(
            "snapshot exceeds {MAX_SNAPSHOT_BYTES} bytes: {}",
            path.display()
        )));
    }
    parse_loaded(&buf)
}

/// Parse in-memory bytes, keeping their digest alongside.
pub fn parse_loaded(bytes: &[u8]) -> IoResult<LoadedSnapshot> {
    let snapshot = parse_snapshot(bytes)?;
    Ok(LoadedSnapshot { snapshot, sha256: hasher::sha256_hex(bytes) })
}

/// Parse and validate snapshot JSON already in memory.
pub fn parse_snapshot(bytes: &[u8]) -> IoResult<Snapshot> {
    let doc: SnapshotDoc = serde_json::from_slice(bytes).map_err(|e| IoError::Json {
        pointer: format!("line {} column {}", e.line(), e.column()),
        msg: e.to_string(),
    })?;
    snapshot_from_doc(doc)
}

/// Convert the wire document into typed state, enforcing:
/// - category keys are valid tokens and unique
/// - entrant keys are unique
/// - every `allowedPrizes` / `result` category is configured
pub fn snapshot_from_doc(doc: SnapshotDoc) -> IoResult<Snapshot> {
    let config = build_config(doc.config)?;
    let entrants = build_entrants(doc.entrants, &config)?;
    let excluded = doc.exclude.iter().map(|x| EntrantId::new(x.key)).collect();
    let mut excluded_names = BTreeMap::new();
    for x in doc.exclude.into_iter().filter(|x| !x.name.is_empty()) {
        excluded_names.entry(EntrantId::new(x.key)).or_insert(x.name);
    }
    let history = build_history(doc.result, &config)?;
    Ok(Snapshot { config, entrants, excluded, excluded_names, history })
}

/// Inverse of `snapshot_from_doc`; config order and entrant order are kept.
pub fn snapshot_to_doc(s: &Snapshot) -> SnapshotDoc {
    let categories = s
        .config
        .ordered()
        .into_iter()
        .map(|(key, spec)| CategoryDoc {
            key: key.to_string(),
            name: spec.name.clone(),
            count: spec.count,
            preset: spec.preset.as_ref().map(|p| PresetDoc::Text(p.to_string())),
        })
        .collect();
    SnapshotDoc {
        config: ConfigDoc { name: s.config.name.clone(), categories },
        entrants: s
            .entrants
            .iter()
            .map(|e| EntrantDoc {
                key: e.id.get(),
                name: e.display_name.clone(),
                allowed_prizes: e.allowed_categories.iter().map(ToString::to_string).collect(),
            })
            .collect(),
        exclude: s
            .excluded
            .iter()
            .map(|id| ExcludeDoc { key: id.get(), name: s.excluded_name(*id) })
            .collect(),
        result: s
            .history
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|id| id.get()).collect()))
            .collect(),
    }
}

// ----------------------------- Validation helpers -----------------------------

fn category_key(raw: &str, at: &str) -> IoResult<CategoryId> {
    raw.parse::<CategoryId>()
        .map_err(|e| IoError::Invalid(format!("{at}: {e} '{raw}'")))
}

fn build_config(doc: ConfigDoc) -> IoResult<DrawConfig> {
    let mut cfg = DrawConfig::new(doc.name);
    for (i, c) in doc.categories.into_iter().enumerate() {
        let key = category_key(&c.key, &format!("config.categories[{i}].key"))?;
        if cfg.is_known(key.as_str()) {
            return Err(IoError::Invalid(format!("duplicate category key '{key}'")));
        }
        let preset = c.preset.map(|p| match p {
            PresetDoc::Text(s) => PresetList::parse(&s),
            PresetDoc::Ids(v) => PresetList::from_ids(v.into_iter().filter(|&k| k != 0).map(EntrantId::new)),
        });
        let name = if c.name.is_empty() { key.to_string() } else { c.name };
        cfg = cfg.with_category(key, CategorySpec { name, count: c.count, preset });
    }
    Ok(cfg)
}

fn build_entrants(docs: Vec<EntrantDoc>, config: &DrawConfig) -> IoResult<Vec<Entrant>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(docs.len());
    for (i, d) in docs.into_iter().enumerate() {
        if !seen.insert(d.key) {
            return Err(IoError::Invalid(format!("duplicate entrant key {}", d.key)));
        }
        let mut allowed = BTreeSet::new();
        for (j, raw) in d.allowed_prizes.iter().enumerate() {
            let key = category_key(raw, &format!("entrants[{i}].allowedPrizes[{j}]"))?;
            if !config.is_known(key.as_str()) {
                return Err(IoError::Invalid(format!(
                    "entrant {} allowed for unknown category '{key}'",
                    d.key
                )));
            }
            allowed.insert(key);
        }
        out.push(Entrant::new(d.key, d.name).restricted_to(allowed));
    }
    Ok(out)
}

fn build_history(result: BTreeMap<String, Vec<u64>>, config: &DrawConfig) -> IoResult<ResultHistory> {
    let mut map = BTreeMap::new();
    for (raw, winners) in result {
        let key = category_key(&raw, "result")?;
        if !config.is_known(key.as_str()) {
            return Err(IoError::Invalid(format!("result recorded for unknown category '{key}'")));
        }
        map.insert(key, winners.into_iter().map(EntrantId::new).collect());
    }
    Ok(ResultHistory::from_map(map))
}
