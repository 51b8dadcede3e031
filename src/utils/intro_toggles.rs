//! Voice-join intros: which clip belongs to which user, and whether each user
//! currently wants theirs played.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

use super::store::{StoreError, StoreResult, read_optional, split_pair, write_whole};

pub const INTROS_FILE: &str = "intros.json";
pub const INTRO_TOGGLE_FILE: &str = "intro_toggle.csv";

/// Loads the user to clip mapping from `intros.json`.
///
/// The file is a JSON object keyed by user id, e.g. `{"1234": "intros/me.mp3"}`.
/// Relative clip paths are resolved against the data directory. A missing file
/// means no intros are configured.
pub fn load_intro_clips(data_dir: &Path) -> StoreResult<HashMap<u64, PathBuf>> {
    let path = data_dir.join(INTROS_FILE);
    let Some(contents) = read_optional(&path)? else {
        return Ok(HashMap::new());
    };

    let entries: HashMap<u64, PathBuf> =
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

    Ok(entries
        .into_iter()
        .map(|(user_id, clip)| {
            let clip = if clip.is_absolute() {
                clip
            } else {
                data_dir.join(clip)
            };
            (user_id, clip)
        })
        .collect())
}

/// Per-user intro on/off switches backed by `intro_toggle.csv`.
#[derive(Debug)]
pub struct IntroToggles {
    path: PathBuf,
    toggles: BTreeMap<u64, bool>,
}

impl IntroToggles {
    /// Loads the toggle file. Users with a configured clip but no row yet are
    /// switched on, and the file is rewritten if any were added.
    pub fn load(path: PathBuf, configured: impl IntoIterator<Item = u64>) -> StoreResult<Self> {
        let mut toggles = match read_optional(&path)? {
            Some(contents) => Self::parse(&path, &contents)?,
            None => BTreeMap::new(),
        };

        let before = toggles.len();
        for user_id in configured {
            toggles.entry(user_id).or_insert(true);
        }

        let store = Self { path, toggles };
        if store.toggles.len() != before {
            info!("Enabled intros for {} new users", store.toggles.len() - before);
            store.save()?;
        }
        Ok(store)
    }

    fn parse(path: &Path, contents: &str) -> StoreResult<BTreeMap<u64, bool>> {
        let mut toggles = BTreeMap::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (user, enabled) = split_pair(path, index, line)?;
            let malformed = |reason: String| StoreError::Malformed {
                path: path.to_path_buf(),
                line: index + 1,
                reason,
            };
            let user = user
                .parse::<u64>()
                .map_err(|e| malformed(format!("bad user id '{}': {}", user, e)))?;
            let enabled = match enabled.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => return Err(malformed(format!("bad toggle '{}'", other))),
            };
            toggles.insert(user, enabled);
        }
        Ok(toggles)
    }

    pub fn is_enabled(&self, user_id: u64) -> bool {
        self.toggles.get(&user_id).copied().unwrap_or(false)
    }

    /// Flips the user's switch, persists it and returns the new value.
    pub fn toggle(&mut self, user_id: u64) -> StoreResult<bool> {
        let enabled = self.toggles.entry(user_id).or_insert(false);
        *enabled = !*enabled;
        let enabled = *enabled;
        self.save()?;
        Ok(enabled)
    }

    fn save(&self) -> StoreResult<()> {
        let contents: String = self
            .toggles
            .iter()
            .map(|(user, enabled)| format!("{},{}\n", user, enabled))
            .collect();
        write_whole(&self.path, &contents)
    }
}
