//! Per-guild running counts of "your mom" jokes and swearing, persisted as
//! `guild_id,count` CSV files in the data directory.

use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::store::{StoreError, StoreResult, read_optional, split_pair, write_whole};

/// Matches the usual spellings of "your mom", case-insensitively.
static YOUR_MOM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:yo|your|ur|tu|ya)\s*(?:mama|mother|mum|mom|madre|mommy)")
        .expect("your-mom pattern is valid")
});

pub const YOUR_MOM_FILE: &str = "your_mom.csv";
pub const SWEAR_FILE: &str = "swears.csv";
pub const BAD_WORDS_FILE: &str = "bad_words.txt";

/// Words counted as swearing when no word list is configured.
const DEFAULT_BAD_WORDS: &[&str] = &[
    "ass", "asshole", "bastard", "bitch", "bollocks", "bullshit", "crap", "damn", "dick",
    "fuck", "fucking", "fucked", "goddamn", "hell", "piss", "prick", "shit", "shitty", "wanker",
];

pub fn mentions_your_mom(text: &str) -> bool {
    YOUR_MOM_REGEX.is_match(text)
}

/// A set of lowercase words that count as profanity.
#[derive(Debug, Clone)]
pub struct SwearList {
    words: HashSet<String>,
}

impl SwearList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && !w.starts_with('#'))
            .collect();
        Self { words }
    }

    /// Loads one word per line, falling back to a built-in list when the file is absent.
    pub fn load(path: &Path) -> StoreResult<Self> {
        match read_optional(path)? {
            Some(contents) => Ok(Self::new(contents.lines())),
            None => Ok(Self::new(DEFAULT_BAD_WORDS.iter())),
        }
    }

    pub fn contains_profanity(&self, text: &str) -> bool {
        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|token| !token.is_empty())
            .any(|token| self.words.contains(&token.to_lowercase()))
    }
}

/// One counter file, kept in file order.
#[derive(Debug)]
pub struct CounterFile {
    path: PathBuf,
    counts: Vec<(u64, u64)>,
}

impl CounterFile {
    pub fn load(path: PathBuf) -> StoreResult<Self> {
        let counts = match read_optional(&path)? {
            Some(contents) => Self::parse(&path, &contents)?,
            None => Vec::new(),
        };
        Ok(Self { path, counts })
    }

    fn parse(path: &Path, contents: &str) -> StoreResult<Vec<(u64, u64)>> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let (guild, count) = split_pair(path, index, line)?;
                let malformed = |reason: String| StoreError::Malformed {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason,
                };
                let guild = guild
                    .parse::<u64>()
                    .map_err(|e| malformed(format!("bad guild id '{}': {}", guild, e)))?;
                let count = count
                    .parse::<u64>()
                    .map_err(|e| malformed(format!("bad count '{}': {}", count, e)))?;
                Ok((guild, count))
            })
            .collect()
    }

    pub fn get(&self, guild_id: u64) -> u64 {
        self.counts
            .iter()
            .find(|(guild, _)| *guild == guild_id)
            .map_or(0, |(_, count)| *count)
    }

    /// Bumps the guild's count and rewrites the file.
    pub fn increment(&mut self, guild_id: u64) -> StoreResult<u64> {
        let count = match self.counts.iter_mut().find(|(guild, _)| *guild == guild_id) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                self.counts.push((guild_id, 1));
                1
            }
        };
        write_whole(&self.path, &self.render())?;
        debug!("{} now {} for guild {}", self.path.display(), count, guild_id);
        Ok(count)
    }

    fn render(&self) -> String {
        self.counts
            .iter()
            .map(|(guild, count)| format!("{},{}\n", guild, count))
            .collect()
    }
}

/// Both counters plus the word list they are driven by.
#[derive(Debug)]
pub struct Counters {
    your_mom: CounterFile,
    swears: CounterFile,
    swear_words: SwearList,
}

impl Counters {
    pub fn load(data_dir: &Path) -> StoreResult<Self> {
        Ok(Self {
            your_mom: CounterFile::load(data_dir.join(YOUR_MOM_FILE))?,
            swears: CounterFile::load(data_dir.join(SWEAR_FILE))?,
            swear_words: SwearList::load(&data_dir.join(BAD_WORDS_FILE))?,
        })
    }

    /// Counts whatever the message contains and returns the replies to post.
    pub fn record(&mut self, guild_id: u64, text: &str) -> StoreResult<Vec<String>> {
        let mut replies = Vec::new();

        if mentions_your_mom(text) {
            let count = self.your_mom.increment(guild_id)?;
            replies.push(format!("Your mom counter: {}", count));
        }

        if self.swear_words.contains_profanity(text) {
            let count = self.swears.increment(guild_id)?;
            replies.push(format!("Swear counter: {}", count));
        }

        Ok(replies)
    }

    pub fn your_mom_count(&self, guild_id: u64) -> u64 {
        self.your_mom.get(guild_id)
    }

    pub fn swear_count(&self, guild_id: u64) -> u64 {
        self.swears.get(guild_id)
    }
}
