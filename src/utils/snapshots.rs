//! On-disk snapshots of a server's members and roles, used to rebuild a
//! server after it has been wiped.
//!
//! Layout under the data directory:
//!
//! ```text
//! servers/<server name>/users/<username>.csv    user id, then comma-separated role names
//! servers/<server name>/roles/<role name>.csv   name, colour (#rrggbb), permission bits
//! servers/<server name>/monitors/channel.txt    monitor channel id
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

use super::store::{StoreError, StoreResult, read_optional, write_whole};

const MAX_NAME_LEN: usize = 200;
const SERVERS_DIR: &str = "servers";
const USERS_DIR: &str = "users";
const ROLES_DIR: &str = "roles";
const MONITORS_DIR: &str = "monitors";
const MONITOR_FILE: &str = "channel.txt";
const SNAPSHOT_EXT: &str = "csv";

/// Makes a Discord name safe to use as a file or directory name.
///
/// Control characters are dropped, characters that are illegal on common
/// filesystems become `_`, and the result is trimmed and capped at 200
/// characters.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Directory holding one server's snapshot
pub fn server_dir(data_dir: &Path, server_name: &str) -> PathBuf {
    data_dir.join(SERVERS_DIR).join(sanitize_name(server_name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user_id: u64,
    pub roles: Vec<String>,
}

impl MemberSnapshot {
    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.user_id, self.roles.join(","))
    }
}

impl FromStr for MemberSnapshot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();
        let user_id = lines
            .next()
            .map(str::trim)
            .ok_or("empty member file")?
            .parse::<u64>()
            .map_err(|e| format!("bad user id: {}", e))?;
        if user_id == 0 {
            return Err("user id 0 is not valid".to_string());
        }

        let roles = lines
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { user_id, roles })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub name: String,
    pub colour: u32,
    pub permissions: u64,
}

impl RoleSnapshot {
    pub fn render(&self) -> String {
        format!("{}\n#{:06x}\n{}\n", self.name, self.colour, self.permissions)
    }

    /// Parses a role file. A missing name falls back to `file_stem`;
    /// unreadable colours and permissions fall back to zero.
    pub fn parse(file_stem: &str, contents: &str) -> Self {
        let mut lines = contents.lines().map(str::trim);
        let name = lines
            .next()
            .filter(|line| !line.is_empty())
            .unwrap_or(file_stem)
            .to_string();
        let colour = lines
            .next()
            .and_then(|line| u32::from_str_radix(line.trim_start_matches('#'), 16).ok())
            .unwrap_or(0);
        let permissions = lines
            .next()
            .and_then(|line| line.parse::<u64>().ok())
            .unwrap_or(0);

        Self {
            name,
            colour,
            permissions,
        }
    }
}

/// Reads and writes one server's snapshot directory
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    root: PathBuf,
}

impl ServerSnapshot {
    pub fn new(data_dir: &Path, server_name: &str) -> Self {
        Self {
            root: server_dir(data_dir, server_name),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn write_member(&self, username: &str, member: &MemberSnapshot) -> StoreResult<()> {
        let path = self
            .root
            .join(USERS_DIR)
            .join(format!("{}.{}", sanitize_name(username), SNAPSHOT_EXT));
        write_whole(&path, &member.render())
    }

    pub fn write_role(&self, role: &RoleSnapshot) -> StoreResult<()> {
        let path = self
            .root
            .join(ROLES_DIR)
            .join(format!("{}.{}", sanitize_name(&role.name), SNAPSHOT_EXT));
        write_whole(&path, &role.render())
    }

    /// Every readable member file. Unparseable files are logged and skipped.
    pub fn members(&self) -> StoreResult<Vec<MemberSnapshot>> {
        let mut members = Vec::new();
        for (path, name) in list_snapshots(&self.root.join(USERS_DIR))? {
            let Some(contents) = read_optional(&path)? else {
                continue;
            };
            match contents.parse::<MemberSnapshot>() {
                Ok(member) => members.push(member),
                Err(reason) => warn!("Skipping member file {} ({}): {}", path.display(), name, reason),
            }
        }
        Ok(members)
    }

    pub fn roles(&self) -> StoreResult<Vec<RoleSnapshot>> {
        let mut roles = Vec::new();
        for (path, name) in list_snapshots(&self.root.join(ROLES_DIR))? {
            if let Some(contents) = read_optional(&path)? {
                roles.push(RoleSnapshot::parse(&name, &contents));
            }
        }
        Ok(roles)
    }

    pub fn monitor_channel(&self) -> StoreResult<Option<u64>> {
        let path = self.monitor_file();
        let Some(contents) = read_optional(&path)? else {
            return Ok(None);
        };
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(None);
        }
        contents
            .parse::<u64>()
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                path,
                line: 1,
                reason: format!("bad channel id: {}", e),
            })
    }

    pub fn set_monitor_channel(&self, channel_id: u64) -> StoreResult<()> {
        write_whole(&self.monitor_file(), &channel_id.to_string())
    }

    fn monitor_file(&self) -> PathBuf {
        self.root.join(MONITORS_DIR).join(MONITOR_FILE)
    }
}

/// Snapshot files in `dir`, sorted by name, paired with their file stem.
fn list_snapshots(dir: &Path) -> StoreResult<Vec<(PathBuf, String)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files: Vec<(PathBuf, String)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == SNAPSHOT_EXT))
        .filter_map(|path| {
            let stem = path.file_stem()?.to_string_lossy().into_owned();
            Some((path, stem))
        })
        .collect();
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}
