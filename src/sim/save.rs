/// File-backed progress store.
///
/// ## File format:
///   TOML, one document per save:
///   ```toml
///   flags = ["got_sword", "met_oldman"]
///
///   [[unlocked_doors]]
///   area = "2,0"
///   tile_x = 8
///   tile_y = 3
///
///   [[collected_items]]
///   area = "int_house"
///   index = 0
///
///   [player]
///   x = 113.0
///   ...
///   ```
///
/// Every mark is written through immediately. A failed write is logged and
/// the in-memory state stays authoritative for the session.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::progress::{DoorKey, ItemKey, MemoryProgress, PlayerRecord, ProgressStore};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("save encode: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("save file parse: {0}")]
    Parse(#[from] toml::de::Error),
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let marker = parent.join(".write_test_tilequest");
            if std::fs::write(&marker, "").is_ok() {
                let _ = std::fs::remove_file(&marker);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tilequest");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve the configured save file name. Absolute paths are used as-is.
pub fn save_path(name: &str) -> PathBuf {
    let p = Path::new(name);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        save_dir().join(p)
    }
}

// ══════════════════════════════════════════════════════════════
// FileProgress
// ══════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct FileProgress {
    path: PathBuf,
    data: MemoryProgress,
}

impl FileProgress {
    /// Open `path`. A missing file starts empty progress.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let data: MemoryProgress = toml::from_str(&text)?;
                info!(
                    path = %path.display(),
                    doors = data.unlocked_doors.len(),
                    items = data.collected_items.len(),
                    "save loaded"
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryProgress::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileProgress { path, data })
    }

    /// Open, falling back to an empty store bound to the same path when the
    /// file is unreadable or corrupt.
    pub fn open_or_fresh(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %path.display(), "{e}; starting without saved progress");
                FileProgress { path, data: MemoryProgress::default() }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &MemoryProgress {
        &self.data
    }

    pub fn write(&self) -> Result<(), SaveError> {
        let text = toml::to_string(&self.data)?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "progress written");
        Ok(())
    }

    fn flush(&self) {
        if let Err(e) = self.write() {
            warn!(path = %self.path.display(), "{e}");
        }
    }

    /// Remove the file and forget everything.
    pub fn reset(&mut self) -> Result<(), SaveError> {
        self.data = MemoryProgress::default();
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl ProgressStore for FileProgress {
    fn is_door_unlocked(&self, key: &DoorKey) -> bool {
        self.data.is_door_unlocked(key)
    }

    fn is_item_collected(&self, key: &ItemKey) -> bool {
        self.data.is_item_collected(key)
    }

    fn mark_door_unlocked(&mut self, key: DoorKey) {
        if !self.data.is_door_unlocked(&key) {
            self.data.mark_door_unlocked(key);
            self.flush();
        }
    }

    fn mark_item_collected(&mut self, key: ItemKey) {
        if !self.data.is_item_collected(&key) {
            self.data.mark_item_collected(key);
            self.flush();
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.data.has_flag(flag)
    }

    fn set_flag(&mut self, flag: &str) {
        if !self.data.has_flag(flag) {
            self.data.set_flag(flag);
            self.flush();
        }
    }

    fn record_player(&mut self, record: PlayerRecord) {
        self.data.record_player(record);
        self.flush();
    }

    fn player_record(&self) -> Option<PlayerRecord> {
        self.data.player_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Inventory;
    use crate::sim::door::AreaId;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tilequest_test_{}_{}", std::process::id(), name));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("save.toml")
    }

    #[test]
    fn missing_file_is_empty_progress() {
        let p = FileProgress::open(temp_path("missing")).unwrap();
        assert_eq!(p.data(), &MemoryProgress::default());
    }

    #[test]
    fn marks_survive_reopen() {
        let path = temp_path("reopen");
        let door = DoorKey::new(&AreaId::Overworld { x: 2, y: 0 }, 8, 3);
        let item = ItemKey::new(&AreaId::Interior("house".into()), 0);
        {
            let mut p = FileProgress::open(&path).unwrap();
            p.mark_door_unlocked(door.clone());
            p.mark_item_collected(item.clone());
            p.set_flag("met_oldman");
            p.record_player(PlayerRecord {
                area: AreaId::Interior("house".into()),
                x: 113.0,
                y: 145.0,
                hp: 4,
                max_hp: 6,
                inventory: Inventory::default(),
            });
        }
        let p = FileProgress::open(&path).unwrap();
        assert!(p.is_door_unlocked(&door));
        assert!(p.is_item_collected(&item));
        assert!(p.has_flag("met_oldman"));
        assert!(!p.has_flag("got_sword"));
        let rec = p.player_record().unwrap();
        assert_eq!(rec.area, AreaId::Interior("house".into()));
        assert_eq!(rec.hp, 4);
    }

    #[test]
    fn corrupt_file_falls_back_to_fresh() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "unlocked_doors = [[[").unwrap();
        assert!(matches!(FileProgress::open(&path), Err(SaveError::Parse(_))));
        let p = FileProgress::open_or_fresh(&path);
        assert!(p.player_record().is_none());
    }

    #[test]
    fn reset_clears_file_and_state() {
        let path = temp_path("reset");
        let mut p = FileProgress::open(&path).unwrap();
        p.mark_item_collected(ItemKey::new(&AreaId::Overworld { x: 0, y: 0 }, 1));
        assert!(path.exists());
        p.reset().unwrap();
        assert!(!path.exists());
        assert!(p.data().collected_items.is_empty());
        p.reset().unwrap();
    }

    #[test]
    fn absolute_save_path_is_kept() {
        let abs = std::env::temp_dir().join("x.toml");
        assert_eq!(save_path(abs.to_str().unwrap()), abs);
    }
}
