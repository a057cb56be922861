/// Progress persistence surface.
///
/// The simulation reads unlocked doors and collected items before respawning
/// an area and writes them back as they change, together with quest flags
/// and a player record. `MemoryProgress` is the in-process store; the binary wraps it in a
/// file-backed one (see `save.rs`).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entity::Inventory;

use super::door::AreaId;

/// An unlocked door tile. `area` is the area key (`"x,y"` / `"int_<id>"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DoorKey {
    pub area: String,
    pub tile_x: i32,
    pub tile_y: i32,
}

impl DoorKey {
    pub fn new(area: &AreaId, tile_x: i32, tile_y: i32) -> Self {
        DoorKey { area: area.to_string(), tile_x, tile_y }
    }
}

impl fmt::Display for DoorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{},{}", self.area, self.tile_x, self.tile_y)
    }
}

/// A collected placed item: area key plus index into that area's spawn table.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ItemKey {
    pub area: String,
    pub index: usize,
}

impl ItemKey {
    pub fn new(area: &AreaId, index: usize) -> Self {
        ItemKey { area: area.to_string(), index }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.area, self.index)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub area: AreaId,
    pub x: f64,
    pub y: f64,
    pub hp: i32,
    pub max_hp: i32,
    pub inventory: Inventory,
}

pub trait ProgressStore {
    fn is_door_unlocked(&self, key: &DoorKey) -> bool;
    fn is_item_collected(&self, key: &ItemKey) -> bool;
    fn mark_door_unlocked(&mut self, key: DoorKey);
    fn mark_item_collected(&mut self, key: ItemKey);
    fn has_flag(&self, flag: &str) -> bool;
    fn set_flag(&mut self, flag: &str);
    fn record_player(&mut self, record: PlayerRecord);
    fn player_record(&self) -> Option<PlayerRecord>;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryProgress {
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub unlocked_doors: BTreeSet<DoorKey>,
    #[serde(default)]
    pub collected_items: BTreeSet<ItemKey>,
    #[serde(default)]
    pub player: Option<PlayerRecord>,
}

impl ProgressStore for MemoryProgress {
    fn is_door_unlocked(&self, key: &DoorKey) -> bool {
        self.unlocked_doors.contains(key)
    }

    fn is_item_collected(&self, key: &ItemKey) -> bool {
        self.collected_items.contains(key)
    }

    fn mark_door_unlocked(&mut self, key: DoorKey) {
        self.unlocked_doors.insert(key);
    }

    fn mark_item_collected(&mut self, key: ItemKey) {
        self.collected_items.insert(key);
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    fn set_flag(&mut self, flag: &str) {
        if !self.flags.contains(flag) {
            self.flags.insert(flag.to_string());
        }
    }

    fn record_player(&mut self, record: PlayerRecord) {
        self.player = Some(record);
    }

    fn player_record(&self) -> Option<PlayerRecord> {
        self.player.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_format_like_area_keys() {
        let ow = AreaId::Overworld { x: 1, y: 2 };
        assert_eq!(DoorKey::new(&ow, 7, 3).to_string(), "1,2_7,3");
        assert_eq!(ItemKey::new(&AreaId::Interior("cave".into()), 0).to_string(), "int_cave_0");
    }

    #[test]
    fn memory_store_marks_are_idempotent() {
        let mut m = MemoryProgress::default();
        let k = ItemKey::new(&AreaId::Overworld { x: 0, y: 0 }, 1);
        assert!(!m.is_item_collected(&k));
        m.mark_item_collected(k.clone());
        m.mark_item_collected(k.clone());
        assert!(m.is_item_collected(&k));
        assert_eq!(m.collected_items.len(), 1);
    }

    #[test]
    fn flags_are_a_set() {
        let mut m = MemoryProgress::default();
        assert!(!m.has_flag("got_sword"));
        m.set_flag("got_sword");
        m.set_flag("got_sword");
        assert!(m.has_flag("got_sword"));
        assert_eq!(m.flags.len(), 1);
    }

    #[test]
    fn player_record_roundtrips_through_store() {
        let mut m = MemoryProgress::default();
        assert!(m.player_record().is_none());
        let rec = PlayerRecord {
            area: AreaId::Interior("house".into()),
            x: 10.0,
            y: 20.0,
            hp: 3,
            max_hp: 6,
            inventory: Inventory::default(),
        };
        m.record_player(rec.clone());
        assert_eq!(m.player_record(), Some(rec));
    }
}
