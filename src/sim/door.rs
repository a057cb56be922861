/// Area identifiers and the door-link table.
///
/// Links are plain data keyed by `(area, tile)`. Nothing points at a live
/// screen, so areas are built and serialized independently.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::screen::{Screen, ScreenGraph};

/// Warp target naming the overworld from inside an interior.
pub const OVERWORLD_TARGET: &str = "overworld";
/// Prefix of an overworld warp target that leads into an interior.
pub const INTERIOR_PREFIX: &str = "interior:";

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AreaId {
    Overworld { x: i32, y: i32 },
    Interior(String),
}

impl AreaId {
    pub fn is_interior(&self) -> bool {
        matches!(self, AreaId::Interior(_))
    }
}

/// Persistence key: `"x,y"` for overworld screens, `"int_<id>"` for interiors.
impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaId::Overworld { x, y } => write!(f, "{x},{y}"),
            AreaId::Interior(id) => write!(f, "int_{id}"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LinkTarget {
    Overworld,
    Interior(String),
}

impl LinkTarget {
    /// Parse a warp target as seen from `from`. Overworld warps only lead
    /// into interiors; anything else there is not a link.
    pub fn parse(from: &AreaId, target: &str) -> Option<LinkTarget> {
        match from {
            AreaId::Overworld { .. } => target
                .strip_prefix(INTERIOR_PREFIX)
                .filter(|id| !id.is_empty())
                .map(|id| LinkTarget::Interior(id.to_string())),
            AreaId::Interior(_) if target == OVERWORLD_TARGET => Some(LinkTarget::Overworld),
            AreaId::Interior(_) => {
                let id = target.strip_prefix(INTERIOR_PREFIX).unwrap_or(target);
                (!id.is_empty()).then(|| LinkTarget::Interior(id.to_string()))
            }
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct DoorLink {
    pub area: AreaId,
    pub tile_x: i32,
    pub tile_y: i32,
    pub target: LinkTarget,
    /// Where the traveller appears in the target, pixels.
    pub spawn: (f64, f64),
    /// Where a traveller coming back through this link appears, pixels.
    pub exit: (f64, f64),
}

#[derive(Clone, Debug, Default)]
pub struct DoorTable {
    links: Vec<DoorLink>,
}

impl DoorTable {
    pub fn push(&mut self, link: DoorLink) {
        self.links.push(link);
    }

    /// Collect the links declared by every overworld screen and interior.
    pub fn build<'a>(
        overworld: &ScreenGraph,
        interiors: impl IntoIterator<Item = (&'a String, &'a Screen)>,
    ) -> Self {
        let mut table = DoorTable::default();
        for (&(x, y), screen) in overworld.iter() {
            table.add_screen(AreaId::Overworld { x, y }, screen);
        }
        for (id, screen) in interiors {
            table.add_screen(AreaId::Interior(id.clone()), screen);
        }
        table
    }

    fn add_screen(&mut self, area: AreaId, screen: &Screen) {
        for w in &screen.warps {
            if let Some(target) = LinkTarget::parse(&area, &w.target) {
                self.push(DoorLink {
                    area: area.clone(),
                    tile_x: w.tile_x,
                    tile_y: w.tile_y,
                    target,
                    spawn: w.spawn,
                    exit: w.exit,
                });
            }
        }
    }

    pub fn resolve(&self, area: &AreaId, tile_x: i32, tile_y: i32) -> Option<&DoorLink> {
        self.links
            .iter()
            .find(|l| l.tile_x == tile_x && l.tile_y == tile_y && &l.area == area)
    }

    /// First overworld link leading into `interior`.
    pub fn entrance_to(&self, interior: &str) -> Option<&DoorLink> {
        self.links.iter().find(|l| {
            !l.area.is_interior() && matches!(&l.target, LinkTarget::Interior(id) if id == interior)
        })
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::screen::Warp;
    use std::collections::HashMap;

    fn warp(tx: i32, ty: i32, target: &str) -> Warp {
        Warp { tile_x: tx, tile_y: ty, target: target.into(), spawn: (120.0, 160.0), exit: (40.0, 60.0) }
    }

    fn table() -> DoorTable {
        let mut g = ScreenGraph::new(2, 1);
        let mut s = Screen::default();
        s.warps.push(warp(3, 2, "interior:house"));
        s.warps.push(warp(9, 9, "overworld"));
        g.insert(1, 0, s);

        let mut house = Screen::default();
        house.warps.push(warp(7, 11, "overworld"));
        house.warps.push(warp(1, 1, "cellar"));
        let mut interiors = HashMap::new();
        interiors.insert("house".to_string(), house);

        DoorTable::build(&g, &interiors)
    }

    #[test]
    fn resolves_by_area_and_tile() {
        let t = table();
        let link = t.resolve(&AreaId::Overworld { x: 1, y: 0 }, 3, 2).unwrap();
        assert_eq!(link.target, LinkTarget::Interior("house".into()));
        assert_eq!(link.spawn, (120.0, 160.0));

        let out = t.resolve(&AreaId::Interior("house".into()), 7, 11).unwrap();
        assert_eq!(out.target, LinkTarget::Overworld);
        let down = t.resolve(&AreaId::Interior("house".into()), 1, 1).unwrap();
        assert_eq!(down.target, LinkTarget::Interior("cellar".into()));
    }

    #[test]
    fn misses_are_none() {
        let t = table();
        assert!(t.resolve(&AreaId::Overworld { x: 0, y: 0 }, 3, 2).is_none());
        assert!(t.resolve(&AreaId::Overworld { x: 1, y: 0 }, 4, 2).is_none());
        assert!(t.resolve(&AreaId::Interior("cave".into()), 7, 11).is_none());
    }

    #[test]
    fn overworld_warp_without_interior_prefix_is_ignored() {
        let t = table();
        assert_eq!(t.len(), 3);
        assert!(t.resolve(&AreaId::Overworld { x: 1, y: 0 }, 9, 9).is_none());
    }

    #[test]
    fn entrance_lookup() {
        let t = table();
        let e = t.entrance_to("house").unwrap();
        assert_eq!((e.tile_x, e.tile_y), (3, 2));
        assert!(t.entrance_to("cellar").is_none());
    }

    #[test]
    fn area_keys() {
        assert_eq!(AreaId::Overworld { x: 2, y: 1 }.to_string(), "2,1");
        assert_eq!(AreaId::Interior("cave".into()).to_string(), "int_cave");
    }
}
