//! Derivation of slope terrain from elevation differences.
//!
//! Inclines and cliff bottoms are never authored; they follow from the floors
//! of a hex and its six neighbors. `derive` recomputes the complete set from
//! scratch so that applying it twice gives the same hex. A manually authored
//! `cliff_top` is kept only in the directions where a real step of one or
//! two levels backs it up.

use super::coords::Facing;
use super::hex::Hex;
use super::terrain::{Terrain, TerrainKind};

/// The derived terrain for one hex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedTerrain {
    /// Automatic terrain to install, replacing whatever was there.
    pub automatic: Vec<Terrain>,
    /// The confirmed cliff top, or `None` to remove it.
    pub cliff_top: Option<Terrain>,
}

#[derive(Default)]
struct ExitMasks {
    incline_top: u32,
    incline_bottom: u32,
    high_top: u32,
    high_bottom: u32,
    cliff_top: u32,
    cliff_bottom: u32,
}

/// Slopes are only drawn between two dry hexes or two water hexes.
fn water_allows_slope(hex: &Hex, neighbor: &Hex) -> bool {
    hex.contains_terrain(TerrainKind::Water) == neighbor.contains_terrain(TerrainKind::Water)
}

/// Computes the automatic terrain of `hex` given its neighbors, indexed by facing.
///
/// With `show_inclines` off, plain inclines are left out; cliffs and high
/// inclines are always derived.
pub fn derive(hex: &Hex, neighbors: &[Option<&Hex>; 6], show_inclines: bool) -> DerivedTerrain {
    let mut masks = ExitMasks::default();

    for dir in Facing::ALL {
        let Some(other) = neighbors[dir.index()] else {
            continue;
        };
        if !water_allows_slope(hex, other) {
            continue;
        }
        let diff = hex.floor() - other.floor();
        let manual_cliff = hex.contains_exit(TerrainKind::CliffTop, dir);

        match diff {
            1 | 2 if manual_cliff => masks.cliff_top |= dir.bit(),
            1 | 2 => masks.incline_top |= dir.bit(),
            d if d > 2 => masks.high_top |= dir.bit(),
            -1 | -2 => {
                if other.contains_exit(TerrainKind::CliffTop, dir.opposite()) {
                    masks.cliff_bottom |= dir.bit();
                } else {
                    masks.incline_bottom |= dir.bit();
                }
            }
            d if d < -2 => masks.high_bottom |= dir.bit(),
            _ => {}
        }
    }

    let mut automatic = Vec::new();
    let mut push = |kind: TerrainKind, exits: u32| {
        if exits != 0 {
            automatic.push(Terrain::with_exits(kind, 1, exits));
        }
    };
    if show_inclines {
        push(TerrainKind::InclineTop, masks.incline_top);
        push(TerrainKind::InclineBottom, masks.incline_bottom);
    }
    push(TerrainKind::InclineHighTop, masks.high_top);
    push(TerrainKind::InclineHighBottom, masks.high_bottom);
    push(TerrainKind::CliffBottom, masks.cliff_bottom);

    let cliff_top = match hex.terrain(TerrainKind::CliffTop) {
        Some(t) if masks.cliff_top != 0 => {
            Some(Terrain::with_exits(TerrainKind::CliffTop, t.level(), masks.cliff_top))
        }
        _ => None,
    };

    DerivedTerrain {
        automatic,
        cliff_top,
    }
}

impl DerivedTerrain {
    /// Replaces the hex's automatic terrain and cliff top with this set.
    pub fn apply_to(self, hex: &mut Hex) {
        hex.remove_automatic_terrain();
        hex.remove_terrain(TerrainKind::CliffTop);
        for t in self.automatic {
            hex.add_terrain(t);
        }
        if let Some(t) = self.cliff_top {
            hex.add_terrain(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(level: i32, spec: &str) -> Hex {
        Hex::parse(level, spec, "").unwrap()
    }

    fn around<'a>(n: &'a Hex) -> [Option<&'a Hex>; 6] {
        [Some(n); 6]
    }

    fn exits(d: &DerivedTerrain, kind: TerrainKind) -> u32 {
        d.automatic
            .iter()
            .find(|t| t.kind() == kind)
            .map(|t| t.exits())
            .unwrap_or(0)
    }

    #[test]
    fn small_step_gives_incline_top() {
        let low = hex(0, "");
        let d = derive(&hex(2, ""), &around(&low), true);
        assert_eq!(exits(&d, TerrainKind::InclineTop), 0b111111);
        assert_eq!(exits(&d, TerrainKind::InclineHighTop), 0);
    }

    #[test]
    fn large_step_gives_high_incline() {
        let low = hex(0, "");
        let d = derive(&hex(3, ""), &around(&low), true);
        assert_eq!(exits(&d, TerrainKind::InclineHighTop), 0b111111);
        assert_eq!(exits(&d, TerrainKind::InclineTop), 0);

        let d = derive(&low, &around(&hex(3, "")), true);
        assert_eq!(exits(&d, TerrainKind::InclineHighBottom), 0b111111);
    }

    #[test]
    fn equal_floors_derive_nothing() {
        let flat = hex(1, "");
        assert_eq!(derive(&flat, &around(&flat), true), DerivedTerrain::default());
    }

    #[test]
    fn missing_neighbors_are_skipped() {
        let low = hex(0, "");
        let mut neighbors: [Option<&Hex>; 6] = [None; 6];
        neighbors[Facing::South.index()] = Some(&low);
        let d = derive(&hex(1, ""), &neighbors, true);
        assert_eq!(exits(&d, TerrainKind::InclineTop), Facing::South.bit());
    }

    #[test]
    fn confirmed_cliff_top_replaces_incline() {
        let low = hex(0, "");
        let high = hex(1, "cliff_top:1:9");
        let d = derive(&high, &around(&low), true);
        let cliff = d.cliff_top.as_ref().unwrap();
        assert_eq!(cliff.exits(), 9);
        assert_eq!(exits(&d, TerrainKind::InclineTop), 0b111111 & !9);
    }

    #[test]
    fn uncorroborated_cliff_top_is_dropped() {
        let flat = hex(1, "");
        let d = derive(&hex(1, "cliff_top:1:63"), &around(&flat), true);
        assert_eq!(d.cliff_top, None);

        // a partial step keeps only the backed-up directions
        let low = hex(0, "");
        let mut neighbors = [Some(&flat); 6];
        neighbors[Facing::North.index()] = Some(&low);
        let d = derive(&hex(1, "cliff_top:1:63"), &neighbors, true);
        assert_eq!(d.cliff_top.unwrap().exits(), Facing::North.bit());
    }

    #[test]
    fn bottom_of_cliff_consults_neighbor() {
        let high = hex(2, "cliff_top:1:63");
        let d = derive(&hex(0, ""), &around(&high), true);
        assert_eq!(exits(&d, TerrainKind::CliffBottom), 0b111111);
        assert_eq!(exits(&d, TerrainKind::InclineBottom), 0);

        let d = derive(&hex(0, ""), &around(&hex(2, "")), true);
        assert_eq!(exits(&d, TerrainKind::InclineBottom), 0b111111);
    }

    #[test]
    fn water_edges_have_no_slopes() {
        let lake = hex(0, "water:2");
        let d = derive(&hex(1, ""), &around(&lake), true);
        assert!(d.automatic.is_empty());

        // two water hexes with different floors still slope
        let deep = hex(0, "water:3");
        let d = derive(&lake, &around(&deep), true);
        assert_eq!(exits(&d, TerrainKind::InclineTop), 0b111111);
    }

    #[test]
    fn display_preference_hides_plain_inclines_only() {
        let low = hex(0, "");
        let mut neighbors = [Some(&low); 6];
        let cliff_base = hex(-3, "");
        neighbors[0] = Some(&cliff_base);
        let d = derive(&hex(1, "cliff_top:1:2"), &neighbors, false);
        assert_eq!(exits(&d, TerrainKind::InclineTop), 0);
        assert_eq!(exits(&d, TerrainKind::InclineHighTop), Facing::North.bit());
        assert_eq!(d.cliff_top.unwrap().exits(), Facing::NorthEast.bit());
    }

    #[test]
    fn derivation_is_idempotent() {
        let low = hex(0, "");
        let mut h = hex(2, "cliff_top:1:5;woods:1");
        derive(&h, &around(&low), true).apply_to(&mut h);
        let once = h.clone();
        derive(&h, &around(&low), true).apply_to(&mut h);
        assert_eq!(h, once);
        assert!(h.contains_terrain(TerrainKind::Woods));
    }
}
