//! Obstacle zone classification for collision avoidance.
//!
//! Maps single measurements onto four cardinal watch sectors around the
//! sensor and distance bands of one meter each. Events carry a cell in a
//! 17 by 17 occupancy grid centered on the sensor and a compact notify
//! code, so a consumer can forward proximity alerts without keeping any
//! scan state of its own.

use crate::types::Measurement;

/// Obstacles closer than this are ignored as sensor-body reflections (mm).
const NEAR_LIMIT_MM: f32 = 200.0;

/// Obstacles at or beyond this range are ignored (mm).
const FAR_LIMIT_MM: f32 = 8000.0;

/// Width of one distance band (mm).
const ZONE_BAND_MM: f32 = 1000.0;

/// Center row and column of the occupancy grid.
const GRID_CENTER: i16 = 8;

/// The four watched sectors around the sensor. Zero degrees points front,
/// angles grow clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
}

/// One proximity hit: an in-range measurement that fell inside a watched
/// sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneEvent {
    pub direction: Direction,
    /// Distance band, 1 (nearest) to 8.
    pub zone: u8,
    /// Grid cell as (row, column), one step away from the center per band.
    pub cell: (usize, usize),
    /// Direction base code plus the band, for compact alert messages.
    pub notify_code: u8,
    /// Measured distance in millimeters.
    pub distance: f32,
}

struct SectorRule {
    direction: Direction,
    arcs: &'static [(f32, f32)],
    row_step: i16,
    col_step: i16,
    code_base: u8,
}

impl SectorRule {
    fn covers(&self, angle: f32) -> bool {
        self.arcs.iter().any(|&(lo, hi)| angle > lo && angle < hi)
    }
}

// The front sector straddles zero, hence its two arcs. Bounds are exclusive,
// so sector edges and exactly zero degrees never match.
const SECTOR_RULES: [SectorRule; 4] = [
    SectorRule {
        direction: Direction::Front,
        arcs: &[(350.0, 360.0), (0.0, 10.0)],
        row_step: -1,
        col_step: 0,
        code_base: 0x14,
    },
    SectorRule {
        direction: Direction::Back,
        arcs: &[(172.0, 188.0)],
        row_step: 1,
        col_step: 0,
        code_base: 0x50,
    },
    SectorRule {
        direction: Direction::Left,
        arcs: &[(260.0, 280.0)],
        row_step: 0,
        col_step: -1,
        code_base: 0x28,
    },
    SectorRule {
        direction: Direction::Right,
        arcs: &[(80.0, 100.0)],
        row_step: 0,
        col_step: 1,
        code_base: 0x3C,
    },
];

/// Classify one measurement, returning a [`ZoneEvent`] when it lies inside a
/// watched sector and between the near and far range limits (both exclusive).
pub fn classify(measurement: &Measurement) -> Option<ZoneEvent> {
    if measurement.distance <= NEAR_LIMIT_MM || measurement.distance >= FAR_LIMIT_MM {
        return None;
    }
    let rule = SECTOR_RULES
        .iter()
        .find(|rule| rule.covers(measurement.angle))?;

    let zone = (measurement.distance / ZONE_BAND_MM) as u8 + 1;
    let row = GRID_CENTER + rule.row_step * zone as i16;
    let col = GRID_CENTER + rule.col_step * zone as i16;

    Some(ZoneEvent {
        direction: rule.direction,
        zone,
        cell: (row as usize, col as usize),
        notify_code: rule.code_base + zone,
        distance: measurement.distance,
    })
}
