//! Sprite-sheet frame tables.
//!
//! Coordinates are cell indices into a grid of `SPRITE_SIZE` square cells,
//! not pixel offsets. The tables are the only place frame data lives.

use super::state::{CatState, Direction};

/// Edge length of one sheet cell (and of the window) in pixels.
pub const SPRITE_SIZE: u32 = 32;

/// One cell of the sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteFrame {
    pub x: u32,
    pub y: u32,
}

impl SpriteFrame {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Top-left pixel of this cell in the sheet.
    pub fn pixel_origin(self) -> (u32, u32) {
        (self.x * SPRITE_SIZE, self.y * SPRITE_SIZE)
    }
}

const fn f(x: u32, y: u32) -> SpriteFrame {
    SpriteFrame::new(x, y)
}

pub const IDLE: [SpriteFrame; 1] = [f(3, 3)];
pub const ALERT: [SpriteFrame; 1] = [f(7, 3)];
pub const TIRED: [SpriteFrame; 1] = [f(3, 2)];
pub const PAW_UP: [SpriteFrame; 1] = [f(7, 0)];
pub const SLEEPING: [SpriteFrame; 2] = [f(2, 0), f(2, 1)];
pub const ITCHING: [SpriteFrame; 2] = [f(5, 0), f(6, 0)];

pub const SCRATCH_NORTH: [SpriteFrame; 2] = [f(4, 0), f(4, 1)];
pub const SCRATCH_EAST: [SpriteFrame; 2] = [f(0, 0), f(0, 1)];
pub const SCRATCH_SOUTH: [SpriteFrame; 2] = [f(6, 2), f(7, 1)];
pub const SCRATCH_WEST: [SpriteFrame; 2] = [f(2, 2), f(2, 3)];

pub const RUN_NORTH: [SpriteFrame; 2] = [f(1, 2), f(1, 3)];
pub const RUN_NORTHEAST: [SpriteFrame; 2] = [f(0, 2), f(0, 3)];
pub const RUN_EAST: [SpriteFrame; 2] = [f(3, 0), f(3, 1)];
pub const RUN_SOUTHEAST: [SpriteFrame; 2] = [f(5, 1), f(5, 2)];
pub const RUN_SOUTH: [SpriteFrame; 2] = [f(6, 3), f(7, 2)];
pub const RUN_SOUTHWEST: [SpriteFrame; 2] = [f(5, 3), f(6, 1)];
pub const RUN_WEST: [SpriteFrame; 2] = [f(4, 2), f(4, 3)];
pub const RUN_NORTHWEST: [SpriteFrame; 2] = [f(1, 0), f(1, 1)];

/// Every table, in no particular order. Used to pre-warm masks.
const ALL_TABLES: [&[SpriteFrame]; 18] = [
    &IDLE,
    &ALERT,
    &TIRED,
    &PAW_UP,
    &SLEEPING,
    &ITCHING,
    &SCRATCH_NORTH,
    &SCRATCH_EAST,
    &SCRATCH_SOUTH,
    &SCRATCH_WEST,
    &RUN_NORTH,
    &RUN_NORTHEAST,
    &RUN_EAST,
    &RUN_SOUTHEAST,
    &RUN_SOUTH,
    &RUN_SOUTHWEST,
    &RUN_WEST,
    &RUN_NORTHWEST,
];

fn run_frames(dir: Direction) -> &'static [SpriteFrame] {
    match dir {
        Direction::North => &RUN_NORTH,
        Direction::NorthEast => &RUN_NORTHEAST,
        Direction::East => &RUN_EAST,
        Direction::SouthEast => &RUN_SOUTHEAST,
        Direction::South => &RUN_SOUTH,
        Direction::SouthWest => &RUN_SOUTHWEST,
        Direction::West => &RUN_WEST,
        Direction::NorthWest => &RUN_NORTHWEST,
    }
}

/// Scratching only has four poses. Diagonals fold onto a neighbouring axis.
pub fn scratch_heading(dir: Direction) -> Direction {
    match dir {
        Direction::North | Direction::NorthEast | Direction::NorthWest => Direction::North,
        Direction::East | Direction::SouthEast => Direction::East,
        Direction::South => Direction::South,
        Direction::West | Direction::SouthWest => Direction::West,
    }
}

fn scratch_frames(dir: Direction) -> &'static [SpriteFrame] {
    match scratch_heading(dir) {
        Direction::North => &SCRATCH_NORTH,
        Direction::East => &SCRATCH_EAST,
        Direction::South => &SCRATCH_SOUTH,
        _ => &SCRATCH_WEST,
    }
}

/// Ordered frame sequence for a state. Direction only matters for
/// running and scratching.
pub fn frames_for(state: CatState, dir: Direction) -> &'static [SpriteFrame] {
    match state {
        CatState::Running => run_frames(dir),
        CatState::Scratching => scratch_frames(dir),
        CatState::Idle => &IDLE,
        CatState::Alert => &ALERT,
        CatState::Sleeping => &SLEEPING,
        CatState::Itching => &ITCHING,
        CatState::PawUp => &PAW_UP,
        CatState::FallingAsleep | CatState::WakingUp => &TIRED,
    }
}

/// Every distinct coordinate any table references, first-seen order.
pub fn all_frames() -> Vec<SpriteFrame> {
    let mut out: Vec<SpriteFrame> = Vec::with_capacity(32);
    for table in ALL_TABLES {
        for frame in table {
            if !out.contains(frame) {
                out.push(*frame);
            }
        }
    }
    out
}

/// Smallest sheet (in cells) that contains every referenced coordinate.
pub fn required_grid() -> (u32, u32) {
    all_frames()
        .iter()
        .fold((0, 0), |(w, h), fr| (w.max(fr.x + 1), h.max(fr.y + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [CatState; 9] = [
        CatState::Idle,
        CatState::Alert,
        CatState::Running,
        CatState::Sleeping,
        CatState::Scratching,
        CatState::Itching,
        CatState::PawUp,
        CatState::FallingAsleep,
        CatState::WakingUp,
    ];

    #[test]
    fn every_reachable_frame_is_in_the_prewarm_set() {
        let all = all_frames();
        for state in ALL_STATES {
            for dir in Direction::ALL {
                for frame in frames_for(state, dir) {
                    assert!(all.contains(frame), "{state:?}/{dir:?} -> {frame:?}");
                }
            }
        }
    }

    #[test]
    fn prewarm_set_is_the_full_8x4_grid() {
        let all = all_frames();
        assert_eq!(all.len(), 32);
        assert_eq!(required_grid(), (8, 4));
    }

    #[test]
    fn scratch_diagonals_fold() {
        assert_eq!(frames_for(CatState::Scratching, Direction::NorthEast), &SCRATCH_NORTH);
        assert_eq!(frames_for(CatState::Scratching, Direction::NorthWest), &SCRATCH_NORTH);
        assert_eq!(frames_for(CatState::Scratching, Direction::SouthEast), &SCRATCH_EAST);
        assert_eq!(frames_for(CatState::Scratching, Direction::SouthWest), &SCRATCH_WEST);
        assert_eq!(frames_for(CatState::Scratching, Direction::South), &SCRATCH_SOUTH);
    }

    #[test]
    fn running_has_a_table_per_heading() {
        let mut seen = Vec::new();
        for dir in Direction::ALL {
            let t = frames_for(CatState::Running, dir);
            assert!(!seen.contains(&t[0]));
            seen.push(t[0]);
        }
    }

    #[test]
    fn static_poses_ignore_direction() {
        for dir in Direction::ALL {
            assert_eq!(frames_for(CatState::Idle, dir), &IDLE);
            assert_eq!(frames_for(CatState::WakingUp, dir), &TIRED);
            assert_eq!(frames_for(CatState::Itching, dir), &ITCHING);
        }
    }

    #[test]
    fn pixel_origin_is_cell_times_size() {
        assert_eq!(SpriteFrame::new(7, 3).pixel_origin(), (224, 96));
    }
}
