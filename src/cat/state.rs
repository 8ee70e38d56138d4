use glam::Vec2;

/// What the cat is currently doing. Drives which frame table gets sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatState {
    Idle,
    Alert,
    Running,
    Sleeping,
    Scratching,
    Itching,
    PawUp,
    FallingAsleep,
    WakingUp,
}

impl CatState {
    /// Animations the idle buffer may pick from. Sleep is never one of them.
    pub const IDLE_BUFFER_CANDIDATES: [CatState; 4] = [
        CatState::Idle,
        CatState::Scratching,
        CatState::Itching,
        CatState::PawUp,
    ];

    /// Part of the sleep cycle (the pointer-idle trigger ignores these).
    pub fn is_drowsy(self) -> bool {
        matches!(
            self,
            CatState::Sleeping | CatState::FallingAsleep | CatState::WakingUp
        )
    }
}

/// 8-way compass heading. Screen space, so north is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Uniform pick among N/E/S/W (scratching faces a wall, never a corner).
    pub fn random_cardinal(rng: &mut fastrand::Rng) -> Self {
        Self::CARDINAL[rng.usize(0..Self::CARDINAL.len())]
    }
}

/// Below this displacement the heading is meaningless and the old one is kept.
const MIN_DIRECTION_DISTANCE: f32 = 0.1;
/// Component threshold on the unit vector for leaving a pure axis.
const SECTOR_THRESHOLD: f32 = 0.5;

/// Bucket a displacement into one of 8 sectors.
pub fn calculate_direction(delta: Vec2, previous: Direction) -> Direction {
    let dist = delta.length();
    if dist < MIN_DIRECTION_DISTANCE {
        return previous;
    }

    let n = delta / dist;

    if n.y < -SECTOR_THRESHOLD {
        if n.x > SECTOR_THRESHOLD {
            Direction::NorthEast
        } else if n.x < -SECTOR_THRESHOLD {
            Direction::NorthWest
        } else {
            Direction::North
        }
    } else if n.y > SECTOR_THRESHOLD {
        if n.x > SECTOR_THRESHOLD {
            Direction::SouthEast
        } else if n.x < -SECTOR_THRESHOLD {
            Direction::SouthWest
        } else {
            Direction::South
        }
    } else if n.x > 0.0 {
        Direction::East
    } else {
        Direction::West
    }
}
