use super::state::CatState;

/// Running animation speed (ms per frame).
const ANIM_SPEED_RUN: u64 = 80;
const ANIM_SPEED_SLEEP: u64 = 500;
const ANIM_SPEED_SCRATCH: u64 = 300;
const ANIM_SPEED_ITCH: u64 = 300;

/// Frame timing for one state. `ms_per_frame == 0` means a static pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimSpeed {
    pub ms_per_frame: u64,
    pub frames: usize,
}

impl AnimSpeed {
    const STATIC: Self = Self {
        ms_per_frame: 0,
        frames: 1,
    };

    pub fn for_state(state: CatState) -> Self {
        match state {
            CatState::Running => Self {
                ms_per_frame: ANIM_SPEED_RUN,
                frames: 2,
            },
            CatState::Sleeping => Self {
                ms_per_frame: ANIM_SPEED_SLEEP,
                frames: 2,
            },
            CatState::Scratching => Self {
                ms_per_frame: ANIM_SPEED_SCRATCH,
                frames: 2,
            },
            CatState::Itching => Self {
                ms_per_frame: ANIM_SPEED_ITCH,
                frames: 2,
            },
            CatState::Idle
            | CatState::Alert
            | CatState::PawUp
            | CatState::FallingAsleep
            | CatState::WakingUp => Self::STATIC,
        }
    }
}

/// Wall-clock frame timer. Advances at most one frame per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationClock {
    frame: usize,
    /// Set on the first call; until then there is no reference point.
    last_advance_ms: Option<u64>,
}

impl AnimationClock {
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Step the clock for this tick and return the frame index to draw.
    /// The result is always `< speed.frames`.
    pub fn advance(&mut self, speed: AnimSpeed, now_ms: u64) -> usize {
        // A 2-frame state may hand over to a 1-frame one mid-cycle.
        if self.frame >= speed.frames {
            self.frame = 0;
        }

        let last = *self.last_advance_ms.get_or_insert(now_ms);
        if speed.ms_per_frame > 0 && now_ms.saturating_sub(last) >= speed.ms_per_frame {
            self.frame = (self.frame + 1) % speed.frames;
            self.last_advance_ms = Some(now_ms);
        }
        self.frame
    }
}
