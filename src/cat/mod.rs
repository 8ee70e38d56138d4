pub mod animation;
pub mod frames;
pub mod state;

use glam::{IVec2, Vec2};

use self::animation::{AnimSpeed, AnimationClock};
use self::frames::{frames_for, SpriteFrame, SPRITE_SIZE};
use self::state::{calculate_direction, CatState, Direction};

/// Movement speed in pixels per tick.
pub const SPEED: f32 = 3.0;
/// Chase stops here; inside it the cat rests and plays idle animations.
pub const ALERT_DEADZONE_INNER: f32 = 50.0;
/// Beyond this the cat starts chasing. Between the two radii it sits alert.
pub const ALERT_DEADZONE_OUTER: f32 = 100.0;
/// Resting ticks before idle/sleep logic kicks in (tick count, not time).
pub const IDLE_ANIMATION_THRESHOLD: u32 = 60;
/// Ticks spent on the tired frame when dozing off or waking.
pub const TIRED_DELAY: u32 = 30;
/// Pointer stillness before the cat falls asleep.
pub const MOUSE_IDLE_SLEEP_TIME_MS: u64 = 30_000;
/// No animation ends before this.
pub const ANIM_PLAY_TIME_MIN_MS: u64 = 3_000;
/// Every animation ends by this.
pub const ANIM_PLAY_TIME_MAX_MS: u64 = 10_000;
/// Pause between two idle animations.
pub const IDLE_BUFFER_TIME_MS: u64 = 10_000;
/// Per-tick chance (percent) of ending an animation between min and max.
pub const EARLY_SWITCH_PERCENT: u32 = 10;

/// What one tick produced for the renderer and the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutput {
    pub frame: SpriteFrame,
    /// New window top-left, only when the cat moved this tick.
    pub window_pos: Option<IVec2>,
}

/// Behavior engine for one cat: state machine, timers, heading, position.
pub struct Cat {
    pos: Vec2,
    state: CatState,
    /// State observed at the top of the previous tick (dwell timer anchor).
    last_state: CatState,
    /// Last idle-buffer pick, so the next pick differs.
    last_animation: CatState,
    direction: Direction,

    /// Consecutive resting ticks.
    idle_counter: u32,
    /// Ticks spent falling asleep / waking up.
    tired_counter: u32,
    in_idle_buffer: bool,
    in_chase_mode: bool,

    last_pointer: IVec2,
    last_pointer_move_ms: u64,
    state_start_ms: u64,
    idle_buffer_start_ms: u64,

    clock: AnimationClock,
}

impl Cat {
    /// Spawn at `pos`. The pointer position seeds the stillness timer so the
    /// first tick doesn't count as movement.
    pub fn new(pos: Vec2, pointer: IVec2, now_ms: u64) -> Self {
        Self {
            pos,
            state: CatState::Idle,
            last_state: CatState::Idle,
            last_animation: CatState::Idle,
            direction: Direction::South,
            idle_counter: 0,
            tired_counter: 0,
            in_idle_buffer: true,
            in_chase_mode: false,
            last_pointer: pointer,
            last_pointer_move_ms: now_ms,
            state_start_ms: now_ms,
            idle_buffer_start_ms: now_ms,
            clock: AnimationClock::default(),
        }
    }

    pub fn state(&self) -> CatState {
        self.state
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[cfg(test)]
    pub fn position(&self) -> Vec2 {
        self.pos
    }

    #[cfg(test)]
    pub fn in_chase_mode(&self) -> bool {
        self.in_chase_mode
    }

    #[cfg(test)]
    pub fn in_idle_buffer(&self) -> bool {
        self.in_idle_buffer
    }

    #[cfg(test)]
    pub fn idle_counter(&self) -> u32 {
        self.idle_counter
    }

    #[cfg(test)]
    pub fn last_animation(&self) -> CatState {
        self.last_animation
    }

    /// Window top-left for the current position (sprite centred on the cat).
    pub fn window_origin(&self) -> IVec2 {
        let half = (SPRITE_SIZE / 2) as f32;
        (self.pos - Vec2::splat(half)).as_ivec2()
    }

    /// Frame for the current state, heading and animation index.
    pub fn current_frame(&self) -> SpriteFrame {
        let table = frames_for(self.state, self.direction);
        table[self.clock.frame().min(table.len() - 1)]
    }

    /// Advance one tick.
    pub fn tick(&mut self, pointer: IVec2, now_ms: u64, rng: &mut fastrand::Rng) -> TickOutput {
        let before = self.state;

        self.on_pointer(pointer, now_ms);

        if self.state != self.last_state {
            self.state_start_ms = now_ms;
            self.last_state = self.state;
        }

        let delta = pointer.as_vec2() - self.pos;
        let distance = delta.length();

        let window_pos = if self.in_chase_mode {
            self.chase(delta, distance, now_ms)
        } else {
            self.hold(distance, now_ms, rng);
            None
        };

        if self.state != before {
            log::debug!("cat: {:?} -> {:?}", before, self.state);
        }

        let speed = AnimSpeed::for_state(self.state);
        self.clock.advance(speed, now_ms);

        TickOutput {
            frame: self.current_frame(),
            window_pos,
        }
    }

    /// Pointer-movement interrupt: wakes a sleeper, rescues a dozer.
    fn on_pointer(&mut self, pointer: IVec2, now_ms: u64) {
        if pointer == self.last_pointer {
            return;
        }
        self.last_pointer = pointer;
        self.last_pointer_move_ms = now_ms;

        match self.state {
            CatState::Sleeping => {
                self.state = CatState::WakingUp;
                self.tired_counter = 1;
            }
            CatState::FallingAsleep => self.enter_idle_buffer(now_ms),
            _ => {}
        }
    }

    /// Chase mode: run unconditionally until inside the inner radius.
    fn chase(&mut self, delta: Vec2, distance: f32, now_ms: u64) -> Option<IVec2> {
        if distance > ALERT_DEADZONE_INNER {
            self.state = CatState::Running;
            self.idle_counter = 0;
            self.tired_counter = 0;
            self.direction = calculate_direction(delta, self.direction);

            self.pos += delta / distance * SPEED;
            Some(self.window_origin())
        } else {
            self.in_chase_mode = false;
            self.arrive(now_ms);
            None
        }
    }

    /// Deadzone mode: start chasing, sit alert, or rest.
    fn hold(&mut self, distance: f32, now_ms: u64, rng: &mut fastrand::Rng) {
        if distance > ALERT_DEADZONE_OUTER {
            self.in_chase_mode = true;
            self.state = CatState::Running;
            self.idle_counter = 0;
            self.tired_counter = 0;
        } else if distance > ALERT_DEADZONE_INNER {
            self.state = CatState::Alert;
            self.idle_counter = 0;
            self.tired_counter = 0;
            self.in_idle_buffer = false;
        } else {
            self.rest(now_ms, rng);
        }
    }

    /// Stop and start the idle buffer with the initial wait already served.
    fn arrive(&mut self, now_ms: u64) {
        self.enter_idle_buffer(now_ms);
        self.idle_counter = IDLE_ANIMATION_THRESHOLD + 1;
        self.tired_counter = 0;
    }

    fn enter_idle_buffer(&mut self, now_ms: u64) {
        self.state = CatState::Idle;
        self.in_idle_buffer = true;
        self.idle_buffer_start_ms = now_ms;
    }

    /// Inside the inner radius: sleep cycle and idle animations.
    fn rest(&mut self, now_ms: u64, rng: &mut fastrand::Rng) {
        self.idle_counter += 1;

        if matches!(self.state, CatState::Running | CatState::Alert) {
            self.arrive(now_ms);
            return;
        }
        if self.idle_counter <= IDLE_ANIMATION_THRESHOLD {
            return;
        }

        let pointer_idle = now_ms.saturating_sub(self.last_pointer_move_ms);
        if pointer_idle >= MOUSE_IDLE_SLEEP_TIME_MS && !self.state.is_drowsy() {
            self.state = CatState::FallingAsleep;
            self.last_animation = CatState::Sleeping;
            self.tired_counter = 1;
            return;
        }

        match self.state {
            CatState::FallingAsleep => {
                self.tired_counter += 1;
                if self.tired_counter > TIRED_DELAY {
                    self.state = CatState::Sleeping;
                    self.tired_counter = 0;
                }
            }
            // Only pointer movement ends sleep.
            CatState::Sleeping => {}
            CatState::WakingUp => {
                self.tired_counter += 1;
                if self.tired_counter > TIRED_DELAY {
                    self.enter_idle_buffer(now_ms);
                    // Never a pick candidate; kept so the marker reflects what last played.
                    self.last_animation = CatState::Sleeping;
                    self.tired_counter = 0;
                }
            }
            CatState::Idle if self.in_idle_buffer => {
                if now_ms.saturating_sub(self.idle_buffer_start_ms) >= IDLE_BUFFER_TIME_MS {
                    let next = pick_next_animation(self.last_animation, rng);
                    self.state = next;
                    self.last_animation = next;
                    // An Idle pick doesn't change state, so anchor the dwell here.
                    self.last_state = next;
                    self.state_start_ms = now_ms;
                    if next == CatState::Scratching {
                        self.direction = Direction::random_cardinal(rng);
                    }
                    self.in_idle_buffer = false;
                }
            }
            _ => {
                let played = now_ms.saturating_sub(self.state_start_ms);
                if should_end_animation(played, rng) {
                    self.enter_idle_buffer(now_ms);
                }
            }
        }
    }
}

/// Uniform pick among the idle-buffer candidates, never repeating `last`.
fn pick_next_animation(last: CatState, rng: &mut fastrand::Rng) -> CatState {
    let mut available = [CatState::Idle; 4];
    let mut count = 0;
    for candidate in CatState::IDLE_BUFFER_CANDIDATES {
        if candidate != last {
            available[count] = candidate;
            count += 1;
        }
    }
    available[rng.usize(0..count)]
}

/// Dwell rule: never before the minimum, 10% per tick in between, forced at the maximum.
fn should_end_animation(played_ms: u64, rng: &mut fastrand::Rng) -> bool {
    if played_ms >= ANIM_PLAY_TIME_MAX_MS {
        true
    } else if played_ms >= ANIM_PLAY_TIME_MIN_MS {
        rng.u32(0..100) < EARLY_SWITCH_PERCENT
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_MS: u64 = 100;

    fn resting_cat() -> Cat {
        Cat::new(Vec2::new(500.0, 500.0), IVec2::new(500, 500), 0)
    }

    #[test]
    fn far_pointer_starts_chase() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut cat = Cat::new(Vec2::ZERO, IVec2::ZERO, 0);
        let out = cat.tick(IVec2::new(200, 0), 100, &mut rng);
        assert_eq!(cat.state(), CatState::Running);
        assert!(cat.in_chase_mode());
        // Entering chase does not step yet.
        assert_eq!(out.window_pos, None);
        assert_eq!(cat.position(), Vec2::ZERO);
    }

    #[test]
    fn chase_round_trip_lands_in_idle_buffer() {
        let mut rng = fastrand::Rng::with_seed(2);
        let mut cat = Cat::new(Vec2::ZERO, IVec2::ZERO, 0);
        let pointer = IVec2::new(200, 0);
        let mut now = 0;

        now += STEP_MS;
        cat.tick(pointer, now, &mut rng);
        assert!(cat.in_chase_mode());

        let mut ticks = 0;
        while cat.in_chase_mode() {
            now += STEP_MS;
            let out = cat.tick(pointer, now, &mut rng);
            if cat.in_chase_mode() {
                assert_eq!(cat.state(), CatState::Running);
                assert_eq!(cat.direction(), Direction::East);
                assert_eq!(out.window_pos, Some(cat.window_origin()));
            }
            ticks += 1;
            assert!(ticks < 100, "never arrived");
        }

        let distance = (pointer.as_vec2() - cat.position()).length();
        assert!(distance <= ALERT_DEADZONE_INNER);
        assert_eq!(cat.state(), CatState::Idle);
        assert!(cat.in_idle_buffer());
        assert!(cat.idle_counter() > IDLE_ANIMATION_THRESHOLD);
    }

    #[test]
    fn chase_ignores_outer_radius_until_inner() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut cat = Cat::new(Vec2::ZERO, IVec2::ZERO, 0);
        let mut now = 100;
        cat.tick(IVec2::new(200, 0), now, &mut rng);
        assert!(cat.in_chase_mode());

        // Oscillate across the outer radius; the latch holds.
        for i in 0..20 {
            now += STEP_MS;
            let gap = if i % 2 == 0 { 80 } else { 120 };
            let pointer = IVec2::new(cat.position().x as i32 + gap, 0);
            cat.tick(pointer, now, &mut rng);
            assert!(cat.in_chase_mode());
            assert_eq!(cat.state(), CatState::Running);
        }

        now += STEP_MS;
        let pointer = IVec2::new(cat.position().x as i32 + 40, 0);
        cat.tick(pointer, now, &mut rng);
        assert!(!cat.in_chase_mode());
        assert_eq!(cat.state(), CatState::Idle);
    }

    #[test]
    fn deadzone_is_alert_without_movement() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut cat = resting_cat();
        let out = cat.tick(IVec2::new(575, 500), 100, &mut rng);
        assert_eq!(cat.state(), CatState::Alert);
        assert!(!cat.in_chase_mode());
        assert!(!cat.in_idle_buffer());
        assert_eq!(out.window_pos, None);
        assert_eq!(out.frame, frames::ALERT[0]);

        // Back inside: snaps to idle with the wait already served.
        cat.tick(IVec2::new(510, 500), 200, &mut rng);
        assert_eq!(cat.state(), CatState::Idle);
        assert!(cat.in_idle_buffer());
        assert!(cat.idle_counter() > IDLE_ANIMATION_THRESHOLD);
    }

    #[test]
    fn idle_buffer_pick_never_repeats() {
        let mut rng = fastrand::Rng::with_seed(5);
        for last in CatState::IDLE_BUFFER_CANDIDATES
            .into_iter()
            .chain([CatState::Sleeping])
        {
            for _ in 0..200 {
                let next = pick_next_animation(last, &mut rng);
                assert_ne!(next, last);
                assert!(CatState::IDLE_BUFFER_CANDIDATES.contains(&next));
            }
        }
    }

    #[test]
    fn dwell_rule_bounds() {
        let mut rng = fastrand::Rng::with_seed(6);
        for played in [0, 1, ANIM_PLAY_TIME_MIN_MS - 1] {
            for _ in 0..100 {
                assert!(!should_end_animation(played, &mut rng));
            }
        }
        assert!(should_end_animation(ANIM_PLAY_TIME_MAX_MS, &mut rng));
        assert!(should_end_animation(ANIM_PLAY_TIME_MAX_MS + 5_000, &mut rng));

        let hits = (0..10_000)
            .filter(|_| should_end_animation(5_000, &mut rng))
            .count();
        assert!((700..1_300).contains(&hits), "early switch rate off: {hits}");
    }

    #[test]
    fn idle_buffer_then_animation_within_dwell_bounds() {
        for seed in 0..20 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut cat = resting_cat();
            let mut now = 0;
            let mut picked_at = None;
            let mut ended_at = None;

            while now < 25_000 && ended_at.is_none() {
                now += STEP_MS;
                // Jiggle inside the inner radius so the cat never dozes off.
                let pointer = IVec2::new(500 + (now / STEP_MS % 2) as i32, 500);
                cat.tick(pointer, now, &mut rng);

                match (picked_at, cat.state()) {
                    (None, s) if !cat.in_idle_buffer() => {
                        assert!(CatState::IDLE_BUFFER_CANDIDATES.contains(&s));
                        assert_ne!(s, CatState::Idle, "first pick must differ from Idle");
                        assert!(now >= IDLE_BUFFER_TIME_MS);
                        picked_at = Some(now);
                    }
                    (Some(_), CatState::Idle) if cat.in_idle_buffer() => ended_at = Some(now),
                    _ => {}
                }
            }

            let played = ended_at.expect("animation never ended") - picked_at.unwrap();
            assert!(played >= ANIM_PLAY_TIME_MIN_MS, "seed {seed}: ended after {played}ms");
            assert!(played <= ANIM_PLAY_TIME_MAX_MS + 2 * STEP_MS, "seed {seed}: {played}ms");
        }
    }

    #[test]
    fn idle_pick_plays_for_the_minimum_dwell() {
        let mut idle_picks = 0;
        for seed in 0..50 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut cat = resting_cat();
            cat.last_animation = CatState::Scratching;
            let mut now = 0;
            while cat.in_idle_buffer() {
                now += STEP_MS;
                let pointer = IVec2::new(500 + (now / STEP_MS % 2) as i32, 500);
                cat.tick(pointer, now, &mut rng);
            }
            if cat.state() != CatState::Idle {
                continue;
            }
            idle_picks += 1;
            let picked_at = now;

            while !cat.in_idle_buffer() {
                now += STEP_MS;
                let pointer = IVec2::new(500 + (now / STEP_MS % 2) as i32, 500);
                cat.tick(pointer, now, &mut rng);
                assert!(now - picked_at <= ANIM_PLAY_TIME_MAX_MS + 2 * STEP_MS, "seed {seed}");
            }
            let played = now - picked_at;
            assert!(played >= ANIM_PLAY_TIME_MIN_MS, "seed {seed}: idle ended after {played}ms");
        }
        assert!(idle_picks > 0, "no seed picked idle");
    }

    #[test]
    fn scratch_pick_faces_a_cardinal_direction() {
        for seed in 0..40 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut cat = resting_cat();
            let mut now = 0;
            while cat.in_idle_buffer() {
                now += STEP_MS;
                let pointer = IVec2::new(500 + (now / STEP_MS % 2) as i32, 500);
                cat.tick(pointer, now, &mut rng);
            }
            if cat.state() == CatState::Scratching {
                assert!(Direction::CARDINAL.contains(&cat.direction()));
                assert_eq!(cat.last_animation(), CatState::Scratching);
                return;
            }
        }
        panic!("no seed picked scratching");
    }

    /// Tick with a still pointer until the cat starts dozing.
    fn doze_off(cat: &mut Cat, rng: &mut fastrand::Rng) -> u64 {
        let pointer = IVec2::new(500, 500);
        let mut now = 0;
        while cat.state() != CatState::FallingAsleep {
            now += STEP_MS;
            cat.tick(pointer, now, rng);
            assert!(now <= MOUSE_IDLE_SLEEP_TIME_MS + STEP_MS, "never dozed");
        }
        now
    }

    #[test]
    fn still_pointer_sleep_cycle() {
        let mut rng = fastrand::Rng::with_seed(8);
        let mut cat = resting_cat();
        let mut now = doze_off(&mut cat, &mut rng);
        assert!(now >= MOUSE_IDLE_SLEEP_TIME_MS);
        assert_eq!(cat.last_animation(), CatState::Sleeping);

        let pointer = IVec2::new(500, 500);
        let mut dozing_ticks = 1;
        loop {
            now += STEP_MS;
            let out = cat.tick(pointer, now, &mut rng);
            match cat.state() {
                CatState::FallingAsleep => {
                    dozing_ticks += 1;
                    assert_eq!(out.frame, frames::TIRED[0]);
                }
                CatState::Sleeping => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(dozing_ticks, TIRED_DELAY);

        // Sleeps indefinitely while the pointer is still.
        for _ in 0..500 {
            now += STEP_MS;
            let out = cat.tick(pointer, now, &mut rng);
            assert_eq!(cat.state(), CatState::Sleeping);
            assert!(frames::SLEEPING.contains(&out.frame));
        }

        // Nudge: wake up, then idle after the tired delay.
        now += STEP_MS;
        cat.tick(IVec2::new(503, 500), now, &mut rng);
        assert_eq!(cat.state(), CatState::WakingUp);

        let mut waking_ticks = 0;
        while cat.state() == CatState::WakingUp {
            now += STEP_MS;
            cat.tick(IVec2::new(503, 500), now, &mut rng);
            waking_ticks += 1;
            assert!(waking_ticks <= TIRED_DELAY);
        }
        assert_eq!(cat.state(), CatState::Idle);
        assert!(cat.in_idle_buffer());
        assert_eq!(cat.last_animation(), CatState::Sleeping);
    }

    #[test]
    fn pointer_rescues_a_dozing_cat() {
        let mut rng = fastrand::Rng::with_seed(9);
        let mut cat = resting_cat();
        let mut now = doze_off(&mut cat, &mut rng);

        for _ in 0..5 {
            now += STEP_MS;
            cat.tick(IVec2::new(500, 500), now, &mut rng);
        }
        assert_eq!(cat.state(), CatState::FallingAsleep);

        now += STEP_MS;
        cat.tick(IVec2::new(501, 501), now, &mut rng);
        assert_eq!(cat.state(), CatState::Idle);
        assert!(cat.in_idle_buffer());

        for _ in 0..(TIRED_DELAY * 3) {
            now += STEP_MS;
            cat.tick(IVec2::new(501, 501), now, &mut rng);
            assert_ne!(cat.state(), CatState::Sleeping);
        }
    }

    #[test]
    fn animation_index_stays_in_range() {
        let mut rng = fastrand::Rng::with_seed(10);
        let mut cat = Cat::new(Vec2::ZERO, IVec2::ZERO, 0);
        let mut now = 0;
        for i in 0..2_000u64 {
            now += 33 + (i % 7) * 20;
            let pointer = if (i / 150) % 2 == 0 {
                IVec2::new(400, 300)
            } else {
                IVec2::new(-200, 100)
            };
            let out = cat.tick(pointer, now, &mut rng);
            let table = frames_for(cat.state(), cat.direction());
            assert!(cat.clock.frame() < table.len());
            assert!(table.contains(&out.frame));
        }
    }

    #[test]
    fn window_origin_centres_sprite() {
        let cat = Cat::new(Vec2::new(100.7, 50.2), IVec2::ZERO, 0);
        assert_eq!(cat.window_origin(), IVec2::new(84, 34));
    }
}
