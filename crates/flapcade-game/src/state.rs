//! Game state and its per-tick transition.

use std::time::Duration;

use rand::Rng;

use crate::PhysicsConfig;

/// The player-controlled circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subject {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    pub radius: f64,
}

/// One obstacle: a column with an opening between `gap_top` and
/// `gap_bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Left edge.
    pub x: f64,
    pub width: f64,
    pub gap_top: f64,
    pub gap_bottom: f64,
    /// Set once the subject has passed it; never cleared.
    pub scored: bool,
}

impl Obstacle {
    fn trailing_edge(&self) -> f64 {
        self.x + self.width
    }

    fn overlaps_horizontally(&self, subject: &Subject) -> bool {
        subject.x + subject.radius > self.x && subject.x - subject.radius < self.trailing_edge()
    }

    fn admits_vertically(&self, subject: &Subject) -> bool {
        subject.y - subject.radius >= self.gap_top && subject.y + subject.radius <= self.gap_bottom
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first flap. Ticks do nothing.
    #[default]
    Idle,
    Running,
    /// Absorbing: nothing changes the state once here.
    Terminal,
}

/// What ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Hit the ground or flew off the top of the field.
    Boundary,
    Obstacle,
}

/// Emitted exactly once, on the tick a run becomes terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub score: u64,
    pub cause: DeathCause,
}

/// Complete simulation state, threaded through [`GameState::tick`] by
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub subject: Subject,
    /// Ordered by spawn time, oldest (leftmost) first.
    pub obstacles: Vec<Obstacle>,
    pub score: u64,
    pub phase: Phase,
    /// Simulated time since the last spawn (or since the run started).
    pub since_spawn: Duration,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default(), 0)
    }
}

impl GameState {
    /// A fresh, idle run. `initial_score` is where the counter starts;
    /// everything else is the same as a new game.
    pub fn new(physics: &PhysicsConfig, initial_score: u64) -> Self {
        Self {
            subject: Subject {
                x: physics.subject_x,
                y: physics.subject_start_y,
                velocity: 0.0,
                radius: physics.subject_radius,
            },
            obstacles: Vec::new(),
            score: initial_score,
            phase: Phase::Idle,
            since_spawn: Duration::ZERO,
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Applies a flap: velocity is overwritten with the impulse. The first
    /// flap starts the run and the spawn timer. No-op once terminal.
    pub fn flap(mut self, physics: &PhysicsConfig) -> Self {
        match self.phase {
            Phase::Terminal => return self,
            Phase::Idle => {
                self.phase = Phase::Running;
                self.since_spawn = Duration::ZERO;
            }
            Phase::Running => {}
        }
        self.subject.velocity = physics.flap_impulse;
        self
    }

    /// Advances one tick of `dt` simulated time.
    ///
    /// Only a running game changes. On the tick the run ends, the returned
    /// state keeps the pre-tick subject and obstacles, its phase is
    /// `Terminal`, and its score includes anything scored earlier in the
    /// same tick; the `GameOver` carries that score.
    pub fn tick<R: Rng>(
        self,
        dt: Duration,
        physics: &PhysicsConfig,
        rng: &mut R,
    ) -> (Self, Option<GameOver>) {
        if self.phase != Phase::Running {
            return (self, None);
        }

        let mut subject = self.subject;
        subject.velocity += physics.gravity;
        subject.y += subject.velocity;

        if subject.y + subject.radius > physics.floor() || subject.y - subject.radius < 0.0 {
            let score = self.score;
            return self.end(score, DeathCause::Boundary);
        }

        let mut obstacles = self.obstacles.clone();
        let mut since_spawn = self.since_spawn + dt;
        if since_spawn > physics.spawn_interval {
            obstacles.push(spawn_obstacle(physics, rng));
            since_spawn = Duration::ZERO;
        }

        for obstacle in &mut obstacles {
            obstacle.x -= physics.obstacle_speed;
        }
        obstacles.retain(|o| o.trailing_edge() > -physics.cull_margin);

        let mut score = self.score;
        for obstacle in &mut obstacles {
            if !obstacle.scored && obstacle.trailing_edge() < subject.x {
                obstacle.scored = true;
                score += 1;
            }
            if obstacle.overlaps_horizontally(&subject) && !obstacle.admits_vertically(&subject) {
                return self.end(score, DeathCause::Obstacle);
            }
        }

        let next = Self {
            subject,
            obstacles,
            score,
            phase: Phase::Running,
            since_spawn,
        };
        (next, None)
    }

    fn end(mut self, score: u64, cause: DeathCause) -> (Self, Option<GameOver>) {
        self.phase = Phase::Terminal;
        self.score = score;
        (self, Some(GameOver { score, cause }))
    }
}

fn spawn_obstacle<R: Rng>(physics: &PhysicsConfig, rng: &mut R) -> Obstacle {
    let (low, high) = physics.gap_top_range();
    let gap_top = if high > low {
        rng.random_range(low..high)
    } else {
        low
    };
    Obstacle {
        x: physics.width,
        width: physics.obstacle_width,
        gap_top,
        gap_bottom: gap_top + physics.obstacle_gap,
        scored: false,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const DT: Duration = Duration::from_micros(16_667);

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn running(initial_score: u64) -> GameState {
        let mut state = GameState::new(&physics(), initial_score);
        state.phase = Phase::Running;
        state
    }

    fn obstacle(x: f64, gap_top: f64, gap_bottom: f64) -> Obstacle {
        Obstacle {
            x,
            width: 80.0,
            gap_top,
            gap_bottom,
            scored: false,
        }
    }

    // =====================================================================
    // flap()
    // =====================================================================

    #[test]
    fn test_flap_from_idle_starts_run() {
        let state = GameState::default();
        assert!(!state.is_started());

        let state = state.flap(&physics());
        assert!(state.is_started());
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.subject.velocity, -8.0);
        assert_eq!(state.since_spawn, Duration::ZERO);
    }

    #[test]
    fn test_flap_overwrites_without_stacking() {
        let p = physics();
        let state = GameState::default().flap(&p).flap(&p).flap(&p);
        assert_eq!(state.subject.velocity, -8.0);
    }

    #[test]
    fn test_flap_when_terminal_is_noop() {
        let mut state = running(3);
        state.phase = Phase::Terminal;
        let before = state.clone();
        assert_eq!(state.flap(&physics()), before);
    }

    // =====================================================================
    // tick()
    // =====================================================================

    #[test]
    fn test_tick_idle_does_nothing() {
        let state = GameState::default();
        let (next, over) = state.clone().tick(DT, &physics(), &mut rng());
        assert_eq!(next, state);
        assert!(over.is_none());
    }

    #[test]
    fn test_tick_semi_implicit_integration() {
        let (next, _) = running(0).tick(DT, &physics(), &mut rng());
        assert!((next.subject.velocity - 0.4).abs() < 1e-9);
        assert!((next.subject.y - 300.4).abs() < 1e-9);
    }

    #[test]
    fn test_tick_carried_score_first_pass_adds_one() {
        let mut state = running(7);
        state.obstacles.push(obstacle(21.0, 200.0, 450.0));

        let (next, over) = state.tick(DT, &physics(), &mut rng());
        assert!(over.is_none());
        assert_eq!(next.score, 8, "resumed run counts on from the carried score");
        assert!(next.obstacles[0].scored);
        assert_eq!(next.obstacles[0].x, 19.0);
    }

    #[test]
    fn test_tick_obstacle_scores_only_once() {
        let mut state = running(0);
        state.obstacles.push(obstacle(21.0, 200.0, 450.0));
        let p = physics();
        let mut rng = rng();

        let (state, _) = state.tick(DT, &p, &mut rng);
        let (state, _) = state.tick(DT, &p, &mut rng);
        let (state, _) = state.tick(DT, &p, &mut rng);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_tick_falls_to_ground_and_reports_once() {
        let p = physics();
        let mut rng = rng();
        let mut state = GameState::new(&p, 0).flap(&p);

        let mut ticks = 0;
        let over = loop {
            ticks += 1;
            let (next, over) = state.tick(DT, &p, &mut rng);
            state = next;
            if let Some(over) = over {
                break over;
            }
            assert!(ticks < 1_000, "subject never hit the ground");
        };

        assert_eq!(ticks, 61);
        assert_eq!(over, GameOver { score: 0, cause: DeathCause::Boundary });
        assert!(state.is_terminal());
        // Pre-tick position is kept on the terminal tick.
        assert!(state.subject.y + state.subject.radius <= p.floor());

        let frozen = state.clone();
        for _ in 0..10 {
            let (next, over) = state.flap(&p).tick(DT, &p, &mut rng);
            assert!(over.is_none());
            state = next;
        }
        assert_eq!(state, frozen);
    }

    #[test]
    fn test_tick_ceiling_is_a_boundary() {
        let mut state = running(2);
        state.subject.y = 21.0;
        state.subject.velocity = -8.0;

        let (next, over) = state.tick(DT, &physics(), &mut rng());
        assert_eq!(over, Some(GameOver { score: 2, cause: DeathCause::Boundary }));
        assert_eq!(next.subject.y, 21.0);
    }

    #[test]
    fn test_tick_spawns_at_far_edge_after_interval() {
        let mut state = running(0);
        state.since_spawn = Duration::from_millis(3000);

        let (next, _) = state.tick(DT, &physics(), &mut rng());
        assert_eq!(next.obstacles.len(), 1);
        assert_eq!(next.obstacles[0].x, 798.0);
        assert_eq!(next.since_spawn, Duration::ZERO);
    }

    #[test]
    fn test_tick_no_spawn_before_interval() {
        let mut state = running(0);
        state.since_spawn = Duration::from_millis(2900);

        let (next, _) = state.tick(DT, &physics(), &mut rng());
        assert!(next.obstacles.is_empty());
        assert_eq!(next.since_spawn, Duration::from_millis(2900) + DT);
    }

    #[test]
    fn test_spawned_gap_stays_in_safe_range() {
        let p = physics();
        for seed in 0..200 {
            let o = spawn_obstacle(&p, &mut StdRng::seed_from_u64(seed));
            assert!((80.0..250.0).contains(&o.gap_top), "gap_top {}", o.gap_top);
            assert!(((o.gap_bottom - o.gap_top) - 250.0).abs() < 1e-9);
            assert!(o.gap_bottom <= p.height - p.gap_bottom_margin);
        }
    }

    #[test]
    fn test_tick_culls_past_margin() {
        let mut state = running(0);
        state.obstacles.push(Obstacle {
            scored: true,
            ..obstacle(-128.0, 200.0, 450.0)
        });
        state.obstacles.push(Obstacle {
            scored: true,
            ..obstacle(-129.0, 200.0, 450.0)
        });

        let (next, _) = state.tick(DT, &physics(), &mut rng());
        // -130 + 80 = -50 is culled; -131 + 80 likewise.
        assert!(next.obstacles.is_empty());

        let mut state = running(0);
        state.obstacles.push(Obstacle {
            scored: true,
            ..obstacle(-127.0, 200.0, 450.0)
        });
        let (next, _) = state.tick(DT, &physics(), &mut rng());
        assert_eq!(next.obstacles.len(), 1);
    }

    #[test]
    fn test_tick_collision_ends_run_with_pre_tick_state() {
        let mut state = running(4);
        // Gap far above the subject; obstacle overlapping horizontally.
        state.obstacles.push(obstacle(90.0, 50.0, 150.0));
        let before = state.clone();

        let (next, over) = state.tick(DT, &physics(), &mut rng());
        assert_eq!(over, Some(GameOver { score: 4, cause: DeathCause::Obstacle }));
        assert_eq!(next.subject, before.subject);
        assert_eq!(next.obstacles, before.obstacles);
        assert!(next.is_terminal());
    }

    #[test]
    fn test_tick_collision_keeps_points_scored_same_tick() {
        let mut state = running(12);
        // Three already-passed obstacles plus one the subject is inside.
        state.obstacles.push(obstacle(-20.0, 200.0, 450.0));
        state.obstacles.push(obstacle(-10.0, 200.0, 450.0));
        state.obstacles.push(obstacle(21.0, 200.0, 450.0));
        state.obstacles.push(obstacle(95.0, 400.0, 550.0));

        let (next, over) = state.tick(DT, &physics(), &mut rng());
        assert_eq!(over, Some(GameOver { score: 15, cause: DeathCause::Obstacle }));
        assert_eq!(next.score, 15);
    }

    #[test]
    fn test_tick_passing_through_gap_survives() {
        let mut state = running(0);
        state.obstacles.push(obstacle(90.0, 200.0, 450.0));

        let (next, over) = state.tick(DT, &physics(), &mut rng());
        assert!(over.is_none());
        assert_eq!(next.phase, Phase::Running);
    }
}
