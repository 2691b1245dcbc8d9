//! The game loop
//!
//! `Loading` until every sprite has arrived, then `Playing` forever. Each
//! frame renders the current positions, then advances the session by the
//! time since the previous frame. A win rebuilds the session; a loss only
//! sends the player back to start.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::assets::ResourceCache;
use crate::platform::{FrameStats, InputQueue, InputSender, Scheduler, input_channel};
use crate::renderer::Surface;
use crate::settings::{DetectorMode, GameConfig};
use crate::sim::{
    CollisionDetector, EventBus, GameSignal, Grid, OffloadedDetector, Session, SyncDetector,
};
use crate::sprites;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for sprites
    Loading,
    /// Game running
    Playing,
}

/// Frames between FPS log lines
const FPS_LOG_INTERVAL: u64 = 600;

pub struct Engine<S: Surface> {
    grid: Grid,
    obstacle_count: usize,
    surface: S,
    cache: ResourceCache,
    phase: Phase,
    ready: Rc<Cell<bool>>,

    session: Session,
    generation: u64,
    seeder: Pcg32,

    detector: Box<dyn CollisionDetector>,
    events: EventBus,
    input: InputQueue,
    input_tx: InputSender,

    last_time: f64,
    stats: FrameStats,
    frames: u64,
    wins: u64,
    losses: u64,
}

impl<S: Surface> Engine<S> {
    /// Build the entities, request every sprite and wait for readiness
    pub fn new(
        config: &GameConfig,
        grid: Grid,
        surface: S,
        mut cache: ResourceCache,
    ) -> std::io::Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut seeder = Pcg32::seed_from_u64(seed);
        log::info!("Game initialized with seed: {}", seed);

        let detector: Box<dyn CollisionDetector> = match config.detector {
            DetectorMode::Sync => Box::new(SyncDetector::new()),
            DetectorMode::Offloaded => Box::new(OffloadedDetector::spawn()?),
        };
        log::info!("Collision detection: {}", config.detector.as_str());

        let session = Session::new(&grid, config.obstacle_count, 0, seeder.random());

        cache.load(sprites::ALL);
        let ready = Rc::new(Cell::new(false));
        if cache.is_ready() {
            // Nothing left to complete, so a ready callback would never fire
            ready.set(true);
        } else {
            let flag = Rc::clone(&ready);
            cache.on_ready(move || flag.set(true));
        }

        let (input_tx, input) = input_channel();
        Ok(Self {
            grid,
            obstacle_count: config.obstacle_count,
            surface,
            cache,
            phase: Phase::Loading,
            ready,
            session,
            generation: 0,
            seeder,
            detector,
            events: EventBus::new(),
            input,
            input_tx,
            last_time: 0.0,
            stats: FrameStats::default(),
            frames: 0,
            wins: 0,
            losses: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Handle for key handlers; moves apply on the next update
    pub fn input_sender(&self) -> InputSender {
        self.input_tx.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps()
    }

    pub fn wins(&self) -> u64 {
        self.wins
    }

    pub fn losses(&self) -> u64 {
        self.losses
    }

    /// Block until the sprites are in or `timeout` passes; true if ready
    pub fn wait_until_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.ready.get() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.cache.poll_timeout(deadline - now);
        }
        self.ready.get()
    }

    /// Run frames until the scheduler stops
    pub fn run(&mut self, scheduler: &mut dyn Scheduler) {
        while let Some(now) = scheduler.next_frame() {
            self.frame(now);
        }
    }

    /// One scheduler iteration at `now` (milliseconds)
    pub fn frame(&mut self, now: f64) {
        match self.phase {
            Phase::Loading => {
                self.cache.poll();
                if self.ready.get() {
                    self.start(now);
                    self.tick(now);
                }
            }
            Phase::Playing => self.tick(now),
        }
    }

    /// Discard every entity and build a new session
    pub fn reset(&mut self) {
        self.generation += 1;
        self.session = Session::new(
            &self.grid,
            self.obstacle_count,
            self.generation,
            self.seeder.random(),
        );
        log::info!("Session {} started", self.generation);
    }

    fn start(&mut self, now: f64) {
        self.reset();
        self.last_time = now;
        self.phase = Phase::Playing;
        log::info!("Lane Crossing running!");
    }

    fn tick(&mut self, now: f64) {
        let dt = ((now - self.last_time) / 1000.0) as f32;
        self.render();
        self.update(dt);
        self.last_time = now;

        self.stats.record(now);
        self.frames += 1;
        if self.frames % FPS_LOG_INTERVAL == 0 {
            log::debug!("{} fps", self.stats.fps());
        }
    }

    fn render(&mut self) {
        self.surface.clear();

        for row in 0..self.grid.rows {
            let id = sprites::ROW_BACKGROUND
                .get(row as usize)
                .copied()
                .unwrap_or(sprites::GRASS);
            let Some(tile) = self.cache.sprite(id) else {
                continue;
            };
            for col in 0..self.grid.columns {
                self.surface.draw_sprite(
                    tile,
                    col as f32 * self.grid.cell_width,
                    row as f32 * self.grid.cell_height,
                );
            }
        }

        for obstacle in &self.session.obstacles {
            obstacle.render(&mut self.surface, &self.cache);
        }
        self.session.player.render(&mut self.surface, &self.cache);
    }

    fn update(&mut self, dt: f32) {
        let moves = self.input.drain();
        crate::sim::update(
            &mut self.session,
            &moves,
            dt,
            self.detector.as_mut(),
            &mut self.events,
        );

        let signals = self.events.drain();
        if signals.contains(&GameSignal::Win) {
            self.wins += 1;
            log::info!("Player reached the far side");
            self.reset();
        } else if signals.contains(&GameSignal::Lose) {
            self.losses += 1;
            log::info!("Player hit an obstacle");
            self.generation += 1;
            self.session.reset_player(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageFetcher, PlaceholderFetcher, Sprite};
    use crate::error::LoadError;
    use crate::platform::{Direction, ManualScheduler};
    use crate::renderer::RecordingSurface;
    use glam::Vec2;
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(5);

    fn config(detector: DetectorMode) -> GameConfig {
        GameConfig {
            seed: Some(2024),
            detector,
            ..Default::default()
        }
    }

    fn engine(detector: DetectorMode) -> Engine<RecordingSurface> {
        let grid = Grid::default();
        let (w, h) = grid.surface_size();
        let cache = ResourceCache::new(Arc::new(PlaceholderFetcher));
        Engine::new(&config(detector), grid, RecordingSurface::new(w, h), cache).unwrap()
    }

    fn playing(detector: DetectorMode) -> Engine<RecordingSurface> {
        let mut engine = engine(detector);
        assert!(engine.wait_until_ready(WAIT));
        engine.frame(1000.0);
        assert_eq!(engine.phase(), Phase::Playing);
        engine
    }

    /// Put an obstacle right next to the player, one row up from start
    fn park_obstacle_on_player(engine: &mut Engine<RecordingSurface>) {
        let lane = engine.grid().lanes()[2];
        let session = engine.session_mut();
        session.player.move_toward(Direction::Up);
        let player = session.player.pos();
        session.obstacles[0].pos = Vec2::new(player.x - 5.0, lane);
    }

    #[test]
    fn test_starts_loading_then_plays() {
        let mut engine = engine(DetectorMode::Sync);
        assert_eq!(engine.phase(), Phase::Loading);
        assert_eq!(engine.frames(), 0);

        assert!(engine.wait_until_ready(WAIT));
        engine.frame(500.0);
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(engine.frames(), 1);
        assert_eq!(engine.session().generation, 1);
    }

    #[test]
    fn test_render_draws_background_then_entities() {
        let engine = playing(DetectorMode::Sync);
        let surface = engine.surface();
        let grid = engine.grid();

        let tiles = (grid.rows * grid.columns) as usize;
        assert_eq!(surface.calls.len(), tiles + 5 + 1);
        assert_eq!(surface.calls[0].sprite, sprites::WATER);
        assert_eq!(surface.calls_for(sprites::ENEMY).count(), 5);

        let player = surface.calls.last().unwrap();
        assert_eq!(player.sprite, sprites::PLAYER);
        assert_eq!((player.x, player.y), (202.0, 322.0));
    }

    #[test]
    fn test_dt_from_timestamps() {
        let mut engine = playing(DetectorMode::Sync);
        let before = engine.session().obstacles[0].pos.x;
        let speed = engine.session().obstacles[0].current_speed().unwrap();

        engine.frame(1100.0);
        let after = engine.session().obstacles[0].pos.x;
        assert!((after - (before + speed * 0.1)).abs() < 1e-3);
    }

    #[test]
    fn test_win_resets_session() {
        let mut engine = playing(DetectorMode::Sync);
        let input = engine.input_sender();
        for _ in 0..4 {
            input.send(Direction::Up);
        }

        engine.frame(1000.0);
        assert_eq!(engine.wins(), 1);
        assert_eq!(engine.session().generation, 2);
        assert_eq!(engine.session().player.pos(), engine.grid().player_start());
    }

    #[test]
    fn test_input_applies_on_next_update() {
        let mut engine = playing(DetectorMode::Sync);
        let input = engine.input_sender();
        assert!(input.send_key("ArrowLeft"));
        assert!(!input.send_key("KeyQ"));

        engine.frame(1000.0);
        assert_eq!(engine.session().player.pos(), Vec2::new(101.0, 322.0));
    }

    #[test]
    fn test_lose_resets_player_only() {
        let mut engine = playing(DetectorMode::Sync);
        park_obstacle_on_player(&mut engine);

        let xs: Vec<f32> = engine.session().obstacles.iter().map(|o| o.pos.x).collect();
        engine.frame(1000.0);
        assert_eq!(engine.losses(), 1);
        assert_eq!(engine.session().generation, 2);
        assert_eq!(engine.session().player.pos(), engine.grid().player_start());

        // Same obstacles, not a new session
        let after: Vec<f32> = engine.session().obstacles.iter().map(|o| o.pos.x).collect();
        assert_eq!(xs, after);
    }

    /// Reports each snapshot's verdict one frame late, keeping only the current generation
    #[derive(Default)]
    struct LaggingDetector {
        pending: Option<(u64, bool)>,
    }

    impl CollisionDetector for LaggingDetector {
        fn detect(&mut self, snapshot: crate::sim::Snapshot) -> bool {
            let touching = snapshot.evaluate().is_ok_and(|v| v.is_touching());
            let previous = self.pending.replace((snapshot.generation, touching));
            previous.is_some_and(|(generation, hit)| hit && generation == snapshot.generation)
        }
    }

    #[test]
    fn test_late_verdict_after_lose_is_dropped() {
        let mut engine = playing(DetectorMode::Sync);
        engine.detector = Box::new(LaggingDetector::default());
        park_obstacle_on_player(&mut engine);

        // The hit is seen on frame one and reported on frame two
        engine.frame(1000.0);
        assert_eq!(engine.losses(), 0);
        engine.frame(1000.0);
        assert_eq!(engine.losses(), 1);
        assert_eq!(engine.session().player.pos(), engine.grid().player_start());

        // Frame two's snapshot still had the player on the obstacle
        engine.input_sender().send(Direction::Left);
        engine.frame(1000.0);
        assert_eq!(engine.losses(), 1);
        assert_eq!(engine.session().player.pos(), Vec2::new(101.0, 322.0));
    }

    #[test]
    fn test_offloaded_lose_arrives_later() {
        let mut engine = playing(DetectorMode::Offloaded);
        park_obstacle_on_player(&mut engine);

        let deadline = Instant::now() + WAIT;
        while engine.losses() == 0 && Instant::now() < deadline {
            // Same timestamp keeps the obstacle parked
            engine.frame(1000.0);
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(engine.losses(), 1);
        assert_eq!(engine.session().player.pos(), engine.grid().player_start());
    }

    #[test]
    fn test_run_consumes_scheduler() {
        let mut engine = engine(DetectorMode::Sync);
        assert!(engine.wait_until_ready(WAIT));

        let mut scheduler = ManualScheduler::evenly_spaced(0.0, 16.0, 10);
        engine.run(&mut scheduler);
        assert_eq!(engine.frames(), 10);
        assert!(scheduler.next_frame().is_none());
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = playing(DetectorMode::Sync);
        let mut b = playing(DetectorMode::Sync);
        for i in 1..100 {
            a.frame(1000.0 + i as f64 * 16.0);
            b.frame(1000.0 + i as f64 * 16.0);
        }
        let xs = |e: &Engine<RecordingSurface>| -> Vec<f32> {
            e.session().obstacles.iter().map(|o| o.pos.x).collect()
        };
        assert_eq!(xs(&a), xs(&b));
    }

    struct NoPlayerSprite;

    impl ImageFetcher for NoPlayerSprite {
        fn fetch(&self, id: &str) -> Result<Sprite, LoadError> {
            if id == sprites::PLAYER {
                return Err(LoadError::Unknown(id.to_string()));
            }
            PlaceholderFetcher.fetch(id)
        }
    }

    #[test]
    fn test_failed_sprite_never_starts() {
        let grid = Grid::default();
        let cache = ResourceCache::new(Arc::new(NoPlayerSprite));
        let mut engine =
            Engine::new(&config(DetectorMode::Sync), grid, RecordingSurface::new(1, 1), cache)
                .unwrap();

        assert!(!engine.wait_until_ready(Duration::from_millis(200)));
        engine.frame(0.0);
        assert_eq!(engine.phase(), Phase::Loading);
        assert_eq!(engine.cache().failed(), [sprites::PLAYER.to_string()]);
    }
}
