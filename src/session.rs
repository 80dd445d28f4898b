//! One running game: score, lives, level and the tick pipeline.
//!
//! A tick runs in a fixed order: the player moves, then every ghost (chasing
//! the player's new cell), then collisions are resolved against the
//! post-move positions, and finally the level advances if the board is
//! clear. Nothing here knows about wall-clock time; the host decides how
//! often to call [`Session::tick`].

use tracing::{debug, info};

use crate::collectible::{CollectibleKind, CollectibleSet};
use crate::components::{Direction, Pos};
use crate::config::{Dimensions, GhostTuning, SessionConfig};
use crate::constants::BLINK_TICKS;
use crate::error::GameResult;
use crate::ghost::{Ghost, GhostKind, GhostState};
use crate::level::Maze;
use crate::player::Pacman;
use crate::rng::{RandomSource, StdRandom};

/// Something that happened during a tick, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    CollectibleTaken {
        pos: Pos,
        kind: CollectibleKind,
        points: u32,
    },
    PowerActivated {
        affected: usize,
    },
    GhostEaten {
        kind: GhostKind,
        pos: Pos,
        points: u32,
    },
    PlayerDied {
        lives_left: u32,
    },
    LevelAdvanced {
        level: u32,
    },
    GameOver {
        score: u32,
        level: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub level: u32,
    pub frames: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub pos: Pos,
    pub pixel: (f32, f32),
    pub direction: Direction,
    pub alive: bool,
    pub invulnerable: bool,
    pub blink: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GhostView {
    pub kind: GhostKind,
    pub pos: Pos,
    pub pixel: (f32, f32),
    pub direction: Direction,
    pub state: GhostState,
    pub flashing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleView {
    pub pos: Pos,
    pub kind: CollectibleKind,
    pub phase: u32,
}

/// Read-only picture of the session for renderers and HUDs.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub remaining: usize,
    pub frame: u64,
    pub active: bool,
    pub paused: bool,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    /// Uncollected items only.
    pub collectibles: Vec<CollectibleView>,
}

enum LevelSource {
    Generated(Dimensions),
    Layout(Maze),
}

type EndObserver = Box<dyn FnMut(&SessionSummary)>;
type LevelObserver = Box<dyn FnMut(u32)>;

pub struct Session<R: RandomSource = StdRandom> {
    config: SessionConfig,
    source: LevelSource,
    maze: Maze,
    collectibles: CollectibleSet,
    player: Pacman,
    ghosts: Vec<Ghost>,
    score: u32,
    lives: u32,
    level: u32,
    frame: u64,
    active: bool,
    paused: bool,
    rng: R,
    end_observers: Vec<EndObserver>,
    level_observers: Vec<LevelObserver>,
}

impl<R: RandomSource> Session<R> {
    /// Starts a session on freshly generated mazes of the configured size.
    pub fn new(config: SessionConfig, mut rng: R) -> GameResult<Self> {
        config.validate()?;
        let dims = config.dimensions()?;
        let maze = Maze::generate(dims, &mut rng);
        Ok(Self::build(config, LevelSource::Generated(dims), maze, rng))
    }

    /// Starts a session on a fixed layout; every level replays it.
    pub fn with_layout(config: SessionConfig, maze: Maze, rng: R) -> GameResult<Self> {
        config.validate_tuning()?;
        Ok(Self::build(config, LevelSource::Layout(maze.clone()), maze, rng))
    }

    fn build(config: SessionConfig, source: LevelSource, maze: Maze, mut rng: R) -> Self {
        let collectibles = CollectibleSet::from_maze(&maze, config.dot_score, config.power_score);
        let player = Pacman::new(maze.spawn_position(), config.player);
        let ghosts = spawn_ghosts(&maze, config.ghost, &mut rng);
        info!(
            width = maze.width(),
            height = maze.height(),
            collectibles = collectibles.len(),
            ghosts = ghosts.len(),
            "session started"
        );
        Self {
            lives: config.starting_lives,
            config,
            source,
            maze,
            collectibles,
            player,
            ghosts,
            score: 0,
            level: 1,
            frame: 0,
            active: true,
            paused: false,
            rng,
            end_observers: Vec::new(),
            level_observers: Vec::new(),
        }
    }

    /// Advances the world by one frame. Does nothing while paused or after
    /// the game has ended.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.active || self.paused {
            return events;
        }
        self.frame += 1;

        self.player.tick(&self.maze);
        let player_pos = self.player.pos();
        for ghost in &mut self.ghosts {
            ghost.tick(&self.maze, player_pos, &mut self.rng);
        }

        self.collect(&mut events);
        self.resolve_contacts(&mut events);
        self.collectibles.advance_animation();

        if self.active && self.collectibles.remaining() == 0 {
            self.advance_level(&mut events);
        }
        events
    }

    fn collect(&mut self, events: &mut Vec<GameEvent>) {
        let Some(item) = self.collectibles.collect_at(self.player.pos()) else {
            return;
        };
        let (pos, kind, points) = (item.pos, item.kind, item.points);
        self.score += points;
        debug!(?pos, ?kind, points, remaining = self.collectibles.remaining(), "collectible taken");
        events.push(GameEvent::CollectibleTaken { pos, kind, points });

        if kind == CollectibleKind::Power {
            let affected = self
                .ghosts
                .iter_mut()
                .filter(|ghost| !ghost.is_eaten())
                .map(|ghost| ghost.make_vulnerable())
                .filter(|changed| *changed)
                .count();
            debug!(affected, "power activated");
            events.push(GameEvent::PowerActivated { affected });
        }
    }

    fn resolve_contacts(&mut self, events: &mut Vec<GameEvent>) {
        let cell = self.config.cell_size;
        let reach = self.config.contact_radius * cell;
        let (px, py) = self.player.pixel(cell);

        let mut caught = false;
        for ghost in &mut self.ghosts {
            let (gx, gy) = ghost.pixel(cell);
            if (px - gx).hypot(py - gy) >= reach {
                continue;
            }
            match ghost.state() {
                GhostState::Vulnerable => {
                    ghost.eat();
                    let points = self.config.ghost_score;
                    self.score += points;
                    debug!(ghost = ghost.kind().name(), points, "ghost eaten");
                    events.push(GameEvent::GhostEaten {
                        kind: ghost.kind(),
                        pos: ghost.pos(),
                        points,
                    });
                }
                GhostState::Eaten => {}
                GhostState::Chase | GhostState::Scatter => {
                    if self.player.is_invulnerable() {
                        continue;
                    }
                    caught = true;
                    break;
                }
            }
        }
        if caught {
            self.lose_life(events);
        }
    }

    fn lose_life(&mut self, events: &mut Vec<GameEvent>) {
        self.player.kill();
        self.lives = self.lives.saturating_sub(1);
        info!(lives = self.lives, score = self.score, "player caught");
        events.push(GameEvent::PlayerDied {
            lives_left: self.lives,
        });

        if self.lives == 0 {
            self.finish(events);
        } else {
            self.reset_positions();
        }
    }

    fn finish(&mut self, events: &mut Vec<GameEvent>) {
        self.active = false;
        let summary = self.summary();
        info!(score = summary.score, level = summary.level, frames = summary.frames, "game over");
        events.push(GameEvent::GameOver {
            score: summary.score,
            level: summary.level,
        });
        for observer in &mut self.end_observers {
            observer(&summary);
        }
    }

    fn advance_level(&mut self, events: &mut Vec<GameEvent>) {
        self.level += 1;
        self.maze = match &self.source {
            LevelSource::Generated(dims) => Maze::generate(*dims, &mut self.rng),
            LevelSource::Layout(maze) => maze.clone(),
        };
        self.collectibles =
            CollectibleSet::from_maze(&self.maze, self.config.dot_score, self.config.power_score);
        self.reset_positions();
        for ghost in &mut self.ghosts {
            ghost.increase_speed();
        }

        info!(level = self.level, collectibles = self.collectibles.len(), "level advanced");
        events.push(GameEvent::LevelAdvanced { level: self.level });
        for observer in &mut self.level_observers {
            observer(self.level);
        }
    }

    fn reset_positions(&mut self) {
        self.player.respawn(self.maze.spawn_position());
        let spawns = self.maze.adversary_spawn_positions();
        for (idx, ghost) in self.ghosts.iter_mut().enumerate() {
            let pos = spawns.get(idx).copied().unwrap_or(ghost.home());
            ghost.reset(pos, &mut self.rng);
        }
    }

    /// Back to level 1 with full lives, a new maze and level-1 ghost speed.
    pub fn restart(&mut self) {
        self.maze = match &self.source {
            LevelSource::Generated(dims) => Maze::generate(*dims, &mut self.rng),
            LevelSource::Layout(maze) => maze.clone(),
        };
        self.collectibles =
            CollectibleSet::from_maze(&self.maze, self.config.dot_score, self.config.power_score);
        self.player = Pacman::new(self.maze.spawn_position(), self.config.player);
        self.ghosts = spawn_ghosts(&self.maze, self.config.ghost, &mut self.rng);
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.level = 1;
        self.frame = 0;
        self.active = true;
        self.paused = false;
        info!("session restarted");
    }

    pub fn queue_direction(&mut self, dir: Direction) {
        self.player.queue_direction(dir);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!(paused = self.paused, "pause toggled");
    }

    /// Hard stop. Later ticks are ignored and no end observers fire.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn on_session_end(&mut self, observer: impl FnMut(&SessionSummary) + 'static) {
        self.end_observers.push(Box::new(observer));
    }

    pub fn on_level_advance(&mut self, observer: impl FnMut(u32) + 'static) {
        self.level_observers.push(Box::new(observer));
    }

    pub fn snapshot(&self) -> Snapshot {
        let cell = self.config.cell_size;
        let invulnerable = self.player.is_invulnerable();
        let player = PlayerView {
            pos: self.player.pos(),
            pixel: self.player.pixel(cell),
            direction: self.player.direction(),
            alive: self.player.is_alive(),
            invulnerable,
            blink: invulnerable && (self.player.invulnerable_ticks() / BLINK_TICKS) % 2 == 1,
        };
        let ghosts = self
            .ghosts
            .iter()
            .map(|ghost| GhostView {
                kind: ghost.kind(),
                pos: ghost.pos(),
                pixel: ghost.pixel(cell),
                direction: ghost.direction(),
                state: ghost.state(),
                flashing: ghost.is_flashing(),
            })
            .collect();
        let collectibles = self
            .collectibles
            .iter()
            .filter(|item| !item.collected)
            .map(|item| CollectibleView {
                pos: item.pos,
                kind: item.kind,
                phase: item.phase,
            })
            .collect();
        Snapshot {
            score: self.score,
            lives: self.lives,
            level: self.level,
            remaining: self.collectibles.remaining(),
            frame: self.frame,
            active: self.active,
            paused: self.paused,
            player,
            ghosts,
            collectibles,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            level: self.level,
            frames: self.frame,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn remaining(&self) -> usize {
        self.collectibles.remaining()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Pacman {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Pacman {
        &mut self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghosts_mut(&mut self) -> &mut [Ghost] {
        &mut self.ghosts
    }

    pub fn collectibles(&self) -> &CollectibleSet {
        &self.collectibles
    }

    pub fn collectibles_mut(&mut self) -> &mut CollectibleSet {
        &mut self.collectibles
    }
}

fn spawn_ghosts<R: RandomSource + ?Sized>(
    maze: &Maze,
    tuning: GhostTuning,
    rng: &mut R,
) -> Vec<Ghost> {
    GhostKind::ALL
        .iter()
        .zip(maze.adversary_spawn_positions())
        .map(|(&kind, &home)| {
            let corner = kind.scatter_corner(maze.width(), maze.height());
            Ghost::new(kind, home, corner, tuning, rng)
        })
        .collect()
}
