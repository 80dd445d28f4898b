use crate::components::{Direction, Pos};
use crate::config::PlayerTuning;
use crate::level::Maze;

#[derive(Debug, Clone, PartialEq)]
pub struct Pacman {
    pos: Pos,
    direction: Direction,
    /// Single slot; a newer request replaces an older one.
    next_direction: Option<Direction>,
    alive: bool,
    invulnerable_timer: u32,
    move_timer: u32,
    tuning: PlayerTuning,
}

impl Pacman {
    pub fn new(start: Pos, tuning: PlayerTuning) -> Self {
        Self {
            pos: start,
            direction: Direction::None,
            next_direction: None,
            alive: true,
            invulnerable_timer: 0,
            move_timer: 0,
            tuning,
        }
    }

    pub fn queue_direction(&mut self, dir: Direction) {
        self.next_direction = match dir {
            Direction::None => None,
            dir => Some(dir),
        };
    }

    pub fn tick(&mut self, maze: &Maze) {
        if !self.alive {
            return;
        }

        self.invulnerable_timer = self.invulnerable_timer.saturating_sub(1);

        if let Some(dir) = self.next_direction {
            if maze.step_from(self.pos, dir).is_some() {
                self.direction = dir;
                self.next_direction = None;
            }
        }

        self.move_timer += 1;
        if self.move_timer >= self.tuning.move_delay {
            self.move_timer = 0;
            self.advance(maze);
        }
    }

    /// Blocked moves keep the heading; only `kill`/`respawn` clear it.
    fn advance(&mut self, maze: &Maze) {
        if self.direction == Direction::None {
            return;
        }
        if let Some(next) = maze.step_from(self.pos, self.direction) {
            self.pos = next;
        }
    }

    pub fn respawn(&mut self, pos: Pos) {
        self.pos = pos;
        self.direction = Direction::None;
        self.next_direction = None;
        self.alive = true;
        self.invulnerable_timer = self.tuning.invulnerable_ticks;
        self.move_timer = 0;
    }

    /// Position is left alone; the session moves the player afterwards.
    pub fn kill(&mut self) {
        self.alive = false;
        self.direction = Direction::None;
        self.next_direction = None;
    }

    /// Puts the player on a cell without touching any other state.
    pub fn place_at(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn queued_direction(&self) -> Option<Direction> {
        self.next_direction
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0
    }

    pub fn invulnerable_ticks(&self) -> u32 {
        self.invulnerable_timer
    }

    pub fn pixel(&self, cell_size: f32) -> (f32, f32) {
        self.pos.to_pixel(cell_size)
    }
}
