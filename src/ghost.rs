use tracing::trace;

use crate::components::{Direction, Pos};
use crate::config::GhostTuning;
use crate::constants::BLINK_TICKS;
use crate::level::Maze;
use crate::rng::{self, RandomSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostKind {
    /// Spawn order.
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GhostKind::Blinky => "blinky",
            GhostKind::Pinky => "pinky",
            GhostKind::Inky => "inky",
            GhostKind::Clyde => "clyde",
        }
    }

    /// Each ghost scatters to its own corner, two cells in from the border.
    pub fn scatter_corner(self, width: usize, height: usize) -> Pos {
        let right = width as i32 - 3;
        let bottom = height as i32 - 3;
        match self {
            GhostKind::Blinky => Pos::new(2, 2),
            GhostKind::Pinky => Pos::new(right, 2),
            GhostKind::Inky => Pos::new(2, bottom),
            GhostKind::Clyde => Pos::new(right, bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostState {
    Chase,
    Scatter,
    Vulnerable,
    Eaten,
}

/// Inputs to the mode machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeTrigger {
    ChaseElapsed,
    ScatterElapsed,
    PowerActivated,
    VulnerabilityExpired,
    /// Touched by the player while vulnerable.
    Caught,
    ReachedHome,
    /// Explicit return to chase on death or level reset.
    Resume,
}

impl GhostState {
    /// The mode transition table. `None` means the trigger is ignored.
    pub fn on(self, trigger: ModeTrigger) -> Option<GhostState> {
        use GhostState::*;
        use ModeTrigger::*;
        match (self, trigger) {
            (_, Resume) => Some(Chase),
            (Chase, ChaseElapsed) => Some(Scatter),
            (Scatter, ScatterElapsed) => Some(Chase),
            (Chase | Scatter | Vulnerable, PowerActivated) => Some(Vulnerable),
            (Vulnerable, VulnerabilityExpired) => Some(Chase),
            (Vulnerable, Caught) => Some(Eaten),
            (Eaten, ReachedHome) => Some(Chase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    kind: GhostKind,
    pos: Pos,
    direction: Direction,
    state: GhostState,
    mode_timer: u32,
    target: Pos,
    home: Pos,
    scatter_target: Pos,
    vulnerable_timer: u32,
    base_move_delay: u32,
    move_timer: u32,
    tuning: GhostTuning,
}

impl Ghost {
    pub fn new<R: RandomSource + ?Sized>(
        kind: GhostKind,
        home: Pos,
        scatter_target: Pos,
        tuning: GhostTuning,
        rng: &mut R,
    ) -> Self {
        Self {
            kind,
            pos: home,
            direction: random_heading(rng),
            state: GhostState::Chase,
            mode_timer: 0,
            target: home,
            home,
            scatter_target,
            vulnerable_timer: 0,
            base_move_delay: tuning.move_delay,
            move_timer: 0,
            tuning,
        }
    }

    /// Feeds a trigger through the mode table. Returns whether the mode changed.
    pub fn apply(&mut self, trigger: ModeTrigger) -> bool {
        let Some(next) = self.state.on(trigger) else {
            return false;
        };
        trace!(ghost = self.kind.name(), from = ?self.state, to = ?next, ?trigger, "mode transition");
        self.state = next;
        self.mode_timer = 0;
        match next {
            GhostState::Vulnerable => {
                self.vulnerable_timer = self.tuning.vulnerable_ticks;
                self.direction = self.direction.opposite();
            }
            GhostState::Eaten => {
                self.vulnerable_timer = 0;
                self.target = self.home;
            }
            GhostState::Chase | GhostState::Scatter => {
                self.vulnerable_timer = 0;
            }
        }
        true
    }

    pub fn make_vulnerable(&mut self) -> bool {
        self.apply(ModeTrigger::PowerActivated)
    }

    /// Called when the player catches this ghost. Only succeeds while vulnerable.
    pub fn eat(&mut self) -> bool {
        self.apply(ModeTrigger::Caught)
    }

    pub fn tick<R: RandomSource + ?Sized>(&mut self, maze: &Maze, player: Pos, rng: &mut R) {
        self.mode_timer += 1;

        if self.state == GhostState::Vulnerable {
            self.vulnerable_timer = self.vulnerable_timer.saturating_sub(1);
            if self.vulnerable_timer == 0 {
                self.apply(ModeTrigger::VulnerabilityExpired);
            }
        }

        self.update_mode();
        self.target = self.select_target(player);

        if rng.chance(self.tuning.turn_chance) {
            self.choose_direction(maze, rng);
        }

        self.move_timer += 1;
        if self.move_timer >= self.move_delay() {
            self.move_timer = 0;
            self.advance(maze, rng);
        }
    }

    fn update_mode(&mut self) {
        match self.state {
            GhostState::Chase if self.mode_timer > self.tuning.chase_ticks => {
                self.apply(ModeTrigger::ChaseElapsed);
            }
            GhostState::Scatter if self.mode_timer > self.tuning.scatter_ticks => {
                self.apply(ModeTrigger::ScatterElapsed);
            }
            GhostState::Eaten if self.pos == self.home => {
                self.apply(ModeTrigger::ReachedHome);
            }
            _ => {}
        }
    }

    fn select_target(&self, player: Pos) -> Pos {
        match self.state {
            GhostState::Chase => player,
            GhostState::Scatter => self.scatter_target,
            // Mirror the player through ourselves.
            GhostState::Vulnerable => Pos::new(
                2 * self.pos.x - player.x,
                2 * self.pos.y - player.y,
            ),
            GhostState::Eaten => self.home,
        }
    }

    /// Picks a heading that never doubles back unless there is no other way.
    ///
    /// Open moves are ranked by Manhattan distance to the target. Vulnerable
    /// ghosts take the worst one; everyone else picks at random among the
    /// best `top_choices`.
    pub fn choose_direction<R: RandomSource + ?Sized>(&mut self, maze: &Maze, rng: &mut R) {
        let reverse = self.direction.opposite();
        let mut options: Vec<(Direction, u32)> = Direction::MOVES
            .into_iter()
            .filter(|dir| *dir != reverse)
            .filter_map(|dir| {
                maze.step_from(self.pos, dir)
                    .map(|next| (dir, next.manhattan(self.target)))
            })
            .collect();

        if options.is_empty() {
            if reverse != Direction::None && maze.step_from(self.pos, reverse).is_some() {
                self.direction = reverse;
            }
            return;
        }

        options.sort_by_key(|(_, distance)| *distance);
        let picked = if self.state == GhostState::Vulnerable {
            options.last().map(|(dir, _)| *dir)
        } else {
            let top = self.tuning.top_choices.min(options.len());
            let best: Vec<Direction> = options[..top].iter().map(|(dir, _)| *dir).collect();
            rng::choose(rng, &best)
        };
        if let Some(dir) = picked {
            self.direction = dir;
        }
    }

    fn advance<R: RandomSource + ?Sized>(&mut self, maze: &Maze, rng: &mut R) {
        let next = match self.direction {
            Direction::None => None,
            dir => maze.step_from(self.pos, dir),
        };
        match next {
            Some(next) => self.pos = next,
            None => self.choose_direction(maze, rng),
        }
    }

    /// Frames between steps in the current mode.
    pub fn move_delay(&self) -> u32 {
        match self.state {
            GhostState::Vulnerable => self.base_move_delay + self.tuning.vulnerable_delay_penalty,
            GhostState::Eaten => (self.base_move_delay / 2).max(self.tuning.min_move_delay),
            GhostState::Chase | GhostState::Scatter => self.base_move_delay,
        }
    }

    /// Permanently shortens the move delay, down to the configured floor.
    pub fn increase_speed(&mut self) {
        self.base_move_delay = self
            .base_move_delay
            .saturating_sub(self.tuning.speed_step)
            .max(self.tuning.min_move_delay);
    }

    pub fn reset_speed(&mut self) {
        self.base_move_delay = self.tuning.move_delay;
    }

    /// Back to `pos` in chase mode with a fresh random heading.
    pub fn reset<R: RandomSource + ?Sized>(&mut self, pos: Pos, rng: &mut R) {
        self.pos = pos;
        self.direction = random_heading(rng);
        self.move_timer = 0;
        self.target = pos;
        self.apply(ModeTrigger::Resume);
    }

    pub fn place_at(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub fn kind(&self) -> GhostKind {
        self.kind
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn target(&self) -> Pos {
        self.target
    }

    pub fn home(&self) -> Pos {
        self.home
    }

    pub fn scatter_target(&self) -> Pos {
        self.scatter_target
    }

    pub fn is_vulnerable(&self) -> bool {
        self.state == GhostState::Vulnerable
    }

    pub fn is_eaten(&self) -> bool {
        self.state == GhostState::Eaten
    }

    pub fn vulnerable_ticks(&self) -> u32 {
        self.vulnerable_timer
    }

    pub fn base_move_delay(&self) -> u32 {
        self.base_move_delay
    }

    /// Blinks during the last stretch of vulnerability.
    pub fn is_flashing(&self) -> bool {
        self.is_vulnerable()
            && self.vulnerable_timer < self.tuning.flash_threshold
            && (self.vulnerable_timer / BLINK_TICKS) % 2 == 1
    }

    pub fn pixel(&self, cell_size: f32) -> (f32, f32) {
        self.pos.to_pixel(cell_size)
    }
}

fn random_heading<R: RandomSource + ?Sized>(rng: &mut R) -> Direction {
    rng::choose(rng, &Direction::MOVES).unwrap_or(Direction::Left)
}
