use crate::constants::*;
use crate::error::{GameError, GameResult};

/// Maze size that has already been checked against the generator's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    width: usize,
    height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> GameResult<Self> {
        if width < MIN_GRID_W || height < MIN_GRID_H || width > MAX_GRID_DIM || height > MAX_GRID_DIM
        {
            return Err(GameError::BadDimensions {
                width,
                height,
                min_w: MIN_GRID_W,
                min_h: MIN_GRID_H,
                max: MAX_GRID_DIM,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    pub move_delay: u32,
    pub invulnerable_ticks: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_delay: PLAYER_MOVE_DELAY,
            invulnerable_ticks: INVULNERABLE_TICKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostTuning {
    /// Frames between grid steps at level 1.
    pub move_delay: u32,
    pub min_move_delay: u32,
    /// Amount `increase_speed` takes off the move delay.
    pub speed_step: u32,
    pub chase_ticks: u32,
    pub scatter_ticks: u32,
    pub vulnerable_ticks: u32,
    pub vulnerable_delay_penalty: u32,
    /// Chance per tick that a ghost re-evaluates its heading.
    pub turn_chance: f32,
    /// How many of the best-ranked moves a ghost picks between.
    pub top_choices: usize,
    pub flash_threshold: u32,
}

impl Default for GhostTuning {
    fn default() -> Self {
        Self {
            move_delay: GHOST_MOVE_DELAY,
            min_move_delay: GHOST_MIN_MOVE_DELAY,
            speed_step: GHOST_SPEED_STEP,
            chase_ticks: CHASE_TICKS,
            scatter_ticks: SCATTER_TICKS,
            vulnerable_ticks: POWER_TICKS,
            vulnerable_delay_penalty: FRIGHTENED_DELAY_PENALTY,
            turn_chance: GHOST_TURN_CHANCE,
            top_choices: GHOST_TOP_CHOICES,
            flash_threshold: FLASH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub starting_lives: u32,
    pub contact_radius: f32,
    pub dot_score: u32,
    pub power_score: u32,
    pub ghost_score: u32,
    pub player: PlayerTuning,
    pub ghost: GhostTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_W,
            height: DEFAULT_GRID_H,
            cell_size: TILE_SIZE,
            starting_lives: STARTING_LIVES,
            contact_radius: CONTACT_RADIUS,
            dot_score: DOT_SCORE,
            power_score: POWER_SCORE,
            ghost_score: GHOST_SCORE,
            player: PlayerTuning::default(),
            ghost: GhostTuning::default(),
        }
    }
}

impl SessionConfig {
    pub fn dimensions(&self) -> GameResult<Dimensions> {
        Dimensions::new(self.width, self.height)
    }

    pub fn validate(&self) -> GameResult<()> {
        self.dimensions()?;
        self.validate_tuning()
    }

    /// Everything except the maze size, which fixed layouts bring themselves.
    pub fn validate_tuning(&self) -> GameResult<()> {
        if self.starting_lives == 0 {
            return Err(GameError::InvalidConfig("starting lives must be at least 1"));
        }
        if !(self.cell_size > 0.0) {
            return Err(GameError::InvalidConfig("cell size must be positive"));
        }
        if !(self.contact_radius > 0.0 && self.contact_radius <= 1.0) {
            return Err(GameError::InvalidConfig("contact radius must be in (0, 1]"));
        }
        if self.player.move_delay == 0 {
            return Err(GameError::InvalidConfig("player move delay must be at least 1"));
        }
        let ghost = &self.ghost;
        if ghost.min_move_delay == 0 {
            return Err(GameError::InvalidConfig("ghost minimum move delay must be at least 1"));
        }
        if ghost.move_delay < ghost.min_move_delay {
            return Err(GameError::InvalidConfig(
                "ghost move delay is below its minimum",
            ));
        }
        if !(0.0..=1.0).contains(&ghost.turn_chance) {
            return Err(GameError::InvalidConfig("ghost turn chance must be in [0, 1]"));
        }
        if ghost.top_choices == 0 {
            return Err(GameError::InvalidConfig("ghost top choices must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_tiny_maze() {
        let err = Dimensions::new(8, 8).unwrap_err();
        assert!(matches!(err, GameError::BadDimensions { width: 8, .. }));
        assert!(Dimensions::new(MIN_GRID_W, MIN_GRID_H).is_ok());
    }

    #[test]
    fn rejects_bad_tuning() {
        let mut config = SessionConfig::default();
        config.ghost.top_choices = 0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.ghost.turn_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.starting_lives = 0;
        assert_eq!(
            config.validate(),
            Err(GameError::InvalidConfig("starting lives must be at least 1"))
        );
    }
}
