pub const DEFAULT_GRID_W: usize = 40;
pub const DEFAULT_GRID_H: usize = 30;
pub const MIN_GRID_W: usize = 15;
pub const MIN_GRID_H: usize = 11;
pub const MAX_GRID_DIM: usize = 255;
pub const TILE_SIZE: f32 = 20.0;

pub const PEN_W: usize = 9;
pub const PEN_H: usize = 5;
pub const MAX_GHOSTS: usize = 4;
pub const BRAID_CHANCE: f32 = 0.45;
pub const EXTRA_OPENINGS: f32 = 0.08;
/// No dots within this Manhattan distance of the player spawn.
pub const SPAWN_CLEAR_RADIUS: u32 = 2;

pub const STARTING_LIVES: u32 = 3;
pub const DOT_SCORE: u32 = 10;
pub const POWER_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;

pub const PLAYER_MOVE_DELAY: u32 = 8;
pub const INVULNERABLE_TICKS: u32 = 120;

pub const GHOST_MOVE_DELAY: u32 = 12;
pub const GHOST_MIN_MOVE_DELAY: u32 = 4;
pub const GHOST_SPEED_STEP: u32 = 1;
pub const CHASE_TICKS: u32 = 600;
pub const SCATTER_TICKS: u32 = 300;
pub const POWER_TICKS: u32 = 300;
pub const FRIGHTENED_DELAY_PENALTY: u32 = 4;
pub const GHOST_TURN_CHANCE: f32 = 0.3;
pub const GHOST_TOP_CHOICES: usize = 2;
pub const FLASH_THRESHOLD: u32 = 60;
/// Blink half-period, in ticks, for flashing ghosts and the respawned player.
pub const BLINK_TICKS: u32 = 5;

/// Fraction of a cell under which player and ghost centres are in contact.
pub const CONTACT_RADIUS: f32 = 0.7;
