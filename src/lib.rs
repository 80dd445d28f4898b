//! Grid-maze chase game core.
//!
//! The crate is a deterministic simulation driven one [`Session::tick`] at a
//! time. Rendering, input and pacing live outside it; see the `ghost-chase`
//! binary for a terminal host.

pub mod collectible;
pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod ghost;
pub mod level;
pub mod player;
pub mod rng;
pub mod session;

pub use collectible::{Collectible, CollectibleKind, CollectibleSet};
pub use components::{Direction, Pos};
pub use config::{Dimensions, GhostTuning, PlayerTuning, SessionConfig};
pub use error::{GameError, GameResult};
pub use ghost::{Ghost, GhostKind, GhostState, ModeTrigger};
pub use level::{Maze, Tile};
pub use player::Pacman;
pub use rng::{RandomSource, ScriptedRandom, StdRandom};
pub use session::{
    CollectibleView, GameEvent, GhostView, PlayerView, Session, SessionSummary, Snapshot,
};
