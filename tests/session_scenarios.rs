use ghost_chase::rng;
use ghost_chase::{
    Direction, GameEvent, GhostState, Maze, Pacman, PlayerTuning, Pos, Session, SessionConfig,
    StdRandom, Tile,
};

fn generated(seed: u64, config: SessionConfig) -> Session {
    Session::new(config, StdRandom::seeded(seed)).unwrap()
}

#[test]
fn chasing_ghost_on_the_player_costs_a_life() {
    let mut session = generated(7, SessionConfig::default());
    let spawn = session.maze().spawn_position();
    assert_eq!(session.ghosts()[0].state(), GhostState::Chase);
    session.ghosts_mut()[0].place_at(spawn);

    let events = session.tick();

    assert!(events.contains(&GameEvent::PlayerDied { lives_left: 2 }));
    assert_eq!(session.lives(), 2);
    assert!(session.is_active());
}

#[test]
fn vulnerable_ghost_on_the_player_is_eaten() {
    let mut session = generated(11, SessionConfig::default());
    let spawn = session.maze().spawn_position();
    {
        let ghost = &mut session.ghosts_mut()[0];
        ghost.make_vulnerable();
        ghost.place_at(spawn);
    }

    let events = session.tick();

    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::GhostEaten { points: 200, .. })));
    assert_eq!(session.score(), 200);
    assert_eq!(session.ghosts()[0].state(), GhostState::Eaten);
    assert_eq!(session.ghosts()[0].target(), session.ghosts()[0].home());
    assert_eq!(session.lives(), 3);
}

#[test]
fn ghosts_scatter_to_different_corners() {
    let session = generated(17, SessionConfig::default());
    let targets: Vec<Pos> = session.ghosts().iter().map(|g| g.scatter_target()).collect();
    assert_eq!(targets.len(), 4);
    for (ghost, target) in session.ghosts().iter().zip(&targets) {
        assert_eq!(*target, ghost.kind().scatter_corner(40, 30));
    }
    for (i, a) in targets.iter().enumerate() {
        for b in &targets[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn last_life_ends_the_session() {
    let config = SessionConfig {
        starting_lives: 1,
        ..SessionConfig::default()
    };
    let mut session = generated(3, config);
    let spawn = session.maze().spawn_position();
    session.ghosts_mut()[1].place_at(spawn);

    let events = session.tick();

    assert_eq!(events.last(), Some(&GameEvent::GameOver { score: 0, level: 1 }));
    assert_eq!(session.lives(), 0);
    assert!(!session.is_active());
    assert!(session.tick().is_empty());
    assert_eq!(session.frame(), 1);
}

#[test]
fn surviving_a_catch_resets_everyone() {
    let config = SessionConfig {
        starting_lives: 2,
        ..SessionConfig::default()
    };
    let mut session = generated(5, config);
    let spawn = session.maze().spawn_position();
    session.ghosts_mut()[0].make_vulnerable();
    session.ghosts_mut()[2].place_at(spawn);

    session.tick();

    assert_eq!(session.lives(), 1);
    assert_eq!(session.player().pos(), spawn);
    assert!(session.player().is_invulnerable());
    let homes = session.maze().adversary_spawn_positions().to_vec();
    for (ghost, home) in session.ghosts().iter().zip(homes) {
        assert_eq!(ghost.pos(), home);
        assert_eq!(ghost.state(), GhostState::Chase);
    }
}

#[test]
fn clearing_the_board_advances_the_level() {
    let mut session = generated(9, SessionConfig::default());
    let first_maze = session.maze().clone();
    let delays: Vec<u32> = session.ghosts().iter().map(|g| g.base_move_delay()).collect();
    let positions: Vec<Pos> = session.collectibles().iter().map(|c| c.pos).collect();
    for pos in positions {
        let _ = session.collectibles_mut().collect_at(pos);
    }
    assert_eq!(session.remaining(), 0);

    let events = session.tick();

    assert!(events.contains(&GameEvent::LevelAdvanced { level: 2 }));
    assert_eq!(session.level(), 2);
    assert!(session.remaining() > 0);
    assert_ne!(session.maze(), &first_maze);
    for (ghost, before) in session.ghosts().iter().zip(delays) {
        assert!(ghost.base_move_delay() < before);
    }
}

#[test]
fn power_pellet_skips_eaten_ghosts() {
    let mut session = generated(13, SessionConfig::default());
    let power = session.maze().power_collectible_positions()[0];
    let away = session
        .maze()
        .reachable_cells(session.maze().spawn_position())
        .into_iter()
        .find(|pos| session.maze().tile(*pos) == Some(Tile::Collectible) && *pos != power)
        .unwrap();
    {
        let ghost = &mut session.ghosts_mut()[3];
        ghost.make_vulnerable();
        ghost.eat();
        ghost.place_at(away);
    }
    session.player_mut().place_at(power);

    let events = session.tick();

    assert!(events.contains(&GameEvent::PowerActivated { affected: 3 }));
    assert_eq!(session.score(), 50);
    let states: Vec<GhostState> = session.ghosts().iter().map(|g| g.state()).collect();
    assert_eq!(
        states,
        vec![
            GhostState::Vulnerable,
            GhostState::Vulnerable,
            GhostState::Vulnerable,
            GhostState::Eaten
        ]
    );
}

#[test]
fn score_never_drops_during_play() {
    let mut session = generated(21, SessionConfig::default());
    let mut input = StdRandom::seeded(99);
    let mut last_score = 0;
    let mut last_lives = session.lives();
    let mut last_level = session.level();

    for frame in 0..20_000u32 {
        if !session.is_active() {
            break;
        }
        if frame % 12 == 0 {
            if let Some(dir) = rng::choose(&mut input, &Direction::MOVES) {
                session.queue_direction(dir);
            }
        }
        session.tick();

        assert!(session.score() >= last_score);
        assert!(session.lives() <= last_lives);
        assert!(session.level() >= last_level);
        for ghost in session.ghosts() {
            assert!(session.maze().is_traversable(ghost.pos()), "{:?}", ghost.pos());
        }
        assert!(session.maze().is_traversable(session.player().pos()));
        last_score = session.score();
        last_lives = session.lives();
        last_level = session.level();
    }
    assert!(last_score > 0);
}

#[test]
fn player_wraps_sideways() {
    let maze = Maze::from_layout(
        "\
#######
#P....#
#.#=#.#
#.#G#.#
#.....#
#######",
    )
    .unwrap();
    let tuning = PlayerTuning {
        move_delay: 1,
        ..PlayerTuning::default()
    };
    let mut player = Pacman::new(Pos::new(0, 1), tuning);
    player.queue_direction(Direction::Left);
    player.tick(&maze);
    assert_eq!(player.pos(), Pos::new(6, 1));

    let mut player = Pacman::new(Pos::new(6, 4), tuning);
    player.queue_direction(Direction::Right);
    player.tick(&maze);
    assert_eq!(player.pos(), Pos::new(0, 4));
}

#[test]
fn generated_mazes_hold_their_shape() {
    for (w, h) in [(15, 11), (40, 30), (41, 31)] {
        for seed in 0..4 {
            let config = SessionConfig {
                width: w,
                height: h,
                ..SessionConfig::default()
            };
            let session = generated(seed, config);
            let maze = session.maze();
            assert_eq!((maze.width(), maze.height()), (w, h));

            let spawn = maze.spawn_position();
            assert_eq!(maze.tile(spawn), Some(Tile::Empty));
            let reachable = maze.reachable_cells(spawn);
            let powers = maze.power_collectible_positions();
            assert!(!powers.is_empty() && powers.len() <= 4);
            for pos in maze.collectible_positions().iter().chain(&powers) {
                assert!(reachable.contains(pos), "{pos:?} in {w}x{h} seed {seed}");
            }
            assert_eq!(session.ghosts().len(), 4);
            for home in maze.adversary_spawn_positions() {
                assert_eq!(maze.tile(*home), Some(Tile::Den));
            }
        }
    }
}

#[test]
fn same_seed_same_game() {
    let mut first = generated(42, SessionConfig::default());
    let mut second = generated(42, SessionConfig::default());
    assert_eq!(first.maze(), second.maze());
    for _ in 0..500 {
        first.tick();
        second.tick();
    }
    assert_eq!(first.snapshot(), second.snapshot());
}
