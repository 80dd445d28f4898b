use std::collections::VecDeque;

use crate::components::{Direction, Pos};
use crate::config::Dimensions;
use crate::constants::{
    BRAID_CHANCE, EXTRA_OPENINGS, MAX_GHOSTS, PEN_H, PEN_W, SPAWN_CLEAR_RADIUS,
};
use crate::error::{GameError, GameResult};
use crate::rng::{self, RandomSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Empty,
    Collectible,
    PowerCollectible,
    /// Ghost house. Walkable by everyone, never holds a collectible.
    Den,
}

impl Tile {
    pub fn is_traversable(self) -> bool {
        self != Tile::Wall
    }
}

/// Outer box of the ghost house, walls included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PenBounds {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

/// Static layout of one level.
///
/// Tiles never change after construction; which collectibles have been eaten
/// is tracked by the session, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    width: usize,
    height: usize,
    grid: Vec<Vec<Tile>>,
    spawn: Pos,
    ghost_spawns: Vec<Pos>,
}

impl Maze {
    /// Carves a fresh braided maze with a ghost house in the middle.
    ///
    /// The ghost house position depends only on the dimensions, so ghosts keep
    /// the same home across regenerated levels.
    pub fn generate<R: RandomSource + ?Sized>(dims: Dimensions, rng: &mut R) -> Maze {
        let width = dims.width();
        let height = dims.height();
        let mut grid = vec![vec![Tile::Wall; width]; height];
        let cells_w = (width - 1) / 2;
        let cells_h = (height - 1) / 2;

        carve_passages(&mut grid, cells_w, cells_h, rng);
        braid_maze(&mut grid, cells_w, cells_h, rng);

        let pen = carve_ghost_pen(&mut grid, width, height);
        ensure_connected(&mut grid, width, height, &pen);

        let spawn = pick_spawn(&grid, &pen, rng);
        let ghost_spawns = pick_ghost_spawns(&pen);
        place_collectibles(&mut grid, spawn);

        let maze = Maze {
            width,
            height,
            grid,
            spawn,
            ghost_spawns,
        };
        debug_assert!(!maze.collectible_positions().is_empty());
        maze
    }

    /// Parses an ASCII layout.
    ///
    /// `#` wall, space empty, `.` dot, `o` power pellet, `=` ghost house,
    /// `P` player spawn, `G` ghost spawn (inside the house).
    pub fn from_layout(text: &str) -> GameResult<Maze> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|r| r.chars().count()).ok_or(GameError::EmptyLayout)?;

        let mut grid = Vec::with_capacity(rows.len());
        let mut spawn = None;
        let mut ghost_spawns = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GameError::RaggedLayout {
                    row: y,
                    expected: width,
                    found,
                });
            }
            let mut line = Vec::with_capacity(width);
            for (x, glyph) in row.chars().enumerate() {
                let tile = match glyph {
                    '#' => Tile::Wall,
                    ' ' => Tile::Empty,
                    '.' => Tile::Collectible,
                    'o' => Tile::PowerCollectible,
                    '=' => Tile::Den,
                    'P' => {
                        if spawn.is_some() {
                            return Err(GameError::DuplicateSpawn { x, y });
                        }
                        spawn = Some(Pos::new(x as i32, y as i32));
                        Tile::Empty
                    }
                    'G' => {
                        ghost_spawns.push(Pos::new(x as i32, y as i32));
                        Tile::Den
                    }
                    _ => return Err(GameError::UnknownGlyph { glyph, x, y }),
                };
                line.push(tile);
            }
            grid.push(line);
        }

        let height = grid.len();
        for (y, line) in grid.iter().enumerate() {
            for (x, tile) in line.iter().enumerate() {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if border && *tile != Tile::Wall {
                    return Err(GameError::OpenBorder { x, y });
                }
            }
        }

        let spawn = spawn.ok_or(GameError::MissingSpawn)?;
        ghost_spawns.truncate(MAX_GHOSTS);
        let maze = Maze {
            width,
            height,
            grid,
            spawn,
            ghost_spawns,
        };

        let reachable = flood(&maze.grid, spawn);
        let mut any = false;
        for (y, line) in maze.grid.iter().enumerate() {
            for (x, tile) in line.iter().enumerate() {
                if matches!(tile, Tile::Collectible | Tile::PowerCollectible) {
                    if !reachable[y][x] {
                        return Err(GameError::UnreachableCollectible { x, y });
                    }
                    any = true;
                }
            }
        }
        if !any {
            return Err(GameError::NoCollectibles);
        }
        Ok(maze)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.grid
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
    }

    /// In bounds and not a wall. Walls include the whole border.
    pub fn is_traversable(&self, pos: Pos) -> bool {
        self.tile(pos).is_some_and(Tile::is_traversable)
    }

    /// Where one step from `from` lands, or `None` if blocked.
    ///
    /// Leaving the grid sideways wraps to the opposite edge whatever is
    /// there; leaving it vertically is always blocked.
    pub fn step_from(&self, from: Pos, dir: Direction) -> Option<Pos> {
        let next = from.step(dir);
        if dir.is_horizontal() {
            if next.x < 0 {
                return Some(Pos::new(self.width as i32 - 1, from.y));
            }
            if next.x >= self.width as i32 {
                return Some(Pos::new(0, from.y));
            }
        }
        if self.is_traversable(next) {
            Some(next)
        } else {
            None
        }
    }

    pub fn spawn_position(&self) -> Pos {
        self.spawn
    }

    pub fn adversary_spawn_positions(&self) -> &[Pos] {
        &self.ghost_spawns
    }

    pub fn collectible_positions(&self) -> Vec<Pos> {
        self.positions_of(Tile::Collectible)
    }

    pub fn power_collectible_positions(&self) -> Vec<Pos> {
        self.positions_of(Tile::PowerCollectible)
    }

    /// Every traversable cell reachable from `from` by orthogonal steps.
    pub fn reachable_cells(&self, from: Pos) -> Vec<Pos> {
        if !self.is_traversable(from) {
            return Vec::new();
        }
        let seen = flood(&self.grid, from);
        let mut cells = Vec::new();
        for (y, row) in seen.iter().enumerate() {
            for (x, reached) in row.iter().enumerate() {
                if *reached {
                    cells.push(Pos::new(x as i32, y as i32));
                }
            }
        }
        cells
    }

    fn positions_of(&self, kind: Tile) -> Vec<Pos> {
        let mut positions = Vec::new();
        for (y, row) in self.grid.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == kind {
                    positions.push(Pos::new(x as i32, y as i32));
                }
            }
        }
        positions
    }
}

fn carve_passages<R: RandomSource + ?Sized>(
    grid: &mut [Vec<Tile>],
    cells_w: usize,
    cells_h: usize,
    rng: &mut R,
) {
    let mut in_maze = vec![vec![false; cells_w]; cells_h];
    let mut frontier: Vec<(usize, usize)> = Vec::new();

    let start = (rng.pick_index(cells_w), rng.pick_index(cells_h));
    in_maze[start.1][start.0] = true;
    carve_cell(grid, start.0, start.1);
    add_frontier(start.0, start.1, cells_w, cells_h, &in_maze, &mut frontier);

    while !frontier.is_empty() {
        let idx = rng.pick_index(frontier.len());
        let (cx, cy) = frontier.swap_remove(idx);
        if in_maze[cy][cx] {
            continue;
        }

        let mut neighbors = Vec::new();
        if cy > 0 && in_maze[cy - 1][cx] {
            neighbors.push((cx, cy - 1));
        }
        if cy + 1 < cells_h && in_maze[cy + 1][cx] {
            neighbors.push((cx, cy + 1));
        }
        if cx > 0 && in_maze[cy][cx - 1] {
            neighbors.push((cx - 1, cy));
        }
        if cx + 1 < cells_w && in_maze[cy][cx + 1] {
            neighbors.push((cx + 1, cy));
        }

        let Some((nx, ny)) = rng::choose(rng, &neighbors) else {
            continue;
        };
        in_maze[cy][cx] = true;
        carve_between(grid, cx, cy, nx, ny);
        carve_cell(grid, cx, cy);
        add_frontier(cx, cy, cells_w, cells_h, &in_maze, &mut frontier);
    }
}

fn add_frontier(
    cx: usize,
    cy: usize,
    cells_w: usize,
    cells_h: usize,
    in_maze: &[Vec<bool>],
    frontier: &mut Vec<(usize, usize)>,
) {
    if cy > 0 && !in_maze[cy - 1][cx] {
        frontier.push((cx, cy - 1));
    }
    if cy + 1 < cells_h && !in_maze[cy + 1][cx] {
        frontier.push((cx, cy + 1));
    }
    if cx > 0 && !in_maze[cy][cx - 1] {
        frontier.push((cx - 1, cy));
    }
    if cx + 1 < cells_w && !in_maze[cy][cx + 1] {
        frontier.push((cx + 1, cy));
    }
}

fn carve_cell(grid: &mut [Vec<Tile>], cx: usize, cy: usize) {
    grid[cy * 2 + 1][cx * 2 + 1] = Tile::Empty;
}

fn carve_between(grid: &mut [Vec<Tile>], cx: usize, cy: usize, nx: usize, ny: usize) {
    let wall_x = (cx * 2 + 1 + nx * 2 + 1) / 2;
    let wall_y = (cy * 2 + 1 + ny * 2 + 1) / 2;
    grid[wall_y][wall_x] = Tile::Empty;
}

fn is_open_between(grid: &[Vec<Tile>], cx: usize, cy: usize, nx: usize, ny: usize) -> bool {
    let wall_x = (cx * 2 + 1 + nx * 2 + 1) / 2;
    let wall_y = (cy * 2 + 1 + ny * 2 + 1) / 2;
    grid[wall_y][wall_x] != Tile::Wall
}

/// Knocks extra holes into the spanning tree so dead ends become loops.
fn braid_maze<R: RandomSource + ?Sized>(
    grid: &mut [Vec<Tile>],
    cells_w: usize,
    cells_h: usize,
    rng: &mut R,
) {
    for cy in 0..cells_h {
        for cx in 0..cells_w {
            let (open, closed) = cell_neighbors(grid, cx, cy, cells_w, cells_h);
            let dead_end = open == 1 && rng.chance(BRAID_CHANCE);
            if closed.is_empty() || !(dead_end || rng.chance(EXTRA_OPENINGS)) {
                continue;
            }
            if let Some((nx, ny)) = rng::choose(rng, &closed) {
                carve_between(grid, cx, cy, nx, ny);
                carve_cell(grid, nx, ny);
            }
        }
    }
}

/// Count of open neighbouring cells, and the closed ones.
fn cell_neighbors(
    grid: &[Vec<Tile>],
    cx: usize,
    cy: usize,
    cells_w: usize,
    cells_h: usize,
) -> (usize, Vec<(usize, usize)>) {
    let mut open = 0;
    let mut closed = Vec::new();
    for dir in Direction::MOVES {
        let (dx, dy) = dir.delta();
        let nx = cx as i32 + dx;
        let ny = cy as i32 + dy;
        if nx < 0 || ny < 0 || nx >= cells_w as i32 || ny >= cells_h as i32 {
            continue;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if is_open_between(grid, cx, cy, nx, ny) {
            open += 1;
        } else {
            closed.push((nx, ny));
        }
    }
    (open, closed)
}

fn pen_bounds(width: usize, height: usize) -> PenBounds {
    let mut pen_w = PEN_W.min(width.saturating_sub(2));
    let mut pen_h = PEN_H.min(height.saturating_sub(2));
    if pen_w % 2 == 0 {
        pen_w = pen_w.saturating_sub(1);
    }
    if pen_h % 2 == 0 {
        pen_h = pen_h.saturating_sub(1);
    }
    pen_w = pen_w.max(3);
    pen_h = pen_h.max(3);

    let x0 = (width - pen_w) / 2;
    let y0 = (height - pen_h) / 2;
    PenBounds {
        x0,
        y0,
        x1: x0 + pen_w - 1,
        y1: y0 + pen_h - 1,
    }
}

fn in_pen_box(pos: Pos, pen: &PenBounds) -> bool {
    pos.x >= pen.x0 as i32 && pos.x <= pen.x1 as i32 && pos.y >= pen.y0 as i32 && pos.y <= pen.y1 as i32
}

fn is_pen_wall(x: usize, y: usize, pen: &PenBounds) -> bool {
    (x >= pen.x0 && x <= pen.x1 && (y == pen.y0 || y == pen.y1))
        || (y >= pen.y0 && y <= pen.y1 && (x == pen.x0 || x == pen.x1))
}

/// Walls in the ghost house, fills it with den tiles and opens a door on top
/// with a corridor running up into the maze.
fn carve_ghost_pen(grid: &mut [Vec<Tile>], width: usize, height: usize) -> PenBounds {
    let pen = pen_bounds(width, height);
    for y in pen.y0..=pen.y1 {
        for x in pen.x0..=pen.x1 {
            grid[y][x] = if is_pen_wall(x, y, &pen) {
                Tile::Wall
            } else {
                Tile::Den
            };
        }
    }

    let door_x = (pen.x0 + pen.x1) / 2;
    grid[pen.y0][door_x] = Tile::Den;

    let mut y = pen.y0 - 1;
    while y > 0 && grid[y][door_x] == Tile::Wall {
        grid[y][door_x] = Tile::Empty;
        y -= 1;
    }
    pen
}

fn pick_ghost_spawns(pen: &PenBounds) -> Vec<Pos> {
    let mut spawns = Vec::new();
    for y in pen.y0 + 1..pen.y1 {
        for x in pen.x0 + 1..pen.x1 {
            if spawns.len() == MAX_GHOSTS {
                return spawns;
            }
            spawns.push(Pos::new(x as i32, y as i32));
        }
    }
    spawns
}

/// Opens walls until every walkable cell belongs to one region.
fn ensure_connected(grid: &mut [Vec<Tile>], width: usize, height: usize, pen: &PenBounds) {
    let Some(start) = find_start(grid, pen) else {
        return;
    };
    let mut reachable = flood(grid, start);

    let mut iterations = 0;
    while has_unreachable(grid, &reachable) && iterations < width * height {
        let Some((x, y)) = find_bridge(grid, width, height, pen, &reachable) else {
            break;
        };
        grid[y][x] = Tile::Empty;
        reachable = flood(grid, start);
        iterations += 1;
    }
}

/// First wall that separates the reached region from an unreached cell.
fn find_bridge(
    grid: &[Vec<Tile>],
    width: usize,
    height: usize,
    pen: &PenBounds,
    reachable: &[Vec<bool>],
) -> Option<(usize, usize)> {
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if grid[y][x] != Tile::Wall || is_pen_wall(x, y, pen) {
                continue;
            }
            let mut has_reach = false;
            let mut has_unreach = false;
            for dir in Direction::MOVES {
                let (dx, dy) = dir.delta();
                let nx = (x as i32 + dx) as usize;
                let ny = (y as i32 + dy) as usize;
                if !grid[ny][nx].is_traversable() {
                    continue;
                }
                if reachable[ny][nx] {
                    has_reach = true;
                } else {
                    has_unreach = true;
                }
            }
            if has_reach && has_unreach {
                return Some((x, y));
            }
        }
    }
    None
}

fn find_start(grid: &[Vec<Tile>], pen: &PenBounds) -> Option<Pos> {
    for (y, row) in grid.iter().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let pos = Pos::new(x as i32, y as i32);
            if *tile == Tile::Empty && !in_pen_box(pos, pen) {
                return Some(pos);
            }
        }
    }
    None
}

fn has_unreachable(grid: &[Vec<Tile>], reachable: &[Vec<bool>]) -> bool {
    grid.iter().zip(reachable).any(|(row, seen)| {
        row.iter()
            .zip(seen)
            .any(|(tile, reached)| tile.is_traversable() && !reached)
    })
}

fn flood(grid: &[Vec<Tile>], start: Pos) -> Vec<Vec<bool>> {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    let mut seen = vec![vec![false; width]; height];
    let mut q = VecDeque::new();
    seen[start.y as usize][start.x as usize] = true;
    q.push_back(start);
    while let Some(pos) = q.pop_front() {
        for dir in Direction::MOVES {
            let next = pos.step(dir);
            if next.x < 0 || next.y < 0 || next.x >= width as i32 || next.y >= height as i32 {
                continue;
            }
            let (nx, ny) = (next.x as usize, next.y as usize);
            if seen[ny][nx] || !grid[ny][nx].is_traversable() {
                continue;
            }
            seen[ny][nx] = true;
            q.push_back(next);
        }
    }
    seen
}

fn pick_spawn<R: RandomSource + ?Sized>(grid: &[Vec<Tile>], pen: &PenBounds, rng: &mut R) -> Pos {
    let mut empties = Vec::new();
    for (y, row) in grid.iter().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let pos = Pos::new(x as i32, y as i32);
            if *tile == Tile::Empty && !in_pen_box(pos, pen) {
                empties.push(pos);
            }
        }
    }
    // Cell (0, 0) of the carving lattice is always open and never under the pen.
    rng::choose(rng, &empties).unwrap_or(Pos::new(1, 1))
}

/// Turns every empty cell reachable from the spawn into a dot, except the
/// cells around the spawn, and promotes the cells nearest the four corners to
/// power pellets.
fn place_collectibles(grid: &mut [Vec<Tile>], spawn: Pos) {
    let height = grid.len();
    let width = grid[0].len();
    let reachable = flood(grid, spawn);

    let mut eligible = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let pos = Pos::new(x as i32, y as i32);
            if reachable[y][x]
                && grid[y][x] == Tile::Empty
                && pos.manhattan(spawn) > SPAWN_CLEAR_RADIUS
            {
                eligible.push(pos);
            }
        }
    }

    let (w, h) = (width as i32, height as i32);
    let corners = [
        Pos::new(1, 1),
        Pos::new(w - 2, 1),
        Pos::new(1, h - 2),
        Pos::new(w - 2, h - 2),
    ];
    for corner in corners {
        let nearest = eligible
            .iter()
            .copied()
            .filter(|p| grid[p.y as usize][p.x as usize] == Tile::Empty)
            .min_by_key(|p| p.manhattan(corner));
        if let Some(pos) = nearest {
            grid[pos.y as usize][pos.x as usize] = Tile::PowerCollectible;
        }
    }

    for pos in eligible {
        let tile = &mut grid[pos.y as usize][pos.x as usize];
        if *tile == Tile::Empty {
            *tile = Tile::Collectible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StdRandom;

    const SMALL: &str = "\
#########
#P..#..o#
#.#.#.#.#
#...=...#
#########";

    fn generated(seed: u64) -> Maze {
        let dims = Dimensions::new(40, 30).unwrap();
        Maze::generate(dims, &mut StdRandom::seeded(seed))
    }

    #[test]
    fn border_and_outside_are_never_traversable() {
        for seed in 0..8 {
            let maze = generated(seed);
            let (w, h) = (maze.width() as i32, maze.height() as i32);
            for x in -1..=w {
                for y in [-1, 0, h - 1, h] {
                    assert!(!maze.is_traversable(Pos::new(x, y)), "({x}, {y}) seed {seed}");
                }
            }
            for y in -1..=h {
                for x in [-1, 0, w - 1, w] {
                    assert!(!maze.is_traversable(Pos::new(x, y)), "({x}, {y}) seed {seed}");
                }
            }
        }
    }

    #[test]
    fn collectibles_are_reachable_from_spawn() {
        for seed in 0..8 {
            let maze = generated(seed);
            let spawn = maze.spawn_position();
            assert!(maze.is_traversable(spawn));
            let reachable = maze.reachable_cells(spawn);
            let dots = maze.collectible_positions();
            let powers = maze.power_collectible_positions();
            assert!(!dots.is_empty());
            assert_eq!(powers.len(), 4);
            for pos in dots.iter().chain(&powers) {
                assert!(reachable.contains(pos), "{pos:?} unreachable, seed {seed}");
                assert!(pos.manhattan(spawn) > SPAWN_CLEAR_RADIUS);
            }
        }
    }

    #[test]
    fn ghost_house_is_stable_and_walkable() {
        let first = generated(1);
        let second = generated(2);
        assert_eq!(first.adversary_spawn_positions(), second.adversary_spawn_positions());
        assert_eq!(first.adversary_spawn_positions().len(), MAX_GHOSTS);
        let reachable = first.reachable_cells(first.spawn_position());
        for pos in first.adversary_spawn_positions() {
            assert_eq!(first.tile(*pos), Some(Tile::Den));
            assert!(reachable.contains(pos), "ghost spawn {pos:?} is sealed off");
        }
    }

    #[test]
    fn parses_layout() {
        let maze = Maze::from_layout(SMALL).unwrap();
        assert_eq!((maze.width(), maze.height()), (9, 5));
        assert_eq!(maze.spawn_position(), Pos::new(1, 1));
        assert_eq!(maze.power_collectible_positions(), vec![Pos::new(7, 1)]);
        assert_eq!(maze.tile(Pos::new(4, 3)), Some(Tile::Den));
        assert!(maze.is_traversable(Pos::new(4, 3)));
        assert!(!maze.is_traversable(Pos::new(4, 1)));
        assert_eq!(maze.tile(Pos::new(9, 1)), None);
    }

    #[test]
    fn rejects_broken_layouts() {
        assert_eq!(Maze::from_layout(""), Err(GameError::EmptyLayout));
        assert_eq!(
            Maze::from_layout("###\n#P.#\n###"),
            Err(GameError::RaggedLayout {
                row: 1,
                expected: 3,
                found: 4
            })
        );
        assert_eq!(
            Maze::from_layout("####\n P.#\n####"),
            Err(GameError::OpenBorder { x: 0, y: 1 })
        );
        assert_eq!(
            Maze::from_layout("#####\n#..x#\n#####"),
            Err(GameError::UnknownGlyph { glyph: 'x', x: 3, y: 1 })
        );
        assert_eq!(Maze::from_layout("####\n#..#\n####"), Err(GameError::MissingSpawn));
        assert_eq!(
            Maze::from_layout("######\n#P#..#\n######"),
            Err(GameError::UnreachableCollectible { x: 3, y: 1 })
        );
        assert_eq!(Maze::from_layout("####\n#P #\n####"), Err(GameError::NoCollectibles));
    }

    #[test]
    fn sideways_steps_wrap() {
        let maze = Maze::from_layout(SMALL).unwrap();
        assert_eq!(maze.step_from(Pos::new(0, 1), Direction::Left), Some(Pos::new(8, 1)));
        assert_eq!(maze.step_from(Pos::new(8, 3), Direction::Right), Some(Pos::new(0, 3)));
        assert_eq!(maze.step_from(Pos::new(1, 1), Direction::Up), None);
        assert_eq!(maze.step_from(Pos::new(1, 1), Direction::Right), Some(Pos::new(2, 1)));
    }
}
