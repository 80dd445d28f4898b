use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use ghost_chase::{CollectibleKind, GhostKind, GhostState, Maze, Pos, Snapshot, Tile};

const CELL_W: usize = 2;
/// Ticks per half-period of the power pellet pulse.
const PULSE_TICKS: u32 = 8;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Eyes,
    Wall,
    Empty,
    Den,
    Pellet,
    Power,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Cell>,
    last_hud: String,
    status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn layout_size(&self) -> (u16, u16) {
        ((self.width * CELL_W) as u16, (self.height + 2) as u16)
    }

    pub fn draw(&mut self, stdout: &mut Stdout, maze: &Maze, snap: &Snapshot) -> io::Result<()> {
        let (needed_w, needed_h) = self.layout_size();
        stdout.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        let pause = if snap.paused { "  PAUSED" } else { "" };
        let hud = format!(
            "Score: {}  Lives: {}  Level: {}  Dots: {}{}  {}",
            snap.score, snap.lives, snap.level, snap.remaining, pause, self.status
        );
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let frame = compose(maze, snap, self.width, self.height);
        for (idx, cell) in frame.into_iter().enumerate() {
            if self.needs_full || cell != self.last[idx] {
                self.last[idx] = cell;
                self.draw_cell(stdout, idx % self.width, idx / self.width, cell)?;
            }
        }
        self.needs_full = false;

        stdout.flush()
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Eyes => "👀",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Den => "░░",
            Glyph::Pellet => "· ",
            Glyph::Power => "● ",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            stdout.queue(Print(' '))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }

    pub fn draw_game_over(&self, stdout: &mut Stdout, snap: &Snapshot) -> io::Result<()> {
        let (needed_w, needed_h) = self.layout_size();
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(MoveTo(0, needed_h))?;
        } else {
            stdout.queue(MoveTo(self.origin_x, self.origin_y + self.height as u16))?;
        }
        stdout.queue(Print(format!(
            "GAME OVER - Final Score: {} (r to restart, q to quit)",
            snap.score
        )))?;
        stdout.flush()
    }
}

/// Lays the snapshot over the static maze: tiles, then items, ghosts and
/// finally the player on top.
fn compose(maze: &Maze, snap: &Snapshot, width: usize, height: usize) -> Vec<Cell> {
    let mut frame = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let tile = maze.tile(Pos::new(x as i32, y as i32));
            frame.push(tile_cell(tile));
        }
    }

    let mut put = |pos: Pos, cell: Cell| {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height {
            frame[pos.y as usize * width + pos.x as usize] = cell;
        }
    };

    for item in &snap.collectibles {
        let cell = match item.kind {
            CollectibleKind::Dot => Cell {
                glyph: Glyph::Pellet,
                color: Color::White,
            },
            CollectibleKind::Power => Cell {
                glyph: Glyph::Power,
                color: if (item.phase / PULSE_TICKS) % 2 == 0 {
                    Color::Magenta
                } else {
                    Color::DarkMagenta
                },
            },
        };
        put(item.pos, cell);
    }

    for ghost in &snap.ghosts {
        let cell = match ghost.state {
            GhostState::Eaten => Cell {
                glyph: Glyph::Eyes,
                color: Color::White,
            },
            GhostState::Vulnerable => Cell {
                glyph: Glyph::Frightened,
                color: if ghost.flashing { Color::White } else { Color::Blue },
            },
            GhostState::Chase | GhostState::Scatter => Cell {
                glyph: Glyph::Ghost,
                color: ghost_color(ghost.kind),
            },
        };
        put(ghost.pos, cell);
    }

    if !snap.player.blink {
        put(
            snap.player.pos,
            Cell {
                glyph: Glyph::Player,
                color: Color::Yellow,
            },
        );
    }
    frame
}

fn tile_cell(tile: Option<Tile>) -> Cell {
    match tile {
        Some(Tile::Wall) => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Some(Tile::Den) => Cell {
            glyph: Glyph::Den,
            color: Color::DarkGrey,
        },
        // Items are drawn from the snapshot so eaten ones disappear.
        Some(Tile::Empty | Tile::Collectible | Tile::PowerCollectible) | None => BLANK,
    }
}

fn ghost_color(kind: GhostKind) -> Color {
    match kind {
        GhostKind::Blinky => Color::Red,
        GhostKind::Pinky => Color::Magenta,
        GhostKind::Inky => Color::Cyan,
        GhostKind::Clyde => Color::DarkYellow,
    }
}
