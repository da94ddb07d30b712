use crate::TermInt;
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};
use snake_grid::render::Frame;
use snake_grid::snake::Snake;
use snake_grid::Coords;

type TermCoords = (TermInt, TermInt);

/// Every grid cell is this many columns wide so the board looks square.
const CELL_WIDTH: TermInt = 2;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    board: Option<Board>,
    last_frame: Option<Frame>,
}

struct Message {
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
}

/// Where the grid sits on the terminal: the border's top-left corner and
/// the number of cells per side.
#[derive(Copy, Clone)]
struct Board {
    top_left: TermCoords,
    cells: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading size.")?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, board: None, last_frame: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode.")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor.")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error setting raw mode.")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Clears the screen and draws an empty bordered board of `cells` per
    /// side, centered, with one spare line below it for the score.
    pub fn draw_board(&mut self, cells: TermInt) -> Result<()> {
        let (outer_w, outer_h) = match outer_size(cells) {
            Some(size) => size,
            None => bail!("a board of {} cells per side does not fit any terminal", cells),
        };
        if outer_w > self.width || outer_h + 1 > self.height {
            bail!(
                "terminal is {}x{}, the board needs at least {}x{}",
                self.width, self.height, outer_w, outer_h + 1
            );
        }

        self.clear()?;
        let top_left = ((self.width - outer_w) / 2, (self.height - outer_h - 1) / 2);
        self.board = Some(Board { top_left, cells });
        self.last_frame = None;

        let (x0, y0) = top_left;
        let (end_x, end_y) = (x0 + outer_w - 1, y0 + outer_h - 1);

        for x in x0..=end_x {
            let ch = if x == x0 || x == end_x {'+'} else {'-'};
            self.print_at((x, y0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in y0 + 1..end_y {
            self.print_at((x0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    /// Draws `frame`, touching only the cells that changed since the last one.
    pub fn draw_frame(&mut self, frame: &Frame) -> Result<()> {
        let last = self.last_frame.take();

        if let Some(prev) = &last {
            for pos in &prev.snake {
                if !frame.snake.contains(pos) {
                    self.print_cell(*pos, ' ')?;
                }
            }
            if let Some(food) = prev.food {
                if Some(food) != frame.food && !frame.snake.contains(&food) {
                    self.print_cell(food, ' ')?;
                }
            }
        }

        for pos in frame.snake.iter().skip(1) {
            self.print_cell(*pos, SNAKE_BODY_CHAR)?;
        }
        self.print_cell(frame.head(), Snake::head_char(frame.heading))?;

        if let Some(food) = frame.food {
            self.print_cell(food, FOOD_CHAR)?;
        }

        self.print_score(&frame.score_text)?;
        self.last_frame = Some(frame.clone());
        self.flush()
    }

    pub fn draw_dead_snake(&mut self, frame: &Frame) -> Result<()> {
        for pos in &frame.snake {
            self.print_cell(*pos, DEAD_SNAKE_CHAR)?;
        }
        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let (x, y) = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(&ch) = self.screen.get(self.width as usize * y as usize + x as usize) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing.")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing.")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_cell(&mut self, pos: Coords, ch: char) -> Result<()> {
        let board = match self.board {
            Some(board) => board,
            None => return Ok(()),
        };
        if pos.0 < 0 || pos.1 < 0 || pos.0 as TermInt >= board.cells || pos.1 as TermInt >= board.cells {
            return Ok(());
        }

        let x = board.top_left.0 + 1 + pos.0 as TermInt * CELL_WIDTH;
        let y = board.top_left.1 + 1 + pos.1 as TermInt;
        for dx in 0..CELL_WIDTH {
            self.print_at((x + dx, y), ch)?;
        }
        Ok(())
    }

    fn print_score(&mut self, text: &str) -> Result<()> {
        let board = match self.board {
            Some(board) => board,
            None => return Ok(()),
        };
        let y = board.top_left.1 + board.cells + 2;
        // draw_board already checked that the bordered board fits.
        let line_width = board.cells as usize * CELL_WIDTH as usize + 2;
        let padded = format!("{text: <width$}", text = text, width = line_width);
        for (x_diff, ch) in padded.chars().enumerate() {
            self.print_at((board.top_left.0 + x_diff as TermInt, y), ch)?;
        }
        Ok(())
    }

    fn print_at(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        self.print_at_no_save(pos, ch)?;
        if let Some(cell) = self.screen.get_mut(self.width as usize * pos.1 as usize + pos.0 as usize) {
            *cell = ch;
        }
        Ok(())
    }

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing.")
    }
}

/// Border included. `None` when the board is too big to address.
fn outer_size(cells: TermInt) -> Option<(TermInt, TermInt)> {
    let w = cells.checked_mul(CELL_WIDTH)?.checked_add(2)?;
    let h = cells.checked_add(2)?;
    Some((w, h))
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: TermCoords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> TermCoords {
        self.top_left
    }
}
