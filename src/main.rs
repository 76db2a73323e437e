use std::{
    fs::File,
    io::{self, stdout, Stdout},
    path::PathBuf,
    sync::Mutex,
};

use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use merge_tiles::config::{GameConfig, LossRule};
use merge_tiles::direction::Direction;
use merge_tiles::game::{Game, GameState};
use merge_tiles::tile::display_value;

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser, Debug)]
#[command(about = "Slide and merge tiles in the terminal")]
struct Args {
    /// TOML file with game settings. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Board dimension (N for an N×N board).
    #[arg(long)]
    size: Option<usize>,
    /// Highest tile level that can be placed.
    #[arg(long)]
    max_level: Option<u8>,
    /// Fixed RNG seed for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,
    /// Start with an empty board instead of two tiles.
    #[arg(long)]
    no_seed_tiles: bool,
    #[arg(long, value_enum)]
    loss_rule: Option<LossRuleArg>,
    /// Write logs to this file. The terminal is taken by the game.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LossRuleArg {
    Attempted,
    NoLegalMove,
}

impl Args {
    fn game_config(&self) -> io::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path).map_err(invalid_input)?,
            None => GameConfig::default(),
        };
        if let Some(size) = self.size {
            config.dimension = size;
        }
        if let Some(max_level) = self.max_level {
            config.max_level = max_level;
        }
        if self.seed.is_some() {
            config.rng_seed = self.seed;
        }
        if self.no_seed_tiles {
            config.seed_tiles = false;
        }
        if let Some(rule) = self.loss_rule {
            config.loss_rule = match rule {
                LossRuleArg::Attempted => LossRule::AttemptedDirection,
                LossRuleArg::NoLegalMove => LossRule::NoLegalMove,
            };
        }
        config.validate().map_err(invalid_input)?;
        Ok(config)
    }
}

fn invalid_input(err: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn init_logging(args: &Args) -> io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;

fn level_color(level: u8) -> Color {
    match level {
        1 => Color::Gray,
        2 => Color::White,
        3 => Color::Yellow,
        4 => Color::LightYellow,
        5 => Color::LightRed,
        6 => Color::Red,
        7 => Color::LightMagenta,
        8 => Color::Magenta,
        9 => Color::LightBlue,
        10 => Color::Blue,
        11 => Color::LightGreen,
        _ => Color::Green,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    match game.state() {
        GameState::Active => render_game(frame, game, area),
        GameState::Lost => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let n = game.dimension() as u16;
    let grid_display_width = n * CELL_WIDTH + 2;
    let grid_display_height = n * CELL_HEIGHT + 2;
    let info_width = 14;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "Arrows/WASD: Move | R: New game | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Merge ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = CELL_WIDTH as usize;
    let blank = " ".repeat(width);
    let mut lines: Vec<Line> = Vec::new();

    for row in game.levels() {
        let mut top = Vec::new();
        let mut middle = Vec::new();
        let mut bottom = Vec::new();

        for cell in row {
            match cell {
                None => {
                    top.push(Span::raw(blank.clone()));
                    middle.push(Span::styled(format!("{:^width$}", "·"), Style::default().fg(Color::DarkGray)));
                    bottom.push(Span::raw(blank.clone()));
                }
                Some(level) => {
                    let style = Style::default()
                        .fg(Color::Black)
                        .bg(level_color(level))
                        .add_modifier(Modifier::BOLD);
                    let label = format!("{:^width$}", display_value(level));
                    top.push(Span::styled(blank.clone(), style));
                    middle.push(Span::styled(label, style));
                    bottom.push(Span::styled(blank.clone(), style));
                }
            }
        }

        lines.push(Line::from(top));
        lines.push(Line::from(middle));
        lines.push(Line::from(bottom));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let best = game.highest_level().map_or(0, display_value);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Cyan))),
        Line::from(format!("{best}")),
        Line::from(""),
        Line::from(Span::styled("Free", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.unoccupied_count())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(""),
        Line::from(Span::styled(
            "Press R to play again",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = args.game_config()?;
    init_logging(&args)?;

    let mut game = Game::new(config).map_err(invalid_input)?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, game: &mut Game) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, game))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    game.restart().map_err(invalid_input)?;
                }
                code => {
                    if let Some(direction) = key_direction(code) {
                        game.apply_move(direction);
                    }
                }
            }
            // Events only feed the log here; the frame is redrawn from state.
            for event in game.take_events() {
                tracing::trace!(?event, "game event");
            }
        }
    }

    Ok(())
}
