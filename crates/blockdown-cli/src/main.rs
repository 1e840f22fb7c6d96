use anyhow::Result;
use blockdown_config::Config;
use blockdown_engine::editing::{Cmd, Direction, Document};
use blockdown_engine::model::{Block, BlockKind, ContentItem, attr};
use blockdown_engine::serialize::SerializeOptions;
use blockdown_engine::{io, serialize};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout, Position},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block as UiBlock, Borders, Paragraph},
};
use std::{env, io::stdout, path::PathBuf, process};

struct App {
    path: Option<PathBuf>,
    doc: Document,
    opts: SerializeOptions,
    dirty: bool,
    status: String,
}

impl App {
    fn new(path: Option<PathBuf>, config: &Config) -> Result<Self> {
        let doc = match &path {
            Some(p) if p.exists() => {
                let content = io::read_markdown(p)?;
                log::info!("loaded {} ({} bytes)", p.display(), content.len());
                Document::from_markdown(&content)
            }
            _ => Document::new(),
        };

        Ok(Self {
            path: path.or_else(|| config.autosave_path.clone()),
            doc,
            opts: SerializeOptions {
                numbered_list_markers: config.numbered_list_markers,
            },
            dirty: false,
            status: "Esc: quit | Ctrl+S: save".to_string(),
        })
    }

    fn dispatch(&mut self, cmd: Cmd) {
        log::debug!("dispatch {cmd:?}");
        let patch = self.doc.apply(cmd);
        if patch.changed {
            self.dirty = true;
        }
    }

    fn save(&mut self) {
        let Some(path) = self.path.clone() else {
            self.status = "No file path; start with one or set autosave_path".to_string();
            return;
        };
        let text = self.doc.text_with(&self.opts);
        match io::write_markdown(&path, &text) {
            Ok(()) => {
                log::info!("saved {} ({} bytes)", path.display(), text.len());
                self.dirty = false;
                self.status = format!("Saved {}", path.display());
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                self.status = format!("Save failed: {e}");
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let path = match args.len() {
        1 => None,
        2 => Some(PathBuf::from(&args[1])),
        _ => {
            eprintln!("Usage: {} [markdown-file]", args[0]);
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(path, &config)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.save();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.dispatch(Cmd::InsertChar(c));
                }
                KeyCode::Backspace => app.dispatch(Cmd::DeleteBackward),
                KeyCode::Delete => app.dispatch(Cmd::DeleteForward),
                KeyCode::Enter => app.dispatch(Cmd::SplitBlock),
                KeyCode::Left => app.dispatch(Cmd::Move(Direction::Left)),
                KeyCode::Right => app.dispatch(Cmd::Move(Direction::Right)),
                KeyCode::Up => app.dispatch(Cmd::Move(Direction::Up)),
                KeyCode::Down => app.dispatch(Cmd::Move(Direction::Down)),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let editor_area = chunks[0];
    let cursor = app.doc.cursor();

    // One rendered line per block (code blocks span several), tracking
    // where the cursor lands in screen coordinates.
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_xy: Option<(usize, usize)> = None;

    for (index, block) in app.doc.blocks().iter().enumerate() {
        let rendered = serialize::block_to_markdown(block);
        let first_row = lines.len();
        let style = style_for(block);
        for text_line in rendered.split('\n') {
            lines.push(Line::from(Span::styled(text_line.to_string(), style)));
        }
        if index == cursor.block {
            let (row, col) = cursor_screen_offset(block, cursor.item, cursor.offset);
            cursor_xy = Some((first_row + row, col));
        }
    }

    // Keep the cursor row visible.
    let inner_height = editor_area.height.saturating_sub(2) as usize;
    let scroll = cursor_xy
        .map(|(row, _)| row.saturating_sub(inner_height.saturating_sub(1)))
        .unwrap_or(0);

    let title = match &app.path {
        Some(p) => format!("{}{}", p.display(), if app.dirty { " *" } else { "" }),
        None => format!("untitled{}", if app.dirty { " *" } else { "" }),
    };
    let editor = Paragraph::new(lines)
        .block(UiBlock::default().borders(Borders::ALL).title(title))
        .scroll((scroll as u16, 0));
    f.render_widget(editor, editor_area);

    if let Some((row, col)) = cursor_xy {
        let x = editor_area.x + 1 + col as u16;
        let y = editor_area.y + 1 + (row - scroll) as u16;
        f.set_cursor_position(Position::new(x, y));
    }

    let help = Paragraph::new(Line::from(app.status.as_str()));
    f.render_widget(help, chunks[1]);
}

/// Row within the block's rendered lines and column within that row for a
/// cursor at `(item, offset)`.
fn cursor_screen_offset(block: &Block, item: usize, offset: usize) -> (usize, usize) {
    if block.kind == BlockKind::CodeBlock {
        // Row 0 is the opening fence; the body starts on row 1.
        let body: String = block
            .fragment(0)
            .unwrap_or_default()
            .chars()
            .take(offset)
            .collect();
        let row = 1 + body.matches('\n').count();
        let col = body.rsplit('\n').next().map(|s| s.chars().count()).unwrap_or(0);
        return (row, col);
    }

    let prefix = match block.kind {
        BlockKind::Heading => {
            let level: usize = block
                .attr(attr::LEVEL)
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            level + 1
        }
        BlockKind::ListItem | BlockKind::Quote => 2,
        _ => 0,
    };

    // Text of items left of the cursor contributes to the column; nested
    // blocks are approximated by their serialized width.
    let mut col = prefix + offset;
    for earlier in block.content.iter().take(item) {
        match earlier {
            ContentItem::Text(s) => col += s.chars().count(),
            ContentItem::Nested(nested) => {
                col += serialize::block_to_markdown(nested).chars().count();
            }
        }
    }
    (0, col)
}

fn style_for(block: &Block) -> Style {
    match block.kind {
        BlockKind::Heading => Style::default().fg(Color::Cyan),
        BlockKind::Quote => Style::default().fg(Color::Green),
        BlockKind::CodeBlock => Style::default().fg(Color::Yellow),
        BlockKind::ListItem => Style::default().fg(Color::Magenta),
        _ => Style::default(),
    }
}
