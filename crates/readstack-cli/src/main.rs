use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use readstack_config::Config;
use readstack_engine::{
    Article, ArchiveStore, LibraryQuery, MarkdownElement, ProgressLedger, ReadingProgress,
    SortOrder, SpanStyle, all_tags, classify, io, next_unread, parse_blocks, pick_random,
    plain_text, resolve_spans,
};
use std::collections::HashMap;
use std::{
    env,
    io::stdout,
    path::{Path, PathBuf},
    process,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Reading,
}

/// One entry in the sectioned sidebar list.
enum Row {
    Header(&'static str),
    Article { id: String, line: String },
}

/// Article currently open in the reading pane, with its pre-rendered
/// lines so scrolling does not reparse the body.
struct Reading {
    article_id: String,
    title: String,
    lines: Vec<Line<'static>>,
    scroll: u16,
}

struct App {
    articles: Vec<Article>,
    ledger: ProgressLedger,
    archive: ArchiveStore,
    query: LibraryQuery,
    tag_cycle: Vec<String>,
    rows: Vec<Row>,
    preview: Vec<Line<'static>>,
    list_state: ListState,
    mode: Mode,
    reading: Option<Reading>,
    reading_viewport: u16,
    status: String,
}

impl App {
    fn new(articles_path: &Path) -> Result<Self> {
        let articles = io::load_articles(articles_path)?;
        let ledger = ProgressLedger::open(Config::progress_path());
        let archive = ArchiveStore::open(Config::archive_path());
        let tag_cycle = all_tags(&articles);

        let mut app = Self {
            articles,
            ledger,
            archive,
            query: LibraryQuery::default(),
            tag_cycle,
            rows: Vec::new(),
            preview: Vec::new(),
            list_state: ListState::default(),
            mode: Mode::Browse,
            reading: None,
            reading_viewport: 0,
            status: String::new(),
        };
        app.refresh_rows();
        Ok(app)
    }

    /// Reclassifies the library and rebuilds the sidebar rows. Runs after
    /// every change to search, tags, sort, progress or the archive.
    fn refresh_rows(&mut self) {
        let view = classify(&self.articles, self.ledger.all(), &self.query, self.archive.all());

        let mut rows = Vec::new();
        Self::push_section(&mut rows, "Continue Reading", &view.continue_reading, self.ledger.all());
        Self::push_section(&mut rows, "Quick Wins", &view.quick_wins, self.ledger.all());
        Self::push_section(&mut rows, "The Stack", &view.stack, self.ledger.all());
        Self::push_section(&mut rows, "Archived", &view.archived, self.ledger.all());
        self.rows = rows;

        self.clamp_selection();
        self.update_preview();
    }

    fn push_section(
        rows: &mut Vec<Row>,
        title: &'static str,
        bucket: &[&Article],
        progress: &HashMap<String, ReadingProgress>,
    ) {
        if bucket.is_empty() {
            return;
        }
        rows.push(Row::Header(title));
        for article in bucket {
            rows.push(Row::Article {
                id: article.id.clone(),
                line: Self::article_line(article, progress),
            });
        }
    }

    fn article_line(article: &Article, progress: &HashMap<String, ReadingProgress>) -> String {
        let mut line = format!("  {}", article.title);
        if let Some(author) = &article.author {
            line.push_str(&format!(" · {author}"));
        }
        line.push_str(&format!(" · {} min", article.estimated_reading_time()));
        if let Some(record) = progress.get(&article.id)
            && record.percentage > 0.0
        {
            line.push_str(&format!(" · {:.0}%", record.percentage));
        }
        line
    }

    /// Keeps the selection on an article row after the list is rebuilt.
    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.list_state.select(None);
            return;
        }
        let start = self.list_state.selected().unwrap_or(0).min(self.rows.len() - 1);
        let forward = (start..self.rows.len())
            .find(|&i| matches!(self.rows[i], Row::Article { .. }));
        let backward = (0..start)
            .rev()
            .find(|&i| matches!(self.rows[i], Row::Article { .. }));
        self.list_state.select(forward.or(backward));
    }

    fn next_row(&mut self) {
        self.step_selection(1);
    }

    fn previous_row(&mut self) {
        self.step_selection(-1);
    }

    /// Moves the selection to the next article row in `direction`,
    /// wrapping and skipping section headers.
    fn step_selection(&mut self, direction: i64) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let start = self.list_state.selected().unwrap_or(0) as i64;
        for step in 1..=len as i64 {
            let i = (start + direction * step).rem_euclid(len as i64) as usize;
            if matches!(self.rows[i], Row::Article { .. }) {
                self.list_state.select(Some(i));
                self.update_preview();
                return;
            }
        }
    }

    fn selected_article_id(&self) -> Option<&str> {
        match self.list_state.selected().and_then(|i| self.rows.get(i)) {
            Some(Row::Article { id, .. }) => Some(id),
            _ => None,
        }
    }

    fn update_preview(&mut self) {
        self.preview = match self
            .selected_article_id()
            .and_then(|id| self.articles.iter().find(|article| article.id == id))
        {
            Some(article) => render_article_lines(article),
            None => vec![Line::from("No articles match the current filters")],
        };
    }

    fn open_selected(&mut self) {
        if let Some(id) = self.selected_article_id().map(str::to_string) {
            self.open_article(&id);
        }
    }

    fn open_article(&mut self, id: &str) {
        let Some(article) = self.articles.iter().find(|article| article.id == id) else {
            return;
        };
        let lines = render_article_lines(article);
        let scroll = self
            .ledger
            .get(id)
            .map_or(0, |record| record.scroll_position as u16);
        self.reading = Some(Reading {
            article_id: article.id.clone(),
            title: article.title.clone(),
            lines,
            scroll,
        });
        self.mode = Mode::Reading;
    }

    fn close_reading(&mut self) {
        self.reading = None;
        self.mode = Mode::Browse;
        self.refresh_rows();
    }

    fn scroll_reading(&mut self, delta: i32) {
        let viewport = usize::from(self.reading_viewport.max(1));
        if let Some(reading) = self.reading.as_mut() {
            let max_scroll = reading.lines.len().saturating_sub(viewport) as i32;
            reading.scroll = (i32::from(reading.scroll) + delta).clamp(0, max_scroll) as u16;
        }
        self.store_reading_progress();
    }

    /// Persists the current scroll as a percentage of the scrollable
    /// range; an article that fits on one screen counts as fully read.
    fn store_reading_progress(&mut self) {
        let Some(reading) = &self.reading else { return };
        let viewport = usize::from(self.reading_viewport.max(1));
        let max_scroll = reading.lines.len().saturating_sub(viewport);
        let percentage = if max_scroll == 0 {
            100.0
        } else {
            (f64::from(reading.scroll) / max_scroll as f64 * 100.0).min(100.0)
        };
        let article_id = reading.article_id.clone();
        let scroll = f64::from(reading.scroll);
        if let Err(err) = self.ledger.set(&article_id, percentage, scroll) {
            self.status = format!("Failed to save progress: {err}");
        }
    }

    fn toggle_archive_selected(&mut self) {
        let Some(id) = self.selected_article_id().map(str::to_string) else {
            return;
        };
        let title = self
            .articles
            .iter()
            .find(|article| article.id == id)
            .map(|article| article.title.clone())
            .unwrap_or_else(|| id.clone());
        let result = if self.archive.is_archived(&id) {
            self.status = format!("Unarchived {title}");
            self.archive.unarchive(&id)
        } else {
            self.status = format!("Archived {title}");
            self.archive.archive(&id)
        };
        if let Err(err) = result {
            self.status = format!("Failed to update archive: {err}");
        }
        self.refresh_rows();
    }

    /// Cycles the tag filter through every known tag and back to none.
    fn cycle_tag_filter(&mut self) {
        let current = self.query.selected_tags.iter().next().cloned();
        let next = match current {
            None => self.tag_cycle.first().cloned(),
            Some(tag) => match self.tag_cycle.iter().position(|t| *t == tag) {
                Some(i) if i + 1 < self.tag_cycle.len() => Some(self.tag_cycle[i + 1].clone()),
                _ => None,
            },
        };
        self.query.selected_tags = next.into_iter().collect();
        self.refresh_rows();
    }

    fn cycle_sort(&mut self) {
        self.query.sort_order = match self.query.sort_order {
            SortOrder::DateAdded => SortOrder::Title,
            SortOrder::Title => SortOrder::Progress,
            SortOrder::Progress => SortOrder::DateAdded,
        };
        self.refresh_rows();
    }

    fn clear_filters(&mut self) {
        self.query.search_text.clear();
        self.query.selected_tags.clear();
        self.refresh_rows();
    }

    fn open_random(&mut self) {
        let view = classify(&self.articles, self.ledger.all(), &self.query, self.archive.all());
        let picked = pick_random(&view, &mut rand::thread_rng()).map(|article| article.id.clone());
        drop(view);
        match picked {
            Some(id) => self.open_article(&id),
            None => self.status = "Nothing to read".to_string(),
        }
    }

    fn open_next_unread(&mut self) {
        let Some(current_id) = self.reading.as_ref().map(|r| r.article_id.clone()) else {
            return;
        };
        let view = classify(&self.articles, self.ledger.all(), &self.query, self.archive.all());
        let next = next_unread(&view.active, &current_id, self.ledger.all())
            .map(|article| article.id.clone());
        drop(view);
        match next {
            Some(id) => self.open_article(&id),
            None => self.status = "No unread articles left".to_string(),
        }
    }
}

/// Renders one article as styled terminal lines: a metadata header, then
/// the parsed body with inline emphasis resolved.
fn render_article_lines(article: &Article) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(Line::from(Span::styled(
        article.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let mut meta = format!(
        "{} min read · {} words",
        article.estimated_reading_time(),
        article.word_count
    );
    if let Some(author) = &article.author {
        meta = format!("{author} · {meta}");
    }
    if let Some(domain) = article.source_domain() {
        meta.push_str(&format!(" · {domain}"));
    }
    lines.push(Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))));
    lines.push(Line::from(""));

    for element in parse_blocks(&article.content) {
        match element {
            MarkdownElement::Heading { level, text } => {
                let prefix = "#".repeat(level as usize);
                lines.push(Line::from(Span::styled(
                    format!("{prefix} {}", plain_text(&text)),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
            }
            MarkdownElement::Paragraph(text) => {
                lines.push(Line::from(styled_spans(&text)));
                lines.push(Line::from(""));
            }
            MarkdownElement::ListItem(text) => {
                let mut spans = vec![Span::raw("• ")];
                spans.extend(styled_spans(&text));
                lines.push(Line::from(spans));
            }
            MarkdownElement::Blockquote(text) => {
                lines.push(Line::from(Span::styled(
                    format!("> {}", plain_text(&text)),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            MarkdownElement::CodeBlock { language, code } => {
                lines.push(Line::from(Span::raw(format!(
                    "```{}",
                    language.as_deref().unwrap_or("")
                ))));
                for code_line in code.lines() {
                    lines.push(Line::from(Span::styled(
                        code_line.to_string(),
                        Style::default().fg(Color::Yellow),
                    )));
                }
                lines.push(Line::from(Span::raw("```")));
                lines.push(Line::from(""));
            }
            MarkdownElement::Image { alt, url } => {
                lines.push(Line::from(Span::styled(
                    format!("[image: {alt}] ({url})"),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::from(""));
            }
            MarkdownElement::Rule => {
                lines.push(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::from(""));
            }
        }
    }

    lines
}

fn styled_spans(text: &str) -> Vec<Span<'static>> {
    resolve_spans(text)
        .into_iter()
        .map(|span| {
            let style = match span.style {
                SpanStyle::Plain => Style::default(),
                SpanStyle::Bold => Style::default().add_modifier(Modifier::BOLD),
                SpanStyle::Italic => Style::default().add_modifier(Modifier::ITALIC),
                SpanStyle::Code => Style::default().fg(Color::Yellow),
            };
            Span::styled(span.text, style)
        })
        .collect()
}

fn init_tracing() {
    // The terminal owns stdout, so diagnostics go to stderr and only when
    // asked for.
    if env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();

    // Determine articles folder from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let articles_path;
    let from_config;

    if args.len() == 2 {
        // CLI argument provided - use it
        articles_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        // No CLI argument - try config file
        match Config::load() {
            Ok(Some(config)) => {
                articles_path = config.articles_path;
                from_config = true;
            }
            Ok(None) => {
                eprintln!("Error: No articles folder provided and no config file found");
                eprintln!("Usage: {} <articles-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <articles-folder-path>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [articles-folder-path]", args[0]);
        process::exit(1);
    };

    // Validate the folder before taking over the terminal
    if let Err(e) = io::validate_folder(&articles_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Articles folder '{}'{} is invalid: {e}",
            articles_path.display(),
            source
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(&articles_path)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.mode {
                Mode::Search => match key.code {
                    KeyCode::Enter => app.mode = Mode::Browse,
                    KeyCode::Esc => {
                        app.query.search_text.clear();
                        app.mode = Mode::Browse;
                        app.refresh_rows();
                    }
                    KeyCode::Backspace => {
                        app.query.search_text.pop();
                        app.refresh_rows();
                    }
                    KeyCode::Char(c) => {
                        app.query.search_text.push(c);
                        app.refresh_rows();
                    }
                    _ => {}
                },
                Mode::Reading => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Esc => app.close_reading(),
                    KeyCode::Down | KeyCode::Char('j') => app.scroll_reading(1),
                    KeyCode::Up | KeyCode::Char('k') => app.scroll_reading(-1),
                    KeyCode::PageDown | KeyCode::Char(' ') => {
                        app.scroll_reading(i32::from(app.reading_viewport.max(1)))
                    }
                    KeyCode::PageUp => {
                        app.scroll_reading(-i32::from(app.reading_viewport.max(1)))
                    }
                    KeyCode::Char('n') => app.open_next_unread(),
                    _ => {}
                },
                Mode::Browse => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next_row(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
                    KeyCode::Enter => app.open_selected(),
                    KeyCode::Char('/') => app.mode = Mode::Search,
                    KeyCode::Char('t') => app.cycle_tag_filter(),
                    KeyCode::Char('s') => app.cycle_sort(),
                    KeyCode::Char('a') => app.toggle_archive_selected(),
                    KeyCode::Char('r') => app.open_random(),
                    KeyCode::Esc => app.clear_filters(),
                    _ => {}
                },
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    if app.mode == Mode::Reading {
        let (title, lines, scroll) = match &app.reading {
            Some(reading) => (reading.title.clone(), reading.lines.clone(), reading.scroll),
            None => (String::new(), Vec::new(), 0),
        };
        let body = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        f.render_widget(body, chunks[0]);
        app.reading_viewport = chunks[0].height.saturating_sub(2);
    } else {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
            .split(chunks[0]);

        let items: Vec<ListItem> = app
            .rows
            .iter()
            .map(|row| match row {
                Row::Header(title) => ListItem::new(Line::from(Span::styled(
                    (*title).to_string(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))),
                Row::Article { line, .. } => ListItem::new(Line::from(Span::raw(line.clone()))),
            })
            .collect();

        let list_title = match app.mode {
            Mode::Search => format!("Search: {}▌", app.query.search_text),
            _ if !app.query.search_text.is_empty() => {
                format!("Library /{}", app.query.search_text)
            }
            _ => "Library".to_string(),
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(list_title))
            .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
        f.render_stateful_widget(list, panes[0], &mut app.list_state);

        let preview = Paragraph::new(app.preview.clone())
            .block(Block::default().borders(Borders::ALL).title("Preview"))
            .wrap(Wrap { trim: false });
        f.render_widget(preview, panes[1]);
    }

    f.render_widget(Paragraph::new(status_line(app)), chunks[1]);
    f.render_widget(Paragraph::new(help_line(app)), chunks[2]);
}

fn status_line(app: &App) -> Line<'static> {
    let sort = match app.query.sort_order {
        SortOrder::DateAdded => "date added",
        SortOrder::Title => "title",
        SortOrder::Progress => "progress",
    };
    let mut parts = vec![format!("sort: {sort}")];
    if let Some(tag) = app.query.selected_tags.iter().next() {
        parts.push(format!("tag: {tag}"));
    }
    if !app.status.is_empty() {
        parts.push(app.status.clone());
    }
    Line::from(Span::styled(
        parts.join(" | "),
        Style::default().fg(Color::DarkGray),
    ))
}

fn help_line(app: &App) -> Line<'static> {
    let text = match app.mode {
        Mode::Search => "Enter: Apply | Esc: Clear | type to search",
        Mode::Reading => {
            "q: Quit | Esc: Back | j/k: Scroll | Space: Page down | n: Next unread"
        }
        Mode::Browse => {
            "q: Quit | j/k: Move | Enter: Open | /: Search | t: Tag | s: Sort | a: Archive | r: Random"
        }
    };
    Line::from(Span::raw(text))
}
