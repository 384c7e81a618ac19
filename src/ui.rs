use crate::{join_errors, participant_input_with_count};
use anyhow::Result;
use bill_splitter::{
    format_currency, row_label, BillSummary, NewEntryForm, Session, ValidationError,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dishes,
    Shares,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Dishes => Page::Shares,
            Page::Shares => Page::Dishes,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dishes => "Dishes",
            Page::Shares => "Who Owes What",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Price,
    Count,
    Participants,
}

impl FormField {
    fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Price,
            FormField::Price => FormField::Count,
            FormField::Count => FormField::Participants,
            FormField::Participants => FormField::Name,
        }
    }

    fn previous(&self) -> Self {
        match self {
            FormField::Name => FormField::Participants,
            FormField::Price => FormField::Name,
            FormField::Count => FormField::Price,
            FormField::Participants => FormField::Count,
        }
    }
}

/// Text typed into the add-dish popup
#[derive(Debug, Clone, PartialEq)]
pub struct DishForm {
    pub name: String,
    pub price: String,
    /// Head count, capped by the party size; blank means any number of names
    pub count: String,
    pub participants: String,
    pub focus: FormField,
}

impl DishForm {
    fn new() -> Self {
        DishForm {
            name: String::new(),
            price: String::new(),
            count: String::new(),
            participants: String::new(),
            focus: FormField::Name,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Price => &mut self.price,
            FormField::Count => &mut self.count,
            FormField::Participants => &mut self.participants,
        }
    }

    /// Price and count text are parsed here; everything else is left to the entry validation.
    fn to_entry_form(&self) -> std::result::Result<NewEntryForm, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let price = self.price.trim().trim_start_matches('$').parse::<f64>();
        if price.is_err() {
            errors.push(ValidationError::new("price", "Must be a number"));
        }

        let count = match self.count.trim() {
            "" => Ok(None),
            text => text.parse::<usize>().map(Some),
        };
        if count.is_err() {
            errors.push(ValidationError::new(
                "participants.count",
                "Must be a whole number",
            ));
        }

        match (price, count) {
            (Ok(price), Ok(count)) => Ok(NewEntryForm {
                name: self.name.clone(),
                price,
                participants: participant_input_with_count(count, &self.participants),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateField {
    Tax,
    Tip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    AddDish(DishForm),
    EditRate(RateField, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

pub struct App {
    pub session: Session,
    pub tax_percent: f64,
    pub tip_percent: f64,
    pub state: TableState,
    pub current_page: Page,
    pub mode: Mode,
    pub message: Option<StatusMessage>,
}

impl App {
    pub fn new(session: Session, tax_percent: f64, tip_percent: f64) -> Self {
        Self {
            session,
            tax_percent,
            tip_percent,
            state: TableState::default(),
            current_page: Page::Dishes,
            mode: Mode::Normal,
            message: None,
        }
    }

    /// Recomputed on every draw; nothing is cached between frames
    pub fn summary(&self) -> std::result::Result<BillSummary, Vec<ValidationError>> {
        self.session.summary(self.tax_percent, self.tip_percent)
    }

    pub fn next(&mut self) {
        let len = self.session.ledger().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.session.ledger().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn remove_selected(&mut self) {
        let Some(index) = self.state.selected() else {
            self.message = Some(StatusMessage::Error("No dish selected".to_string()));
            return;
        };

        let label = self
            .session
            .ledger()
            .get(index)
            .map(|entry| row_label(index, entry));

        match self.session.remove_dish(index) {
            Ok(_) => {
                self.message = label.map(|l| StatusMessage::Info(format!("Removed {}", l)));
                let len = self.session.ledger().len();
                self.state.select(if len == 0 { None } else { Some(index.min(len - 1)) });
            }
            Err(e) => self.message = Some(StatusMessage::Error(e.to_string())),
        }
    }

    fn submit_dish(&mut self, form: &DishForm) -> bool {
        let result = form
            .to_entry_form()
            .and_then(|entry_form| self.session.add_dish(&entry_form));

        match result {
            Ok(position) => {
                self.state.select(Some(position));
                self.message = Some(StatusMessage::Info(format!("Added {}", form.name.trim())));
                true
            }
            Err(errors) => {
                self.message = Some(StatusMessage::Error(join_errors(&errors)));
                false
            }
        }
    }

    fn submit_rate(&mut self, field: RateField, text: &str) -> bool {
        let value = match text.trim().trim_end_matches('%').parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                self.message = Some(StatusMessage::Error(format!(
                    "Rate must be a non-negative number, got '{}'",
                    text
                )));
                return false;
            }
        };

        match field {
            RateField::Tax => self.tax_percent = value,
            RateField::Tip => self.tip_percent = value,
        }
        self.message = None;
        true
    }

    /// Handle one key press. Returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::AddDish(mut form) => {
                let keep_open = match key.code {
                    KeyCode::Esc => false,
                    KeyCode::Tab => {
                        form.focus = form.focus.next();
                        true
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        form.focus = form.focus.previous();
                        true
                    }
                    KeyCode::Down => {
                        form.focus = form.focus.next();
                        true
                    }
                    KeyCode::Enter => !self.submit_dish(&form),
                    KeyCode::Backspace => {
                        form.focused_mut().pop();
                        true
                    }
                    KeyCode::Char(c) => {
                        form.focused_mut().push(c);
                        true
                    }
                    _ => true,
                };
                if keep_open {
                    self.mode = Mode::AddDish(form);
                }
            }
            Mode::EditRate(field, mut text) => {
                let keep_open = match key.code {
                    KeyCode::Esc => false,
                    KeyCode::Enter => !self.submit_rate(field, &text),
                    KeyCode::Backspace => {
                        text.pop();
                        true
                    }
                    KeyCode::Char(c) => {
                        text.push(c);
                        true
                    }
                    _ => true,
                };
                if keep_open {
                    self.mode = Mode::EditRate(field, text);
                }
            }
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::Char('a') => self.mode = Mode::AddDish(DishForm::new()),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('t') => {
                self.mode = Mode::EditRate(RateField::Tax, self.tax_percent.to_string())
            }
            KeyCode::Char('p') => {
                self.mode = Mode::EditRate(RateField::Tip, self.tip_percent.to_string())
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            _ => {}
        }
        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with rates
            Constraint::Min(0),    // Content area
            Constraint::Length(7), // Totals
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    let summary = app.summary();

    render_header(f, chunks[0], app);
    match app.current_page {
        Page::Dishes => render_table(f, chunks[1], app),
        Page::Shares => render_shares(f, chunks[1], summary.as_ref().ok()),
    }
    render_totals(f, chunks[2], summary.as_ref().ok());
    render_status_bar(f, chunks[3], app);

    match &app.mode {
        Mode::AddDish(form) => render_dish_form(f, form),
        Mode::EditRate(field, text) => render_rate_prompt(f, *field, text),
        Mode::Normal => {}
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Dishes, Page::Shares].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Tax: {}%", app.tax_percent),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("Tip: {}%", app.tip_percent),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Party of {}", app.session.party_size()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .session
        .ledger()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Row::new(vec![
                Cell::from(i.to_string()),
                Cell::from(truncate(&entry.name, 28)),
                Cell::from(format_currency(entry.price)).style(Style::default().fg(Color::Green)),
                Cell::from(entry.split_count().to_string()),
                Cell::from(entry.participants.join(", ")),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(30),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Min(10),
        ],
    )
    .header(header_row(&["#", "Dish", "Price", "Split", "Names"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Current Entries "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_shares(f: &mut Frame, area: Rect, summary: Option<&BillSummary>) {
    let rows: Vec<Row> = summary
        .map(|s| {
            s.shares
                .iter()
                .map(|(person, amount)| {
                    Row::new(vec![
                        Cell::from(person.clone()),
                        Cell::from(format_currency(*amount))
                            .style(Style::default().fg(Color::Green)),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();

    let table = Table::new(rows, [Constraint::Length(30), Constraint::Length(16)])
        .header(header_row(&["Person", "Owes"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Amount Each Person Owes "),
        );

    f.render_widget(table, area);
}

fn render_totals(f: &mut Frame, area: Rect, summary: Option<&BillSummary>) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let lines = match summary {
        Some(s) => vec![
            Line::from(vec![
                Span::styled("  Subtotal:    ", label),
                Span::raw(format_currency(s.subtotal)),
            ]),
            Line::from(vec![
                Span::styled("  Tax:         ", label),
                Span::raw(format_currency(s.tax_amount)),
            ]),
            Line::from(vec![
                Span::styled("  Tip:         ", label),
                Span::raw(format_currency(s.tip_amount)),
            ]),
            Line::from(vec![
                Span::styled("  Grand Total: ", label),
                Span::styled(
                    format_currency(s.grand_total),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "  Rates are invalid",
            Style::default().fg(Color::Red),
        ))],
    };

    let totals = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Totals "),
    );
    f.render_widget(totals, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    match &app.message {
        Some(StatusMessage::Info(text)) => {
            spans.push(Span::styled(format!(" {} ", text), Style::default().fg(Color::Green)));
            spans.push(Span::raw("|"));
        }
        Some(StatusMessage::Error(text)) => {
            spans.push(Span::styled(format!(" {} ", text), Style::default().fg(Color::Red)));
            spans.push(Span::raw("|"));
        }
        None => {}
    }

    for (key, action) in [
        ("a", "Add"),
        ("d", "Remove"),
        ("t", "Tax"),
        ("p", "Tip"),
        ("Tab", "Page"),
        ("↑/↓", "Nav"),
    ] {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {} |", action)));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn render_dish_form(f: &mut Frame, form: &DishForm) {
    let area = centered_rect(60, 11, f.size());

    let field = |label: &'static str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(label, style),
            Span::raw(format!("{}{}", value, cursor)),
        ])
    };

    let content = vec![
        field("  Dish name:  ", &form.name, form.focus == FormField::Name),
        field("  Price:      ", &form.price, form.focus == FormField::Price),
        field("  How many:   ", &form.count, form.focus == FormField::Count),
        field(
            "  Names:      ",
            &form.participants,
            form.focus == FormField::Participants,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "  Names: comma-separated, or * for the whole roster",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            "  How many: at most the party size, or blank",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            "  Tab next field | Enter submit | Esc cancel",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let popup = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Add Dish "),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_rate_prompt(f: &mut Frame, field: RateField, text: &str) {
    let area = centered_rect(40, 3, f.size());
    let title = match field {
        RateField::Tax => " Tax (%) ",
        RateField::Tip => " Tip (%) ",
    };

    let prompt = Paragraph::new(Line::from(vec![Span::raw(" "), Span::raw(format!("{}_", text))]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(title),
        );
    f.render_widget(Clear, area);
    f.render_widget(prompt, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
