use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::{cards, App, Mode};

/// Render the browser: song list and settings on the left, result cards on
/// the right.
pub fn render(frame: &mut Frame, app: &App<'_>) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(8),    // Body
            Constraint::Length(3), // Help bar
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Length(4), // Settings
            Constraint::Min(3),    // Songs
        ])
        .split(body[0]);

    render_title(frame, app, chunks[0]);
    render_search(frame, app, sidebar[0]);
    render_settings(frame, app, sidebar[1]);
    render_songs(frame, app, sidebar[2]);
    cards::render(frame, app, body[1]);
    render_help(frame, app, chunks[2]);
}

fn render_title(frame: &mut Frame, app: &App<'_>, area: Rect) {
    let title = Paragraph::new(format!(
        "Cadenza Song Recommender    {} songs",
        app.recommender.catalog().len()
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_search(frame: &mut Frame, app: &App<'_>, area: Rect) {
    let (text, style) = match app.mode {
        Mode::Search => (format!("{}_", app.filter), Style::default().fg(Color::Yellow)),
        Mode::Browse if app.filter.is_empty() => {
            ("press / to search".to_string(), Style::default().fg(Color::DarkGray))
        }
        Mode::Browse => (app.filter.clone(), Style::default()),
    };
    let search = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    frame.render_widget(search, area);
}

fn render_settings(frame: &mut Frame, app: &App<'_>, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::raw("Recommendations: "),
            Span::styled(
                app.k.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("range {}-{}  (+/-)", app.limits.min, app.limits.max),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let settings =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Settings"));
    frame.render_widget(settings, area);
}

fn render_songs(frame: &mut Frame, app: &App<'_>, area: Rect) {
    let catalog = app.recommender.catalog();

    // area.height - 2 for borders
    let viewport_height = (area.height.saturating_sub(2) as usize).max(1);
    let visible_start = if app.selected >= app.list_offset + viewport_height {
        app.selected + 1 - viewport_height
    } else {
        app.list_offset.min(app.selected)
    };
    let visible_end = (visible_start + viewport_height).min(app.visible.len());

    let items: Vec<ListItem> = app
        .visible
        .iter()
        .enumerate()
        .skip(visible_start)
        .take(viewport_height)
        .filter_map(|(i, &row)| catalog.get(row).map(|song| (i, song)))
        .map(|(i, song)| {
            let style = if i == app.selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(song.title.clone()),
                Span::styled(
                    format!("  {}", song.artist),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
            .style(style)
        })
        .collect();

    let title = if app.visible.len() > viewport_height {
        format!(
            "Songs [{}-{} of {}]",
            visible_start + 1,
            visible_end,
            app.visible.len()
        )
    } else {
        format!("Songs ({})", app.visible.len())
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_help(frame: &mut Frame, app: &App<'_>, area: Rect) {
    let help = if let Some(message) = &app.message {
        Paragraph::new(format!("  {}", message)).style(Style::default().fg(Color::Red))
    } else {
        let keys = match app.mode {
            Mode::Browse => {
                "  \u{2191}/k Up  \u{2193}/j Down  / Search  +/- Count  Enter Recommend  c Clear  q Quit"
            }
            Mode::Search => "  Type to filter  Enter Done  Esc Clear",
        };
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(help.block(Block::default().borders(Borders::ALL)), area);
}
