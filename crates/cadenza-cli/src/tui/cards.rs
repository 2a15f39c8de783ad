use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::App;
use cadenza_search::Recommendation;

/// Rows taken by one card: three lines of text plus borders.
const CARD_HEIGHT: u16 = 5;

/// Render the results as a grid of cards, `cards_per_row` to a band.
pub fn render(frame: &mut Frame, app: &App<'_>, area: Rect) {
    let title = match &app.results_for {
        Some(title) => format!("Recommended Songs for {}", title),
        None => "Recommendations".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.results.is_empty() {
        let hint = Paragraph::new("Select a song and press Enter")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    let per_row = app.cards_per_row.max(1);
    let bands: Vec<&[Recommendation<'_>]> = app.results.chunks(per_row).collect();
    let room = (inner.height / CARD_HEIGHT) as usize;
    let shown = bands.len().min(room);

    let mut constraints = vec![Constraint::Length(CARD_HEIGHT); shown];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let ratio = u32::try_from(per_row).unwrap_or(u32::MAX);
    for (band, row_area) in bands.iter().take(shown).zip(rows.iter()) {
        // Every band is split the same way so cards line up in columns
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..per_row).map(|_| Constraint::Ratio(1, ratio)))
            .split(*row_area);

        for (rec, card_area) in band.iter().zip(columns.iter()) {
            frame.render_widget(card(rec), *card_area);
        }
    }

    if shown < bands.len() {
        let hidden = app.results.len() - shown * per_row;
        let more = Paragraph::new(format!("… {} more (enlarge the window)", hidden))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(more, rows[shown]);
    }
}

fn card(rec: &Recommendation<'_>) -> Paragraph<'static> {
    let lines = vec![
        Line::from(Span::styled(
            format!("♪ {}", rec.song.title),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Artist: {}", rec.song.artist)),
        Line::from(Span::styled(
            format!("Album: {}", rec.song.album),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("#{} ({:.2})", rec.rank, rec.score))
            .border_style(Style::default().fg(Color::Cyan)),
    )
}

#[cfg(test)]
mod tests {
    use crate::tui::browser::tests::render_lines;
    use crate::tui::tests::{config, recommender};
    use crate::tui::App;

    #[test]
    fn test_no_results_shows_hint() {
        let recommender = recommender();
        let app = App::new(&recommender, &config());
        let lines = render_lines(&app, 120, 30);
        assert!(lines.iter().any(|l| l.contains("Select a song and press Enter")));
    }

    #[test]
    fn test_cards_laid_out_per_row() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());
        app.set_k(5);
        app.recommend("Yesterday");
        let lines = render_lines(&app, 120, 30);
        let text = lines.join("\n");

        assert!(text.contains("Recommended Songs for Yesterday"), "{}", text);
        assert!(text.contains("#1 (0.50)"));
        assert!(text.contains("#5 (0.17)"));

        // The first three cards share a line, the next two start a new band
        let band = lines.iter().position(|l| l.contains("♪ Let It Be")).unwrap();
        assert!(lines[band].contains("♪ Imagine"));
        assert!(lines[band].contains("♪ Jolene"));
        assert!(!lines[band].contains("♪ Hey Jude"));
        assert!(lines[band + CARD_ROWS].contains("♪ Hey Jude"));
        assert!(lines[band + CARD_ROWS].contains("♪ Respect"));
        assert!(text.contains("Album: Unknown"));
    }

    #[test]
    fn test_cards_that_do_not_fit_are_counted() {
        let recommender = recommender();
        let mut app = App::new(&recommender, &config());
        app.set_k(5);
        app.recommend("Yesterday");
        // Body gets 9 rows: one band of cards and a line to spare
        let lines = render_lines(&app, 120, 15);
        let text = lines.join("\n");

        assert!(text.contains("♪ Let It Be"));
        assert!(!text.contains("♪ Hey Jude"));
        assert!(text.contains("2 more"), "{}", text);
    }

    const CARD_ROWS: usize = super::CARD_HEIGHT as usize;
}
