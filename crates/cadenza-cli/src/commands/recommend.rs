use anyhow::Result;
use cadenza_etl::{load_recommender, Config};
use cadenza_search::Recommendation;
use ratatui::text::Span;

/// Width of one result card, borders included.
const CARD_WIDTH: usize = 32;

pub fn run_recommend(config: &Config, title: &str, count: Option<usize>, json: bool) -> Result<()> {
    let limits = config.recommendations;
    let k = count.unwrap_or(limits.default);
    if !limits.contains(k) {
        anyhow::bail!(
            "Number of recommendations must be between {} and {} (got {})",
            limits.min,
            limits.max,
            k
        );
    }

    let recommender = load_recommender(config)?;

    match recommender.recommend(title, k) {
        Ok(recs) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&recs)?);
            } else {
                println!("\n✨ Recommended Songs for {}\n", title);
                print!("{}", render_cards(&recs, config.cards_per_row, CARD_WIDTH));
            }
            Ok(())
        }
        Err(e) if e.is_unknown_song() => {
            eprintln!("✗ Song not found: {}", title);
            let suggestions: Vec<_> = recommender.catalog().search(title).take(5).collect();
            if !suggestions.is_empty() {
                eprintln!("\n  Did you mean:");
                for song in suggestions {
                    eprintln!("    {}", song.title);
                }
            }
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Lay recommendations out as boxed cards, `per_row` to a band.
pub fn render_cards(recs: &[Recommendation<'_>], per_row: usize, width: usize) -> String {
    let inner = width.saturating_sub(4);
    let mut out = String::new();

    for band in recs.chunks(per_row.max(1)) {
        let cards: Vec<Vec<String>> = band
            .iter()
            .map(|rec| {
                let lines = [
                    format!("#{} ({:.2})", rec.rank, rec.score),
                    format!("♪ {}", rec.song.title),
                    format!("Artist: {}", rec.song.artist),
                    format!("Album: {}", rec.song.album),
                ];
                let mut card = vec![format!("┌{}┐", "─".repeat(width.saturating_sub(2)))];
                card.extend(lines.iter().map(|l| format!("│ {} │", fit(l, inner))));
                card.push(format!("└{}┘", "─".repeat(width.saturating_sub(2))));
                card
            })
            .collect();

        let height = cards.first().map_or(0, Vec::len);
        for line in 0..height {
            let row: Vec<&str> = cards.iter().map(|c| c[line].as_str()).collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
    }

    out
}

/// Truncate with an ellipsis or pad with spaces to exactly `width` terminal
/// columns. Wide characters count as two.
fn fit(text: &str, width: usize) -> String {
    let text_width = display_width(text);
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let mut cut = String::new();
    let mut used = 0;
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let w = display_width(c.encode_utf8(&mut buf));
        if used + w + 1 > width {
            break;
        }
        cut.push(c);
        used += w;
    }
    cut.push('…');
    used += 1;
    cut.push_str(&" ".repeat(width.saturating_sub(used)));
    cut
}

fn display_width(text: &str) -> usize {
    Span::raw(text).width()
}
