use super::app_logic::TuiApp;
use crate::dialog::{Focus, SettingsDialog};
use crate::i18n::{HF_TOKENS_URL, Language, Translations};
use crate::tokens::StatsSource;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const ACCENT: Color = Color::Magenta;
const TOKEN_PLACEHOLDER: &str = "hf_...,hf_...";
const DIALOG_WIDTH: u16 = 64;

fn cell_width(span: &Span) -> u16 {
    u16::try_from(span.width()).unwrap_or(u16::MAX)
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn button_style(focused: bool, primary: bool) -> Style {
    let base = if primary {
        Style::default().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    if focused {
        base.add_modifier(Modifier::REVERSED)
    } else {
        base
    }
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

fn draw_shell_help_block(f: &mut Frame, t: &Translations, area: Rect) {
    let help_paragraph = Paragraph::new(Line::from(t.shell_hint))
        .block(Block::default().borders(Borders::ALL).title(t.shell_title));
    f.render_widget(help_paragraph, area);
}

fn draw_shell_summary_block<S, P>(f: &mut Frame, app: &TuiApp<S, P>, t: &Translations, area: Rect) {
    let stats = app.saved_stats;
    let mut lines = vec![
        Line::from(format!("{}: {}", t.current_language, app.shell.lang)),
        Line::from(vec![
            Span::raw(format!("{}: {}  ", t.saved_tokens, stats.total)),
            Span::styled(
                format!("{}: {}  ", t.token_active, stats.active),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("{}: {}", t.token_exhausted, stats.exhausted),
                Style::default().fg(Color::Red),
            ),
        ]),
    ];
    if let Some(status) = &app.shell.status {
        lines.push(Line::default());
        lines.push(Line::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }
    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(t.settings))
        .wrap(Wrap { trim: false });
    f.render_widget(summary, area);
}

fn draw_language_row(f: &mut Frame, current: Language, t: &Translations, focused: bool, area: Rect) {
    let mut spans = Vec::new();
    for lang in Language::ALL {
        let style = if lang == current {
            Style::default().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", lang.display_name()), style));
        spans.push(Span::raw("  "));
    }
    let row = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(t.language),
    );
    f.render_widget(row, area);
}

/// Splits the rendered field at the selection so it can be highlighted.
fn token_line<P: StatsSource>(dialog: &SettingsDialog<P>) -> Line<'static> {
    if dialog.token().is_empty() {
        return Line::styled(TOKEN_PLACEHOLDER, Style::default().fg(Color::DarkGray));
    }
    let shown: Vec<char> = dialog.display_value().chars().collect();
    let (start, end) = match dialog.selection() {
        Some(sel) if !sel.is_collapsed() => dialog.selection_bounds(),
        _ => (shown.len(), shown.len()),
    };
    let before: String = shown[..start].iter().collect();
    let selected: String = shown[start..end].iter().collect();
    let after: String = shown[end..].iter().collect();
    Line::from(vec![
        Span::raw(before),
        Span::styled(selected, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ])
}

fn draw_token_row<P: StatsSource>(
    f: &mut Frame,
    dialog: &SettingsDialog<P>,
    t: &Translations,
    area: Rect,
) {
    let reveal_label = if dialog.show_token() { t.hide_token } else { t.show_token };
    let reveal_width = cell_width(&Span::raw(reveal_label)).saturating_add(4);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(reveal_width)])
        .split(area);

    let field_focused = dialog.focus() == Focus::Token;
    let field_width = chunks[0].width.saturating_sub(2);
    let shown: String = dialog.display_value().chars().take(dialog.caret()).collect();
    let caret_col = cell_width(&Span::raw(shown));
    // Keep the caret inside the visible part of the field.
    let scroll = caret_col.saturating_sub(field_width.saturating_sub(1));

    let field = Paragraph::new(token_line(dialog)).scroll((0, scroll)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(field_focused))
            .title(t.hf_token),
    );
    f.render_widget(field, chunks[0]);

    let reveal = Paragraph::new(Line::styled(
        reveal_label,
        button_style(dialog.focus() == Focus::Reveal, false),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(dialog.focus() == Focus::Reveal)),
    );
    f.render_widget(reveal, chunks[1]);

    if field_focused {
        f.set_cursor_position((chunks[0].x + 1 + caret_col - scroll, chunks[0].y + 1));
    }
}

fn draw_stats_row<P: StatsSource>(
    f: &mut Frame,
    dialog: &SettingsDialog<P>,
    t: &Translations,
    area: Rect,
) {
    let stats = dialog.stats();
    let cells = [
        (t.token_total, stats.total, Color::White),
        (t.token_active, stats.active, Color::Green),
        (t.token_exhausted, stats.exhausted, Color::Red),
    ];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);
    for ((label, count, color), chunk) in cells.into_iter().zip(chunks.iter()) {
        let cell = Paragraph::new(Line::styled(
            count.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(label.to_uppercase()),
        );
        f.render_widget(cell, *chunk);
    }
}

fn draw_token_help(f: &mut Frame, t: &Translations, area: Rect) {
    let link_style = Style::default().fg(ACCENT).add_modifier(Modifier::UNDERLINED);
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(t.hf_token_help, Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(t.hf_token_link, link_style),
            Span::raw(" "),
            Span::styled(t.hf_token_help_end, Style::default().fg(Color::Gray)),
        ]),
        Line::styled(HF_TOKENS_URL, Style::default().fg(Color::DarkGray)),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(help, area);
}

fn draw_buttons(f: &mut Frame, focus: Focus, t: &Translations, area: Rect) {
    let buttons = Line::from(vec![
        Span::styled(format!(" {} ", t.cancel), button_style(focus == Focus::Cancel, false)),
        Span::raw("  "),
        Span::styled(format!(" {} ", t.save), button_style(focus == Focus::Save, true)),
    ]);
    f.render_widget(Paragraph::new(buttons).alignment(Alignment::Right), area);
}

/// Draws the settings dialog over `area`. Draws nothing while closed.
pub(super) fn draw_settings_dialog<P: StatsSource>(
    f: &mut Frame,
    dialog: &SettingsDialog<P>,
    is_open: bool,
    lang: Language,
    area: Rect,
) {
    if !is_open {
        return;
    }
    let t = lang.translations();
    let stats_height = if dialog.stats_visible() { 3 } else { 0 };
    let help_height = 4;
    let height = 2 + 3 + 3 + stats_height + help_height + 1 + 1;
    let dialog_area = centered_rect(DIALOG_WIDTH, height, area);

    f.render_widget(Clear, dialog_area);
    let frame_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(t.settings, Style::default().add_modifier(Modifier::BOLD)));
    let inner = frame_block.inner(dialog_area);
    f.render_widget(frame_block, dialog_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(stats_height),
            Constraint::Min(help_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    draw_language_row(f, lang, t, dialog.focus() == Focus::Language, rows[0]);
    draw_token_row(f, dialog, t, rows[1]);
    if dialog.stats_visible() {
        draw_stats_row(f, dialog, t, rows[2]);
    }
    draw_token_help(f, t, rows[3]);
    draw_buttons(f, dialog.focus(), t, rows[4]);
    f.render_widget(
        Paragraph::new(Line::styled(t.dialog_hint, Style::default().fg(Color::DarkGray))),
        rows[5],
    );
}

pub(super) fn ui_frame<S, P: StatsSource>(frame: &mut Frame, app: &TuiApp<S, P>) {
    let t = app.shell.lang.translations();
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(frame.area());

    draw_shell_help_block(frame, t, main_chunks[0]);
    draw_shell_summary_block(frame, app, t, main_chunks[1]);

    draw_settings_dialog(
        frame,
        &app.dialog,
        app.shell.settings_open,
        app.shell.lang,
        frame.area(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HF_TOKEN_KEY, KeyValueStore, MemoryStore};
    use crate::tokens::TokenPool;
    use ratatui::backend::TestBackend;

    fn render(app: &TuiApp<MemoryStore, TokenPool>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| ui_frame(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app(token: &str, open: bool) -> TuiApp<MemoryStore, TokenPool> {
        let mut store = MemoryStore::new();
        store.set(HF_TOKEN_KEY, token).unwrap();
        TuiApp::new(store, SettingsDialog::new(TokenPool::new(["hf_b"])), Language::En, open)
    }

    #[test]
    fn closed_dialog_draws_only_the_shell() {
        let screen = render(&app("hf_a,hf_b", false));
        assert!(screen.contains("HF Settings"));
        assert!(!screen.contains("Hugging Face Token"));
        assert!(!screen.contains("Cancel"));
    }

    #[test]
    fn open_dialog_hides_token_by_default() {
        let screen = render(&app("hf_secret", true));
        assert!(screen.contains("Hugging Face Token"));
        assert!(screen.contains("•••••••••"));
        assert!(!screen.contains("hf_secret"));
        assert!(screen.contains("Show"));
    }

    #[test]
    fn revealed_token_is_drawn_in_plain_text() {
        let mut app = app("hf_secret", true);
        app.dialog.toggle_reveal();
        let screen = render(&app);
        assert!(screen.contains("hf_secret"));
        assert!(screen.contains("Hide"));
    }

    #[test]
    fn stats_block_needs_more_than_one_token() {
        let single = render(&app("hf_a", true));
        assert!(!single.contains("EXHAUSTED"));

        let multiple = render(&app("hf_a,hf_b,hf_c", true));
        assert!(multiple.contains("TOTAL"));
        assert!(multiple.contains("ACTIVE"));
        assert!(multiple.contains("EXHAUSTED"));
    }

    #[test]
    fn empty_field_shows_placeholder() {
        let screen = render(&app("", true));
        assert!(screen.contains(TOKEN_PLACEHOLDER));
    }

    #[test]
    fn labels_follow_the_selected_language() {
        let mut app = app("hf_a", true);
        app.shell.lang = Language::Zh;
        let screen = render(&app);
        // Wide glyphs are followed by a blank cell in the buffer.
        assert!(screen.contains("取") && screen.contains("消"));
        assert!(!screen.contains("Cancel"));
    }

    #[test]
    fn caret_stays_in_field_for_huge_values() {
        let mut app = app("", true);
        app.dialog.toggle_reveal();
        app.dialog.set_token("x".repeat(70_000));
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| ui_frame(frame, &app)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        let dialog_left = (80 - DIALOG_WIDTH) / 2;
        assert!(cursor.x > dialog_left && cursor.x < dialog_left + DIALOG_WIDTH);
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = app("hf_a,hf_b", true);
        let mut terminal = Terminal::new(TestBackend::new(12, 5)).unwrap();
        terminal.draw(|frame| ui_frame(frame, &app)).unwrap();
    }
}
