use crate::merger::TriState;
use crate::ui::app::App;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table},
    Frame,
};

// Brand colors
const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68); // copied
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C); // partial
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65); // footer

// Styles
const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);

pub fn draw_picker(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);

    let main = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    draw_tree(frame, main[0], app);
    draw_preview(frame, main[1], app);

    draw_footer(
        frame,
        chunks[2],
        " ↑↓ Move | Space Toggle | a All | Enter Apply | q Cancel ",
    );
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " Copy {} → {} | {} floors | {} zones | {} selected ",
        app.origin_version,
        app.target_version,
        app.origin.floors.len(),
        app.origin.total_zones(),
        app.selection.len()
    );

    let header = Paragraph::new(title)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn checkbox(state: TriState) -> Span<'static> {
    match state {
        TriState::Checked => Span::styled("[x] ", Style::default().fg(BRAND_GREEN)),
        TriState::Indeterminate => Span::styled("[-] ", Style::default().fg(BRAND_ORANGE)),
        TriState::Unchecked => Span::raw("[ ] "),
    }
}

fn draw_tree(frame: &mut Frame, area: Rect, app: &App) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let scroll_offset = if app.selected_row >= visible_rows {
        app.selected_row - visible_rows + 1
    } else {
        0
    };

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, row)| {
            let style = if i == app.selected_row {
                SELECTED_STYLE
            } else {
                Style::default()
            };
            let indent = "  ".repeat(usize::from(row.depth));

            ListItem::new(Line::from(vec![
                Span::raw(indent),
                checkbox(app.row_state(row)),
                Span::styled(row.label.as_str(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" {} ", app.origin_version))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BRAND_ORANGE)),
    );
    frame.render_widget(list, area);

    if app.rows.len() > visible_rows {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(app.rows.len()).position(app.selected_row);

        let scrollbar_area = Rect {
            x: area.x + area.width - 1,
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

fn draw_preview(frame: &mut Frame, area: Rect, app: &App) {
    let merged = app.preview();

    let header = Row::new(vec!["Floor", "Zones", "Copied"])
        .style(HEADER_STYLE)
        .height(1);

    let rows: Vec<Row> = merged
        .floors
        .iter()
        .map(|floor| {
            let copied = floor
                .zones
                .iter()
                .filter(|z| z.is_copied == Some(true))
                .count();
            let style = if copied > 0 {
                Style::default().fg(BRAND_GREEN)
            } else {
                Style::default()
            };
            Row::new(vec![
                format!("{} ({})", floor.floor_name, floor.floor_number),
                floor.zones.len().to_string(),
                copied.to_string(),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(60),
        Constraint::Percentage(20),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" {} after copy ", app.target_version))
            .borders(Borders::ALL),
    );

    frame.render_widget(table, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
