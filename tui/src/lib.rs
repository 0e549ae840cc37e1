//! TUI rendering for the excuse wizard using ratatui.

mod clipboard;
mod input;
mod theme;

pub use clipboard::SystemClipboard;
pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use excuse_engine::{
    App, CopyLabel, GenerationStatus, Presentation, Step, TextGenerator, sanitize_terminal_text,
    step_options, ui::InputMode,
};

const HEADER_TITLE: &str = "Need an excuse?";
const HEADER_SUBTITLE: &str = "Pick what happened, who it is for and how it should sound.";
const LOCKOUT_LINES: [&str; 3] = [
    "Closed for today.",
    "AI credit limit exceeded.",
    "Please come back tomorrow.",
];
const DETAIL_PLACEHOLDER: &str = "e.g. the train was cancelled";

/// Main draw function
pub fn draw<G: TextGenerator>(frame: &mut Frame, app: &App<G>) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let view = app.presentation(Instant::now());

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(1),    // Steps + result
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], &palette);
    draw_body(frame, app, &view, chunks[1], &palette, &glyphs);
    draw_status_bar(frame, app, chunks[2], &palette, &glyphs);

    if view.lockout_visible {
        draw_lockout(frame, &palette);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, palette: &Palette) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(HEADER_TITLE, styles::title(palette))),
        Line::from(Span::styled(
            HEADER_SUBTITLE,
            Style::default().fg(palette.text_muted),
        )),
    ]);
    frame.render_widget(header, area);
}

fn step_height<G: TextGenerator>(app: &App<G>, step: Step) -> u16 {
    let options = step_options(step).len();
    if step != Step::Detail && app.focus() == step {
        u16::try_from(options).unwrap_or(u16::MAX).saturating_add(2)
    } else {
        3
    }
}

fn draw_body<G: TextGenerator>(
    frame: &mut Frame,
    app: &App<G>,
    view: &Presentation,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let steps: Vec<Step> = Step::ALL
        .into_iter()
        .filter(|&step| view.is_visible(step))
        .collect();

    let mut constraints: Vec<Constraint> = steps
        .iter()
        .map(|&step| Constraint::Length(step_height(app, step)))
        .collect();
    constraints.push(Constraint::Min(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (&step, &chunk) in steps.iter().zip(chunks.iter()) {
        if step == Step::Detail {
            draw_detail(frame, app, chunk, palette, glyphs);
        } else {
            draw_choice_step(frame, app, step, chunk, palette, glyphs);
        }
    }

    if let Some(&action_area) = chunks.last() {
        draw_action_area(frame, app, view, action_area, palette, glyphs);
    }
}

fn step_block<'a, G: TextGenerator>(
    app: &App<G>,
    step: Step,
    answered: bool,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Block<'a> {
    let focused = app.focus() == step;
    let border_style = if focused {
        Style::default().fg(palette.primary)
    } else {
        Style::default().fg(palette.bg_border)
    };
    let marker = if answered { glyphs.done } else { " " };
    let title_style = if focused {
        styles::title(palette)
    } else {
        Style::default().fg(palette.text_secondary)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(Style::default().bg(palette.bg_panel))
        .title(Line::from(vec![
            Span::styled(format!(" {marker} "), Style::default().fg(palette.success)),
            Span::styled(format!("{}. {} ", step.number(), step.title()), title_style),
        ]))
        .padding(Padding::horizontal(1))
}

fn draw_choice_step<G: TextGenerator>(
    frame: &mut Frame,
    app: &App<G>,
    step: Step,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let labels = step_options(step);
    let selected = app.selected_index(step);
    let block = step_block(app, step, selected.is_some(), palette, glyphs);

    let lines: Vec<Line> = if app.focus() == step {
        let cursor = app.cursor(step).unwrap_or_default();
        labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let is_cursor = index == cursor;
                let pointer = if is_cursor { glyphs.pointer } else { " " };
                let radio = if selected == Some(index) {
                    glyphs.radio_on
                } else {
                    glyphs.radio_off
                };
                let style = if is_cursor {
                    Style::default()
                        .fg(palette.text_primary)
                        .bg(palette.bg_highlight)
                        .add_modifier(Modifier::BOLD)
                } else if selected == Some(index) {
                    Style::default().fg(palette.accent)
                } else {
                    Style::default().fg(palette.text_secondary)
                };
                Line::from(Span::styled(format!("{pointer} {radio} {label}"), style))
            })
            .collect()
    } else {
        match selected.and_then(|index| labels.get(index)) {
            Some(label) => vec![Line::from(Span::styled(
                (*label).to_string(),
                Style::default().fg(palette.accent),
            ))],
            None => vec![Line::from(Span::styled(
                "Not answered yet",
                Style::default().fg(palette.text_muted),
            ))],
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_detail<G: TextGenerator>(
    frame: &mut Frame,
    app: &App<G>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let draft = app.detail_draft();
    let editing = app.input_mode() == InputMode::EditDetail;
    let block = step_block(app, Step::Detail, !draft.text().trim().is_empty(), palette, glyphs);

    let text = sanitize_terminal_text(draft.text());
    let line = if text.is_empty() && !editing {
        Line::from(Span::styled(
            DETAIL_PLACEHOLDER,
            Style::default().fg(palette.text_muted),
        ))
    } else {
        Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(palette.text_primary),
        ))
    };

    // Keep the cursor in view by scrolling the single line horizontally.
    let inner_width = area.width.saturating_sub(4);
    // Measured on the sanitized prefix so the column matches what is drawn.
    let before_cursor =
        sanitize_terminal_text(draft.text().get(..draft.byte_index()).unwrap_or_default());
    let cursor_offset = u16::try_from(before_cursor.width()).unwrap_or(u16::MAX);
    let scroll = cursor_offset.saturating_sub(inner_width.saturating_sub(1));

    frame.render_widget(
        Paragraph::new(line).block(block).scroll((0, scroll)),
        area,
    );

    if editing {
        let cursor_x = area
            .x
            .saturating_add(2)
            .saturating_add(cursor_offset.saturating_sub(scroll));
        let cursor_y = area.y.saturating_add(1);
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn draw_action_area<G: TextGenerator>(
    frame: &mut Frame,
    app: &App<G>,
    view: &Presentation,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    if view.loading_visible {
        let spinner = spinner_frame(app.tick_count(), app.ui_options());
        let loading = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {spinner} "), Style::default().fg(palette.primary)),
            Span::styled(
                "Writing your excuse...",
                Style::default().fg(palette.text_secondary),
            ),
        ]));
        frame.render_widget(loading, area);
        return;
    }

    if view.result_visible {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);
        draw_result(frame, app, view, chunks[0], palette);
        if view.generate_visible {
            frame.render_widget(generate_hint("write another", palette), chunks[1]);
        }
        return;
    }

    if view.generate_visible {
        frame.render_widget(generate_hint("generate your excuse", palette), area);
    } else if app.status() != GenerationStatus::RateLimited {
        let pending = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", glyphs.bullet),
                Style::default().fg(palette.text_muted),
            ),
            Span::styled(
                "Answer the questions above to continue.",
                Style::default().fg(palette.text_muted),
            ),
        ]));
        frame.render_widget(pending, area);
    }
}

fn generate_hint<'a>(action: &'a str, palette: &Palette) -> Paragraph<'a> {
    Paragraph::new(Line::from(vec![
        Span::styled(" Press ", styles::key_hint(palette)),
        Span::styled("g", styles::key_highlight(palette)),
        Span::styled(format!(" to {action}"), styles::key_hint(palette)),
    ]))
}

fn draw_result<G: TextGenerator>(
    frame: &mut Frame,
    app: &App<G>,
    view: &Presentation,
    area: Rect,
    palette: &Palette,
) {
    let copy_style = match view.copy_label {
        CopyLabel::Default => styles::key_hint(palette),
        CopyLabel::Confirmed => Style::default()
            .fg(palette.success)
            .add_modifier(Modifier::BOLD),
    };
    let copy_title = Line::from(vec![
        Span::styled(" [", styles::key_hint(palette)),
        Span::styled("c", styles::key_highlight(palette)),
        Span::styled("] ", styles::key_hint(palette)),
        Span::styled(view.copy_label.text(), copy_style),
        Span::raw(" "),
    ])
    .alignment(Alignment::Right);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.success))
        .style(Style::default().bg(palette.bg_panel))
        .title(Line::from(Span::styled(
            " Your excuse ",
            styles::title(palette),
        )))
        .title_bottom(copy_title)
        .padding(Padding::horizontal(1));

    let text = sanitize_terminal_text(app.result());
    let lines: Vec<Line> = text
        .lines()
        .map(|line| {
            Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(palette.text_primary),
            ))
        })
        .collect();

    let result = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(result, area);
}

fn draw_status_bar<G: TextGenerator>(
    frame: &mut Frame,
    app: &App<G>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let (mode_text, mode_style) = match app.input_mode() {
        InputMode::Browse => (" BROWSE ", styles::mode_browse(palette)),
        InputMode::EditDetail => (" EDIT ", styles::mode_edit(palette)),
    };

    let ascii = app.ui_options().ascii_only;
    let hints: Vec<(&str, &str)> = match app.input_mode() {
        InputMode::Browse => vec![
            ("tab", "next"),
            ("shift-tab", "back"),
            (if ascii { "up/down" } else { "↑↓" }, "move"),
            ("enter", "select"),
            ("g", "generate"),
            ("c", "copy"),
            ("q", "quit"),
        ],
        InputMode::EditDetail => vec![
            ("esc", "done"),
            (if ascii { "left/right" } else { "←→" }, "cursor"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (index, (key, action)) in hints.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(
                format!(" {} ", glyphs.bullet),
                styles::key_hint(palette),
            ));
        }
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Full-screen block shown once the generation quota is exhausted.
fn draw_lockout(frame: &mut Frame, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg_dark)),
        area,
    );

    let width = 44.min(area.width);
    let height = 10.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width) / 2),
        y: area.y + (area.height.saturating_sub(height) / 2),
        width,
        height,
    };

    let [headline, reason, advice] = LOCKOUT_LINES;
    let lines = vec![
        Line::from(Span::styled(
            headline,
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            reason,
            Style::default().fg(palette.text_primary),
        )),
        Line::from(Span::styled(
            advice,
            Style::default().fg(palette.text_primary),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("q", styles::key_highlight(palette)),
            Span::styled(" quit", styles::key_hint(palette)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.error))
        .style(Style::default().bg(palette.bg_popup))
        .padding(Padding::uniform(1));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        popup,
    );
}
