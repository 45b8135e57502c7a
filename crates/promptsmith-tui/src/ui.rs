use promptsmith_core::{ChatRole, ConnectionStatus, GenerationMode, PromptResult, ResultView};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, InputMode, Screen};

const PLACEHOLDER: &str = "Example: I need an AI assistant that can help customers with product \
recommendations and support inquiries for my online fashion store...";

const USAGE_STEPS: [&str; 4] = [
    "Copy the prompt above or save it as a text file.",
    "Paste it into your preferred LLM interface (ChatGPT, Claude, etc.).",
    "The LLM will now respond according to your business requirements.",
    "You can modify parts of the prompt to further refine the AI's responses.",
];

/// Style **bold** runs and `#` headings in service replies.
fn styled_line(text: &str) -> Line<'static> {
    if let Some(heading) = text.strip_prefix("## ").or_else(|| text.strip_prefix("# ")) {
        return Line::from(Span::styled(
            heading.to_string(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ));
    }

    let parts: Vec<&str> = text.split("**").collect();
    // An even part count means an unpaired "**"; leave the line alone.
    if parts.len() < 3 || parts.len() % 2 == 0 {
        return Line::from(text.to_string());
    }

    let spans: Vec<Span<'static>> = parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(part.to_string())
            }
        })
        .collect();
    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.screen == Screen::Result {
        match app.result_view() {
            ResultView::Ready(result) => render_result_screen(app, &result, frame, body_area),
            ResultView::Loading => render_loading_screen(app, frame, body_area),
            ResultView::Redirect => {
                app.back_to_compose();
                render_compose_screen(app, frame, body_area);
            }
        }
    } else {
        render_compose_screen(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" promptsmith ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}] ", app.mode().as_str()),
            Style::default().fg(Color::White),
        ),
    ];

    if app.mode() == GenerationMode::Remote {
        let status = app.conversation.connection();
        let status_color = match status {
            ConnectionStatus::Connected => Color::Green,
            ConnectionStatus::Disconnected => Color::Red,
            ConnectionStatus::Unknown => Color::Gray,
        };
        spans.push(Span::styled(
            format!("{} ", app.service_url),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!("● {} ", status.label()),
            Style::default().fg(status_color),
        ));
    }

    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Compose => " CREATE ",
        Screen::Result => " RESULT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.screen, app.input_mode) {
        (Screen::Compose, InputMode::Editing) => {
            hints.extend(hint("Enter", "send"));
            hints.extend(hint("Tab", "result"));
            hints.extend(hint("Esc", if app.conversation.error().is_some() { "dismiss" } else { "stop typing" }));
        }
        (Screen::Compose, InputMode::Normal) => {
            hints.extend(hint("i", "type"));
            hints.extend(hint("j/k", "scroll"));
            hints.extend(hint("Tab", "result"));
            hints.extend(hint("n", "new chat"));
            hints.extend(hint("q", "quit"));
        }
        (Screen::Result, _) => {
            hints.extend(hint("c", "copy"));
            hints.extend(hint("s", "save"));
            hints.extend(hint("j/k", "scroll"));
            hints.extend(hint("n", "create another"));
            hints.extend(hint("Esc", "back"));
            hints.extend(hint("q", "quit"));
        }
    }
    hints.extend(hint("^N", "new chat"));

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    spans.extend(hints);
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!("  {}", notice), Style::default().fg(Color::Green)));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_compose_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let banner_height = if app.conversation.error().is_some() { 3 } else { 0 };
    let [banner_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    if let Some(error) = app.conversation.error() {
        let banner = Paragraph::new(error.to_string())
            .style(Style::default().fg(Color::Red))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) "),
            );
        frame.render_widget(banner, banner_area);
    }

    // Inner size minus borders, for scroll calculations
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_title = match app.mode() {
        GenerationMode::Local => " Create Professional AI Prompts ".to_string(),
        GenerationMode::Remote => " Prompt Conversation ".to_string(),
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(chat_title);

    let awaiting = app.conversation.is_awaiting();
    let messages = app.conversation.messages();

    let chat_text = if messages.is_empty() && !awaiting {
        Text::from(vec![
            Line::from(Span::styled(
                "Describe your business need, and we'll craft the perfect prompt for you.",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))),
        ])
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(msg.text.lines().map(|l| Line::from(l.to_string())));
                }
                ChatRole::Bot => {
                    lines.push(Line::from(Span::styled(
                        "Promptsmith:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(msg.text.lines().map(styled_line));
                }
            }
            lines.push(Line::default());
        }

        if awaiting {
            lines.push(Line::from(Span::styled(
                "Promptsmith:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.conversation.is_awaiting() {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let title = if app.conversation.is_awaiting() {
        " Waiting for a reply... "
    } else {
        " Describe your business (Enter to generate) "
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.conversation.cursor();
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .conversation
        .input()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_loading_screen(app: &App, frame: &mut Frame, area: Rect) {
    let dots = ".".repeat((app.animation_frame as usize) + 1);
    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            format!("Generating Your Prompt{}", dots),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Please wait while we craft the perfect prompt for your business needs."),
    ])
    .centered();

    let loading = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, area);
}

fn render_result_screen(app: &App, result: &PromptResult, frame: &mut Frame, area: Rect) {
    let [title_area, prompt_area, usage_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(USAGE_STEPS.len() as u16 + 2),
    ])
    .areas(area);

    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            result.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(result.description.clone(), Style::default().fg(Color::Gray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Your Generated Prompt "),
    );
    frame.render_widget(heading, title_area);

    let copy_label = if app.copied_recently() {
        Span::styled(" Copied! ", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled(" c: Copy  s: Save ", Style::default().fg(Color::Gray))
    };
    let prompt_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" PROMPT ")
        .title(Line::from(copy_label).right_aligned());

    // Verbatim: no trimming so indentation and blank lines survive
    let prompt = Paragraph::new(Text::raw(result.prompt.as_str()))
        .block(prompt_block)
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));
    frame.render_widget(prompt, prompt_area);

    let steps: Vec<Line> = USAGE_STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| Line::from(format!("{}. {}", i + 1, step)))
        .collect();
    let usage = Paragraph::new(steps)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" How to Use This Prompt "));
    frame.render_widget(usage, usage_area);
}
