//! # Dialog Example
//!
//! A headless dialog rendered in the terminal with a custom view:
//! - Creating a core from [`create_dialog`] and mounting it with a [`TerminalAdapter`]
//! - Reading element attributes through [`ElementProps`] inside the view
//! - Tab focus, Enter/Space activation and Escape handling done by the dialog logic
//!
//! Logs go to `dialog.log` (set `RUST_LOG=debug` for more).
//!
//! Run with: `cargo run --example dialog`

use husk::ratatui::layout::{Alignment, Constraint, Layout, Rect};
use husk::ratatui::style::{Color, Modifier, Style};
use husk::ratatui::text::{Line, Span};
use husk::ratatui::widgets::{Block, Borders, Clear, Paragraph};
use husk::ratatui::Frame;
use husk::tui::{self, ElementProps, TerminalAdapter, TerminalAdapterOptions};
use husk::widgets::dialog::{create_dialog, DialogOptions, DialogState};

fn button_style(props: &ElementProps, id: &str) -> Style {
    if props.is_focused(id) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn view(state: &DialogState, props: &ElementProps, frame: &mut Frame, area: Rect) {
    let expanded = props
        .props("trigger")
        .get("aria-expanded")
        .map(|v| v.to_string())
        .unwrap_or_default();

    let text = vec![
        Line::from(Span::styled(" Open dialog ", button_style(props, "trigger"))),
        Line::raw(""),
        Line::from(Span::styled(
            format!("aria-expanded={expanded}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::styled("tab", Style::default().fg(Color::Cyan)),
            Span::raw(" focus  "),
            Span::styled("enter", Style::default().fg(Color::Cyan)),
            Span::raw(" activate  "),
            Span::styled("esc", Style::default().fg(Color::Cyan)),
            Span::raw(" close  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" quit"),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" husk "))
            .alignment(Alignment::Center),
        area,
    );

    if !state.open {
        return;
    }

    let [_, mid, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, popup, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(44),
        Constraint::Fill(1),
    ])
    .areas(mid);

    let border = if props.is_focused("content") {
        Color::Yellow
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Delete file? ");
    let body = vec![
        Line::raw("This action cannot be undone."),
        Line::raw(""),
        Line::from(Span::styled(" Close ", button_style(props, "close"))),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body)
            .block(block)
            .alignment(Alignment::Center),
        popup,
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    husk::init_tracing_to_file("dialog.log")?;

    let core = create_dialog().create(&DialogOptions {
        id: "delete".into(),
        ..Default::default()
    });
    let adapter = TerminalAdapter::with_options(TerminalAdapterOptions {
        focus_order: Some(vec!["trigger".into(), "content".into(), "close".into()]),
        title: Some("husk dialog".into()),
        ..Default::default()
    })
    .view(view);

    tui::run_core(&core, &adapter).await?;
    Ok(())
}
