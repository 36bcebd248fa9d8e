//! # Stepper Example
//!
//! A linear three-step flow driven from the terminal:
//! - Arrow keys on the focused step list move between steps
//! - `Back` and `Next` buttons activated with Enter or Space
//! - Steps not reachable yet are dimmed using their `aria-disabled` attribute
//!
//! Run with: `cargo run --example stepper`

use husk::ratatui::layout::{Constraint, Layout, Rect};
use husk::ratatui::style::{Color, Modifier, Style};
use husk::ratatui::text::{Line, Span};
use husk::ratatui::widgets::{Block, Borders, Paragraph};
use husk::ratatui::Frame;
use husk::tui::{self, ElementProps, TerminalAdapter, TerminalAdapterOptions};
use husk::widgets::stepper::{create_stepper, Step, StepperOptions, StepperState};
use husk::AttrValue;

fn view(state: &StepperState, props: &ElementProps, frame: &mut Frame, area: Rect) {
    let [list, buttons] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);

    let lines: Vec<Line> = state
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let attrs = props.props(&format!("step-{i}"));
            let disabled = attrs.get("aria-disabled") == Some(&AttrValue::Bool(true));
            let marker = match attrs.get("data-state").and_then(AttrValue::as_str) {
                Some("completed") => "✓",
                Some("current") => "●",
                _ => "○",
            };
            let style = if i == state.current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!(" {marker} {}", step.label), style),
                Span::styled(
                    step.description
                        .as_deref()
                        .map(|d| format!("  {d}"))
                        .unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let title = props
        .props("steps")
        .get("aria-label")
        .map(|v| format!(" {v} "))
        .unwrap_or_default();
    let list_border = if props.is_focused("steps") {
        Color::Yellow
    } else {
        Color::Cyan
    };
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(list_border))
                .title(title),
        ),
        list,
    );

    let button = |id: &str, label: &str| {
        let style = if props.is_focused(id) {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Span::styled(format!(" {label} "), style)
    };
    let status = if state.is_finished() {
        "all steps complete"
    } else {
        "tab focus  enter activate  q quit"
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            button("previous", "Back"),
            Span::raw("  "),
            button("next", "Next"),
            Span::styled(format!("   {status}"), Style::default().fg(Color::DarkGray)),
        ]))
        .block(Block::default().borders(Borders::TOP)),
        buttons,
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    husk::init_tracing_to_file("stepper.log")?;

    let core = create_stepper().create(&StepperOptions {
        steps: vec![
            Step::new("Account").description("Choose a username"),
            Step::new("Profile").description("Tell us about yourself").optional(),
            Step::new("Confirm"),
        ],
        linear: true,
        ..Default::default()
    });

    let adapter = TerminalAdapter::with_options(TerminalAdapterOptions {
        focus_order: Some(vec!["steps".into(), "previous".into(), "next".into()]),
        initial_focus: Some("next".into()),
        ..Default::default()
    })
    .view(view);

    tui::run_core(&core, &adapter).await?;
    Ok(())
}
