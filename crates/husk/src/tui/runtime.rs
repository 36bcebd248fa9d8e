use super::adapter::{TerminalAdapter, TerminalAdapterOptions, TerminalComponent};
use super::event::TerminalEvent;
use crossterm::{
    cursor,
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture, EventStream,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use futures::StreamExt;
use husk_core::{ComponentCore, CoreError, InputEvent, Merge};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout, Stdout};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Errors from driving a component in a real terminal.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Connect `core` to `adapter` and run it until the user quits.
///
/// The core is destroyed when this returns, whether or not the loop failed.
pub async fn run_core<S, E>(
    core: &ComponentCore<S, E>,
    adapter: &TerminalAdapter<S>,
) -> Result<(), TerminalError>
where
    S: Merge + 'static,
    E: From<InputEvent> + 'static,
{
    let mut component = core.connect(adapter)?;
    run(&mut component).await
}

/// Drive a mounted component: read terminal input, redraw when dirty.
///
/// Takes over the terminal (raw mode, alternate screen per the component's
/// [`TerminalAdapterOptions`]) for the duration of the loop and restores it
/// before returning.  The component is unmounted on exit, so its core is
/// destroyed.
///
/// # Example
///
/// ```rust,ignore
/// let core = husk::widgets::create_dialog().create(&Default::default());
/// let mut component = core.connect(&husk::tui::TerminalAdapter::new())?;
/// husk::tui::run(&mut component).await?;
/// ```
pub async fn run<S, E>(component: &mut TerminalComponent<S, E>) -> Result<(), TerminalError>
where
    S: Merge + 'static,
    E: From<InputEvent> + 'static,
{
    let options = component.options().clone();
    let mut terminal = init_terminal(&options)?;
    tracing::info!(component = component.core().name(), "terminal session started");

    let result = event_loop(&mut terminal, component, &options).await;

    let restored = restore_terminal(&options);
    component.unmount();
    tracing::info!(component = component.core().name(), "terminal session ended");
    result?;
    restored?;
    Ok(())
}

async fn event_loop<S, E>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    component: &mut TerminalComponent<S, E>,
    options: &TerminalAdapterOptions,
) -> Result<(), TerminalError>
where
    S: Merge + 'static,
    E: From<InputEvent> + 'static,
{
    terminal.draw(|frame| component.render(frame))?;

    let fps = options.fps.clamp(1, 120);
    let mut frame_interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut events = EventStream::new();
    let handle_signals = options.exit_on_ctrl_c;

    loop {
        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c(), if handle_signals => {
                tracing::debug!("received ctrl+c signal");
                return Ok(());
            }

            event = events.next() => {
                match event {
                    Some(Ok(event)) => {
                        component.handle_event(&TerminalEvent::from(event));
                        if component.should_quit() {
                            return Ok(());
                        }
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => {
                        tracing::debug!("terminal event stream closed");
                        return Ok(());
                    }
                }
            }

            _ = frame_interval.tick() => {
                if component.needs_redraw() {
                    terminal.draw(|frame| component.render(frame))?;
                }
            }
        }
    }
}

fn init_terminal(
    options: &TerminalAdapterOptions,
) -> Result<Terminal<CrosstermBackend<Stdout>>, TerminalError> {
    // Restore the terminal before the default hook prints, installed once.
    {
        use std::sync::Once;
        static HOOK_INSTALLED: Once = Once::new();
        let alt_screen = options.alt_screen;
        HOOK_INSTALLED.call_once(|| {
            let original_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = restore_terminal_minimal(alt_screen);
                original_hook(info);
            }));
        });
    }

    enable_raw_mode()?;
    let mut writer = stdout();

    if options.alt_screen {
        execute!(writer, EnterAlternateScreen)?;
    }
    execute!(writer, EnableBracketedPaste, EnableFocusChange)?;
    if options.mouse {
        execute!(writer, EnableMouseCapture)?;
    }
    if let Some(ref title) = options.title {
        execute!(writer, SetTitle(title))?;
    }
    execute!(writer, cursor::Hide)?;

    let terminal = Terminal::new(CrosstermBackend::new(writer))?;
    Ok(terminal)
}

fn restore_terminal(options: &TerminalAdapterOptions) -> Result<(), TerminalError> {
    restore_terminal_minimal(options.alt_screen)?;
    Ok(())
}

fn restore_terminal_minimal(alt_screen: bool) -> Result<(), io::Error> {
    // Best effort: keep going so as much state as possible is restored.
    let raw = disable_raw_mode();
    let mut writer = stdout();
    execute!(writer, DisableBracketedPaste).ok();
    execute!(writer, DisableMouseCapture).ok();
    execute!(writer, DisableFocusChange).ok();
    execute!(writer, cursor::Show).ok();
    if alt_screen {
        execute!(writer, LeaveAlternateScreen).ok();
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: TerminalError = CoreError::Destroyed {
            component: "Dialog".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "component `Dialog` was used after being destroyed"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: TerminalError = io::Error::other("boom").into();
        assert!(matches!(err, TerminalError::Io(_)));
        assert_eq!(err.to_string(), "terminal I/O error: boom");
    }
}
