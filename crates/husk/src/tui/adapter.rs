use super::event::TerminalEvent;
use husk_core::{
    A11yProps, Adapter, BoxError, ComponentCore, ElementSnapshot, InputEvent, Key, Merge,
    Unsubscribe,
};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Caller-supplied renderer: `(state, element props, frame, area)`.
pub type ViewFn<S> = Rc<dyn Fn(&S, &ElementProps, &mut Frame, Rect)>;

/// Configuration for a [`TerminalAdapter`] and the run loop.
///
/// All fields have sensible defaults (see [`Default`] impl).  Use struct
/// update syntax to override only the options you need:
///
/// ```rust,ignore
/// use husk::tui::TerminalAdapterOptions;
///
/// let opts = TerminalAdapterOptions {
///     initial_focus: Some("trigger".into()),
///     mouse: true,
///     ..TerminalAdapterOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TerminalAdapterOptions {
    /// Element ids in Tab order.  `None` uses every element that has
    /// interaction handlers, in id order.
    pub focus_order: Option<Vec<String>>,
    /// Element focused on mount.  Defaults to the first in focus order.
    pub initial_focus: Option<String>,
    /// Target frames per second for the run loop (default: 30, max: 120).
    pub fps: u32,
    /// Start in the alternate screen (default: true).
    pub alt_screen: bool,
    /// Capture mouse clicks (default: false).
    pub mouse: bool,
    /// Exit the run loop on Ctrl+C (default: true).
    pub exit_on_ctrl_c: bool,
    /// Key that exits the run loop when nothing handled it.
    pub quit_key: Option<char>,
    /// Terminal window title.
    pub title: Option<String>,
}

impl Default for TerminalAdapterOptions {
    fn default() -> Self {
        Self {
            focus_order: None,
            initial_focus: None,
            fps: 30,
            alt_screen: true,
            mouse: false,
            exit_on_ctrl_c: true,
            quit_key: Some('q'),
            title: None,
        }
    }
}

/// What a [`ViewFn`] sees besides the state: every element's current
/// attributes and which element has focus.
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    elements: Vec<ElementSnapshot>,
    focused: Option<String>,
}

impl ElementProps {
    pub fn get(&self, element_id: &str) -> Option<&ElementSnapshot> {
        self.elements.iter().find(|e| e.id == element_id)
    }

    /// Attributes of `element_id`; empty if unknown.
    pub fn props(&self, element_id: &str) -> A11yProps {
        self.get(element_id)
            .map(|e| e.props.clone())
            .unwrap_or_default()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn is_focused(&self, element_id: &str) -> bool {
        self.focused.as_deref() == Some(element_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementSnapshot> {
        self.elements.iter()
    }
}

/// Adapter that renders a [`ComponentCore`] with ratatui.
///
/// Works with any payload type constructible from [`InputEvent`], including
/// `InputEvent` itself.
///
/// # Example
///
/// ```rust,ignore
/// use husk::tui::TerminalAdapter;
/// use husk::widgets::dialog::{create_dialog, DialogOptions};
///
/// let core = create_dialog().create(&DialogOptions::default());
/// let adapter = TerminalAdapter::new().view(|state, props, frame, area| {
///     // draw with ratatui ...
/// });
/// let mut component = core.connect(&adapter)?;
/// husk::tui::run(&mut component).await?;
/// ```
pub struct TerminalAdapter<S> {
    options: TerminalAdapterOptions,
    view: Option<ViewFn<S>>,
}

impl<S> TerminalAdapter<S> {
    /// An adapter with default options that renders a generic outline.
    pub fn new() -> Self {
        Self::with_options(TerminalAdapterOptions::default())
    }

    pub fn with_options(options: TerminalAdapterOptions) -> Self {
        Self {
            options,
            view: None,
        }
    }

    /// Render with `view` instead of the generic outline.
    pub fn view(mut self, view: impl Fn(&S, &ElementProps, &mut Frame, Rect) + 'static) -> Self {
        self.view = Some(Rc::new(view));
        self
    }

    pub fn options(&self) -> &TerminalAdapterOptions {
        &self.options
    }
}

impl<S> Default for TerminalAdapter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for TerminalAdapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalAdapter")
            .field("options", &self.options)
            .field("custom_view", &self.view.is_some())
            .finish()
    }
}

impl<S, E> Adapter<S, E> for TerminalAdapter<S>
where
    S: Merge + 'static,
    E: From<InputEvent> + 'static,
{
    type Output = TerminalComponent<S, E>;

    fn name(&self) -> &str {
        "terminal"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn create_component(&self, core: &ComponentCore<S, E>) -> Result<Self::Output, BoxError> {
        let focus_order = match &self.options.focus_order {
            Some(order) => order.clone(),
            None => core
                .logic()
                .element_ids()
                .into_iter()
                .filter(|id| !core.logic().get_interaction_handlers(id).is_empty())
                .collect(),
        };

        let focus = match &self.options.initial_focus {
            Some(id) => match focus_order.iter().position(|f| f == id) {
                Some(index) => Some(index),
                None => {
                    return Err(format!("initial focus `{id}` is not in the focus order").into())
                }
            },
            None => (!focus_order.is_empty()).then_some(0),
        };

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let subscription = core.state().subscribe(move |_| flag.set(true));

        tracing::debug!(
            component = core.name(),
            focusable = focus_order.len(),
            "terminal component mounted"
        );
        Ok(TerminalComponent {
            core: core.clone(),
            view: self.view.clone(),
            options: self.options.clone(),
            dirty,
            subscription: Rc::new(subscription),
            focus_order,
            focus,
            should_quit: false,
            unmounted: Cell::new(false),
        })
    }

    fn teardown(&self, component: &TerminalComponent<S, E>) -> Option<Box<dyn FnOnce()>> {
        let subscription = Rc::clone(&component.subscription);
        Some(Box::new(move || subscription.unsubscribe()))
    }
}

/// A mounted component rendered into a ratatui [`Frame`].
///
/// Redraws are driven by a dirty flag set from a store subscription, so a
/// run loop only draws when state, focus or terminal size changed.  The
/// component owns the core's lifetime: [`unmount`](Self::unmount) (or
/// dropping the component) calls [`ComponentCore::destroy`] exactly once.
pub struct TerminalComponent<S: Merge + 'static, E: 'static = InputEvent> {
    core: ComponentCore<S, E>,
    view: Option<ViewFn<S>>,
    options: TerminalAdapterOptions,
    dirty: Rc<Cell<bool>>,
    subscription: Rc<Unsubscribe>,
    focus_order: Vec<String>,
    focus: Option<usize>,
    should_quit: bool,
    unmounted: Cell<bool>,
}

impl<S, E> TerminalComponent<S, E>
where
    S: Merge + 'static,
    E: From<InputEvent> + 'static,
{
    pub fn core(&self) -> &ComponentCore<S, E> {
        &self.core
    }

    pub fn options(&self) -> &TerminalAdapterOptions {
        &self.options
    }

    /// Whether state, focus or layout changed since the last render.
    pub fn needs_redraw(&self) -> bool {
        self.dirty.get()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Ask the run loop to exit after the current event.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus
            .and_then(|i| self.focus_order.get(i))
            .map(String::as_str)
    }

    pub fn focus_order(&self) -> &[String] {
        &self.focus_order
    }

    /// Move focus to `element_id`, firing `blur` and `focus` handlers.
    ///
    /// Returns `false` if the element is not focusable.
    pub fn focus(&mut self, element_id: &str) -> bool {
        match self.focus_order.iter().position(|id| id == element_id) {
            Some(index) => {
                self.move_focus(index);
                true
            }
            None => false,
        }
    }

    pub fn focus_next(&mut self) {
        if self.focus_order.is_empty() {
            return;
        }
        let next = self.focus.map_or(0, |i| (i + 1) % self.focus_order.len());
        self.move_focus(next);
    }

    pub fn focus_prev(&mut self) {
        let len = self.focus_order.len();
        if len == 0 {
            return;
        }
        let prev = self.focus.map_or(len - 1, |i| (i + len - 1) % len);
        self.move_focus(prev);
    }

    /// Route a terminal event to the focused element.
    ///
    /// Tab and Shift+Tab move focus.  Other key presses are delivered as
    /// `keydown`; Enter and Space additionally activate the element with
    /// `click` when it has a click handler.  A left click, paste and
    /// terminal focus changes go to the focused element as `click`,
    /// `change`, `focus` and `blur`.  Returns whether any handler ran.
    pub fn handle_event(&mut self, event: &TerminalEvent) -> bool {
        if let TerminalEvent::Resize(..) = event {
            self.dirty.set(true);
            return false;
        }
        let Some(input) = event.to_input() else {
            return false;
        };

        if let InputEvent::KeyDown { key, modifiers } = &input {
            if modifiers.ctrl && *key == Key::Char('c') && self.options.exit_on_ctrl_c {
                self.should_quit = true;
                return false;
            }
            match key {
                Key::Tab if !modifiers.any() => {
                    self.focus_next();
                    return true;
                }
                Key::BackTab => {
                    self.focus_prev();
                    return true;
                }
                Key::Tab if modifiers.shift => {
                    self.focus_prev();
                    return true;
                }
                _ => {}
            }
        }

        let handled = self.deliver(&input);
        if !handled {
            if let Some(quit) = self.options.quit_key {
                if input.is_key(&Key::Char(quit)) {
                    self.should_quit = true;
                }
            }
        }
        handled
    }

    /// Render into the whole frame.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        self.render_area(frame, area);
    }

    /// Render into `area` and clear the dirty flag.
    pub fn render_area(&self, frame: &mut Frame, area: Rect) {
        let props = ElementProps {
            elements: self.core.snapshot(),
            focused: self.focused().map(str::to_owned),
        };
        match &self.view {
            Some(view) => self.core.state().with_state(|s| view(s, &props, frame, area)),
            None => render_outline(self.core.metadata(), &props, frame, area),
        }
        self.dirty.set(false);
    }

    /// Stop observing the store and destroy the core.
    ///
    /// Safe to call repeatedly; the core is destroyed on the first call only.
    pub fn unmount(&self) {
        if self.unmounted.replace(true) {
            return;
        }
        self.subscription.unsubscribe();
        self.core.destroy();
        tracing::debug!(component = self.core.name(), "terminal component unmounted");
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.get()
    }

    fn deliver(&self, input: &InputEvent) -> bool {
        let Some(target) = self.focused() else {
            return false;
        };
        let handlers = self.core.logic().get_interaction_handlers(target);
        let mut handled = handlers.trigger(input.event_type(), &E::from(input.clone()));

        let activates = input.is_key(&Key::Enter) || input.is_key(&Key::Space);
        if activates {
            handled |= handlers.trigger("click", &E::from(InputEvent::Click));
        }
        if handled {
            tracing::trace!(element = target, event = input.event_type(), "terminal input delivered");
        }
        handled
    }

    fn move_focus(&mut self, index: usize) {
        if self.focus == Some(index) {
            return;
        }
        if let Some(previous) = self.focused().map(str::to_owned) {
            self.core
                .logic()
                .get_interaction_handlers(&previous)
                .trigger("blur", &E::from(InputEvent::Blur));
        }
        self.focus = Some(index);
        if let Some(current) = self.focused().map(str::to_owned) {
            self.core
                .logic()
                .get_interaction_handlers(&current)
                .trigger("focus", &E::from(InputEvent::Focus));
        }
        self.dirty.set(true);
    }
}

impl<S: Merge + 'static, E: 'static> Drop for TerminalComponent<S, E> {
    fn drop(&mut self) {
        if !self.unmounted.replace(true) {
            self.subscription.unsubscribe();
            self.core.destroy();
        }
    }
}

impl<S: Merge + 'static, E: 'static> fmt::Debug for TerminalComponent<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalComponent")
            .field("component", &self.core.name())
            .field("focus_order", &self.focus_order)
            .field("focus", &self.focus)
            .field("dirty", &self.dirty.get())
            .field("unmounted", &self.unmounted.get())
            .finish_non_exhaustive()
    }
}

fn render_outline(
    metadata: &husk_core::ComponentMetadata,
    props: &ElementProps,
    frame: &mut Frame,
    area: Rect,
) {
    let title = match metadata.fallback_role() {
        Some(role) => format!(" {} ({role}) ", metadata.name),
        None => format!(" {} ", metadata.name),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let lines: Vec<Line> = props
        .iter()
        .map(|element| {
            let focused = props.is_focused(&element.id);
            let marker = if focused { "> " } else { "  " };
            let id_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let kind = element.element_type.as_deref().unwrap_or("-");
            Line::from(vec![
                Span::raw(marker),
                Span::styled(element.id.clone(), id_style),
                Span::styled(format!(" <{kind}> "), Style::default().fg(Color::DarkGray)),
                Span::raw(element.props.to_string()),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use husk_core::{ComponentFactory, ComponentMetadata, ElementSpec, LogicLayer, Store};
    use husk_widgets::dialog::{create_dialog, DialogOptions, DialogState};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render_string(component: &TerminalComponent<DialogState>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| component.render(frame)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut output = String::new();
        for y in 0..height {
            for x in 0..width {
                output.push_str(buf[(x, y)].symbol());
            }
            output.push('\n');
        }
        output
    }

    fn mount(options: TerminalAdapterOptions) -> TerminalComponent<DialogState> {
        let core = create_dialog().create(&DialogOptions::default());
        core.connect(&TerminalAdapter::with_options(options)).unwrap()
    }

    #[test]
    fn test_default_focus_order_is_interactive_elements() {
        let component = mount(TerminalAdapterOptions::default());
        assert_eq!(
            component.focus_order(),
            &["backdrop", "close", "content", "trigger"]
        );
        assert_eq!(component.focused(), Some("backdrop"));
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut component = mount(TerminalAdapterOptions {
            focus_order: Some(vec!["trigger".into(), "close".into()]),
            ..Default::default()
        });
        assert_eq!(component.focused(), Some("trigger"));
        component.handle_event(&TerminalEvent::key(KeyCode::Tab));
        assert_eq!(component.focused(), Some("close"));
        component.handle_event(&TerminalEvent::key(KeyCode::Tab));
        assert_eq!(component.focused(), Some("trigger"));
        component.handle_event(&TerminalEvent::key(KeyCode::BackTab));
        assert_eq!(component.focused(), Some("close"));
    }

    #[test]
    fn test_enter_activates_focused_element() {
        let mut component = mount(TerminalAdapterOptions {
            initial_focus: Some("trigger".into()),
            ..Default::default()
        });
        assert!(component.handle_event(&TerminalEvent::key(KeyCode::Enter)));
        assert!(component.core().state().get_state().open);

        assert!(component.focus("content"));
        assert!(component.handle_event(&TerminalEvent::key(KeyCode::Esc)));
        assert!(!component.core().state().get_state().open);
    }

    #[test]
    fn test_unknown_initial_focus_fails_connect() {
        let core = create_dialog().create(&DialogOptions::default());
        let err = core
            .connect(&TerminalAdapter::with_options(TerminalAdapterOptions {
                initial_focus: Some("nope".into()),
                ..Default::default()
            }))
            .unwrap_err();
        assert!(err.to_string().contains("adapter `terminal`"));
        assert!(err.to_string().contains("`Dialog`"));
    }

    #[test]
    fn test_dirty_flag_follows_state() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let component = mount(TerminalAdapterOptions::default());
        assert!(component.needs_redraw());
        terminal.draw(|frame| component.render(frame)).unwrap();
        assert!(!component.needs_redraw());

        component.core().logic().dispatch("open");
        assert!(component.needs_redraw());
    }

    #[test]
    fn test_outline_lists_elements_and_props() {
        let component = mount(TerminalAdapterOptions {
            initial_focus: Some("trigger".into()),
            ..Default::default()
        });
        let screen = render_string(&component, 120, 12);
        assert!(screen.contains("Dialog (dialog)"));
        assert!(screen.contains("> trigger <button>"));
        assert!(screen.contains("aria-expanded=\"false\""));
    }

    #[test]
    fn test_custom_view_receives_state_and_focus() {
        let core = create_dialog().create(&DialogOptions::default());
        let adapter = TerminalAdapter::<DialogState>::new().view(|state, props, frame, area| {
            let text = format!(
                "open={} focus={}",
                state.open,
                props.focused().unwrap_or("none")
            );
            frame.render_widget(Paragraph::new(text), area);
        });
        let component: TerminalComponent<DialogState> = core.connect(&adapter).unwrap();
        let screen = render_string(&component, 40, 1);
        assert!(screen.starts_with("open=false focus=backdrop"));
    }

    #[test]
    fn test_quit_key_and_ctrl_c() {
        let mut component = mount(TerminalAdapterOptions::default());
        component.handle_event(&TerminalEvent::key(KeyCode::Char('x')));
        assert!(!component.should_quit());
        component.handle_event(&TerminalEvent::key(KeyCode::Char('q')));
        assert!(component.should_quit());

        let mut component = mount(TerminalAdapterOptions {
            quit_key: None,
            ..Default::default()
        });
        component.handle_event(&TerminalEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(component.should_quit());
    }

    #[derive(Clone)]
    struct Panel {
        focused: bool,
    }

    struct PanelPatch(bool);

    impl Merge for Panel {
        type Patch = PanelPatch;

        fn merge(&mut self, patch: PanelPatch) {
            self.focused = patch.0;
        }
    }

    fn panel_builder() -> husk_core::ComponentBuilder<Panel> {
        ComponentFactory::builder()
            .name("Panel")
            .initial_state(|_: &()| Panel { focused: false })
            .logic(|_: &Store<Panel>, _: &()| {
                LogicLayer::<Panel, InputEvent>::builder()
                    .on_event("focused", |_, _| Some(PanelPatch(true)))
                    .on_event("blurred", |_, _| Some(PanelPatch(false)))
                    .with_interaction("a", "focus", |_, _| Some("focused".into()))
                    .with_interaction("a", "blur", |_, _| Some("blurred".into()))
                    .with_interaction("b", "click", |_, _| None)
                    .build()
            })
            .metadata(
                ComponentMetadata::new("Panel")
                    .element("a", ElementSpec::new("button"))
                    .element("b", ElementSpec::new("button")),
            )
    }

    #[test]
    fn test_focus_and_blur_handlers_fire() {
        let core = panel_builder().build().unwrap().create_default();
        let mut component: TerminalComponent<Panel> =
            core.connect(&TerminalAdapter::new()).unwrap();

        // Initial focus is assigned without firing handlers.
        assert_eq!(component.focused(), Some("a"));
        component.focus_next();
        assert!(!component.core().state().get_state().focused);
        component.focus_prev();
        assert!(component.core().state().get_state().focused);
        component.focus_next();
        assert!(!component.core().state().get_state().focused);
    }

    #[test]
    fn test_destroy_runs_once_across_unmount_and_drop() {
        let destroyed = Rc::new(Cell::new(0));
        let seen = destroyed.clone();
        let core = panel_builder()
            .on_destroy(move || seen.set(seen.get() + 1))
            .build()
            .unwrap()
            .create_default();
        let store = core.state().clone();

        let component: TerminalComponent<Panel> = core.connect(&TerminalAdapter::new()).unwrap();
        assert_eq!(store.subscriber_count(), 1);
        component.unmount();
        component.unmount();
        drop(component);

        assert_eq!(destroyed.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
        assert!(core.is_destroyed());
    }

    #[test]
    fn test_destroying_core_stops_redraw_tracking() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let core = panel_builder().build().unwrap().create_default();
        let store = core.state().clone();
        let component: TerminalComponent<Panel> = core.connect(&TerminalAdapter::new()).unwrap();
        terminal.draw(|frame| component.render(frame)).unwrap();

        core.destroy();
        assert_eq!(store.subscriber_count(), 0);
        store.set_state(Panel { focused: true });
        assert!(!component.needs_redraw());
    }
}
