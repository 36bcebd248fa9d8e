//! Image avatar with an initials fallback.
//!
//! The image goes through `idle -> loading -> loaded | error`.  Until it has
//! loaded, the `fallback` element shows initials derived from the name and
//! carries the accessible label; once loaded, the `image` element does.

use husk_core::{
    A11yProps, ComponentConfig, ComponentCore, ComponentFactory, ComponentMetadata, ElementSpec,
    InputEvent, LogicLayer, Merge, Store,
};

/// Event names understood by the avatar.
pub mod events {
    /// Start loading the current `src`.
    pub const LOAD: &str = "load";
    pub const LOADED: &str = "loaded";
    /// Payload: optional [`InputEvent::Error`](husk_core::InputEvent::Error) message.
    pub const ERROR: &str = "error";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Idle => "idle",
            ImageStatus::Loading => "loading",
            ImageStatus::Loaded => "loaded",
            ImageStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AvatarOptions {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvatarState {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub name: Option<String>,
    pub status: ImageStatus,
    pub error: Option<String>,
}

impl AvatarState {
    /// Up to two uppercase initials from the name: first and last word.
    pub fn initials(&self) -> String {
        self.name.as_deref().map(initials).unwrap_or_default()
    }

    /// Alt text, else the name.
    pub fn label(&self) -> Option<&str> {
        self.alt.as_deref().or(self.name.as_deref())
    }

    pub fn show_fallback(&self) -> bool {
        self.status != ImageStatus::Loaded
    }
}

/// Initials of `name`: the first letter of its first and last words.
///
/// ```
/// assert_eq!(husk_widgets::avatar::initials("ada lovelace"), "AL");
/// assert_eq!(husk_widgets::avatar::initials("Grace Brewster Hopper"), "GH");
/// assert_eq!(husk_widgets::avatar::initials("Plato"), "P");
/// assert_eq!(husk_widgets::avatar::initials("   "), "");
/// ```
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    let first = words.next().and_then(|w| w.chars().next());
    let last = words.last().and_then(|w| w.chars().next());
    first
        .into_iter()
        .chain(last)
        .flat_map(char::to_uppercase)
        .collect()
}

impl From<&AvatarOptions> for AvatarState {
    fn from(options: &AvatarOptions) -> Self {
        Self {
            src: options.src.clone(),
            alt: options.alt.clone(),
            name: options.name.clone(),
            status: ImageStatus::Idle,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AvatarPatch {
    pub src: Option<Option<String>>,
    pub status: Option<ImageStatus>,
    pub error: Option<Option<String>>,
}

impl Merge for AvatarState {
    type Patch = AvatarPatch;

    fn merge(&mut self, patch: AvatarPatch) {
        if let Some(src) = patch.src {
            self.src = src;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(error) = patch.error {
            self.error = error;
        }
    }
}

pub fn avatar_metadata() -> ComponentMetadata {
    ComponentMetadata::new("Avatar")
        .role("img")
        .aria_attributes(["aria-label", "aria-hidden"])
        .supports([events::LOAD, events::LOADED, events::ERROR])
        .element("root", ElementSpec::new("span").role("img"))
        .element("image", ElementSpec::new("img").optional())
        .element("fallback", ElementSpec::new("span"))
        .size("sm")
        .size("md")
        .size("lg")
        .variant("circle")
        .variant("square")
}

fn avatar_logic(_: &Store<AvatarState>, _: &AvatarOptions) -> LogicLayer<AvatarState> {
    LogicLayer::<AvatarState, InputEvent>::builder()
        .on_event(events::LOAD, |s, _| {
            if s.src.is_none() {
                tracing::debug!("avatar has no src, staying on fallback");
                return None;
            }
            (s.status != ImageStatus::Loading).then(|| AvatarPatch {
                status: Some(ImageStatus::Loading),
                error: Some(None),
                ..Default::default()
            })
        })
        .on_event(events::LOADED, |s, _| {
            (s.status != ImageStatus::Loaded).then(|| AvatarPatch {
                status: Some(ImageStatus::Loaded),
                ..Default::default()
            })
        })
        .on_event(events::ERROR, |_, payload| {
            let message = payload.and_then(InputEvent::text).map(str::to_owned);
            Some(AvatarPatch {
                status: Some(ImageStatus::Error),
                error: Some(message),
                ..Default::default()
            })
        })
        .with_a11y("root", |s| {
            A11yProps::new()
                .with("role", "img")
                .with_opt("aria-label", s.label().map(str::to_owned))
                .with("data-status", s.status.as_str())
        })
        .with_a11y("image", |s| {
            A11yProps::new()
                .with_opt("src", s.src.clone())
                .with("alt", s.label().unwrap_or_default().to_owned())
                .with_opt("hidden", s.show_fallback().then_some(true))
        })
        .with_a11y("fallback", |s| {
            A11yProps::new()
                .with_opt("aria-hidden", (!s.show_fallback()).then_some(true))
                .with("data-initials", s.initials())
        })
        .with_interaction("image", "load", |_, _| Some(events::LOADED.into()))
        .with_interaction("image", "error", |_, _| Some(events::ERROR.into()))
        .on_initialize(|store| {
            if store.with_state(|s| s.src.is_some()) {
                store.update_state(|s| {
                    let mut next = s.clone();
                    next.status = ImageStatus::Loading;
                    next
                });
            }
        })
        .build()
}

/// Factory for avatar instances.
///
/// An avatar created with a `src` starts in [`ImageStatus::Loading`].
pub fn create_avatar() -> ComponentFactory<AvatarState, InputEvent, AvatarOptions> {
    ComponentFactory::new(ComponentConfig::new(
        "Avatar",
        |options: &AvatarOptions| AvatarState::from(options),
        avatar_logic,
        avatar_metadata(),
    ))
}

/// Controlled-prop setter: swap the image source and restart loading.
pub fn set_src(core: &ComponentCore<AvatarState>, src: Option<String>) {
    if core.state().with_state(|s| s.src == src) {
        return;
    }
    let status = if src.is_some() {
        ImageStatus::Loading
    } else {
        ImageStatus::Idle
    };
    core.state().update_state(move |s| {
        let mut next = s.clone();
        next.src = src;
        next.status = status;
        next.error = None;
        next
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use husk_core::testing::TestHarness;
    use husk_core::AttrValue;

    fn avatar(options: AvatarOptions) -> TestHarness<AvatarState> {
        TestHarness::new(create_avatar().create(&options))
    }

    fn with_src() -> AvatarOptions {
        AvatarOptions {
            src: Some("https://example.com/ada.png".into()),
            name: Some("Ada Lovelace".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_src_starts_loading() {
        let h = avatar(with_src());
        assert_eq!(h.state().status, ImageStatus::Loading);
    }

    #[test]
    fn test_no_src_stays_idle() {
        let h = avatar(AvatarOptions {
            name: Some("Ada Lovelace".into()),
            ..Default::default()
        });
        h.dispatch(events::LOAD);
        assert_eq!(h.state().status, ImageStatus::Idle);
        assert_eq!(h.render_count(), 0);
    }

    #[test]
    fn test_image_load_event_marks_loaded() {
        let h = avatar(with_src());
        assert!(h.fire("image", InputEvent::Load));
        assert_eq!(h.state().status, ImageStatus::Loaded);
        assert_eq!(h.attr("fallback", "aria-hidden"), Some(AttrValue::Bool(true)));
        assert_eq!(h.attr("image", "hidden"), None);
    }

    #[test]
    fn test_image_error_keeps_message_and_fallback() {
        let h = avatar(with_src());
        h.fire("image", InputEvent::Error("404".into()));
        let s = h.state();
        assert_eq!(s.status, ImageStatus::Error);
        assert_eq!(s.error.as_deref(), Some("404"));
        assert_eq!(
            h.attr("fallback", "data-initials"),
            Some(AttrValue::Text("AL".into()))
        );
        assert_eq!(h.attr("image", "hidden"), Some(AttrValue::Bool(true)));
    }

    #[test]
    fn test_retry_after_error_clears_message() {
        let h = avatar(with_src());
        h.fire("image", InputEvent::Error("timeout".into()));
        h.dispatch(events::LOAD);
        let s = h.state();
        assert_eq!(s.status, ImageStatus::Loading);
        assert_eq!(s.error, None);
    }

    #[test]
    fn test_alt_takes_precedence_for_label() {
        let h = avatar(AvatarOptions {
            alt: Some("Profile photo".into()),
            ..with_src()
        });
        assert_eq!(
            h.attr("root", "aria-label"),
            Some(AttrValue::Text("Profile photo".into()))
        );
        assert_eq!(
            h.attr("image", "alt"),
            Some(AttrValue::Text("Profile photo".into()))
        );
    }

    #[test]
    fn test_set_src_restarts_loading() {
        let h = avatar(with_src());
        h.fire("image", InputEvent::Load);
        set_src(h.core(), Some("https://example.com/new.png".into()));
        assert_eq!(h.state().status, ImageStatus::Loading);
        set_src(h.core(), None);
        assert_eq!(h.state().status, ImageStatus::Idle);
        let renders = h.render_count();
        set_src(h.core(), None);
        assert_eq!(h.render_count(), renders);
    }

    #[test]
    fn test_initials_edge_cases() {
        assert_eq!(initials("émile zola"), "ÉZ");
        assert_eq!(initials(""), "");
        assert_eq!(AvatarState::default().initials(), "");
    }
}
