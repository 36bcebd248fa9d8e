//! Determinate and indeterminate progress bar.
//!
//! The value is always clamped to `[min, max]`.  While indeterminate, the
//! `aria-valuenow` and `aria-valuetext` attributes are omitted so assistive
//! technology announces a busy state instead of a stale number.

use husk_core::{
    A11yProps, ComponentConfig, ComponentCore, ComponentFactory, ComponentMetadata, ElementSpec,
    InputEvent, LogicLayer, Merge, Store,
};

/// Event names understood by the progress bar.
pub mod events {
    /// Payload: [`InputEvent::Value`](husk_core::InputEvent::Value).
    pub const SET_VALUE: &str = "setValue";
    /// Payload: optional [`InputEvent::Value`](husk_core::InputEvent::Value) step, default `1`.
    pub const INCREMENT: &str = "increment";
    pub const RESET: &str = "reset";
    pub const INDETERMINATE: &str = "indeterminate";
}

#[derive(Debug, Clone)]
pub struct ProgressOptions {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub indeterminate: bool,
    pub label: Option<String>,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            value: 0.0,
            min: 0.0,
            max: 100.0,
            indeterminate: false,
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub indeterminate: bool,
    pub label: Option<String>,
}

impl ProgressState {
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Completion in `0.0..=100.0`, or `None` while indeterminate.
    ///
    /// An empty range (`min == max`) reads as complete.
    pub fn percent(&self) -> Option<f64> {
        if self.indeterminate {
            return None;
        }
        let range = self.max - self.min;
        if range <= 0.0 {
            return Some(100.0);
        }
        Some((self.value - self.min) / range * 100.0)
    }

    pub fn is_complete(&self) -> bool {
        !self.indeterminate && self.value >= self.max
    }

    fn value_text(&self) -> Option<String> {
        let percent = self.percent()?;
        Some(match &self.label {
            Some(label) => format!("{label}: {percent:.0}%"),
            None => format!("{percent:.0}%"),
        })
    }

    fn patch_value(&self, value: f64) -> Option<ProgressPatch> {
        let value = self.clamp(value);
        (value != self.value || self.indeterminate).then_some(ProgressPatch {
            value: Some(value),
            indeterminate: Some(false),
        })
    }
}

impl From<&ProgressOptions> for ProgressState {
    fn from(options: &ProgressOptions) -> Self {
        // Non-finite bounds fall back to the defaults; a reversed range is
        // treated as written the other way round.
        let defaults = ProgressOptions::default();
        let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        let (a, b) = (
            finite_or(options.min, defaults.min),
            finite_or(options.max, defaults.max),
        );
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let mut state = Self {
            value: min,
            min,
            max,
            indeterminate: options.indeterminate,
            label: options.label.clone(),
        };
        state.value = state.clamp(options.value);
        state
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressPatch {
    pub value: Option<f64>,
    pub indeterminate: Option<bool>,
}

impl Merge for ProgressState {
    type Patch = ProgressPatch;

    fn merge(&mut self, patch: ProgressPatch) {
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(indeterminate) = patch.indeterminate {
            self.indeterminate = indeterminate;
        }
    }
}

pub fn progress_metadata() -> ComponentMetadata {
    ComponentMetadata::new("ProgressBar")
        .role("progressbar")
        .aria_attributes([
            "aria-valuenow",
            "aria-valuemin",
            "aria-valuemax",
            "aria-valuetext",
            "aria-busy",
            "aria-label",
        ])
        .supports([
            events::SET_VALUE,
            events::INCREMENT,
            events::RESET,
            events::INDETERMINATE,
        ])
        .element("root", ElementSpec::new("div").role("progressbar"))
        .element("track", ElementSpec::new("div"))
        .element("indicator", ElementSpec::new("div"))
        .element("label", ElementSpec::new("span").optional())
        .size("sm")
        .size("md")
}

fn progress_logic(_: &Store<ProgressState>, _: &ProgressOptions) -> LogicLayer<ProgressState> {
    LogicLayer::<ProgressState, InputEvent>::builder()
        .on_event(events::SET_VALUE, |s, payload| {
            let value = payload.and_then(InputEvent::value)?;
            s.patch_value(value)
        })
        .on_event(events::INCREMENT, |s, payload| {
            let step = payload.and_then(InputEvent::value).unwrap_or(1.0);
            s.patch_value(s.value + step)
        })
        .on_event(events::RESET, |s, _| s.patch_value(s.min))
        .on_event(events::INDETERMINATE, |s, _| {
            (!s.indeterminate).then(|| ProgressPatch {
                indeterminate: Some(true),
                ..Default::default()
            })
        })
        .with_a11y("root", |s| {
            let determinate = !s.indeterminate;
            A11yProps::new()
                .with("role", "progressbar")
                .with("aria-valuemin", s.min)
                .with("aria-valuemax", s.max)
                .with_opt("aria-valuenow", determinate.then_some(s.value))
                .with_opt("aria-valuetext", s.value_text())
                .with_opt("aria-busy", s.indeterminate.then_some(true))
                .with_opt("aria-label", s.label.clone())
                .with(
                    "data-state",
                    if s.indeterminate {
                        "indeterminate"
                    } else if s.is_complete() {
                        "complete"
                    } else {
                        "loading"
                    },
                )
        })
        .with_a11y("indicator", |s| {
            A11yProps::new().with_opt("data-percent", s.percent().map(|p| p.round() as i64))
        })
        .build()
}

/// Factory for progress bar instances.
pub fn create_progress() -> ComponentFactory<ProgressState, InputEvent, ProgressOptions> {
    ComponentFactory::new(ComponentConfig::new(
        "ProgressBar",
        |options: &ProgressOptions| ProgressState::from(options),
        progress_logic,
        progress_metadata(),
    ))
}

/// Controlled-prop setter for the value; clamps and leaves indeterminate mode.
pub fn set_value(core: &ComponentCore<ProgressState>, value: f64) {
    core.logic()
        .handle_event(events::SET_VALUE, Some(&InputEvent::Value(value)));
}

pub fn set_indeterminate(core: &ComponentCore<ProgressState>, indeterminate: bool) {
    if indeterminate {
        core.logic().dispatch(events::INDETERMINATE);
    } else {
        let value = core.state().with_state(|s| s.value);
        set_value(core, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use husk_core::testing::TestHarness;
    use husk_core::AttrValue;

    fn progress(options: ProgressOptions) -> TestHarness<ProgressState> {
        TestHarness::new(create_progress().create(&options))
    }

    #[test]
    fn test_initial_value_is_clamped() {
        let h = progress(ProgressOptions {
            value: 150.0,
            ..Default::default()
        });
        assert_eq!(h.state().value, 100.0);
    }

    #[test]
    fn test_reversed_range_is_normalized() {
        let h = progress(ProgressOptions {
            value: 5.0,
            min: 10.0,
            max: 0.0,
            ..Default::default()
        });
        let s = h.state();
        assert_eq!((s.min, s.max, s.value), (0.0, 10.0, 5.0));
    }

    #[test]
    fn test_set_value_clamps() {
        let h = progress(ProgressOptions::default());
        h.send(events::SET_VALUE, InputEvent::Value(-20.0));
        assert_eq!(h.state().value, 0.0);
        assert_eq!(h.render_count(), 0);
        set_value(h.core(), 42.0);
        assert_eq!(h.state().value, 42.0);
    }

    #[test]
    fn test_increment_defaults_to_one() {
        let h = progress(ProgressOptions::default());
        h.dispatch(events::INCREMENT);
        h.send(events::INCREMENT, InputEvent::Value(9.0));
        assert_eq!(h.state().value, 10.0);
    }

    #[test]
    fn test_root_props_when_determinate() {
        let h = progress(ProgressOptions {
            value: 25.0,
            label: Some("Upload".into()),
            ..Default::default()
        });
        let root = h.a11y("root");
        assert_eq!(root.get("role"), Some(&AttrValue::Text("progressbar".into())));
        assert_eq!(root.get("aria-valuenow"), Some(&AttrValue::Float(25.0)));
        assert_eq!(root.get("aria-valuemax"), Some(&AttrValue::Float(100.0)));
        assert_eq!(
            root.get("aria-valuetext"),
            Some(&AttrValue::Text("Upload: 25%".into()))
        );
        assert!(!root.contains("aria-busy"));
        assert_eq!(h.attr("indicator", "data-percent"), Some(AttrValue::Int(25)));
    }

    #[test]
    fn test_indeterminate_omits_value() {
        let h = progress(ProgressOptions::default());
        set_indeterminate(h.core(), true);
        let root = h.a11y("root");
        assert!(!root.contains("aria-valuenow"));
        assert!(!root.contains("aria-valuetext"));
        assert_eq!(root.get("aria-busy"), Some(&AttrValue::Bool(true)));
        assert!(h.a11y("indicator").is_empty());
    }

    #[test]
    fn test_leaving_indeterminate_restores_value() {
        let h = progress(ProgressOptions {
            value: 30.0,
            indeterminate: true,
            ..Default::default()
        });
        set_indeterminate(h.core(), false);
        assert!(!h.state().indeterminate);
        assert_eq!(h.attr("root", "aria-valuenow"), Some(AttrValue::Float(30.0)));
    }

    #[test]
    fn test_complete_state() {
        let h = progress(ProgressOptions::default());
        set_value(h.core(), 100.0);
        assert!(h.state().is_complete());
        assert_eq!(
            h.attr("root", "data-state"),
            Some(AttrValue::Text("complete".into()))
        );
        h.dispatch(events::RESET);
        assert_eq!(h.state().value, 0.0);
    }

    #[test]
    fn test_empty_range_reads_complete() {
        let h = progress(ProgressOptions {
            min: 5.0,
            max: 5.0,
            ..Default::default()
        });
        assert_eq!(h.state().percent(), Some(100.0));
    }

    #[test]
    fn test_non_finite_bounds_use_defaults() {
        let h = progress(ProgressOptions {
            value: 40.0,
            min: f64::NAN,
            max: f64::INFINITY,
            ..Default::default()
        });
        let s = h.state();
        assert_eq!((s.min, s.max, s.value), (0.0, 100.0, 40.0));
        set_value(h.core(), f64::NAN);
        assert_eq!(h.state().value, 0.0);
    }
}
