#![forbid(unsafe_code)]

//! Option widgets shown in the pane toolbar.
//!
//! Both widgets are thin wrappers around an [`Observable`]; the pane
//! subscribes to them and reacts to every change regardless of who made it.
//! Clones share the same underlying value.

use outpane_hub::{Observable, ObserverGuard};

/// Current state of the toggle buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleState {
    /// Soft-wrap long lines.
    pub wrap: bool,
}

/// Toolbar toggle group.
#[derive(Debug, Clone)]
pub struct Toggles {
    state: Observable<ToggleState>,
}

impl Toggles {
    #[must_use]
    pub fn new(initial: ToggleState) -> Self {
        Self {
            state: Observable::new(initial),
        }
    }

    #[must_use]
    pub fn get(&self) -> ToggleState {
        self.state.get()
    }

    #[must_use]
    pub fn wrap(&self) -> bool {
        self.state.with(|s| s.wrap)
    }

    pub fn set_wrap(&self, wrap: bool) {
        self.state.update(|s| s.wrap = wrap);
    }

    /// Flip wrap and return the new value.
    pub fn toggle_wrap(&self) -> bool {
        self.state.update(|s| s.wrap = !s.wrap);
        self.wrap()
    }

    /// Observe every change. Dropping the guard unsubscribes.
    pub fn subscribe(&self, observer: impl Fn(&ToggleState) + 'static) -> ObserverGuard {
        self.state.subscribe(observer)
    }
}

impl Default for Toggles {
    fn default() -> Self {
        Self::new(ToggleState::default())
    }
}

/// Font size selector.
///
/// Values are clamped to `[MIN, MAX]`; non-finite inputs fall back to
/// [`FontScale::DEFAULT`].
#[derive(Debug, Clone)]
pub struct FontScale {
    scale: Observable<f32>,
    step: f32,
}

impl FontScale {
    pub const DEFAULT: f32 = 14.0;
    pub const MIN: f32 = 8.0;
    pub const MAX: f32 = 30.0;

    #[must_use]
    pub fn new(initial: f32, step: f32) -> Self {
        Self {
            scale: Observable::new(Self::clamp(initial)),
            step,
        }
    }

    fn clamp(value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(Self::MIN, Self::MAX)
        } else {
            Self::DEFAULT
        }
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale.get()
    }

    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn set(&self, value: f32) {
        self.scale.set(Self::clamp(value));
    }

    /// One step larger. Returns the new scale.
    pub fn increase(&self) -> f32 {
        self.set(self.scale() + self.step);
        self.scale()
    }

    /// One step smaller. Returns the new scale.
    pub fn decrease(&self) -> f32 {
        self.set(self.scale() - self.step);
        self.scale()
    }

    /// Observe every change. Dropping the guard unsubscribes.
    pub fn subscribe(&self, observer: impl Fn(&f32) + 'static) -> ObserverGuard {
        self.scale.subscribe(observer)
    }
}

impl Default for FontScale {
    fn default() -> Self {
        Self::new(Self::DEFAULT, 1.0)
    }
}
