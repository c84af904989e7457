// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Two-way bindings between sub-panels and a sub-path of a document.
//!
//! A panel never owns state: it reads through its lens and writes through
//! [`SettingsDocument::edit`], so every change it makes reaches the
//! document's save listener.

use crate::document::SettingsDocument;
use crate::schema::{ActionBinding, BindingMap, GamepadBindings, GamepadPrefs};

/// Label of the preferences panel.
pub const PREFS_LABEL: &str = "Preferences";
/// Label of the buttons panel.
pub const BUTTONS_LABEL: &str = "Buttons / Triggers";
/// Label of the axes panel.
pub const AXES_LABEL: &str = "Axes (Thumb sticks)";

/// Projection of `U` out of `T`.
pub struct Lens<T, U> {
    get: fn(&T) -> &U,
    get_mut: fn(&mut T) -> &mut U,
}

impl<T, U> Lens<T, U> {
    /// Lens from a shared and a mutable accessor.
    pub const fn new(get: fn(&T) -> &U, get_mut: fn(&mut T) -> &mut U) -> Self {
        Self { get, get_mut }
    }

    /// Borrow the projected part.
    pub fn get<'a>(&self, whole: &'a T) -> &'a U {
        (self.get)(whole)
    }

    /// Mutably borrow the projected part.
    pub fn get_mut<'a>(&self, whole: &'a mut T) -> &'a mut U {
        (self.get_mut)(whole)
    }
}

fn whole<T>(value: &T) -> &T {
    value
}

fn whole_mut<T>(value: &mut T) -> &mut T {
    value
}

impl<T> Lens<T, T> {
    /// Lens over the entire value.
    pub const fn identity() -> Self {
        Self::new(whole::<T>, whole_mut::<T>)
    }
}

impl<T, U> Clone for Lens<T, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, U> Copy for Lens<T, U> {}

/// A labelled view onto part of a document.
pub struct SubPanel<T, U> {
    label: &'static str,
    lens: Lens<T, U>,
}

impl<T, U> SubPanel<T, U> {
    /// Panel showing `label` bound through `lens`.
    pub const fn new(label: &'static str, lens: Lens<T, U>) -> Self {
        Self { label, lens }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Current value of the bound part.
    pub fn view<'d>(&self, document: &'d SettingsDocument<T>) -> &'d U {
        self.lens.get(document.current_value())
    }
}

impl<T: PartialEq + Clone, U> SubPanel<T, U> {
    /// Apply a user edit to the bound part. Returns whether anything changed.
    pub fn update<F>(&self, document: &mut SettingsDocument<T>, f: F) -> bool
    where
        F: FnOnce(&mut U),
    {
        let lens = self.lens;
        document.edit(|value| f(lens.get_mut(value)))
    }

    /// Overwrite the bound part as a user edit.
    pub fn replace(&self, document: &mut SettingsDocument<T>, value: U) -> bool {
        self.update(document, |part| *part = value)
    }
}

impl<T: PartialEq + Clone> SubPanel<T, BindingMap> {
    /// Binding for `control`, if any.
    pub fn binding<'d>(
        &self,
        document: &'d SettingsDocument<T>,
        control: &str,
    ) -> Option<&'d ActionBinding> {
        self.view(document).get(control)
    }

    /// Map `control` to `binding`, replacing any previous mapping.
    pub fn bind(
        &self,
        document: &mut SettingsDocument<T>,
        control: impl Into<String>,
        binding: ActionBinding,
    ) -> bool {
        let control = control.into();
        self.update(document, move |map| {
            map.insert(control, binding);
        })
    }

    /// Remove the mapping for `control`.
    pub fn unbind(&self, document: &mut SettingsDocument<T>, control: &str) -> bool {
        self.update(document, |map| {
            map.remove(control);
        })
    }
}

fn buttons(bindings: &GamepadBindings) -> &BindingMap {
    &bindings.buttons
}

fn buttons_mut(bindings: &mut GamepadBindings) -> &mut BindingMap {
    &mut bindings.buttons
}

fn axes(bindings: &GamepadBindings) -> &BindingMap {
    &bindings.axes
}

fn axes_mut(bindings: &mut GamepadBindings) -> &mut BindingMap {
    &mut bindings.axes
}

/// Preferences panel, bound to the whole prefs document.
pub const fn prefs_panel() -> SubPanel<GamepadPrefs, GamepadPrefs> {
    SubPanel::new(PREFS_LABEL, Lens::identity())
}

/// Buttons/triggers panel, bound to `bindings.buttons`.
pub const fn buttons_panel() -> SubPanel<GamepadBindings, BindingMap> {
    SubPanel::new(BUTTONS_LABEL, Lens::new(buttons, buttons_mut))
}

/// Thumb stick panel, bound to `bindings.axes`.
pub const fn axes_panel() -> SubPanel<GamepadBindings, BindingMap> {
    SubPanel::new(AXES_LABEL, Lens::new(axes, axes_mut))
}
