// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted shapes of the gamepad preferences and bindings documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bindings keyed by control index (as a string, matching the stored form).
pub type BindingMap = BTreeMap<String, ActionBinding>;

/// Global navigator preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamepadPrefs {
    /// Axis magnitude below which stick input is ignored.
    pub analog_cutoff: f64,
    /// Page opened by the "new tab/window" actions.
    #[serde(rename = "newTabOrWindowURL")]
    pub new_tab_or_window_url: String,
    /// Open a window when the browser starts.
    pub open_window_on_startup: bool,
    /// Gamepad polling interval in milliseconds.
    pub polling_frequency: u32,
    /// Rumble on actions that support it.
    pub vibrate: bool,
}

impl Default for GamepadPrefs {
    fn default() -> Self {
        Self {
            analog_cutoff: 0.25,
            new_tab_or_window_url: String::from("https://www.google.com/"),
            open_window_on_startup: true,
            polling_frequency: 50,
            vibrate: true,
        }
    }
}

/// One control's mapped action plus its optional tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    /// Action identifier (e.g. `"click"`, `"scrollDown"`).
    pub action: String,
    /// Repeat/scroll speed multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Invert the axis direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    /// Action applies while the window is in the background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
}

impl ActionBinding {
    /// Binding with no tuning options.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            speed: None,
            invert: None,
            background: None,
        }
    }

    /// Set the speed multiplier.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Set the invert flag.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = Some(invert);
        self
    }

    /// Set the background flag.
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = Some(background);
        self
    }
}

/// Button and axis bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepadBindings {
    /// Buttons and triggers.
    pub buttons: BindingMap,
    /// Thumb stick axes.
    pub axes: BindingMap,
}

impl Default for GamepadBindings {
    fn default() -> Self {
        let buttons = [
            ("0", ActionBinding::new("click")),
            ("1", ActionBinding::new("back")),
            ("4", ActionBinding::new("reverseTabNavigation").with_speed(1.0)),
            ("5", ActionBinding::new("tabNavigation").with_speed(1.0)),
            ("12", ActionBinding::new("scrollUp").with_speed(1.0)),
            ("13", ActionBinding::new("scrollDown").with_speed(1.0)),
        ];
        let axes = [
            ("0", ActionBinding::new("scrollHorizontally").with_speed(1.0)),
            ("1", ActionBinding::new("scrollVertically").with_speed(1.0)),
            ("2", ActionBinding::new("thumbstickHistoryNavigation")),
            ("3", ActionBinding::new("thumbstickTabbing").with_speed(1.0)),
        ];
        Self {
            buttons: buttons
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
            axes: axes.into_iter().map(|(k, v)| (k.to_owned(), v)).collect(),
        }
    }
}
