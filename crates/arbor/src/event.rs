//! Event kinds a node can listen for during hit-testing.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// High-level event kinds produced by the external event-translation layer.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Primary button click.
    Click,
    /// Wheel or trackpad scroll.
    Scroll,
    /// Keyboard focus gained.
    Focus,
    /// Keyboard focus lost.
    Blur,
    /// Pointer entered the node.
    HoverStart,
    /// Pointer left the node.
    HoverEnd,
    /// Key pressed.
    KeyDown,
    /// Committed text input.
    TextInput,
    /// Pointer button released.
    MouseUp,
    /// Pointer moved.
    MouseMotion,
    /// Click on a link span inside rich text.
    LinkClick,
    /// Frame tick.
    Tick,
    /// Application quit request.
    Quit,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Click,
        Self::Scroll,
        Self::Focus,
        Self::Blur,
        Self::HoverStart,
        Self::HoverEnd,
        Self::KeyDown,
        Self::TextInput,
        Self::MouseUp,
        Self::MouseMotion,
        Self::LinkClick,
        Self::Tick,
        Self::Quit,
    ];

    /// The wire name of this event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Scroll => "scroll",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::HoverStart => "hover_start",
            Self::HoverEnd => "hover_end",
            Self::KeyDown => "key_down",
            Self::TextInput => "text_input",
            Self::MouseUp => "mouse_up",
            Self::MouseMotion => "mouse_motion",
            Self::LinkClick => "link_click",
            Self::Tick => "tick",
            Self::Quit => "quit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown event kind: {s}"))
    }
}

/// The set of event kinds a node is matched against.
pub type ListenSet = BTreeSet<EventKind>;
