use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

fn default_hover_enter() -> HoverAction {
    HoverAction::Play
}

fn default_hover_leave() -> HoverAction {
    HoverAction::Pause
}

/// A persisted trigger/action rule. Rules travel as a JSON array alongside
/// the animation document, never inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InteractionRule {
    Scroll {
        #[serde(default = "default_true")]
        enabled: bool,
        #[serde(default)]
        trigger: ScrollTrigger,
        /// Scroll fraction in 0-1; rules outside the range are dropped at
        /// normalization rather than clamped.
        #[serde(default)]
        offset: f64,
        #[serde(default)]
        direction: ScrollDirection,
    },
    Click {
        #[serde(default = "default_true")]
        enabled: bool,
        #[serde(default)]
        action: ClickAction,
    },
    Hover {
        #[serde(default = "default_true")]
        enabled: bool,
        #[serde(default = "default_hover_enter", rename = "onEnter")]
        on_enter: HoverAction,
        #[serde(default = "default_hover_leave", rename = "onLeave")]
        on_leave: HoverAction,
    },
    Url {
        #[serde(default = "default_true")]
        enabled: bool,
        #[serde(default)]
        url: String,
        #[serde(default)]
        target: LinkTarget,
        #[serde(default, rename = "layerName", skip_serializing_if = "Option::is_none")]
        layer_name: Option<String>,
    },
}

impl InteractionRule {
    pub fn enabled(&self) -> bool {
        match self {
            Self::Scroll { enabled, .. }
            | Self::Click { enabled, .. }
            | Self::Hover { enabled, .. }
            | Self::Url { enabled, .. } => *enabled,
        }
    }

    fn in_range(&self) -> bool {
        match self {
            Self::Scroll { offset, .. } => (0.0..=1.0).contains(offset) && offset.is_finite(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollTrigger {
    #[default]
    OnScroll,
    OnViewport,
    OnScrollProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Forward,
    Backward,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickAction {
    #[default]
    Play,
    Pause,
    Toggle,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverAction {
    Play,
    Pause,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "_self")]
    SameFrame,
    #[serde(rename = "_blank")]
    NewTab,
    #[serde(rename = "_parent")]
    Parent,
    #[serde(rename = "_top")]
    Top,
}

/// Leniently parses a stored rule list. Entries with unknown trigger types
/// or out-of-range parameters are dropped with a diagnostic log line; a
/// partially valid list is still useful, which makes this deliberately
/// softer than document validation.
pub fn normalize_rules(value: &Value) -> Vec<InteractionRule> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            tracing::warn!("interaction rules are not a JSON array, ignoring");
        }
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<InteractionRule>(item.clone()) {
            Ok(rule) if rule.in_range() => Some(rule),
            Ok(rule) => {
                tracing::warn!(?rule, "dropping interaction rule with out-of-range parameters");
                None
            }
            Err(err) => {
                tracing::warn!(%err, "dropping unsupported interaction rule");
                None
            }
        })
        .collect()
}
