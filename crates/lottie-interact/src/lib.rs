pub mod compile;
pub mod rules;

pub use compile::{compile, Binding, NoLayerNodes, PlayerControl, RenderSurface};
pub use rules::{
    normalize_rules, ClickAction, HoverAction, InteractionRule, LinkTarget, ScrollDirection,
    ScrollTrigger,
};
