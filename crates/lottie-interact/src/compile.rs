use crate::rules::{ClickAction, HoverAction, InteractionRule, LinkTarget, ScrollDirection};

/// Playback operations a rendered animation instance must expose. The host
/// supplies the implementation; the engine never loads a player itself.
pub trait PlayerControl {
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek to the first frame and play.
    fn restart(&mut self);
    /// Seek to a 0-1 fraction of the timeline.
    fn seek_to_progress(&mut self, progress: f64);
    fn set_reversed(&mut self, reversed: bool);
    fn is_playing(&self) -> bool;
}

/// The host's view of the rendered output, used to scope link bindings to
/// named layer nodes.
pub trait RenderSurface {
    fn has_layer_node(&self, layer_name: &str) -> bool;
}

/// A render surface with no addressable layer nodes.
pub struct NoLayerNodes;

impl RenderSurface for NoLayerNodes {
    fn has_layer_node(&self, _layer_name: &str) -> bool {
        false
    }
}

/// One compiled event binding. The host wires each variant to its event
/// source (scroll listener, intersection observer, pointer events, anchor
/// click-through) and forwards events to the dispatch methods here.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Scroll(ScrollBinding),
    Viewport(ViewportBinding),
    ScrollProgress(ScrollProgressBinding),
    Click(ClickBinding),
    Hover(HoverBinding),
    Link(LinkBinding),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollBinding {
    pub direction: ScrollDirection,
}

impl ScrollBinding {
    /// Positive deltas are downward scroll. Downward plays forward, upward
    /// plays reversed; the configured direction filters which side reacts.
    pub fn on_scroll(&self, player: &mut dyn PlayerControl, delta: f64) {
        if delta > 0.0 {
            if matches!(
                self.direction,
                ScrollDirection::Forward | ScrollDirection::Both
            ) {
                player.set_reversed(false);
                player.play();
            }
        } else if delta < 0.0
            && matches!(
                self.direction,
                ScrollDirection::Backward | ScrollDirection::Both
            )
        {
            player.set_reversed(true);
            player.play();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportBinding {
    /// Fraction of the element that must be visible before playback starts.
    pub threshold: f64,
}

impl ViewportBinding {
    pub fn on_visibility(&self, player: &mut dyn PlayerControl, visible_fraction: f64) {
        if visible_fraction >= self.threshold && visible_fraction > 0.0 {
            player.play();
        } else {
            player.pause();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollProgressBinding {
    /// Scroll fraction below which playback holds the first frame.
    pub offset: f64,
}

impl ScrollProgressBinding {
    pub fn on_scroll_progress(&self, player: &mut dyn PlayerControl, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        let span = 1.0 - self.offset;
        let mapped = if span <= 0.0 {
            1.0
        } else {
            ((progress - self.offset) / span).clamp(0.0, 1.0)
        };
        player.seek_to_progress(mapped);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickBinding {
    pub action: ClickAction,
}

impl ClickBinding {
    pub fn on_click(&self, player: &mut dyn PlayerControl) {
        match self.action {
            ClickAction::Play => player.play(),
            ClickAction::Pause => player.pause(),
            ClickAction::Restart => player.restart(),
            ClickAction::Toggle => {
                if player.is_playing() {
                    player.pause();
                } else {
                    player.play();
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverBinding {
    pub on_enter: HoverAction,
    pub on_leave: HoverAction,
}

impl HoverBinding {
    pub fn on_pointer_enter(&self, player: &mut dyn PlayerControl) {
        apply_hover_action(self.on_enter, player);
    }

    pub fn on_pointer_leave(&self, player: &mut dyn PlayerControl) {
        apply_hover_action(self.on_leave, player);
    }
}

fn apply_hover_action(action: HoverAction, player: &mut dyn PlayerControl) {
    match action {
        HoverAction::Play => player.play(),
        HoverAction::Pause => player.pause(),
        HoverAction::Restart => player.restart(),
    }
}

/// A navigation binding the host materializes as an anchor-equivalent
/// click-through. Drives no player operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkBinding {
    pub url: String,
    pub target: LinkTarget,
    /// When set, the binding applies only to rendered nodes tagged with this
    /// layer name.
    pub layer_name: Option<String>,
}

/// Maps each normalized rule to its one binding strategy. Disabled rules
/// produce nothing. A link rule scoped to a layer name absent from the
/// rendered output produces nothing either; that is a content/config
/// mismatch, not an engine error.
pub fn compile(rules: &[InteractionRule], surface: &dyn RenderSurface) -> Vec<Binding> {
    rules
        .iter()
        .filter(|rule| rule.enabled())
        .filter_map(|rule| match rule {
            InteractionRule::Scroll {
                trigger, offset, direction, ..
            } => Some(match trigger {
                crate::rules::ScrollTrigger::OnScroll => Binding::Scroll(ScrollBinding {
                    direction: *direction,
                }),
                crate::rules::ScrollTrigger::OnViewport => {
                    Binding::Viewport(ViewportBinding { threshold: *offset })
                }
                crate::rules::ScrollTrigger::OnScrollProgress => {
                    Binding::ScrollProgress(ScrollProgressBinding { offset: *offset })
                }
            }),
            InteractionRule::Click { action, .. } => {
                Some(Binding::Click(ClickBinding { action: *action }))
            }
            InteractionRule::Hover {
                on_enter, on_leave, ..
            } => Some(Binding::Hover(HoverBinding {
                on_enter: *on_enter,
                on_leave: *on_leave,
            })),
            InteractionRule::Url {
                url,
                target,
                layer_name,
                ..
            } => {
                if let Some(name) = layer_name {
                    if !surface.has_layer_node(name) {
                        tracing::debug!(
                            layer = %name,
                            "link rule targets a layer absent from the rendered output"
                        );
                        return None;
                    }
                }
                Some(Binding::Link(LinkBinding {
                    url: url.clone(),
                    target: *target,
                    layer_name: layer_name.clone(),
                }))
            }
        })
        .collect()
}
