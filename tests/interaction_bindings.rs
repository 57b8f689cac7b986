use lottie_engine::{
    compile, normalize_rules, AnimationDocument, Binding, EditingSession, PlayerControl,
    PlayerFactory, RenderSurface,
};
use serde_json::json;

#[derive(Default)]
struct RecordingPlayer {
    playing: bool,
    reversed: bool,
    plays: u32,
}

impl PlayerControl for RecordingPlayer {
    fn play(&mut self) {
        self.playing = true;
        self.plays += 1;
    }
    fn pause(&mut self) {
        self.playing = false;
    }
    fn restart(&mut self) {
        self.playing = true;
    }
    fn seek_to_progress(&mut self, _progress: f64) {}
    fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }
    fn is_playing(&self) -> bool {
        self.playing
    }
}

struct Surface;

impl RenderSurface for Surface {
    fn has_layer_node(&self, layer_name: &str) -> bool {
        layer_name == "Title"
    }
}

#[test]
fn stored_rule_list_compiles_to_bindings_end_to_end() {
    let stored = json!([
        {"type": "scroll", "trigger": "onScroll", "direction": "both"},
        {"type": "click", "action": "toggle"},
        {"type": "url", "url": "https://example.com", "layerName": "Missing"},
        {"type": "wiggle"}
    ]);

    let rules = normalize_rules(&stored);
    assert_eq!(rules.len(), 3, "the unknown trigger is dropped");

    let bindings = compile(&rules, &Surface);
    assert_eq!(bindings.len(), 2, "the mis-scoped link binds nothing");

    let mut player = RecordingPlayer::default();
    for binding in &bindings {
        match binding {
            Binding::Scroll(scroll) => {
                scroll.on_scroll(&mut player, 10.0);
                assert!(!player.reversed);
                scroll.on_scroll(&mut player, -10.0);
                assert!(player.reversed);
            }
            Binding::Click(click) => {
                let was_playing = player.is_playing();
                click.on_click(&mut player);
                assert_eq!(player.is_playing(), !was_playing);
            }
            other => panic!("unexpected binding {other:?}"),
        }
    }
    assert!(player.plays >= 2);
}

struct RecordingFactory;

impl PlayerFactory for RecordingFactory {
    fn instantiate(&self, document: &AnimationDocument) -> Box<dyn PlayerControl> {
        // The factory only ever sees the repaired playback copy.
        assert_eq!(
            document.as_value().pointer("/layers/0/shapes/0/c/a"),
            Some(&json!(0))
        );
        Box::new(RecordingPlayer::default())
    }
}

#[test]
fn session_player_is_built_from_the_repaired_copy_and_drives_bindings() {
    let bytes = serde_json::to_vec(&json!({
        "v": "5.9.6", "fr": 30, "w": 512, "h": 512,
        "layers": [{"ty": 4, "shapes": [{"ty": "fl", "c": {"k": [1, 0, 0, 1]}}]}]
    }))
    .unwrap();
    let session = EditingSession::open(&bytes, None).unwrap();
    let mut player = session.create_player(&RecordingFactory);

    let rules = normalize_rules(&json!([{"type": "click", "action": "toggle"}]));
    let bindings = compile(&rules, &Surface);
    let Binding::Click(click) = &bindings[0] else {
        panic!("expected a click binding, got {bindings:?}");
    };

    click.on_click(player.as_mut());
    assert!(player.is_playing());
    click.on_click(player.as_mut());
    assert!(!player.is_playing());
}
