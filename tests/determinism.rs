use std::collections::HashSet;

use avl_drill::{Engine, Request, SessionConfig};
use blake3::hash;

#[test]
fn sessions_are_deterministic() {
    let requests: Vec<Request> = [50, 20, 80, 10, 30, 25, 27, 90, 95, 5]
        .into_iter()
        .map(Request::Insert)
        .chain([Request::Delete(80), Request::Delete(20), Request::Undo, Request::Redo])
        .collect();

    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let mut engine = Engine::new(SessionConfig::automatic());
        let mut transcript = String::new();
        for request in &requests {
            let response = engine.handle(*request);
            transcript.push_str(&response.messages.join("\n"));
            for frame in &response.frames {
                transcript.push_str(&frame.label);
                transcript.push_str(&avl_drill::render(&frame.tree).to_string());
            }
        }
        transcript.push_str(&engine.render().to_string());
        fingerprints.insert(hash(transcript.as_bytes()));
    }

    assert_eq!(fingerprints.len(), 1, "transcripts diverged across runs");
}

#[test]
fn history_fingerprint_ignores_markers() {
    let mut engine = Engine::new(SessionConfig::practice());
    for v in [30, 20, 10] {
        engine.apply(Request::Insert(v)).expect("insert accepted");
    }
    engine
        .apply(Request::Rotate(avl_drill::RotationKind::Right, 30))
        .expect("owed rotation accepted");

    let committed = engine.history().current();
    let live = avl_drill::TreeSnapshot::capture(engine.tree());
    assert_eq!(committed.fingerprint(), live.fingerprint());
}
