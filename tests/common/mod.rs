#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use avl_drill::{Engine, Key, Request, SessionConfig, TraversalOrder};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("AVL_DRILL_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set AVL_DRILL_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Engine with `values` inserted one by one
pub fn engine_with(config: SessionConfig, values: &[Key]) -> Engine {
    let mut engine = Engine::new(config);
    for &v in values {
        engine
            .apply(Request::Insert(v))
            .unwrap_or_else(|err| panic!("insert {v} failed: {err}"));
    }
    engine
}

/// Practice-mode engine: insert each value and apply every owed step
pub fn practice_with(values: &[Key]) -> Engine {
    let mut engine = Engine::new(SessionConfig::practice());
    for &v in values {
        engine.apply(Request::Insert(v)).expect("insert accepted");
        resolve(&mut engine);
    }
    engine
}

/// Submit the owed steps until the engine is idle
pub fn resolve(engine: &mut Engine) {
    while let Some(step) = engine.pending().and_then(|p| p.next()) {
        engine
            .apply(Request::Rotate(step.kind, step.node))
            .expect("owed step accepted");
    }
}

pub fn preorder(engine: &Engine) -> Vec<Key> {
    engine.tree().traverse(TraversalOrder::PreOrder)
}

pub fn postorder(engine: &Engine) -> Vec<Key> {
    engine.tree().traverse(TraversalOrder::PostOrder)
}
