#![forbid(unsafe_code)]

use nt_core::ids::NodeId;
use nt_storage::{SqliteStore, StoreError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("nt_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn all_rows(storage_dir: &Path) -> Vec<(i64, String, i64, i64)> {
    let conn = Connection::open(storage_dir.join("nestree.db")).expect("open db");
    let mut stmt = conn
        .prepare("SELECT id, name, lft, rgt FROM nodes ORDER BY id")
        .expect("prepare");
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .expect("query");
    rows.collect::<Result<Vec<_>, _>>().expect("collect")
}

fn bounds_of(rows: &[(i64, String, i64, i64)], id: NodeId) -> (i64, i64) {
    rows.iter()
        .find(|(row_id, _, _, _)| *row_id == id.as_i64())
        .map(|(_, _, lft, rgt)| (*lft, *rgt))
        .expect("row present")
}

#[test]
fn move_translates_the_subtree_as_a_block() {
    let storage_dir = temp_dir("move_translates_block");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let x = store.create("x", root).expect("create x");
    let a = store.create("a", x).expect("create a");
    let b = store.create("b", x).expect("create b");
    let c = store.create("c", b).expect("create c");
    let y = store.create("y", root).expect("create y");

    let before = all_rows(&storage_dir);
    let x_lft_before = bounds_of(&before, x).0;
    let offsets_before: Vec<(i64, i64, i64)> = [x, a, b, c]
        .iter()
        .map(|id| {
            let (lft, rgt) = bounds_of(&before, *id);
            (id.as_i64(), lft - x_lft_before, rgt - x_lft_before)
        })
        .collect();

    store.move_node(x, y, None).expect("move x under y");

    let after = all_rows(&storage_dir);
    let x_lft_after = bounds_of(&after, x).0;
    let offsets_after: Vec<(i64, i64, i64)> = [x, a, b, c]
        .iter()
        .map(|id| {
            let (lft, rgt) = bounds_of(&after, *id);
            (id.as_i64(), lft - x_lft_after, rgt - x_lft_after)
        })
        .collect();

    // Only the absolute bounds changed; every interval inside the moved
    // subtree kept its offset from the subtree's left edge.
    assert_eq!(offsets_before, offsets_after);

    // Parents inside the subtree are untouched; x itself reparented.
    assert_eq!(store.get_by_id(x).expect("get x").parent_id, Some(y));
    assert_eq!(store.get_by_id(a).expect("get a").parent_id, Some(x));
    assert_eq!(store.get_by_id(b).expect("get b").parent_id, Some(x));
    assert_eq!(store.get_by_id(c).expect("get c").parent_id, Some(b));

    let rows = store.tree().expect("tree");
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["root", "y", "x", "a", "b", "c"]);
}

#[test]
fn position_zero_inserts_as_first_child() {
    let storage_dir = temp_dir("position_zero_first_child");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let _a = store.create("a", root).expect("create a");
    let _b = store.create("b", root).expect("create b");
    let c = store.create("c", root).expect("create c");

    store.move_node(c, root, Some(0)).expect("move c first");

    let rows = store.tree().expect("tree");
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["root", "c", "a", "b"]);
}

#[test]
fn position_between_siblings_lands_after_that_many_children() {
    let storage_dir = temp_dir("position_between_siblings");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let a = store.create("a", root).expect("create a");
    let _b = store.create("b", root).expect("create b");
    let _c = store.create("c", root).expect("create c");

    store.move_node(a, root, Some(2)).expect("move a to slot 2");

    let rows = store.tree().expect("tree");
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["root", "b", "c", "a"]);
}

#[test]
fn sibling_offsets_count_children_not_descendants() {
    // A preceding child with its own subtree must count as one slot.
    let storage_dir = temp_dir("offsets_count_children");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let a = store.create("a", root).expect("create a");
    let _a1 = store.create("a1", a).expect("create a1");
    let _a2 = store.create("a2", a).expect("create a2");
    let _b = store.create("b", root).expect("create b");
    let _c = store.create("c", root).expect("create c");
    let d = store.create("d", root).expect("create d");

    // Offset 1 must land after child b, not after a's own child a1.
    store.move_node(d, root, Some(2)).expect("move d after b");

    let rows = store.tree().expect("tree");
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["root", "a", "a1", "a2", "b", "d", "c"]);
}

#[test]
fn position_past_the_last_child_appends_last() {
    let storage_dir = temp_dir("position_past_last_appends");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let a = store.create("a", root).expect("create a");
    let _b = store.create("b", root).expect("create b");
    let _c = store.create("c", root).expect("create c");

    store.move_node(a, root, Some(9)).expect("move a far right");

    let rows = store.tree().expect("tree");
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["root", "b", "c", "a"]);
}

#[test]
fn negative_position_is_rejected_before_any_write() {
    let storage_dir = temp_dir("negative_position_rejected");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let a = store.create("a", root).expect("create a");
    let _b = store.create("b", root).expect("create b");
    let before = all_rows(&storage_dir);

    match store.move_node(a, root, Some(-1)) {
        Err(StoreError::InvalidInput(message)) => {
            assert_eq!(message, "position must not be less than 0");
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert_eq!(all_rows(&storage_dir), before);
}

#[test]
fn moving_a_node_under_its_own_subtree_rolls_back() {
    let storage_dir = temp_dir("move_under_own_subtree");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let p = store.create("p", root).expect("create p");
    let child = store.create("child", p).expect("create child");
    let grandchild = store.create("grandchild", child).expect("create grandchild");
    let before = all_rows(&storage_dir);

    for target in [p, child, grandchild] {
        match store.move_node(p, target, None) {
            Err(StoreError::InvalidInput(message)) => {
                assert_eq!(message, "cannot move a node under its own subtree");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert_eq!(all_rows(&storage_dir), before, "bounds must be untouched");
    }
}

#[test]
fn move_to_a_missing_parent_rolls_back_detach_and_compaction() {
    // NotFound fires after the subtree was already parked and the hole
    // compacted; the rollback must undo both.
    let storage_dir = temp_dir("move_missing_parent_rolls_back");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let a = store.create("a", root).expect("create a");
    let _a1 = store.create("a1", a).expect("create a1");
    let _b = store.create("b", root).expect("create b");
    let before = all_rows(&storage_dir);

    let ghost = NodeId::try_new(999).expect("id");
    match store.move_node(a, ghost, None) {
        Err(StoreError::NodeNotFound { id }) => assert_eq!(id, 999),
        other => panic!("expected NodeNotFound, got {other:?}"),
    }
    assert_eq!(all_rows(&storage_dir), before);

    // No parked (negative) bound may survive the rollback.
    assert!(
        all_rows(&storage_dir)
            .iter()
            .all(|(_, _, lft, rgt)| *lft > 0 && *rgt > 0)
    );
}

#[test]
fn the_root_cannot_be_moved() {
    let storage_dir = temp_dir("root_cannot_be_moved");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();
    let a = store.create("a", root).expect("create a");

    match store.move_node(root, a, None) {
        Err(StoreError::RootLocked) => {}
        other => panic!("expected RootLocked, got {other:?}"),
    }
}

#[test]
fn move_without_position_appends_as_last_child() {
    let storage_dir = temp_dir("move_appends_last");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let root = store.root_id();

    let a = store.create("a", root).expect("create a");
    let b = store.create("b", root).expect("create b");
    let _b1 = store.create("b1", b).expect("create b1");

    store.move_node(a, b, None).expect("move a under b");

    let rows = store.tree().expect("tree");
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["root", "b", "b1", "a"]);
}
