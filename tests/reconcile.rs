use mapdesk::images::{ImageSession, PreviewImage, PreviewRegistry};
use pretty_assertions::assert_eq;
use std::path::Path;

fn session(names: &[&str]) -> ImageSession {
    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    ImageSession::hydrate(&names)
}

fn preview() -> PreviewImage {
    PreviewImage {
        width: 2,
        height: 2,
        rgba: vec![255; 16],
    }
}

#[test]
fn toggle_twice_leaves_pending_removal_unchanged() {
    let mut s = session(&["a.png", "b.png"]);
    s.toggle_removal("b.png");
    s.toggle_removal("b.png");
    assert!(s.build_diff().remove_ids.is_empty());
    assert!(!s.has_changes());
}

#[test]
fn diff_reflects_n_additions_and_m_removals() {
    let mut registry = PreviewRegistry::default();
    let mut s = session(&["a.png", "b.png", "c.png", "d.png"]);

    for i in 0..3 {
        let name = format!("/tmp/new-{i}.png");
        s.stage_addition(Path::new(&name), vec![i as u8], &mut registry);
    }
    s.toggle_removal("a.png");
    s.toggle_removal("d.png");

    let diff = s.build_diff();
    assert_eq!(diff.new_files.len(), 3);
    assert_eq!(diff.remove_ids.len(), 2);
    assert_eq!(s.change_count(), 5);
}

#[test]
fn build_diff_is_pure() {
    let mut s = session(&["a.png"]);
    s.toggle_removal("a.png");

    let first: Vec<String> = s.build_diff().remove_ids.to_vec();
    let second: Vec<String> = s.build_diff().remove_ids.to_vec();
    assert_eq!(first, second);
    assert!(s.is_marked_removed("a.png"));
}

#[test]
fn delete_then_re_add_within_one_session_yields_empty_diff() {
    let mut s = session(&["relief.png"]);

    // Mark for deletion, then undo by toggling the same identifier back.
    s.toggle_removal("relief.png");
    assert!(s.is_marked_removed("relief.png"));
    s.toggle_removal("relief.png");

    let diff = s.build_diff();
    assert!(diff.new_files.is_empty());
    assert!(diff.remove_ids.is_empty());
}

#[test]
fn failed_save_preserves_staged_state_for_retry() {
    // The engine never mutates on a failed commit: the caller only closes
    // the session on success, so everything staged is still here.
    let mut registry = PreviewRegistry::default();
    let mut s = session(&["a.png", "b.png"]);
    s.stage_addition(Path::new("/tmp/x.png"), vec![9], &mut registry);
    s.toggle_removal("b.png");

    let before_adds = s.build_diff().new_files.len();
    let before_removes = s.build_diff().remove_ids.to_vec();

    // (request fails remotely; no local call happens)

    assert_eq!(s.build_diff().new_files.len(), before_adds);
    assert_eq!(s.build_diff().remove_ids, &before_removes[..]);
}

#[test]
fn every_preview_is_released_exactly_once_across_a_session() {
    let mut registry = PreviewRegistry::default();
    let mut s = session(&["a.png", "b.png"]);

    let pa = registry.acquire(preview());
    let pb = registry.acquire(preview());
    s.attach_preview("a.png", pa);
    s.attach_preview("b.png", pb);

    s.stage_addition(Path::new("/tmp/new.png"), vec![1], &mut registry);
    let pn = registry.acquire(preview());
    s.pending_addition[0].preview = Some(pn);
    assert_eq!(registry.alive_count(), 3);

    // Unstaging releases the staged preview.
    s.unstage_addition(0, &mut registry);
    assert_eq!(registry.alive_count(), 2);

    // Closing the editor releases the rest.
    s.close(&mut registry);
    assert_eq!(registry.alive_count(), 0);

    // Nothing to double-release.
    assert!(!registry.release(pa));
    assert!(!registry.release(pb));
    assert!(!registry.release(pn));
}

#[test]
fn staged_identifiers_never_collide_with_server_identifiers() {
    let mut registry = PreviewRegistry::default();
    let mut s = session(&["a.png"]);
    // Staging a file whose name matches a server identifier still goes into
    // the addition partition; removal marking only sees the server side.
    s.stage_addition(Path::new("/tmp/a.png"), vec![1], &mut registry);
    assert_eq!(s.build_diff().new_files.len(), 1);
    assert!(s.build_diff().remove_ids.is_empty());

    s.toggle_removal("a.png");
    let diff = s.build_diff();
    assert_eq!(diff.new_files.len(), 1);
    assert_eq!(diff.remove_ids.len(), 1);
}
