use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::{TempDir, tempdir};
use treewalk::{Context, Decision, Entry, EntryKind, WalkError, Walker, filter};
fn make_tree() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.go"), "package a").unwrap();
    fs::write(dir.path().join("b.py"), "print()").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.go"), "package sub").unwrap();
    dir
}
fn make_wide_tree(files: usize) -> TempDir {
    let dir = tempdir().unwrap();
    for i in 0..files {
        fs::write(dir.path().join(format!("f{:03}.txt", i)), "x").unwrap();
    }
    dir
}
fn collect(walker: &Walker, root: &Path) -> Vec<Entry> {
    walker.walk(&Context::background(), root).collect()
}
#[test]
fn integration_scenario_without_filters() {
    let dir = make_tree();
    let walker = Walker::new();
    let entries = collect(&walker, dir.path());
    let got: Vec<&Path> = entries.iter().map(|e| e.path()).collect();
    assert_eq!(
        got,
        vec![
            Path::new("a.go"),
            Path::new("b.py"),
            Path::new("sub"),
            Path::new("sub/c.go")
        ]
    );
    for entry in &entries {
        assert!(!entry.path().as_os_str().is_empty());
        assert!(!entry.path().is_absolute());
        assert!(!entry.name().is_empty());
        assert_eq!(entry.full_path(), dir.path().join(entry.path()));
        assert!(entry.metadata().is_ok());
    }
    let sub = &entries[2];
    assert!(sub.is_dir());
    assert_eq!(sub.kind(), EntryKind::Dir);
    assert_eq!(entries[3].depth(), 2);
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_include_root() {
    let dir = make_tree();
    let walker = Walker::new().include_root(true);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].path(), Path::new("."));
    assert_eq!(entries[0].depth(), 0);
    assert!(entries[0].is_dir());
    assert_eq!(entries.iter().filter(|e| e.path() == Path::new(".")).count(), 1);
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_skip_root_ends_walk() {
    let dir = make_tree();
    let walker = Walker::new()
        .include_root(true)
        .with_filters([filter::skip_paths(["."])]);
    assert!(collect(&walker, dir.path()).is_empty());
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_discard_dirs() {
    let dir = make_tree();
    let walker = Walker::new().with_filters([filter::discard_dirs()]);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| !e.is_dir()));
    assert!(entries.iter().any(|e| e.path() == Path::new("sub/c.go")));
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_discard_regular() {
    let dir = make_tree();
    let walker = Walker::new().with_filters([filter::discard_regular()]);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 1);
    assert!(entries.iter().all(|e| !e.is_file()));
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_discard_both() {
    let dir = make_tree();
    let walker = Walker::new().with_filters([filter::discard_regular(), filter::discard_dirs()]);
    assert!(collect(&walker, dir.path()).is_empty());
    assert!(walker.last_error().is_none());
}
#[cfg(unix)]
#[test]
fn integration_discard_both_keeps_symlinks() {
    let dir = make_tree();
    std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("link")).unwrap();
    let walker = Walker::new().with_filters([filter::discard_dirs(), filter::discard_regular()]);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_symlink());
    assert_eq!(entries[0].path(), Path::new("link"));
}
#[test]
fn integration_skip_paths() {
    let dir = make_tree();
    fs::create_dir_all(dir.path().join("sub/deep/er")).unwrap();
    fs::write(dir.path().join("sub/deep/er/x.go"), "package x").unwrap();
    let walker = Walker::new().with_filters([filter::skip_paths(["sub"])]);
    let entries = collect(&walker, dir.path());
    let got: Vec<PathBuf> = entries.iter().map(|e| e.path().to_path_buf()).collect();
    assert_eq!(got, vec![PathBuf::from("a.go"), PathBuf::from("b.py")]);
    for path in &got {
        assert!(!path.starts_with("sub"));
    }
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_skip_nested_path() {
    let dir = make_tree();
    fs::create_dir_all(dir.path().join("sub/deep")).unwrap();
    fs::write(dir.path().join("sub/deep/x.go"), "package x").unwrap();
    let walker = Walker::new().with_filters([filter::skip_paths(["sub/deep"])]);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| !e.path().starts_with("sub/deep")));
}
#[test]
fn integration_skip_subtree_on_file_only_drops_file() {
    let dir = make_tree();
    let walker = Walker::new().with_filters([filter::skip_paths(["a.go"])]);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().any(|e| e.path() == Path::new("b.py")));
}
#[test]
fn integration_abort_on_kth_entry() {
    let dir = make_tree();
    let visited = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&visited);
    let walker = Walker::new().with_filters([
        filter::from_fn(move |_: &Entry| {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                Decision::Abort
            } else {
                Decision::Pass
            }
        }),
        filter::discard_dirs(),
    ]);
    let entries = collect(&walker, dir.path());
    let got: Vec<&Path> = entries.iter().map(|e| e.path()).collect();
    assert_eq!(got, vec![Path::new("a.go"), Path::new("b.py")]);
    assert_eq!(visited.load(Ordering::SeqCst), 3);
    let err = walker.last_error().unwrap();
    assert!(matches!(err, WalkError::Aborted));
    assert!(!err.is_fatal());
}
#[test]
fn integration_abort_immediately() {
    let dir = make_tree();
    let walker = Walker::new().with_filters([filter::abort_when(|_| true)]);
    let entries = walker.walk(&Context::background(), dir.path());
    assert_eq!(entries.clone().count(), 0);
    assert!(matches!(entries.error(), Some(WalkError::Aborted)));
}
#[test]
fn integration_max_depth() {
    let dir = make_tree();
    let walker = Walker::new().max_depth(1);
    let entries = collect(&walker, dir.path());
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.depth() == 1));
}
#[test]
fn integration_missing_root_reports_io_error() {
    let dir = tempdir().unwrap();
    let walker = Walker::new();
    let entries = collect(&walker, &dir.path().join("missing"));
    assert!(entries.is_empty());
    let err = walker.last_error().unwrap();
    assert!(matches!(err, WalkError::Io { .. }));
    assert!(err.is_fatal());
    assert_eq!(err.io_error().unwrap().kind(), ErrorKind::NotFound);
}
#[test]
fn integration_no_error_before_drain() {
    let dir = make_tree();
    let walker = Walker::new();
    let mut entries = walker.walk(&Context::background(), dir.path());
    assert!(walker.last_error().is_none());
    assert!(!entries.is_finished());
    assert!(entries.next().is_some());
    assert_eq!(entries.by_ref().count(), 3);
    assert!(entries.next().is_none());
    assert!(entries.is_finished());
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_cancel_after_consuming() {
    let dir = make_wide_tree(40);
    let (ctx, cancel) = Context::background().with_cancel();
    let walker = Walker::new();
    let mut count = 0;
    for entry in walker.walk(&ctx, dir.path()) {
        assert!(!entry.path().as_os_str().is_empty());
        count += 1;
        if count == 3 {
            cancel.cancel();
        }
    }
    assert!(count <= 4, "got {} entries after cancelling at 3", count);
    let err = walker.last_error().unwrap();
    assert!(matches!(err, WalkError::Cancelled));
    assert!(err.is_cancellation());
}
#[test]
fn integration_cancelled_before_walk() {
    let dir = make_tree();
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();
    let walker = Walker::new();
    assert!(collect_with(&walker, &ctx, dir.path()).is_empty());
    assert!(matches!(walker.last_error(), Some(WalkError::Cancelled)));
}
fn collect_with(walker: &Walker, ctx: &Context, root: &Path) -> Vec<Entry> {
    walker.walk(ctx, root).collect()
}
#[test]
fn integration_deadline_while_blocked() {
    let dir = make_wide_tree(10);
    let ctx = Context::background().with_timeout(Duration::from_millis(200));
    let walker = Walker::new();
    let mut entries = walker.walk(&ctx, dir.path());
    assert!(entries.next().is_some());
    thread::sleep(Duration::from_millis(600));
    assert_eq!(entries.count(), 0);
    assert!(matches!(
        walker.last_error(),
        Some(WalkError::DeadlineExceeded)
    ));
}
#[test]
fn integration_dropped_consumer_detaches() {
    let dir = make_wide_tree(10);
    let walker = Walker::new();
    let mut entries = walker.walk(&Context::background(), dir.path());
    assert!(entries.next().is_some());
    drop(entries);
    let start = Instant::now();
    while walker.last_error().is_none() && start.elapsed() < Duration::from_secs(5) {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(matches!(walker.last_error(), Some(WalkError::Detached)));
}
#[test]
fn integration_multiple_consumers() {
    let dir = make_wide_tree(50);
    let walker = Walker::new();
    let entries = walker.walk(&Context::background(), dir.path());
    let (left, right) = thread::scope(|s| {
        let a = entries.clone();
        let b = entries.clone();
        let left = s.spawn(move || a.map(|e| e.path().to_path_buf()).collect::<Vec<_>>());
        let right = s.spawn(move || b.map(|e| e.path().to_path_buf()).collect::<Vec<_>>());
        (left.join().unwrap(), right.join().unwrap())
    });
    drop(entries);
    let all: HashSet<PathBuf> = left.iter().chain(right.iter()).cloned().collect();
    assert_eq!(left.len() + right.len(), 50);
    assert_eq!(all.len(), 50);
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_buffered_channel() {
    let dir = make_wide_tree(20);
    let walker = Walker::new().channel_capacity(8);
    assert_eq!(collect(&walker, dir.path()).len(), 20);
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_walks_are_repeatable() {
    let dir = make_tree();
    let first = Walker::new().with_filters([filter::discard_dirs()]);
    let second = Walker::new().with_filters([filter::discard_dirs()]);
    let a: Vec<PathBuf> = collect(&first, dir.path())
        .into_iter()
        .map(|e| e.path().to_path_buf())
        .collect();
    let b: Vec<PathBuf> = collect(&second, dir.path())
        .into_iter()
        .map(|e| e.path().to_path_buf())
        .collect();
    assert_eq!(a, b);
}
#[test]
fn integration_walk_with_extra_filters() {
    let dir = make_tree();
    let walker = Walker::new().with_filters([filter::discard_dirs()]);
    let entries: Vec<Entry> = walker
        .walk_with(
            &Context::background(),
            dir.path(),
            [filter::skip_paths(["sub"])],
        )
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(walker.filters().len(), 1);
    assert_eq!(collect(&walker, dir.path()).len(), 3);
}
#[test]
fn integration_last_error_tracks_latest_walk() {
    let dir = make_tree();
    let walker = Walker::new();
    let _ = collect(&walker, &dir.path().join("missing"));
    assert!(walker.last_error().is_some());
    let _ = collect(&walker, dir.path());
    assert!(walker.last_error().is_none());
}
#[test]
fn integration_cancel_drops_buffered_entries() {
    let dir = make_wide_tree(40);
    let (ctx, cancel) = Context::background().with_cancel();
    let walker = Walker::new().channel_capacity(8);
    let mut entries = walker.walk(&ctx, dir.path());
    assert!(entries.next().is_some());
    // Let the producer fill the buffer before cancelling.
    thread::sleep(Duration::from_millis(100));
    cancel.cancel();
    let extra = entries.by_ref().count();
    assert!(extra <= 1, "got {} entries after cancelling", extra);
    assert!(entries.next().is_none());
    assert!(matches!(walker.last_error(), Some(WalkError::Cancelled)));
}
#[cfg(unix)]
#[test]
fn integration_unreadable_dir_stops_walk() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "a").unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/x"), "x").unwrap();
    fs::write(dir.path().join("c"), "c").unwrap();
    let locked = dir.path().join("b");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Privileged users can read the directory anyway.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let walker = Walker::new();
    let entries = collect(&walker, dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let got: Vec<&Path> = entries.iter().map(|e| e.path()).collect();
    assert_eq!(got[0], Path::new("a"));
    assert!(got.iter().all(|p| *p == Path::new("a") || *p == Path::new("b")));
    assert!(entries[0].metadata().is_ok());
    let err = walker.last_error().unwrap();
    assert!(matches!(err, WalkError::Io { .. }));
    assert_eq!(err.io_error().unwrap().kind(), ErrorKind::PermissionDenied);
}
