//! Area-based visibility of new viewports across registered contexts.

use std::rc::Rc;

use vista_layout::{
    ContextRegistry, FractionalRect, NullSink, ScreenRect, SnapshotStore, ViewportFlags,
    ViewportId, Workspace, WorkspaceConfig,
};

const LARGE: ScreenRect = ScreenRect::from_size(100.0, 100.0);
const SMALL: ScreenRect = ScreenRect::from_size(10.0, 10.0);

fn left_half() -> FractionalRect {
    FractionalRect::new(0.0, 0.0, 0.5, 1.0)
}

#[test]
fn added_on_large_context_is_minimized_on_small() {
    let mut contexts = ContextRegistry::new(Rc::new(NullSink));
    let small = contexts.resolve(&SMALL).key();
    let large = contexts.resolve(&LARGE).key();
    let mut store = SnapshotStore::new();

    let written = store
        .add_viewport(
            &contexts,
            &ViewportId::new("vp-1"),
            left_half(),
            ViewportFlags::default(),
            1,
        )
        .unwrap();
    assert_eq!(written.len(), 2);

    let on_large = &store.snapshots_for_context(&large)[0];
    assert!(!on_large.is_minimized);
    assert_eq!(on_large.fractional_rect, Some(left_half()));
    assert_eq!(on_large.owning_context_id, large);

    let on_small = &store.snapshots_for_context(&small)[0];
    assert!(on_small.is_minimized);
    assert_eq!(on_small.fractional_rect, None);
    assert_eq!(on_small.owning_context_id, small);
}

#[test]
fn added_on_small_context_is_visible_everywhere() {
    let mut contexts = ContextRegistry::new(Rc::new(NullSink));
    contexts.resolve(&LARGE);
    contexts.resolve(&SMALL);
    let mut store = SnapshotStore::new();

    store
        .add_viewport(
            &contexts,
            &ViewportId::new("vp-1"),
            left_half(),
            ViewportFlags::default(),
            1,
        )
        .unwrap();
    for (key, _) in contexts.iter() {
        let snapshot = &store.snapshots_for_context(key)[0];
        assert!(!snapshot.is_minimized, "{key}");
        assert_eq!(snapshot.fractional_rect, Some(left_half()));
    }
}

#[test]
fn equal_area_is_not_smaller() {
    let mut contexts = ContextRegistry::new(Rc::new(NullSink));
    let wide = contexts.resolve(&ScreenRect::from_size(400.0, 100.0)).key();
    contexts.resolve(&ScreenRect::from_size(200.0, 200.0));
    let mut store = SnapshotStore::new();
    store
        .add_viewport(
            &contexts,
            &ViewportId::new("vp-1"),
            left_half(),
            ViewportFlags::default(),
            1,
        )
        .unwrap();
    assert!(!store.snapshots_for_context(&wide)[0].is_minimized);
}

#[test]
fn workspace_hides_large_context_viewports_on_small_screen() {
    let mut ws = Workspace::new(WorkspaceConfig::default());
    let small = ws.set_surface(SMALL).unwrap().key();
    ws.set_surface(LARGE).unwrap();
    let first = ws.viewports()[0].id().clone();
    let added = ws
        .create_viewport(Some(FractionalRect::new(0.25, 0.25, 0.5, 0.5)))
        .unwrap()
        .id()
        .clone();
    assert!(ws.has_viewport(&first));

    let hidden = ws
        .snapshots_for_context(&small)
        .iter()
        .find(|s| s.id == added)
        .unwrap();
    assert!(hidden.is_minimized);

    ws.set_surface(SMALL).unwrap();
    assert!(!ws.has_viewport(&added));
    ws.set_surface(LARGE).unwrap();
    assert!(ws.has_viewport(&added));
}

#[test]
fn workspace_shows_small_context_viewports_on_large_screen() {
    let mut ws = Workspace::new(WorkspaceConfig::default());
    ws.set_surface(LARGE).unwrap();
    ws.set_surface(SMALL).unwrap();
    let added = ws
        .create_viewport(Some(left_half()))
        .unwrap()
        .id()
        .clone();
    ws.set_surface(LARGE).unwrap();
    let shown = ws.viewport(&added).unwrap();
    assert_eq!(shown.fractional_rect(), left_half());
    assert_eq!(shown.absolute_rect(), ScreenRect::new(0.0, 0.0, 50.0, 100.0));
}
