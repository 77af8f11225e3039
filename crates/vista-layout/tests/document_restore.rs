//! Persisted documents and context records.

use std::rc::Rc;

use vista_layout::{
    DocumentError, ErrorKind, EventBus, EventKind, FractionalRect, LayoutError, ScreenRect,
    SequentialIdGenerator, SplitDirection, ViewportId, Workspace, WorkspaceConfig,
    WorkspaceDocument, WorkspaceState,
};

const DESKTOP: ScreenRect = ScreenRect::from_size(1920.0, 1080.0);
const TABLET: ScreenRect = ScreenRect::from_size(800.0, 1200.0);

/// Desktop with two stacked viewports, tablet with its default viewport.
fn populated() -> Workspace {
    let mut ws = Workspace::with_id_generator(
        WorkspaceConfig::default(),
        Box::new(SequentialIdGenerator::new("vp")),
    )
    .with_id("ws-1");
    ws.set_surface(DESKTOP).unwrap();
    let first = ws.viewports()[0].id().clone();
    ws.split_viewport(&first, SplitDirection::Down).unwrap();
    ws.set_surface(TABLET).unwrap();
    ws.set_surface(DESKTOP).unwrap();
    ws
}

#[test]
fn document_lists_every_context_in_order() {
    let ws = populated();
    let document = ws.to_document();
    assert_eq!(document.id, "ws-1");
    assert_eq!(document.name, "workspace");
    let keys: Vec<_> = document
        .workspace_contexts
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(keys, vec!["landscape-lg-1920x1080", "portrait-sm-800x1200"]);
    assert_eq!(document.workspace_contexts[0].viewport_snapshots.len(), 2);
    assert_eq!(document.workspace_contexts[1].viewport_snapshots.len(), 1);
    assert!(document.validate().is_ok());
}

#[test]
fn document_includes_unsaved_live_edits() {
    let mut ws = populated();
    let desktop = ws.current_context().unwrap().key();
    let second = ws.viewports()[1].id().clone();
    ws.remove_viewport(&second).unwrap();

    let document = ws.to_document();
    let record = document.context(&desktop).unwrap();
    assert_eq!(record.viewport_snapshots.len(), 1);
    // Exporting does not persist anything.
    assert_eq!(ws.snapshots_for_context(&desktop).len(), 2);
}

#[test]
fn restored_workspace_rebuilds_contexts_before_surface() {
    let document = populated().to_document();
    let bus = Rc::new(EventBus::new());
    let created = Rc::new(std::cell::Cell::new(0));
    let c = Rc::clone(&created);
    bus.on(EventKind::ContextCreated, move |_| c.set(c.get() + 1));

    let mut restored = Workspace::from_document_with(
        document,
        WorkspaceConfig::default(),
        Box::new(SequentialIdGenerator::new("vp")),
        Rc::clone(&bus),
    )
    .unwrap();
    assert_eq!(created.get(), 2);
    assert_eq!(restored.state(), WorkspaceState::Uninitialized);
    assert_eq!(restored.contexts().len(), 2);
    assert!(restored.viewports().is_empty());
    assert_eq!(
        restored
            .create_viewport(None)
            .unwrap_err()
            .kind(),
        ErrorKind::PreconditionViolation
    );

    restored.set_surface(DESKTOP).unwrap();
    let ids: Vec<_> = restored
        .viewports()
        .iter()
        .map(|v| v.id().to_string())
        .collect();
    assert_eq!(ids, vec!["vp-1", "vp-2"]);
    assert_eq!(
        restored.viewports()[1].fractional_rect(),
        FractionalRect::new(0.0, 0.5, 1.0, 0.5)
    );
}

#[test]
fn json_file_round_trip() {
    let document = populated().to_document();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workspace.json");
    std::fs::write(&path, document.to_json_string().unwrap()).unwrap();

    let loaded =
        WorkspaceDocument::from_json_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, document);
    let mut ws = Workspace::from_document(loaded, WorkspaceConfig::default()).unwrap();
    ws.set_surface(TABLET).unwrap();
    assert_eq!(ws.viewports().len(), 1);
    assert_eq!(ws.viewports()[0].id().as_str(), "vp-3");
}

#[test]
fn context_record_is_a_deep_copy() {
    let mut ws = populated();
    let tablet = ws
        .contexts()
        .iter()
        .map(|(k, _)| k.clone())
        .find(|k| k.as_str().starts_with("portrait"))
        .unwrap();
    let mut record = ws.snapshot_context(&tablet).unwrap();
    let original = ws.snapshots_for_context(&tablet).to_vec();

    // Mutating the copy leaves the workspace alone.
    record.viewport_snapshots[0].fractional_rect = Some(FractionalRect::new(0.0, 0.0, 0.5, 0.5));
    record.minimum_viewport_width = 123.0;
    assert_eq!(ws.snapshots_for_context(&tablet), original.as_slice());

    // And after restoring, mutating the copy again does not leak back.
    ws.restore_context(record.clone()).unwrap();
    record.viewport_snapshots.clear();
    let restored = ws.snapshots_for_context(&tablet);
    assert_eq!(restored.len(), 1);
    assert_eq!(
        restored[0].fractional_rect,
        Some(FractionalRect::new(0.0, 0.0, 0.5, 0.5))
    );
    assert_eq!(
        ws.contexts().entry(&tablet).unwrap().minimum_viewport.width,
        123.0
    );

    ws.set_surface(TABLET).unwrap();
    assert_eq!(
        ws.viewports()[0].absolute_rect(),
        ScreenRect::new(0.0, 0.0, 400.0, 600.0)
    );
}

#[test]
fn restoring_the_live_context_is_rejected() {
    let mut ws = populated();
    let desktop = ws.current_context().unwrap().key();
    let record = ws.snapshot_context(&desktop).unwrap();
    let err = ws.restore_context(record).unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Layout(LayoutError::UnsupportedOperation { .. })
    ));
}

#[test]
fn invalid_document_is_rejected() {
    let mut document = populated().to_document();
    document.workspace_contexts[0].viewport_snapshots[1].id = ViewportId::new("vp-1");
    let err = Workspace::from_document(document, WorkspaceConfig::default()).unwrap_err();
    assert!(matches!(err, DocumentError::DuplicateViewport { .. }));
}

#[test]
fn unknown_context_snapshot_is_not_found() {
    let ws = populated();
    let err = ws
        .snapshot_context(&"landscape-sm-1x1".into())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
