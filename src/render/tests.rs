use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use serde_json::json;

use super::*;
use crate::scene::ObjectId;
use crate::testing::{FakeRuntime, wait_until};

fn entries() -> RenderEntries {
    RenderEntries {
        canvas_id: "canvas-1".into(),
        draw_module: "webgpu.pyodide_code".into(),
        default_draw: "draw_mesh".into(),
        user_function: "webgpu.main.user_function".into(),
        call_timeout: Duration::from_secs(5),
    }
}

fn bridge(runtime: &Arc<FakeRuntime>, gate: &RuntimeGate) -> RenderBridge<FakeRuntime> {
    RenderBridge::new(Arc::clone(runtime), gate.clone(), entries())
}

#[test]
fn test_draw_entry_resolution() {
    let runtime = Arc::new(FakeRuntime::new());
    let bridge = bridge(&runtime, &RuntimeGate::new());

    assert_eq!(
        bridge.draw_entry(&json!({})).unwrap(),
        "webgpu.pyodide_code.draw_mesh"
    );
    assert_eq!(
        bridge.draw_entry(&json!({"run_function": "draw_cf"})).unwrap(),
        "webgpu.pyodide_code.draw_cf"
    );
    assert_eq!(
        bridge.draw_entry(&json!({"run_function": null})).unwrap(),
        "webgpu.pyodide_code.draw_mesh"
    );
    assert!(matches!(
        bridge.draw_entry(&json!({"run_function": "os.system"})),
        Err(RenderError::InvalidSelector(_))
    ));
    assert!(matches!(
        bridge.draw_entry(&json!({"run_function": 3})),
        Err(RenderError::InvalidSelector(_))
    ));
}

#[tokio::test]
async fn test_draw_passes_canvas_and_frame() {
    let runtime = Arc::new(FakeRuntime::new());
    let bridge = bridge(&runtime, &RuntimeGate::new());

    let mut registry = ObjectRegistry::new();
    registry
        .create(ObjectId::from("g"), "group", None, vec![])
        .unwrap();
    registry
        .create(ObjectId::from("m"), "mesh", Some(ObjectId::from("g")), vec![json!(7)])
        .unwrap();
    registry
        .create(ObjectId::from("hidden"), "mesh", None, vec![])
        .unwrap();
    registry.set_visible(&ObjectId::from("hidden"), false).unwrap();
    registry
        .move_to(&ObjectId::from("g"), Vec3::new(1.0, 2.0, 3.0))
        .unwrap();

    bridge
        .draw(json!({"mesh": "data"}), &registry, Viewport::new(640, 480))
        .await
        .unwrap();

    let calls = runtime.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].entry, "webgpu.pyodide_code.draw_mesh");
    assert_eq!(calls[0].args[0], json!("canvas-1"));

    let payload = &calls[0].args[1];
    assert_eq!(payload["mesh"], json!("data"));
    assert_eq!(payload["scene"]["viewport"], json!({"width": 640, "height": 480}));

    let objects = payload["scene"]["objects"].as_array().unwrap();
    let ids: Vec<_> = objects.iter().map(|o| o["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["g", "m"]);
    assert_eq!(objects[1]["type"], json!("mesh"));
    assert_eq!(objects[1]["args"], json!([7]));
    // Translation column of the child's world matrix comes from its parent.
    assert_eq!(objects[1]["world"][12], json!(1.0));
    assert_eq!(objects[1]["world"][14], json!(3.0));
}

#[tokio::test]
async fn test_non_object_data_is_wrapped() {
    let runtime = Arc::new(FakeRuntime::new());
    let bridge = bridge(&runtime, &RuntimeGate::new());

    bridge
        .draw(json!([1, 2]), &ObjectRegistry::new(), Viewport::default())
        .await
        .unwrap();

    let payload = &runtime.calls()[0].args[1];
    assert_eq!(payload["data"], json!([1, 2]));
    assert_eq!(payload["scene"]["objects"], json!([]));
}

#[tokio::test]
async fn test_user_function_gets_data_unchanged() {
    let runtime = Arc::new(FakeRuntime::new());
    let bridge = bridge(&runtime, &RuntimeGate::new());

    bridge.run_user_function(json!({"k": 1})).await.unwrap();

    let calls = runtime.calls();
    assert_eq!(calls[0].entry, "webgpu.main.user_function");
    assert_eq!(calls[0].args, vec![json!({"k": 1})]);
}

#[tokio::test]
async fn test_runtime_error_is_surfaced() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.fail_next(1);
    let bridge = bridge(&runtime, &RuntimeGate::new());

    let err = bridge.run_user_function(json!(null)).await.unwrap_err();
    assert!(matches!(err, RenderError::Runtime(RuntimeError::Failed { .. })));
}

#[tokio::test]
async fn test_draw_timeout() {
    let runtime = Arc::new(FakeRuntime::with_delay(Duration::from_millis(500)));
    let bridge = RenderBridge::new(
        Arc::clone(&runtime),
        RuntimeGate::new(),
        RenderEntries {
            call_timeout: Duration::from_millis(20),
            ..entries()
        },
    );

    let err = bridge
        .draw(json!({}), &ObjectRegistry::new(), Viewport::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Timeout { ref entry, .. } if entry.ends_with("draw_mesh")));
}

#[tokio::test]
async fn test_draw_waits_for_reinitialization() {
    let runtime = Arc::new(FakeRuntime::new());
    let gate = RuntimeGate::new();
    let bridge = Arc::new(bridge(&runtime, &gate));

    let exclusive = gate.exclusive().await;
    let draw = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.run_user_function(json!(1)).await }
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(runtime.calls().is_empty());

    drop(exclusive);
    draw.await.unwrap().unwrap();
    wait_until(|| runtime.calls().len() == 1).await;
}

#[test]
fn test_viewport_aspect() {
    assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
    assert_eq!(Viewport::new(800, 0).aspect(), 1.0);
}
