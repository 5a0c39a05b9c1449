use layers::{Layer, LayerHandle, Pane, WATER_BOOST_CLASS};
use pretty_assertions::assert_eq;
use runtime::headless::{Harness, StaticControls, SurfaceOp};
use runtime::{RefreshPolicy, SyncError, ViewerConfig};

const Y2016: &str = "s2cloudless-2016_3857";
const Y2018: &str = "s2cloudless-2018_3857";
const Y2020: &str = "s2cloudless-2020_3857";
const Y2023: &str = "s2cloudless-2023_3857";

fn start() -> Harness {
    Harness::start(&ViewerConfig::default()).unwrap()
}

fn handle_in(h: &Harness, pane: Pane) -> LayerHandle {
    h.engine.layers().get(pane).unwrap().handle()
}

fn layer_id_in(h: &Harness, pane: Pane) -> String {
    let attached = h.surface.layers_in(pane);
    assert_eq!(attached.len(), 1, "exactly one layer in {pane}");
    attached[0].layer_id.clone()
}

fn class_name(h: &Harness, pane: Pane) -> String {
    h.surface.pane(pane).unwrap().classes.to_class_name()
}

fn assert_one_layer_per_pane(h: &Harness) {
    assert_eq!(h.surface.layers_in(Pane::Bottom).len(), 1);
    assert_eq!(h.surface.layers_in(Pane::Top).len(), 1);
    assert_eq!(h.surface.attached_count(), 2);
}

fn assert_removes_precede_adds(ops: &[SurfaceOp]) {
    let last_remove = ops
        .iter()
        .rposition(|op| matches!(op, SurfaceOp::RemoveLayer { .. }));
    let first_add = ops
        .iter()
        .position(|op| matches!(op, SurfaceOp::AddLayer { .. }));
    if let (Some(r), Some(a)) = (last_remove, first_add) {
        assert!(r < a, "layer attached before old layers were removed: {ops:?}");
    }
}

#[test]
fn initial_load_selects_defaults_and_attaches_both() {
    let h = start();

    assert_eq!(h.controls.bottom, Y2018);
    assert_eq!(h.controls.top, Y2023);
    let labels: Vec<&str> = h.controls.top_options.iter().map(|y| y.label.as_str()).collect();
    assert_eq!(labels, vec!["2023", "2021", "2020", "2019", "2018", "2016"]);
    assert_eq!(h.controls.bottom_options, h.controls.top_options);

    assert_one_layer_per_pane(&h);
    assert_eq!(layer_id_in(&h, Pane::Bottom), Y2018);
    assert_eq!(layer_id_in(&h, Pane::Top), Y2023);

    let top = h.surface.pane(Pane::Top).unwrap();
    assert_eq!(top.opacity.as_deref(), Some("0.5"));
    assert_eq!(top.z_index, 210);
    let bottom = h.surface.pane(Pane::Bottom).unwrap();
    assert_eq!(bottom.opacity, None);
    assert_eq!(bottom.z_index, 200);

    assert_eq!(
        class_name(&h, Pane::Bottom),
        "leaflet-pane pane-bottom mode-true-color"
    );
    assert_eq!(class_name(&h, Pane::Top), "leaflet-pane pane-top mode-true-color");
}

#[test]
fn bootstrap_creates_panes_before_first_layer() {
    let h = start();
    let ops = h.surface.ops();
    assert_eq!(
        &ops[..2],
        &[
            SurfaceOp::CreatePane { pane: Pane::Bottom, z_index: 200 },
            SurfaceOp::SetClasses {
                pane: Pane::Bottom,
                class_name: "leaflet-pane pane-bottom".to_string()
            },
        ]
    );
    assert!(!ops.iter().any(|op| matches!(op, SurfaceOp::RemoveLayer { .. })));
    assert_eq!(
        ops.last(),
        Some(&SurfaceOp::SetOpacity { pane: Pane::Top, value: "0.5".to_string() })
    );
}

#[test]
fn changing_top_year_replaces_layers_in_order() {
    let mut h = start();
    let old_bottom = handle_in(&h, Pane::Bottom);
    let old_top = handle_in(&h, Pane::Top);
    h.surface.take_ops();

    h.controls.select_top(Y2020);
    assert_eq!(h.pump().unwrap(), 1);

    let new_bottom = handle_in(&h, Pane::Bottom);
    let new_top = handle_in(&h, Pane::Top);
    assert_eq!(
        h.surface.take_ops(),
        vec![
            SurfaceOp::SetClasses {
                pane: Pane::Bottom,
                class_name: "leaflet-pane pane-bottom mode-true-color".to_string()
            },
            SurfaceOp::SetZIndex { pane: Pane::Bottom, z_index: 200 },
            SurfaceOp::SetClasses {
                pane: Pane::Top,
                class_name: "leaflet-pane pane-top mode-true-color".to_string()
            },
            SurfaceOp::SetZIndex { pane: Pane::Top, z_index: 210 },
            SurfaceOp::RemoveLayer { handle: old_bottom },
            SurfaceOp::RemoveLayer { handle: old_top },
            SurfaceOp::AddLayer {
                handle: new_bottom,
                pane: Pane::Bottom,
                layer_id: Y2018.to_string()
            },
            SurfaceOp::AddLayer {
                handle: new_top,
                pane: Pane::Top,
                layer_id: Y2020.to_string()
            },
            SurfaceOp::SetOpacity { pane: Pane::Top, value: "0.5".to_string() },
        ]
    );
    assert_ne!(new_top, old_top);
    assert_eq!(layer_id_in(&h, Pane::Bottom), Y2018);
    assert_eq!(layer_id_in(&h, Pane::Top), Y2020);
}

#[test]
fn dragging_opacity_only_touches_top_pane() {
    let mut h = start();
    let bottom = handle_in(&h, Pane::Bottom);
    let top = handle_in(&h, Pane::Top);
    h.surface.take_ops();

    h.controls.drag_opacity("0.3");
    h.pump().unwrap();

    assert_eq!(
        h.surface.take_ops(),
        vec![SurfaceOp::SetOpacity { pane: Pane::Top, value: "0.3".to_string() }]
    );
    assert_eq!(handle_in(&h, Pane::Bottom), bottom);
    assert_eq!(handle_in(&h, Pane::Top), top);
    assert_eq!(h.surface.pane(Pane::Bottom).unwrap().opacity, None);
}

#[test]
fn every_slider_position_is_applied() {
    let mut h = start();
    h.surface.take_ops();
    for v in ["0.4", "0.3", "0.2"] {
        h.controls.drag_opacity(v);
    }
    h.controls.commit_opacity("0.1");
    assert_eq!(h.pump().unwrap(), 4);

    let written: Vec<String> = h
        .surface
        .take_ops()
        .into_iter()
        .map(|op| match op {
            SurfaceOp::SetOpacity { pane: Pane::Top, value } => value,
            other => panic!("unexpected op {other:?}"),
        })
        .collect();
    assert_eq!(written, vec!["0.4", "0.3", "0.2", "0.1"]);
}

#[test]
fn water_boost_rebuilds_both_layers() {
    let mut h = start();
    let bottom = handle_in(&h, Pane::Bottom);
    let top = handle_in(&h, Pane::Top);

    h.controls.set_water_boost(true);
    h.pump().unwrap();

    for pane in Pane::ALL {
        assert!(h.surface.pane(pane).unwrap().classes.contains(WATER_BOOST_CLASS));
    }
    assert_ne!(handle_in(&h, Pane::Bottom), bottom);
    assert_ne!(handle_in(&h, Pane::Top), top);
    assert_eq!(layer_id_in(&h, Pane::Bottom), Y2018);
    assert_eq!(layer_id_in(&h, Pane::Top), Y2023);

    h.controls.set_water_boost(false);
    h.pump().unwrap();
    for pane in Pane::ALL {
        assert!(!h.surface.pane(pane).unwrap().classes.contains(WATER_BOOST_CLASS));
    }
}

#[test]
fn any_sequence_keeps_one_layer_per_pane() {
    let mut h = start();
    h.controls.select_bottom(Y2016);
    h.controls.select_mode("mode-water");
    h.controls.drag_opacity("0.8");
    h.controls.set_water_boost(true);
    h.controls.select_top(Y2016);
    h.controls.select_bottom(Y2020);

    while let Some(event) = h.queue.pop() {
        h.surface.take_ops();
        h.engine
            .handle(event, &h.controls, &mut h.surface)
            .unwrap();
        assert_one_layer_per_pane(&h);
        assert_removes_precede_adds(h.surface.ops());
    }

    assert_eq!(
        class_name(&h, Pane::Top),
        "leaflet-pane pane-top mode-water water-boost-on"
    );
    assert_eq!(h.surface.pane(Pane::Top).unwrap().opacity.as_deref(), Some("0.8"));
}

#[test]
fn identical_years_are_allowed() {
    let mut h = start();
    h.controls.select_top(Y2018);
    h.pump().unwrap();
    assert_one_layer_per_pane(&h);
    assert_eq!(layer_id_in(&h, Pane::Bottom), layer_id_in(&h, Pane::Top));
}

#[test]
fn legacy_year_uses_reduced_native_zoom() {
    let mut h = start();
    h.controls.select_bottom(Y2016);
    h.pump().unwrap();
    let bottom = h.engine.layers().get(Pane::Bottom).unwrap();
    assert_eq!(bottom.options.max_native_zoom, 8);
    assert_eq!(bottom.options.max_zoom, 19);
    let top = h.engine.layers().get(Pane::Top).unwrap();
    assert_eq!(top.options.max_native_zoom, 12);
}

#[test]
fn unknown_layer_id_degrades_silently() {
    let mut h = start();
    h.controls.select_top("not-in-catalog");
    h.pump().unwrap();
    let top = h.engine.layers().get(Pane::Top).unwrap();
    assert!(top.url_template.contains("/not-in-catalog/"));
    assert_eq!(top.options.max_native_zoom, 12);
}

#[test]
fn unparseable_opacity_falls_back_to_opaque() {
    let mut h = start();
    h.controls.drag_opacity("");
    h.pump().unwrap();
    assert_eq!(h.surface.pane(Pane::Top).unwrap().opacity.as_deref(), Some("1"));
}

#[test]
fn refresh_reapplies_current_opacity() {
    let mut h = start();
    h.controls.drag_opacity("0.2");
    h.controls.select_bottom(Y2020);
    h.pump().unwrap();
    assert_eq!(
        h.surface.ops().last(),
        Some(&SurfaceOp::SetOpacity { pane: Pane::Top, value: "0.2".to_string() })
    );
}

#[test]
fn split_style_policy_keeps_layers_on_style_changes() {
    let config = ViewerConfig {
        refresh_policy: RefreshPolicy::SplitStyle,
        ..ViewerConfig::default()
    };
    let mut h = Harness::start(&config).unwrap();
    let bottom = handle_in(&h, Pane::Bottom);
    let top = handle_in(&h, Pane::Top);
    h.surface.take_ops();

    h.controls.set_water_boost(true);
    h.controls.select_mode("mode-high-contrast");
    h.pump().unwrap();

    let ops = h.surface.take_ops();
    assert!(!ops.iter().any(|op| matches!(
        op,
        SurfaceOp::AddLayer { .. } | SurfaceOp::RemoveLayer { .. }
    )));
    assert_eq!(handle_in(&h, Pane::Bottom), bottom);
    assert_eq!(handle_in(&h, Pane::Top), top);
    assert_eq!(
        class_name(&h, Pane::Bottom),
        "leaflet-pane pane-bottom mode-high-contrast water-boost-on"
    );
    assert_eq!(h.engine.trace().count("restyle"), 2);

    // Year changes still rebuild under the split policy.
    h.controls.select_top(Y2020);
    h.pump().unwrap();
    assert_ne!(handle_in(&h, Pane::Top), top);
    assert_eq!(layer_id_in(&h, Pane::Top), Y2020);
}

#[test]
fn page_defined_mode_is_kept() {
    let mut controls = StaticControls::new();
    controls.mode = "mode-custom".to_string();
    controls.mode_options = vec!["mode-custom".to_string()];
    let h = Harness::start_with(&ViewerConfig::default(), controls).unwrap();
    assert_eq!(h.controls.mode_options, vec!["mode-custom"]);
    assert_eq!(class_name(&h, Pane::Top), "leaflet-pane pane-top mode-custom");
}

#[test]
fn custom_catalog_from_config() {
    let config = ViewerConfig::from_json(
        r#"{
            "catalog": [
                {"label": "2024", "layer_id": "s2cloudless-2024_3857"},
                {"label": "2022", "layer_id": "s2cloudless-2022_3857"}
            ],
            "default_top": "s2cloudless-2024_3857"
        }"#,
    )
    .unwrap();
    let h = Harness::start(&config).unwrap();
    // The 2018 default is missing, so the bottom falls back to the middle entry.
    assert_eq!(h.controls.bottom, "s2cloudless-2022_3857");
    assert_eq!(h.controls.top, "s2cloudless-2024_3857");
    assert_one_layer_per_pane(&h);
}

#[test]
fn trace_records_each_sync_step() {
    let mut h = start();
    h.controls.drag_opacity("0.9");
    h.controls.select_top(Y2020);
    h.pump().unwrap();
    let trace = h.engine.trace();
    assert_eq!(trace.count("panes"), 1);
    assert_eq!(trace.count("refresh"), 2);
    assert_eq!(trace.count("opacity"), 3);
}

#[test]
fn invalid_config_is_rejected_before_touching_the_surface() {
    let mut config = ViewerConfig::default();
    config.panes.top_z = 100;
    let err = Harness::start(&config).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
}
