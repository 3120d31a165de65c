use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use sws_document::{DocumentExporter, ExportMetadata, ExportOptions, Notebook, analyze, parse};
use sws_model::{
    ChartSeries, ChartStyle, CloudPoint, MeshBuffer, MetricMap, PointCloudSamples, Registry,
    RegistrySnapshot, TableFrame, WindowId, WindowKind, WindowPayload, WindowPosition,
    WindowRecord,
};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
}

fn kind_strategy() -> impl Strategy<Value = WindowKind> {
    prop::sample::select(WindowKind::ALL.to_vec())
}

fn position_strategy() -> impl Strategy<Value = WindowPosition> {
    (
        -1.0e4..1.0e4f64,
        -1.0e4..1.0e4f64,
        -1.0e4..1.0e4f64,
        0.0..4096.0f64,
        0.0..4096.0f64,
        prop::option::of(0.0..2048.0f64),
    )
        .prop_map(|(x, y, z, width, height, depth)| WindowPosition {
            x,
            y,
            z,
            width,
            height,
            depth,
        })
}

fn record_strategy() -> impl Strategy<Value = (WindowKind, WindowPosition, BTreeSet<String>, String)> {
    (
        kind_strategy(),
        position_strategy(),
        prop::collection::btree_set("[a-z]{1,8}", 0..4),
        "\\PC{0,64}",
    )
}

fn payload_for(kind: WindowKind) -> Option<WindowPayload> {
    match kind {
        WindowKind::Chart => Some(WindowPayload::Chart(ChartSeries::new(
            ChartStyle::Scatter,
            vec![0.0, 1.0, 2.0],
            vec![0.5, 1.5, 2.5],
        ))),
        WindowKind::TabularFrame => Some(WindowPayload::TabularFrame(TableFrame::new(
            vec!["name".into(), "value".into()],
            vec![vec!["a".into(), "1".into()]],
        ))),
        WindowKind::ScalarMetrics => Some(WindowPayload::ScalarMetrics(
            [("accuracy".to_string(), 0.91)].into_iter().collect::<MetricMap>(),
        )),
        WindowKind::PointCloud => {
            let mut lit = CloudPoint::new(0.25, -1.5, 3.0);
            lit.intensity = Some(0.7);
            lit.color = Some("#ff8800".into());
            Some(WindowPayload::PointCloud(PointCloudSamples {
                title: Some("scan".into()),
                generator: Some("sphere".into()),
                points: vec![CloudPoint::new(1.0, 2.0, 3.0), lit],
                parameters: [("radius".to_string(), 1.5)].into_iter().collect(),
            }))
        }
        WindowKind::Model3D => Some(WindowPayload::Model3D(MeshBuffer {
            title: Some("tetra".into()),
            vertices: vec![
                [0.0, 0.0, 0.0],
                [0.1, 0.0, 0.0],
                [0.0, 0.3, 0.0],
                [0.0, 0.0, -1.7],
            ],
            faces: vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
        })),
        WindowKind::SpatialEditor => None,
    }
}

fn build_snapshot(
    specs: Vec<(WindowKind, WindowPosition, BTreeSet<String>, String)>,
) -> RegistrySnapshot {
    let mut registry = Registry::new();
    for (kind, position, tags, content) in specs {
        let id = registry.allocate_id();
        let mut record = WindowRecord::new(id, kind)
            .with_position(position)
            .with_content(content);
        record.tags = tags;
        if let Some(payload) = payload_for(kind) {
            record.set_payload(payload).unwrap();
        }
        registry.insert(record).unwrap();
    }
    registry.snapshot()
}

proptest! {
    #[test]
    fn parse_of_export_preserves_windows(specs in prop::collection::vec(record_strategy(), 0..12)) {
        let snapshot = build_snapshot(specs);
        let bytes = DocumentExporter::new()
            .export(&snapshot, &ExportOptions::default())
            .unwrap();
        let outcome = parse(&bytes).unwrap();

        prop_assert_eq!(outcome.failed_count(), 0);
        prop_assert_eq!(outcome.candidates.len(), snapshot.len());
        for (original, candidate) in snapshot.windows.iter().zip(&outcome.candidates) {
            let restored = &candidate.record;
            prop_assert_eq!(restored.id, original.id);
            prop_assert_eq!(restored.kind, original.kind);
            prop_assert!(restored.position.approx_eq(&original.position, 1e-9));
            prop_assert_eq!(&restored.tags, &original.tags);
            prop_assert_eq!(&restored.content, &original.content);
            prop_assert_eq!(&restored.payload, &original.payload);
        }
    }
}

#[test]
fn single_tabular_window_round_trip() {
    let mut registry = Registry::new();
    let id = registry.create_window(WindowKind::TabularFrame);
    registry.update(id, |w| w.add_tag("demo")).unwrap();

    let options = ExportOptions {
        include_debug_info: false,
        ..Default::default()
    };
    let bytes = DocumentExporter::new()
        .export(&registry.snapshot(), &options)
        .unwrap();
    let outcome = parse(&bytes).unwrap();

    assert_eq!(outcome.candidates.len(), 1);
    let record = &outcome.candidates[0].record;
    assert_eq!(record.id, WindowId(1));
    assert_eq!(record.kind, WindowKind::TabularFrame);
    assert_eq!(record.tags, BTreeSet::from(["demo".to_string()]));
}

#[test]
fn re_export_produces_identical_structured_metadata() {
    let mut registry = Registry::new();
    let chart = registry.create_window(WindowKind::Chart);
    registry.create_window(WindowKind::PointCloud);
    registry
        .update(chart, |w| w.set_content("plot(a, b)"))
        .unwrap();
    let snapshot = registry.snapshot();

    let exporter = DocumentExporter::new();
    let options = ExportOptions {
        include_debug_info: true,
        ..Default::default()
    };
    let first = exporter.export(&snapshot, &options).unwrap();
    let second = exporter.export(&snapshot, &options).unwrap();

    let structured = |bytes: &[u8]| {
        let notebook = Notebook::decode(bytes).unwrap();
        let raw = notebook.metadata.workspace_export.unwrap();
        ExportMetadata::from_value(&raw).unwrap()
    };
    let (a, b) = (structured(&first), structured(&second));
    assert_eq!(a.windows, b.windows);
    assert_eq!(a.window_types, b.window_types);
    assert_eq!(a.tags, b.tags);
    assert_eq!(a.fingerprint, b.fingerprint);
    assert!(a.fingerprint.is_some());

    // With a fixed clock the whole document is byte-identical.
    let options = ExportOptions::default();
    assert_eq!(
        exporter.export_at(&snapshot, &options, fixed_time()).unwrap(),
        exporter.export_at(&snapshot, &options, fixed_time()).unwrap()
    );
}

#[test]
fn analyze_summarizes_own_export() {
    let mut registry = Registry::new();
    registry.create_window(WindowKind::Chart);
    registry.create_window(WindowKind::Chart);
    registry.create_window(WindowKind::Model3D);

    let options = ExportOptions {
        include_debug_info: true,
        ..Default::default()
    };
    let bytes = DocumentExporter::new()
        .export_at(&registry.snapshot(), &options, fixed_time())
        .unwrap();
    let summary = analyze(&bytes).unwrap();

    assert!(!summary.is_foreign());
    assert_eq!(summary.total_cells, 5);
    assert_eq!(summary.window_cell_count, 3);
    assert_eq!(
        summary.kinds,
        BTreeSet::from([WindowKind::Chart, WindowKind::Model3D])
    );
    let export = summary.export.unwrap();
    assert_eq!(export.total_windows, 3);
    assert_eq!(export.export_date, fixed_time());
    assert!(export.debug.is_some());
}
