//! In-place layout edits on existing documents.
//!
//! Rewrites the `spatial` metadata of one cell, or of every cell, without
//! re-exporting the workspace. When an edited cell renders a window, the
//! matching entry in the structured window list moves with it so a later
//! restore sees the new placement.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};
use sws_model::WindowPosition;

use crate::error::{DocumentError, Result};
use crate::metadata::{ExportMetadata, fingerprint};
use crate::notebook::{Cell, Notebook, SPATIAL_CELL_KEY, WINDOW_CELL_KEY};
use crate::store::DocumentStore;

/// Which cells a layout edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialTarget {
    /// One cell, by its index in the notebook.
    Cell(usize),
    AllCells,
}

/// What a layout edit changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpatialUpdate {
    pub total_cells: usize,
    pub updated_cells: usize,
    /// Structured window entries whose position followed their cell.
    pub updated_windows: usize,
}

/// Cell-metadata form of a placement. `depth` is omitted when absent.
pub fn spatial_value(position: &WindowPosition) -> Value {
    let mut spatial: BTreeMap<&str, Value> = BTreeMap::new();
    spatial.insert("x", json!(position.x));
    spatial.insert("y", json!(position.y));
    spatial.insert("z", json!(position.z));
    spatial.insert("width", json!(position.width));
    spatial.insert("height", json!(position.height));
    if let Some(depth) = position.depth {
        spatial.insert("depth", json!(depth));
    }
    json!(spatial)
}

/// Set the `spatial` metadata of the targeted cells and return the new bytes.
pub fn update_spatial_metadata(
    bytes: &[u8],
    target: SpatialTarget,
    position: &WindowPosition,
) -> Result<(Vec<u8>, SpatialUpdate)> {
    if let Some(problem) = position.problem() {
        return Err(DocumentError::InvalidSpatial {
            reason: format!("placement {problem}"),
        });
    }

    let mut notebook = Notebook::decode(bytes)?;
    // Refuse to touch extension blocks this reader cannot interpret.
    if let Some(extension) = &notebook.metadata.workspace_export {
        ExportMetadata::from_value(extension)?;
    }

    let total_cells = notebook.cells.len();
    let indices = match target {
        SpatialTarget::Cell(index) if index < total_cells => index..index + 1,
        SpatialTarget::Cell(index) => {
            return Err(DocumentError::CellOutOfRange {
                index,
                total: total_cells,
            });
        }
        SpatialTarget::AllCells => 0..total_cells,
    };

    let spatial = spatial_value(position);
    let mut window_ids = Vec::new();
    for cell in &mut notebook.cells[indices] {
        if let Some(id) = window_id(cell) {
            window_ids.push(id);
        }
        cell.metadata_mut()
            .insert(SPATIAL_CELL_KEY.to_string(), spatial.clone());
    }

    let updated_windows = move_window_entries(&mut notebook, &window_ids, position)?;
    let update = SpatialUpdate {
        total_cells,
        updated_cells: match target {
            SpatialTarget::Cell(_) => 1,
            SpatialTarget::AllCells => total_cells,
        },
        updated_windows,
    };
    tracing::info!(
        cells = update.updated_cells,
        windows = update.updated_windows,
        "spatial metadata updated"
    );
    Ok((notebook.encode()?, update))
}

fn window_id(cell: &Cell) -> Option<u64> {
    cell.metadata()
        .get(WINDOW_CELL_KEY)?
        .get("id")?
        .as_u64()
}

fn move_window_entries(
    notebook: &mut Notebook,
    ids: &[u64],
    position: &WindowPosition,
) -> Result<usize> {
    let Some(extension) = notebook.metadata.workspace_export.as_mut() else {
        return Ok(0);
    };
    if ids.is_empty() {
        return Ok(0);
    }

    let placement = serde_json::to_value(position).map_err(|e| DocumentError::Serialization {
        source: Box::new(e),
    })?;
    let has_fingerprint = extension.get("fingerprint").is_some();
    let Some(windows) = extension.get_mut("windows").and_then(Value::as_array_mut) else {
        return Ok(0);
    };

    let mut moved = 0;
    for entry in windows.iter_mut() {
        let matches = entry
            .get("id")
            .and_then(Value::as_u64)
            .is_some_and(|id| ids.contains(&id));
        if !matches {
            continue;
        }
        if let Some(fields) = entry.as_object_mut() {
            fields.insert("position".to_string(), placement.clone());
            moved += 1;
        }
    }

    if moved > 0 && has_fingerprint {
        let digest = fingerprint(windows)?;
        extension["fingerprint"] = Value::String(digest);
    }
    Ok(moved)
}

/// Apply a layout edit to a stored document and write it back under `name`.
pub fn update_stored_spatial<S>(
    store: &S,
    name: &str,
    target: SpatialTarget,
    position: &WindowPosition,
) -> Result<SpatialUpdate>
where
    S: DocumentStore + ?Sized,
{
    let bytes = store.read(name)?;
    let (updated, update) = update_spatial_metadata(&bytes, target, position)?;
    store.write(name, &updated)?;
    Ok(update)
}

/// [`update_stored_spatial`] on the blocking pool.
pub async fn update_stored_spatial_async<S>(
    store: Arc<S>,
    name: String,
    target: SpatialTarget,
    position: WindowPosition,
) -> Result<SpatialUpdate>
where
    S: DocumentStore + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || update_stored_spatial(&*store, &name, target, &position))
        .await
        .map_err(|e| DocumentError::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use sws_model::{Registry, WindowKind};

    use crate::export::{DocumentExporter, ExportOptions};
    use crate::import::parse;
    use crate::store::MemoryDocumentStore;

    fn exported(kinds: &[WindowKind]) -> Vec<u8> {
        let mut registry = Registry::new();
        for &kind in kinds {
            registry.create_window(kind);
        }
        DocumentExporter::new()
            .export(&registry.snapshot(), &ExportOptions::default())
            .unwrap()
    }

    fn spatial_of(bytes: &[u8], index: usize) -> Option<Value> {
        Notebook::decode(bytes).unwrap().cells[index]
            .metadata()
            .get(SPATIAL_CELL_KEY)
            .cloned()
    }

    #[test]
    fn test_single_cell_update_moves_its_window() {
        let bytes = exported(&[WindowKind::Chart, WindowKind::PointCloud]);
        // Cell 0 is the summary; cells 1 and 2 render windows 1 and 2.
        let position = WindowPosition::at(5.0, -2.0, 1.0).with_size(320.0, 240.0);

        let (updated, report) =
            update_spatial_metadata(&bytes, SpatialTarget::Cell(2), &position).unwrap();
        assert_eq!(report.updated_cells, 1);
        assert_eq!(report.updated_windows, 1);
        assert_eq!(spatial_of(&updated, 2), Some(spatial_value(&position)));
        assert_ne!(spatial_of(&updated, 1), Some(spatial_value(&position)));

        let outcome = parse(&updated).unwrap();
        assert_eq!(outcome.failed_count(), 0);
        assert_eq!(outcome.candidates[1].record.position, position);
        assert_ne!(outcome.candidates[0].record.position, position);
    }

    #[test]
    fn test_all_cells_update_refreshes_fingerprint() {
        let bytes = exported(&[WindowKind::Chart, WindowKind::Model3D]);
        let before = parse(&bytes).unwrap().export.unwrap().fingerprint;
        let position = WindowPosition::at(0.0, 0.0, -3.0).with_depth(2.0);

        let (updated, report) =
            update_spatial_metadata(&bytes, SpatialTarget::AllCells, &position).unwrap();
        assert_eq!(report.updated_cells, report.total_cells);
        assert_eq!(report.updated_windows, 2);
        for index in 0..report.total_cells {
            assert_eq!(spatial_of(&updated, index), Some(spatial_value(&position)));
        }

        let export = parse(&updated).unwrap().export.unwrap();
        assert!(export.fingerprint.is_some());
        assert_ne!(export.fingerprint, before);
    }

    #[test]
    fn test_foreign_notebook_only_gains_cell_metadata() {
        let mut notebook = Notebook::new();
        notebook.cells.push(Cell::markdown("intro", "# Notes"));
        let bytes = notebook.encode().unwrap();

        let (updated, report) =
            update_spatial_metadata(&bytes, SpatialTarget::Cell(0), &WindowPosition::default())
                .unwrap();
        assert_eq!(report.updated_windows, 0);
        let decoded = Notebook::decode(&updated).unwrap();
        assert!(decoded.metadata.workspace_export.is_none());
        assert!(decoded.cells[0].metadata().contains_key(SPATIAL_CELL_KEY));
    }

    #[test]
    fn test_rejects_out_of_range_cell_and_bad_placement() {
        let bytes = exported(&[WindowKind::Chart]);
        let err = update_spatial_metadata(&bytes, SpatialTarget::Cell(9), &WindowPosition::default())
            .unwrap_err();
        assert!(matches!(err, DocumentError::CellOutOfRange { index: 9, total: 2 }));

        let bad = WindowPosition::default().with_size(-1.0, 10.0);
        let err = update_spatial_metadata(&bytes, SpatialTarget::AllCells, &bad).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidSpatial { .. }));
    }

    #[test]
    fn test_stored_document_is_rewritten() {
        let store = MemoryDocumentStore::new();
        store.write("layout", &exported(&[WindowKind::Chart])).unwrap();
        let position = WindowPosition::at(1.0, 1.0, 1.0);

        let report =
            update_stored_spatial(&store, "layout", SpatialTarget::Cell(1), &position).unwrap();
        assert_eq!(report.updated_windows, 1);

        let outcome = parse(&store.read("layout").unwrap()).unwrap();
        assert_eq!(outcome.candidates[0].record.position, position);
    }

    #[test]
    fn test_missing_stored_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = update_stored_spatial(&store, "nope", SpatialTarget::AllCells, &WindowPosition::default())
            .unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }
}
