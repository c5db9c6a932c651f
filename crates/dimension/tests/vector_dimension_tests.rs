//! Tests for vector dimensions: construction, views, range queries and records.

use std::cell::Cell;
use std::rc::Rc;

use dimension::{
    DimensionError, DimensionLoader, FieldValue, Loaded, Result, VectorDimension,
};
use test_utils::{assert_approx_eq, init_tracing};

fn bounded() -> VectorDimension<f64> {
    VectorDimension::builder()
        .name("lon")
        .values(vec![0.0, 5.0, 10.0])
        .bounds(vec![(-2.5, 2.5), (2.5, 7.5), (7.5, 12.5)])
        .build()
        .unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_bounds_without_values() {
    let result = VectorDimension::<f64>::builder()
        .bounds(vec![(0.0, 1.0)])
        .build();
    assert!(matches!(result, Err(DimensionError::BoundsWithoutValue)));
}

#[test]
fn test_nothing_to_build() {
    let result = VectorDimension::<f64>::builder().name("empty").build();
    assert!(matches!(result, Err(DimensionError::Empty)));
}

#[test]
fn test_bounds_length_checked() {
    let result = VectorDimension::builder()
        .values(vec![1.0, 2.0])
        .bounds(vec![(0.5, 1.5)])
        .build();
    assert!(matches!(
        result,
        Err(DimensionError::LengthMismatch { expected: 2, found: 1, .. })
    ));
}

#[test]
fn test_default_uids_start_at_one() {
    let dim = bounded();
    assert_eq!(dim.uid(), vec![1, 2, 3]);
    assert_eq!(dim.name_uid().as_deref(), Some("lon_uid"));
}

// ============================================================================
// Range queries
// ============================================================================

#[test]
fn test_get_between_uses_bounds() {
    let dim = bounded();

    let touching = dim.get_between(1.0, 3.0).unwrap();
    assert_eq!(touching.len(), 2);
    assert_eq!(touching.value().unwrap(), vec![0.0, 5.0]);

    // A shared edge selects both neighbours
    let edge = dim.get_between(2.5, 2.5).unwrap();
    assert_eq!(edge.len(), 2);
    assert_eq!(edge.uid(), vec![1, 2]);
}

#[test]
fn test_get_between_without_bounds_uses_values() {
    let dim = VectorDimension::new(vec![0.0, 5.0, 10.0]).unwrap();
    let selected = dim.get_between(1.0, 6.0).unwrap();
    assert_eq!(selected.value().unwrap(), vec![5.0]);

    assert!(matches!(
        dim.get_between(11.0, 12.0),
        Err(DimensionError::EmptySubset(_))
    ));
}

#[test]
fn test_resolution() {
    assert_approx_eq!(bounded().resolution().unwrap(), 5.0, 1e-12);

    let irregular = VectorDimension::new(vec![0.0, 1.0, 4.0]).unwrap();
    assert_approx_eq!(irregular.resolution().unwrap(), 2.0, 1e-12);

    let single = VectorDimension::new(vec![3.0]).unwrap();
    assert!(matches!(
        single.resolution(),
        Err(DimensionError::ResolutionUndefined)
    ));
}

#[test]
fn test_extent_prefers_bounds() {
    assert_eq!(bounded().extent().unwrap(), (-2.5, 12.5));
}

#[test]
fn test_descending_bounds_only_split_on_longitude_axes() {
    // A thick pressure layer listed top-down
    let plev = VectorDimension::builder()
        .name("plev")
        .values(vec![200.0])
        .bounds(vec![(300.0, 100.0)])
        .build()
        .unwrap();
    assert!(!plev.is_longitude());
    assert_eq!(plev.resolution().unwrap(), 200.0);
    assert_eq!(plev.extent().unwrap(), (100.0, 300.0));
    assert_eq!(plev.get_between(150.0, 160.0).unwrap().len(), 1);

    // A wrapped seam cell on a CF longitude axis
    let lon = VectorDimension::builder()
        .name("lon")
        .units("degrees_east")
        .values(vec![180.0])
        .bounds(vec![(179.0, -179.0)])
        .build()
        .unwrap();
    assert!(lon.is_longitude());
    assert_eq!(lon.resolution().unwrap(), 2.0);
    assert_eq!(lon.extent().unwrap(), (-180.0, 180.0));
    assert!(matches!(
        lon.get_between(0.0, 10.0),
        Err(DimensionError::EmptySubset(_))
    ));

    let marked = VectorDimension::builder()
        .values(vec![0.0])
        .longitude()
        .build()
        .unwrap();
    assert!(marked.is_longitude());
    assert!(marked.slice(0..1).unwrap().deep_copy().unwrap().is_longitude());
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_uids_follow_slices() {
    let dim = VectorDimension::builder()
        .name("level")
        .values((0..10).map(f64::from).collect())
        .build()
        .unwrap();

    let first = dim.slice(2..8).unwrap();
    let second = first.slice(1..3).unwrap();
    assert_eq!(second.uid(), vec![4, 5]);
    assert_eq!(second.value().unwrap(), vec![3.0, 4.0]);

    let picked = dim.select(&[9, 0]).unwrap();
    assert_eq!(picked.uid(), vec![10, 1]);
}

#[test]
fn test_writes_visible_through_views_until_deep_copy() {
    let dim = bounded();
    let view = dim.slice(0..2).unwrap();
    let copy = dim.deep_copy().unwrap();

    view.set_value(1, 6.0).unwrap();
    assert_eq!(dim.value_at(1).unwrap(), 6.0);
    assert_eq!(copy.value_at(1).unwrap(), 5.0);
}

#[test]
fn test_mask_view() {
    let dim = bounded();
    let kept = dim.mask(&[true, false, true]).unwrap();
    assert_eq!(kept.uid(), vec![1, 3]);
    assert!(matches!(
        dim.mask(&[false, false, false]),
        Err(DimensionError::EmptySubset(_))
    ));
}

// ============================================================================
// Deferred loading
// ============================================================================

struct Offsets {
    calls: Rc<Cell<usize>>,
}

impl DimensionLoader<f64> for Offsets {
    fn load(&self, src_idx: &[usize]) -> Result<Loaded<f64>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Loaded {
            values: src_idx.iter().map(|&i| i as f64 * 10.0).collect(),
            bounds: None,
        })
    }
}

#[test]
fn test_loader_runs_once_for_all_views() -> anyhow::Result<()> {
    init_tracing();
    let calls = Rc::new(Cell::new(0));
    let dim = VectorDimension::builder()
        .name("depth")
        .src_idx(vec![4, 5, 6])
        .loader(Box::new(Offsets {
            calls: Rc::clone(&calls),
        }))
        .build()?;

    let tail = dim.slice(1..3)?;
    assert_eq!(calls.get(), 0);
    assert_eq!(tail.value()?, vec![50.0, 60.0]);
    assert_eq!(dim.value()?, vec![40.0, 50.0, 60.0]);
    assert_eq!(calls.get(), 1);
    assert_eq!(tail.src_idx(), Some(vec![5, 6]));
    Ok(())
}

#[test]
fn test_deferred_without_loader() {
    let dim = VectorDimension::<f64>::builder()
        .src_idx(vec![0, 1])
        .build()
        .unwrap();
    assert!(matches!(dim.value(), Err(DimensionError::NotLoaded)));
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_get_iter_records() {
    let dim = VectorDimension::builder()
        .name("lat")
        .values(vec![10.0, 20.0])
        .build()
        .unwrap();

    let records: Vec<_> = dim.slice(1..2).unwrap().get_iter().unwrap().collect();
    assert_eq!(records.len(), 1);
    let (i, record) = &records[0];
    assert_eq!(*i, 0);
    assert_eq!(record["lat"], FieldValue::Float(20.0));
    assert_eq!(record["lat_uid"], FieldValue::Int(2));
    assert_eq!(record["lat_bnds_lower"], FieldValue::Null);
    assert_eq!(record["lat_bnds_upper"], FieldValue::Null);
}

#[test]
fn test_get_iter_with_bounds_and_custom_uid_name() {
    let dim = VectorDimension::builder()
        .name("lon")
        .name_uid("gid")
        .values(vec![1.0])
        .bounds(vec![(0.0, 2.0)])
        .build()
        .unwrap();

    let (_, record) = dim.get_iter().unwrap().next().unwrap();
    assert_eq!(record["gid"], FieldValue::Int(1));
    assert_eq!(record["lon_bnds_upper"], FieldValue::Float(2.0));
}

#[test]
fn test_get_iter_requires_name() {
    let dim = VectorDimension::new(vec![1.0]).unwrap();
    assert!(matches!(dim.get_iter(), Err(DimensionError::NameRequired)));
}
