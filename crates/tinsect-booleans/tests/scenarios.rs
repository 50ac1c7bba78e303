//! End-to-end scenarios over the public API.

use tinsect_booleans::{
    chain_segments, chain_segments_with_tolerance, compute_splits, decimate_stride, dedup_points,
    intersect_surfaces, publish_polylines, IntersectSettings, IntersectionOutcome,
    PolylineCollector, PolylineStyle, Segment, Side,
};
use tinsect_math::{Point3, Vec3};
use tinsect_surface::{Surface, SurfaceDocument, Triangle};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn rect(id: &str, x0: f64, y0: f64, x1: f64, y1: f64, z: f64) -> Surface {
    Surface::new(
        id,
        id,
        vec![
            Triangle::new(p(x0, y0, z), p(x1, y0, z), p(x1, y1, z)),
            Triangle::new(p(x0, y0, z), p(x1, y1, z), p(x0, y1, z)),
        ],
    )
}

fn pyramid(id: &str) -> Surface {
    let apex = p(0.0, 0.0, 2.0);
    let base = [
        p(-1.0, -1.0, 0.0),
        p(1.0, -1.0, 0.0),
        p(1.0, 1.0, 0.0),
        p(-1.0, 1.0, 0.0),
    ];
    let faces = (0..4)
        .map(|i| Triangle::new(base[i], base[(i + 1) % 4], apex))
        .collect();
    Surface::new(id, "Pyramid", faces)
}

fn translated(surface: &Surface, offset: Vec3) -> Surface {
    let triangles = surface
        .triangles
        .iter()
        .map(|t| Triangle::new(t.v0 + offset, t.v1 + offset, t.v2 + offset))
        .collect();
    Surface::new(surface.id.clone(), surface.name.clone(), triangles)
}

#[test]
fn offset_coplanar_squares_outline_overlap() {
    let a = rect("A", 0.0, 0.0, 1.0, 1.0, 2.0);
    let b = rect("B", 0.5, 0.0, 1.5, 1.0, 2.0);
    let outcome = intersect_surfaces(&[a, b], &IntersectSettings::default()).unwrap();

    let polylines = outcome.polylines();
    assert_eq!(polylines.len(), 1, "{:?}", outcome);
    let pl = &polylines[0];
    assert!(pl.closed);
    for q in &pl.points {
        assert!((q.z - 2.0).abs() < 1e-9);
        assert!(q.x > 0.5 - 1e-6 && q.x < 1.0 + 1e-6);
        let on_side = (q.x - 0.5).abs() < 1e-6 || (q.x - 1.0).abs() < 1e-6;
        let on_cap = q.y.abs() < 1e-6 || (q.y - 1.0).abs() < 1e-6;
        assert!(on_side || on_cap, "{:?} off the overlap outline", q);
    }
    // Every corner of the overlap rectangle is visited
    for corner in [p(0.5, 0.0, 2.0), p(1.0, 0.0, 2.0), p(1.0, 1.0, 2.0), p(0.5, 1.0, 2.0)] {
        assert!(pl.points.iter().any(|q| (q - corner).norm() < 1e-6));
    }
}

#[test]
fn pyramid_through_plane_splits_into_two_groups() {
    let a = pyramid("A");
    let b = rect("B", -2.0, -2.0, 2.0, 2.0, 1.0);
    let session = compute_splits(&a, &b, &IntersectSettings::default())
        .unwrap()
        .expect("surfaces overlap");

    let groups_a: Vec<_> = session
        .groups()
        .iter()
        .filter(|g| g.surface_id == "A")
        .collect();
    assert_eq!(groups_a.len(), 2);
    assert_eq!(groups_a[0].id, "A_above");
    assert_eq!(groups_a[0].label, "Pyramid (above)");
    assert_eq!(groups_a[1].id, "A_below");

    let footprint: f64 = groups_a.iter().map(|g| g.footprint_area()).sum();
    assert!((footprint - 4.0).abs() < 1e-9);
    // The cut runs at half height, so the tip covers a quarter of the base
    assert!((groups_a[0].footprint_area() - 1.0).abs() < 1e-9);

    for tri in &groups_a[0].triangles {
        assert!(tri.centroid().z >= 1.0 - 1e-9);
    }
    for tri in &groups_a[1].triangles {
        assert!(tri.centroid().z <= 1.0 + 1e-9);
    }
}

#[test]
fn every_triangle_lands_in_one_group() {
    let a = pyramid("A");
    let b = rect("B", -0.5, -3.0, 3.0, 3.0, 0.5);
    let session = compute_splits(&a, &b, &IntersectSettings::default())
        .unwrap()
        .unwrap();

    let area = |s: Side, id: &str| -> f64 {
        session
            .groups()
            .iter()
            .filter(|g| g.surface_id == id && g.side == s)
            .map(|g| g.footprint_area())
            .sum()
    };
    let a_total = area(Side::Above, "A") + area(Side::Below, "A") + area(Side::Outside, "A");
    assert!((a_total - a.footprint_area()).abs() < 1e-9);
    let b_total = area(Side::Above, "B") + area(Side::Below, "B") + area(Side::Outside, "B");
    assert!((b_total - b.footprint_area()).abs() < 1e-9);
}

#[test]
fn disjoint_surfaces_have_no_splits() {
    let a = rect("A", 0.0, 0.0, 1.0, 1.0, 0.0);
    let b = rect("B", 5.0, 5.0, 6.0, 6.0, 0.0);
    let settings = IntersectSettings::default();
    assert!(compute_splits(&a, &b, &settings).unwrap().is_none());
    assert_eq!(
        intersect_surfaces(&[a, b], &settings).unwrap(),
        IntersectionOutcome::NoOverlap
    );
}

#[test]
fn pick_and_merge_keeps_selected_groups() {
    let a = pyramid("A");
    let b = rect("B", -2.0, -2.0, 2.0, 2.0, 1.0);
    let mut session = compute_splits(&a, &b, &IntersectSettings::default())
        .unwrap()
        .unwrap();

    // Keep the plane outside the pyramid plus the pyramid below it
    for g in session.groups().to_vec() {
        let keep = g.id == "A_below" || g.surface_id == "B";
        session.set_kept(&g.id, keep).unwrap();
    }
    let kept = session.kept_triangles();
    assert!(kept.iter().all(|t| t.centroid().z <= 1.0 + 1e-9));

    let merged = session.merge(1e-6);
    assert!(!merged.is_empty());
    assert!(merged.vertices.len() < merged.len() * 3);
}

#[test]
fn survey_coordinates_keep_precision() {
    let offset = Vec3::new(500_000.0, 5_500_000.0, 100.0);
    let ramp = Surface::new(
        "EG",
        "Existing",
        vec![
            Triangle::new(p(0.0, 0.0, -1.0), p(2.0, 0.0, 1.0), p(2.0, 2.0, 1.0)),
            Triangle::new(p(0.0, 0.0, -1.0), p(2.0, 2.0, 1.0), p(0.0, 2.0, -1.0)),
        ],
    );
    let flat = rect("FG", 0.0, 0.0, 2.0, 2.0, 0.0);
    let surfaces = [translated(&ramp, offset), translated(&flat, offset)];

    let outcome = intersect_surfaces(&surfaces, &IntersectSettings::default()).unwrap();
    let polylines = outcome.polylines();
    assert_eq!(polylines.len(), 1);
    for q in &polylines[0].points {
        assert!((q.x - (offset.x + 1.0)).abs() < 1e-6);
        assert!((q.z - offset.z).abs() < 1e-6);
    }
}

#[test]
fn decimated_polylines_reach_the_sink() {
    // A ramp crossing a flat surface along a long, finely tessellated line
    let n = 20;
    let mut ramp = Vec::new();
    for i in 0..n {
        let (y0, y1) = (i as f64, (i + 1) as f64);
        ramp.push(Triangle::new(p(0.0, y0, -1.0), p(2.0, y0, 1.0), p(2.0, y1, 1.0)));
        ramp.push(Triangle::new(p(0.0, y0, -1.0), p(2.0, y1, 1.0), p(0.0, y1, -1.0)));
    }
    let surfaces = [
        Surface::new("R", "Ramp", ramp),
        rect("F", -1.0, -1.0, 3.0, n as f64 + 1.0, 0.0),
    ];
    let settings = IntersectSettings {
        vertex_spacing: 5.0,
        closed_polygons: false,
    };
    let outcome = intersect_surfaces(&surfaces, &settings).unwrap();
    let polylines = outcome.polylines();
    assert_eq!(polylines.len(), 1);
    assert!(polylines[0].points.len() <= n / 5 + 2);

    let mut sink = PolylineCollector::default();
    let created = publish_polylines(polylines, &PolylineStyle::default(), &settings, &mut sink);
    assert_eq!(created, 1);
    assert!(!sink.polylines[0].1.closed);
}

#[test]
fn shuffled_square_chains_into_one_loop() {
    let corners = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)];
    let segments = vec![
        Segment::new(corners[2], corners[1]),
        Segment::new(corners[3], corners[0]),
        Segment::new(corners[0], corners[1]),
        Segment::new(corners[3], corners[2]),
    ];
    let mut runs = vec![chain_segments(&segments)];
    // Any tolerance from exact matching up to the edge length
    for tolerance in [0.0, 0.5, 1.0] {
        runs.push(chain_segments_with_tolerance(&segments, tolerance));
    }
    for polylines in runs {
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 5);
        assert!(polylines[0].is_closed(1e-9));
        for c in &corners {
            assert!(polylines[0].points.contains(c));
        }
    }
}

#[test]
fn clustered_points_collapse_to_first() {
    let first = p(1000.0, 2000.0, 50.0);
    let cluster: Vec<Point3> = (0..25)
        .map(|i| first + Vec3::new(i as f64 * 1e-5, -(i as f64) * 1e-5, 0.0))
        .collect();
    let result = dedup_points(&cluster, 0.01);
    assert_eq!(result.unique_count, 1);
    assert_eq!(result.points[0], first);
    assert_eq!(decimate_stride(&cluster, 5).len(), 5);
}

#[test]
fn mixed_storage_shapes_feed_the_engine() {
    let json = r#"{
        "surfaces": [
            {
                "id": "EG",
                "points": [
                    {"x": 0.0, "y": 0.0, "z": -1.0},
                    {"x": 2.0, "y": 0.0, "z": 1.0},
                    {"x": 2.0, "y": 2.0, "z": 1.0},
                    {"x": 0.0, "y": 2.0, "z": -1.0}
                ],
                "triangles": [{"a": 0, "b": 1, "c": 2}, {"indices": [0, 2, 3]}, {"a": 0, "b": 1, "c": 7}]
            },
            {
                "id": "FG",
                "triangles": [
                    {"vertices": [{"x": 0, "y": 0, "z": 0}, {"x": 2, "y": 0, "z": 0}, {"x": 2, "y": 2, "z": 0}]},
                    {"vertices": [{"x": 0, "y": 0, "z": 0}, {"x": 2, "y": 2, "z": 0}, {"x": 0, "y": 2, "z": 0}]}
                ]
            }
        ]
    }"#;
    let doc = SurfaceDocument::from_json(json).unwrap();
    let normalized = doc.normalize();
    assert_eq!(normalized[0].1.skipped, 1);
    let surfaces: Vec<Surface> = normalized.into_iter().map(|(s, _)| s).collect();

    let outcome = intersect_surfaces(&surfaces, &IntersectSettings::default()).unwrap();
    assert_eq!(outcome.polylines().len(), 1);
}
