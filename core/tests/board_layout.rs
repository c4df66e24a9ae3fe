use std::collections::HashMap;

use puzzledrop_core::layout::splitmix32;
use puzzledrop_core::{
    background_positions, layout_seed, shuffled, tray_positions, BoardLayout, GridGeometry,
};

fn geometries() -> Vec<GridGeometry> {
    vec![
        GridGeometry::default(),
        GridGeometry::new(vec![0.0], vec![0.0]).expect("1x1"),
        GridGeometry::new(vec![0.0, 5.0, 10.0], vec![0.0, 4.0]).expect("3x2"),
        GridGeometry::new(vec![2.0, 1.0], vec![9.0, 3.0, 6.0, 0.0, 12.0]).expect("2x5"),
    ]
}

#[test]
fn background_positions_cover_grid_in_row_major_order() {
    for geometry in geometries() {
        let crops = background_positions(&geometry);
        assert_eq!(crops.len(), geometry.tile_count());
        let mut index = 0;
        for &top in &geometry.top_positions {
            for &left in &geometry.left_positions {
                assert_eq!(crops[index].top, top);
                assert_eq!(crops[index].left, left);
                index += 1;
            }
        }
        for (i, a) in crops.iter().enumerate() {
            for b in &crops[i + 1..] {
                assert_ne!(a, b, "crops must be distinct");
            }
        }
    }
}

#[test]
fn background_positions_ignore_seed() {
    let geometry = GridGeometry::default();
    let a = BoardLayout::generate(geometry.clone(), 1);
    let b = BoardLayout::generate(geometry, 2);
    assert_eq!(a.crops, b.crops);
}

#[test]
fn tray_positions_cross_every_left_with_every_top() {
    for geometry in geometries() {
        for seed in 0..32 {
            let tray = tray_positions(&geometry, seed);
            assert_eq!(tray.len(), geometry.tile_count());
            let rows = geometry.rows();
            for chunk in tray.chunks(rows) {
                let left = chunk[0].left;
                assert!(chunk.iter().all(|pos| pos.left == left));
                let mut tops: Vec<f32> = chunk.iter().map(|pos| pos.top).collect();
                let mut expected = geometry.top_positions.clone();
                tops.sort_by(|a, b| a.total_cmp(b));
                expected.sort_by(|a, b| a.total_cmp(b));
                assert_eq!(tops, expected);
            }
            let mut lefts: Vec<f32> = tray.chunks(rows).map(|chunk| chunk[0].left).collect();
            let mut expected = geometry.left_positions.clone();
            lefts.sort_by(|a, b| a.total_cmp(b));
            expected.sort_by(|a, b| a.total_cmp(b));
            assert_eq!(lefts, expected);
        }
    }
}

#[test]
fn tray_positions_are_seeded() {
    let geometry = GridGeometry::default();
    assert_eq!(tray_positions(&geometry, 42), tray_positions(&geometry, 42));
    let distinct = (0..16)
        .map(|seed| tray_positions(&geometry, layout_seed(seed)))
        .filter(|tray| *tray != tray_positions(&geometry, layout_seed(0)))
        .count();
    assert!(distinct >= 14, "only {distinct} layouts differed");
}

#[test]
fn tray_cells_are_uniform_per_tile() {
    let geometry = GridGeometry::default();
    let trials = 4000u32;
    let cells = geometry.tile_count() as u32;
    let expected = trials / cells;
    for tile in [0usize, 7, 19] {
        let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
        for nonce in 0..trials {
            let tray = tray_positions(&geometry, layout_seed(nonce));
            let pos = tray[tile];
            *counts.entry((pos.left as u32, pos.top as u32)).or_default() += 1;
        }
        assert_eq!(counts.len() as u32, cells, "tile {tile} missed a cell");
        for (cell, count) in counts {
            assert!(
                count > expected * 6 / 10 && count < expected * 14 / 10,
                "tile {tile} landed on {cell:?} {count} times, expected about {expected}"
            );
        }
    }
}

#[test]
fn shuffle_is_uniform_over_positions() {
    let items = [0usize, 1, 2, 3, 4];
    let trials = 10_000u32;
    let mut counts = [[0u32; 5]; 5];
    for trial in 0..trials {
        let out = shuffled(&items, splitmix32(trial));
        for (position, item) in out.into_iter().enumerate() {
            counts[item][position] += 1;
        }
    }
    let expected = trials / items.len() as u32;
    for (item, row) in counts.iter().enumerate() {
        for (position, count) in row.iter().enumerate() {
            assert!(
                *count > expected * 9 / 10 && *count < expected * 11 / 10,
                "item {item} at {position}: {count} (expected about {expected})"
            );
        }
    }
}

#[test]
fn layout_serializes_for_dumps() {
    let layout = BoardLayout::generate(GridGeometry::default(), 3);
    let json = serde_json::to_value(&layout).expect("json");
    assert_eq!(json["crops"].as_array().map(Vec::len), Some(20));
    assert_eq!(json["tray"].as_array().map(Vec::len), Some(20));
    assert_eq!(layout.slot_position(5), Some(layout.crops[5]));
    assert_eq!(layout.slot_position(20), None);
}
