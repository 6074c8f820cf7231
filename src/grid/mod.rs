use crate::models::{Block, BlockKind, BlockStyle, Position};

/// The grid is a fixed 6x4 cell space. Not configurable at runtime.
pub(crate) const GRID_WIDTH: i32 = 6;
pub(crate) const GRID_HEIGHT: i32 = 4;

/// One grid unit of pointer travel during a resize drag.
pub(crate) const CELL_PX: f64 = 200.0;

/// Sizes a block can snap to while resizing, in iteration order.
/// Ordering matters: Manhattan-distance ties resolve to the first match.
pub(crate) const ALLOWED_SIZES: [(i32, i32); 5] = [(1, 1), (2, 1), (1, 2), (2, 2), (2, 3)];

/// Reserved id for the client-synthesized center block. Never persisted.
pub(crate) const CENTER_BLOCK_ID: &str = "center";

/// Open-interval rectangle overlap. Strict inequalities on purpose:
/// edge-touching rectangles do NOT overlap.
pub(crate) fn rects_overlap(a: Position, b: Position) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Whether a rectangle may be committed at `(x, y, w, h)`: fully inside
/// the grid and overlapping no block other than `exclude_id`.
///
/// Used both for drop validation and for live resize-preview validation.
pub(crate) fn is_valid_placement(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    exclude_id: Option<&str>,
    blocks: &[Block],
) -> bool {
    if x < 0 || y < 0 || x + w > GRID_WIDTH || y + h > GRID_HEIGHT {
        return false;
    }

    let candidate = Position { x, y, w, h };
    !blocks
        .iter()
        .filter(|b| exclude_id != Some(b.id.as_str()))
        .any(|b| rects_overlap(candidate, b.position))
}

/// Per-cell coverage, row-major (`occupancy[y][x]`). Drives the
/// empty-cell affordances and drop targets.
pub(crate) fn cell_occupancy(
    blocks: &[Block],
) -> [[bool; GRID_WIDTH as usize]; GRID_HEIGHT as usize] {
    let mut grid = [[false; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
    for b in blocks {
        let p = b.position;
        for y in p.y.max(0)..(p.y + p.h).min(GRID_HEIGHT) {
            for x in p.x.max(0)..(p.x + p.w).min(GRID_WIDTH) {
                grid[y as usize][x as usize] = true;
            }
        }
    }
    grid
}

/// Map a continuous pointer delta (px from resize-start) onto a
/// candidate grid size. Floors toward negative infinity so dragging
/// 1px left already shrinks by a unit, matching pointer feel.
pub(crate) fn candidate_size(start_w: i32, start_h: i32, dx_px: f64, dy_px: f64) -> (i32, i32) {
    let du_x = (dx_px / CELL_PX).floor() as i32;
    let du_y = (dy_px / CELL_PX).floor() as i32;
    (start_w + du_x, start_h + du_y)
}

/// Snap a candidate size to the nearest member of `ALLOWED_SIZES` by
/// Manhattan distance. First match wins on ties, which makes the snap
/// deterministic for a given pointer delta.
pub(crate) fn snap_size(cand_w: i32, cand_h: i32) -> (i32, i32) {
    let mut best = ALLOWED_SIZES[0];
    let mut best_dist = i32::MAX;
    for &(w, h) in &ALLOWED_SIZES {
        let dist = (w - cand_w).abs() + (h - cand_h).abs();
        if dist < best_dist {
            best_dist = dist;
            best = (w, h);
        }
    }
    best
}

/// The default center block synthesized for layouts that have none.
/// Lives only in the rendered list; never sent to the store.
pub(crate) fn default_center_block() -> Block {
    Block {
        id: CENTER_BLOCK_ID.to_string(),
        kind: BlockKind::Text,
        content: "Welcome to my page".to_string(),
        // Centered in the 6x4 grid.
        position: Position { x: 2, y: 1, w: 2, h: 2 },
        is_center: true,
        style: BlockStyle {
            background_color: Some("rgb(38, 38, 38)".to_string()),
            text_color: Some("white".to_string()),
        },
    }
}

/// Derive the displayed list from the persisted one: prepend the default
/// center block iff the persisted list has no center. Pure view-layer
/// construct; the persisted set is never mutated here.
pub(crate) fn renderable_blocks(persisted: &[Block]) -> Vec<Block> {
    if persisted.iter().any(|b| b.is_center) {
        persisted.to_vec()
    } else {
        let mut out = Vec::with_capacity(persisted.len() + 1);
        out.push(default_center_block());
        out.extend(persisted.iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, x: i32, y: i32, w: i32, h: i32) -> Block {
        Block {
            id: id.to_string(),
            kind: BlockKind::Text,
            content: String::new(),
            position: Position { x, y, w, h },
            is_center: false,
            style: BlockStyle::default(),
        }
    }

    #[test]
    fn overlap_is_strict() {
        let a = Position { x: 0, y: 0, w: 2, h: 2 };
        // Shares the x=2 edge only: not overlap.
        let touching = Position { x: 2, y: 0, w: 1, h: 1 };
        assert!(!rects_overlap(a, touching));

        // One cell of intersection.
        let inside = Position { x: 1, y: 1, w: 2, h: 2 };
        assert!(rects_overlap(a, inside));
        assert!(rects_overlap(inside, a));
    }

    #[test]
    fn placement_rejects_out_of_bounds() {
        let blocks: [Block; 0] = [];
        assert!(is_valid_placement(0, 0, 1, 1, None, &blocks));
        assert!(is_valid_placement(5, 3, 1, 1, None, &blocks));
        assert!(!is_valid_placement(-1, 0, 1, 1, None, &blocks));
        assert!(!is_valid_placement(0, -1, 1, 1, None, &blocks));
        assert!(!is_valid_placement(5, 0, 2, 1, None, &blocks)); // x+w = 7
        assert!(!is_valid_placement(0, 3, 1, 2, None, &blocks)); // y+h = 5
    }

    #[test]
    fn placement_rejects_collisions_except_self() {
        let blocks = [block("a", 2, 1, 2, 2)];
        assert!(!is_valid_placement(3, 2, 1, 1, None, &blocks));
        // A block may be re-validated at a size overlapping only itself.
        assert!(is_valid_placement(2, 1, 2, 2, Some("a"), &blocks));
        // Edge-touching neighbor is fine.
        assert!(is_valid_placement(4, 1, 1, 1, Some("b"), &blocks));
    }

    #[test]
    fn occupancy_covers_spans() {
        let blocks = [block("a", 2, 1, 2, 2), block("b", 0, 0, 1, 1)];
        let occ = cell_occupancy(&blocks);
        assert!(occ[0][0]);
        assert!(!occ[0][1]);
        assert!(occ[1][2] && occ[1][3] && occ[2][2] && occ[2][3]);
        let covered: usize = occ
            .iter()
            .map(|row| row.iter().filter(|&&c| c).count())
            .sum();
        assert_eq!(covered, 5);
    }

    #[test]
    fn candidate_size_floors_pointer_delta() {
        assert_eq!(candidate_size(2, 2, 450.0, 0.0), (4, 2));
        assert_eq!(candidate_size(2, 2, 199.0, 0.0), (2, 2));
        // Flooring: a 1px pull to the left already shrinks.
        assert_eq!(candidate_size(2, 2, -1.0, 0.0), (1, 2));
        assert_eq!(candidate_size(1, 1, 0.0, -250.0), (1, -1));
    }

    #[test]
    fn snap_picks_nearest_by_manhattan_distance() {
        assert_eq!(snap_size(1, 1), (1, 1));
        assert_eq!(snap_size(2, 3), (2, 3));
        // (4,2): distances are (1,1)=4 (2,1)=3 (1,2)=3 (2,2)=2 (2,3)=3.
        assert_eq!(snap_size(4, 2), (2, 2));
        // Oversized and undersized candidates still land in the set.
        assert_eq!(snap_size(9, 9), (2, 3));
        assert_eq!(snap_size(0, -3), (1, 1));
    }

    #[test]
    fn snap_ties_resolve_to_first_listed() {
        // (2,2) start dragged into (3,1): (2,1) and (2,2) are both at
        // distance 1; (2,1) comes first in ALLOWED_SIZES.
        assert_eq!(snap_size(3, 1), (2, 1));
    }

    #[test]
    fn snap_is_deterministic() {
        for _ in 0..10 {
            let (w, h) = candidate_size(2, 2, 450.0, 10.0);
            assert_eq!(snap_size(w, h), (2, 2));
        }
    }

    #[test]
    fn renderable_synthesizes_center_when_missing() {
        let persisted = [block("a", 0, 0, 1, 1)];
        let shown = renderable_blocks(&persisted);
        assert_eq!(shown.len(), 2);
        assert!(shown[0].is_center);
        assert_eq!(shown[0].id, CENTER_BLOCK_ID);
        assert_eq!(shown[0].position, Position { x: 2, y: 1, w: 2, h: 2 });
        // Persisted input is untouched.
        assert_eq!(persisted.len(), 1);
    }

    #[test]
    fn renderable_keeps_existing_center() {
        let mut center = block("real-center", 2, 1, 2, 2);
        center.is_center = true;
        let persisted = [center, block("a", 0, 0, 1, 1)];
        let shown = renderable_blocks(&persisted);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown.iter().filter(|b| b.is_center).count(), 1);
        assert_eq!(shown[0].id, "real-center");
    }

    #[test]
    fn renderable_always_has_exactly_one_center() {
        let shown = renderable_blocks(&[]);
        assert_eq!(shown.iter().filter(|b| b.is_center).count(), 1);
    }
}
