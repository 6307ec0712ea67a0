//! Order arithmetic for placing a list or card among its siblings.
//!
//! Orders are `f64` ranks. A placement only needs the two neighbours at
//! the target position: the midpoint between them, one past the last, or
//! one before the first. When repeated insertions at the same spot squeeze
//! two neighbours closer than [`MIN_ORDER_GAP`], the whole sequence is
//! renumbered densely instead.

use uuid::Uuid;

/// Order given to the first entity of an empty sequence
pub const INITIAL_ORDER: f64 = 0.0;

/// Smallest neighbour spacing still split by a midpoint
pub const MIN_ORDER_GAP: f64 = 1e-6;

/// New order for an entity inserted at `target_index` of `neighbors`
/// (ascending orders, not containing the entity itself). Indices past the
/// end append.
pub fn compute_order(neighbors: &[f64], target_index: usize) -> f64 {
    let (prev, next) = neighbours_at(neighbors, target_index);
    match (prev, next) {
        (Some(prev), Some(next)) => (prev + next) / 2.0,
        (Some(prev), None) => prev + 1.0,
        (None, Some(next)) => next - 1.0,
        (None, None) => INITIAL_ORDER,
    }
}

/// Order for appending after the current maximum
pub fn append_order(max_existing: Option<f64>) -> f64 {
    max_existing.map_or(INITIAL_ORDER, |max| max + 1.0)
}

/// How a move has to be written back
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// The card already sorts at the requested position
    Unchanged,
    /// Only the moving card gets this order
    Single(f64),
    /// Every card of the destination list, moving card included, gets a
    /// dense order `0, 1, 2, ...` in this sequence
    Renumber(Vec<(Uuid, f64)>),
}

/// Decide how to place `moving` at `target_index` among `neighbors`.
///
/// `neighbors` are the destination list's other cards in ascending order.
/// `current` is the moving card's order when it already lives in the
/// destination list, `None` for a cross-list move.
pub fn plan_placement(
    neighbors: &[(Uuid, f64)],
    moving: Uuid,
    current: Option<f64>,
    target_index: usize,
) -> Placement {
    let orders: Vec<f64> = neighbors.iter().map(|(_, order)| *order).collect();
    let index = target_index.min(orders.len());
    let (prev, next) = neighbours_at(&orders, index);

    if let Some(current) = current {
        if sorts_between(prev, next, current) {
            return Placement::Unchanged;
        }
    }

    let order = compute_order(&orders, index);
    let too_tight = matches!((prev, next), (Some(p), Some(n)) if n - p < MIN_ORDER_GAP);
    if !too_tight && sorts_between(prev, next, order) {
        return Placement::Single(order);
    }

    Placement::Renumber(renumbered(neighbors, moving, index))
}

/// Dense orders for `neighbors` with `moving` inserted at `index`
pub fn renumbered(neighbors: &[(Uuid, f64)], moving: Uuid, index: usize) -> Vec<(Uuid, f64)> {
    let mut ids: Vec<Uuid> = neighbors.iter().map(|(id, _)| *id).collect();
    ids.insert(index.min(ids.len()), moving);
    ids.into_iter()
        .enumerate()
        .map(|(position, id)| (id, INITIAL_ORDER + position as f64))
        .collect()
}

fn neighbours_at(orders: &[f64], target_index: usize) -> (Option<f64>, Option<f64>) {
    let index = target_index.min(orders.len());
    let prev = index.checked_sub(1).and_then(|i| orders.get(i)).copied();
    let next = orders.get(index).copied();
    (prev, next)
}

fn sorts_between(prev: Option<f64>, next: Option<f64>, order: f64) -> bool {
    order.is_finite() && prev.map_or(true, |p| p < order) && next.map_or(true, |n| order < n)
}
