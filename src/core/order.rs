//! Page-scoped rank bookkeeping.
//!
//! Items live in one flat collection tagged by group (a block tagged by its
//! page). Physical position in the collection carries no meaning; the
//! logical sequence of a group is its members sorted by rank. After every
//! structural change the affected group is reindexed so its ranks are
//! exactly `0..n`. Members of other groups are never visited.

/// An item with a rank inside a group.
pub trait Ranked {
    type Group: PartialEq;

    fn group(&self) -> &Self::Group;
    fn rank(&self) -> usize;
    fn set_rank(&mut self, rank: usize);
}

/// Physical indices of `group`'s members in logical order.
///
/// Equal ranks (which only occur transiently, while an insert is being
/// settled) fall back to physical order.
pub fn sorted_positions<T: Ranked>(items: &[T], group: &T::Group) -> Vec<usize> {
    let mut positions: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.group() == group)
        .map(|(idx, _)| idx)
        .collect();
    positions.sort_by_key(|&idx| (items[idx].rank(), idx));
    positions
}

/// Rewrite ranks so `positions[i]` gets rank `i`.
pub fn assign_sequence<T: Ranked>(items: &mut [T], positions: &[usize]) {
    for (rank, &idx) in positions.iter().enumerate() {
        items[idx].set_rank(rank);
    }
}

/// Compact `group`'s ranks to `0..n`, keeping its logical sequence.
pub fn reindex<T: Ranked>(items: &mut [T], group: &T::Group) {
    let positions = sorted_positions(items, group);
    assign_sequence(items, &positions);
}

/// Where a new member of `group` should be spliced into `items` so that it
/// lands at logical `index`, and the rank it should carry until reindexed.
///
/// Without an index, or with one past the end, the member is appended.
/// Otherwise it goes immediately before the member currently at `index`.
pub fn insertion_slot<T: Ranked>(
    items: &[T],
    group: &T::Group,
    index: Option<usize>,
) -> (usize, usize) {
    let positions = sorted_positions(items, group);
    match index {
        Some(index) if index < positions.len() => (positions[index], index),
        _ => (items.len(), positions.len()),
    }
}

/// Move the logical element at `from` to `to` within `group`.
///
/// Returns `None` when `from` is out of range. `to` is clamped to the end.
pub fn move_within<T: Ranked>(
    items: &mut [T],
    group: &T::Group,
    from: usize,
    to: usize,
) -> Option<()> {
    let mut positions = sorted_positions(items, group);
    if from >= positions.len() {
        return None;
    }
    let moved = positions.remove(from);
    let to = to.min(positions.len());
    positions.insert(to, moved);
    assign_sequence(items, &positions);
    Some(())
}

/// True when `group`'s ranks are exactly `0..n`.
pub fn is_dense<T: Ranked>(items: &[T], group: &T::Group) -> bool {
    let mut ranks: Vec<usize> = items
        .iter()
        .filter(|item| item.group() == group)
        .map(Ranked::rank)
        .collect();
    ranks.sort_unstable();
    ranks.iter().enumerate().all(|(idx, &rank)| idx == rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        group: u8,
        rank: usize,
        name: &'static str,
    }

    impl Ranked for Item {
        type Group = u8;

        fn group(&self) -> &u8 {
            &self.group
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn set_rank(&mut self, rank: usize) {
            self.rank = rank;
        }
    }

    fn item(group: u8, rank: usize, name: &'static str) -> Item {
        Item { group, rank, name }
    }

    fn names(items: &[Item], group: u8) -> Vec<&'static str> {
        sorted_positions(items, &group)
            .into_iter()
            .map(|idx| items[idx].name)
            .collect()
    }

    #[test]
    fn test_sorted_positions_ignores_physical_order() {
        let items = vec![item(0, 2, "c"), item(1, 0, "x"), item(0, 0, "a"), item(0, 1, "b")];
        assert_eq!(sorted_positions(&items, &0), vec![2, 3, 0]);
        assert_eq!(names(&items, 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reindex_closes_gaps_and_skips_other_groups() {
        let mut items = vec![item(0, 5, "b"), item(1, 7, "x"), item(0, 2, "a")];
        reindex(&mut items, &0);
        assert_eq!(items[2].rank, 0);
        assert_eq!(items[0].rank, 1);
        assert_eq!(items[1].rank, 7);
    }

    #[test]
    fn test_insertion_slot_before_target() {
        let items = vec![item(0, 1, "b"), item(0, 0, "a")];
        assert_eq!(insertion_slot(&items, &0, Some(1)), (0, 1));
        assert_eq!(insertion_slot(&items, &0, Some(0)), (1, 0));
    }

    #[test]
    fn test_insertion_slot_appends_past_end() {
        let items = vec![item(0, 0, "a"), item(1, 0, "x")];
        assert_eq!(insertion_slot(&items, &0, None), (2, 1));
        assert_eq!(insertion_slot(&items, &0, Some(9)), (2, 1));
    }

    #[test]
    fn test_spliced_member_settles_before_rank_twin() {
        let mut items = vec![item(0, 0, "a"), item(0, 1, "b")];
        let (slot, rank) = insertion_slot(&items, &0, Some(1));
        items.insert(slot, item(0, rank, "new"));
        reindex(&mut items, &0);
        assert_eq!(names(&items, 0), vec!["a", "new", "b"]);
        assert!(is_dense(&items, &0));
    }

    #[test]
    fn test_move_within_clamps_target() {
        let mut items = vec![item(0, 0, "a"), item(0, 1, "b"), item(0, 2, "c")];
        assert_eq!(move_within(&mut items, &0, 0, 99), Some(()));
        assert_eq!(names(&items, 0), vec!["b", "c", "a"]);
        assert_eq!(move_within(&mut items, &0, 3, 0), None);
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&[item(0, 1, "b"), item(0, 0, "a")], &0));
        assert!(!is_dense(&[item(0, 0, "a"), item(0, 2, "c")], &0));
        assert!(!is_dense(&[item(0, 0, "a"), item(0, 0, "b")], &0));
        assert!(is_dense::<Item>(&[], &0));
    }
}
