//! Dense ordering of the items of one list.
//!
//! [`OrderedList`] holds the items of a single parent list sorted by their
//! position. Every mutation edits the arena and then re-derives
//! `order = index`, so the positions are always exactly `0..n`. The
//! returned [`Reposition`]s are the rows whose stored `order` has to be
//! rewritten; the persistence layer applies them inside the transaction
//! that loaded the list.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::AppError;

/// One list item as seen by the ordering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub item_id: i64,
    pub book_id: i64,
    pub order: i32,
}

/// A stored position that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reposition {
    pub item_id: i64,
    pub from: i32,
    pub to: i32,
}

/// Where to move an item inside its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("book {book_id} is already in list {list_id}")]
    DuplicateItem { list_id: i64, book_id: i64 },

    #[error("item {item_id} is not in list {list_id}")]
    UnknownItem { list_id: i64, item_id: i64 },
}

impl From<OrderingError> for AppError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::DuplicateItem { .. } => {
                AppError::field("book", "This book is already in the list")
            }
            OrderingError::UnknownItem { item_id, .. } => {
                AppError::NotFound(format!("List item {} not found", item_id))
            }
        }
    }
}

pub type OrderingResult<T> = Result<T, OrderingError>;

#[derive(Debug, Clone)]
pub struct OrderedList {
    list_id: i64,
    slots: Vec<Slot>,
}

impl OrderedList {
    /// Build the arena from stored rows in any order.
    ///
    /// Rows are sorted by `(order, item_id)`; stored values are kept as-is so
    /// that [`OrderedList::is_dense`] reports what is actually persisted.
    pub fn new(list_id: i64, mut slots: Vec<Slot>) -> Self {
        slots.sort_by_key(|s| (s.order, s.item_id));
        Self { list_id, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Items in display order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn contains_book(&self, book_id: i64) -> bool {
        self.slots.iter().any(|s| s.book_id == book_id)
    }

    pub fn get(&self, item_id: i64) -> Option<&Slot> {
        self.slots.iter().find(|s| s.item_id == item_id)
    }

    /// True when the stored orders are exactly `0..n`
    pub fn is_dense(&self) -> bool {
        self.slots
            .iter()
            .enumerate()
            .all(|(index, slot)| slot.order == index as i32)
    }

    /// Position a new item for `book_id` would get when appended.
    pub fn next_position(&self, book_id: i64) -> OrderingResult<i32> {
        if self.contains_book(book_id) {
            return Err(OrderingError::DuplicateItem {
                list_id: self.list_id,
                book_id,
            });
        }
        Ok(self.slots.len() as i32)
    }

    /// Append at the end. Returns the assigned order.
    pub fn append(&mut self, item_id: i64, book_id: i64) -> OrderingResult<i32> {
        let order = self.next_position(book_id)?;
        self.slots.push(Slot {
            item_id,
            book_id,
            order,
        });
        Ok(order)
    }

    /// Insert at `at` (clamped to the end), shifting later items down.
    ///
    /// The new item itself is not part of the returned repositions; its
    /// final order is `min(at, n)`.
    pub fn insert(&mut self, item_id: i64, book_id: i64, at: i32) -> OrderingResult<Vec<Reposition>> {
        self.append(item_id, book_id)?;
        let changes = self.move_to(item_id, at)?;
        Ok(changes.into_iter().filter(|c| c.item_id != item_id).collect())
    }

    /// Remove an item and close the gap it leaves.
    pub fn remove(&mut self, item_id: i64) -> OrderingResult<(Slot, Vec<Reposition>)> {
        let index = self.index_of(item_id)?;
        let removed = self.slots.remove(index);
        Ok((removed, self.reindex()))
    }

    /// Move an item one step or to either end of the list.
    pub fn move_item(&mut self, item_id: i64, direction: Direction) -> OrderingResult<Vec<Reposition>> {
        let index = self.index_of(item_id)?;
        let last = self.slots.len() - 1;

        match direction {
            Direction::Up if index > 0 => {
                self.slots.swap(index, index - 1);
                Ok(self.reindex())
            }
            Direction::Down if index < last => {
                self.slots.swap(index, index + 1);
                Ok(self.reindex())
            }
            Direction::Top => self.move_to(item_id, 0),
            Direction::Bottom => self.move_to(item_id, last as i32),
            _ => Ok(Vec::new()),
        }
    }

    /// Move an item to `target` (clamped), shifting the items in between by
    /// one in the opposite direction.
    pub fn move_to(&mut self, item_id: i64, target: i32) -> OrderingResult<Vec<Reposition>> {
        let index = self.index_of(item_id)?;
        let target = (target.max(0) as usize).min(self.slots.len() - 1);

        if target < index {
            self.slots[target..=index].rotate_right(1);
        } else if target > index {
            self.slots[index..=target].rotate_left(1);
        }
        Ok(self.reindex())
    }

    /// Re-derive `order = index`, returning every slot whose order changed.
    pub fn reindex(&mut self) -> Vec<Reposition> {
        let mut changes = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let order = index as i32;
            if slot.order != order {
                changes.push(Reposition {
                    item_id: slot.item_id,
                    from: slot.order,
                    to: order,
                });
                slot.order = order;
            }
        }
        changes
    }

    fn index_of(&self, item_id: i64) -> OrderingResult<usize> {
        self.slots
            .iter()
            .position(|s| s.item_id == item_id)
            .ok_or(OrderingError::UnknownItem {
                list_id: self.list_id,
                item_id,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: i64 = 7;

    /// Items 1..=n holding books 101..; item i sits at order i-1.
    fn list_of(n: i64) -> OrderedList {
        let slots = (1..=n)
            .map(|i| Slot {
                item_id: i,
                book_id: 100 + i,
                order: (i - 1) as i32,
            })
            .collect();
        OrderedList::new(LIST, slots)
    }

    fn item_ids(list: &OrderedList) -> Vec<i64> {
        list.slots().iter().map(|s| s.item_id).collect()
    }

    fn assert_dense(list: &OrderedList) {
        assert!(list.is_dense(), "not dense: {:?}", list.slots());
    }

    #[test]
    fn test_new_sorts_by_order_then_id() {
        let list = OrderedList::new(
            LIST,
            vec![
                Slot { item_id: 3, book_id: 1, order: 1 },
                Slot { item_id: 2, book_id: 2, order: 0 },
                Slot { item_id: 1, book_id: 3, order: 1 },
            ],
        );
        assert_eq!(item_ids(&list), vec![2, 1, 3]);
        assert!(!list.is_dense());
    }

    #[test]
    fn test_append_assigns_next_position() {
        let mut list = OrderedList::new(LIST, Vec::new());
        assert_eq!(list.append(1, 10), Ok(0));
        assert_eq!(list.append(2, 20), Ok(1));
        assert_eq!(list.append(3, 30), Ok(2));
        assert_dense(&list);
    }

    #[test]
    fn test_append_duplicate_book_fails() {
        let mut list = list_of(2);
        assert_eq!(
            list.append(9, 101),
            Err(OrderingError::DuplicateItem { list_id: LIST, book_id: 101 })
        );
        assert_eq!(list.len(), 2);

        // the same book is fine in another list
        let mut other = OrderedList::new(LIST + 1, Vec::new());
        assert_eq!(other.append(9, 101), Ok(0));
    }

    #[test]
    fn test_remove_shifts_higher_items_down() {
        let mut list = list_of(5);
        let (removed, changes) = list.remove(2).unwrap();

        assert_eq!(removed.order, 1);
        assert_eq!(item_ids(&list), vec![1, 3, 4, 5]);
        assert_eq!(
            changes,
            vec![
                Reposition { item_id: 3, from: 2, to: 1 },
                Reposition { item_id: 4, from: 3, to: 2 },
                Reposition { item_id: 5, from: 4, to: 3 },
            ]
        );
        assert_dense(&list);
    }

    #[test]
    fn test_remove_every_position_keeps_density() {
        for n in 1..=6 {
            for k in 1..=n {
                let mut list = list_of(n);
                list.remove(k).unwrap();
                assert_eq!(list.len() as i64, n - 1);
                assert_dense(&list);
                let expected: Vec<i64> = (1..=n).filter(|&i| i != k).collect();
                assert_eq!(item_ids(&list), expected);
            }
        }
    }

    #[test]
    fn test_remove_last_remaining_item() {
        let mut list = list_of(1);
        let (_, changes) = list.remove(1).unwrap();
        assert!(changes.is_empty());
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_unknown_item() {
        let mut list = list_of(2);
        assert_eq!(
            list.remove(42).unwrap_err(),
            OrderingError::UnknownItem { list_id: LIST, item_id: 42 }
        );
    }

    #[test]
    fn test_move_up_and_down_swap_neighbours() {
        let mut list = list_of(3);
        let changes = list.move_item(2, Direction::Up).unwrap();
        assert_eq!(item_ids(&list), vec![2, 1, 3]);
        assert_eq!(changes.len(), 2);

        let changes = list.move_item(2, Direction::Down).unwrap();
        assert_eq!(item_ids(&list), vec![1, 2, 3]);
        assert_eq!(changes.len(), 2);
        assert_dense(&list);
    }

    #[test]
    fn test_move_at_boundary_is_noop() {
        let mut list = list_of(3);
        assert!(list.move_item(1, Direction::Up).unwrap().is_empty());
        assert!(list.move_item(3, Direction::Down).unwrap().is_empty());
        assert!(list.move_item(1, Direction::Top).unwrap().is_empty());
        assert!(list.move_item(3, Direction::Bottom).unwrap().is_empty());
        assert_eq!(item_ids(&list), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_single_item_list_is_noop() {
        let mut list = list_of(1);
        for direction in [Direction::Up, Direction::Down, Direction::Top, Direction::Bottom] {
            assert!(list.move_item(1, direction).unwrap().is_empty());
        }
        assert_eq!(list.slots()[0].order, 0);
    }

    #[test]
    fn test_move_first_to_bottom() {
        let n = 5;
        let mut list = list_of(n);
        let changes = list.move_item(1, Direction::Bottom).unwrap();

        assert_eq!(list.get(1).unwrap().order, (n - 1) as i32);
        for i in 2..=n {
            assert_eq!(list.get(i).unwrap().order, (i - 2) as i32);
        }
        assert_eq!(changes.len(), n as usize);
        assert_dense(&list);
    }

    #[test]
    fn test_move_last_to_top() {
        let mut list = list_of(4);
        list.move_item(4, Direction::Top).unwrap();
        assert_eq!(item_ids(&list), vec![4, 1, 2, 3]);
        assert_dense(&list);
    }

    #[test]
    fn test_move_middle_to_top_only_touches_range() {
        let mut list = list_of(5);
        let changes = list.move_item(3, Direction::Top).unwrap();
        assert_eq!(item_ids(&list), vec![3, 1, 2, 4, 5]);
        let touched: Vec<i64> = changes.iter().map(|c| c.item_id).collect();
        assert_eq!(touched, vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut list = list_of(3);
        let changes = list.insert(9, 999, 1).unwrap();

        assert_eq!(item_ids(&list), vec![1, 9, 2, 3]);
        assert_eq!(list.get(9).unwrap().order, 1);
        assert_eq!(
            changes,
            vec![
                Reposition { item_id: 2, from: 1, to: 2 },
                Reposition { item_id: 3, from: 2, to: 3 },
            ]
        );
        assert_dense(&list);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut list = list_of(2);
        let changes = list.insert(9, 999, 50).unwrap();
        assert!(changes.is_empty());
        assert_eq!(list.get(9).unwrap().order, 2);
    }

    #[test]
    fn test_insert_duplicate_book_fails() {
        let mut list = list_of(2);
        assert!(matches!(
            list.insert(9, 102, 0),
            Err(OrderingError::DuplicateItem { .. })
        ));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_reindex_closes_gaps() {
        let mut list = OrderedList::new(
            LIST,
            vec![
                Slot { item_id: 1, book_id: 1, order: 0 },
                Slot { item_id: 2, book_id: 2, order: 3 },
                Slot { item_id: 3, book_id: 3, order: 7 },
            ],
        );
        let changes = list.reindex();
        assert_eq!(changes.len(), 2);
        assert_eq!(item_ids(&list), vec![1, 2, 3]);
        assert_dense(&list);
        assert!(list.reindex().is_empty());
    }

    #[test]
    fn test_scenario_delete_move_append() {
        // [A@0, B@1, C@2]
        let (a, b, c, d) = (1, 2, 3, 4);
        let mut list = OrderedList::new(LIST, Vec::new());
        list.append(a, 1001).unwrap();
        list.append(b, 1002).unwrap();
        list.append(c, 1003).unwrap();

        list.remove(b).unwrap();
        assert_eq!(item_ids(&list), vec![a, c]);
        assert_eq!(list.get(c).unwrap().order, 1);

        list.move_item(c, Direction::Top).unwrap();
        assert_eq!(item_ids(&list), vec![c, a]);

        assert_eq!(list.append(d, 1004), Ok(2));
        assert_eq!(item_ids(&list), vec![c, a, d]);
        assert_dense(&list);
    }

    #[test]
    fn test_density_holds_through_mixed_operations() {
        let mut list = OrderedList::new(LIST, Vec::new());
        let mut next_id = 1;
        let directions = [Direction::Up, Direction::Bottom, Direction::Down, Direction::Top];

        for step in 0..60_i64 {
            match step % 5 {
                0 | 1 => {
                    list.append(next_id, 5000 + next_id).unwrap();
                    next_id += 1;
                }
                2 if !list.is_empty() => {
                    let victim = list.slots()[(step as usize * 7) % list.len()].item_id;
                    list.remove(victim).unwrap();
                }
                3 if !list.is_empty() => {
                    let item = list.slots()[(step as usize * 3) % list.len()].item_id;
                    list.move_item(item, directions[(step as usize) % 4]).unwrap();
                }
                _ => {
                    list.insert(next_id, 5000 + next_id, (step % 4) as i32).unwrap();
                    next_id += 1;
                }
            }
            assert_dense(&list);
        }
    }
}
