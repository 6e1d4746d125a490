//! Put selected items back into reading order.

use crate::item::SelectedItem;

/// Sort `selected` by insertion sequence.
///
/// Priority decides what gets in; it never decides where it appears.
pub fn restore_order(selected: &mut [SelectedItem]) {
    selected.sort_by_key(|item| item.sequence);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(sequence: u64, priority: i32) -> SelectedItem {
        SelectedItem {
            sequence,
            role: None,
            priority,
            content: format!("#{sequence}"),
            cost: 1,
        }
    }

    #[test]
    fn restores_insertion_order() {
        // Priority order, as the selector produces it.
        let mut items = vec![selected(4, 0), selected(1, 10), selected(3, 20)];
        restore_order(&mut items);
        let seqs: Vec<u64> = items.iter().map(|i| i.sequence).collect();
        assert_eq!(seqs, vec![1, 3, 4]);
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let mut none: Vec<SelectedItem> = Vec::new();
        restore_order(&mut none);
        assert!(none.is_empty());

        let mut one = vec![selected(7, 0)];
        restore_order(&mut one);
        assert_eq!(one[0].sequence, 7);
    }
}
