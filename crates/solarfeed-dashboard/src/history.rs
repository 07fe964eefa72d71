//! Bounded prediction history backing the list and chart views.

use std::collections::VecDeque;

use crate::display::DisplayPrediction;

pub const DEFAULT_CAPACITY: usize = 20;

/// One row of the list view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListEntry<'a> {
    /// 1-based position counted from the oldest entry currently held.
    /// Shifts down by one each time an old entry is evicted.
    pub position: usize,
    pub prediction: &'a DisplayPrediction,
}

/// FIFO of the most recent predictions. Pushing into a full buffer drops
/// the oldest entry first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    items: VecDeque<DisplayPrediction>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Capacity is at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning the evicted entry if the buffer was full.
    pub fn push(&mut self, item: DisplayPrediction) -> Option<DisplayPrediction> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&DisplayPrediction> {
        self.items.back()
    }

    /// Chart order: oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DisplayPrediction> + ExactSizeIterator {
        self.items.iter()
    }

    /// List order: newest to oldest, each labelled with its position.
    pub fn list_view(&self) -> impl Iterator<Item = ListEntry<'_>> {
        self.items
            .iter()
            .enumerate()
            .rev()
            .map(|(i, prediction)| ListEntry {
                position: i + 1,
                prediction,
            })
    }

    /// `(time, watts)` points for the chart, oldest first.
    pub fn chart_series(&self) -> Vec<(String, f64)> {
        self.items
            .iter()
            .map(|p| (p.time.clone(), p.power_watts()))
            .collect()
    }

    /// Owned copy in chart order.
    pub fn to_vec(&self) -> Vec<DisplayPrediction> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Trend;
    use solarfeed_services::RawPrediction;

    fn item(sequence: u64) -> DisplayPrediction {
        DisplayPrediction {
            sequence,
            location_name: format!("Site {}", sequence),
            time: format!("12:00:{:02}", sequence % 60),
            trend: Trend::Up,
            description: Trend::Up.description().to_string(),
            confidence: 80.0,
            prediction: RawPrediction {
                predicted_power_watts: sequence as f64 * 10.0,
                extra: Default::default(),
            },
        }
    }

    #[test]
    fn test_push_below_capacity() {
        let mut history = HistoryBuffer::default();
        for i in 0..5 {
            assert!(history.push(item(i)).is_none());
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.latest().map(|p| p.sequence), Some(4));
    }

    #[test]
    fn test_length_stabilizes_at_capacity() {
        let mut history = HistoryBuffer::default();
        for i in 0..57 {
            history.push(item(i));
            assert!(history.len() <= DEFAULT_CAPACITY);
        }
        assert_eq!(history.len(), 20);

        // The 20 most recent, in arrival order
        let sequences: Vec<u64> = history.iter().map(|p| p.sequence).collect();
        assert_eq!(sequences, (37..57).collect::<Vec<_>>());
    }

    #[test]
    fn test_eviction_returns_oldest() {
        let mut history = HistoryBuffer::new(2);
        history.push(item(0));
        history.push(item(1));
        let evicted = history.push(item(2));
        assert_eq!(evicted.map(|p| p.sequence), Some(0));
    }

    #[test]
    fn test_list_view_is_reverse_of_chart() {
        let mut history = HistoryBuffer::default();
        for i in 0..25 {
            history.push(item(i));
        }

        let chart: Vec<u64> = history.iter().map(|p| p.sequence).collect();
        let mut list: Vec<u64> = history.list_view().map(|e| e.prediction.sequence).collect();
        list.reverse();
        assert_eq!(chart, list);
    }

    #[test]
    fn test_list_positions_count_from_oldest() {
        let mut history = HistoryBuffer::new(3);
        for i in 0..3 {
            history.push(item(i));
        }
        let positions: Vec<usize> = history.list_view().map(|e| e.position).collect();
        assert_eq!(positions, vec![3, 2, 1]);

        // After eviction the labels shift; the stable id does not
        history.push(item(3));
        let entries: Vec<(usize, u64)> = history
            .list_view()
            .map(|e| (e.position, e.prediction.sequence))
            .collect();
        assert_eq!(entries, vec![(3, 3), (2, 2), (1, 1)]);
    }

    #[test]
    fn test_chart_series() {
        let mut history = HistoryBuffer::new(5);
        history.push(item(1));
        history.push(item(2));
        assert_eq!(
            history.chart_series(),
            vec![("12:00:01".to_string(), 10.0), ("12:00:02".to_string(), 20.0)]
        );
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut history = HistoryBuffer::new(0);
        assert_eq!(history.capacity(), 1);
        history.push(item(0));
        history.push(item(1));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|p| p.sequence), Some(1));
    }
}
