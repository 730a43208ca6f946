use std::collections::HashMap;

use alloy_primitives::B256;

/// Replay bookkeeping for one logical message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayState {
    /// The number of replays issued so far.
    pub times: u64,
    /// The queue index of the most recent replay.
    pub last_index: u64,
}

/// The replay chains of all logical messages.
///
/// Each chain is a singly linked list from a message's most recent replay index back through
/// `prev` to the original queue index. Links are stored with a +1 offset so index 0 is
/// distinguishable from nil. Every link points at a strictly smaller index, so chains are
/// acyclic and terminate.
#[derive(Debug, Default)]
pub(crate) struct ReplayChains {
    states: HashMap<B256, ReplayState>,
    prev: HashMap<u64, u64>,
}

impl ReplayChains {
    /// Returns the replay state for the message hash, if it was ever replayed.
    pub(crate) fn state(&self, message_hash: &B256) -> Option<ReplayState> {
        self.states.get(message_hash).copied()
    }

    /// Returns the predecessor of the provided replay index, if any.
    pub(crate) fn prev(&self, index: u64) -> Option<u64> {
        self.prev.get(&index).map(|offset| offset - 1)
    }

    /// Records a replay of the message at a fresh queue index, linking it to its predecessor
    /// (the previous replay, or the original index for a first replay).
    pub(crate) fn link(&mut self, message_hash: B256, original_index: u64, new_index: u64) {
        let state = self.states.entry(message_hash).or_default();
        let predecessor = if state.times == 0 { original_index } else { state.last_index };
        self.prev.insert(new_index, predecessor + 1);
        state.times += 1;
        state.last_index = new_index;
    }

    /// Returns every queue index carrying the logical message, most recent first, ending at
    /// the original index. The walk is unbounded in the number of prior replays.
    pub(crate) fn walk(&self, message_hash: &B256, original_index: u64) -> Vec<u64> {
        let mut index = self.state(message_hash).map_or(original_index, |state| state.last_index);
        let mut chain = vec![index];
        while let Some(prev) = self.prev(index) {
            chain.push(prev);
            index = prev;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::ReplayChains;

    use alloy_primitives::B256;

    #[test]
    fn test_chain_links_back_to_original() {
        let mut chains = ReplayChains::default();
        let hash = B256::repeat_byte(1);

        chains.link(hash, 5, 10);
        let state = chains.state(&hash).unwrap();
        assert_eq!(state.times, 1);
        assert_eq!(state.last_index, 10);
        assert_eq!(chains.prev(10), Some(5));

        chains.link(hash, 5, 12);
        assert_eq!(chains.prev(12), Some(10));
        assert_eq!(chains.walk(&hash, 5), vec![12, 10, 5]);
    }

    #[test]
    fn test_original_index_zero_is_distinguished_from_nil() {
        let mut chains = ReplayChains::default();
        let hash = B256::repeat_byte(2);

        chains.link(hash, 0, 3);
        assert_eq!(chains.prev(3), Some(0));
        assert_eq!(chains.prev(0), None);
        assert_eq!(chains.walk(&hash, 0), vec![3, 0]);
    }

    #[test]
    fn test_walk_without_replays_is_the_original() {
        let chains = ReplayChains::default();
        assert_eq!(chains.walk(&B256::repeat_byte(3), 7), vec![7]);
    }

    #[test]
    fn test_walk_terminates_in_times_steps_without_revisits() {
        let mut chains = ReplayChains::default();
        let hash = B256::repeat_byte(4);

        for new_index in [4u64, 9, 11, 20] {
            chains.link(hash, 2, new_index);
        }

        let chain = chains.walk(&hash, 2);
        let times = chains.state(&hash).unwrap().times;
        assert_eq!(chain.len() as u64, times + 1);
        // strictly decreasing, so acyclic.
        assert!(chain.windows(2).all(|pair| pair[1] < pair[0]));
    }
}
