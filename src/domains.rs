//! The domain store: for each variable, the set of words that could still be placed there.
//! Domains only ever shrink.

use bit_set::BitSet;

use crate::grid_config::{Crossword, VariableId};
use crate::word_list::{WordId, WordList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<BitSet>,
}

impl Domains {
    /// Give every variable the full word list. Length filtering is left to
    /// `enforce_node_consistency`.
    pub fn initialize(crossword: &Crossword, word_list: &WordList) -> Domains {
        let full: BitSet = (0..word_list.len()).collect();

        Domains {
            options: crossword.variable_ids().map(|_| full.clone()).collect(),
        }
    }

    pub fn len(&self, variable_id: VariableId) -> usize {
        self.options[variable_id].len()
    }

    pub fn is_empty(&self, variable_id: VariableId) -> bool {
        self.options[variable_id].is_empty()
    }

    /// Is any variable left without options?
    pub fn any_empty(&self) -> bool {
        self.options.iter().any(|options| options.is_empty())
    }

    pub fn contains(&self, variable_id: VariableId, word_id: WordId) -> bool {
        self.options[variable_id].contains(word_id)
    }

    /// Remaining word ids for a variable, ascending.
    pub fn iter(&self, variable_id: VariableId) -> impl Iterator<Item = WordId> + '_ {
        self.options[variable_id].iter()
    }

    pub fn remove(&mut self, variable_id: VariableId, word_id: WordId) -> bool {
        self.options[variable_id].remove(word_id)
    }

    /// Remove every option for `variable_id` that doesn't satisfy `keep`, returning how many were
    /// removed.
    pub fn retain<F>(&mut self, variable_id: VariableId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let doomed: Vec<WordId> =
            self.options[variable_id].iter().filter(|&word_id| !keep(word_id)).collect();

        for &word_id in &doomed {
            self.options[variable_id].remove(word_id);
        }

        doomed.len()
    }

    /// Narrow a variable's domain to a single word.
    pub fn restrict_to(&mut self, variable_id: VariableId, word_id: WordId) {
        let options = &mut self.options[variable_id];
        let had_word = options.contains(word_id);
        options.clear();
        if had_word {
            options.insert(word_id);
        }
    }
}

/// Make every domain node-consistent by removing words whose length differs from their
/// variable's.
pub fn enforce_node_consistency(
    domains: &mut Domains,
    crossword: &Crossword,
    word_list: &WordList,
) {
    for variable_id in crossword.variable_ids() {
        let length = crossword.variable(variable_id).length;
        let removed = domains.retain(variable_id, |word_id| word_list.word(word_id).len() == length);

        log::trace!(
            "Node consistency removed {} options from {}, {} remain",
            removed,
            crossword.variable(variable_id),
            domains.len(variable_id)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{enforce_node_consistency, Domains};
    use crate::grid_config::Crossword;
    use crate::word_list::WordList;

    /// ___
    /// _##
    /// _##
    /// _##
    fn two_slot_crossword() -> Crossword {
        Crossword::from_template(
            "
            ___
            _##
            _##
            _##
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_uses_full_word_list() {
        let crossword = two_slot_crossword();
        let word_list = WordList::new(["CAT", "CARD", "DOG", "DOVE", "A"]);

        let domains = Domains::initialize(&crossword, &word_list);

        for variable_id in crossword.variable_ids() {
            assert_eq!(domains.len(variable_id), 5);
        }
    }

    #[test]
    fn test_node_consistency_filters_by_length() {
        let crossword = two_slot_crossword();
        let word_list = WordList::new(["CAT", "CARD", "DOG", "DOVE", "A"]);
        let mut domains = Domains::initialize(&crossword, &word_list);

        enforce_node_consistency(&mut domains, &crossword, &word_list);

        for variable_id in crossword.variable_ids() {
            let length = crossword.variable(variable_id).length;
            assert_eq!(domains.len(variable_id), 2);
            assert!(domains.iter(variable_id).all(|word_id| word_list.word(word_id).len() == length));
        }
    }

    #[test]
    fn test_node_consistency_can_empty_a_domain() {
        let crossword = two_slot_crossword();
        let word_list = WordList::new(["CAT", "DOG"]);
        let mut domains = Domains::initialize(&crossword, &word_list);

        enforce_node_consistency(&mut domains, &crossword, &word_list);

        assert!(domains.any_empty());
        assert!(!domains.is_empty(0));
        assert!(domains.is_empty(1));
    }

    #[test]
    fn test_filtered_domain_counts() {
        let crossword = two_slot_crossword();
        let word_list = WordList::new(["CAT", "CARD", "DOG"]);
        let domains = Domains::initialize(&crossword, &word_list);

        assert_eq!(domains.iter(0).filter(|_| true).count(), 3);
        assert_eq!(
            domains.iter(1).filter(|&word_id| word_list.word(word_id).len() == 4).count(),
            1
        );
    }

    #[test]
    fn test_restrict_to() {
        let crossword = two_slot_crossword();
        let word_list = WordList::new(["CAT", "DOG"]);
        let mut domains = Domains::initialize(&crossword, &word_list);

        domains.restrict_to(0, 1);
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![1]);

        domains.remove(1, 0);
        domains.restrict_to(1, 0);
        assert!(domains.is_empty(1));
    }
}
