//! A crossword-specific implementation of the AC-3 algorithm. An arc `(x, y)` is consistent when
//! every word left for `x` has at least one word left for `y` that places the same letter in the
//! cell they share. We keep revising arcs until nothing more can be eliminated, or until some
//! variable runs out of options.

use bit_set::BitSet;
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::{Crossword, VariableId};
use crate::word_list::WordList;

/// An ordered pair of variables `(x, y)`; revising it prunes `x` against `y`.
pub type Arc = (VariableId, VariableId);

/// Result from a successful call to `ac3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised.
    pub revisions: usize,
    /// How many options were removed across all variables.
    pub eliminations: usize,
}

/// Result from a failed call to `ac3`, naming the variable whose domain was wiped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub variable_id: VariableId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// FIFO worklist of arcs that never holds the same arc twice.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<Arc>,
    pending: BitSet,
    variable_count: usize,
}

impl ConsistencyQueue {
    fn new(variable_count: usize) -> ConsistencyQueue {
        ConsistencyQueue {
            queue: VecDeque::new(),
            pending: BitSet::with_capacity(variable_count * variable_count),
            variable_count,
        }
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.pending.remove(arc.0 * self.variable_count + arc.1);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.pending.insert(arc.0 * self.variable_count + arc.1) {
            self.queue.push_back(arc);
        }
    }
}

/// Make `x` arc-consistent with `y` by removing every option for `x` whose letter in the shared
/// cell doesn't appear in that cell for any option of `y`. Returns whether anything was removed.
pub fn revise(
    domains: &mut Domains,
    crossword: &Crossword,
    word_list: &WordList,
    x: VariableId,
    y: VariableId,
) -> bool {
    let Some((x_cell, y_cell)) = crossword.overlap(x, y) else {
        return false;
    };

    let y_chars: HashSet<char> = domains
        .iter(y)
        .filter_map(|word_id| word_list.word(word_id).chars.get(y_cell).copied())
        .collect();

    let removed = domains.retain(x, |word_id| {
        word_list
            .word(word_id)
            .chars
            .get(x_cell)
            .map_or(false, |c| y_chars.contains(c))
    });

    removed > 0
}

/// Establish arc consistency. With `arcs == None` the worklist starts with every ordered pair of
/// overlapping variables; otherwise it starts with exactly the given arcs. Fails if any variable
/// in scope (every variable, or the endpoints of the given arcs) ends up with no options.
pub fn ac3(
    domains: &mut Domains,
    crossword: &Crossword,
    word_list: &WordList,
    arcs: Option<&[Arc]>,
) -> ArcConsistencyResult {
    let mut queue = ConsistencyQueue::new(crossword.variable_count());

    // A domain that is already empty never shows up as a revision, so check up front.
    let already_empty = match arcs {
        Some(arcs) => {
            arcs.iter().for_each(|&arc| queue.enqueue(arc));
            arcs.iter().flat_map(|&(x, y)| [x, y]).find(|&v| domains.is_empty(v))
        }
        None => {
            crossword.arcs().into_iter().for_each(|arc| queue.enqueue(arc));
            crossword.variable_ids().find(|&v| domains.is_empty(v))
        }
    };
    if let Some(variable_id) = already_empty {
        log::debug!("No options for {} before arc consistency", crossword.variable(variable_id));
        return Err(ArcConsistencyFailure { variable_id });
    }

    let mut success = ArcConsistencySuccess { revisions: 0, eliminations: 0 };

    while let Some((x, y)) = queue.pop_front() {
        let before = domains.len(x);
        success.revisions += 1;

        if !revise(domains, crossword, word_list, x, y) {
            continue;
        }

        success.eliminations += before - domains.len(x);

        if domains.is_empty(x) {
            log::debug!(
                "Arc consistency wiped out {} after {} revisions",
                crossword.variable(x),
                success.revisions
            );
            return Err(ArcConsistencyFailure { variable_id: x });
        }

        // Shrinking `x` may leave options in its other neighbors without support.
        for &z in crossword.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    log::debug!(
        "Arc consistency reached a fixed point after {} revisions, {} eliminations",
        success.revisions,
        success.eliminations
    );

    Ok(success)
}
