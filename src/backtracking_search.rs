//! Grid filling by depth-first backtracking search over the pruned domains. Variables are chosen
//! by minimum remaining values with a degree tie-break, and values are tried in
//! least-constraining-first order. Optionally each choice is followed by a round of AC-3 on a
//! private copy of the domains, so that dead ends are noticed before we descend into them.

use bit_set::BitSet;
use instant::{Duration, Instant};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use crate::arc_consistency::{ac3, Arc};
use crate::domains::{enforce_node_consistency, Domains};
use crate::grid_config::{Crossword, Variable, VariableId};
use crate::word_list::{WordId, WordList};

/// How to order the candidate words for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrdering {
    /// Words that eliminate the fewest options from unassigned neighbors come first.
    #[default]
    LeastConstraining,
    /// Word list order.
    WordList,
}

/// Configuration for `find_fill`.
///
/// ```
/// use crossfill::{FillOptions, ValueOrdering};
///
/// let options = FillOptions::default()
///     .with_value_ordering(ValueOrdering::WordList)
///     .with_maintain_arc_consistency(true);
/// assert!(options.maintain_arc_consistency);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    pub value_ordering: ValueOrdering,

    /// Re-run AC-3 from each new choice, on a per-choice copy of the domains.
    pub maintain_arc_consistency: bool,
}

impl FillOptions {
    pub fn with_value_ordering(mut self, value_ordering: ValueOrdering) -> Self {
        self.value_ordering = value_ordering;
        self
    }

    pub fn with_maintain_arc_consistency(mut self, maintain_arc_consistency: bool) -> Self {
        self.maintain_arc_consistency = maintain_arc_consistency;
        self
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Options removed by node and arc consistency before search began.
    pub initial_eliminations: usize,
    /// Candidate words tried.
    pub states: u64,
    pub backtracks: u64,
    pub duration: Duration,
}

/// A mapping from variables to chosen words. Partial during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: Vec<Option<WordId>>,
    bound_count: usize,
}

impl Assignment {
    /// An empty assignment for a grid with `variable_count` variables.
    pub fn new(variable_count: usize) -> Assignment {
        Assignment { choices: vec![None; variable_count], bound_count: 0 }
    }

    pub fn get(&self, variable_id: VariableId) -> Option<WordId> {
        self.choices[variable_id]
    }

    pub fn contains(&self, variable_id: VariableId) -> bool {
        self.choices[variable_id].is_some()
    }

    /// Bind a variable, returning its previous word if it was already bound.
    pub fn bind(&mut self, variable_id: VariableId, word_id: WordId) -> Option<WordId> {
        let previous = self.choices[variable_id].replace(word_id);
        if previous.is_none() {
            self.bound_count += 1;
        }
        previous
    }

    pub fn unbind(&mut self, variable_id: VariableId) -> Option<WordId> {
        let previous = self.choices[variable_id].take();
        if previous.is_some() {
            self.bound_count -= 1;
        }
        previous
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.bound_count
    }

    pub fn is_empty(&self) -> bool {
        self.bound_count == 0
    }

    /// Bound `(variable_id, word_id)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, WordId)> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(variable_id, choice)| choice.map(|word_id| (variable_id, word_id)))
    }

    /// The word chosen for `variable`, if any.
    pub fn word_for<'a>(
        &self,
        crossword: &Crossword,
        word_list: &'a WordList,
        variable: &Variable,
    ) -> Option<&'a str> {
        let variable_id = crossword.variable_id(variable)?;
        self.get(variable_id).map(|word_id| word_list.word(word_id).string.as_str())
    }

    /// Bound variables with their words, in variable order.
    pub fn words<'a>(
        &'a self,
        crossword: &'a Crossword,
        word_list: &'a WordList,
    ) -> impl Iterator<Item = (&'a Variable, &'a str)> + 'a {
        self.iter().map(move |(variable_id, word_id)| {
            (crossword.variable(variable_id), word_list.word(word_id).string.as_str())
        })
    }
}

/// Does `assignment` bind every variable in the grid?
pub fn assignment_complete(assignment: &Assignment, crossword: &Crossword) -> bool {
    assignment.len() == crossword.variable_count()
}

/// Is a (possibly partial) assignment consistent? Every word must fit its variable's length,
/// overlapping bound variables must agree on the shared letter, and no word may be used twice.
pub fn consistent(assignment: &Assignment, crossword: &Crossword, word_list: &WordList) -> bool {
    let mut used_words = BitSet::with_capacity(word_list.len());

    for (variable_id, word_id) in assignment.iter() {
        if !used_words.insert(word_id) {
            return false;
        }
        if !fits_bound_neighbors(assignment, crossword, word_list, variable_id, word_id) {
            return false;
        }
    }

    true
}

/// Check one binding against the rest of the assignment. When the rest is already consistent,
/// this is equivalent to calling `consistent` on the whole thing.
fn consistent_extension(
    assignment: &Assignment,
    crossword: &Crossword,
    word_list: &WordList,
    variable_id: VariableId,
    word_id: WordId,
) -> bool {
    let reused = assignment
        .iter()
        .any(|(other_id, other_word_id)| other_id != variable_id && other_word_id == word_id);

    !reused && fits_bound_neighbors(assignment, crossword, word_list, variable_id, word_id)
}

fn fits_bound_neighbors(
    assignment: &Assignment,
    crossword: &Crossword,
    word_list: &WordList,
    variable_id: VariableId,
    word_id: WordId,
) -> bool {
    let config = crossword.variable_config(variable_id);
    let word = word_list.word(word_id);

    if word.len() != config.variable.length {
        return false;
    }

    config.crossings.iter().zip(&word.chars).all(|(crossing, &c)| match crossing {
        Some(crossing) => match assignment.get(crossing.other_variable_id) {
            Some(other_word_id) => {
                word_list.word(other_word_id).chars.get(crossing.other_variable_cell) == Some(&c)
            }
            None => true,
        },
        None => true,
    })
}

/// Choose the unbound variable with the fewest remaining options, preferring the one with the
/// most neighbors on a tie and the lowest id after that. Returns `None` once everything is bound.
pub fn select_unassigned_variable(
    assignment: &Assignment,
    domains: &Domains,
    crossword: &Crossword,
) -> Option<VariableId> {
    crossword
        .variable_ids()
        .filter(|&variable_id| !assignment.contains(variable_id))
        .min_by_key(|&variable_id| {
            (
                domains.len(variable_id),
                Reverse(crossword.neighbors(variable_id).len()),
                variable_id,
            )
        })
}

/// Order the remaining options for `variable_id`. For `LeastConstraining`, each word is scored by
/// how many options it would rule out across the unbound neighbors, lowest first, with ties kept
/// in word list order.
pub fn order_domain_values(
    variable_id: VariableId,
    assignment: &Assignment,
    domains: &Domains,
    crossword: &Crossword,
    word_list: &WordList,
    value_ordering: ValueOrdering,
) -> Vec<WordId> {
    let mut options: Vec<WordId> = domains.iter(variable_id).collect();

    if value_ordering == ValueOrdering::WordList {
        return options;
    }

    // For each unbound neighbor, count how many of its options place each letter in the shared
    // cell. A word for this variable eliminates every option that doesn't match its own letter.
    let neighbor_counts: Vec<(usize, usize, HashMap<char, usize>)> = crossword
        .neighbors(variable_id)
        .iter()
        .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
        .filter_map(|&neighbor_id| {
            let (cell, neighbor_cell) = crossword.overlap(variable_id, neighbor_id)?;
            let mut counts: HashMap<char, usize> = HashMap::new();
            for word_id in domains.iter(neighbor_id) {
                if let Some(&c) = word_list.word(word_id).chars.get(neighbor_cell) {
                    *counts.entry(c).or_insert(0) += 1;
                }
            }
            Some((cell, domains.len(neighbor_id), counts))
        })
        .collect();

    options.sort_by_cached_key(|&word_id| {
        let word = word_list.word(word_id);
        let eliminated: usize = neighbor_counts
            .iter()
            .map(|(cell, total, counts)| {
                let matching = word
                    .chars
                    .get(*cell)
                    .and_then(|c| counts.get(c))
                    .copied()
                    .unwrap_or(0);
                total - matching
            })
            .sum();
        (eliminated, word_id)
    });

    options
}

/// One level of the search: a variable, its ordered candidates, and how far through them we are.
struct Frame {
    variable_id: VariableId,
    candidates: Vec<WordId>,
    next_candidate: usize,

    /// Domains in effect below this frame, when maintaining arc consistency.
    domains: Option<Domains>,
}

/// The domains in effect for a frame at `depth`: the nearest fork above it, or the shared store.
fn domains_at<'a>(root: &'a Domains, stack: &'a [Frame], depth: usize) -> &'a Domains {
    stack[..depth]
        .iter()
        .rev()
        .find_map(|frame| frame.domains.as_ref())
        .unwrap_or(root)
}

/// Extend `assignment` into a complete, consistent assignment if one exists. `domains` is read
/// but never modified; each variable is bound when its frame picks a candidate and unbound
/// before the next candidate is tried or the frame is abandoned.
pub fn backtrack(
    mut assignment: Assignment,
    domains: &Domains,
    crossword: &Crossword,
    word_list: &WordList,
    options: &FillOptions,
    statistics: &mut Statistics,
) -> Option<Assignment> {
    if !consistent(&assignment, crossword, word_list) {
        return None;
    }

    let mut stack: Vec<Frame> = Vec::with_capacity(crossword.variable_count());

    'descend: loop {
        let current_domains = domains_at(domains, &stack, stack.len());

        let Some(variable_id) = select_unassigned_variable(&assignment, current_domains, crossword)
        else {
            return Some(assignment);
        };

        let candidates = order_domain_values(
            variable_id,
            &assignment,
            current_domains,
            crossword,
            word_list,
            options.value_ordering,
        );

        log::trace!(
            "Depth {}: filling {} with {} candidates",
            stack.len(),
            crossword.variable(variable_id),
            candidates.len()
        );

        stack.push(Frame { variable_id, candidates, next_candidate: 0, domains: None });

        // Advance the top frame to its next viable candidate, popping exhausted frames.
        loop {
            let depth = stack.len() - 1;
            let frame = &stack[depth];
            let frame_variable_id = frame.variable_id;

            let Some(&word_id) = frame.candidates.get(frame.next_candidate) else {
                stack.pop();
                statistics.backtracks += 1;

                match stack.last_mut() {
                    Some(parent) => {
                        assignment.unbind(parent.variable_id);
                        parent.domains = None;
                        continue;
                    }
                    None => return None,
                }
            };

            stack[depth].next_candidate += 1;
            statistics.states += 1;

            if !consistent_extension(&assignment, crossword, word_list, frame_variable_id, word_id)
            {
                continue;
            }
            assignment.bind(frame_variable_id, word_id);

            if options.maintain_arc_consistency {
                let mut forked = domains_at(domains, &stack, depth).clone();
                forked.restrict_to(frame_variable_id, word_id);

                let arcs: Vec<Arc> = crossword
                    .neighbors(frame_variable_id)
                    .iter()
                    .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
                    .map(|&neighbor_id| (neighbor_id, frame_variable_id))
                    .collect();

                if ac3(&mut forked, crossword, word_list, Some(arcs.as_slice())).is_err() {
                    assignment.unbind(frame_variable_id);
                    continue;
                }
                stack[depth].domains = Some(forked);
            }

            continue 'descend;
        }
    }
}

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Which phase proved the grid unfillable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    ArcConsistency,
    Search,
}

#[derive(Debug, Clone)]
pub struct FillFailure {
    pub stage: FailureStage,
    pub statistics: Statistics,
}

impl fmt::Display for FillFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            FailureStage::ArcConsistency => {
                write!(f, "No solution: arc consistency emptied a domain")
            }
            FailureStage::Search => write!(
                f,
                "No solution: search exhausted after {} states",
                self.statistics.states
            ),
        }
    }
}

impl std::error::Error for FillFailure {}

/// Search for a valid fill for the given grid.
pub fn find_fill(
    crossword: &Crossword,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = Domains::initialize(crossword, word_list);
    enforce_node_consistency(&mut domains, crossword, word_list);
    let after_node_consistency: usize =
        crossword.variable_ids().map(|variable_id| domains.len(variable_id)).sum();
    statistics.initial_eliminations =
        crossword.variable_count() * word_list.len() - after_node_consistency;

    match ac3(&mut domains, crossword, word_list, None) {
        Ok(success) => statistics.initial_eliminations += success.eliminations,
        Err(failure) => {
            log::info!(
                "Grid is unfillable: no options left for {}",
                crossword.variable(failure.variable_id)
            );
            statistics.duration = start.elapsed();
            return Err(FillFailure { stage: FailureStage::ArcConsistency, statistics });
        }
    }

    log::debug!(
        "Eliminated {} options before search across {} variables",
        statistics.initial_eliminations,
        crossword.variable_count()
    );

    let result = backtrack(
        Assignment::new(crossword.variable_count()),
        &domains,
        crossword,
        word_list,
        options,
        &mut statistics,
    );
    statistics.duration = start.elapsed();

    match result {
        Some(assignment) => {
            log::info!(
                "Filled {} variables in {:?} ({} states, {} backtracks)",
                assignment.len(),
                statistics.duration,
                statistics.states,
                statistics.backtracks
            );
            Ok(FillSuccess { statistics, assignment })
        }
        None => {
            log::info!("Search exhausted after {} states", statistics.states);
            Err(FillFailure { stage: FailureStage::Search, statistics })
        }
    }
}

/// Fill the grid with default options, or return `None` if it can't be done.
pub fn solve(crossword: &Crossword, word_list: &WordList) -> Option<Assignment> {
    find_fill(crossword, word_list, &FillOptions::default())
        .ok()
        .map(|success| success.assignment)
}
