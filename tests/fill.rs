use crossfill::backtracking_search::{assignment_complete, consistent};
use crossfill::{
    find_fill, render_grid, solve, Crossword, Direction, FillOptions, ValueOrdering, Variable,
    WordList,
};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn load_structure(name: &str) -> Crossword {
    let template =
        fs::read_to_string(data_path(name)).expect("Something went wrong reading the file");
    Crossword::from_template(&template).unwrap()
}

/// #___#
/// #_##_
/// #_##_
/// #_##_
/// #____
#[test]
fn test_fill_sample_structure() {
    let crossword = load_structure("structure0.txt");
    let word_list = WordList::load(data_path("words0.txt")).unwrap();

    for options in [
        FillOptions::default(),
        FillOptions::default().with_value_ordering(ValueOrdering::WordList),
        FillOptions::default().with_maintain_arc_consistency(true),
    ] {
        let result = find_fill(&crossword, &word_list, &options).expect("Failed to find a fill");

        println!("{:?}", result.statistics);
        println!("{}", render_grid(&crossword, &word_list, &result.assignment));

        assert!(assignment_complete(&result.assignment, &crossword));
        assert!(consistent(&result.assignment, &crossword, &word_list));

        let words: HashSet<&str> =
            result.assignment.words(&crossword, &word_list).map(|(_, word)| word).collect();
        assert_eq!(words.len(), crossword.variable_count());

        // The long down is the only five-letter slot and must start with the short across.
        let across = result
            .assignment
            .word_for(&crossword, &word_list, &Variable::new(0, 1, Direction::Across, 3))
            .unwrap();
        let down = result
            .assignment
            .word_for(&crossword, &word_list, &Variable::new(0, 1, Direction::Down, 5))
            .unwrap();
        assert_eq!(across.chars().next(), down.chars().next());
    }
}

#[test]
fn test_fill_is_deterministic() {
    let crossword = load_structure("structure0.txt");
    let word_list = WordList::load(data_path("words0.txt")).unwrap();

    let first = solve(&crossword, &word_list).expect("Failed to find a fill");
    let second = solve(&crossword, &word_list).expect("Failed to find a fill");

    assert_eq!(first, second);
}

/// _____
/// _#_#_
/// _____
/// _#_#_
/// _____
#[test]
fn test_fill_fails_gracefully() {
    let crossword = load_structure("structure1.txt");
    let word_list = WordList::load(data_path("words0.txt")).unwrap();

    assert!(solve(&crossword, &word_list).is_none());

    let failure = find_fill(
        &crossword,
        &word_list,
        &FillOptions::default().with_maintain_arc_consistency(true),
    )
    .expect_err("Found an impossible fill??");
    println!("{}", failure);
}

#[test]
fn test_empty_word_list_has_no_solution() {
    let crossword = load_structure("structure0.txt");

    assert!(solve(&crossword, &WordList::default()).is_none());
}
