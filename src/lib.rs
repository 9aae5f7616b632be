pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod render;
pub mod word_list;

pub use backtracking_search::{
    find_fill, solve, Assignment, FillFailure, FillOptions, FillSuccess, FailureStage, Statistics,
    ValueOrdering,
};
pub use grid_config::{Crossword, Direction, GridError, Variable, VariableId};
pub use render::{draw_image, letter_grid, render_grid, save_image, ImageExportError};
pub use word_list::{WordId, WordList, WordListError};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
