//! The static structure of a grid: which cells can hold letters, which slots (variables) exist,
//! and where those slots cross each other. Everything here is validated once at construction, so
//! the solver never has to re-check it.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given variable, based on its index in the Crossword's `variable_configs`
/// field.
pub type VariableId = usize;

/// Zero-indexed row and column for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// One contiguous slot in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this variable.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        })
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}

/// A crossing between one variable and another, referencing the other variable's id and the
/// location of the intersection within the other variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_variable_id: VariableId,
    pub other_variable_cell: usize,
}

/// The static per-variable data the solver reads.
#[derive(Debug, Clone)]
pub struct VariableConfig {
    pub id: VariableId,
    pub variable: Variable,
    /// One entry per cell of the variable.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
    /// Ids of every variable crossing this one, ascending.
    pub neighbors: SmallVec<[VariableId; MAX_SLOT_LENGTH]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The structure has no rows or no columns.
    EmptyStructure,
    /// A row's width differs from the first row's.
    RaggedRows { row: usize, expected: usize, found: usize },
    ZeroLength { variable: Variable },
    OutOfBounds { variable: Variable },
    /// The variable covers a cell that can't hold a letter.
    BlockedCell { variable: Variable, cell: GridCoord },
    DuplicateVariable { variable: Variable },
    /// More than two variables share this cell.
    TooManyCrossings { cell: GridCoord },
    /// Two variables share more than one cell.
    MultipleOverlaps { first: Variable, second: Variable },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::EmptyStructure => write!(f, "Grid structure is empty"),
            GridError::RaggedRows { row, expected, found } => write!(
                f,
                "Row {row} has {found} cells but the grid is {expected} cells wide"
            ),
            GridError::ZeroLength { variable } => write!(f, "Variable {variable} has no cells"),
            GridError::OutOfBounds { variable } => {
                write!(f, "Variable {variable} extends outside the grid")
            }
            GridError::BlockedCell { variable, cell } => write!(
                f,
                "Variable {variable} covers blocked cell ({}, {})",
                cell.0, cell.1
            ),
            GridError::DuplicateVariable { variable } => {
                write!(f, "Variable {variable} appears more than once")
            }
            GridError::TooManyCrossings { cell } => write!(
                f,
                "More than two variables share cell ({}, {})",
                cell.0, cell.1
            ),
            GridError::MultipleOverlaps { first, second } => {
                write!(f, "Variables {first} and {second} share more than one cell")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// The immutable structure of a crossword.
#[derive(Debug, Clone)]
pub struct Crossword {
    height: usize,
    width: usize,
    cells: Vec<Vec<bool>>,
    variable_configs: Vec<VariableConfig>,
    ids_by_variable: HashMap<Variable, VariableId>,
}

impl Crossword {
    /// Parse a structure from text, one row per non-blank line. `_` and `.` mark fillable cells;
    /// anything else is a block.
    pub fn from_template(template: &str) -> Result<Crossword, GridError> {
        let cells: Vec<Vec<bool>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().map(|c| c == '_' || c == '.').collect())
                }
            })
            .collect();

        Crossword::from_cells(cells)
    }

    /// Build a crossword from a cell grid, deriving one variable for every maximal run of at
    /// least two fillable cells. Across variables come first, each group in row-major order.
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Crossword, GridError> {
        let (height, width) = check_dimensions(&cells)?;

        fn build_runs(
            lines: usize,
            line_length: usize,
            is_fillable: impl Fn(usize, usize) -> bool,
        ) -> Vec<(usize, usize, usize)> {
            let mut result = vec![];

            for line in 0..lines {
                let mut run_start: Option<usize> = None;

                for pos in 0..=line_length {
                    let fillable = pos < line_length && is_fillable(line, pos);
                    match (fillable, run_start) {
                        (true, None) => run_start = Some(pos),
                        (false, Some(start)) => {
                            if pos - start > 1 {
                                result.push((line, start, pos - start));
                            }
                            run_start = None;
                        }
                        _ => {}
                    }
                }
            }

            result
        }

        let across = build_runs(height, width, |row, col| cells[row][col])
            .into_iter()
            .map(|(row, col, length)| Variable::new(row, col, Direction::Across, length));

        let mut down: Vec<Variable> = build_runs(width, height, |col, row| cells[row][col])
            .into_iter()
            .map(|(col, row, length)| Variable::new(row, col, Direction::Down, length))
            .collect();
        down.sort_by_key(|variable| (variable.row, variable.col));

        let variables: Vec<Variable> = across.chain(down).collect();

        Crossword::with_variables(cells, variables)
    }

    /// Build a crossword from a cell grid and an explicit variable list.
    pub fn with_variables(
        cells: Vec<Vec<bool>>,
        variables: Vec<Variable>,
    ) -> Result<Crossword, GridError> {
        let (height, width) = check_dimensions(&cells)?;

        let mut ids_by_variable: HashMap<Variable, VariableId> = HashMap::new();

        // Build a map from cell location to the variables involved, which we can then use to
        // calculate crossings.
        let mut entries_by_cell: HashMap<GridCoord, SmallVec<[(VariableId, usize); 2]>> =
            HashMap::new();

        for (variable_id, variable) in variables.iter().enumerate() {
            if variable.length == 0 {
                return Err(GridError::ZeroLength { variable: *variable });
            }

            // One past the last cell, in each dimension.
            let end = match variable.direction {
                Direction::Across => variable
                    .row
                    .checked_add(1)
                    .zip(variable.col.checked_add(variable.length)),
                Direction::Down => variable
                    .row
                    .checked_add(variable.length)
                    .zip(variable.col.checked_add(1)),
            };
            match end {
                Some((end_row, end_col)) if end_row <= height && end_col <= width => {}
                _ => return Err(GridError::OutOfBounds { variable: *variable }),
            }

            if ids_by_variable.insert(*variable, variable_id).is_some() {
                return Err(GridError::DuplicateVariable { variable: *variable });
            }

            for (cell_idx, cell) in variable.cell_coords().enumerate() {
                if !cells[cell.0][cell.1] {
                    return Err(GridError::BlockedCell { variable: *variable, cell });
                }

                let entries = entries_by_cell.entry(cell).or_default();
                if entries.len() == 2 {
                    return Err(GridError::TooManyCrossings { cell });
                }
                entries.push((variable_id, cell_idx));
            }
        }

        let mut variable_configs: Vec<VariableConfig> = Vec::with_capacity(variables.len());

        for (variable_id, variable) in variables.iter().enumerate() {
            let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = variable
                .cell_coords()
                .map(|cell| {
                    entries_by_cell[&cell]
                        .iter()
                        .find(|&&(other_id, _)| other_id != variable_id)
                        .map(|&(other_variable_id, other_variable_cell)| Crossing {
                            other_variable_id,
                            other_variable_cell,
                        })
                })
                .collect();

            let mut neighbors: SmallVec<[VariableId; MAX_SLOT_LENGTH]> = SmallVec::new();
            for crossing in crossings.iter().flatten() {
                if neighbors.contains(&crossing.other_variable_id) {
                    return Err(GridError::MultipleOverlaps {
                        first: *variable,
                        second: variables[crossing.other_variable_id],
                    });
                }
                neighbors.push(crossing.other_variable_id);
            }
            neighbors.sort_unstable();

            variable_configs.push(VariableConfig {
                id: variable_id,
                variable: *variable,
                crossings,
                neighbors,
            });
        }

        Ok(Crossword {
            height,
            width,
            cells,
            variable_configs,
            ids_by_variable,
        })
    }

    /// `(height, width)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row][col]
    }

    pub fn variable_count(&self) -> usize {
        self.variable_configs.len()
    }

    pub fn variable(&self, variable_id: VariableId) -> &Variable {
        &self.variable_configs[variable_id].variable
    }

    pub fn variable_id(&self, variable: &Variable) -> Option<VariableId> {
        self.ids_by_variable.get(variable).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variable_configs.iter().map(|config| &config.variable)
    }

    pub fn variable_ids(&self) -> std::ops::Range<VariableId> {
        0..self.variable_configs.len()
    }

    pub fn variable_config(&self, variable_id: VariableId) -> &VariableConfig {
        &self.variable_configs[variable_id]
    }

    /// The character positions `(index_in_x, index_in_y)` of the cell `x` and `y` share, if any.
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<(usize, usize)> {
        if x == y {
            return None;
        }

        self.variable_configs[x]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_variable_id == y => {
                    Some((cell_idx, crossing.other_variable_cell))
                }
                _ => None,
            })
    }

    pub fn neighbors(&self, variable_id: VariableId) -> &[VariableId] {
        &self.variable_configs[variable_id].neighbors
    }

    /// Every ordered pair of overlapping variables.
    pub fn arcs(&self) -> Vec<(VariableId, VariableId)> {
        self.variable_configs
            .iter()
            .flat_map(|config| config.neighbors.iter().map(move |&other| (config.id, other)))
            .collect()
    }
}

fn check_dimensions(cells: &[Vec<bool>]) -> Result<(usize, usize), GridError> {
    let height = cells.len();
    let width = cells.first().map(|row| row.len()).unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(GridError::EmptyStructure);
    }

    for (row, row_cells) in cells.iter().enumerate() {
        if row_cells.len() != width {
            return Err(GridError::RaggedRows { row, expected: width, found: row_cells.len() });
        }
    }

    Ok((height, width))
}

#[cfg(test)]
mod tests {
    use super::{Crossword, Direction, GridError, Variable};
    use crate::grid_config::Direction::{Across, Down};

    /// ____
    /// _##_
    /// ____
    #[test]
    fn test_from_template_derives_variables() {
        let crossword = Crossword::from_template(
            "
            ____
            _##_
            ____
            ",
        )
        .unwrap();

        assert_eq!(crossword.dimensions(), (3, 4));
        assert!(crossword.is_fillable(0, 0));
        assert!(!crossword.is_fillable(1, 1));
        assert!(!crossword.is_fillable(5, 5));

        let variables: Vec<Variable> = crossword.variables().cloned().collect();
        assert_eq!(
            variables,
            vec![
                Variable::new(0, 0, Across, 4),
                Variable::new(2, 0, Across, 4),
                Variable::new(0, 0, Down, 3),
                Variable::new(0, 3, Down, 3),
            ]
        );
    }

    #[test]
    fn test_single_cells_are_not_variables() {
        let crossword = Crossword::from_template(
            "
            _#_
            ###
            _#_
            ",
        )
        .unwrap();

        assert_eq!(crossword.variable_count(), 0);
    }

    #[test]
    fn test_overlaps_and_neighbors() {
        let crossword = Crossword::from_template(
            "
            ____
            _##_
            ____
            ",
        )
        .unwrap();

        let top = crossword.variable_id(&Variable::new(0, 0, Across, 4)).unwrap();
        let bottom = crossword.variable_id(&Variable::new(2, 0, Across, 4)).unwrap();
        let right = crossword.variable_id(&Variable::new(0, 3, Down, 3)).unwrap();

        assert_eq!(crossword.overlap(top, right), Some((3, 0)));
        assert_eq!(crossword.overlap(right, top), Some((0, 3)));
        assert_eq!(crossword.overlap(right, bottom), Some((2, 3)));
        assert_eq!(crossword.overlap(top, bottom), None);
        assert_eq!(crossword.overlap(top, top), None);

        assert_eq!(crossword.neighbors(top).len(), 2);
        assert!(crossword.neighbors(top).contains(&right));
        assert!(!crossword.neighbors(top).contains(&bottom));

        assert_eq!(crossword.arcs().len(), 8);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = Crossword::from_template("___\n__\n");

        assert_eq!(result.unwrap_err(), GridError::RaggedRows { row: 1, expected: 3, found: 2 });
    }

    #[test]
    fn test_rejects_empty_structure() {
        assert_eq!(Crossword::from_template("\n  \n").unwrap_err(), GridError::EmptyStructure);
    }

    #[test]
    fn test_with_variables_validates() {
        let cells = vec![vec![true, true, true], vec![true, false, true]];

        let zero = Variable::new(0, 0, Direction::Across, 0);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![zero]).unwrap_err(),
            GridError::ZeroLength { variable: zero }
        );

        let too_long = Variable::new(0, 1, Direction::Across, 3);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![too_long]).unwrap_err(),
            GridError::OutOfBounds { variable: too_long }
        );

        let huge = Variable::new(0, usize::MAX, Direction::Across, 2);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![huge]).unwrap_err(),
            GridError::OutOfBounds { variable: huge }
        );

        let huge_down = Variable::new(1, 0, Direction::Down, usize::MAX);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![huge_down]).unwrap_err(),
            GridError::OutOfBounds { variable: huge_down }
        );

        let blocked = Variable::new(0, 1, Direction::Down, 2);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![blocked]).unwrap_err(),
            GridError::BlockedCell { variable: blocked, cell: (1, 1) }
        );

        let across = Variable::new(0, 0, Direction::Across, 3);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![across, across]).unwrap_err(),
            GridError::DuplicateVariable { variable: across }
        );

        let shorter = Variable::new(0, 0, Direction::Across, 2);
        assert_eq!(
            Crossword::with_variables(cells.clone(), vec![across, shorter]).unwrap_err(),
            GridError::MultipleOverlaps { first: across, second: shorter }
        );

        let down = Variable::new(0, 0, Direction::Down, 2);
        let single = Variable::new(0, 0, Direction::Across, 1);
        assert_eq!(
            Crossword::with_variables(cells, vec![across, down, single]).unwrap_err(),
            GridError::TooManyCrossings { cell: (0, 0) }
        );
    }
}
