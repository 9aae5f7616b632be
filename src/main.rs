use clap::Parser;
use crossfill::{
    find_fill, render_grid, save_image, Crossword, FillOptions, GridError, ImageExportError,
    ValueOrdering, WordList, WordListError,
};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Fill a crossword structure with words from a word list.
#[derive(Parser, Debug)]
#[command(name = "crossfill", version, about)]
struct Args {
    /// Structure file: `_` or `.` for fillable cells, anything else for blocks.
    structure: PathBuf,

    /// Word list, one word per line.
    words: PathBuf,

    /// Write the filled grid here as well as printing it. A `.png` path gets an image, anything
    /// else gets text.
    output: Option<PathBuf>,

    /// Re-run arc consistency after every choice during search.
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Try words in word list order instead of least-constraining first.
    #[arg(long)]
    no_lcv: bool,

    /// Print search statistics.
    #[arg(long)]
    stats: bool,
}

#[derive(Debug)]
enum CliError {
    Io { path: PathBuf, source: std::io::Error },
    Grid(GridError),
    WordList(WordListError),
    Image(ImageExportError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            CliError::Grid(err) => write!(f, "Invalid structure: {err}"),
            CliError::WordList(err) => write!(f, "{err}"),
            CliError::Image(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<GridError> for CliError {
    fn from(value: GridError) -> Self {
        CliError::Grid(value)
    }
}

impl From<WordListError> for CliError {
    fn from(value: WordListError) -> Self {
        CliError::WordList(value)
    }
}

impl From<ImageExportError> for CliError {
    fn from(value: ImageExportError) -> Self {
        CliError::Image(value)
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| extension.eq_ignore_ascii_case("png"))
}

fn load_inputs(args: &Args) -> Result<(Crossword, WordList), CliError> {
    let template = fs::read_to_string(&args.structure)
        .map_err(|source| CliError::Io { path: args.structure.clone(), source })?;
    let crossword = Crossword::from_template(&template)?;
    let word_list = WordList::load(&args.words)?;
    Ok((crossword, word_list))
}

fn run(args: &Args) -> Result<bool, CliError> {
    let (crossword, word_list) = load_inputs(args)?;

    let options = FillOptions::default()
        .with_maintain_arc_consistency(args.maintain_arc_consistency)
        .with_value_ordering(if args.no_lcv {
            ValueOrdering::WordList
        } else {
            ValueOrdering::LeastConstraining
        });

    match find_fill(&crossword, &word_list, &options) {
        Ok(success) => {
            if args.stats {
                println!("{:?}", success.statistics);
            }

            let display_grid = render_grid(&crossword, &word_list, &success.assignment);
            println!("{}", display_grid);

            if let Some(output) = &args.output {
                if is_png(output) {
                    save_image(&crossword, &word_list, &success.assignment, output)?;
                } else {
                    fs::write(output, display_grid + "\n")
                        .map_err(|source| CliError::Io { path: output.clone(), source })?;
                }
                log::info!("Wrote fill to {}", output.display());
            }
            Ok(true)
        }
        Err(failure) => {
            if args.stats {
                println!("{:?}", failure.statistics);
            }
            println!("No solution.");
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_png;
    use std::path::Path;

    #[test]
    fn test_is_png() {
        assert!(is_png(Path::new("out.png")));
        assert!(is_png(Path::new("dir/OUT.PNG")));
        assert!(!is_png(Path::new("out.txt")));
        assert!(!is_png(Path::new("png")));
    }
}
