//! Text and PNG output for a filled (or partially filled) grid.

use std::fmt;
use std::path::Path;

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{ImageError, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::backtracking_search::Assignment;
use crate::grid_config::Crossword;
use crate::word_list::WordList;

/// Character used for cells that can't hold a letter.
pub const BLOCK: char = '█';

/// Side of one cell in a rendered image, in pixels.
pub const CELL_SIZE: u32 = 100;

/// Black margin kept around each fillable cell.
pub const CELL_BORDER: u32 = 2;

const FONT_SIZE: f32 = 80.0;
const FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug)]
pub enum ImageExportError {
    Font(InvalidFont),
    Image(ImageError),
}

impl fmt::Display for ImageExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageExportError::Font(err) => write!(f, "Failed to load font: {err}"),
            ImageExportError::Image(err) => write!(f, "Failed to write image: {err}"),
        }
    }
}

impl std::error::Error for ImageExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageExportError::Font(err) => Some(err),
            ImageExportError::Image(err) => Some(err),
        }
    }
}

impl From<InvalidFont> for ImageExportError {
    fn from(value: InvalidFont) -> Self {
        ImageExportError::Font(value)
    }
}

impl From<ImageError> for ImageExportError {
    fn from(value: ImageError) -> Self {
        ImageExportError::Image(value)
    }
}

/// Place every assigned word's letters into a `height x width` grid.
pub fn letter_grid(
    crossword: &Crossword,
    word_list: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let (height, width) = crossword.dimensions();
    let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; width]; height];

    for (variable, word) in assignment.words(crossword, word_list) {
        for ((row, col), c) in variable.cell_coords().zip(word.chars()) {
            letters[row][col] = Some(c);
        }
    }

    letters
}

/// Turn the given crossword and assignment into a rendered string, one line per row.
pub fn render_grid(crossword: &Crossword, word_list: &WordList, assignment: &Assignment) -> String {
    let (height, width) = crossword.dimensions();
    let letters = letter_grid(crossword, word_list, assignment);

    (0..height)
        .map(|row| {
            (0..width)
                .map(|col| {
                    if crossword.is_fillable(row, col) {
                        letters[row][col].unwrap_or(' ')
                    } else {
                        BLOCK
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Draw the grid as an image: a black canvas with a white square for every fillable cell and
/// each assigned letter centered in its square.
pub fn draw_image(
    crossword: &Crossword,
    word_list: &WordList,
    assignment: &Assignment,
) -> Result<RgbaImage, ImageExportError> {
    let font = FontRef::try_from_slice(FONT_DATA)?;
    let scale = PxScale::from(FONT_SIZE);

    let (height, width) = crossword.dimensions();
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;
    let letters = letter_grid(crossword, word_list, assignment);

    let mut image =
        RgbaImage::from_pixel(width as u32 * CELL_SIZE, height as u32 * CELL_SIZE, BLACK);

    for row in 0..height {
        for col in 0..width {
            if !crossword.is_fillable(row, col) {
                continue;
            }

            let left = (col as u32 * CELL_SIZE + CELL_BORDER) as i32;
            let top = (row as u32 * CELL_SIZE + CELL_BORDER) as i32;
            draw_filled_rect_mut(
                &mut image,
                Rect::at(left, top).of_size(interior_size, interior_size),
                WHITE,
            );

            if let Some(letter) = letters[row][col] {
                let text = letter.to_string();
                let (text_width, text_height) = text_size(scale, &font, &text);
                let x = left + (interior_size as i32 - text_width as i32) / 2;
                let y = top + (interior_size as i32 - text_height as i32) / 2;
                draw_text_mut(&mut image, BLACK, x, y, scale, &font, &text);
            }
        }
    }

    Ok(image)
}

/// Draw the grid and save it to `path`. The format follows the file extension.
pub fn save_image<P: AsRef<Path>>(
    crossword: &Crossword,
    word_list: &WordList,
    assignment: &Assignment,
    path: P,
) -> Result<(), ImageExportError> {
    let image = draw_image(crossword, word_list, assignment)?;
    image.save(path.as_ref())?;
    log::debug!("Saved {}x{} image to {}", image.width(), image.height(), path.as_ref().display());
    Ok(())
}
