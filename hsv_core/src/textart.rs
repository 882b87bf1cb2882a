use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::RgbaImage;
use tracing::debug;

use crate::color::Color;
use crate::error::{HsvError, Result};

/// Sparse to dense. Brighter pixels pick glyphs further right.
pub const DEFAULT_RAMP: &str = " .:-=+*#%@";

/// Glyph used to fill pattern cells.
pub const BLOCK: char = '█';

/// Largest accepted row multiplier in [`TextArtOptions::aspect`].
pub const MAX_ASPECT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

/// Rows of colored characters, fully materialized. Built from images,
/// gradients or patterns; nothing is cached between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextArt {
    pub rows: Vec<Vec<Cell>>,
}

impl TextArt {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Characters only, rows separated by `\n`.
    pub fn to_plain_string(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rich-text markup: runs of equal color share one `<color=#RRGGBBAA>` tag.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let mut open: Option<[u8; 4]> = None;
            for cell in row {
                let rgba = cell.color.to_rgba8();
                if open != Some(rgba) {
                    if open.is_some() {
                        out.push_str("</color>");
                    }
                    out.push_str(&format!("<color={}>", cell.color.to_hex(true)));
                    open = Some(rgba);
                }
                out.push(cell.ch);
            }
            if open.is_some() {
                out.push_str("</color>");
            }
        }
        out
    }
}

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    fn label(&self) -> String {
        match self {
            ImageSource::Path(p) => format!("image '{}'", p.display()),
            ImageSource::Bytes(b) => format!("image bytes ({} bytes)", b.len()),
        }
    }

    fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            ImageSource::Path(p) => std::fs::read(p)
                .map(Cow::Owned)
                .map_err(|e| HsvError::resource(self.label(), e)),
            ImageSource::Bytes(b) => Ok(Cow::Borrowed(b.as_slice())),
        }
    }
}

impl From<&Path> for ImageSource {
    fn from(p: &Path) -> Self {
        ImageSource::Path(p.to_path_buf())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(b: Vec<u8>) -> Self {
        ImageSource::Bytes(b)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(b: &[u8]) -> Self {
        ImageSource::Bytes(b.to_vec())
    }
}

/// Knobs for [`from_image_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextArtOptions {
    /// Upper bound on output columns.
    pub max_width: u32,
    /// Glyphs ordered from sparse to dense.
    pub ramp: Vec<char>,
    /// Multiplier on the row count. 1.0 keeps the pixel aspect ratio; about
    /// 0.5 compensates for terminal cells being twice as tall as wide.
    pub aspect: f64,
}

impl TextArtOptions {
    pub fn new(max_width: u32) -> Self {
        Self {
            max_width,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_width == 0 {
            return Err(HsvError::range("max_width must be at least 1"));
        }
        if self.ramp.is_empty() {
            return Err(HsvError::Value("character ramp is empty".into()));
        }
        if !(self.aspect > 0.0 && self.aspect <= MAX_ASPECT) {
            return Err(HsvError::range(format!(
                "aspect must be in (0, {MAX_ASPECT}], got {}",
                self.aspect
            )));
        }
        Ok(())
    }
}

impl Default for TextArtOptions {
    fn default() -> Self {
        Self {
            max_width: 40,
            ramp: DEFAULT_RAMP.chars().collect(),
            aspect: 1.0,
        }
    }
}

/// Pick the ramp glyph for a pixel. Luminance is weighted by alpha, so faint
/// pixels read sparse and fully transparent ones are blank.
pub fn glyph_for(color: &Color, ramp: &[char]) -> char {
    if color.a() == 0.0 || ramp.is_empty() {
        return ' ';
    }
    let last = ramp.len() - 1;
    let idx = (color.luminance() * color.a() * last as f64).round() as usize;
    ramp[idx.min(last)]
}

/// Output grid size for an image of `width` x `height` pixels.
fn target_size(width: u32, height: u32, opts: &TextArtOptions) -> (u32, u32) {
    let cols = width.min(opts.max_width).max(1);
    let scale = f64::from(cols) / f64::from(width);
    let rows = (f64::from(height) * scale * opts.aspect).round().max(1.0);
    (cols, rows as u32)
}

/// Source pixel span `[start, end)` covered by output cell `i` of `n`.
fn span(i: u32, n: u32, len: u32) -> (u32, u32) {
    let start = (u64::from(i) * u64::from(len) / u64::from(n)) as u32;
    let end = (u64::from(i + 1) * u64::from(len) / u64::from(n)) as u32;
    (start, end.max(start + 1).min(len))
}

/// Mean color of the source block behind cell (`cx`, `cy`), with RGB weighted
/// by alpha so invisible pixels don't tint their neighbours.
fn block_average(pixels: &RgbaImage, cx: u32, cy: u32, cols: u32, rows: u32) -> Color {
    let (x0, x1) = span(cx, cols, pixels.width());
    let (y0, y1) = span(cy, rows, pixels.height());

    let mut weighted = [0u64; 3];
    let mut plain = [0u64; 3];
    let mut alpha = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let [r, g, b, a] = pixels.get_pixel(x, y).0;
            for (i, c) in [r, g, b].into_iter().enumerate() {
                weighted[i] += u64::from(c) * u64::from(a);
                plain[i] += u64::from(c);
            }
            alpha += u64::from(a);
        }
    }

    let n = u64::from(x1 - x0) * u64::from(y1 - y0);
    let rounded = |sum: u64, count: u64| ((sum + count / 2) / count).min(255) as u8;
    let [r, g, b] = if alpha == 0 {
        plain.map(|c| rounded(c, n))
    } else {
        weighted.map(|c| rounded(c, alpha))
    };
    Color::from_rgba8(r, g, b, rounded(alpha, n))
}

pub fn from_image(source: &ImageSource, max_width: u32) -> Result<TextArt> {
    from_image_with(source, &TextArtOptions::new(max_width))
}

/// Decode `source`, scale it to fit `opts.max_width` columns, and map each
/// cell to a glyph colored like the source block it covers.
pub fn from_image_with(source: &ImageSource, opts: &TextArtOptions) -> Result<TextArt> {
    opts.validate()?;

    let bytes = source.read()?;
    let img = image::load_from_memory(&bytes).map_err(|e| HsvError::resource(source.label(), e))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        debug!(source = %source.label(), "empty image");
        return Ok(TextArt::default());
    }

    let (cols, rows) = target_size(width, height, opts);
    debug!(source = %source.label(), width, height, cols, rows, "sampling image");

    let pixels = img.to_rgba8();
    let grid = (0..rows)
        .map(|cy| {
            (0..cols)
                .map(|cx| {
                    let color = block_average(&pixels, cx, cy, cols, rows);
                    Cell {
                        ch: glyph_for(&color, &opts.ramp),
                        color,
                    }
                })
                .collect()
        })
        .collect();

    Ok(TextArt { rows: grid })
}

/// One row holding `text`, colored from `start` (first char) to `end` (last).
pub fn gradient_text(text: &str, start: &Color, end: &Color) -> TextArt {
    let chars: Vec<char> = text.chars().collect();
    let last = chars.len().saturating_sub(1);
    let row = chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let t = if last == 0 { 0.0 } else { i as f64 / last as f64 };
            Cell {
                ch,
                color: start.mix(end, t),
            }
        })
        .collect();
    TextArt { rows: vec![row] }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    Checkerboard,
    /// Alternates by row.
    Stripes,
    /// Alternates by column.
    VerticalStripes,
    Solid,
    /// Left-to-right blend from the first color to the second.
    Gradient,
}

impl FromStr for PatternType {
    type Err = HsvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checkerboard" => Ok(PatternType::Checkerboard),
            "stripes" => Ok(PatternType::Stripes),
            "vertical_stripes" | "vertical-stripes" => Ok(PatternType::VerticalStripes),
            "solid" => Ok(PatternType::Solid),
            "gradient" => Ok(PatternType::Gradient),
            other => Err(HsvError::format(format!("unknown pattern type '{other}'"))),
        }
    }
}

impl PatternType {
    fn color_at(self, row: usize, col: usize, width: usize, c1: &Color, c2: &Color) -> Color {
        let pick = |first: bool| if first { *c1 } else { *c2 };
        match self {
            PatternType::Checkerboard => pick((row + col) % 2 == 0),
            PatternType::Stripes => pick(row % 2 == 0),
            PatternType::VerticalStripes => pick(col % 2 == 0),
            PatternType::Solid => *c1,
            PatternType::Gradient => {
                let t = if width <= 1 {
                    0.0
                } else {
                    col as f64 / (width - 1) as f64
                };
                c1.mix(c2, t)
            }
        }
    }
}

/// A `width` x `height` grid of block glyphs colored by `pattern_type`.
pub fn create_pattern(
    width: usize,
    height: usize,
    pattern_type: &str,
    color1: &Color,
    color2: &Color,
) -> Result<TextArt> {
    let pattern: PatternType = pattern_type.parse()?;
    let rows = (0..height)
        .map(|row| {
            (0..width)
                .map(|col| Cell {
                    ch: BLOCK,
                    color: pattern.color_at(row, col, width, color1, color2),
                })
                .collect()
        })
        .collect();
    Ok(TextArt { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(img: &RgbaImage) -> anyhow::Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    #[test]
    fn maps_pixels_to_glyphs_and_colors() -> anyhow::Result<()> {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 0, Rgba([255, 255, 255, 0]));

        let art = from_image(&ImageSource::Bytes(png(&img)?), 10)?;
        assert_eq!(art.height(), 1);
        assert_eq!(art.to_plain_string(), "@  ");
        assert_eq!(art.rows[0][0].color, Color::WHITE);
        assert_eq!(art.rows[0][1].color, Color::BLACK);
        assert_eq!(art.rows[0][2].color.a(), 0.0);
        Ok(())
    }

    #[test]
    fn mid_gray_lands_mid_ramp() {
        let ramp: Vec<char> = DEFAULT_RAMP.chars().collect();
        let gray = Color::from_rgba8(128, 128, 128, 255);
        assert_eq!(glyph_for(&gray, &ramp), '+');
        assert_eq!(glyph_for(&Color::WHITE.with_alpha(0.0).unwrap(), &ramp), ' ');
    }

    #[test]
    fn downsamples_to_max_width_keeping_aspect() -> anyhow::Result<()> {
        let img = RgbaImage::from_pixel(20, 8, Rgba([200, 10, 10, 255]));
        let source = ImageSource::Bytes(png(&img)?);

        let art = from_image(&source, 5)?;
        assert_eq!((art.width(), art.height()), (5, 2));
        assert!(art.rows.iter().flatten().all(|c| c.color.to_rgb_tuple() == (200, 10, 10)));

        let tiny = from_image(&ImageSource::Bytes(png(&RgbaImage::new(40, 1))?), 4)?;
        assert_eq!((tiny.width(), tiny.height()), (4, 1));

        let halved = from_image_with(
            &source,
            &TextArtOptions {
                aspect: 0.5,
                ..TextArtOptions::new(10)
            },
        )?;
        assert_eq!((halved.width(), halved.height()), (10, 2));
        Ok(())
    }

    #[test]
    fn transparent_pixels_do_not_tint_downsampled_cells() -> anyhow::Result<()> {
        let mut img = RgbaImage::new(4, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));

        let art = from_image(&ImageSource::Bytes(png(&img)?), 1)?;
        assert_eq!((art.width(), art.height()), (1, 1));
        let cell = art.rows[0][0];
        assert_eq!(cell.color.to_hex(true), "#FF000080");
        assert_eq!(cell.ch, '.');

        let half = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        });
        let art = from_image(&ImageSource::Bytes(png(&half)?), 2)?;
        assert_eq!(art.to_plain_string(), "@ \n@ ");
        assert!(art.rows.iter().all(|row| row[1].color.a() == 0.0));
        Ok(())
    }

    #[test]
    fn faint_pixels_pick_sparse_glyphs() -> anyhow::Result<()> {
        let ramp: Vec<char> = DEFAULT_RAMP.chars().collect();
        assert_eq!(glyph_for(&Color::WHITE, &ramp), '@');
        assert_eq!(glyph_for(&Color::WHITE.with_alpha(0.5)?, &ramp), '+');
        assert_eq!(glyph_for(&Color::from_rgba8(255, 255, 255, 1), &ramp), ' ');
        Ok(())
    }

    #[test]
    fn rejects_oversized_aspect() -> anyhow::Result<()> {
        let source = ImageSource::Bytes(png(&RgbaImage::new(2, 2))?);
        for aspect in [1e12, f64::INFINITY, f64::NAN, 0.0, -1.0] {
            let opts = TextArtOptions {
                aspect,
                ..TextArtOptions::new(10)
            };
            assert!(matches!(from_image_with(&source, &opts), Err(HsvError::Range(_))));
        }
        let tall = from_image_with(
            &source,
            &TextArtOptions {
                aspect: MAX_ASPECT,
                ..TextArtOptions::new(10)
            },
        )?;
        assert_eq!((tall.width(), tall.height()), (2, 8));
        Ok(())
    }

    #[test]
    fn same_input_same_output() -> anyhow::Result<()> {
        let img = RgbaImage::from_fn(9, 7, |x, y| Rgba([(x * 28) as u8, (y * 36) as u8, 90, 255]));
        let source = ImageSource::Bytes(png(&img)?);
        assert_eq!(from_image(&source, 4)?, from_image(&source, 4)?);
        Ok(())
    }

    #[test]
    fn unreadable_images_are_resource_errors() -> anyhow::Result<()> {
        let garbage = ImageSource::Bytes(b"not an image".to_vec());
        assert!(matches!(from_image(&garbage, 10), Err(HsvError::Resource { .. })));

        let dir = tempfile::tempdir()?;
        let missing = ImageSource::from(dir.path().join("missing.png"));
        assert!(matches!(from_image(&missing, 10), Err(HsvError::Resource { .. })));

        assert!(matches!(from_image(&garbage, 0), Err(HsvError::Range(_))));
        Ok(())
    }

    #[test]
    fn reads_images_from_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dot.png");
        RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])).save(&path)?;

        let art = from_image(&ImageSource::from(path.as_path()), 8)?;
        assert_eq!((art.width(), art.height()), (2, 2));
        assert_eq!(art.rows[1][1].color, Color::GREEN);
        Ok(())
    }

    #[test]
    fn gradient_runs_from_start_to_end() {
        let art = gradient_text("HELLO", &Color::RED, &Color::BLUE);
        assert_eq!(art.height(), 1);
        assert_eq!(art.to_plain_string(), "HELLO");
        let row = &art.rows[0];
        assert_eq!(row[0].color, Color::RED);
        assert_eq!(row[2].color.to_rgba(), [0.5, 0.0, 0.5, 1.0]);
        assert_eq!(row[4].color, Color::BLUE);

        let single = gradient_text("X", &Color::RED, &Color::BLUE);
        assert_eq!(single.rows[0][0].color, Color::RED);
        assert_eq!(gradient_text("", &Color::RED, &Color::BLUE).width(), 0);
    }

    #[test]
    fn patterns() -> anyhow::Result<()> {
        let (a, b) = (Color::BLACK, Color::WHITE);

        let checker = create_pattern(3, 2, "checkerboard", &a, &b)?;
        assert_eq!((checker.width(), checker.height()), (3, 2));
        assert_eq!(checker.rows[0][0].color, a);
        assert_eq!(checker.rows[0][1].color, b);
        assert_eq!(checker.rows[1][0].color, b);

        let stripes = create_pattern(2, 2, "stripes", &a, &b)?;
        assert_eq!(stripes.rows[0][1].color, a);
        assert_eq!(stripes.rows[1][0].color, b);

        let vertical = create_pattern(2, 2, "vertical_stripes", &a, &b)?;
        assert_eq!(vertical.rows[1][0].color, a);
        assert_eq!(vertical.rows[0][1].color, b);

        let solid = create_pattern(4, 3, "SOLID", &a, &b)?;
        assert!(solid.rows.iter().flatten().all(|c| c.color == a && c.ch == BLOCK));

        let gradient = create_pattern(3, 1, "gradient", &a, &b)?;
        assert_eq!(gradient.rows[0][1].color, Color::GRAY);

        assert!(matches!(
            create_pattern(2, 2, "plaid", &a, &b),
            Err(HsvError::Format(_))
        ));
        Ok(())
    }

    #[test]
    fn markup_groups_runs_of_one_color() -> anyhow::Result<()> {
        let art = create_pattern(3, 2, "stripes", &Color::RED, &Color::BLUE)?;
        assert_eq!(
            art.to_markup(),
            "<color=#FF0000FF>███</color>\n<color=#0000FFFF>███</color>"
        );
        let checker = create_pattern(2, 1, "checkerboard", &Color::RED, &Color::BLUE)?;
        assert_eq!(
            checker.to_markup(),
            "<color=#FF0000FF>█</color><color=#0000FFFF>█</color>"
        );
        Ok(())
    }
}
