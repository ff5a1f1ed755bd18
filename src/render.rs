use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::snake::{Cell, Snake};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parses `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| format!("expected a #rrggbb colour, got {:?}", s))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("bad hex digits in colour {:?}", s))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> String {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub foreground: Rgb,
}

/// Something the game can paint rectangles on.
pub trait Surface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgb);
    /// Draws a one pixel border just inside the rectangle.
    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgb);
}

/// Repaints the whole surface: background, apple outline, then the snake.
pub fn render_frame<S: Surface + ?Sized>(
    surface: &mut S,
    snake: &Snake,
    apple: Option<Cell>,
    palette: &Palette,
    cell: i32,
) {
    let (w, h) = (surface.width(), surface.height());
    surface.fill_rect(0, 0, w, h, palette.background);

    if let Some(apple) = apple {
        surface.stroke_rect(apple.x, apple.y, cell, cell, palette.foreground);
    }

    for pos in snake.body() {
        surface.fill_rect(pos.x, pos.y, cell, cell, palette.foreground);
    }
}

/// In-memory RGB pixel buffer. Drawing outside it is clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCanvas {
    width: i32,
    height: i32,
    px: Vec<Rgb>,
}

impl PixelCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        let len = width.max(0) as usize * height.max(0) as usize;
        PixelCanvas { width, height, px: vec![Rgb::default(); len] }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.px[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn set(&mut self, x: i32, y: i32, colour: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.px[i] = colour;
        }
    }
}

impl Surface for PixelCanvas {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgb) {
        let (x0, x1) = (x.max(0), (x + w).min(self.width));
        let (y0, y1) = (y.max(0), (y + h).min(self.height));

        for py in y0..y1 {
            for px in x0..x1 {
                self.set(px, py, colour);
            }
        }
    }

    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgb) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (right, bottom) = (x + w - 1, y + h - 1);

        for px in x..=right {
            self.set(px, y, colour);
            self.set(px, bottom, colour);
        }
        for py in y..=bottom {
            self.set(x, py, colour);
            self.set(right, py, colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(0xb3, 0xbc, 0x2f);
    const FG: Rgb = Rgb::new(0x35, 0x36, 0x0c);
    const PALETTE: Palette = Palette { background: BG, foreground: FG };

    #[test]
    fn test_parse_colour() {
        assert_eq!("#b3bc2f".parse::<Rgb>().unwrap(), BG);
        assert_eq!(FG.to_string(), "#35360c");
        assert!("b3bc2f".parse::<Rgb>().is_err());
        assert!("#b3bc2".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_colour_serde() {
        let c: Rgb = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(c, Rgb::new(0, 0, 0));
        assert_eq!(serde_json::to_string(&BG).unwrap(), "\"#b3bc2f\"");
    }

    #[test]
    fn test_frame_contents() {
        let mut canvas = PixelCanvas::new(100, 100);
        let snake = Snake::initial(20, 100, 100).unwrap();
        render_frame(&mut canvas, &snake, Some(Cell::new(0, 0)), &PALETTE, 20);

        // Snake cells are filled.
        assert_eq!(canvas.pixel(65, 45), Some(FG));
        assert_eq!(canvas.pixel(20, 40), Some(FG));
        // The apple is an outline around background.
        assert_eq!(canvas.pixel(0, 0), Some(FG));
        assert_eq!(canvas.pixel(19, 19), Some(FG));
        assert_eq!(canvas.pixel(10, 10), Some(BG));
        // Everything else is background.
        assert_eq!(canvas.pixel(99, 99), Some(BG));
    }

    #[test]
    fn test_render_is_idempotent() {
        let snake = Snake::initial(20, 100, 100).unwrap();
        let apple = Some(Cell::new(80, 80));

        let mut once = PixelCanvas::new(100, 100);
        render_frame(&mut once, &snake, apple, &PALETTE, 20);
        let mut twice = once.clone();
        render_frame(&mut twice, &snake, apple, &PALETTE, 20);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_repaint_clears_old_frame() {
        let mut canvas = PixelCanvas::new(100, 100);
        let snake = Snake::initial(20, 100, 100).unwrap();
        render_frame(&mut canvas, &snake, Some(Cell::new(0, 0)), &PALETTE, 20);

        let moved = snake.advance(20, crate::snake::Direction::Down);
        render_frame(&mut canvas, &moved, None, &PALETTE, 20);
        assert_eq!(canvas.pixel(0, 0), Some(BG));
        assert_eq!(canvas.pixel(25, 45), Some(BG));
        assert_eq!(canvas.pixel(65, 65), Some(FG));
    }

    #[test]
    fn test_drawing_is_clipped() {
        let mut canvas = PixelCanvas::new(40, 40);
        canvas.fill_rect(30, 30, 20, 20, FG);
        canvas.stroke_rect(-10, -10, 20, 20, FG);
        assert_eq!(canvas.pixel(39, 39), Some(FG));
        assert_eq!(canvas.pixel(9, 0), Some(FG));
        assert_eq!(canvas.pixel(40, 40), None);
    }
}
