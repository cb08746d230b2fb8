//! Terminal preview of a rendered canvas
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use ortho3d_core::Canvas;
use std::io::Write;

/// Character ramp for brightness (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Downsamples a canvas onto a grid of terminal cells
pub struct TerminalPreview {
    columns: usize,
    rows: usize,
}

impl TerminalPreview {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    /// Largest grid that fits in `columns` x `rows` cells without upsampling
    /// the canvas
    pub fn fit(canvas: &Canvas, columns: usize, rows: usize) -> Self {
        Self::new(columns.min(canvas.width()), rows.min(canvas.height()))
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell character and its terminal color, sampled from the nearest pixel
    fn cell(&self, canvas: &Canvas, row: usize, column: usize) -> (char, Color) {
        let x = row * canvas.height() / self.rows;
        let y = column * canvas.width() / self.columns;
        let Some(pixel) = canvas.pixel(x, y) else {
            return (' ', Color::Reset);
        };

        let brightness = pixel.max().clamp(0.0, 1.0);
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;

        (
            character,
            Color::Rgb {
                r: channel(pixel.x),
                g: channel(pixel.y),
                b: channel(pixel.z),
            },
        )
    }

    pub fn draw<W: Write>(&self, canvas: &Canvas, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let (c, color) = self.cell(canvas, row, column);
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use ortho3d_core::TriangleSurface;

    #[test]
    fn test_fit_never_upsamples() {
        let canvas = Canvas::new(10, 20);
        let preview = TerminalPreview::fit(&canvas, 80, 24);
        assert_eq!(preview.columns(), 20);
        assert_eq!(preview.rows(), 10);
    }

    #[test]
    fn test_draw_shows_lit_cells() {
        let mut canvas = Canvas::new(10, 10);
        canvas.set_camera_normal(Vector3::z()).unwrap();
        TriangleSurface::new(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(9.0, 0.0, 1.0),
            Vector3::new(0.0, 9.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .project(&mut canvas)
        .unwrap();

        let preview = TerminalPreview::new(5, 5);
        assert_eq!(preview.cell(&canvas, 0, 0).0, '@');
        assert_eq!(preview.cell(&canvas, 4, 4).0, ' ');

        let mut out = Vec::new();
        preview.draw(&canvas, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('@'));
        assert_eq!(text.matches('\n').count(), 5);
    }
}
