use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the driver to present the machine's framebuffer. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// render one frame of unpacked pixel cells (row-major, zero is off)
    fn draw(&mut self, cells: &[u8]) -> Result<(), io::Error>;

    /// how many pixel cells a frame carries
    fn cell_count(&mut self) -> usize;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn cell_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// coordinates of every cell on the given plane, suitable for a TUI
    /// canvas (y runs negative so row 0 renders at the top)
    fn plane_from_cells<'a>(
        &self,
        cells: &'a [u8],
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.cell_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                if (cells[count] != 0) == lit {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI over crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, cells: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            cells.len(),
            self.resolution.cell_count(),
            "MonoTermDisplay must have correct-sized data to draw"
        );

        // for now this assumes a 1:1 ratio between terminal, machine and
        // the internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(
                0,
                0,
                2 + self.resolution.0 as u16,
                2 + self.resolution.1 as u16,
            );

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(self.resolution.x_bounds())
                .y_bounds(self.resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // paint the off plane first so a lit cell is never
                    // overdrawn by its dark neighbour
                    ctx.draw(&Points {
                        coords: &self
                            .resolution
                            .plane_from_cells(cells, false)
                            .collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &self
                            .resolution
                            .plane_from_cells(cells, true)
                            .collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    fn cell_count(&mut self) -> usize {
        self.resolution.cell_count()
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay;

impl DummyDisplay {
    #[allow(dead_code)]
    pub fn new() -> Result<DummyDisplay, io::Error> {
        Ok(DummyDisplay {})
    }
}

impl Display for DummyDisplay {
    #[allow(unused)]
    fn draw(&mut self, cells: &[u8]) -> Result<(), io::Error> {
        Ok(())
    }

    fn cell_count(&mut self) -> usize {
        64 * 32
    }
}
