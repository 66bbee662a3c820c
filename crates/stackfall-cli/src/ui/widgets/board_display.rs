use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, BlockExt, Paragraph, Widget},
};
use stackfall_engine::{Coord, Grid, TetrominoKind};

use crate::ui::widgets::style;

/// Renders the playfield: locked cells from the grid, the falling piece
/// and its drop preview overlaid on top. Each cell is two columns wide.
#[derive(Debug)]
pub(crate) struct BoardDisplay<'a> {
    grid: &'a Grid,
    falling: Option<(TetrominoKind, [Coord; 4])>,
    ghost: Option<[Coord; 4]>,
    block: Option<Block<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub(crate) fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            falling: None,
            ghost: None,
            block: None,
        }
    }

    pub(crate) fn falling(self, kind: TetrominoKind, cells: [Coord; 4]) -> Self {
        Self {
            falling: Some((kind, cells)),
            ..self
        }
    }

    pub(crate) fn ghost(self, cells: [Coord; 4]) -> Self {
        Self {
            ghost: Some(cells),
            ..self
        }
    }

    pub(crate) fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Total width in terminal columns, border included.
    pub(crate) fn width(&self) -> u16 {
        let cells = u16::try_from(self.grid.width()).unwrap_or(u16::MAX / 2) * 2;
        cells + if self.block.is_some() { 2 } else { 0 }
    }

    fn cell_span(&self, coord: Coord) -> Span<'static> {
        if let Some((kind, cells)) = &self.falling
            && cells.contains(&coord)
        {
            return Span::styled("  ", style::for_kind(*kind));
        }
        if let Some(cells) = &self.ghost
            && cells.contains(&coord)
        {
            return Span::styled("[]", style::GHOST);
        }
        match self.grid.cell(coord) {
            Some(Some(kind)) => Span::styled("  ", style::for_kind(kind)),
            _ => Span::styled(" .", style::EMPTY),
        }
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        // Top row first; the grid's row 0 is the bottom.
        let lines: Vec<Line<'_>> = (0..self.grid.height())
            .rev()
            .map(|y| Line::from((0..self.grid.width()).map(|x| self.cell_span((x, y))).collect::<Vec<_>>()))
            .collect();
        Paragraph::new(Text::from(lines)).render(area, buf);
    }
}
