pub(crate) use self::board_display::BoardDisplay;

mod board_display;

pub(crate) mod style {
    use ratatui::style::{Color, Style};
    use stackfall_engine::TetrominoKind;

    pub(crate) const EMPTY: Style = Style::new().fg(Color::Rgb(70, 70, 70));
    pub(crate) const GHOST: Style = Style::new().fg(Color::Rgb(127, 127, 127));

    pub(crate) const fn for_kind(kind: TetrominoKind) -> Style {
        let color = match kind {
            TetrominoKind::I => Color::Rgb(0, 255, 255),
            TetrominoKind::O => Color::Rgb(255, 255, 0),
            TetrominoKind::S => Color::Rgb(0, 255, 0),
            TetrominoKind::Z => Color::Rgb(255, 0, 0),
            TetrominoKind::J => Color::Rgb(0, 0, 255),
            TetrominoKind::L => Color::Rgb(255, 127, 0),
            TetrominoKind::T => Color::Rgb(255, 0, 255),
        };
        Style::new().bg(color)
    }
}
