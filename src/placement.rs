/// Screen-space rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Top-left corner for a window of `size` opened at `anchor`, pulled back
/// so it stays inside `screen`. A window larger than the screen sticks to
/// the top-left edge.
pub fn clamp_to_screen(anchor: (i32, i32), size: (u32, u32), screen: Rect) -> (i32, i32) {
    let mut window = Rect {
        x: anchor.0,
        y: anchor.1,
        width: size.0,
        height: size.1,
    };

    if window.right() > screen.right() {
        window.x = screen.right() - window.width as i32;
    }
    if window.bottom() > screen.bottom() {
        window.y = screen.bottom() - window.height as i32;
    }
    (window.x.max(screen.x), window.y.max(screen.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_fits_unchanged() {
        assert_eq!(clamp_to_screen((100, 200), (300, 400), SCREEN), (100, 200));
    }

    #[test]
    fn test_clamped_at_right_and_bottom() {
        assert_eq!(clamp_to_screen((1800, 1000), (300, 400), SCREEN), (1620, 680));
    }

    #[test]
    fn test_exact_edge_not_moved() {
        assert_eq!(clamp_to_screen((1620, 680), (300, 400), SCREEN), (1620, 680));
    }

    #[test]
    fn test_larger_than_screen_sticks_to_origin() {
        assert_eq!(clamp_to_screen((50, 50), (2000, 1200), SCREEN), (0, 0));
    }

    #[test]
    fn test_grown_window_clamped_again_from_previous_origin() {
        let origin = clamp_to_screen((1800, 1000), (360, 420), SCREEN);
        assert_eq!(origin, (1560, 660));
        let grown = clamp_to_screen(origin, (560, 520), SCREEN);
        assert_eq!(grown, (1360, 560));
        assert!(grown.0 + 560 <= SCREEN.right());
        assert!(grown.1 + 520 <= SCREEN.bottom());
    }
}
