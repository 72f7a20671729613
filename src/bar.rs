//! Block-glyph progress bars.
//!
//! A usage bar has three regions: consumed quota (filled), quota projected to be
//! consumed by the end of the window (dithered), and the rest (empty).

/// One cell of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Filled,
    Dithered,
    Empty,
}

impl Glyph {
    pub fn as_char(self) -> char {
        match self {
            Glyph::Filled => '█',
            Glyph::Dithered => '▒',
            Glyph::Empty => '░',
        }
    }
}

/// Cell counts of a rendered bar. Always sums to the requested width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarSegments {
    pub filled: usize,
    pub dithered: usize,
    pub empty: usize,
}

impl BarSegments {
    pub fn compute(current: i64, projected: i64, width: usize) -> Self {
        let current = i128::from(current.clamp(0, 100));
        let projected = i128::from(projected.clamp(0, 100)).max(current);
        // widened so any usize width multiplies without overflow
        let w = width as i128;

        let filled_count = current * w / 100;
        let projected_count = projected * w / 100;

        // both counts lie in 0..=width
        let filled = filled_count as usize;
        let dithered = (projected_count - filled_count) as usize;
        // whatever is left over lands in the empty region
        let empty = width.saturating_sub(filled + dithered);
        BarSegments {
            filled,
            dithered,
            empty,
        }
    }

    pub fn glyphs(&self) -> impl Iterator<Item = Glyph> {
        std::iter::repeat_n(Glyph::Filled, self.filled)
            .chain(std::iter::repeat_n(Glyph::Dithered, self.dithered))
            .chain(std::iter::repeat_n(Glyph::Empty, self.empty))
    }
}

/// Render `width` glyphs: current usage, then the projected remainder, then empty.
pub fn render(current: i64, projected: i64, width: usize) -> Vec<Glyph> {
    BarSegments::compute(current, projected, width).glyphs().collect()
}

/// Single-region variant used for the context window.
pub fn render_simple(pct: i64, width: usize) -> Vec<Glyph> {
    render(pct, pct, width)
}

pub fn to_text(glyphs: &[Glyph]) -> String {
    glyphs.iter().map(|g| g.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(glyphs: &[Glyph], which: Glyph) -> usize {
        glyphs.iter().filter(|g| **g == which).count()
    }

    #[test]
    fn decomposes_actual_and_projected() {
        let bar = render(30, 60, 10);
        assert_eq!(count(&bar, Glyph::Filled), 3);
        assert_eq!(count(&bar, Glyph::Dithered), 3);
        assert_eq!(count(&bar, Glyph::Empty), 4);
        assert_eq!(to_text(&bar), "███▒▒▒░░░░");
    }

    #[test]
    fn length_always_matches_width() {
        for width in [0usize, 1, 7, 10, 23] {
            for current in [-20i64, 0, 5, 33, 99, 100, 150] {
                for projected in [-5i64, 0, 10, 50, 100, 400] {
                    assert_eq!(render(current, projected, width).len(), width);
                }
            }
        }
    }

    #[test]
    fn projected_below_current_is_raised() {
        let seg = BarSegments::compute(70, 20, 10);
        assert_eq!(
            seg,
            BarSegments {
                filled: 7,
                dithered: 0,
                empty: 3
            }
        );
    }

    #[test]
    fn floors_partial_cells() {
        let seg = BarSegments::compute(19, 19, 10);
        assert_eq!(seg.filled, 1);
        assert_eq!(seg.empty, 9);
        let seg = BarSegments::compute(100, 100, 7);
        assert_eq!(seg.filled, 7);
    }

    #[test]
    fn huge_width_does_not_overflow() {
        let seg = BarSegments::compute(50, 75, usize::MAX);
        assert_eq!(seg.filled, usize::MAX / 2);
        assert_eq!(seg.filled + seg.dithered + seg.empty, usize::MAX);
        let seg = BarSegments::compute(100, 100, usize::MAX);
        assert_eq!((seg.filled, seg.dithered, seg.empty), (usize::MAX, 0, 0));
    }

    #[test]
    fn simple_has_no_dithered_region() {
        let bar = render_simple(45, 10);
        assert_eq!(count(&bar, Glyph::Dithered), 0);
        assert_eq!(to_text(&bar), "████░░░░░░");
    }
}
