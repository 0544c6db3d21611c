//! Legend layout with automatic ("best") corner placement.

const PAD: f64 = 10.0;
const ROW_HEIGHT: f64 = 18.0;
const CHAR_WIDTH: f64 = 7.0;
const SWATCH_WIDTH: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl Corner {
    /// Candidates in preference order; ties keep the earlier one.
    pub const ALL: [Corner; 4] = [
        Corner::UpperRight,
        Corner::UpperLeft,
        Corner::LowerLeft,
        Corner::LowerRight,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendBox {
    pub corner: Corner,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LegendBox {
    pub fn contains(&self, (px, py): (f64, f64)) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Vertical centre of entry `i`.
    pub fn row_center(&self, i: usize) -> f64 {
        self.y + PAD / 2.0 + ROW_HEIGHT * (i as f64 + 0.5)
    }

    /// Horizontal centre of the marker swatch.
    pub fn swatch_x(&self) -> f64 {
        self.x + PAD + SWATCH_WIDTH / 2.0 - 4.0
    }

    pub fn text_x(&self) -> f64 {
        self.x + PAD + SWATCH_WIDTH
    }
}

/// Size of a legend holding `labels`.
pub fn legend_size(labels: &[&str]) -> (f64, f64) {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = 2.0 * PAD + SWATCH_WIDTH + longest as f64 * CHAR_WIDTH;
    let height = PAD + ROW_HEIGHT * labels.len() as f64;
    (width, height)
}

fn box_at(corner: Corner, (width, height): (f64, f64), canvas: (f64, f64)) -> LegendBox {
    let (cw, ch) = canvas;
    let (x, y) = match corner {
        Corner::UpperRight => (cw - PAD - width, PAD),
        Corner::UpperLeft => (PAD, PAD),
        Corner::LowerLeft => (PAD, ch - PAD - height),
        Corner::LowerRight => (cw - PAD - width, ch - PAD - height),
    };
    LegendBox {
        corner,
        x,
        y,
        width,
        height,
    }
}

/// Choose the corner whose legend box covers the fewest of `points`.
pub fn place_best(labels: &[&str], canvas: (f64, f64), points: &[(f64, f64)]) -> LegendBox {
    let size = legend_size(labels);
    let mut best: Option<(usize, LegendBox)> = None;

    for corner in Corner::ALL {
        let candidate = box_at(corner, size, canvas);
        let covered = points.iter().filter(|&&p| candidate.contains(p)).count();
        match best {
            Some((n, _)) if n <= covered => {}
            _ => best = Some((covered, candidate)),
        }
        if covered == 0 {
            break;
        }
    }

    best.map(|(_, b)| b)
        .unwrap_or_else(|| box_at(Corner::UpperRight, size, canvas))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: (f64, f64) = (400.0, 300.0);

    #[test]
    fn test_prefers_upper_right_when_free() {
        let b = place_best(&["a.json"], CANVAS, &[(200.0, 150.0)]);
        assert_eq!(b.corner, Corner::UpperRight);
        assert!(b.x + b.width <= CANVAS.0);
    }

    #[test]
    fn test_avoids_crowded_corners() {
        let crowded = [(390.0, 15.0), (380.0, 20.0), (15.0, 15.0)];
        let b = place_best(&["a.json", "30"], CANVAS, &crowded);
        assert_eq!(b.corner, Corner::LowerLeft);
    }

    #[test]
    fn test_picks_least_overlap_when_all_covered() {
        let mut pts = Vec::new();
        // two in upper right, one in every other corner
        pts.extend([(385.0, 12.0), (380.0, 14.0)]);
        pts.extend([(12.0, 12.0), (12.0, 290.0), (390.0, 290.0)]);
        let b = place_best(&["group"], CANVAS, &pts);
        assert_eq!(b.corner, Corner::UpperLeft);
    }

    #[test]
    fn test_size_grows_with_entries() {
        let (w1, h1) = legend_size(&["a"]);
        let (w2, h2) = legend_size(&["a", "a much longer label"]);
        assert!(w2 > w1);
        assert_eq!(h2 - h1, ROW_HEIGHT);
    }
}
