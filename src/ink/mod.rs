pub mod capture;

/// A sampled pointer position in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translates a screen position into the space of a surface placed at `origin`.
    pub fn relative_to(self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// A sealed pen-down..pen-up gesture. There is no way to push into a `Stroke`
/// once it has been built, only the capture state machine creates them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub(crate) fn sealed(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Everything drawn for the current question, in drawing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ink {
    strokes: Vec<Stroke>,
}

impl Ink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn append(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Every point of every stroke, in drawing order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.strokes.iter().flat_map(|s| s.points.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_empties_the_stroke_sequence() {
        let mut ink = Ink::new();
        ink.append(Stroke::sealed(vec![Point::new(1.0, 2.0)]));
        ink.append(Stroke::sealed(vec![Point::new(3.0, 4.0), Point::new(5.0, 6.0)]));
        assert_eq!(ink.len(), 2);
        assert_eq!(ink.points().count(), 3);

        ink.clear();
        assert!(ink.is_empty());
        assert_eq!(ink.points().count(), 0);
    }

    #[test]
    fn stroke_splits_into_parallel_coordinate_sequences() {
        let stroke = Stroke::sealed(vec![Point::new(1.0, 10.0), Point::new(2.0, 20.0)]);
        assert_eq!(stroke.xs(), vec![1.0, 2.0]);
        assert_eq!(stroke.ys(), vec![10.0, 20.0]);
    }

    #[test]
    fn relative_to_subtracts_the_surface_origin() {
        let p = Point::new(110.0, 45.5).relative_to(Point::new(100.0, 40.0));
        assert_eq!(p, Point::new(10.0, 5.5));
    }
}
