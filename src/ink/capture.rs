use super::{Ink, Point, Stroke};
use crate::canvas::StrokeRenderer;

/// Raw input as it arrives from the host, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    MouseDown(Point),
    MouseMove(Point),
    MouseUp,
    MouseLeave,
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd,
}

impl PointerEvent {
    /// Touch gestures must not scroll or zoom the page hosting the surface.
    pub fn suppresses_default(&self) -> bool {
        matches!(
            self,
            PointerEvent::TouchStart(_) | PointerEvent::TouchMove(_) | PointerEvent::TouchEnd
        )
    }
}

/// Turns pointer and touch events into sealed strokes.
///
/// At most one stroke is open at a time. Move and end events that arrive
/// while nothing is open are ignored.
#[derive(Debug, Default)]
pub struct StrokeCapture {
    origin: Point,
    open: Option<Vec<Point>>,
}

impl StrokeCapture {
    /// `origin` is where the drawing surface sits on the screen.
    pub fn new(origin: Point) -> Self {
        Self { origin, open: None }
    }

    pub fn is_active(&self) -> bool {
        self.open.is_some()
    }

    /// Drops any half-drawn stroke without sealing it.
    pub fn reset(&mut self) {
        self.open = None;
    }

    pub fn handle<R: StrokeRenderer>(&mut self, event: &PointerEvent, ink: &mut Ink, renderer: &mut R) {
        match event {
            PointerEvent::MouseDown(at) => self.begin(at.relative_to(self.origin)),
            PointerEvent::MouseMove(at) => self.move_to(at.relative_to(self.origin), renderer),
            PointerEvent::TouchStart(touches) => {
                // only the first contact draws
                if let Some(at) = touches.first() {
                    self.begin(at.relative_to(self.origin));
                }
            }
            PointerEvent::TouchMove(touches) => {
                if let Some(at) = touches.first() {
                    self.move_to(at.relative_to(self.origin), renderer);
                }
            }
            PointerEvent::MouseUp | PointerEvent::MouseLeave | PointerEvent::TouchEnd => self.end(ink),
        }
    }

    pub fn begin(&mut self, at: Point) {
        if self.open.is_some() {
            log::debug!("Discarding unsealed stroke on new pen-down");
        }
        self.open = Some(vec![at]);
    }

    pub fn move_to<R: StrokeRenderer>(&mut self, at: Point, renderer: &mut R) {
        let Some(points) = self.open.as_mut() else {
            return;
        };
        if let Some(&last) = points.last() {
            renderer.draw_segment(last, at);
        }
        points.push(at);
    }

    pub fn end(&mut self, ink: &mut Ink) {
        if let Some(points) = self.open.take() {
            log::debug!("Sealed stroke #{} with {} points", ink.len() + 1, points.len());
            ink.append(Stroke::sealed(points));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Segments(Vec<(Point, Point)>);

    impl StrokeRenderer for Segments {
        fn draw_segment(&mut self, from: Point, to: Point) {
            self.0.push((from, to));
        }
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn each_begin_to_end_cycle_seals_one_stroke() {
        let mut capture = StrokeCapture::new(Point::default());
        let mut ink = Ink::new();
        let mut segments = Segments::default();

        let events = vec![
            PointerEvent::MouseDown(p(1.0, 1.0)),
            PointerEvent::MouseMove(p(2.0, 2.0)),
            PointerEvent::MouseMove(p(3.0, 3.0)),
            PointerEvent::MouseUp,
            PointerEvent::MouseDown(p(10.0, 10.0)),
            PointerEvent::MouseLeave,
            PointerEvent::TouchStart(vec![p(20.0, 20.0), p(99.0, 99.0)]),
            PointerEvent::TouchMove(vec![p(21.0, 22.0)]),
            PointerEvent::TouchEnd,
        ];
        for event in &events {
            capture.handle(event, &mut ink, &mut segments);
        }

        assert_eq!(ink.len(), 3);
        assert_eq!(ink.strokes()[0].points(), &[p(1.0, 1.0), p(2.0, 2.0), p(3.0, 3.0)]);
        assert_eq!(ink.strokes()[1].points(), &[p(10.0, 10.0)]);
        assert_eq!(ink.strokes()[2].points(), &[p(20.0, 20.0), p(21.0, 22.0)]);
        assert!(!capture.is_active());
    }

    #[test]
    fn every_move_renders_a_segment_from_the_previous_point() {
        let mut capture = StrokeCapture::new(Point::default());
        let mut ink = Ink::new();
        let mut segments = Segments::default();

        capture.handle(&PointerEvent::MouseDown(p(0.0, 0.0)), &mut ink, &mut segments);
        capture.handle(&PointerEvent::MouseMove(p(5.0, 0.0)), &mut ink, &mut segments);
        capture.handle(&PointerEvent::MouseMove(p(5.0, 5.0)), &mut ink, &mut segments);

        assert_eq!(
            segments.0,
            vec![(p(0.0, 0.0), p(5.0, 0.0)), (p(5.0, 0.0), p(5.0, 5.0))]
        );
        // nothing is sealed until pen-up
        assert!(ink.is_empty());
    }

    #[test]
    fn moves_and_ends_while_inactive_are_ignored() {
        let mut capture = StrokeCapture::new(Point::default());
        let mut ink = Ink::new();
        let mut segments = Segments::default();

        capture.handle(&PointerEvent::MouseMove(p(1.0, 1.0)), &mut ink, &mut segments);
        capture.handle(&PointerEvent::MouseUp, &mut ink, &mut segments);
        capture.handle(&PointerEvent::TouchEnd, &mut ink, &mut segments);
        capture.handle(&PointerEvent::TouchStart(vec![]), &mut ink, &mut segments);

        assert!(ink.is_empty());
        assert!(segments.0.is_empty());
        assert!(!capture.is_active());
    }

    #[test]
    fn screen_positions_are_translated_into_surface_space() {
        let mut capture = StrokeCapture::new(p(100.0, 50.0));
        let mut ink = Ink::new();
        let mut segments = Segments::default();

        capture.handle(&PointerEvent::MouseDown(p(110.0, 60.0)), &mut ink, &mut segments);
        capture.handle(&PointerEvent::MouseMove(p(120.0, 75.0)), &mut ink, &mut segments);
        capture.handle(&PointerEvent::MouseUp, &mut ink, &mut segments);

        assert_eq!(ink.strokes()[0].points(), &[p(10.0, 10.0), p(20.0, 25.0)]);
    }

    #[test]
    fn touch_positions_are_translated_like_mouse_positions() {
        let mut capture = StrokeCapture::new(p(100.0, 50.0));
        let mut ink = Ink::new();
        let mut segments = Segments::default();

        capture.handle(&PointerEvent::TouchStart(vec![p(130.0, 55.0), p(400.0, 400.0)]), &mut ink, &mut segments);
        capture.handle(&PointerEvent::TouchMove(vec![p(140.0, 90.0)]), &mut ink, &mut segments);
        capture.handle(&PointerEvent::TouchEnd, &mut ink, &mut segments);

        assert_eq!(ink.strokes()[0].points(), &[p(30.0, 5.0), p(40.0, 40.0)]);
        assert_eq!(segments.0, vec![(p(30.0, 5.0), p(40.0, 40.0))]);
    }

    #[test]
    fn only_touch_events_suppress_host_scrolling() {
        assert!(PointerEvent::TouchStart(vec![]).suppresses_default());
        assert!(PointerEvent::TouchEnd.suppresses_default());
        assert!(!PointerEvent::MouseDown(p(0.0, 0.0)).suppresses_default());
        assert!(!PointerEvent::MouseLeave.suppresses_default());
    }
}
