use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::session::{Advanced, Grading, QuizSession, Refusal, Ticket};
use super::summary::Summary;
use super::{GradedResult, Quiz};
use crate::canvas::Canvas;
use crate::feedback::{Feedback, SPEECH_LANGUAGE};
use crate::ink::capture::{PointerEvent, StrokeCapture};
use crate::ink::Point;
use crate::recognition::{RecognitionOutcome, Recognizer};

pub const SPEECH_UNSUPPORTED_TEXT: &str = "Speech synthesis is not supported here.";
pub const NO_DRAWING_TEXT: &str = "Nothing was drawn for this question.";

#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    Start,
    Pointer(PointerEvent),
    Submit,
    Clear,
    GiveUp,
    /// Pronounce the answer of the given summary row (1-based).
    Speak(usize),
    /// Print the drawing of the given summary row as a PNG data URI.
    Show(usize),
    Quit,
}

#[derive(Debug)]
enum Completion {
    Recognition { ticket: Ticket, outcome: RecognitionOutcome },
    AdvanceDue { ticket: Ticket },
}

/// Owns the session and the drawing surface and runs the quiz on a single task.
///
/// Recognition calls and advance delays are spawned. Their results come back
/// over a channel and are applied on the controller's own task, so the session
/// never needs locking.
pub struct Controller<F: Feedback> {
    session: QuizSession,
    canvas: Canvas,
    capture: StrokeCapture,
    recognizer: Arc<dyn Recognizer>,
    feedback: F,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<F: Feedback> Controller<F> {
    pub fn new(canvas: Canvas, surface_origin: Point, recognizer: Arc<dyn Recognizer>, feedback: F) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session: QuizSession::new(),
            canvas,
            capture: StrokeCapture::new(surface_origin),
            recognizer,
            feedback,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Number of spawned tasks whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Processes user events until `Quit`, or until the event stream ends and
    /// everything in flight has settled.
    pub async fn run(mut self, mut events: mpsc::Receiver<UserEvent>) -> QuizSession {
        let mut events_open = true;
        loop {
            if !events_open && self.in_flight == 0 {
                break;
            }
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(UserEvent::Quit) => break,
                    Some(event) => self.handle(event),
                    None => {
                        log::debug!("Event stream closed, {} tasks in flight", self.in_flight);
                        events_open = false;
                    }
                },
                Some(completion) = self.completions_rx.recv() => self.complete(completion),
            }
        }
        self.session
    }

    /// Applies completions until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.completions_rx.recv().await {
                Some(completion) => self.complete(completion),
                None => break,
            }
        }
    }

    pub fn handle(&mut self, event: UserEvent) {
        match event {
            UserEvent::Start => {
                let quiz = Quiz::shuffled(&mut rand::thread_rng());
                self.start_with(quiz);
            }
            UserEvent::Pointer(pointer) => self.pointer(&pointer),
            UserEvent::Submit => self.submit(),
            UserEvent::Clear => match self.session.clear() {
                Ok(()) => self.reset_surface(),
                Err(refusal) => self.refused(refusal),
            },
            UserEvent::GiveUp => {
                self.seal_open_stroke();
                match self.session.give_up(&self.canvas) {
                    Ok(grading) => self.graded(grading),
                    Err(refusal) => self.refused(refusal),
                }
            }
            UserEvent::Speak(row) => self.speak(row),
            UserEvent::Show(row) => self.show_drawing(row),
            UserEvent::Quit => {}
        }
    }

    pub fn start_with(&mut self, quiz: Quiz) {
        self.session.start_with(quiz, Instant::now().into_std());
        self.reset_surface();
        self.show_prompt();
    }

    fn pointer(&mut self, event: &PointerEvent) {
        if event.suppresses_default() {
            log::trace!("Suppressing host default for {:?}", event);
        }
        match self.session.ink_mut() {
            Some(ink) => self.capture.handle(event, ink, &mut self.canvas),
            None => self.capture.reset(),
        }
    }

    /// A stroke still being drawn when grading starts counts as finished.
    fn seal_open_stroke(&mut self) {
        match self.session.ink_mut() {
            Some(ink) => self.capture.end(ink),
            None => self.capture.reset(),
        }
    }

    fn submit(&mut self) {
        self.seal_open_stroke();
        let submission = match self.session.submit(&self.canvas) {
            Ok(submission) => submission,
            Err(refusal) => return self.refused(refusal),
        };

        let recognizer = Arc::clone(&self.recognizer);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = recognizer.recognize(submission.request).await;
            let _ = tx.send(Completion::Recognition {
                ticket: submission.ticket,
                outcome,
            });
        });
    }

    fn complete(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Recognition { ticket, outcome } => {
                match self.session.apply_recognition(ticket, outcome) {
                    Some(grading) => self.graded(grading),
                    None => self.show_message(),
                }
            }
            Completion::AdvanceDue { ticket } => {
                match self.session.advance(ticket, Instant::now().into_std()) {
                    Some(Advanced::NextQuestion(_)) => {
                        self.reset_surface();
                        self.show_prompt();
                    }
                    Some(Advanced::Finished) => {
                        self.reset_surface();
                        self.feedback
                            .show(&Summary::new(self.session.results(), self.session.total_questions()).to_string());
                    }
                    None => {}
                }
            }
        }
    }

    fn graded(&mut self, grading: Grading) {
        self.feedback.play(grading.cue);
        self.show_message();

        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            tokio::time::sleep(grading.delay).await;
            let _ = tx.send(Completion::AdvanceDue {
                ticket: grading.ticket,
            });
        });
    }

    fn refused(&mut self, refusal: Refusal) {
        log::debug!("Refused: {:?}", refusal);
        if refusal != Refusal::NotInProgress {
            self.show_message();
        }
    }

    /// A summary row, only once the quiz is over.
    fn finished_row(&self, row: usize) -> Option<&GradedResult> {
        if !self.session.is_finished() {
            return None;
        }
        row.checked_sub(1).and_then(|i| self.session.results().get(i))
    }

    fn show_drawing(&self, row: usize) {
        let Some(result) = self.finished_row(row) else {
            return;
        };
        match &result.snapshot {
            Some(snapshot) => self.feedback.show(&snapshot.data_uri),
            None => self.feedback.show(NO_DRAWING_TEXT),
        }
    }

    fn speak(&self, row: usize) {
        let Some(result) = self.finished_row(row) else {
            return;
        };
        if let Err(e) = self.feedback.speak(&result.correct_hangul, SPEECH_LANGUAGE) {
            log::warn!("Cannot pronounce {:?}: {}", result.correct_hangul, e);
            self.feedback.show(SPEECH_UNSUPPORTED_TEXT);
        }
    }

    fn reset_surface(&mut self) {
        self.capture.reset();
        self.canvas.clear();
    }

    fn show_prompt(&self) {
        if let Some(prompt) = self.session.prompt_text() {
            self.feedback.show(&prompt);
        }
    }

    fn show_message(&self) {
        let message = self.session.message();
        if !message.is_empty() {
            self.feedback.show(message);
        }
    }
}
