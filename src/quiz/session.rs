use std::time::{Duration, Instant};

use rand::Rng;

use super::{GradedResult, Question, Quiz};
use crate::canvas::PixelSource;
use crate::feedback::Cue;
use crate::ink::Ink;
use crate::recognition::{RecognitionOutcome, RecognitionRequest};
use crate::snapshot::{self, Snapshot};

pub const CORRECT_ADVANCE_DELAY: Duration = Duration::from_secs(1);
pub const INCORRECT_ADVANCE_DELAY: Duration = Duration::from_secs(2);

pub const DRAW_FIRST_TEXT: &str = "Draw your answer first.";
pub const WAIT_TEXT: &str = "Still grading, please wait.";
pub const RECOGNITION_FAILED_TEXT: &str = "Recognition failed... try again or give up.";
pub const SERVER_ERROR_TEXT: &str = "A server error occurred... try again or give up.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress { index: usize },
    Finished,
}

/// Identifies one grading in flight. Completions carrying any other ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub question_index: usize,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    NotInProgress,
    /// A previous submission or give-up has not finished yet.
    Busy,
    EmptyInk,
}

/// A recognition call the caller must now perform.
#[derive(Debug)]
pub struct Submission {
    pub ticket: Ticket,
    pub request: RecognitionRequest,
}

/// The question has been decided, advance once `delay` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grading {
    pub ticket: Ticket,
    pub cue: Cue,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advanced {
    NextQuestion(usize),
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
struct Verdict {
    correct: bool,
    snapshot: Option<Snapshot>,
    correct_hangul: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Recognizing { ticket: Ticket, snapshot: Option<Snapshot> },
    Advancing { ticket: Ticket, verdict: Verdict },
}

/// One run of the quiz: question order, the current ink and the results so far.
///
/// All methods are synchronous. Whoever owns the session performs the
/// recognition call and the delays, then feeds the outcomes back with the
/// ticket they were issued for.
#[derive(Debug)]
pub struct QuizSession {
    quiz: Quiz,
    phase: Phase,
    ink: Ink,
    results: Vec<GradedResult>,
    message: String,
    loaded_at: Option<Instant>,
    pending: Option<Pending>,
    generation: u64,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            quiz: Quiz::new(Vec::new()),
            phase: Phase::NotStarted,
            ink: Ink::new(),
            results: Vec::new(),
            message: String::new(),
            loaded_at: None,
            pending: None,
            generation: 0,
        }
    }

    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) {
        self.start_with(Quiz::shuffled(rng), now);
    }

    /// Starts over with a fixed question order. Anything still in flight becomes stale.
    pub fn start_with(&mut self, quiz: Quiz, now: Instant) {
        log::info!(
            "Starting quiz: {:?}",
            quiz.questions.iter().map(|q| q.prompt).collect::<Vec<_>>()
        );
        self.quiz = quiz;
        self.results.clear();
        self.pending = None;
        self.generation += 1;
        if self.quiz.is_empty() {
            self.phase = Phase::Finished;
            self.loaded_at = None;
            return;
        }
        self.load(0, now);
    }

    fn load(&mut self, index: usize, now: Instant) {
        self.phase = Phase::InProgress { index };
        self.ink.clear();
        self.message.clear();
        self.loaded_at = Some(now);
        log::info!(
            "Question {}/{} loaded: {:?}",
            index + 1,
            self.quiz.len(),
            self.current_question().map(|q| q.prompt)
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current_question(&self) -> Option<Question> {
        match self.phase {
            Phase::InProgress { index } => self.quiz.questions.get(index).copied(),
            _ => None,
        }
    }

    pub fn total_questions(&self) -> usize {
        self.quiz.len()
    }

    pub fn results(&self) -> &[GradedResult] {
        &self.results
    }

    pub fn score(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn ink(&self) -> &Ink {
        &self.ink
    }

    /// Ink accepts new strokes only while a question is open and nothing is being graded.
    pub fn ink_mut(&mut self) -> Option<&mut Ink> {
        match (self.phase, &self.pending) {
            (Phase::InProgress { .. }, None) => Some(&mut self.ink),
            _ => None,
        }
    }

    pub fn prompt_text(&self) -> Option<String> {
        let Phase::InProgress { index } = self.phase else {
            return None;
        };
        let question = self.current_question()?;
        Some(format!(
            "Question {} / {}: write the number {} in Hangul!",
            index + 1,
            self.quiz.len(),
            question.prompt
        ))
    }

    /// Wipes the ink and the message. Index and timer are untouched.
    ///
    /// Refused while a grading is pending, the submitted ink stays as it was sent.
    pub fn clear(&mut self) -> Result<(), Refusal> {
        if self.pending.is_some() {
            self.message = WAIT_TEXT.to_string();
            return Err(Refusal::Busy);
        }
        self.ink.clear();
        self.message.clear();
        Ok(())
    }

    fn issue_ticket(&mut self, question_index: usize) -> Ticket {
        self.generation += 1;
        Ticket {
            question_index,
            generation: self.generation,
        }
    }

    fn snapshot<S: PixelSource>(&self, surface: &S) -> Option<Snapshot> {
        match snapshot::extract(&self.ink, surface) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Dropping answer snapshot: {}", e);
                None
            }
        }
    }

    fn begin_grading(&mut self) -> Result<(usize, Question), Refusal> {
        let (Phase::InProgress { index }, Some(question)) = (self.phase, self.current_question()) else {
            return Err(Refusal::NotInProgress);
        };
        if self.pending.is_some() {
            self.message = WAIT_TEXT.to_string();
            return Err(Refusal::Busy);
        }
        Ok((index, question))
    }

    /// Freezes the current ink into a recognition request.
    pub fn submit<S: PixelSource>(&mut self, surface: &S) -> Result<Submission, Refusal> {
        let (index, _) = self.begin_grading()?;
        let (width, height) = surface.dimensions();
        let request = match RecognitionRequest::new(&self.ink, width, height) {
            Ok(request) => request,
            Err(_) => {
                self.message = DRAW_FIRST_TEXT.to_string();
                return Err(Refusal::EmptyInk);
            }
        };

        let snapshot = self.snapshot(surface);
        let ticket = self.issue_ticket(index);
        self.pending = Some(Pending::Recognizing { ticket, snapshot });
        log::info!(
            "Submitting {} strokes for question {}",
            self.ink.len(),
            index + 1
        );
        Ok(Submission { ticket, request })
    }

    /// Grades the answer to a submission. `None` means there is nothing to wait for.
    pub fn apply_recognition(&mut self, ticket: Ticket, outcome: RecognitionOutcome) -> Option<Grading> {
        let snapshot = match self.pending.take() {
            Some(Pending::Recognizing { ticket: expected, snapshot }) if expected == ticket => snapshot,
            other => {
                self.pending = other;
                log::warn!("Ignoring stale recognition result for {:?}", ticket);
                return None;
            }
        };
        let question = self.current_question()?;

        match outcome {
            RecognitionOutcome::Recognized(candidate) => {
                let correct = candidate == question.answer;
                log::info!(
                    "Question {}: recognized {:?}, expected {:?}",
                    ticket.question_index + 1,
                    candidate,
                    question.answer
                );
                self.message = if correct {
                    format!("Recognized: {}\nCorrect!\n\"{}\"", candidate, question.answer)
                } else {
                    format!(
                        "Recognized: {}\nIncorrect... the answer is \"{}\"",
                        candidate, question.answer
                    )
                };
                self.pending = Some(Pending::Advancing {
                    ticket,
                    verdict: Verdict {
                        correct,
                        snapshot,
                        correct_hangul: question.answer.to_string(),
                    },
                });
                Some(if correct {
                    Grading {
                        ticket,
                        cue: Cue::Success,
                        delay: CORRECT_ADVANCE_DELAY,
                    }
                } else {
                    Grading {
                        ticket,
                        cue: Cue::Failure,
                        delay: INCORRECT_ADVANCE_DELAY,
                    }
                })
            }
            RecognitionOutcome::Failed(reason) => {
                log::warn!("Question {}: {}", ticket.question_index + 1, reason);
                self.message = if reason.is_rejection() {
                    RECOGNITION_FAILED_TEXT
                } else {
                    SERVER_ERROR_TEXT
                }
                .to_string();
                None
            }
        }
    }

    /// Records a miss for the current question, whether or not anything was drawn.
    pub fn give_up<S: PixelSource>(&mut self, surface: &S) -> Result<Grading, Refusal> {
        let (index, question) = self.begin_grading()?;
        let snapshot = self.snapshot(surface);
        let ticket = self.issue_ticket(index);

        log::info!("Question {}: gave up", index + 1);
        self.message = format!("Gave up!\nThe answer was \"{}\"", question.answer);
        self.pending = Some(Pending::Advancing {
            ticket,
            verdict: Verdict {
                correct: false,
                snapshot,
                correct_hangul: question.answer.to_string(),
            },
        });
        Ok(Grading {
            ticket,
            cue: Cue::Failure,
            delay: INCORRECT_ADVANCE_DELAY,
        })
    }

    /// Appends the result of a graded question and moves on.
    pub fn advance(&mut self, ticket: Ticket, now: Instant) -> Option<Advanced> {
        let verdict = match self.pending.take() {
            Some(Pending::Advancing { ticket: expected, verdict }) if expected == ticket => verdict,
            other => {
                self.pending = other;
                log::warn!("Ignoring stale advance for {:?}", ticket);
                return None;
            }
        };
        let question = self.current_question()?;
        let Phase::InProgress { index } = self.phase else {
            return None;
        };
        let loaded_at = self.loaded_at?;

        let elapsed = now.saturating_duration_since(loaded_at).as_secs_f64();
        self.results.push(GradedResult {
            prompt: question.prompt,
            correct: verdict.correct,
            elapsed_secs: (elapsed * 10.0).round() / 10.0,
            snapshot: verdict.snapshot,
            correct_hangul: verdict.correct_hangul,
        });

        let next = index + 1;
        if next < self.quiz.len() {
            self.load(next, now);
            Some(Advanced::NextQuestion(next))
        } else {
            self.phase = Phase::Finished;
            self.loaded_at = None;
            log::info!("Quiz finished: {}/{}", self.score(), self.quiz.len());
            Some(Advanced::Finished)
        }
    }
}
