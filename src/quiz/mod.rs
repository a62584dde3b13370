pub mod controller;
pub mod session;
pub mod summary;

use rand::Rng;

use crate::snapshot::Snapshot;

/// Answer key: the numbers 1..=10 written in Sino-Korean Hangul.
pub const ANSWER_KEY: [(u8, &str); 10] = [
    (1, "일"),
    (2, "이"),
    (3, "삼"),
    (4, "사"),
    (5, "오"),
    (6, "육"),
    (7, "칠"),
    (8, "팔"),
    (9, "구"),
    (10, "십"),
];

pub fn hangul_for(prompt: u8) -> Option<&'static str> {
    ANSWER_KEY
        .iter()
        .find(|(number, _)| *number == prompt)
        .map(|(_, hangul)| *hangul)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: u8,
    pub answer: &'static str,
}

impl Question {
    pub fn new(prompt: u8, answer: &'static str) -> Self {
        Self { prompt, answer }
    }
}

/// The questions of one run, in the order they will be asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Builds a quiz from prompt numbers, skipping any the answer key doesn't know.
    pub fn from_prompts(prompts: &[u8]) -> Self {
        Self::new(
            prompts
                .iter()
                .filter_map(|&p| hangul_for(p).map(|answer| Question::new(p, answer)))
                .collect(),
        )
    }

    /// Every entry of the answer key exactly once, in random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut questions: Vec<Question> = ANSWER_KEY
            .iter()
            .map(|&(prompt, answer)| Question::new(prompt, answer))
            .collect();
        // Fisher-Yates, walking down from the last slot
        for i in (1..questions.len()).rev() {
            let j = rng.gen_range(0..=i);
            questions.swap(i, j);
        }
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// How one question went. Results are only ever appended.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedResult {
    pub prompt: u8,
    pub correct: bool,
    /// Seconds from question load to grading, to one decimal place.
    pub elapsed_secs: f64,
    pub snapshot: Option<Snapshot>,
    pub correct_hangul: String,
}
