use std::fmt;

use super::GradedResult;

/// End-of-quiz report: the score and one row per question.
pub struct Summary<'a> {
    results: &'a [GradedResult],
    total: usize,
}

impl<'a> Summary<'a> {
    pub fn new(results: &'a [GradedResult], total: usize) -> Self {
        Self { results, total }
    }

    pub fn score(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results")?;
        writeln!(f, "Your score: {} / {}", self.score(), self.total)?;
        writeln!(f)?;
        writeln!(f, "{:>3}  {:>8}  {:<12}  {:<6}  {:>6}  {}", "#", "Question", "Answer", "Result", "Time", "Drawing")?;
        for (row, result) in self.results.iter().enumerate() {
            let mark = if result.correct { "○" } else { "×" };
            let drawing = match &result.snapshot {
                Some(snapshot) => format!("[png {}x{}]", snapshot.width, snapshot.height),
                None => "none".to_string(),
            };
            writeln!(
                f,
                "{:>3}  {:>8}  {:<12}  {:<6}  {:>6.1}  {}",
                row + 1,
                result.prompt,
                result.correct_hangul,
                mark,
                result.elapsed_secs,
                drawing
            )?;
        }
        write!(f, "Type `speak <#>` to hear an answer, `show <#>` to print its drawing.")
    }
}
