//! Quiz playback: per-question option shuffling, answering and scoring.
//!
//! The browser client plays quizzes by these same rules; keeping them here lets
//! the rules be exercised without a UI.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::QuizQuestion;
use crate::error::PlaybackError;

/// Score band shown at the end of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Perfect,
  Excellent,
  WellDone,
  NotBad,
  KeepPracticing,
}

impl Verdict {
  pub fn for_percentage(pct: u32) -> Self {
    match pct {
      100.. => Verdict::Perfect,
      80..=99 => Verdict::Excellent,
      60..=79 => Verdict::WellDone,
      40..=59 => Verdict::NotBad,
      _ => Verdict::KeepPracticing,
    }
  }

  pub fn message(self) -> &'static str {
    match self {
      Verdict::Perfect => "Perfect!",
      Verdict::Excellent => "Excellent!",
      Verdict::WellDone => "Well done!",
      Verdict::NotBad => "Not bad!",
      Verdict::KeepPracticing => "Keep practicing!",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub correct_option: String,
  pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
  questions: Vec<QuizQuestion>,
  current: usize,
  score: usize,
}

impl QuizSession {
  /// Starts a session with every question's options shuffled (Fisher–Yates).
  pub fn new<R: Rng + ?Sized>(mut questions: Vec<QuizQuestion>, rng: &mut R) -> Self {
    for q in &mut questions {
      q.options.shuffle(&mut *rng);
    }
    Self { questions, current: 0, score: 0 }
  }

  pub fn current(&self) -> Option<&QuizQuestion> {
    self.questions.get(self.current)
  }

  pub fn answer(&mut self, option: &str) -> Result<AnswerOutcome, PlaybackError> {
    let q = self.questions.get(self.current).ok_or(PlaybackError::Finished)?;
    if !q.options.iter().any(|o| o == option) {
      return Err(PlaybackError::UnknownOption(option.to_string()));
    }

    let correct = option == q.correct_option;
    let correct_option = q.correct_option.clone();
    if correct {
      self.score += 1;
    }
    self.current += 1;

    Ok(AnswerOutcome { correct, correct_option, finished: self.is_finished() })
  }

  pub fn score(&self) -> usize {
    self.score
  }

  pub fn total(&self) -> usize {
    self.questions.len()
  }

  pub fn is_finished(&self) -> bool {
    self.current >= self.questions.len()
  }

  /// Rounded share of correct answers; 0 for an empty quiz.
  pub fn percentage(&self) -> u32 {
    if self.questions.is_empty() {
      return 0;
    }
    (self.score as f64 * 100.0 / self.questions.len() as f64).round() as u32
  }

  pub fn verdict(&self) -> Verdict {
    Verdict::for_percentage(self.percentage())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn q(prompt: &str, correct: &str) -> QuizQuestion {
    QuizQuestion {
      prompt: prompt.into(),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_option: correct.into(),
    }
  }

  #[test]
  fn shuffle_keeps_option_set_and_answer() {
    let mut rng = StdRng::seed_from_u64(7);
    let session = QuizSession::new(vec![q("one", "c"), q("two", "a")], &mut rng);
    for question in &session.questions {
      let mut sorted = question.options.clone();
      sorted.sort();
      assert_eq!(sorted, vec!["a", "b", "c", "d"]);
      assert!(question.options.contains(&question.correct_option));
    }
  }

  #[test]
  fn scoring_counts_correct_answers() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = QuizSession::new(vec![q("one", "c"), q("two", "a"), q("three", "d")], &mut rng);

    let first = session.answer("c").unwrap();
    assert!(first.correct);
    assert!(!first.finished);
    let second = session.answer("b").unwrap();
    assert!(!second.correct);
    assert_eq!(second.correct_option, "a");
    let third = session.answer("d").unwrap();
    assert!(third.finished);

    assert_eq!(session.score(), 2);
    assert_eq!(session.total(), 3);
    assert_eq!(session.percentage(), 67);
    assert_eq!(session.verdict(), Verdict::WellDone);
    assert_eq!(session.answer("a"), Err(PlaybackError::Finished));
  }

  #[test]
  fn unknown_option_does_not_advance() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut session = QuizSession::new(vec![q("one", "a")], &mut rng);
    assert_eq!(session.answer("zzz"), Err(PlaybackError::UnknownOption("zzz".into())));
    assert_eq!(session.current().map(|c| c.prompt.as_str()), Some("one"));
  }

  #[test]
  fn verdict_bands() {
    assert_eq!(Verdict::for_percentage(100), Verdict::Perfect);
    assert_eq!(Verdict::for_percentage(80), Verdict::Excellent);
    assert_eq!(Verdict::for_percentage(79), Verdict::WellDone);
    assert_eq!(Verdict::for_percentage(40), Verdict::NotBad);
    assert_eq!(Verdict::for_percentage(39), Verdict::KeepPracticing);
    assert_eq!(Verdict::KeepPracticing.message(), "Keep practicing!");
  }

  #[test]
  fn empty_session_is_finished() {
    let mut rng = StdRng::seed_from_u64(0);
    let session = QuizSession::new(Vec::new(), &mut rng);
    assert!(session.is_finished());
    assert_eq!(session.percentage(), 0);
  }
}
