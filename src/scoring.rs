//! Pure scoring engine for completed quiz attempts.
//!
//! No clocks, no storage, no randomness: the same answer set against the
//! same question sequence always yields the same breakdown, so completion
//! handlers can recompute it freely.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::QuestionEntity;

/// Full outcome of grading one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Raw points earned by correct answers, before any clamping.
    pub earned: u32,
    /// Number of questions answered correctly.
    pub correct: usize,
    /// Number of questions answered incorrectly or not at all.
    pub incorrect: usize,
    /// Score ceiling used for presentation and persistence.
    pub display_max: u32,
    /// Earned share of the ceiling, rounded to whole percent and
    /// clamped to `[0, 100]`.
    pub percentage: u8,
}

impl ScoreBreakdown {
    /// Score to persist and display, never above the ceiling.
    pub fn awarded(&self) -> u32 {
        self.earned.min(self.display_max)
    }
}

/// Grade an answer set against a quiz's question sequence.
///
/// A question with no known correct option can never be scored as correct.
/// When the quiz declares no explicit `max_points`, the ceiling falls back
/// to the sum of the question point values.
pub fn score(
    questions: &[QuestionEntity],
    answers: &IndexMap<Uuid, usize>,
    max_points: u32,
) -> ScoreBreakdown {
    let mut earned: u32 = 0;
    let mut correct: usize = 0;

    for question in questions {
        let is_correct = match (question.correct_option, answers.get(&question.id)) {
            (Some(expected), Some(selected)) => expected == *selected,
            _ => false,
        };
        if is_correct {
            earned = earned.saturating_add(question.points);
            correct += 1;
        }
    }

    let display_max = if max_points > 0 {
        max_points
    } else {
        questions
            .iter()
            .fold(0u32, |sum, q| sum.saturating_add(q.points))
    };

    let percentage = if display_max == 0 {
        0
    } else {
        let ratio = f64::from(earned) / f64::from(display_max) * 100.0;
        ratio.round().min(100.0) as u8
    };

    ScoreBreakdown {
        earned,
        correct,
        incorrect: questions.len() - correct,
        display_max,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u128, correct: Option<usize>, points: u32) -> QuestionEntity {
        QuestionEntity {
            id: Uuid::from_u128(id),
            prompt: format!("question {id}"),
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_option: correct,
            points,
        }
    }

    fn answers(pairs: &[(u128, usize)]) -> IndexMap<Uuid, usize> {
        pairs
            .iter()
            .map(|(id, choice)| (Uuid::from_u128(*id), *choice))
            .collect()
    }

    #[test]
    fn all_correct_scores_full_points() {
        let questions = vec![
            question(1, Some(0), 10),
            question(2, Some(2), 20),
            question(3, Some(1), 30),
        ];
        let breakdown = score(&questions, &answers(&[(1, 0), (2, 2), (3, 1)]), 60);

        assert_eq!(breakdown.earned, 60);
        assert_eq!(breakdown.correct, 3);
        assert_eq!(breakdown.incorrect, 0);
        assert_eq!(breakdown.percentage, 100);
        assert_eq!(breakdown.awarded(), 60);
    }

    #[test]
    fn unanswered_questions_count_as_incorrect() {
        let questions = vec![
            question(1, Some(0), 10),
            question(2, Some(1), 10),
            question(3, Some(2), 10),
        ];
        let breakdown = score(&questions, &answers(&[(1, 0)]), 30);

        assert_eq!(breakdown.correct, 1);
        assert_eq!(breakdown.incorrect, 2);
        assert_eq!(breakdown.earned, 10);
    }

    #[test]
    fn question_without_correct_option_never_scores() {
        let questions = vec![question(1, None, 50)];
        let breakdown = score(&questions, &answers(&[(1, 0)]), 50);

        assert_eq!(breakdown.earned, 0);
        assert_eq!(breakdown.correct, 0);
        assert_eq!(breakdown.incorrect, 1);
    }

    #[test]
    fn missing_ceiling_falls_back_to_question_sum() {
        let questions = vec![question(1, Some(0), 10), question(2, Some(0), 25)];
        let breakdown = score(&questions, &answers(&[(1, 0)]), 0);

        assert_eq!(breakdown.display_max, 35);
        assert_eq!(breakdown.earned, 10);
    }

    #[test]
    fn awarded_score_is_clamped_to_the_ceiling() {
        // Authored ceiling below the attainable point sum.
        let questions = vec![question(1, Some(0), 40), question(2, Some(0), 40)];
        let breakdown = score(&questions, &answers(&[(1, 0), (2, 0)]), 60);

        assert_eq!(breakdown.earned, 80);
        assert_eq!(breakdown.awarded(), 60);
        assert_eq!(breakdown.percentage, 100);
    }

    #[test]
    fn percentage_rounds_to_nearest_whole() {
        let questions = vec![question(1, Some(0), 10)];
        let breakdown = score(&questions, &answers(&[(1, 0)]), 60);
        // 10 / 60 = 16.66…% rounds to 17.
        assert_eq!(breakdown.percentage, 17);
    }

    #[test]
    fn empty_quiz_scores_zero_without_dividing() {
        let breakdown = score(&[], &IndexMap::new(), 0);
        assert_eq!(breakdown.earned, 0);
        assert_eq!(breakdown.display_max, 0);
        assert_eq!(breakdown.percentage, 0);
    }

    #[test]
    fn grading_is_idempotent() {
        let questions = vec![question(1, Some(1), 15), question(2, Some(0), 5)];
        let picks = answers(&[(1, 1), (2, 2)]);
        assert_eq!(score(&questions, &picks, 20), score(&questions, &picks, 20));
    }
}
