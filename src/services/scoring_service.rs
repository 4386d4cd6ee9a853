use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::{Answer, Question};

/// Minimum percentage that counts as a pass. Fixed for every test.
pub const PASS_THRESHOLD: f64 = 60.0;

pub fn is_passed(score: f64) -> bool {
    score >= PASS_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TestAttemptResult {
    /// Percentage in `[0, 100]`, unrounded.
    pub score: f64,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub completed_at: DateTime<Utc>,
}

impl TestAttemptResult {
    pub fn passed(&self) -> bool {
        is_passed(self.score)
    }
}

pub struct ScoringService;

impl ScoringService {
    pub fn evaluate(questions: &[Question], answers: &[Answer]) -> TestAttemptResult {
        Self::evaluate_at(questions, answers, Utc::now())
    }

    /// Scores `answers` against `questions`.
    ///
    /// The denominator is always `questions.len()`. Answers naming a question
    /// outside the set are ignored, as is any repeat answer to a question
    /// already answered earlier in the slice. An empty question set scores 0.
    pub fn evaluate_at(
        questions: &[Question],
        answers: &[Answer],
        completed_at: DateTime<Utc>,
    ) -> TestAttemptResult {
        let correct_by_id: HashMap<Uuid, i32> = questions
            .iter()
            .map(|q| (q.id, q.correct_option_index))
            .collect();

        let mut answered: HashSet<Uuid> = HashSet::with_capacity(answers.len());
        let mut correct_answers = 0usize;

        for answer in answers {
            let Some(correct) = correct_by_id.get(&answer.question_id) else {
                continue;
            };
            if !answered.insert(answer.question_id) {
                continue;
            }
            if *correct == answer.selected_option_index {
                correct_answers += 1;
            }
        }

        let total_questions = questions.len();
        let score = if total_questions > 0 {
            (correct_answers as f64 / total_questions as f64) * 100.0
        } else {
            0.0
        };

        TestAttemptResult {
            score,
            total_questions,
            correct_answers,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            test_id: Uuid::nil(),
            text: "Pick one".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index: correct,
            created_at: Utc::now(),
        }
    }

    fn answer(q: &Question, selected: i32) -> Answer {
        Answer {
            question_id: q.id,
            selected_option_index: selected,
        }
    }

    #[test]
    fn three_of_four_scores_seventy_five() {
        let questions: Vec<Question> = (0..4).map(question).collect();
        let answers: Vec<Answer> = questions
            .iter()
            .zip([0, 1, 2, 0])
            .map(|(q, sel)| answer(q, sel))
            .collect();

        let result = ScoringService::evaluate(&questions, &answers);
        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.score, 75.0);
        assert!(result.passed());
    }

    #[test]
    fn all_correct_scores_one_hundred() {
        let questions: Vec<Question> = [2, 0, 3, 1, 1, 0, 2].into_iter().map(question).collect();
        let answers: Vec<Answer> = questions
            .iter()
            .map(|q| answer(q, q.correct_option_index))
            .collect();

        let result = ScoringService::evaluate(&questions, &answers);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.correct_answers, questions.len());
    }

    #[test]
    fn empty_question_set_scores_zero() {
        let result = ScoringService::evaluate(&[], &[]);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.total_questions, 0);
        assert_eq!(result.correct_answers, 0);
        assert!(!result.passed());
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let questions = vec![question(1), question(2)];
        let answers = vec![
            answer(&questions[0], 1),
            Answer {
                question_id: Uuid::new_v4(),
                selected_option_index: 0,
            },
        ];

        let result = ScoringService::evaluate(&questions, &answers);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn repeated_answers_count_once() {
        let questions = vec![question(0), question(0)];
        let answers = vec![
            answer(&questions[0], 0),
            answer(&questions[0], 0),
            answer(&questions[0], 0),
        ];

        let result = ScoringService::evaluate(&questions, &answers);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn first_answer_to_a_question_wins() {
        let questions = vec![question(3)];
        let answers = vec![answer(&questions[0], 1), answer(&questions[0], 3)];

        let result = ScoringService::evaluate(&questions, &answers);
        assert_eq!(result.correct_answers, 0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(is_passed(60.0));
        assert!(!is_passed(59.999));
        assert!(is_passed(100.0));
    }

    #[test]
    fn completion_time_is_the_supplied_instant() {
        let at = Utc::now() - chrono::Duration::minutes(5);
        let result = ScoringService::evaluate_at(&[question(0)], &[], at);
        assert_eq!(result.completed_at, at);
        assert!(result.completed_at.to_rfc3339().ends_with("+00:00"));
    }
}
