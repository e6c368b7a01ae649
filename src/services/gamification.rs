//! Badge predicates evaluated against a user's activity aggregates.

use crate::config::{BadgeRequirement, BadgeRule};

/// Per-user activity counters the badge predicates operate on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityAggregates {
    /// Ideas submitted in any review status.
    pub idea_count: u32,
    /// Ideas approved by a reviewer.
    pub approved_idea_count: u32,
    /// Completed quiz attempts.
    pub completed_quiz_count: u32,
    /// All-time competition rank; zero means unranked.
    pub rank_position: u32,
}

/// One catalogue entry together with its unlock verdict.
#[derive(Debug, Clone)]
pub struct BadgeEvaluation {
    /// The catalogue rule that was evaluated.
    pub rule: BadgeRule,
    /// Whether the aggregates meet the rule's requirement.
    pub unlocked: bool,
}

/// Evaluate the whole catalogue, preserving its display order.
pub fn evaluate(catalogue: &[BadgeRule], aggregates: &ActivityAggregates) -> Vec<BadgeEvaluation> {
    catalogue
        .iter()
        .map(|rule| BadgeEvaluation {
            rule: rule.clone(),
            unlocked: requirement_met(&rule.requirement, aggregates),
        })
        .collect()
}

fn requirement_met(requirement: &BadgeRequirement, aggregates: &ActivityAggregates) -> bool {
    match *requirement {
        BadgeRequirement::MinIdeas(min) => aggregates.idea_count >= min,
        BadgeRequirement::MinApprovedIdeas(min) => aggregates.approved_idea_count >= min,
        BadgeRequirement::MinCompletedQuizzes(min) => aggregates.completed_quiz_count >= min,
        // An unranked user (position zero) never qualifies.
        BadgeRequirement::TopRank(max_rank) => {
            aggregates.rank_position > 0 && aggregates.rank_position <= max_rank
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn unlocked_slugs(aggregates: ActivityAggregates) -> Vec<String> {
        let config = AppConfig::default();
        evaluate(config.badges(), &aggregates)
            .into_iter()
            .filter(|evaluation| evaluation.unlocked)
            .map(|evaluation| evaluation.rule.slug)
            .collect()
    }

    #[test]
    fn fresh_user_unlocks_nothing() {
        assert!(unlocked_slugs(ActivityAggregates::default()).is_empty());
    }

    #[test]
    fn first_idea_unlocks_at_one() {
        let slugs = unlocked_slugs(ActivityAggregates {
            idea_count: 1,
            ..Default::default()
        });
        assert_eq!(slugs, vec!["first-idea"]);
    }

    #[test]
    fn prolific_submitter_unlocks_collaborator() {
        let slugs = unlocked_slugs(ActivityAggregates {
            idea_count: 10,
            ..Default::default()
        });
        assert_eq!(slugs, vec!["first-idea", "collaborator"]);
    }

    #[test]
    fn quiz_master_requires_three_completions() {
        let below = unlocked_slugs(ActivityAggregates {
            completed_quiz_count: 2,
            ..Default::default()
        });
        assert!(below.is_empty());

        let at = unlocked_slugs(ActivityAggregates {
            completed_quiz_count: 3,
            ..Default::default()
        });
        assert_eq!(at, vec!["quiz-master"]);
    }

    #[test]
    fn innovator_counts_only_approved_ideas() {
        let slugs = unlocked_slugs(ActivityAggregates {
            idea_count: 5,
            approved_idea_count: 3,
            ..Default::default()
        });
        assert!(slugs.contains(&"innovator".to_string()));
    }

    #[test]
    fn leader_excludes_unranked_users() {
        let unranked = unlocked_slugs(ActivityAggregates {
            rank_position: 0,
            ..Default::default()
        });
        assert!(!unranked.contains(&"leader".to_string()));

        let fifth = unlocked_slugs(ActivityAggregates {
            rank_position: 5,
            ..Default::default()
        });
        assert!(fifth.contains(&"leader".to_string()));

        let sixth = unlocked_slugs(ActivityAggregates {
            rank_position: 6,
            ..Default::default()
        });
        assert!(!sixth.contains(&"leader".to_string()));
    }
}
