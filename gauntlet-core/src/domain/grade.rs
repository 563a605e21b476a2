//! Technique-task grade types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grade for one technique task on one submission directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGrade {
    pub task: String,
    pub score: f64,
    pub passed: bool,
    pub word_count: usize,
    pub message: String,
}

impl TaskGrade {
    /// Passing beats failing; between equals, more words wins
    pub fn outranks(&self, other: &TaskGrade) -> bool {
        (self.passed, self.word_count) > (other.passed, other.word_count)
    }
}

/// Aggregate counters over a set of task grades
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub total: usize,
    pub passed: usize,
    pub total_words: usize,
    pub pass_rate: f64,
}

/// All technique-task grades collected for one competition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionGrades {
    pub tasks: BTreeMap<String, TaskGrade>,
    pub summary: GradeSummary,
}

impl CompetitionGrades {
    pub fn from_grades(grades: impl IntoIterator<Item = TaskGrade>) -> Self {
        let mut result = Self::default();
        for grade in grades {
            result.tasks.insert(grade.task.clone(), grade);
        }
        result.recompute_summary();
        result
    }

    /// Folds `other` into `self`
    ///
    /// Tasks only present in `self` are kept; a task graded in both keeps the
    /// better of the two grades.
    pub fn merge(&mut self, other: CompetitionGrades) {
        for (task, grade) in other.tasks {
            match self.tasks.get(&task) {
                Some(existing) if !grade.outranks(existing) => {}
                _ => {
                    self.tasks.insert(task, grade);
                }
            }
        }
        self.recompute_summary();
    }

    fn recompute_summary(&mut self) {
        let total = self.tasks.len();
        let passed = self.tasks.values().filter(|g| g.passed).count();
        let total_words = self.tasks.values().map(|g| g.word_count).sum();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        self.summary = GradeSummary {
            total,
            passed,
            total_words,
            pass_rate,
        };
    }
}
