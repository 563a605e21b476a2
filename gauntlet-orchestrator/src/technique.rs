//! Technique tasks
//!
//! The static catalog served to clients, and the grader the fan-out pipeline
//! delegates to. A technique task passes when the agent wrote a non-empty
//! `<task>_analysis.json` into its submission directory; judging the quality
//! of the analysis is left to a human reviewer.

use gauntlet_core::domain::grade::{CompetitionGrades, TaskGrade};
use gauntlet_core::dto::technique::TechniqueCatalog;
use std::path::Path;

/// Known technique tasks and their one-line descriptions
pub const TECHNIQUE_TASKS: &[(&str, &str)] = &[
    (
        "imbalance",
        "Detect class imbalance and choose handling strategy",
    ),
    (
        "missing",
        "Analyze missing values and choose imputation strategy",
    ),
    (
        "encoding",
        "Analyze categorical features and choose encoding method",
    ),
    (
        "cv",
        "Choose a cross-validation scheme that matches the data",
    ),
    (
        "scaling",
        "Decide which features need scaling and how",
    ),
    (
        "leakage",
        "Find features that leak the target into training data",
    ),
];

pub fn catalog() -> TechniqueCatalog {
    TechniqueCatalog {
        available: TECHNIQUE_TASKS
            .iter()
            .map(|(id, _)| id.to_string())
            .collect(),
        descriptions: TECHNIQUE_TASKS
            .iter()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect(),
    }
}

/// Grade one task against a submission directory
pub fn grade_task(task: &str, submission_dir: &Path) -> TaskGrade {
    let file_name = format!("{}_analysis.json", task);
    let analysis = submission_dir.join(&file_name);

    if !analysis.exists() {
        return TaskGrade {
            task: task.to_string(),
            score: 0.0,
            passed: false,
            word_count: 0,
            message: format!("{} not found", file_name),
        };
    }

    match std::fs::read_to_string(&analysis) {
        Ok(content) => {
            let word_count = content.split_whitespace().count();
            TaskGrade {
                task: task.to_string(),
                score: if word_count > 0 { 1.0 } else { 0.0 },
                passed: word_count > 0,
                word_count,
                message: format!("Agent wrote {} words", word_count),
            }
        }
        Err(e) => TaskGrade {
            task: task.to_string(),
            score: 0.0,
            passed: false,
            word_count: 0,
            message: format!("Error reading file: {}", e),
        },
    }
}

/// Grade every requested task against a submission directory
pub fn grade_all(submission_dir: &Path, tasks: &[String]) -> CompetitionGrades {
    CompetitionGrades::from_grades(tasks.iter().map(|task| grade_task(task, submission_dir)))
}
