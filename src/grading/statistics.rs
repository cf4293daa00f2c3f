use crate::models::{BatchStatistics, QuestionAccuracy, StudentResult};

/// Round to two decimals for reporting
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold per-student results into batch statistics.
///
/// Scores use the population standard deviation. Question ids come from
/// the first result's `total_questions`; with no students every field is
/// zero and `question_accuracy` is empty.
pub fn aggregate(results: &[StudentResult], failing_threshold: f64) -> BatchStatistics {
    let Some(first) = results.first() else {
        return BatchStatistics::default();
    };

    let n = results.len() as f64;
    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let highest = scores.iter().copied().fold(f64::MIN, f64::max);
    let lowest = scores.iter().copied().fold(f64::MAX, f64::min);
    let average_correct = results.iter().map(|r| r.correct_count as f64).sum::<f64>() / n;

    let question_accuracy = (1..=first.total_questions as u32)
        .map(|question| {
            let correct_count = results
                .iter()
                .filter(|r| r.details.iter().any(|d| d.question == question && d.is_correct()))
                .count();
            QuestionAccuracy {
                question,
                correct_count,
                total_students: results.len(),
                accuracy: correct_count as f64 / n * 100.0,
            }
        })
        .collect();

    BatchStatistics {
        student_count: results.len(),
        average_score: round2(mean),
        average_correct: round2(average_correct),
        highest_score: round2(highest),
        lowest_score: round2(lowest),
        std_deviation: round2(variance.sqrt()),
        question_accuracy,
        perfect_scores: scores.iter().filter(|&&s| s == 100.0).count(),
        failing_scores: scores.iter().filter(|&&s| s < failing_threshold).count(),
    }
}
