use std::fmt::Write;

use crate::models::BatchGradingResult;

const WIDTH: usize = 60;

/// Fixed-width text table of a graded batch
pub fn format_results_table(result: &BatchGradingResult) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let stats = &result.statistics;

    let mut out = String::new();
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{:^width$}", "Grading Results", width = WIDTH);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "Total questions: {}", result.total_questions);
    let _ = writeln!(out, "Total students: {}", stats.student_count);
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "{:<4} {:<15} {:<10} {:<10}", "#", "Name", "Score", "Percent");
    let _ = writeln!(out, "{light}");
    for (i, student) in result.students.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<15} {:<10} {:<10}",
            i + 1,
            student.name,
            student.score_display(),
            student.percentage_display()
        );
    }
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "Average score: {:.1}%", stats.average_score);
    let _ = writeln!(out, "Highest score: {:.1}%", stats.highest_score);
    let _ = writeln!(out, "Lowest score: {:.1}%", stats.lowest_score);
    out.push_str(&heavy);
    out
}
