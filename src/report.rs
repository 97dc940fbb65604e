//! Report collaborator: turns a batch of review records into a downloadable
//! performance report (SVG charts + HTML narrative).
//!
//! Charts are string-built SVG so the server stays free of native plotting
//! dependencies. Artifacts land in the configured output directory and are
//! served statically under `/reports`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::config::Prompts;
use crate::domain::ReviewRecord;
use crate::progression::Tier;
use crate::util::{file_slug, fill_template, round2};

/// Mean correctness per group as a percentage, groups in first-seen order.
pub fn group_accuracy<F>(records: &[ReviewRecord], key: F) -> Vec<(String, f64)>
where
    F: Fn(&ReviewRecord) -> &str,
{
    let mut order: Vec<String> = Vec::new();
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for record in records {
        let group = key(record);
        let idx = match order.iter().position(|g| g == group) {
            Some(idx) => idx,
            None => {
                order.push(group.to_string());
                tally.push((0, 0));
                order.len() - 1
            }
        };
        tally[idx].0 += 1;
        if record.is_correct {
            tally[idx].1 += 1;
        }
    }
    order
        .into_iter()
        .zip(tally)
        .map(|(group, (total, correct))| {
            (group, round2(correct as f64 / total as f64 * 100.0))
        })
        .collect()
}

/// The four learning-fundamentals scores, each on a 0..100 scale.
pub fn fundamentals(records: &[ReviewRecord]) -> Vec<(&'static str, f64)> {
    if records.is_empty() {
        return vec![
            ("Listening", 0.0),
            ("Grasping", 0.0),
            ("Retention", 0.0),
            ("Application", 0.0),
        ];
    }
    let n = records.len() as f64;
    let mean_time = records.iter().map(|r| r.time_taken).sum::<f64>() / n;
    let correct = records.iter().filter(|r| r.is_correct).count() as f64;
    let incorrect = records.iter().filter(|r| !r.is_correct).count() as f64;

    let upper: Vec<&ReviewRecord> = records
        .iter()
        .filter(|r| Tier::Moderate.matches(&r.difficulty) || Tier::Difficult.matches(&r.difficulty))
        .collect();
    let application = if upper.is_empty() {
        0.0
    } else {
        upper.iter().filter(|r| r.is_correct).count() as f64 / upper.len() as f64 * 100.0
    };

    vec![
        ("Listening", round2((100.0 - mean_time).max(0.0))),
        ("Grasping", round2(correct / n * 100.0)),
        ("Retention", round2(100.0 - incorrect / n * 100.0)),
        ("Application", round2(application)),
    ]
}

/// Write charts and the HTML document; returns the document path.
#[instrument(level = "info", skip(records, prompts), fields(records = records.len(), %student_name))]
pub fn generate_report(
    output_dir: &Path,
    records: &[ReviewRecord],
    student_name: &str,
    prompts: &Prompts,
) -> io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let slug = file_slug(student_name);

    let topic_acc = group_accuracy(records, |r| r.topic.as_str());
    let subtopic_acc = group_accuracy(records, |r| r.subtopic.as_str());
    let scores = fundamentals(records);

    let chart_files = [
        (
            format!("{slug}_fundamentals.svg"),
            svg_bar_chart(
                "Learning Fundamentals",
                &scores
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect::<Vec<_>>(),
            ),
        ),
        (
            format!("{slug}_topic_accuracy.svg"),
            svg_bar_chart("Topic Accuracy", &topic_acc),
        ),
        (
            format!("{slug}_subtopic_accuracy.svg"),
            svg_bar_chart("Subtopic Accuracy", &subtopic_acc),
        ),
    ];
    for (name, svg) in &chart_files {
        fs::write(output_dir.join(name), svg)?;
    }

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{} - Performance Report</title>\n",
        html_escape(student_name)
    ));
    html.push_str(
        "<style>body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
         img{max-width:100%}.question{margin:0.8rem 0;padding:0.6rem;border-left:3px solid #888}\
         .correct{color:#2a7}.incorrect{color:#c33}</style>\n</head>\n<body>\n",
    );
    html.push_str(&format!(
        "<h1>{} - Performance Report</h1>\n",
        html_escape(student_name)
    ));
    let intro = fill_template(
        &prompts.report_intro_template,
        &[("student_name", student_name)],
    );
    html.push_str(&format!("<p>{}</p>\n", html_escape(&intro)));

    html.push_str("<h2>Learning Fundamentals</h2>\n<ul>\n");
    for (name, value) in &scores {
        html.push_str(&format!("<li>{name}: {value:.2}%</li>\n"));
    }
    html.push_str("</ul>\n");
    html.push_str(&format!(
        "<img src=\"{}\" alt=\"Learning Fundamentals\">\n",
        chart_files[0].0
    ));

    html.push_str("<h2>Topic Accuracy</h2>\n");
    html.push_str(&format!(
        "<img src=\"{}\" alt=\"Topic Accuracy\">\n",
        chart_files[1].0
    ));
    html.push_str("<h2>Subtopic Accuracy</h2>\n");
    html.push_str(&format!(
        "<img src=\"{}\" alt=\"Subtopic Accuracy\">\n",
        chart_files[2].0
    ));

    html.push_str("<h2>Question-wise Performance</h2>\n");
    for record in records {
        let verdict = if record.is_correct {
            "<span class=\"correct\">Correct</span>"
        } else {
            "<span class=\"incorrect\">Incorrect</span>"
        };
        html.push_str(&format!(
            "<div class=\"question\">Q: {}<br>Topic/Subtopic: {} / {}<br>\
             Your Answer: {} | Correct Answer: {} | {} | Time Taken: {}s</div>\n",
            html_escape(&record.question),
            html_escape(&record.topic),
            html_escape(&record.subtopic),
            html_escape(&record.user_answer),
            html_escape(&record.correct_answer),
            verdict,
            record.time_taken,
        ));
    }
    html.push_str("</body>\n</html>\n");

    let report_path = output_dir.join(format!("{slug}_report.html"));
    fs::write(&report_path, html)?;
    info!(target: "quiz", path = %report_path.display(), "Report generated");
    Ok(report_path)
}

/// Minimal vertical bar chart on a fixed 0..100 scale.
fn svg_bar_chart(title: &str, data: &[(String, f64)]) -> String {
    const WIDTH: f64 = 640.0;
    const HEIGHT: f64 = 360.0;
    const LEFT: f64 = 50.0;
    const TOP: f64 = 40.0;
    const PLOT_W: f64 = 570.0;
    const PLOT_H: f64 = 260.0;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" \
         font-family=\"sans-serif\" font-size=\"12\">\n\
         <text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
        WIDTH / 2.0,
        html_escape(title)
    );

    // Axes and gridlines at 0/25/50/75/100.
    for tick in [0.0, 25.0, 50.0, 75.0, 100.0] {
        let y = TOP + PLOT_H * (1.0 - tick / 100.0);
        svg.push_str(&format!(
            "<line x1=\"{LEFT}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"#ddd\"/>\n\
             <text x=\"{}\" y=\"{}\" text-anchor=\"end\">{tick}</text>\n",
            LEFT + PLOT_W,
            LEFT - 8.0,
            y + 4.0
        ));
    }

    let n = data.len().max(1) as f64;
    let step = PLOT_W / n;
    let bar_w = step * 0.6;
    for (idx, (label, value)) in data.iter().enumerate() {
        let clamped = value.clamp(0.0, 100.0);
        let bar_h = PLOT_H * clamped / 100.0;
        let x = LEFT + step * idx as f64 + (step - bar_w) / 2.0;
        let y = TOP + PLOT_H - bar_h;
        let center = x + bar_w / 2.0;
        let short: String = label.chars().take(16).collect();
        svg.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{bar_h:.1}\" fill=\"#4a90d9\"/>\n\
             <text x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{:.1}</text>\n\
             <text x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            y - 6.0,
            value,
            TOP + PLOT_H + 18.0,
            html_escape(&short)
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
