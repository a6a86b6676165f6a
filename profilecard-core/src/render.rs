//! SVG badge rendering.

use std::fmt::Write;

use crate::domain::{GradeResult, MetricSnapshot, VisibleLanguage};
use crate::metrics::format_commits;

const WIDTH: u32 = 495;
const STATS_HEIGHT: u32 = 195;
const ACCENT: &str = "#00D4FF";
const BACKGROUND: &str = "#000000";
const FOREGROUND: &str = "#F0F6FC";
const FALLBACK_COLOR: &str = "#888888";
const RING_RADIUS: f64 = 44.0;
const BAR_WIDTH: f64 = 435.0;
const MIN_SEGMENT_WIDTH: f64 = 0.1;
const LEGEND_COLUMNS: usize = 3;
const MAX_LABEL_CHARS: usize = 15;

const STAR_ICON: &str = r#"<path d="M8 .25a.75.75 0 01.673.418l1.882 3.815 4.21.612a.75.75 0 01.416 1.279l-3.046 2.97.719 4.192a.75.75 0 01-1.088.791L8 12.347l-3.766 1.98a.75.75 0 01-1.088-.79l.72-4.194L.818 6.374a.75.75 0 01.416-1.28l4.21-.611L7.327.668A.75.75 0 018 .25z" fill="none" stroke="{color}" stroke-width="1.2"/>"#;
const COMMIT_ICON: &str = r#"<path d="M10.5 7.75a2.5 2.5 0 11-5 0 2.5 2.5 0 015 0zm1.43.75a4.002 4.002 0 01-7.86 0H.75a.75.75 0 110-1.5h3.32a4.002 4.002 0 017.86 0h3.32a.75.75 0 110 1.5h-3.32z" fill="{color}"/>"#;
const PULL_REQUEST_ICON: &str = r#"<path d="M7.177 3.073L9.573.677A.25.25 0 0110 .854v4.792a.25.25 0 01-.427.177L7.177 3.427a.25.25 0 010-.354zM3.75 2.5a.75.75 0 100 1.5.75.75 0 000-1.5zm-2.25.75a2.25 2.25 0 113 2.122v5.256a2.251 2.251 0 11-1.5 0V5.372A2.25 2.25 0 011.5 3.25zM11 2.5h-1V4h1a1 1 0 011 1v5.628a2.251 2.251 0 101.5 0V5a2.5 2.5 0 00-2.5-2.5zm-7.5 10a.75.75 0 100 1.5.75.75 0 000-1.5zM12 12.5a.75.75 0 100 1.5.75.75 0 000-1.5z" fill="{color}"/>"#;
const ISSUE_ICON: &str = r#"<path d="M8 9.5a1.5 1.5 0 100-3 1.5 1.5 0 000 3z" fill="{color}"/><path d="M8 0a8 8 0 100 16A8 8 0 008 0zM1.5 8a6.5 6.5 0 1113 0 6.5 6.5 0 01-13 0z" fill="{color}"/>"#;
const CONTRIBUTION_ICON: &str = r#"<path d="M2 1.75C2 .784 2.784 0 3.75 0h8.5C13.216 0 14 .784 14 1.75v11.5A1.75 1.75 0 0112.25 15h-8.5A1.75 1.75 0 012 13.25V1.75zM3.5 1.75v11.5c0 .138.112.25.25.25h8.5a.25.25 0 00.25-.25V1.75a.25.25 0 00-.25-.25h-8.5a.25.25 0 00-.25.25z" fill="{color}"/><path d="M5 3h6v1.5H5V3zm0 3h6v1.5H5V6z" fill="{color}"/>"#;

const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("Assembly", "#6E4C13"),
    ("C", "#555555"),
    ("C#", "#178600"),
    ("C++", "#f34b7d"),
    ("CSS", "#563d7c"),
    ("CoffeeScript", "#244776"),
    ("Cython", "#1171EE"),
    ("Dart", "#00B4AB"),
    ("Dockerfile", "#384d54"),
    ("Erlang", "#B83998"),
    ("Fortran", "#4d41b1"),
    ("Go", "#00ADD8"),
    ("Groovy", "#427819"),
    ("HTML", "#e34c26"),
    ("Haskell", "#5e5086"),
    ("Java", "#b07219"),
    ("JavaScript", "#f1e05a"),
    ("Julia", "#a270ba"),
    ("Jupyter Notebook", "#DA5B0B"),
    ("Kotlin", "#A97BFF"),
    ("LaTeX", "#3D6117"),
    ("Less", "#1d365d"),
    ("Lua", "#000080"),
    ("MATLAB", "#e16737"),
    ("Makefile", "#427819"),
    ("Markdown", "#083fa1"),
    ("PHP", "#4F5D95"),
    ("Perl", "#0298c3"),
    ("PowerShell", "#012456"),
    ("Python", "#3572A5"),
    ("R", "#276DC3"),
    ("Ruby", "#701516"),
    ("Rust", "#dea584"),
    ("SCSS", "#c6538c"),
    ("SQL", "#e38c00"),
    ("Scala", "#c22d40"),
    ("Shell", "#89e051"),
    ("Solidity", "#AA6746"),
    ("Stata", "#1a5f91"),
    ("Svelte", "#ff3e00"),
    ("Swift", "#F05138"),
    ("TeX", "#3D6117"),
    ("Terraform", "#7b42bb"),
    ("TypeScript", "#3178c6"),
    ("Vue", "#41b883"),
];

/// Display color of a language, grey when unknown.
pub fn language_color(name: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(language, _)| *language == name)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Render the stats badge with the percentile ring.
pub fn render_stats_svg(user: &str, snapshot: &MetricSnapshot, grade: &GradeResult) -> String {
    let contributions = snapshot
        .contribs
        .map(|count| count.to_string())
        .unwrap_or_else(|| "---".to_string());
    let rows = [
        (STAR_ICON, "Total Stars:", snapshot.stars.to_string()),
        (COMMIT_ICON, "Total Commits:", format_commits(snapshot.commits)),
        (PULL_REQUEST_ICON, "Total PRs:", snapshot.prs.to_string()),
        (ISSUE_ICON, "Total Issues:", snapshot.issues.to_string()),
        (CONTRIBUTION_ICON, "Contributed to:", contributions),
    ];

    let mut svg = String::new();
    open_svg(&mut svg, STATS_HEIGHT);
    let _ = writeln!(svg, "  <style>");
    let _ = writeln!(
        svg,
        "    .title {{ font: 600 22px 'Segoe UI', Ubuntu, Sans-Serif; fill: {ACCENT}; }}"
    );
    let _ = writeln!(
        svg,
        "    .header {{ font: 700 14px 'Segoe UI', Ubuntu, Sans-Serif; fill: {FOREGROUND}; }}"
    );
    let _ = writeln!(
        svg,
        "    .stat {{ font: 900 14px 'Segoe UI', Ubuntu, Sans-Serif; fill: {FOREGROUND}; }}"
    );
    let _ = writeln!(
        svg,
        "    .grade {{ font: 900 34px 'Segoe UI', Ubuntu, Sans-Serif; fill: {FOREGROUND}; }}"
    );
    let _ = writeln!(svg, "  </style>");
    let _ = writeln!(
        svg,
        r#"  <rect width="{WIDTH}" height="{STATS_HEIGHT}" rx="10" fill="{BACKGROUND}"/>"#
    );
    let _ = writeln!(
        svg,
        r#"  <text x="30" y="38" class="title">{}'s GitHub Stats</text>"#,
        escape_xml(user)
    );

    let _ = writeln!(svg, r#"  <g transform="translate(30, 65)">"#);
    for (index, (icon, label, value)) in rows.iter().enumerate() {
        let _ = writeln!(svg, r#"    <g transform="translate(0, {})">"#, index * 26);
        let _ = writeln!(
            svg,
            r#"      <svg x="0" y="-14" width="18" height="18" viewBox="0 0 16 16">{}</svg>"#,
            icon.replace("{color}", ACCENT)
        );
        let _ = writeln!(svg, r#"      <text x="35" y="0" class="header">{label}</text>"#);
        let _ = writeln!(
            svg,
            r#"      <text x="220" y="0" class="stat">{}</text>"#,
            escape_xml(value)
        );
        let _ = writeln!(svg, "    </g>");
    }
    let _ = writeln!(svg, "  </g>");

    let circumference = ring_circumference();
    let percentile = f64::from(grade.percentile.min(100));
    let offset = circumference * (1.0 - percentile / 100.0);
    let _ = writeln!(svg, r#"  <g transform="translate(400, 105)">"#);
    let _ = writeln!(
        svg,
        r#"    <circle r="{RING_RADIUS}" stroke="{ACCENT}" stroke-width="4.5" fill="none" opacity="0.1"/>"#
    );
    let _ = writeln!(
        svg,
        r#"    <circle r="{RING_RADIUS}" stroke="{ACCENT}" stroke-width="4.5" fill="none" stroke-dasharray="{circumference:.2}" stroke-dashoffset="{offset:.2}" stroke-linecap="round" transform="rotate(-90)"/>"#
    );
    let _ = writeln!(
        svg,
        r#"    <text text-anchor="middle" dy="0.35em" class="grade">{}</text>"#,
        grade.grade
    );
    let _ = writeln!(svg, "  </g>");
    let _ = writeln!(svg, "</svg>");
    svg
}

/// Render the language badge: a stacked bar and a three-column legend.
pub fn render_languages_svg(user: &str, languages: &[VisibleLanguage]) -> String {
    let height = languages_height(languages.len());

    let mut svg = String::new();
    open_svg(&mut svg, height);
    let _ = writeln!(svg, "  <style>");
    let _ = writeln!(
        svg,
        "    .title {{ font: 600 22px 'Segoe UI', Ubuntu, Sans-Serif; fill: {FOREGROUND}; }}"
    );
    let _ = writeln!(
        svg,
        "    .label {{ font: 400 12px 'Segoe UI', Ubuntu, Sans-Serif; fill: {FOREGROUND}; }}"
    );
    let _ = writeln!(
        svg,
        "    .perc {{ font: 400 10px 'Segoe UI', Ubuntu, Sans-Serif; fill: {FOREGROUND}; opacity: 0.6; }}"
    );
    let _ = writeln!(svg, "  </style>");
    let _ = writeln!(
        svg,
        r#"  <rect width="{WIDTH}" height="{height}" rx="10" fill="{BACKGROUND}"/>"#
    );
    let _ = writeln!(
        svg,
        r#"  <text x="30" y="38" class="title">{}'s Most Used Languages</text>"#,
        escape_xml(user)
    );

    let _ = writeln!(svg, r#"  <g transform="translate(30, 60)">"#);
    let _ = writeln!(
        svg,
        r#"    <mask id="bar-mask"><rect width="{BAR_WIDTH}" height="14" rx="7" fill="white"/></mask>"#
    );
    let _ = writeln!(
        svg,
        r#"    <rect width="{BAR_WIDTH}" height="14" rx="7" fill="{FOREGROUND}" fill-opacity="0.1"/>"#
    );
    let _ = writeln!(svg, r#"    <g mask="url(#bar-mask)">"#);
    let mut x = 0.0;
    for language in languages {
        let width = segment_width(language.percentage);
        let _ = writeln!(
            svg,
            r#"      <rect x="{x:.2}" width="{width:.2}" height="14" fill="{}"/>"#,
            language_color(&language.name)
        );
        x += width;
    }
    let _ = writeln!(svg, "    </g>");
    let _ = writeln!(svg, "  </g>");

    let _ = writeln!(svg, r#"  <g transform="translate(30, 100)">"#);
    for (index, language) in languages.iter().enumerate() {
        let column = index % LEGEND_COLUMNS;
        let row = index / LEGEND_COLUMNS;
        let _ = writeln!(
            svg,
            r#"    <g transform="translate({}, {})">"#,
            column * 150,
            row * 20
        );
        let _ = writeln!(
            svg,
            r#"      <circle cx="5" cy="-4" r="5" fill="{}"/>"#,
            language_color(&language.name)
        );
        let _ = writeln!(
            svg,
            r#"      <text x="18" y="0" class="label">{}</text>"#,
            escape_xml(&truncate_label(&language.name))
        );
        let _ = writeln!(
            svg,
            r#"      <text x="140" y="0" text-anchor="end" class="perc">{:.1}%</text>"#,
            language.percentage
        );
        let _ = writeln!(svg, "    </g>");
    }
    let _ = writeln!(svg, "  </g>");
    let _ = writeln!(svg, "</svg>");
    svg
}

fn open_svg(svg: &mut String, height: u32) {
    let _ = writeln!(
        svg,
        r#"<svg width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" fill="none" xmlns="http://www.w3.org/2000/svg">"#
    );
}

fn ring_circumference() -> f64 {
    2.0 * std::f64::consts::PI * RING_RADIUS
}

fn languages_height(count: usize) -> u32 {
    let rows = count.div_ceil(LEGEND_COLUMNS) as u32;
    (110 + rows * 20).max(170)
}

fn segment_width(percentage: f64) -> f64 {
    let width = percentage / 100.0 * BAR_WIDTH;
    if width < MIN_SEGMENT_WIDTH { 0.5 } else { width }
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_CHARS {
        let head: String = name.chars().take(MAX_LABEL_CHARS - 2).collect();
        format!("{head}..")
    } else {
        name.to_string()
    }
}

/// Escape text for use in XML character data and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
