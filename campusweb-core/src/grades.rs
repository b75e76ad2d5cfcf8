//! Grades report retrieval and table parsing.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;

use crate::{
    Error, Grade, Result, Session,
    client::PortalClient,
    extract,
    notify::Notifier,
    step::StepContext,
    types::GRADE_IN_PROGRESS,
};

/// Portal-side tab state needs a moment to propagate after the bridge call.
const TAB_BRIDGE_SETTLE: Duration = Duration::from_millis(300);

const GRADES_FLOW: &str = "SIW0001200-flow";

/// Drives the grades module: tab bridge, flow entry, display event, parse.
pub struct GradesRetrieval<'a> {
    client: &'a PortalClient,
    notifier: &'a dyn Notifier,
}

impl<'a> GradesRetrieval<'a> {
    pub fn new(client: &'a PortalClient, notifier: &'a dyn Notifier) -> Self {
        Self { client, notifier }
    }

    pub async fn fetch(&self, session: &Session) -> Result<Vec<Grade>> {
        let mut ctx = StepContext::new();
        ctx.record_sid(&session.sid);
        match self.run(session, &mut ctx).await {
            Ok(grades) => Ok(grades),
            Err(err) => Err(ctx.fail(self.notifier, err).await),
        }
    }

    async fn run(&self, session: &Session, ctx: &mut StepContext) -> Result<Vec<Grade>> {
        let sid = session.sid.as_str();

        // Response content is irrelevant; the call flips the active tab in
        // the server-side session.
        ctx.enter("tab bridge");
        self.client
            .get(
                "tab bridge",
                "/campusportal.do?page=main&tabId=si",
                sid,
                &self.client.url("/campusportal.do?page=main"),
            )
            .await?;
        tokio::time::sleep(TAB_BRIDGE_SETTLE).await;

        ctx.enter("grades entry");
        let entry_path = format!("/campussquare.do?_flowId={GRADES_FLOW}");
        let response = self
            .client
            .get_iframe(
                "grades entry",
                &entry_path,
                sid,
                &self.client.url("/campusportal.do?page=main&tabId=si"),
            )
            .await?;

        // The server answers either redirect-with-key or inline-with-hidden-
        // field; both shapes occur in the wild.
        let flow_key = if response.status() == StatusCode::FOUND {
            response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .and_then(extract::flow_key_from_location)
        } else {
            extract::flow_key_from_html(&response.text().await?)
        };
        let flow_key = flow_key.ok_or(Error::FlowKeyNotFound)?;

        ctx.enter("grades display");
        let referer = self
            .client
            .url(&format!("{entry_path}&_flowExecutionKey={flow_key}"));
        let response = self
            .client
            .post_form(
                "grades display",
                "/campussquare.do",
                sid,
                &referer,
                &[("_flowExecutionKey", flow_key.as_str()), ("_eventId", "display")],
            )
            .await?;

        Ok(parse_grades(&response.text().await?))
    }
}

static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap());

static TABLE_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").unwrap());

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

// Column positions in the portal's current report layout. A markup change
// upstream is a compatibility break, not a parser bug.
const MIN_COLUMNS: usize = 8;
const SUBJECT_COLUMN: usize = 4;
const SCORE_COLUMN: usize = 6;
const GRADE_COLUMN: usize = 7;

/// Extracts grade rows from the report HTML.
///
/// A row qualifies with at least [`MIN_COLUMNS`] cells, a non-empty subject,
/// and at least one of score/grade present. Rows are not deduplicated.
pub fn parse_grades(html: &str) -> Vec<Grade> {
    let mut grades = Vec::new();
    for row in TABLE_ROW.captures_iter(html) {
        let cells: Vec<String> = TABLE_CELL
            .captures_iter(&row[1])
            .map(|cell| clean_cell(&cell[1]))
            .collect();
        if cells.len() < MIN_COLUMNS {
            continue;
        }
        let subject = cells[SUBJECT_COLUMN].clone();
        let score = cells[SCORE_COLUMN].clone();
        let grade = cells[GRADE_COLUMN].clone();
        if subject.is_empty() || (score.is_empty() && grade.is_empty()) {
            continue;
        }
        grades.push(Grade {
            subject,
            score,
            grade: if grade.is_empty() {
                GRADE_IN_PROGRESS.to_string()
            } else {
                grade
            },
        });
    }
    grades
}

/// Strips tags, folds `&nbsp;` into spaces, collapses whitespace runs.
fn clean_cell(raw: &str) -> String {
    let stripped = MARKUP_TAG.replace_all(raw, "");
    let unescaped = stripped.replace("&nbsp;", " ");
    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!("<table><tr>{tds}</tr></table>")
    }

    #[test]
    fn row_without_score_or_grade_is_dropped() {
        let html = row(&["1", "2026", "Q1", "CS", "Algorithms", "3", "", ""]);
        assert!(parse_grades(&html).is_empty());
    }

    #[test]
    fn score_without_grade_gets_in_progress_sentinel() {
        let html = row(&["1", "2026", "Q1", "CS", "Algorithms", "3", "92", ""]);
        let grades = parse_grades(&html);
        assert_eq!(
            grades,
            vec![Grade {
                subject: "Algorithms".to_string(),
                score: "92".to_string(),
                grade: GRADE_IN_PROGRESS.to_string(),
            }]
        );
    }

    #[test]
    fn final_grade_is_kept_verbatim() {
        let html = row(&["1", "2026", "Q1", "CS", "Operating Systems", "3", "88", "A"]);
        let grades = parse_grades(&html);
        assert_eq!(grades[0].grade, "A");
    }

    #[test]
    fn narrow_rows_are_skipped() {
        // Header and layout rows have fewer cells than the report rows.
        let html = row(&["Algorithms", "92", "A"]);
        assert!(parse_grades(&html).is_empty());
    }

    #[test]
    fn cell_text_is_cleaned() {
        let html = row(&[
            "1",
            "2026",
            "Q1",
            "CS",
            "<span>Data&nbsp;&nbsp;Structures</span>\n  and <b>Algorithms</b>",
            "3",
            "&nbsp;90&nbsp;",
            "",
        ]);
        let grades = parse_grades(&html);
        assert_eq!(grades[0].subject, "Data Structures and Algorithms");
        assert_eq!(grades[0].score, "90");
    }

    #[test]
    fn duplicate_subjects_are_not_deduplicated() {
        let r = row(&["1", "2026", "Q1", "CS", "Seminar", "1", "80", "B"]);
        let html = format!("{r}{r}");
        assert_eq!(parse_grades(&html).len(), 2);
    }
}
