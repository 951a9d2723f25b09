use super::time::format_time;
use crate::model::issue::IssueFields;

const SEPARATOR: &str = " → ";
const PLACEHOLDER: &str = "…";
const MAX_DESCRIPTION_CHARS: usize = 140;

/// Status, assignee and, when the issue tracks time, a `spent / estimate` segment.
pub fn format_subtitle(fields: &IssueFields) -> String {
    let mut segments = vec![
        fields.status.name.trim().to_string(),
        fields.assignee_name().to_string(),
    ];

    let spent = fields.timespent.filter(|s| *s > 0);
    let estimate = fields.timeestimate.filter(|s| *s > 0);
    if spent.is_some() || estimate.is_some() {
        segments.push(format!(
            "{} / {}",
            tracked(spent),
            tracked(estimate)
        ));
    }

    segments.join(SEPARATOR)
}

/// The subtitle followed by the issue type description, if there is one.
pub fn subtitle_with_description(fields: &IssueFields) -> String {
    let subtitle = format_subtitle(fields);
    match fields.issuetype.description.as_deref() {
        Some(desc) if !desc.is_empty() => {
            let desc: String = desc.chars().take(MAX_DESCRIPTION_CHARS).collect();
            format!("{subtitle} | {desc}")
        }
        _ => subtitle,
    }
}

fn tracked(seconds: Option<u64>) -> String {
    let formatted = seconds.map(format_time).unwrap_or_default();
    if formatted.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::issue::{Assignee, IssueType, Status};

    fn fields(status: &str, assignee: Option<&str>) -> IssueFields {
        IssueFields {
            status: Status {
                name: status.into(),
            },
            assignee: assignee.map(|a| Assignee {
                display_name: a.into(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn without_time_tracking() {
        assert_eq!(format_subtitle(&fields("Open", None)), "Open → unassigned");
    }

    #[test]
    fn trims_status() {
        assert_eq!(
            format_subtitle(&fields("  In Review ", Some("Jane Doe"))),
            "In Review → Jane Doe"
        );
    }

    #[test]
    fn zero_spent_with_estimate() {
        let mut f = fields("Open", None);
        f.timespent = Some(0);
        f.timeestimate = Some(3600);
        assert_eq!(format_subtitle(&f), "Open → unassigned → … / 1h");
    }

    #[test]
    fn spent_under_a_minute_shows_placeholder() {
        let mut f = fields("Open", Some("A B"));
        f.timespent = Some(30);
        assert_eq!(format_subtitle(&f), "Open → A B → … / …");
    }

    #[test]
    fn both_zero_is_not_tracked() {
        let mut f = fields("Done", None);
        f.timespent = Some(0);
        f.timeestimate = Some(0);
        assert_eq!(format_subtitle(&f), "Done → unassigned");
    }

    #[test]
    fn spent_and_estimate() {
        let mut f = fields("Open", Some("A B"));
        f.timespent = Some(5400);
        f.timeestimate = Some(7200);
        assert_eq!(format_subtitle(&f), "Open → A B → 1h 30min / 2h");
    }

    #[test]
    fn appends_description() {
        let mut f = fields("Open", None);
        f.issuetype = IssueType {
            description: Some("desc".into()),
            ..Default::default()
        };
        assert_eq!(subtitle_with_description(&f), "Open → unassigned | desc");
    }

    #[test]
    fn truncates_description_by_chars() {
        let mut f = fields("Open", None);
        f.issuetype.description = Some("é".repeat(200));
        let subtitle = subtitle_with_description(&f);
        let (_, desc) = subtitle.split_once(" | ").unwrap();
        assert_eq!(desc.chars().count(), 140);
    }

    #[test]
    fn no_description_no_suffix() {
        assert!(!subtitle_with_description(&fields("Open", None)).contains('|'));
    }
}
