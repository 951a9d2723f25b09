use crate::model::issue::IssueFields;

/// Search text for one issue plus the optional sprint/account tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey {
    pub text: String,
    /// `sp={state}` of the latest sprint.
    pub sprint_tag: Option<String>,
    /// `a={value}` of the Tempo account.
    pub account_tag: Option<String>,
}

impl MatchKey {
    /// The search text with the tags appended, each followed by a space.
    pub fn with_tags(&self) -> String {
        let mut text = self.text.clone();
        for tag in [&self.sprint_tag, &self.account_tag].into_iter().flatten() {
            text.push_str(tag);
            text.push(' ');
        }
        text
    }
}

pub fn match_key(key: &str, fields: &IssueFields) -> MatchKey {
    let mut parts = key.split('-');
    let project = parts.next().unwrap_or_default();
    let number = parts.next().unwrap_or_default();

    let sprint_tag = fields
        .latest_sprint()
        .and_then(|s| s.state.as_deref())
        .map(|state| format!("sp={state}"));

    let account_tag = fields
        .account
        .as_ref()
        .and_then(|a| a.value.as_deref())
        .filter(|v| !v.is_empty())
        .map(|value| format!("a={value}"));

    let text = format!(
        "{project} {number} {key} {} {} {} ",
        fields.summary,
        fields.assignee_name(),
        fields.status.name
    );

    MatchKey {
        text,
        sprint_tag,
        account_tag,
    }
}
