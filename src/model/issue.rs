use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: Status,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    /// Seconds logged against the issue.
    #[serde(default)]
    pub timespent: Option<u64>,
    /// Remaining estimate in seconds.
    #[serde(default)]
    pub timeestimate: Option<u64>,
    #[serde(default)]
    pub issuetype: IssueType,
    /// Sprints the issue has been part of, oldest first.
    #[serde(rename = "customfield_10006", default, deserialize_with = "de_sprints")]
    pub sprints: Option<Vec<SprintState>>,
    /// Tempo account the issue is booked against.
    #[serde(rename = "io.tempo.jira__account", default, deserialize_with = "de_account")]
    pub account: Option<AccountTag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    #[serde(default, deserialize_with = "de_avatar_id")]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprintState {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountTag {
    #[serde(default)]
    pub value: Option<String>,
}

impl IssueFields {
    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .map(|a| a.display_name.as_str())
            .unwrap_or("unassigned")
    }

    /// The most recent sprint entry, without consuming it.
    pub fn latest_sprint(&self) -> Option<&SprintState> {
        self.sprints.as_ref().and_then(|s| s.last())
    }
}

/// Jira sends avatar ids as numbers; older payloads and fixtures use strings.
fn de_avatar_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Ok(None),
    }
}

/// Custom field ids differ between Jira instances, so the sprint field may hold
/// anything. Only an array counts; entries that are not objects carry no state.
fn de_sprints<'de, D>(deserializer: D) -> Result<Option<Vec<SprintState>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(entries)) = value else {
        return Ok(None);
    };
    let sprints = entries
        .iter()
        .map(|entry| SprintState {
            state: entry
                .get("state")
                .and_then(|s| s.as_str())
                .map(String::from),
        })
        .collect();
    Ok(Some(sprints))
}

fn de_account<'de, D>(deserializer: D) -> Result<Option<AccountTag>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Object(obj)) = value else {
        return Ok(None);
    };
    let value = match obj.get("value") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Ok(Some(AccountTag { value }))
}
