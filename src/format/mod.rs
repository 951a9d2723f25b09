pub mod match_key;
pub mod subtitle;
pub mod time;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::icons::IconCache;
use crate::model::issue::Issue;
use crate::model::result_item::{ModOverride, Mods, ResultItem, Text};
use match_key::match_key;
use subtitle::subtitle_with_description;

const COPY_HINT: &str = "Copy the issue key with ⌘+C";

/// Turns fetched issues into launcher result items.
pub struct IssueFormatter {
    org: String,
    icons: IconCache,
    match_tags: bool,
}

impl IssueFormatter {
    pub fn new(org: impl Into<String>, icons: IconCache) -> Self {
        Self {
            org: org.into(),
            icons,
            match_tags: false,
        }
    }

    pub fn from_config(config: &AppConfig, icons: IconCache) -> Result<Self> {
        let org = config
            .get("org")
            .filter(|o| !o.is_empty())
            .context("No Jira organization configured. Set `org` in ~/.jira-alfred/config.toml")?;
        Ok(Self::new(org, icons).with_match_tags(config.match_tags))
    }

    pub fn with_match_tags(mut self, enabled: bool) -> Self {
        self.match_tags = enabled;
        self
    }

    pub fn icons(&self) -> &IconCache {
        &self.icons
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("https://{}.atlassian.net/browse/{key}", self.org)
    }

    pub fn format_issues(&self, issues: &[Issue]) -> Vec<ResultItem> {
        issues.iter().map(|issue| self.format_issue(issue)).collect()
    }

    pub fn format_issue(&self, issue: &Issue) -> ResultItem {
        let fields = &issue.fields;
        let url = self.browse_url(&issue.key);

        let key = match_key(&issue.key, fields);
        let match_text = if self.match_tags {
            key.with_tags()
        } else {
            key.text
        };

        ResultItem {
            uid: issue.id.clone(),
            title: format!("{} – {}", issue.key, fields.summary),
            subtitle: subtitle_with_description(fields),
            arg: url.clone(),
            quicklookurl: url,
            icon: self.icons.resolve(&fields.issuetype),
            text: Text {
                copy: issue.key.clone(),
            },
            valid: true,
            autocomplete: issue.key.clone(),
            mods: Mods {
                cmd: ModOverride {
                    subtitle: COPY_HINT.into(),
                },
            },
            match_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::icons::rasterize::Rasterizer;
    use crate::icons::source::IconSource;
    use crate::icons::IconError;
    use crate::model::issue::{
        AccountTag, Assignee, IssueFields, IssueType, SprintState, Status,
    };

    struct CountingSource {
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl IconSource for CountingSource {
        async fn fetch_svg(&self, _url: &str) -> Result<Option<String>, IconError> {
            *self.calls.lock().unwrap() += 1;
            Ok(Some("<svg/>".into()))
        }
    }

    struct EchoRasterizer;

    #[async_trait]
    impl Rasterizer for EchoRasterizer {
        async fn rasterize(&self, svg: &str) -> Result<Vec<u8>, IconError> {
            Ok(svg.as_bytes().to_vec())
        }
    }

    fn formatter(dir: &tempfile::TempDir) -> (IssueFormatter, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        let icons = IconCache::new(
            dir.path(),
            "./icon.png",
            Arc::new(CountingSource {
                calls: calls.clone(),
            }),
            Arc::new(EchoRasterizer),
        );
        (IssueFormatter::new("acme", icons), calls)
    }

    fn make_issue(id: &str, key: &str) -> Issue {
        Issue {
            id: id.into(),
            key: key.into(),
            fields: IssueFields {
                summary: "Do thing".into(),
                status: Status {
                    name: "In Progress".into(),
                },
                assignee: Some(Assignee {
                    display_name: "A B".into(),
                }),
                issuetype: IssueType {
                    avatar_id: None,
                    icon_url: None,
                    description: Some("desc".into()),
                },
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn formats_one_issue() {
        let dir = tempfile::tempdir().unwrap();
        let (formatter, calls) = formatter(&dir);

        let items = formatter.format_issues(&[make_issue("10001", "PRJ-1")]);

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.uid, "10001");
        assert_eq!(item.title, "PRJ-1 – Do thing");
        assert!(item.subtitle.starts_with("In Progress → A B"));
        assert!(item.subtitle.ends_with("| desc"));
        assert_eq!(item.arg, "https://acme.atlassian.net/browse/PRJ-1");
        assert_eq!(item.quicklookurl, item.arg);
        assert_eq!(item.text.copy, "PRJ-1");
        assert_eq!(item.autocomplete, "PRJ-1");
        assert!(item.valid);
        assert_eq!(item.icon.path, "./icon.png");
        assert_eq!(item.match_text, "PRJ 1 PRJ-1 Do thing A B In Progress ");
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn formatting_is_repeatable_and_leaves_input_intact() {
        let dir = tempfile::tempdir().unwrap();
        let (formatter, _) = formatter(&dir);
        let mut issue = make_issue("1", "PRJ-2");
        issue.fields.sprints = Some(vec![SprintState {
            state: Some("ACTIVE".into()),
        }]);

        let first = formatter.format_issue(&issue);
        let second = formatter.format_issue(&issue);

        assert_eq!(first, second);
        assert_eq!(issue.fields.sprints.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn match_tags_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let (formatter, _) = formatter(&dir);
        let formatter = formatter.with_match_tags(true);
        let mut issue = make_issue("1", "PRJ-3");
        issue.fields.account = Some(AccountTag {
            value: Some("OPS".into()),
        });

        let item = formatter.format_issue(&issue);
        assert_eq!(item.match_text, "PRJ 3 PRJ-3 Do thing A B In Progress a=OPS ");
    }

    #[tokio::test]
    async fn shared_avatar_fetched_once() {
        let dir = tempfile::tempdir().unwrap();
        let (formatter, calls) = formatter(&dir);
        let issues: Vec<Issue> = ["PRJ-1", "PRJ-2", "PRJ-3"]
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let mut issue = make_issue(&i.to_string(), key);
                issue.fields.issuetype.avatar_id = Some("10318".into());
                issue.fields.issuetype.icon_url = Some("https://acme/icon.svg".into());
                issue
            })
            .collect();

        let items = formatter.format_issues(&issues);
        let expected = dir.path().join("10318.png");
        assert!(items
            .iter()
            .all(|item| item.icon.path == expected.to_string_lossy()));

        formatter.icons().wait_idle().await;
        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(expected.exists());
    }

    #[test]
    fn from_config_requires_org() {
        let icons = IconCache::from_config(&AppConfig::default());
        let err = IssueFormatter::from_config(&AppConfig::default(), icons)
            .err()
            .expect("missing org should fail");
        assert!(err.to_string().contains("No Jira organization"));
    }

    #[test]
    fn from_config_uses_org() {
        let config = AppConfig {
            org: Some("acme".into()),
            ..Default::default()
        };
        let icons = IconCache::from_config(&config);
        let formatter = IssueFormatter::from_config(&config, icons).unwrap();
        assert_eq!(
            formatter.browse_url("ABC-1"),
            "https://acme.atlassian.net/browse/ABC-1"
        );
    }
}
