use serde::{Deserialize, Serialize};

/// One row of an Alfred script filter response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub arg: String,
    pub quicklookurl: String,
    pub icon: Icon,
    pub text: Text,
    pub valid: bool,
    pub autocomplete: String,
    pub mods: Mods,
    #[serde(rename = "match")]
    pub match_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

impl Icon {
    pub fn png(path: impl Into<String>) -> Self {
        Self {
            kind: "png".into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub copy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mods {
    pub cmd: ModOverride,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModOverride {
    pub subtitle: String,
}

/// Top-level document read by the launcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptFilter {
    pub items: Vec<ResultItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultItem {
        ResultItem {
            uid: "1".into(),
            title: "PRJ-1 – Do thing".into(),
            subtitle: "Open → unassigned".into(),
            arg: "https://acme.atlassian.net/browse/PRJ-1".into(),
            quicklookurl: "https://acme.atlassian.net/browse/PRJ-1".into(),
            icon: Icon::png("./icon.png"),
            text: Text {
                copy: "PRJ-1".into(),
            },
            valid: true,
            autocomplete: "PRJ-1".into(),
            mods: Mods {
                cmd: ModOverride {
                    subtitle: "Copy".into(),
                },
            },
            match_text: "PRJ 1 PRJ-1 Do thing unassigned Open ".into(),
        }
    }

    #[test]
    fn serializes_script_filter_field_names() {
        let json = serde_json::to_value(ScriptFilter {
            items: vec![sample()],
        })
        .unwrap();
        let item = &json["items"][0];
        assert_eq!(item["icon"]["type"], "png");
        assert_eq!(item["icon"]["path"], "./icon.png");
        assert_eq!(item["text"]["copy"], "PRJ-1");
        assert_eq!(item["mods"]["cmd"]["subtitle"], "Copy");
        assert_eq!(item["match"], "PRJ 1 PRJ-1 Do thing unassigned Open ");
        assert!(item.get("match_text").is_none());
    }
}
