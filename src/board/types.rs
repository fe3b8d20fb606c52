use serde::{Deserialize, Deserializer, Serialize};

/// A list (column) on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

/// A unit of work on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub id_list: Option<String>,
}

/// A file attached to a card.
///
/// Link attachments come back with a null or missing `fileName`; anything that
/// is not a JSON string is read as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub file_name: Option<String>,
    pub url: String,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// The four lists the workflow moves cards through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRole {
    In,
    Process,
    Out,
    Errors,
}

impl ListRole {
    /// Match a list name case-insensitively against the reserved names
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "in" => Some(ListRole::In),
            "process" => Some(ListRole::Process),
            "out" => Some(ListRole::Out),
            "errors" => Some(ListRole::Errors),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListRole::In => "in",
            ListRole::Process => "process",
            ListRole::Out => "out",
            ListRole::Errors => "errors",
        }
    }
}

/// Lists resolved by role for one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowLists {
    pub input: Option<BoardList>,
    pub process: Option<BoardList>,
    pub out: Option<BoardList>,
    pub errors: Option<BoardList>,
}

impl WorkflowLists {
    /// Pick out the reserved lists. When two lists share a role the later one wins.
    pub fn resolve(lists: &[BoardList]) -> Self {
        let mut resolved = Self::default();

        for list in lists {
            let slot = match ListRole::from_name(&list.name) {
                Some(ListRole::In) => &mut resolved.input,
                Some(ListRole::Process) => &mut resolved.process,
                Some(ListRole::Out) => &mut resolved.out,
                Some(ListRole::Errors) => &mut resolved.errors,
                None => continue,
            };
            *slot = Some(list.clone());
        }

        resolved
    }

    pub fn get(&self, role: ListRole) -> Option<&BoardList> {
        match role {
            ListRole::In => self.input.as_ref(),
            ListRole::Process => self.process.as_ref(),
            ListRole::Out => self.out.as_ref(),
            ListRole::Errors => self.errors.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str, name: &str) -> BoardList {
        BoardList {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_list_role_is_case_insensitive() {
        assert_eq!(ListRole::from_name("IN"), Some(ListRole::In));
        assert_eq!(ListRole::from_name("Process"), Some(ListRole::Process));
        assert_eq!(ListRole::from_name("oUt"), Some(ListRole::Out));
        assert_eq!(ListRole::from_name("Errors"), Some(ListRole::Errors));
        assert_eq!(ListRole::from_name("Error"), None);
        assert_eq!(ListRole::from_name(" in"), None);
    }

    #[test]
    fn test_resolve_lists() {
        let lists = vec![
            list("1", "Backlog"),
            list("2", "In"),
            list("3", "PROCESS"),
            list("4", "out"),
        ];
        let resolved = WorkflowLists::resolve(&lists);

        assert_eq!(resolved.get(ListRole::In).map(|l| l.id.as_str()), Some("2"));
        assert_eq!(resolved.get(ListRole::Process).map(|l| l.id.as_str()), Some("3"));
        assert_eq!(resolved.get(ListRole::Out).map(|l| l.id.as_str()), Some("4"));
        assert!(resolved.get(ListRole::Errors).is_none());
    }

    #[test]
    fn test_resolve_duplicate_names_last_wins() {
        let resolved = WorkflowLists::resolve(&[list("a", "in"), list("b", "IN")]);
        assert_eq!(resolved.input.unwrap().id, "b");
    }

    #[test]
    fn test_attachment_file_name_must_be_string() {
        let json = r#"[
            {"id": "1", "fileName": "talk.mp3", "url": "https://x/talk.mp3"},
            {"id": "2", "fileName": null, "url": "https://example.com"},
            {"id": "3", "url": "https://example.com/no-name"},
            {"id": "4", "fileName": 42, "url": "https://x/42"}
        ]"#;
        let attachments: Vec<Attachment> = serde_json::from_str(json).unwrap();

        assert_eq!(attachments[0].file_name.as_deref(), Some("talk.mp3"));
        assert!(attachments[1].file_name.is_none());
        assert!(attachments[2].file_name.is_none());
        assert!(attachments[3].file_name.is_none());
    }

    #[test]
    fn test_card_deserialize() {
        let json = r#"{"id": "c1", "name": "Vows", "desc": "", "idList": "l1", "pos": 16384}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, "c1");
        assert_eq!(card.id_list.as_deref(), Some("l1"));
    }
}
