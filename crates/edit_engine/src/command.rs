//! Editor commands
//!
//! A command is an immutable `{type, payload}` message. It has no behavior of
//! its own: handlers registered on the `CommandBus` interpret it.

use crate::{EditError, Result};
use doc_model::nodes::{HeadingTag, ListType};
use doc_model::{NodeId, Selection};
use serde::{Deserialize, Serialize};

/// Target of `ApplyBlockType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Quote,
}

impl BlockKind {
    pub fn heading_tag(self) -> Option<HeadingTag> {
        match self {
            BlockKind::H1 => Some(HeadingTag::H1),
            BlockKind::H2 => Some(HeadingTag::H2),
            BlockKind::H3 => Some(HeadingTag::H3),
            BlockKind::H4 => Some(HeadingTag::H4),
            BlockKind::H5 => Some(HeadingTag::H5),
            BlockKind::H6 => Some(HeadingTag::H6),
            BlockKind::Paragraph | BlockKind::Quote => None,
        }
    }
}

/// Target of `ApplyListType`; `None` lifts items out of their list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Number,
    None,
}

impl ListKind {
    pub fn list_type(self) -> Option<ListType> {
        match self {
            ListKind::Bullet => Some(ListType::Bullet),
            ListKind::Number => Some(ListType::Number),
            ListKind::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyBlockType {
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyListType {
    pub kind: ListKind,
}

/// Either a pre-formatted `display_text`, or author and year to format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsertCitation {
    pub display_text: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertImage {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub max_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTable {
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub include_headers: bool,
}

/// Mark a range with a review comment. Without `range` the current
/// selection is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddReviewComment {
    #[serde(default)]
    pub range: Option<Selection>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteText {
    pub range: Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteCharacter {
    #[serde(default = "default_backward")]
    pub backward: bool,
}

fn default_backward() -> bool {
    true
}

/// Toggle one format flag by name (`"bold"`, `"italic"`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatText {
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveNode {
    pub node_id: NodeId,
}

/// Every command the default handlers understand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EditorCommand {
    ApplyBlockType(ApplyBlockType),
    ApplyListType(ApplyListType),
    InsertCitation(InsertCitation),
    InsertImage(InsertImage),
    InsertTable(InsertTable),
    AddReviewComment(AddReviewComment),
    InsertText(InsertText),
    DeleteText(DeleteText),
    DeleteCharacter(DeleteCharacter),
    FormatText(FormatText),
    RemoveNode(RemoveNode),
}

/// Discriminant of `EditorCommand`, used as the bus registration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ApplyBlockType,
    ApplyListType,
    InsertCitation,
    InsertImage,
    InsertTable,
    AddReviewComment,
    InsertText,
    DeleteText,
    DeleteCharacter,
    FormatText,
    RemoveNode,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        CommandKind::ApplyBlockType,
        CommandKind::ApplyListType,
        CommandKind::InsertCitation,
        CommandKind::InsertImage,
        CommandKind::InsertTable,
        CommandKind::AddReviewComment,
        CommandKind::InsertText,
        CommandKind::DeleteText,
        CommandKind::DeleteCharacter,
        CommandKind::FormatText,
        CommandKind::RemoveNode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::ApplyBlockType => "ApplyBlockType",
            CommandKind::ApplyListType => "ApplyListType",
            CommandKind::InsertCitation => "InsertCitation",
            CommandKind::InsertImage => "InsertImage",
            CommandKind::InsertTable => "InsertTable",
            CommandKind::AddReviewComment => "AddReviewComment",
            CommandKind::InsertText => "InsertText",
            CommandKind::DeleteText => "DeleteText",
            CommandKind::DeleteCharacter => "DeleteCharacter",
            CommandKind::FormatText => "FormatText",
            CommandKind::RemoveNode => "RemoveNode",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EditorCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            EditorCommand::ApplyBlockType(_) => CommandKind::ApplyBlockType,
            EditorCommand::ApplyListType(_) => CommandKind::ApplyListType,
            EditorCommand::InsertCitation(_) => CommandKind::InsertCitation,
            EditorCommand::InsertImage(_) => CommandKind::InsertImage,
            EditorCommand::InsertTable(_) => CommandKind::InsertTable,
            EditorCommand::AddReviewComment(_) => CommandKind::AddReviewComment,
            EditorCommand::InsertText(_) => CommandKind::InsertText,
            EditorCommand::DeleteText(_) => CommandKind::DeleteText,
            EditorCommand::DeleteCharacter(_) => CommandKind::DeleteCharacter,
            EditorCommand::FormatText(_) => CommandKind::FormatText,
            EditorCommand::RemoveNode(_) => CommandKind::RemoveNode,
        }
    }

    /// Build a command from its type name and camelCase JSON payload
    pub fn from_parts(command_type: &str, payload: serde_json::Value) -> Result<Self> {
        let kind = CommandKind::parse(command_type)
            .ok_or_else(|| EditError::InvalidCommand(format!("unknown command type `{command_type}`")))?;
        let payload = match payload {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        let message = serde_json::json!({ "type": kind.as_str(), "payload": payload });
        serde_json::from_value(message).map_err(|e| EditError::invalid_payload(kind.as_str(), e.to_string()))
    }
}
