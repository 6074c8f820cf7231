use serde::{Deserialize, Serialize};

/// Backend account info object.
///
/// The block store returns this under the `user` field on login/signup.
/// Only `username` is load-bearing (it decides page ownership); the rest
/// is kept flexible to avoid breaking when backend fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AccountInfo {
    pub username: String,

    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Closed set of block content kinds.
///
/// Wire format and the type-picker labels are both lowercase.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum BlockKind {
    Text,
    Image,
    Video,
    Link,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Link,
    ];
}

/// Grid rectangle in cell units. `x`/`y` is the top-left cell,
/// `w`/`h` the span. All committed positions satisfy the grid bounds
/// and the no-overlap invariant (see `crate::grid`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Position {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) struct BlockStyle {
    #[serde(
        rename = "backgroundColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,

    #[serde(rename = "textColor", default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Block {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: BlockKind,

    pub content: String,

    pub position: Position,

    /// At most one per user. The center block anchors the layout and is
    /// immutable in kind and size, and exempt from deletion.
    #[serde(rename = "isCenter", default)]
    pub is_center: bool,

    #[serde(default)]
    pub style: BlockStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_wire_contract_deserialize() {
        // Contract based on the block store: camelCase field names,
        // `type` as the kind discriminant.
        let json = r#"{
            "id": "b1",
            "type": "link",
            "content": "https://example.com",
            "position": {"x": 0, "y": 3, "w": 2, "h": 1},
            "isCenter": false,
            "style": {"backgroundColor": "rgb(23, 23, 23)", "textColor": "white"}
        }"#;
        let b: Block = serde_json::from_str(json).expect("block should parse");
        assert_eq!(b.kind, BlockKind::Link);
        assert_eq!(b.position, Position { x: 0, y: 3, w: 2, h: 1 });
        assert!(!b.is_center);
        assert_eq!(b.style.background_color.as_deref(), Some("rgb(23, 23, 23)"));
    }

    #[test]
    fn block_wire_contract_defaults() {
        // Old records omit isCenter and style entirely.
        let json = r#"{
            "id": "b2",
            "type": "text",
            "content": "hi",
            "position": {"x": 5, "y": 0, "w": 1, "h": 1}
        }"#;
        let b: Block = serde_json::from_str(json).expect("block should parse");
        assert!(!b.is_center);
        assert!(b.style.background_color.is_none());
        assert!(b.style.text_color.is_none());
    }

    #[test]
    fn block_serializes_camel_case() {
        let b = Block {
            id: "b3".to_string(),
            kind: BlockKind::Image,
            content: String::new(),
            position: Position { x: 1, y: 1, w: 2, h: 2 },
            is_center: true,
            style: BlockStyle {
                background_color: Some("rgb(38, 38, 38)".to_string()),
                text_color: None,
            },
        };
        let v = serde_json::to_value(&b).expect("should serialize");
        assert_eq!(v["type"], "image");
        assert_eq!(v["isCenter"], true);
        assert_eq!(v["style"]["backgroundColor"], "rgb(38, 38, 38)");
        // skip_serializing_if keeps absent colors off the wire.
        assert!(v["style"].get("textColor").is_none());
    }

    #[test]
    fn block_kind_display_is_lowercase() {
        assert_eq!(BlockKind::Video.to_string(), "video");
        assert_eq!(BlockKind::ALL.len(), 4);
    }

    #[test]
    fn account_info_keeps_unknown_fields() {
        let json = r#"{"username": "ada", "email": "ada@example.com", "id": 7}"#;
        let u: AccountInfo = serde_json::from_str(json).expect("account should parse");
        assert_eq!(u.username, "ada");
        assert_eq!(u.extra["email"], "ada@example.com");
    }
}
