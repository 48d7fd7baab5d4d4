// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Map one feed-unit node into a [`NormalizedPost`].
//!
//! Normalization is total: whatever the node looks like, every output field
//! is filled, falling back to its default when no candidate path matches.
//! Candidate paths are listed per field in the order they are tried.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::path::{first_match, first_string, kind_name, resolve, FieldPath, Kind};
use crate::types::{AttachmentRecord, Count, FeedError, FeedResult, NormalizedPost};

const ID: &[FieldPath] = &[FieldPath::new(&["id"], Kind::Scalar)];

const TYPENAME: &[FieldPath] = &[FieldPath::new(&["__typename"], Kind::Text)];

const MESSAGE_TEXT: &[FieldPath] = &[
    FieldPath::new(&["message"], Kind::Text),
    FieldPath::new(&["message", "message"], Kind::Text),
    FieldPath::new(&["message", "text"], Kind::Text),
];

const MESSAGE_RANGES: &[&str] = &["comet_sections", "content", "story", "message", "ranges"];

const OWNER: &[FieldPath] = &[
    FieldPath::new(&["feedback", "owning_profile", "name"], Kind::Text),
    FieldPath::new(&["actors", "0", "name"], Kind::Text),
];

const PUBLISH_TIME: &[FieldPath] = &[
    FieldPath::new(&["publish_time"], Kind::Number),
    FieldPath::new(&["created_time"], Kind::Number),
    FieldPath::new(&["metadata", "story", "creation_time"], Kind::Number),
];

const COMMENT_COUNT: &[FieldPath] = &[
    FieldPath::new(
        &["comment_rendering_instance", "comments", "total_count"],
        Kind::Any,
    ),
    FieldPath::new(
        &[
            "comments_count_summary_renderer",
            "feedback",
            "comment_rendering_instance",
            "comments",
            "total_count",
        ],
        Kind::Any,
    ),
    FieldPath::new(
        &[
            "comet_sections",
            "content",
            "story",
            "feedback",
            "comments_count_summary_renderer",
            "feedback",
            "comment_rendering_instance",
            "comments",
            "total_count",
        ],
        Kind::Any,
    ),
    FieldPath::new(&["feedback", "comment_count"], Kind::Any),
];

const SHARE_COUNT: &[FieldPath] = &[
    FieldPath::new(&["share_count", "count"], Kind::Any),
    FieldPath::new(&["share_count"], Kind::Scalar),
];

const VIEW_COUNT: &[FieldPath] = &[
    FieldPath::new(&["video_view_count"], Kind::Number),
    FieldPath::new(&["view_count"], Kind::Number),
];

const UFI_FEEDBACK: &[FieldPath] = &[
    FieldPath::new(
        &["feedback", "comet_ufi_summary_and_actions_renderer", "feedback"],
        Kind::Object,
    ),
    FieldPath::new(&["feedback"], Kind::Object),
];

const REACTION_NAME: &[FieldPath] = &[
    FieldPath::new(&["node", "localized_name"], Kind::Text),
    FieldPath::new(&["node", "id"], Kind::Scalar),
];

const SUPPORTED_REACTION_NAME: &[FieldPath] = &[
    FieldPath::new(&["node", "localized_name"], Kind::Text),
    FieldPath::new(&["id"], Kind::Scalar),
];

const REACTION_COUNT: &[FieldPath] = &[
    FieldPath::new(&["reaction_count"], Kind::Any),
    FieldPath::new(&["i18n_reaction_count"], Kind::Any),
];

const ATTACHMENT_MEDIA: &[FieldPath] = &[
    FieldPath::new(&["media"], Kind::Object),
    FieldPath::new(&["styles", "attachment", "media"], Kind::Object),
];

const MEDIA_URL: &[FieldPath] = &[FieldPath::new(&["url"], Kind::Text)];

const ATTACHMENT_URL: &[FieldPath] = &[
    FieldPath::new(&["href"], Kind::Text),
    FieldPath::new(&["url"], Kind::Text),
    FieldPath::new(&["styles", "attachment", "url"], Kind::Text),
];

/// Public photo page used when a photo attachment carries no link of its own.
const PHOTO_PAGE_URL: &str = "https://www.facebook.com/photo.php?fbid=";

/// Normalize one feed-unit node. Never fails.
pub fn normalize_post(node: &Value) -> NormalizedPost {
    let defaults = NormalizedPost::default();

    NormalizedPost {
        id: first_string(node, ID),
        kind: first_string(node, TYPENAME).unwrap_or(defaults.kind),
        text: extract_text(node),
        owner: first_string(node, OWNER),
        publish_time: match first_match(node, PUBLISH_TIME) {
            Some(Value::Number(n)) => Some(n.clone()),
            _ => None,
        },
        comment_count: Count::coerce(first_match(node, COMMENT_COUNT)),
        share_count: Count::coerce(first_match(node, SHARE_COUNT)),
        view_count: match first_match(node, VIEW_COUNT) {
            Some(Value::Number(n)) => n.clone(),
            _ => defaults.view_count,
        },
        reactions: extract_reactions(node),
        attachments: extract_attachments(node),
    }
}

/// Direct message first, then the rich-text ranges joined in order.
fn extract_text(node: &Value) -> String {
    if let Some(text) = first_string(node, MESSAGE_TEXT) {
        return text;
    }

    resolve(node, MESSAGE_RANGES)
        .and_then(Value::as_array)
        .map(|ranges| {
            ranges
                .iter()
                .filter_map(|r| r.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Top reactions from the UFI summary, falling back to the supported
/// reaction infos of the action renderers. Later duplicates override earlier
/// ones.
fn extract_reactions(node: &Value) -> BTreeMap<String, Count> {
    let mut reactions = BTreeMap::new();

    let top_edges = first_match(node, UFI_FEEDBACK)
        .and_then(|ufi| resolve(ufi, &["top_reactions", "edges"]))
        .and_then(Value::as_array);
    for edge in top_edges.into_iter().flatten() {
        if !edge.get("node").is_some_and(Value::is_object) {
            continue;
        }
        if let Some(name) = first_string(edge, REACTION_NAME) {
            reactions.insert(name, Count::coerce(first_match(edge, REACTION_COUNT)));
        }
    }

    if !reactions.is_empty() {
        return reactions;
    }

    let renderers = node.get("ufi_action_renderers").and_then(Value::as_array);
    for renderer in renderers.into_iter().flatten() {
        let infos = resolve(renderer, &["feedback", "supported_reaction_infos"])
            .and_then(Value::as_array);
        for info in infos.into_iter().flatten() {
            if let Some(name) = first_string(info, SUPPORTED_REACTION_NAME) {
                reactions.insert(name, Count::coerce(first_match(info, REACTION_COUNT)));
            }
        }
    }

    reactions
}

/// Resolve every attachment entry, skipping the ones that are not objects.
fn extract_attachments(node: &Value) -> Vec<AttachmentRecord> {
    let Some(entries) = node.get("attachments").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match resolve_attachment(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("skipping attachment {i}: {e}");
                None
            }
        })
        .collect()
}

fn resolve_attachment(entry: &Value) -> FeedResult<AttachmentRecord> {
    if !entry.is_object() {
        return Err(FeedError::MalformedAttachment(format!(
            "expected object, got {}",
            kind_name(entry)
        )));
    }

    let media = first_match(entry, ATTACHMENT_MEDIA);
    let kind = media.and_then(|m| first_string(m, TYPENAME));
    let id = media.and_then(|m| first_string(m, ID));

    let url = first_string(entry, ATTACHMENT_URL)
        .or_else(|| media.and_then(|m| first_string(m, MEDIA_URL)))
        .or_else(|| match (kind.as_deref(), id.as_deref()) {
            (Some("Photo"), Some(id)) => Some(format!("{PHOTO_PAGE_URL}{id}")),
            _ => None,
        });

    let thumbnail = media
        .and_then(|m| resolve(m, &["thumbnailImage", "uri"]))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(AttachmentRecord {
        kind,
        id,
        url,
        thumbnail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::{json, Number};

    fn norm(node: Value) -> Value {
        serde_json::to_value(normalize_post(&node)).unwrap()
    }

    #[test]
    fn test_empty_node_gets_defaults() {
        assert_json_eq!(
            norm(json!({})),
            json!({
                "id": null,
                "type": "Story",
                "text": "",
                "owner": null,
                "publish_time": null,
                "comment_count": 0,
                "share_count": 0,
                "view_count": 0,
                "reactions": {},
                "attachments": []
            })
        );
    }

    #[test]
    fn test_non_object_node_gets_defaults() {
        assert_eq!(normalize_post(&json!([1, 2, 3])), NormalizedPost::default());
        assert_eq!(normalize_post(&Value::Null), NormalizedPost::default());
    }

    #[test]
    fn test_text_from_ranges() {
        let node = json!({"comet_sections": {"content": {"story": {"message": {
            "ranges": [{"text": "Hello "}, {"text": "World"}]
        }}}}});
        assert_eq!(normalize_post(&node).text, "Hello World");
    }

    #[test]
    fn test_text_prefers_direct_message() {
        assert_eq!(normalize_post(&json!({"message": "plain"})).text, "plain");
        assert_eq!(normalize_post(&json!({"message": {"text": "nested"}})).text, "nested");
        let both = json!({
            "message": {"text": "direct"},
            "comet_sections": {"content": {"story": {"message": {"ranges": [{"text": "ranged"}]}}}}
        });
        assert_eq!(normalize_post(&both).text, "direct");
    }

    #[test]
    fn test_ranges_without_text_contribute_nothing() {
        let node = json!({"comet_sections": {"content": {"story": {"message": {
            "ranges": [{"text": "a"}, {"offset": 3}, "junk", {"text": "b"}]
        }}}}});
        assert_eq!(normalize_post(&node).text, "ab");
    }

    #[test]
    fn test_identity_and_owner() {
        let post = normalize_post(&json!({
            "id": "UzpfSTE=",
            "__typename": "Video",
            "feedback": {"owning_profile": {"name": "NASA"}}
        }));
        assert_eq!(post.id.as_deref(), Some("UzpfSTE="));
        assert_eq!(post.kind, "Video");
        assert_eq!(post.owner.as_deref(), Some("NASA"));

        let via_actors = normalize_post(&json!({"actors": [{"name": "ESA"}]}));
        assert_eq!(via_actors.owner.as_deref(), Some("ESA"));
    }

    #[test]
    fn test_publish_time_candidates() {
        let epoch = |v: Value| normalize_post(&v).publish_time;
        assert_eq!(epoch(json!({"publish_time": 1700000000})), Some(Number::from(1700000000)));
        assert_eq!(epoch(json!({"created_time": 1600000000})), Some(Number::from(1600000000)));
        let meta = json!({"metadata": {"story": {"creation_time": 1500000000}}});
        assert_eq!(epoch(meta), Some(Number::from(1500000000)));
        assert_eq!(epoch(json!({"publish_time": "yesterday"})), None);
    }

    #[test]
    fn test_fractional_publish_time_is_kept() {
        let post = normalize_post(&json!({"publish_time": 1700000000.5}));
        assert_eq!(post.publish_time.as_ref().and_then(Number::as_f64), Some(1700000000.5));
        assert_eq!(serde_json::to_value(&post).unwrap()["publish_time"], json!(1700000000.5));
    }

    #[test]
    fn test_comment_count_paths() {
        let direct = json!({"comment_rendering_instance": {"comments": {"total_count": 12}}});
        assert_eq!(normalize_post(&direct).comment_count, Count::Coerced(12));

        let summary = json!({"comments_count_summary_renderer": {"feedback": {
            "comment_rendering_instance": {"comments": {"total_count": "34"}}
        }}});
        assert_eq!(normalize_post(&summary).comment_count, Count::Coerced(34));

        let comet = json!({"comet_sections": {"content": {"story": {"feedback": {
            "comments_count_summary_renderer": {"feedback": {
                "comment_rendering_instance": {"comments": {"total_count": 56}}
            }}
        }}}}});
        assert_eq!(normalize_post(&comet).comment_count, Count::Coerced(56));

        let feedback = json!({"feedback": {"comment_count": 78}});
        assert_eq!(normalize_post(&feedback).comment_count, Count::Coerced(78));
    }

    #[test]
    fn test_comment_count_passthrough() {
        let node = json!({"comment_rendering_instance": {"comments": {"total_count": "1.2K"}}});
        assert_eq!(normalize_post(&node).comment_count, Count::Raw(json!("1.2K")));
    }

    #[test]
    fn test_share_count_shapes() {
        assert_eq!(normalize_post(&json!({"share_count": {"count": 9}})).share_count, Count::Coerced(9));
        assert_eq!(normalize_post(&json!({"share_count": 4})).share_count, Count::Coerced(4));
        assert_eq!(normalize_post(&json!({"share_count": "15"})).share_count, Count::Coerced(15));
        assert_eq!(normalize_post(&json!({"share_count": {}})).share_count, Count::ZERO);
    }

    #[test]
    fn test_view_count() {
        assert_eq!(normalize_post(&json!({"video_view_count": 1000})).view_count, Number::from(1000));
        assert_eq!(normalize_post(&json!({"view_count": 5})).view_count, Number::from(5));
        assert_eq!(normalize_post(&json!({"view_count": "many"})).view_count, Number::from(0));
    }

    #[test]
    fn test_top_reactions() {
        let node = json!({"feedback": {"top_reactions": {"edges": [
            {"node": {"localized_name": "Like"}, "reaction_count": 5}
        ]}}});
        let out = norm(node);
        assert_json_eq!(out["reactions"], json!({"Like": 5}));
    }

    #[test]
    fn test_top_reactions_under_ufi_renderer() {
        let node = json!({"feedback": {"comet_ufi_summary_and_actions_renderer": {"feedback": {
            "top_reactions": {"edges": [
                {"node": {"localized_name": "Love"}, "i18n_reaction_count": "7"},
                {"node": {"id": "1635855486666999"}, "reaction_count": 2},
                {"reaction_count": 99}
            ]}
        }}}});
        let reactions = normalize_post(&node).reactions;
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions["Love"], Count::Coerced(7));
        assert_eq!(reactions["1635855486666999"], Count::Coerced(2));
    }

    #[test]
    fn test_duplicate_reaction_names_last_wins() {
        let node = json!({"feedback": {"top_reactions": {"edges": [
            {"node": {"localized_name": "Like"}, "reaction_count": 5},
            {"node": {"localized_name": "Like"}, "reaction_count": 8}
        ]}}});
        assert_eq!(normalize_post(&node).reactions["Like"], Count::Coerced(8));
    }

    #[test]
    fn test_supported_reaction_infos_fallback() {
        let node = json!({"ufi_action_renderers": [
            {"feedback": {"supported_reaction_infos": [
                {"id": "1635855486666999", "node": {"localized_name": "Like"}, "reaction_count": 3},
                {"id": "613557422527858"}
            ]}},
            "not a renderer",
            {"feedback": {"supported_reaction_infos": [
                {"node": {"localized_name": "Wow"}, "reaction_count": "2.5K"}
            ]}}
        ]});
        let out = norm(node);
        assert_json_eq!(
            out["reactions"],
            json!({"Like": 3, "613557422527858": 0, "Wow": "2.5K"})
        );
    }

    #[test]
    fn test_attachment_media_and_urls() {
        let node = json!({"attachments": [
            {"media": {"__typename": "Video", "id": "v1", "url": "https://fb/v1",
                       "thumbnailImage": {"uri": "https://cdn/v1.jpg"}}},
            {"styles": {"attachment": {"media": {"__typename": "GenericAttachmentMedia"},
                                       "url": "https://nasa.gov/artemis"}}},
            {"href": "https://example.org/a", "media": {"__typename": "Photo", "id": "p1"}},
            {"media": {"__typename": "Photo", "id": "p2"}},
            {"title": "no media"}
        ]});
        let out = norm(node);
        assert_json_eq!(
            out["attachments"],
            json!([
                {"type": "Video", "id": "v1", "url": "https://fb/v1", "thumbnail": "https://cdn/v1.jpg"},
                {"type": "GenericAttachmentMedia", "id": null, "url": "https://nasa.gov/artemis"},
                {"type": "Photo", "id": "p1", "url": "https://example.org/a"},
                {"type": "Photo", "id": "p2", "url": "https://www.facebook.com/photo.php?fbid=p2"},
                {"type": null, "id": null, "url": null}
            ])
        );
    }

    #[test]
    fn test_malformed_attachments_are_skipped_individually() {
        let node = json!({"attachments": [
            "oops",
            {"media": {"__typename": "Photo", "id": "p1"}, "url": "https://x/1"},
            null
        ]});
        let atts = normalize_post(&node).attachments;
        assert_eq!(atts.len(), 1);
        assert_eq!(atts[0].url.as_deref(), Some("https://x/1"));
    }

    #[test]
    fn test_attachments_not_an_array() {
        assert!(normalize_post(&json!({"attachments": {"media": {}}})).attachments.is_empty());
    }

    #[test]
    fn test_resolve_attachment_error_kind() {
        let err = resolve_attachment(&json!(42)).unwrap_err();
        assert!(matches!(err, FeedError::MalformedAttachment(_)));
        assert!(err.to_string().contains("number"));
    }
}
