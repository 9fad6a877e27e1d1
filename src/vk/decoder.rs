//! Long-poll update decoding.
//!
//! Updates arrive as positional JSON arrays whose first element is the
//! event code. Only code 4 (new message) is interpreted:
//!
//! | index | field                                   |
//! |-------|-----------------------------------------|
//! | 0     | event code (4)                          |
//! | 1     | message ID                              |
//! | 2     | flags (unused)                          |
//! | 3     | peer ID                                 |
//! | 4     | timestamp (unused)                      |
//! | 5     | text                                    |
//! | 6     | extra fields, `from` = author user ID   |
//! | 7     | attachments (`attachN` / `attachN_type`)|
//!
//! Anything that does not fit this shape decodes to [`InboundEvent::Ignored`].

use serde_json::Value;

use crate::vk::attachments::AttachmentMap;

/// Event code for a new message.
pub const EVENT_MESSAGE_NEW: i64 = 4;

/// Result of decoding one update record.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    MessageNew(NewMessage),
    Ignored,
}

/// A new chat message authored by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub message_id: i64,
    pub peer_id: i64,
    pub sender_id: String,
    pub text: String,
    pub attachments: AttachmentMap,
}

/// Decode a single update record.
pub fn decode(update: &Value) -> InboundEvent {
    decode_message_new(update)
        .map(InboundEvent::MessageNew)
        .unwrap_or(InboundEvent::Ignored)
}

fn decode_message_new(update: &Value) -> Option<NewMessage> {
    let fields = update.as_array()?;

    if as_int(fields.first()?)? != EVENT_MESSAGE_NEW {
        return None;
    }

    let message_id = as_int(fields.get(1)?)?;
    let peer_id = as_int(fields.get(3)?)?;
    let text = fields.get(5)?.as_str()?;

    // No `from` means the message belongs to the conversation itself
    let sender_id = match fields.get(6)?.as_object()?.get("from")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let attachments = match fields.get(7) {
        None => AttachmentMap::default(),
        Some(Value::Object(map)) => AttachmentMap::new(map.clone()),
        Some(_) => return None,
    };

    Some(NewMessage {
        message_id,
        peer_id,
        sender_id,
        text: unescape_text(text),
        attachments,
    })
}

/// Integer view of a JSON number, accepting integral floats.
fn as_int(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Long-poll text is HTML-escaped with `<br>` for line breaks.
fn unescape_text(text: &str) -> String {
    text.replace("<br>", "\n")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_new_message() {
        let update = json!([4, 100, 0, 2000000123, 0, "hello", {"from": "55"}, {}]);

        match decode(&update) {
            InboundEvent::MessageNew(msg) => {
                assert_eq!(msg.message_id, 100);
                assert_eq!(msg.peer_id, 2000000123);
                assert_eq!(msg.sender_id, "55");
                assert_eq!(msg.text, "hello");
                assert_eq!(msg.attachments.count(), 0);
            }
            InboundEvent::Ignored => panic!("expected MessageNew"),
        }
    }

    #[test]
    fn test_other_event_codes_ignored() {
        for code in [0, 1, 2, 3, 5, 6, 7, 8, 9, 51, 61, 80, 114] {
            let update = json!([code, 100, 0, 2000000123, 0, "hello", {"from": "55"}, {}]);
            assert_eq!(decode(&update), InboundEvent::Ignored, "code {}", code);
        }
    }

    #[test]
    fn test_missing_from_ignored() {
        let update = json!([4, 100, 0, 2000000123, 0, "chat renamed", {"source_act": "chat_title_update"}, {}]);
        assert_eq!(decode(&update), InboundEvent::Ignored);
    }

    #[test]
    fn test_numeric_from_accepted() {
        let update = json!([4, 100, 0, 2000000123, 0, "hi", {"from": 55}, {}]);
        match decode(&update) {
            InboundEvent::MessageNew(msg) => assert_eq!(msg.sender_id, "55"),
            InboundEvent::Ignored => panic!("expected MessageNew"),
        }
    }

    #[test]
    fn test_float_encoded_numbers_accepted() {
        let update = json!([4.0, 100.0, 0, 2000000123.0, 0, "hi", {"from": "55"}, {}]);
        assert!(matches!(decode(&update), InboundEvent::MessageNew(_)));
    }

    #[test]
    fn test_malformed_records_ignored() {
        let cases = [
            json!(null),
            json!({}),
            json!([]),
            json!(["4"]),
            json!([4]),
            json!([4, "100", 0, 2000000123, 0, "hi", {"from": "55"}, {}]),
            json!([4, 100, 0, 2000000123, 0, 42, {"from": "55"}, {}]),
            json!([4, 100, 0, 2000000123, 0, "hi", [], {}]),
            json!([4, 100, 0, 2000000123, 0, "hi", {"from": "55"}, "oops"]),
            json!([4, 100, 0, 2000000123, 0, "hi", {"from": true}, {}]),
        ];

        for case in cases {
            assert_eq!(decode(&case), InboundEvent::Ignored, "case {}", case);
        }
    }

    #[test]
    fn test_missing_attachment_map_is_empty() {
        let update = json!([4, 100, 0, 2000000123, 0, "hi", {"from": "55"}]);
        match decode(&update) {
            InboundEvent::MessageNew(msg) => assert_eq!(msg.attachments.count(), 0),
            InboundEvent::Ignored => panic!("expected MessageNew"),
        }
    }

    #[test]
    fn test_text_unescaped() {
        let update = json!([4, 1, 0, 2000000001, 0, "a &lt;b&gt;<br>&quot;c&quot; &amp; d", {"from": "5"}, {}]);
        match decode(&update) {
            InboundEvent::MessageNew(msg) => assert_eq!(msg.text, "a <b>\n\"c\" & d"),
            InboundEvent::Ignored => panic!("expected MessageNew"),
        }
    }
}
