//! Envelope of the event notifications pushed by the platform.
//!
//! Only the envelope is modeled. The `value` of each change is kept as an opaque JSON value whose
//! shape depends on the `field` of the change (`messages`, `message_template_status_update`, ...).

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// `object` value of notifications sent for a WhatsApp Business Account.
pub const WHATSAPP_BUSINESS_ACCOUNT: &str = "whatsapp_business_account";

/// Missing fields take their default values, so any JSON object (or array) deserializes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventNotification {
    pub object: String,
    pub entry: Vec<Entry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// ID of the WhatsApp Business Account the changes belong to.
    ///
    /// Numeric IDs are converted to their decimal representation.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub changes: Vec<Change>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Change {
    pub field: String,
    pub value: serde_json::Value,
}

impl EventNotification {
    /// Iterates over the changes of every entry, in order.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.entry.iter().flat_map(|entry| entry.changes.iter())
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    struct Visitor;

    impl<'de> de::Visitor<'de> for Visitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    d.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message() {
        let json = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102290129340398",
                "changes": [{
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "15550783881",
                            "phone_number_id": "106540352242922"
                        },
                        "messages": [{
                            "from": "16505551234",
                            "id": "wamid.HBgLMTY1MDM4Nzk0MzkVAgASGBQzQTRBNjU5OUFFRTAzODEwMTQ0RgA=",
                            "timestamp": "1749416383",
                            "type": "text",
                            "text": { "body": "Does it come in another color?" }
                        }]
                    },
                    "field": "messages"
                }]
            }]
        }"#;
        let notification: EventNotification = serde_json::from_str(json).unwrap();

        assert_eq!(notification.object, WHATSAPP_BUSINESS_ACCOUNT);
        assert_eq!(notification.entry[0].id, "102290129340398");
        let changes: Vec<_> = notification.changes().collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "messages");
        assert_eq!(
            changes[0].value["messages"][0]["text"]["body"],
            "Does it come in another color?"
        );
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let notification: EventNotification =
            serde_json::from_str(r#"{"object":"page","entry":[{"id":"1"}]}"#).unwrap();
        assert!(notification.entry[0].changes.is_empty());
        assert_eq!(notification.changes().count(), 0);
    }

    #[test]
    fn lenient_envelope() {
        let json = r#"{
            "entry": [
                {"id": 102290129340398, "changes": [{"field": "messages"}]},
                {"id": null},
                {"changes": [{"value": {"statuses": []}, "extra": true}]}
            ],
            "unknown": 1
        }"#;
        let notification: EventNotification = serde_json::from_str(json).unwrap();

        assert_eq!(notification.object, "");
        assert_eq!(notification.entry[0].id, "102290129340398");
        assert_eq!(notification.entry[0].changes[0].field, "messages");
        assert_eq!(notification.entry[0].changes[0].value, serde_json::Value::Null);
        assert_eq!(notification.entry[1].id, "");
        assert_eq!(notification.entry[2].id, "");
        assert_eq!(notification.entry[2].changes[0].field, "");
        assert_eq!(
            notification.entry[2].changes[0].value,
            serde_json::json!({ "statuses": [] })
        );

        let notification: EventNotification = serde_json::from_str("{}").unwrap();
        assert_eq!(notification, EventNotification::default());
        let notification: EventNotification = serde_json::from_str("[]").unwrap();
        assert_eq!(notification, EventNotification::default());
    }

    #[test]
    fn invalid_id() {
        let json = r#"{"entry":[{"id":{"nested":true}}]}"#;
        assert!(serde_json::from_str::<EventNotification>(json).is_err());
    }
}
