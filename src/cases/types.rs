use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One message on a case, as returned by the messages endpoint.
///
/// Both fields are read leniently: a sender that is not a non-empty string, or
/// a timestamp that is neither a number, a numeric string nor an RFC 3339 date,
/// comes through as `None` instead of failing the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correspondence {
    #[serde(default, deserialize_with = "lenient_address")]
    pub from_address: Option<String>,
    /// Milliseconds since epoch
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<i64>,
}

impl Correspondence {
    pub fn new(from_address: &str, created_at: i64) -> Self {
        Self {
            from_address: Some(from_address.to_string()),
            created_at: Some(created_at),
        }
    }
}

fn lenient_address<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => parse_timestamp(s.trim()),
        _ => None,
    })
}

/// Epoch milliseconds from a numeric string or an ISO 8601 date
/// (`2024-05-01T10:00:00Z`, offsets honoured, no offset read as UTC)
fn parse_timestamp(s: &str) -> Option<i64> {
    if let Ok(millis) = s.parse::<i64>() {
        return Some(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// A run of consecutive messages from one queue, collapsed to a single visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferFlowEntry {
    pub queue_id: String,
    pub label: String,
}

/// Queue visits for a case, oldest first. Adjacent entries never share a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransferFlow {
    entries: Vec<TransferFlowEntry>,
}

impl TransferFlow {
    /// Append a visit unless the queue is the one the flow already ends on
    pub(crate) fn push_collapsed(&mut self, queue_id: &str, label: &str) {
        if self.current().is_some_and(|last| last.queue_id == queue_id) {
            return;
        }
        self.entries.push(TransferFlowEntry {
            queue_id: queue_id.to_string(),
            label: label.to_string(),
        });
    }

    pub fn entries(&self) -> &[TransferFlowEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransferFlowEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand-offs between visits, not the number of visits
    pub fn transfer_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// The queue currently holding the case
    pub fn current(&self) -> Option<&TransferFlowEntry> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a TransferFlow {
    type Item = &'a TransferFlowEntry;
    type IntoIter = std::slice::Iter<'a, TransferFlowEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_shape() {
        let c: Correspondence = serde_json::from_str(
            r#"{"fromAddress":"q@example.com","createdAt":1700000000000,"body":"hi"}"#,
        )
        .unwrap();
        assert_eq!(c, Correspondence::new("q@example.com", 1_700_000_000_000));
    }

    #[test]
    fn test_deserialize_lenient_fields() {
        let c: Correspondence =
            serde_json::from_str(r#"{"fromAddress":42,"createdAt":"1700"}"#).unwrap();
        assert_eq!(c.from_address, None);
        assert_eq!(c.created_at, Some(1700));

        let c: Correspondence =
            serde_json::from_str(r#"{"fromAddress":"  ","createdAt":12.0}"#).unwrap();
        assert_eq!(c.from_address, None);
        assert_eq!(c.created_at, Some(12));

        let c: Correspondence = serde_json::from_str(r#"{"createdAt":null}"#).unwrap();
        assert_eq!(c, Correspondence::default());
    }

    #[test]
    fn test_deserialize_iso_timestamps() {
        let utc: Correspondence =
            serde_json::from_str(r#"{"createdAt":"2024-05-01T10:00:00Z"}"#).unwrap();
        assert_eq!(utc.created_at, Some(1_714_557_600_000));

        let offset: Correspondence =
            serde_json::from_str(r#"{"createdAt":"2024-05-01T12:00:00.000+02:00"}"#).unwrap();
        assert_eq!(offset.created_at, utc.created_at);

        let naive: Correspondence =
            serde_json::from_str(r#"{"createdAt":"2024-05-01T10:00:00.250"}"#).unwrap();
        assert_eq!(naive.created_at, Some(1_714_557_600_250));

        let garbage: Correspondence =
            serde_json::from_str(r#"{"createdAt":"yesterday"}"#).unwrap();
        assert_eq!(garbage.created_at, None);
    }

    #[test]
    fn test_push_collapsed() {
        let mut flow = TransferFlow::default();
        assert_eq!(flow.transfer_count(), 0);
        flow.push_collapsed("a", "A");
        flow.push_collapsed("a", "A");
        assert_eq!(flow.len(), 1);
        assert_eq!(flow.transfer_count(), 0);
        flow.push_collapsed("b", "B");
        flow.push_collapsed("a", "A");
        assert_eq!(flow.transfer_count(), 2);
        assert_eq!(flow.current().map(|e| e.label.as_str()), Some("A"));
    }
}
