//! The websocket stream agent (SPEC_FULL.md §4.5): a stateful subscription
//! buffer with back-pressure, tail-deduplication, and a monotonic height
//! cursor, implemented as a single-owner actor (§9 design note).

mod actor;
mod decode;
mod filter;
mod handle;

pub use actor::StreamKind;
pub use decode::Tick;
pub use filter::Filter;
pub use handle::{drive, new_block_stream, new_event_stream, FromHeight, StreamHandle, StreamOptions};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockHttpTransport, MockWebsocketTransport};
    use crate::value::{map, Value};

    fn hex(i: i128) -> Value {
        Value::Str(format!("0x{i:x}"))
    }

    #[tokio::test]
    async fn past_height_needs_no_transport() {
        let stream = new_block_stream(
            vec![Filter::new("Transfer(Address,Address,int)")],
            StreamOptions {
                from_height: FromHeight::Height(10),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(stream.kind().await, StreamKind::Past);
        assert!(stream.encode().await.unwrap().contains("\"height\":\"0xa\""));
    }

    #[tokio::test]
    async fn latest_height_resolves_through_transport() {
        let mock = MockHttpTransport::new(vec![Ok(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"height": "0x64"}
        }))]);
        let stream = new_block_stream(
            vec![],
            StreamOptions {
                from_height: FromHeight::Latest,
                ..Default::default()
            },
            Some(&mock),
        )
        .await
        .unwrap();
        assert_eq!(stream.kind().await, StreamKind::Latest);
        assert!(stream.encode().await.unwrap().contains("\"height\":\"0x64\""));
    }

    #[tokio::test]
    async fn rejects_filter_missing_event() {
        let err = new_block_stream(
            vec![Filter::new("")],
            StreamOptions::default(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::FilterMissingEvent));
    }

    #[tokio::test]
    async fn put_tail_deduplicates_and_pop_advances_height() {
        let stream = new_event_stream(None, StreamOptions::default(), None).await.unwrap();

        let tick = map([
            ("height".to_string(), hex(10)),
            ("hash".to_string(), Value::Str("0xabc".into())),
            ("index".to_string(), hex(1)),
            ("events".to_string(), Value::List(vec![hex(0)])),
        ]);

        stream.put(vec![tick.clone(), tick.clone()]).await.unwrap();
        let popped = stream.pop(10).await;
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].height, 10);

        // Height advances to last popped tick's height + 1.
        assert!(stream.encode().await.unwrap().contains("\"height\":\"0xb\""));
    }

    #[tokio::test]
    async fn back_pressure_reaches_zero_at_capacity() {
        let stream = new_event_stream(
            None,
            StreamOptions {
                max_buffer_size: 1,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(stream.check_space_left().await, 1.0);
        let tick = map([
            ("height".to_string(), hex(1)),
            ("index".to_string(), hex(0)),
            ("events".to_string(), Value::List(vec![])),
        ]);
        stream.put(vec![tick]).await.unwrap();
        assert!(stream.is_full().await);
        assert_eq!(stream.check_space_left().await, 0.0);
    }

    #[tokio::test]
    async fn decodes_block_form_scenario() {
        let stream = new_block_stream(
            vec![Filter::new("A(int)"), Filter::new("B(int)")],
            StreamOptions::default(),
            None,
        )
        .await
        .unwrap();

        let raw = map([
            ("height".to_string(), hex(0x44c)),
            (
                "indexes".to_string(),
                Value::List(vec![
                    Value::List(vec![hex(1)]),
                    Value::List(vec![hex(2), hex(3)]),
                ]),
            ),
            (
                "events".to_string(),
                Value::List(vec![
                    Value::List(vec![Value::List(vec![hex(1), hex(2)])]),
                    Value::List(vec![
                        Value::List(vec![hex(1), hex(2)]),
                        Value::List(vec![hex(4)]),
                    ]),
                ]),
            ),
        ]);

        stream.put(vec![raw]).await.unwrap();
        let popped = stream.pop(1).await;
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].height, 1100);
        assert_eq!(popped[0].events.get(&1), Some(&vec![1, 2]));
        assert_eq!(popped[0].events.get(&2), Some(&vec![1, 2]));
        assert_eq!(popped[0].events.get(&3), Some(&vec![4]));
    }

    #[tokio::test]
    async fn drive_feeds_inbound_frames_through_to_pop() {
        let stream = new_block_stream(vec![Filter::new("A(int)")], StreamOptions::default(), None)
            .await
            .unwrap();

        let frame = serde_json::json!({
            "height": "0x1",
            "indexes": [[]],
            "events": [[]],
        })
        .to_string();
        let mut transport = MockWebsocketTransport::new(vec![frame]);

        drive(&stream, &mut transport).await.unwrap();

        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        let popped = stream.pop(1).await;
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].height, 1);
    }
}
