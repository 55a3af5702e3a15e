//! End-to-end scenarios 1-6 (SPEC_FULL.md §8), built through the public
//! request/stream API.

use icon_rpc_core::goloop;
use icon_rpc_core::identity::{Identity, IdentityOptions};
use icon_rpc_core::request::{sign, verify};
use icon_rpc_core::stream::{new_block_stream, Filter, StreamOptions};
use icon_rpc_core::value::Value;

fn key_from_hex(hex_str: &str) -> [u8; 32] {
    let bytes = hex::decode(hex_str).unwrap();
    bytes.try_into().unwrap()
}

#[test]
fn scenario_1_get_block_by_height_serializes_hex() {
    let identity = Identity::anonymous();
    let request = goloop::get_block_by_height(&identity, 42).unwrap();
    assert_eq!(request.method, "icx_getBlockByHeight");
    let params = request.params.as_map().unwrap();
    assert_eq!(params.get("height"), Some(&Value::Str("0x2a".to_string())));
}

#[test]
fn scenario_2_get_balance() {
    let identity = Identity::anonymous();
    let request = goloop::get_balance(&identity, Some("hxbe258ceb872e08851f1f59694dac2558708ece11")).unwrap();
    assert_eq!(request.method, "icx_getBalance");
    let params = request.params.as_map().unwrap();
    assert_eq!(
        params.get("address"),
        Some(&Value::Str("hxbe258ceb872e08851f1f59694dac2558708ece11".to_string()))
    );
}

#[test]
fn scenario_3_transfer_sign_and_verify() {
    let key = key_from_hex("8ad9889bcee734a2605a6c4c50dd8acd28f54e62b828b2c8991aa46bd32976bf");
    let identity = Identity::new(IdentityOptions {
        private_key: Some(key),
        ..Default::default()
    })
    .unwrap();

    let mut request = goloop::transfer(&identity, "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32", 42, None).unwrap();
    let params = request.params.as_map().unwrap();
    assert_eq!(params.get("from"), Some(&Value::Str("hxfd7e4560ba363f5aabd32caac7317feeee70ea57".to_string())));
    assert_eq!(params.get("nid"), Some(&Value::Str("0x1".to_string())));
    assert_eq!(params.get("value"), Some(&Value::Str("0x2a".to_string())));

    sign(&mut request, &identity).unwrap();
    assert!(verify(&request).unwrap());
}

/// Regression: two identities building the same shaped request in one
/// process must each get their own `from`, never one leaking into the
/// other via the process-wide schema cache (content-hash keyed, so a
/// `transfer` built for B after one built for A hits the same cached
/// `Type`).
#[test]
fn scenario_3b_distinct_identities_never_share_from() {
    let key_a = key_from_hex("8ad9889bcee734a2605a6c4c50dd8acd28f54e62b828b2c8991aa46bd32976bf");
    let identity_a = Identity::new(IdentityOptions {
        private_key: Some(key_a),
        ..Default::default()
    })
    .unwrap();

    let key_b = key_from_hex("2222222222222222222222222222222222222222222222222222222222222222");
    let identity_b = Identity::new(IdentityOptions {
        private_key: Some(key_b),
        ..Default::default()
    })
    .unwrap();

    let request_a = goloop::transfer(&identity_a, "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32", 1, None).unwrap();
    let request_b = goloop::transfer(&identity_b, "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32", 1, None).unwrap();

    let from_a = request_a.params.as_map().unwrap().get("from").cloned().unwrap();
    let from_b = request_b.params.as_map().unwrap().get("from").cloned().unwrap();

    assert_ne!(from_a, from_b);
    assert_eq!(from_a, Value::Str(identity_a.address().unwrap().to_string()));
    assert_eq!(from_b, Value::Str(identity_b.address().unwrap().to_string()));
}

#[test]
fn scenario_4_send_message_hex_encodes_text() {
    let identity = Identity::anonymous();
    let request = goloop::send_message(&identity, "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32", "ICON 2.0", None);
    // No wallet: Invalid identity, matching the failure condition in §4.4 —
    // but the `data` encoding itself is independently exercised in
    // `BinaryData::dump_text`'s own test (scalars::binary). Here we confirm
    // the same encoding reaches the transaction once a wallet is present.
    assert!(request.is_err());

    let key = key_from_hex("8ad9889bcee734a2605a6c4c50dd8acd28f54e62b828b2c8991aa46bd32976bf");
    let identity = Identity::new(IdentityOptions {
        private_key: Some(key),
        ..Default::default()
    })
    .unwrap();
    let request = goloop::send_message(&identity, "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32", "ICON 2.0", None).unwrap();
    let params = request.params.as_map().unwrap();
    assert_eq!(params.get("data"), Some(&Value::Str("0x49434f4e20322e30".to_string())));
}

#[test]
fn scenario_5_timeout_selects_and_wait_variant() {
    let key = key_from_hex("8ad9889bcee734a2605a6c4c50dd8acd28f54e62b828b2c8991aa46bd32976bf");
    let identity = Identity::new(IdentityOptions {
        private_key: Some(key),
        ..Default::default()
    })
    .unwrap();

    let request = goloop::transfer(&identity, "cxb0776ee37f5b45bfaea8cff1d8232fbb6122ec32", 42, Some(5000)).unwrap();
    assert_eq!(request.method, "icx_sendTransactionAndWait");
    assert!(request.is_and_wait());
    assert_eq!(request.options.timeout, Some(5000));
}

#[tokio::test]
async fn scenario_6_block_stream_merges_two_filters() {
    let stream = new_block_stream(
        vec![Filter::new("A(int)"), Filter::new("B(int)")],
        StreamOptions::default(),
        None,
    )
    .await
    .unwrap();

    fn hex(i: i128) -> Value {
        Value::Str(format!("0x{i:x}"))
    }
    let raw = icon_rpc_core::value::map([
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
    let popped = stream.pop(10).await;
    assert_eq!(popped.len(), 1);
    assert_eq!(popped[0].height, 1100);
    assert_eq!(popped[0].events.get(&1), Some(&vec![1, 2]));
    assert_eq!(popped[0].events.get(&2), Some(&vec![1, 2]));
    assert_eq!(popped[0].events.get(&3), Some(&vec![4]));
}
