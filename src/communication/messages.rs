use crate::communication::feed::FeedEvent;
use crate::shared_data::TrafficSnapshot;

/// Turns a raw delivery body into a feed event.
///
/// An empty body or the JSON literal `null` means the feed has no data.
/// Anything that does not decode as a snapshot is reported as a feed error
/// so it degrades connectivity instead of clearing the last good state.
pub fn decode_payload(body: &[u8]) -> FeedEvent {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return FeedEvent::Message(None);
    }
    match serde_json::from_slice::<Option<TrafficSnapshot>>(body) {
        Ok(snapshot) => FeedEvent::Message(snapshot),
        Err(e) => FeedEvent::Error(format!("undecodable traffic payload: {}", e)),
    }
}

/// Wire form of a snapshot (or of "no data" when `None`).
pub fn encode_payload(snapshot: Option<&TrafficSnapshot>) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lane::LaneId;

    #[test]
    fn null_and_empty_bodies_mean_no_data() {
        assert_eq!(decode_payload(b""), FeedEvent::Message(None));
        assert_eq!(decode_payload(b"  \n"), FeedEvent::Message(None));
        assert_eq!(decode_payload(b"null"), FeedEvent::Message(None));
    }

    #[test]
    fn object_body_is_a_snapshot() {
        let event = decode_payload(
            br#"{"vehicle_count": 5, "emergency_lane": [2],
                 "lane_vehicle_counts": {"1": 2, "2": 3, "3": 0, "4": 0}}"#,
        );
        match event {
            FeedEvent::Message(Some(snapshot)) => {
                assert_eq!(snapshot.vehicle_count, 5);
                assert!(snapshot.is_emergency(LaneId::EAST));
                assert_eq!(snapshot.count_for(LaneId::EAST), 3);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn null_fields_inside_an_object_are_still_a_snapshot() {
        let event = decode_payload(
            br#"{"vehicle_count": 1, "emergency_lane": null,
                 "lane_vehicle_counts": {"1": 1, "2": null}}"#,
        );
        match event {
            FeedEvent::Message(Some(snapshot)) => {
                assert!(snapshot.emergency_lane.is_empty());
                assert_eq!(snapshot.count_for(LaneId::NORTH), 1);
                assert_eq!(snapshot.count_for(LaneId::EAST), 0);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn garbage_is_a_feed_error() {
        assert!(matches!(decode_payload(b"{not json"), FeedEvent::Error(_)));
        assert!(matches!(
            decode_payload(br#"{"lane_vehicle_counts": "lots"}"#),
            FeedEvent::Error(_)
        ));
    }

    #[test]
    fn encoded_none_decodes_as_no_data() {
        let body = encode_payload(None).unwrap();
        assert_eq!(body, b"null");
        assert_eq!(decode_payload(&body), FeedEvent::Message(None));
    }
}
