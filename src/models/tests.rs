//! Tests for converters and model tables

use super::*;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Model Tests
// ============================================================================

fn to_int(value: Value) -> Value {
    value
        .as_str()
        .and_then(|s| s.parse::<i64>().ok())
        .map_or(value.clone(), Value::from)
}

const EXAMPLE: Model = Model::new("Example", &[("foo", to_int)]);

#[test]
fn test_conversion_only_touches_listed_fields() {
    let record = json!({"foo": "5", "bar": 3, "baz": "4"});
    assert_eq!(EXAMPLE.convert(record), json!({"foo": 5, "bar": 3, "baz": "4"}));
}

#[test]
fn test_missing_keys_left_unchanged() {
    let record = json!({"id": "abc", "rated": true});
    assert_eq!(GAME.convert(record.clone()), record);
}

#[test]
fn test_convert_list_converts_each_record() {
    let records = json!([
        {"id": "a", "createdAt": 0},
        {"id": "b"},
        {"id": "c", "lastMoveAt": 1_000}
    ]);
    let converted = GAME.convert(records);
    assert_eq!(
        converted,
        json!([
            {"id": "a", "createdAt": "1970-01-01T00:00:00.000Z"},
            {"id": "b"},
            {"id": "c", "lastMoveAt": "1970-01-01T00:00:01.000Z"}
        ])
    );
}

#[test]
fn test_convert_values_keyed_by_id() {
    let data = json!({
        "thibault": {"createdAt": 1_290_415_680_000_i64},
        "bobby": {"seenAt": 0}
    });
    let converted = USER.convert_values(data);
    assert_eq!(converted["thibault"]["createdAt"], "2010-11-22T08:48:00.000Z");
    assert_eq!(converted["bobby"]["seenAt"], "1970-01-01T00:00:00.000Z");
}

#[test]
fn test_nested_conversion() {
    let activity = json!({"interval": {"start": 0, "end": 86_400_000}, "games": {}});
    let converted = ACTIVITY.convert(activity);
    assert_eq!(converted["interval"]["start"], "1970-01-01T00:00:00.000Z");
    assert_eq!(converted["interval"]["end"], "1970-01-02T00:00:00.000Z");
    assert_eq!(converted["games"], json!({}));
}

#[test]
fn test_broadcast_nested_missing_key() {
    let data = json!({"broadcast": {"id": "WxOb8OUT", "startsAt": 0}});
    let converted = BROADCAST.convert(data);
    assert_eq!(
        converted,
        json!({"broadcast": {"id": "WxOb8OUT", "startsAt": "1970-01-01T00:00:00.000Z"}})
    );
}

#[test]
fn test_game_state_clock_fields() {
    let state = json!({"type": "gameState", "wtime": 180_000, "binc": 2_000});
    let converted = GAME_STATE.convert(state);
    assert_eq!(converted["wtime"], "PT180S");
    assert_eq!(converted["binc"], "PT2S");
    assert_eq!(converted["type"], "gameState");
}

#[test]
fn test_rating_history_points() {
    let history = json!({"name": "Blitz", "points": [[2011, 0, 8, 1472], [2011, 0, 10, 1492]]});
    let converted = RATING_HISTORY.convert(history);
    assert_eq!(
        converted["points"],
        json!([
            {"year": 2011, "month": 0, "day": 8, "rating": 1472},
            {"year": 2011, "month": 0, "day": 10, "rating": 1492}
        ])
    );
}

#[test]
fn test_tournament_starts_at_string_or_millis() {
    let from_str = TOURNAMENT.convert(json!({"startsAt": "2023-05-01T18:00:00.000Z"}));
    let from_millis = TOURNAMENT.convert(json!({"startsAt": 1_682_964_000_000_i64}));
    assert_eq!(from_str, from_millis);
    assert_eq!(from_str["startsAt"], "2023-05-01T18:00:00.000Z");
}

#[test]
fn test_unexpected_shape_left_unchanged() {
    let record = json!({"createdAt": "yesterday", "seenAt": null});
    assert_eq!(ACCOUNT.convert(record.clone()), record);
}

#[test]
fn test_model_converter_closure() {
    let convert = OAUTH.converter();
    let token = convert(json!({"expires": 0, "userId": "bobby"}));
    assert_eq!(token["expires"], "1970-01-01T00:00:00.000Z");
    assert_eq!(OAUTH.name(), "OAuth");
    assert_eq!(TV.fields().collect::<Vec<_>>(), vec!["createdAt", "lastMoveAt"]);
}

// ============================================================================
// Time Helper Tests
// ============================================================================

#[test]
fn test_to_millis_round_trip() {
    let dt = Utc.with_ymd_and_hms(2020, 3, 14, 15, 9, 26).unwrap();
    let millis = to_millis(dt);
    assert_eq!(millis, 1_584_198_566_000);
    assert_eq!(datetime_from_millis(millis as f64), Some(dt));
}

#[test]
fn test_datetime_from_seconds_fractional() {
    let dt = datetime_from_seconds(1.5).unwrap();
    assert_eq!(dt.timestamp_millis(), 1_500);
    assert!(datetime_from_seconds(f64::NAN).is_none());
}

#[test]
fn test_datetime_from_str() {
    let dt = datetime_from_str("2018-09-12T20:40:51.543Z").unwrap();
    assert_eq!(to_millis(dt), 1_536_784_851_543);
    assert!(datetime_from_str("12/09/2018").is_err());
}

#[test]
fn test_datetime_from_str_or_millis() {
    let a = datetime_from_str_or_millis(&json!(1_536_784_851_543_i64)).unwrap();
    let b = datetime_from_str_or_millis(&json!("2018-09-12T20:40:51.543Z")).unwrap();
    assert_eq!(a, b);
    assert!(datetime_from_str_or_millis(&json!(true)).is_err());
}

#[test]
fn test_timedelta_from_millis_matches_datetime_difference() {
    let dt1 = datetime_from_millis(1000.0).unwrap();
    let dt2 = datetime_from_millis(2000.0).unwrap();
    assert_eq!(timedelta_from_millis(1000.0), dt2 - dt1);
}

#[test]
fn test_noop() {
    assert_eq!(noop(json!({"a": 1})), json!({"a": 1}));
}

// ============================================================================
// Adapter Tests
// ============================================================================

fn broadcast_adapter() -> Adapter {
    build_adapter(
        &[
            ("broadcast_id", "broadcast.id"),
            ("slug", "broadcast.slug"),
            ("name", "broadcast.name"),
            ("syncUrl", "broadcast.sync.url"),
            ("ownerName", "broadcast.owner.name"),
        ],
        ".",
    )
}

fn broadcast() -> Value {
    json!({
        "broadcast": {
            "id": "WxOb8OUT",
            "slug": "test-tourney",
            "name": "Test Tourney",
            "ownerId": "rhgrant10",
            "sync": {"ongoing": false, "log": [], "url": null}
        },
        "url": "https://lichess.org/broadcast/test-tourney/WxOb8OUT"
    })
}

#[test]
fn test_adapter_skips_missing_locations() {
    let adapted = broadcast_adapter().adapt(&broadcast());
    assert_eq!(
        adapted,
        json!({
            "broadcast_id": "WxOb8OUT",
            "slug": "test-tourney",
            "name": "Test Tourney",
            "syncUrl": null
        })
    );
}

#[test]
fn test_adapter_fills_missing_locations() {
    let adapted = broadcast_adapter().adapt_with(&broadcast(), Some(&json!("n/a")));
    assert_eq!(adapted["ownerName"], "n/a");
    assert_eq!(adapted["syncUrl"], Value::Null);
}
