//! Converters and model tables
//!
//! A [`Model`] is a named table of field conversions. Its converter replaces
//! the listed fields of a record in place and leaves every other key alone;
//! applied to an array, it converts each element independently.
//!
//! ```rust,ignore
//! use lila_client::formats::NDJSON;
//! use lila_client::http::Request;
//! use lila_client::models::GAME;
//!
//! let request = Request::with_format(NDJSON).stream().converter(GAME.converter());
//! ```

mod convert;

pub use convert::{
    build_adapter, datetime_from_millis, datetime_from_seconds, datetime_from_str,
    datetime_from_str_or_millis, inner, listing, millis_to_datetime, millis_to_timedelta, noop,
    rating_history_entry, str_or_millis_to_datetime, timedelta_from_millis, to_millis, Adapter,
    Converter, FieldConversion,
};

use serde_json::Value;

/// Named table of field conversions
#[derive(Debug, Clone, Copy)]
pub struct Model {
    name: &'static str,
    conversions: &'static [(&'static str, FieldConversion)],
}

impl Model {
    /// Create a model from its conversion table
    pub const fn new(name: &'static str, conversions: &'static [(&'static str, FieldConversion)]) -> Self {
        Self { name, conversions }
    }

    /// Model name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field names this model converts
    pub fn fields(&self) -> impl Iterator<Item = &'static str> {
        self.conversions.iter().map(|(field, _)| *field)
    }

    /// Convert one record, or each record of an array
    pub fn convert(&self, data: Value) -> Value {
        match data {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.convert_one(item)).collect())
            }
            other => self.convert_one(other),
        }
    }

    /// Convert the listed fields present in one record
    pub fn convert_one(&self, data: Value) -> Value {
        match data {
            Value::Object(mut map) => {
                for (field, conversion) in self.conversions {
                    if let Some(value) = map.get_mut(*field) {
                        *value = conversion(value.take());
                    }
                }
                Value::Object(map)
            }
            other => other,
        }
    }

    /// Convert every value of a top-level object keyed by id
    pub fn convert_values(&self, data: Value) -> Value {
        match data {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, self.convert(value)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// This model as a request converter
    pub fn converter(self) -> impl Fn(Value) -> Value + Send + Sync + 'static {
        move |data| self.convert(data)
    }
}

fn activity_interval(value: Value) -> Value {
    inner(value, millis_to_datetime, &["start", "end"])
}

fn broadcast_dates(value: Value) -> Value {
    inner(value, millis_to_datetime, &["startedAt", "startsAt"])
}

fn rating_points(value: Value) -> Value {
    listing(value, rating_history_entry)
}

pub const ACCOUNT: Model = Model::new(
    "Account",
    &[("createdAt", millis_to_datetime), ("seenAt", millis_to_datetime)],
);

pub const USER: Model = Model::new(
    "User",
    &[("createdAt", millis_to_datetime), ("seenAt", millis_to_datetime)],
);

pub const ACTIVITY: Model = Model::new("Activity", &[("interval", activity_interval)]);

pub const GAME: Model = Model::new(
    "Game",
    &[("createdAt", millis_to_datetime), ("lastMoveAt", millis_to_datetime)],
);

pub const GAME_STATE: Model = Model::new(
    "GameState",
    &[
        ("createdAt", millis_to_datetime),
        ("wtime", millis_to_timedelta),
        ("btime", millis_to_timedelta),
        ("winc", millis_to_timedelta),
        ("binc", millis_to_timedelta),
    ],
);

pub const TOURNAMENT: Model = Model::new("Tournament", &[("startsAt", str_or_millis_to_datetime)]);

pub const BROADCAST: Model = Model::new("Broadcast", &[("broadcast", broadcast_dates)]);

pub const RATING_HISTORY: Model = Model::new("RatingHistory", &[("points", rating_points)]);

pub const PUZZLE_ACTIVITY: Model = Model::new("PuzzleActivity", &[("date", millis_to_datetime)]);

pub const OAUTH: Model = Model::new("OAuth", &[("expires", millis_to_datetime)]);

pub const TV: Model = Model::new(
    "TV",
    &[("createdAt", millis_to_datetime), ("lastMoveAt", millis_to_datetime)],
);

#[cfg(test)]
mod tests;
