//! Save-data codec — snapshot to/from versioned JSON text.
//!
//! Currency amounts outgrow a JavaScript-safe integer within minutes of
//! play, so they are written as tagged strings: decimal digits followed
//! by the `n` sentinel (`"123456789012345678901n"`). Decode also accepts
//! the untagged legacy forms: a bare digit string or a JSON number.
//!
//! Saves written by the browser client are accepted too: camelCase keys
//! (`stardust`, `credits`, `totalClicks`, ...) wrapped in a
//! `{"state": {...}, "version": 0}` envelope.
//!
//! RULE: Cached yield rates are never read from storage. They are
//! re-derived from upgrades and prestige after every decode.

use crate::{
    catalog::{self, CostType},
    error::{GameError, GameResult},
    snapshot::{GameSnapshot, UpgradeState},
    types::{Quantity, TimestampMs},
};
use num_traits::ToPrimitive;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Current save format version.
/// Bump when a field changes meaning; adding optional fields does not.
pub const SAVE_VERSION: u32 = 1;

/// Suffix marking a string as an arbitrary-precision integer.
pub const BIGINT_SENTINEL: char = 'n';

/// Largest integer a JSON float carries without loss (2^53).
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// An arbitrary-precision integer in its tagged text form.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TaggedQuantity(Quantity);

impl Serialize for TaggedQuantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}{}", self.0, BIGINT_SENTINEL))
    }
}

impl<'de> Deserialize<'de> for TaggedQuantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TaggedQuantityVisitor)
    }
}

struct TaggedQuantityVisitor;

impl<'de> de::Visitor<'de> for TaggedQuantityVisitor {
    type Value = TaggedQuantity;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer, optionally as a digit string ending in 'n'")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TaggedQuantity(Quantity::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(|v| TaggedQuantity(Quantity::from(v)))
            .map_err(|_| E::custom(format!("negative quantity {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= MAX_EXACT_FLOAT {
            Ok(TaggedQuantity(Quantity::from(v as u64)))
        } else {
            Err(E::custom(format!("quantity {v} is not an exact non-negative integer")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_tagged(v).map(TaggedQuantity).map_err(E::custom)
    }
}

/// Parse `"123n"` or legacy `"123"` into a quantity.
pub fn parse_tagged(text: &str) -> Result<Quantity, String> {
    let digits = text.strip_suffix(BIGINT_SENTINEL).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{text}' is not a tagged integer"));
    }
    Quantity::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| format!("'{text}' is not a tagged integer"))
}

/// Render a quantity in its tagged form.
pub fn tag(quantity: &Quantity) -> String {
    format!("{quantity}{BIGINT_SENTINEL}")
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<TaggedQuantity>::deserialize(d)?
        .map(|q| {
            q.0.to_u64()
                .ok_or_else(|| <D::Error as de::Error>::custom(format!("{} overflows a 64-bit counter", q.0)))
        })
        .transpose()
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Option::<TaggedQuantity>::deserialize(d)?
        .map(|q| {
            q.0.to_u32()
                .ok_or_else(|| <D::Error as de::Error>::custom(format!("{} overflows a 32-bit level", q.0)))
        })
        .transpose()
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedUpgrade {
    #[serde(deserialize_with = "lenient_level")]
    level: u32,
    #[serde(default, alias = "costType", skip_serializing_if = "Option::is_none")]
    cost_type: Option<CostType>,
}

fn lenient_level<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    lenient_u32(d)?.ok_or_else(|| <D::Error as de::Error>::custom("upgrade level is null"))
}

/// On-disk shape. Every field is optional so older saves decode;
/// missing fields fall back to the initial snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SaveData {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default, alias = "stardust", skip_serializing_if = "Option::is_none")]
    resource: Option<TaggedQuantity>,
    #[serde(
        default,
        alias = "totalClicks",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_u64"
    )]
    total_clicks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upgrades: Option<BTreeMap<String, SavedUpgrade>>,
    #[serde(default, alias = "credits", skip_serializing_if = "Option::is_none")]
    secondary_currency: Option<TaggedQuantity>,
    #[serde(
        default,
        alias = "prestigeLevel",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_u32"
    )]
    prestige_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    achievements: Option<Vec<String>>,
    #[serde(default, alias = "lastSaveTime", skip_serializing_if = "Option::is_none")]
    last_tick_timestamp: Option<TimestampMs>,
}

impl SaveData {
    /// True when not one game field was recognised.
    fn is_blank(&self) -> bool {
        self.resource.is_none()
            && self.total_clicks.is_none()
            && self.upgrades.is_none()
            && self.secondary_currency.is_none()
            && self.prestige_level.is_none()
            && self.achievements.is_none()
            && self.last_tick_timestamp.is_none()
    }
}

/// Strip the browser client's `{"state": {...}}` wrapper, if present.
fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.get("state").is_some_and(|s| s.is_object()) => {
            map.remove("state").unwrap_or_default()
        }
        other => other,
    }
}

/// Snapshot to save text.
pub fn encode(snapshot: &GameSnapshot) -> GameResult<String> {
    let upgrades = snapshot
        .upgrades
        .iter()
        .map(|(id, u)| {
            (id.clone(), SavedUpgrade { level: u.level, cost_type: Some(u.cost_type) })
        })
        .collect();
    let data = SaveData {
        version:             Some(SAVE_VERSION),
        resource:            Some(TaggedQuantity(snapshot.resource.clone())),
        total_clicks:        Some(snapshot.total_clicks),
        upgrades:            Some(upgrades),
        secondary_currency:  Some(TaggedQuantity(snapshot.secondary_currency.clone())),
        prestige_level:      Some(snapshot.prestige_level),
        achievements:        Some(snapshot.achievements.iter().cloned().collect()),
        last_tick_timestamp: Some(snapshot.last_tick_timestamp),
    };
    Ok(serde_json::to_string(&data)?)
}

/// Save text to snapshot. Strict: any malformed field is an error.
/// `now` stamps the initial snapshot used to fill missing fields.
pub fn decode(text: &str, now: TimestampMs) -> GameResult<GameSnapshot> {
    let codec_error = |e: serde_json::Error| GameError::Codec { reason: e.to_string() };
    let value: serde_json::Value = serde_json::from_str(text).map_err(codec_error)?;
    let data: SaveData = serde_json::from_value(unwrap_envelope(value)).map_err(codec_error)?;

    let version = data.version.unwrap_or(0);
    if version > SAVE_VERSION {
        return Err(GameError::UnsupportedVersion { found: version, supported: SAVE_VERSION });
    }
    if data.is_blank() {
        return Err(GameError::Codec { reason: "no recognisable game fields".into() });
    }

    let mut snapshot = GameSnapshot::initial(now);
    if let Some(resource) = data.resource {
        snapshot.resource = resource.0;
    }
    if let Some(clicks) = data.total_clicks {
        snapshot.total_clicks = clicks;
    }
    if let Some(upgrades) = data.upgrades {
        snapshot.upgrades = upgrades
            .into_iter()
            .filter(|(_, u)| u.level > 0)
            .map(|(id, u)| {
                // The catalog is authoritative for the currency of known upgrades.
                let cost_type = catalog::find(&id)
                    .map(|def| def.cost_type)
                    .or(u.cost_type)
                    .unwrap_or(CostType::Stardust);
                (id, UpgradeState { level: u.level, cost_type })
            })
            .collect();
    }
    if let Some(credits) = data.secondary_currency {
        snapshot.secondary_currency = credits.0;
    }
    if let Some(prestige) = data.prestige_level {
        snapshot.prestige_level = prestige;
    }
    if let Some(achievements) = data.achievements {
        snapshot.achievements = achievements.into_iter().collect();
    }
    if let Some(ts) = data.last_tick_timestamp {
        snapshot.last_tick_timestamp = ts;
    }
    snapshot.recompute_rates();
    Ok(snapshot)
}

/// Decode, or start fresh when the save is unreadable.
pub fn decode_or_initial(text: &str, now: TimestampMs) -> GameSnapshot {
    match decode(text, now) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("discarding unreadable save, starting a new game: {e}");
            GameSnapshot::initial(now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_strings_parse_with_or_without_sentinel() {
        assert_eq!(parse_tagged("42n"), Ok(Quantity::from(42u32)));
        assert_eq!(parse_tagged("42"), Ok(Quantity::from(42u32)));
        assert!(parse_tagged("n").is_err());
        assert!(parse_tagged("-5n").is_err());
        assert!(parse_tagged("+5").is_err());
        assert!(parse_tagged("4.2n").is_err());
    }

    #[test]
    fn encode_tags_currencies_and_omits_rates() {
        let mut s = GameSnapshot::initial(1_000);
        s.resource = Quantity::from(12u32);
        let text = encode(&s).unwrap();
        assert!(text.contains(r#""resource":"12n""#), "{text}");
        assert!(text.contains(r#""secondary_currency":"0n""#), "{text}");
        assert!(!text.contains("per_click"), "{text}");
        assert!(text.contains(r#""version":1"#), "{text}");
    }

    #[test]
    fn level_zero_entries_are_dropped() {
        let text = r#"{"upgrades":{"telescope":{"level":0}}}"#;
        let s = decode(text, 0).unwrap();
        assert!(s.upgrades.is_empty());
    }
}
