//! Lenient field deserializers. The backend sends `null` for empty optional
//! columns and decimals as strings (`"24.50"`).

use std::{fmt::Display, str::FromStr};

use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

/// `null` becomes `T::default()`, same as a missing key.
pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn parse<T, E>(v: Value) -> Result<Option<T>, E>
where
    T: FromStr,
    T::Err: Display,
    E: Error,
{
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .to_string()
            .parse::<T>()
            .map(Some)
            .map_err(|e| E::custom(format!("invalid number {}: {}", n, e))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| E::custom(format!("cannot parse '{}' as number: {}", s, e))),
        other => Err(E::custom(format!("expected number or string, got {}", other))),
    }
}

/// Number or numeric string; `null` and `""` become zero.
pub fn number<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    Ok(parse::<T, D::Error>(Value::deserialize(d)?)?.unwrap_or_default())
}

/// Number or numeric string; `null` and `""` become `None`.
pub fn opt_number<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    parse(Value::deserialize(d)?)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Row {
        #[serde(default, deserialize_with = "super::null_as_default")]
        notes: String,
        #[serde(default, deserialize_with = "super::number")]
        value: f64,
        #[serde(default, deserialize_with = "super::number")]
        size: i64,
        #[serde(default, deserialize_with = "super::opt_number")]
        battery: Option<f64>,
    }

    #[test]
    fn nulls_and_decimal_strings() {
        let row: Row = serde_json::from_value(json!({
            "notes": null,
            "value": "24.50",
            "size": "450",
            "battery": ""
        }))
        .unwrap();
        assert_eq!(row.notes, "");
        assert_eq!(row.value, 24.5);
        assert_eq!(row.size, 450);
        assert_eq!(row.battery, None);

        let row: Row = serde_json::from_value(json!({"value": 3, "battery": 87.5})).unwrap();
        assert_eq!(row.value, 3.0);
        assert_eq!(row.size, 0);
        assert_eq!(row.battery, Some(87.5));

        let row: Row = serde_json::from_value(json!({"value": null, "size": null})).unwrap();
        assert_eq!(row.value, 0.0);
        assert_eq!(row.size, 0);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_value::<Row>(json!({"value": "lots"})).is_err());
        assert!(serde_json::from_value::<Row>(json!({"size": "1.5"})).is_err());
        assert!(serde_json::from_value::<Row>(json!({"value": [1]})).is_err());
    }
}
