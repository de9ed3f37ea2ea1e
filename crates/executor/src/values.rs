use duckdb::types::{TimeUnit, Value as DuckValue, ValueRef};
use serde_json::{Map, Number, Value};

/// Map a DuckDB cell to JSON for rendering.
pub(crate) fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(v) => Value::Bool(v),
        ValueRef::TinyInt(v) => Value::from(v),
        ValueRef::SmallInt(v) => Value::from(v),
        ValueRef::Int(v) => Value::from(v),
        ValueRef::BigInt(v) => Value::from(v),
        ValueRef::HugeInt(v) => huge(v),
        ValueRef::UTinyInt(v) => Value::from(v),
        ValueRef::USmallInt(v) => Value::from(v),
        ValueRef::UInt(v) => Value::from(v),
        ValueRef::UBigInt(v) => Value::from(v),
        ValueRef::Float(v) => float(f64::from(v)),
        ValueRef::Double(v) => float(v),
        ValueRef::Decimal(v) => Value::String(v.to_string()),
        ValueRef::Text(v) => Value::String(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::String(hex(v)),
        ValueRef::Timestamp(unit, v) => timestamp(unit, v),
        ValueRef::Date32(days) => date(days),
        ValueRef::Time64(unit, v) => time(unit, v),
        // nested and less common types go through the owned representation
        other => owned_json(DuckValue::from(other)),
    }
}

fn owned_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(v) => Value::Bool(v),
        DuckValue::TinyInt(v) => Value::from(v),
        DuckValue::SmallInt(v) => Value::from(v),
        DuckValue::Int(v) => Value::from(v),
        DuckValue::BigInt(v) => Value::from(v),
        DuckValue::HugeInt(v) => huge(v),
        DuckValue::UTinyInt(v) => Value::from(v),
        DuckValue::USmallInt(v) => Value::from(v),
        DuckValue::UInt(v) => Value::from(v),
        DuckValue::UBigInt(v) => Value::from(v),
        DuckValue::Float(v) => float(f64::from(v)),
        DuckValue::Double(v) => float(v),
        DuckValue::Decimal(v) => Value::String(v.to_string()),
        DuckValue::Text(v) | DuckValue::Enum(v) => Value::String(v),
        DuckValue::Blob(v) => Value::String(hex(&v)),
        DuckValue::Timestamp(unit, v) => timestamp(unit, v),
        DuckValue::Date32(days) => date(days),
        DuckValue::Time64(unit, v) => time(unit, v),
        DuckValue::Interval { months, days, nanos } => Value::String(interval(months, days, nanos)),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::Array(items.into_iter().map(owned_json).collect())
        }
        DuckValue::Struct(fields) => Value::Object(
            fields
                .keys()
                .cloned()
                .zip(fields.values().cloned().map(owned_json))
                .collect(),
        ),
        DuckValue::Map(entries) => {
            let mut object = Map::new();
            for (key, value) in entries.keys().zip(entries.values()) {
                let key = match owned_json(key.clone()) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                object.insert(key, owned_json(value.clone()));
            }
            Value::Object(object)
        }
        DuckValue::Union(inner) => owned_json(*inner),
    }
}

fn huge(v: i128) -> Value {
    i64::try_from(v)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(v.to_string()))
}

fn float(v: f64) -> Value {
    Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(v.to_string()))
}

fn timestamp(unit: TimeUnit, v: i64) -> Value {
    // DuckDB stores +/-infinity as the extreme values
    match v {
        i64::MAX => return Value::String("infinity".into()),
        v if v == -i64::MAX => return Value::String("-infinity".into()),
        _ => {}
    }
    let Some(micros) = to_micros(unit, v) else {
        return Value::String(v.to_string());
    };
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    match chrono::DateTime::from_timestamp(secs, nanos) {
        Some(dt) => Value::String(dt.to_rfc3339()),
        None => Value::from(micros),
    }
}

fn date(days: i32) -> Value {
    match days {
        i32::MAX => return Value::String("infinity".into()),
        d if d == -i32::MAX => return Value::String("-infinity".into()),
        _ => {}
    }
    // days since 1970-01-01; 719163 is that date's day number from CE
    match days
        .checked_add(719_163)
        .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
    {
        Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        None => Value::from(days),
    }
}

fn time(unit: TimeUnit, v: i64) -> Value {
    let Some(micros) = to_micros(unit, v).filter(|m| (0..=86_400_000_000).contains(m)) else {
        return Value::from(v);
    };
    let secs = (micros / 1_000_000) as u32;
    let nanos = ((micros % 1_000_000) * 1_000) as u32;
    match chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos) {
        Some(t) => Value::String(t.format("%H:%M:%S%.f").to_string()),
        None => Value::from(micros),
    }
}

fn to_micros(unit: TimeUnit, v: i64) -> Option<i64> {
    match unit {
        TimeUnit::Second => v.checked_mul(1_000_000),
        TimeUnit::Millisecond => v.checked_mul(1_000),
        TimeUnit::Microsecond => Some(v),
        TimeUnit::Nanosecond => Some(v / 1_000),
    }
}

/// DuckDB-style interval text, e.g. `1 year 2 months 3 days 04:05:06`.
fn interval(months: i32, days: i32, nanos: i64) -> String {
    let plural = |n: i64, unit: &str| {
        if n.abs() == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    let mut parts = Vec::new();
    let (years, months) = (i64::from(months) / 12, i64::from(months) % 12);
    if years != 0 {
        parts.push(plural(years, "year"));
    }
    if months != 0 {
        parts.push(plural(months, "month"));
    }
    if days != 0 {
        parts.push(plural(i64::from(days), "day"));
    }
    if nanos != 0 || parts.is_empty() {
        let micros = nanos / 1_000;
        let sign = if micros < 0 { "-" } else { "" };
        let micros = micros.unsigned_abs();
        let (secs, frac) = (micros / 1_000_000, micros % 1_000_000);
        let mut clock = format!("{sign}{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60);
        if frac != 0 {
            clock.push_str(format!(".{frac:06}").trim_end_matches('0'));
        }
        parts.push(clock);
    }
    parts.join(" ")
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for b in bytes {
        out.push_str(&format!("\\x{:02X}", b));
    }
    out
}
