use crate::value::{Record, Value};

const TAG_KEY: &str = "Key";
const TAG_VALUE: &str = "Value";

/// Make tags addressable by name.
///
/// Every `{Key, Value}` map found anywhere in the record gains a field named
/// after its key:
///
/// ```text
/// [{ "Key": "egg", "Value": "bacon" }]
///   => [{ "Key": "egg", "Value": "bacon", "egg": "bacon" }]
/// ```
///
/// A key that collides with an existing field of the tag overwrites it.
/// Running this twice gives the same result as running it once, unless a
/// tag is itself named `Key`.
pub fn normalize_tags(record: &mut Record) {
    for value in record.values_mut() {
        normalize_value(value);
    }
    synthesize_tag_field(record);
}

fn normalize_value(value: &mut Value) {
    match value {
        Value::Map(inner) => normalize_tags(inner),
        Value::List(items) => items.iter_mut().for_each(normalize_value),
        _ => {}
    }
}

fn synthesize_tag_field(record: &mut Record) {
    let Some(key) = record.get(TAG_KEY).and_then(Value::as_str) else {
        return;
    };
    let Some(value) = record.get(TAG_VALUE) else {
        return;
    };
    let (key, value) = (key.to_string(), value.clone());

    if record.get(&key).is_some_and(|existing| *existing != value) {
        tracing::debug!(tag = %key, "Tag key overwrites an existing field");
    }
    record.insert(key, value);
}
