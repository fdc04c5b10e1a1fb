use std::sync::Arc;

use common::error::{ConsoleError, ConsoleResult};
use serde_json::{Map, Number, Value};

pub type FormValues = Map<String, Value>;

/// Transform applied to form values right before they are submitted.
pub type Normalize = Arc<dyn Fn(FormValues) -> ConsoleResult<FormValues> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    Checkbox,
    /// (value, label) pairs
    Select(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub placeholder: Option<&'static str>,
}

impl Field {
    pub fn new(kind: FieldKind, name: &'static str, label: &'static str) -> Self {
        Self {
            kind,
            name,
            label,
            required: false,
            placeholder: None,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(FieldKind::Text, name, label)
    }

    pub fn textarea(name: &'static str, label: &'static str) -> Self {
        Self::new(FieldKind::Textarea, name, label)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(FieldKind::Number, name, label)
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::new(FieldKind::Date, name, label)
    }

    pub fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self::new(FieldKind::Checkbox, name, label)
    }

    pub fn select(name: &'static str, label: &'static str, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(v, l)| (v.to_string(), l.to_string()))
            .collect();
        Self::new(FieldKind::Select(options), name, label)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// A select with a placeholder starts unchosen, otherwise on its
    /// first option.
    fn empty_value(&self) -> Value {
        match &self.kind {
            FieldKind::Checkbox => Value::Bool(false),
            FieldKind::Select(_) if self.placeholder.is_some() => Value::String(String::new()),
            FieldKind::Select(options) => Value::String(
                options.first().map(|(v, _)| v.clone()).unwrap_or_default(),
            ),
            _ => Value::String(String::new()),
        }
    }

    /// Value of a raw text input for this field. Checkboxes take
    /// `true`/`yes`/`1`, everything else stays text until `normalize_in`.
    pub fn parse_input(&self, raw: &str) -> Value {
        match self.kind {
            FieldKind::Checkbox => Value::Bool(matches!(
                raw.trim().to_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            )),
            _ => Value::String(raw.to_owned()),
        }
    }
}

/// Values of a fresh create form.
pub fn empty_form(fields: &[Field]) -> FormValues {
    fields
        .iter()
        .map(|field| (field.name.to_owned(), field.empty_value()))
        .collect()
}

/// Values of an edit form, taken from the serialized row. Nested
/// references collapse to their id so they can be submitted back.
pub fn form_from_row(fields: &[Field], row: &Value) -> FormValues {
    fields
        .iter()
        .map(|field| {
            let value = match row.get(field.name) {
                None | Some(Value::Null) => field.empty_value(),
                Some(Value::Object(nested)) => match nested.get("id") {
                    Some(id) => id.clone(),
                    None => Value::Object(nested.clone()),
                },
                Some(v) => v.clone(),
            };
            (field.name.to_owned(), value)
        })
        .collect()
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// The only validation the console does: required fields must be filled.
pub fn check_required(fields: &[Field], values: &FormValues) -> ConsoleResult<()> {
    match fields
        .iter()
        .find(|field| field.required && is_blank(values.get(field.name)))
    {
        Some(field) => Err(ConsoleError::MissingField(field.label.to_owned())),
        None => Ok(()),
    }
}

/// Coerces a text input into a JSON number. Blank becomes `null`.
pub fn to_number(values: &mut FormValues, key: &str) -> ConsoleResult<()> {
    let Some(value) = values.get_mut(key) else {
        return Ok(());
    };
    let coerced = match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Value::Null
            } else if let Ok(n) = s.parse::<i64>() {
                Value::Number(n.into())
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| ConsoleError::InvalidNumber {
                        field: key.to_owned(),
                        value: s.to_owned(),
                    })?
            }
        }
        _ => return Ok(()),
    };
    *value = coerced;
    Ok(())
}

/// Optional text inputs left blank are sent as `null`.
pub fn blank_to_null(values: &mut FormValues, key: &str) {
    if let Some(value) = values.get_mut(key) {
        if is_blank(Some(value)) {
            *value = Value::Null;
        }
    }
}

/// Builds a `Normalize` that coerces `numeric` keys and nulls blank `optional` keys.
pub fn numeric(numeric: &'static [&'static str], optional: &'static [&'static str]) -> Normalize {
    Arc::new(move |mut values: FormValues| {
        for key in numeric {
            to_number(&mut values, key)?;
        }
        for key in optional {
            blank_to_null(&mut values, key);
        }
        Ok(values)
    })
}
