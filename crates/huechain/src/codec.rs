//! Compact text and JSON encodings of a [`FilterChain`].
//!
//! Compact text is `id:v0,v1;id:v0;~name`: one `;`-terminated clause per
//! filter, then `~` and the raw name. The name is everything after the first
//! `~`, so it may contain any delimiter. JSON is
//! `{"name": .., "filters": [{"id": .., "args": {control: value}}]}`.
//!
//! Both decoders are all-or-nothing: the whole input is parsed into fresh
//! filters before the chain is touched. The base seed and visibility are not
//! part of either encoding; decoded filters start visible.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::chain::FilterChain;
use crate::control::{
    color_to_hex, format_number, parse_hex_color, round_to_precision, Control, ControlError,
    ControlValue,
};
use crate::definition::FilterDefinition;
use crate::filter::{FilterKey, ParameterizedFilter};

const CLAUSE_END: char = ';';
const NAME_MARK: char = '~';
const ID_END: char = ':';
const FIELD_SEP: char = ',';

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("filter '{id}' takes {expected} arguments, found {found}")]
    Arity {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("filter '{id}': '{value}' is not a valid color for '{control}'")]
    InvalidColor {
        id: String,
        control: String,
        value: String,
    },
    #[error("filter '{id}': '{value}' is not a finite number for '{control}'")]
    NotANumber {
        id: String,
        control: String,
        value: String,
    },
    #[error("filter '{id}' is missing argument '{control}'")]
    MissingArgument { id: String, control: String },
    #[error("malformed clause '{0}'")]
    MalformedClause(String),
    #[error("encoded chain has no '~' before its name")]
    MissingName,
    #[error("invalid chain JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Control(#[from] ControlError),
}

/// JSON shape of a saved chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedChain {
    pub name: String,
    pub filters: Vec<SavedFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: String,
    pub args: Map<String, Value>,
}

type DecodedFilter = (Arc<FilterDefinition>, Vec<ControlValue>);

impl FilterChain {
    /// Compact text form of the filters and name.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for filter in &self.filters {
            out.push_str(filter.id());
            out.push(ID_END);
            let fields: Vec<String> = filter
                .definition()
                .controls()
                .iter()
                .zip(filter.values())
                .map(|(control, value)| encode_field(control, *value))
                .collect();
            out.push_str(&fields.join(&FIELD_SEP.to_string()));
            out.push(CLAUSE_END);
        }
        out.push(NAME_MARK);
        out.push_str(&self.name);
        out
    }

    /// Replaces name and filters from compact text, or from JSON when the
    /// input starts with `{`. On error the chain is left as it was.
    pub fn decode(&mut self, text: &str) -> Result<(), CodecError> {
        if text.starts_with('{') {
            let value: Value = serde_json::from_str(text)?;
            return self.load_filters(&value);
        }
        let (clauses, name) = text.split_once(NAME_MARK).ok_or(CodecError::MissingName)?;
        let decoded = self.parse_clauses(clauses)?;
        self.replace_filters(name.to_string(), decoded)
    }

    pub fn save_filters(&self) -> SavedChain {
        let filters = self
            .filters
            .iter()
            .map(|filter| SavedFilter {
                id: filter.id().to_string(),
                args: filter
                    .definition()
                    .controls()
                    .iter()
                    .zip(filter.values())
                    .map(|(control, value)| (control.id.to_string(), json_value(control, *value)))
                    .collect(),
            })
            .collect();
        SavedChain {
            name: self.name.clone(),
            filters,
        }
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.save_filters())?)
    }

    /// Replaces name and filters from a parsed JSON document. Arguments the
    /// filter does not declare are ignored; missing ones are an error.
    pub fn load_filters(&mut self, json: &Value) -> Result<(), CodecError> {
        let saved = SavedChain::deserialize(json)?;
        let decoded = saved
            .filters
            .iter()
            .map(|entry| {
                let definition = self.lookup(&entry.id)?;
                let values = definition
                    .controls()
                    .iter()
                    .map(|control| {
                        let value = entry.args.get(control.id).ok_or_else(|| {
                            CodecError::MissingArgument {
                                id: entry.id.clone(),
                                control: control.id.to_string(),
                            }
                        })?;
                        json_field(&entry.id, control, value)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((definition, values))
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        self.replace_filters(saved.name, decoded)
    }

    fn lookup(&self, id: &str) -> Result<Arc<FilterDefinition>, CodecError> {
        self.registry()
            .get(id)
            .cloned()
            .ok_or_else(|| CodecError::UnknownFilter(id.to_string()))
    }

    fn parse_clauses(&self, clauses: &str) -> Result<Vec<DecodedFilter>, CodecError> {
        if clauses.is_empty() {
            return Ok(Vec::new());
        }
        let body = clauses
            .strip_suffix(CLAUSE_END)
            .ok_or_else(|| CodecError::MalformedClause(clauses.to_string()))?;
        body.split(CLAUSE_END)
            .map(|clause| self.parse_clause(clause))
            .collect()
    }

    fn parse_clause(&self, clause: &str) -> Result<DecodedFilter, CodecError> {
        let (id, fields) = clause
            .split_once(ID_END)
            .filter(|(id, _)| !id.is_empty())
            .ok_or_else(|| CodecError::MalformedClause(clause.to_string()))?;
        let definition = self.lookup(id)?;
        let fields: Vec<&str> = if fields.is_empty() {
            Vec::new()
        } else {
            fields.split(FIELD_SEP).collect()
        };
        let controls = definition.controls();
        if fields.len() != controls.len() {
            return Err(CodecError::Arity {
                id: id.to_string(),
                expected: controls.len(),
                found: fields.len(),
            });
        }
        let values = controls
            .iter()
            .zip(fields)
            .map(|(control, field)| text_field(id, control, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((definition, values))
    }

    /// Builds every filter first, then swaps them in together with the name.
    fn replace_filters(
        &mut self,
        name: String,
        decoded: Vec<DecodedFilter>,
    ) -> Result<(), CodecError> {
        let mut next_key = self.next_key;
        let mut filters = Vec::with_capacity(decoded.len());
        for (definition, values) in decoded {
            filters.push(ParameterizedFilter::with_values(
                FilterKey(next_key),
                definition,
                values,
            )?);
            next_key += 1;
        }
        debug!(name = %name, filters = filters.len(), "replaced filter chain");
        self.name = name;
        self.filters = filters;
        self.next_key = next_key;
        Ok(())
    }
}

fn encode_field(control: &Control, value: ControlValue) -> String {
    match value {
        ControlValue::Color(color) => color_to_hex(color),
        ControlValue::Number(number) => format_number(number, precision_of(control)),
    }
}

fn json_value(control: &Control, value: ControlValue) -> Value {
    match value {
        ControlValue::Color(color) => Value::String(format!("#{}", color_to_hex(color))),
        ControlValue::Number(number) => {
            let precision = precision_of(control);
            let rounded = round_to_precision(number, precision);
            if precision == 0 {
                Value::from(rounded as i64)
            } else {
                Value::from(rounded)
            }
        }
    }
}

fn precision_of(control: &Control) -> u32 {
    control.range().map_or(0, |range| range.precision)
}

fn text_field(id: &str, control: &Control, field: &str) -> Result<ControlValue, CodecError> {
    if control.is_color() {
        return parse_hex_color(field)
            .map(ControlValue::Color)
            .map_err(|_| CodecError::InvalidColor {
                id: id.to_string(),
                control: control.id.to_string(),
                value: field.to_string(),
            });
    }
    field
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|number| number.is_finite())
        .map(ControlValue::Number)
        .ok_or_else(|| CodecError::NotANumber {
            id: id.to_string(),
            control: control.id.to_string(),
            value: field.to_string(),
        })
}

fn json_field(id: &str, control: &Control, value: &Value) -> Result<ControlValue, CodecError> {
    if control.is_color() {
        return value
            .as_str()
            .and_then(|text| parse_hex_color(text).ok())
            .map(ControlValue::Color)
            .ok_or_else(|| CodecError::InvalidColor {
                id: id.to_string(),
                control: control.id.to_string(),
                value: value.to_string(),
            });
    }
    value
        .as_f64()
        .map(|number| number as f32)
        .filter(|number| number.is_finite())
        .map(ControlValue::Number)
        .ok_or_else(|| CodecError::NotANumber {
            id: id.to_string(),
            control: control.id.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use serde_json::json;

    #[test]
    fn encodes_fields_in_control_order() {
        let mut chain = FilterChain::new();
        chain.set_name("Warm");
        chain.add_filter("posterize").unwrap();
        chain.add_filter("blend_multiply").unwrap();
        assert_eq!(chain.encode(), "posterize:5;blend_multiply:ff8000,100;~Warm");
    }

    #[test]
    fn empty_chain_is_just_the_name() {
        let mut chain = FilterChain::new();
        chain.add_filter("posterize").unwrap();
        chain.decode("~Only a name").unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.name(), "Only a name");
        assert_eq!(chain.encode(), "~Only a name");
    }

    #[test]
    fn name_keeps_delimiters() {
        let mut chain = FilterChain::new();
        chain.add_filter("blend_darken").unwrap();
        chain.set_name("a;b~c,d");
        let encoded = chain.encode();
        let mut decoded = FilterChain::new();
        decoded.decode(&encoded).unwrap();
        assert_eq!(decoded.name(), "a;b~c,d");
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let mut chain = FilterChain::new();
        let cases = [
            ("posterize:5", "no name marker"),
            ("posterize:5~x", "missing clause terminator"),
            (":5;~x", "empty id"),
            ("posterize;~x", "missing ':'"),
            ("posterize:5,6;~x", "too many fields"),
            ("blend_normal:ff0000;~x", "too few fields"),
            ("blend_normal:red,50;~x", "bad color"),
            ("posterize:five;~x", "bad number"),
            ("posterize:inf;~x", "infinite number"),
            ("posterize:5;;~x", "empty clause"),
        ];
        for (input, why) in cases {
            assert!(chain.decode(input).is_err(), "{why}: {input}");
        }
        assert!(chain.is_empty());
        assert_eq!(chain.name(), "Unnamed");
    }

    #[test]
    fn malformed_json_is_rejected_atomically() {
        let mut chain = FilterChain::new();
        chain.set_name("Kept");
        chain.add_filter("blend_overlay").unwrap();
        let before = chain.clone();

        let cases = [
            (
                r##"{"name": "x", "filters": [{"id": "blend_normal", "args": {"color": "#zz0000", "opacity": 50}}]}"##,
                "invalid color string",
            ),
            (
                r#"{"name": "x", "filters": [{"id": "blend_normal", "args": {"color": 16711680, "opacity": 50}}]}"#,
                "color as a number",
            ),
            (
                r#"{"name": "x", "filters": [{"id": "posterize", "args": {"levels": "5"}}]}"#,
                "number as a string",
            ),
            (
                r#"{"name": "x", "filters": [{"id": "posterize", "args": {"levels": null}}]}"#,
                "number as null",
            ),
            (
                r#"{"name": "x", "filters": [{"id": "posterize", "args": {"levels": 1e300}}]}"#,
                "overflows f32",
            ),
            (
                r#"{"name": 7, "filters": []}"#,
                "name is not a string",
            ),
            (
                r#"{"name": "x", "filters": [{"id": "posterize", "args": {"levels": 4}}, {"id": "posterize", "args": {"levels": "many"}}]}"#,
                "second filter is bad",
            ),
            (r#"{"name": "x", "filters": "#, "truncated document"),
        ];
        for (input, why) in cases {
            assert!(chain.decode(input).is_err(), "{why}: {input}");
            assert_eq!(chain, before, "{why}");
        }

        assert!(matches!(
            chain.decode(cases[0].0),
            Err(CodecError::InvalidColor { .. })
        ));
        assert!(matches!(
            chain.decode(cases[4].0),
            Err(CodecError::NotANumber { .. })
        ));
        assert!(matches!(chain.decode(cases[5].0), Err(CodecError::Json(_))));
    }

    #[test]
    fn failed_replacement_keeps_key_counter() {
        let mut chain = FilterChain::new();
        let posterize = chain.registry().get("posterize").cloned().unwrap();
        let decoded = vec![
            (posterize.clone(), vec![ControlValue::Number(4.0)]),
            (posterize, vec![ControlValue::Color(Vec3::ONE)]),
        ];
        assert!(matches!(
            chain.replace_filters("x".to_string(), decoded),
            Err(CodecError::Control(_))
        ));
        assert!(chain.is_empty());
        assert_eq!(chain.add_filter("posterize").unwrap(), FilterKey(0));
    }

    #[test]
    fn json_colors_carry_hash_and_numbers_round() {
        let mut chain = FilterChain::new();
        let key = chain.add_filter("hsl_multiply").unwrap();
        chain.set_value(key, 0, ControlValue::Number(1.234)).unwrap();
        let blend = chain.add_filter("blend_screen").unwrap();
        chain.set_value(blend, 1, ControlValue::Number(33.4)).unwrap();

        let saved = serde_json::to_value(chain.save_filters()).unwrap();
        assert_eq!(
            saved,
            json!({
                "name": "Unnamed",
                "filters": [
                    {"id": "hsl_multiply", "args": {"hue": 1.23, "saturation": 1.0, "lightness": 1.0}},
                    {"id": "blend_screen", "args": {"color": "#0000ff", "opacity": 33}},
                ]
            })
        );
    }

    #[test]
    fn json_requires_every_argument() {
        let mut chain = FilterChain::new();
        let missing = json!({"name": "x", "filters": [{"id": "blend_normal", "args": {"color": "#ff0000"}}]});
        assert!(matches!(
            chain.load_filters(&missing),
            Err(CodecError::MissingArgument { .. })
        ));
        let extra = json!({"name": "x", "filters": [{"id": "posterize", "args": {"levels": 4, "gamma": 2}}]});
        chain.load_filters(&extra).unwrap();
        assert_eq!(chain.filters()[0].values(), &[ControlValue::Number(4.0)]);
    }

    #[test]
    fn decoded_values_are_clamped() {
        let mut chain = FilterChain::new();
        chain.decode("posterize:900;blend_normal:FFF,-5;~c").unwrap();
        assert_eq!(chain.filters()[0].values(), &[ControlValue::Number(64.0)]);
        assert_eq!(
            chain.filters()[1].values(),
            &[ControlValue::Color(Vec3::ONE), ControlValue::Number(0.0)]
        );
    }

    #[test]
    fn decoded_filters_get_fresh_keys() {
        let mut chain = FilterChain::new();
        let first = chain.add_filter("posterize").unwrap();
        chain.decode("posterize:5;posterize:6;~k").unwrap();
        let keys: Vec<_> = chain.filters().iter().map(|f| f.key()).collect();
        assert!(!keys.contains(&first));
        assert_ne!(keys[0], keys[1]);
        let added = chain.add_filter("posterize").unwrap();
        assert!(!keys.contains(&added));
    }
}
