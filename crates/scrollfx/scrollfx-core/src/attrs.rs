//! Declarative attribute adapter.
//!
//! Turns per-element data attributes into typed options at the boundary so
//! the engine never sees markup. Two spellings are recognized for a prefix
//! such as `animate`:
//!
//! - the bare key (`data-animate` / dataset `animate`) holding a JSON object
//!   of options;
//! - one attribute per option (`data-animate-steps-per-glyph` / dataset
//!   `animateStepsPerGlyph`) mapping to the camelCase option name.
//!
//! Precedence is explicit options > attributes > defaults.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::{AnimationOptions, ParallaxOptions};
use crate::error::{FxError, Result};

/// Attribute prefix for scroll-triggered animations.
pub const ANIMATE_PREFIX: &str = "animate";
/// Attribute prefix for parallax/video backgrounds.
pub const BACKGROUND_PREFIX: &str = "background";

/// `fooBarBaz` → `foo-bar-baz`.
pub fn to_dashed(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('-');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// `foo-bar-baz` → `fooBarBaz`.
pub fn to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for ch in s.chars() {
        if ch == '-' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
enum AttrKey {
    /// The bare prefix key.
    Whole,
    /// A single option, camelCase.
    Field(String),
}

/// Classify an attribute or dataset key against `prefix`.
fn classify_key(prefix: &str, key: &str) -> Option<AttrKey> {
    let key = key.strip_prefix("data-").unwrap_or(key);
    let camel = to_camel(key);
    let rest = camel.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(AttrKey::Whole);
    }
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    let mut field = String::with_capacity(rest.len());
    field.push(first.to_ascii_lowercase());
    field.extend(chars);
    Some(AttrKey::Field(field))
}

/// Attribute text as a JSON value: anything that parses as JSON (numbers,
/// booleans, null, objects) keeps its type; everything else is a string.
fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Collect the options carried by `attrs` for `prefix`.
pub fn collect_attributes<'a, I>(prefix: &str, attrs: I) -> Result<Map<String, Value>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut whole = Map::new();
    let mut fields = Map::new();
    for (key, raw) in attrs {
        match classify_key(prefix, key) {
            Some(AttrKey::Whole) => {
                // A non-object value is only a marker for auto-discovery.
                if let Value::Object(map) = parse_scalar(raw) {
                    whole.extend(map);
                }
            }
            Some(AttrKey::Field(name)) => {
                fields.insert(name, parse_scalar(raw));
            }
            None => {}
        }
    }
    whole.extend(fields);
    Ok(whole)
}

/// Layer explicit options over attributes; fields missing from both take
/// the option struct's defaults.
pub fn resolve_options<T>(attributes: Map<String, Value>, explicit: Option<&Value>) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut merged = attributes;
    match explicit {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => merged.extend(map.clone()),
        Some(other) => {
            return Err(FxError::Attribute {
                reason: format!("explicit options must be an object, got {other}"),
            })
        }
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// Animation options for one element, validated.
pub fn animation_options<'a, I>(attrs: I, explicit: Option<&Value>) -> Result<AnimationOptions>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let collected = collect_attributes(ANIMATE_PREFIX, attrs)?;
    let opts: AnimationOptions = resolve_options(collected, explicit)?;
    opts.validate()?;
    Ok(opts)
}

/// Background options for one element, validated.
pub fn parallax_options<'a, I>(attrs: I, explicit: Option<&Value>) -> Result<ParallaxOptions>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let collected = collect_attributes(BACKGROUND_PREFIX, attrs)?;
    let opts: ParallaxOptions = resolve_options(collected, explicit)?;
    opts.validate()?;
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnimationKind, Finish};
    use crate::interp::Easing;
    use serde_json::json;

    #[test]
    fn case_conversions() {
        assert_eq!(to_dashed("stepsPerGlyph"), "steps-per-glyph");
        assert_eq!(to_dashed("offset"), "offset");
        assert_eq!(to_camel("steps-per-glyph"), "stepsPerGlyph");
        assert_eq!(to_camel(&to_dashed("codeGlyphs")), "codeGlyphs");
    }

    #[test]
    fn keys_map_to_option_names() {
        assert_eq!(classify_key("animate", "animate"), Some(AttrKey::Whole));
        assert_eq!(classify_key("animate", "data-animate"), Some(AttrKey::Whole));
        assert_eq!(
            classify_key("animate", "animateStepsPerGlyph"),
            Some(AttrKey::Field("stepsPerGlyph".into()))
        );
        assert_eq!(
            classify_key("animate", "data-animate-steps-per-glyph"),
            Some(AttrKey::Field("stepsPerGlyph".into()))
        );
        assert_eq!(classify_key("animate", "animated"), None);
        assert_eq!(classify_key("animate", "title"), None);
    }

    #[test]
    fn json_object_and_field_attributes_combine() {
        let attrs = [
            ("data-animate", r#"{"animation":"scramble","duration":900}"#),
            ("data-animate-duration", "1200"),
            ("data-animate-easing", "linear"),
            ("class", "hero"),
        ];
        let opts = animation_options(attrs, None).unwrap();
        assert_eq!(opts.animation, AnimationKind::Scramble);
        assert_eq!(opts.duration, 1200.0);
        assert_eq!(opts.easing, Easing::Linear);
        assert_eq!(opts.finish, Finish::Flag(true));
    }

    #[test]
    fn explicit_options_beat_attributes_beat_defaults() {
        let attrs = [("animateOffset", "20"), ("animateDelay", "100")];
        let explicit = json!({ "offset": 80 });
        let opts = animation_options(attrs, Some(&explicit)).unwrap();
        assert_eq!(opts.offset, 80.0);
        assert_eq!(opts.delay, 100.0);
        assert_eq!(opts.duration, 400.0);
    }

    #[test]
    fn marker_only_attribute_yields_defaults() {
        let opts = animation_options([("data-animate", "")], None).unwrap();
        assert_eq!(opts, AnimationOptions::default());
    }

    #[test]
    fn invalid_values_surface_as_errors() {
        assert!(animation_options([("animateEasing", "bounce")], None).is_err());
        assert!(animation_options([("animateOffset", "150")], None).is_err());
        assert!(animation_options(std::iter::empty(), Some(&json!([1, 2]))).is_err());
    }

    #[test]
    fn numeric_looking_text_options_stay_text() {
        let opts = animation_options(
            [
                ("data-animate-animation", "scramble"),
                ("data-animate-code-glyphs", "10"),
                ("data-animate-delimiter", "0"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(opts.code_glyphs, "10");
        assert_eq!(opts.delimiter, "0");

        let opts = animation_options([("animateCodeGlyphs", "01")], None).unwrap();
        assert_eq!(opts.code_glyphs, "01");
    }

    #[test]
    fn background_attributes() {
        let attrs = [
            ("data-background-mp4-src", "clip.mp4"),
            ("data-background-parallax-effect", "0.4"),
            ("data-background-use-trans3-d", "false"),
        ];
        let opts = parallax_options(attrs, Some(&json!({"minimumVideoWidth": 320}))).unwrap();
        assert_eq!(opts.mp4_src.as_deref(), Some("clip.mp4"));
        assert_eq!(opts.parallax_effect, 0.4);
        assert_eq!(opts.minimum_video_width, 320.0);
        assert!(!opts.use_trans3d);
    }
}
