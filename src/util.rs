//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Coerce a submitted question id to an integer.
/// Accepts plain integers and float spellings like "3.0"; anything else is None.
pub fn coerce_id(raw: &str) -> Option<u32> {
  let t = raw.trim();
  if let Ok(n) = t.parse::<u32>() {
    return Some(n);
  }
  let f = t.parse::<f64>().ok()?;
  if !f.is_finite() || f < 0.0 || f > u32::MAX as f64 {
    return None;
  }
  Some(f as u32)
}

/// Round to two decimal places, the precision used for reported timings.
pub fn round2(v: f64) -> f64 {
  (v * 100.0).round() / 100.0
}

/// Reduce a display name to a filesystem-safe slug for artifact names.
pub fn file_slug(name: &str) -> String {
  let slug: String = name
    .trim()
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
    .collect();
  if slug.is_empty() { "student".to_string() } else { slug }
}
