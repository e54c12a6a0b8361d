//! Helpers shared by the pipe-delimited formats

use crate::models::{Field, FieldName};

/// Lay positional fields out as a dense slot array
///
/// The array runs up to the highest position present; unset slots are
/// empty strings and, for repeated positions, the last field wins.
/// Fields without a positional name, or numbered past
/// [`FieldName::MAX_POSITION`], are ignored.
pub(crate) fn build_field_array(fields: &[Field]) -> Vec<&str> {
    let max = fields
        .iter()
        .filter_map(|f| f.name.position())
        .max()
        .unwrap_or(0);

    let mut slots = vec![""; max];
    for field in fields {
        if let Some(position) = field.name.position() {
            slots[position - 1] = field.value.as_str();
        }
    }
    slots
}

/// Non-empty tokens as fields, numbered by `index + offset`
pub(crate) fn fields_from_tokens<'a>(
    tokens: impl Iterator<Item = (usize, &'a str)>,
    offset: usize,
) -> Vec<Field> {
    tokens
        .filter(|(_, token)| !token.is_empty())
        .map(|(index, token)| Field::new(FieldName::Position((index + offset) as u32), token))
        .collect()
}
