use crate::error::{Error, Result};

pub const MIN_OPTIONS: usize = 2;

pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// At least two options, none blank, and `correct_index` pointing at one of them.
pub fn validate_question_shape(options: &[String], correct_index: i32) -> Result<()> {
    if options.len() < MIN_OPTIONS {
        return Err(Error::BadRequest(format!(
            "A question needs at least {} options",
            MIN_OPTIONS
        )));
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(Error::BadRequest("Options must not be blank".to_string()));
    }
    let in_range = usize::try_from(correct_index)
        .map(|idx| idx < options.len())
        .unwrap_or(false);
    if !in_range {
        return Err(Error::BadRequest(format!(
            "correct_option_index {} is outside 0..{}",
            correct_index,
            options.len()
        )));
    }
    Ok(())
}
