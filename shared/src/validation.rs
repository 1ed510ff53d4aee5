use validator::ValidationError;

pub fn validate_candidate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("empty_candidate_name"));
    }
    Ok(())
}

pub fn validate_segment_count(segment_count: usize) -> Result<(), ValidationError> {
    if segment_count == 0 {
        return Err(ValidationError::new("invalid_segment_count"));
    }
    Ok(())
}

pub fn validate_full_turns(turns: u32) -> Result<(), ValidationError> {
    if turns == 0 {
        return Err(ValidationError::new("invalid_full_turns"));
    }
    Ok(())
}
