use crate::logging::codes;

/// Check that every stage's error codes are registered before anything runs
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;
    crate::grammar::init_grammar_logging()?;

    let interchange_codes = [
        codes::interchange::MALFORMED_TOKEN_LINE,
        codes::interchange::INVALID_TOKEN_POSITION,
    ];
    for code in &interchange_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Interchange error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 3,
        "lexical_analysis" => true,
        "grammar_compilation" => true,
        "syntax_analysis" => true
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }
}
