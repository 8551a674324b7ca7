// Generates `compile_time` limit constants from config/<profile>.toml
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct Limits {
    file_processing: FileProcessing,
    lexical: Lexical,
    grammar: Grammar,
    syntax: Syntax,
    logging: Logging,
}

#[derive(serde::Deserialize)]
struct FileProcessing {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct Lexical {
    max_token_count: usize,
    max_indent_depth: usize,
    max_string_size: usize,
    max_identifier_length: usize,
}

#[derive(serde::Deserialize)]
struct Grammar {
    max_rules: usize,
    max_symbols_per_production: usize,
    max_set_iterations: usize,
}

#[derive(serde::Deserialize)]
struct Syntax {
    max_stack_depth: usize,
    max_parse_steps: usize,
}

#[derive(serde::Deserialize)]
struct Logging {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PYLL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PYLL_CONFIG_DIR");

    let profile = env::var("PYLL_BUILD_PROFILE").unwrap_or_else(|_| "development".into());
    let config_dir = env::var("PYLL_CONFIG_DIR").unwrap_or_else(|_| "config".into());

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("crate must live inside the workspace");
    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    let text = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "cannot read limits profile {}: {} (set PYLL_BUILD_PROFILE / PYLL_CONFIG_DIR)",
            config_path.display(),
            e
        )
    });
    let limits: Limits = toml::from_str(&text)
        .unwrap_or_else(|e| panic!("invalid limits in {}: {}", config_path.display(), e));

    if let Err(problem) = check(&limits, &profile) {
        panic!("{}: {}", config_path.display(), problem);
    }

    let out = Path::new(&env::var("OUT_DIR").expect("OUT_DIR not set")).join("constants.rs");
    fs::write(&out, render(&limits, &profile)).expect("cannot write generated constants");

    println!("cargo:rustc-env=PYLL_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=PYLL_CONFIG_DIR={}", config_dir);
}

fn check(limits: &Limits, profile: &str) -> Result<(), String> {
    let files = &limits.file_processing;
    if files.max_file_size > 1_000_000_000 {
        return Err("max_file_size is above 1 GB".into());
    }
    if files.large_file_threshold > files.max_file_size {
        return Err("large_file_threshold exceeds max_file_size".into());
    }
    if profile == "production" && files.max_file_size > 50_000_000 {
        return Err("max_file_size is above 50 MB in the production profile".into());
    }
    if limits.lexical.max_indent_depth == 0 {
        return Err("max_indent_depth must be at least 1".into());
    }
    if limits.grammar.max_set_iterations == 0 {
        return Err("max_set_iterations must be at least 1".into());
    }
    // the parser stack starts with `$` and the start symbol
    if !(2..=1_000_000).contains(&limits.syntax.max_stack_depth) {
        return Err("max_stack_depth must be in 2..=1000000".into());
    }
    if limits.logging.max_log_events_per_file > limits.logging.log_buffer_size {
        return Err("max_log_events_per_file exceeds log_buffer_size".into());
    }
    Ok(())
}

fn render(limits: &Limits, profile: &str) -> String {
    let sections: [(&str, Vec<(&str, &str, u64)>); 5] = [
        (
            "file_processing",
            vec![
                ("MAX_FILE_SIZE", "u64", limits.file_processing.max_file_size),
                ("LARGE_FILE_THRESHOLD", "u64", limits.file_processing.large_file_threshold),
                ("MAX_LINE_COUNT", "usize", limits.file_processing.max_line_count as u64),
            ],
        ),
        (
            "lexical",
            vec![
                ("MAX_TOKEN_COUNT", "usize", limits.lexical.max_token_count as u64),
                ("MAX_INDENT_DEPTH", "usize", limits.lexical.max_indent_depth as u64),
                ("MAX_STRING_SIZE", "usize", limits.lexical.max_string_size as u64),
                ("MAX_IDENTIFIER_LENGTH", "usize", limits.lexical.max_identifier_length as u64),
            ],
        ),
        (
            "grammar",
            vec![
                ("MAX_RULES", "usize", limits.grammar.max_rules as u64),
                (
                    "MAX_SYMBOLS_PER_PRODUCTION",
                    "usize",
                    limits.grammar.max_symbols_per_production as u64,
                ),
                ("MAX_SET_ITERATIONS", "usize", limits.grammar.max_set_iterations as u64),
            ],
        ),
        (
            "syntax",
            vec![
                ("MAX_STACK_DEPTH", "usize", limits.syntax.max_stack_depth as u64),
                ("MAX_PARSE_STEPS", "usize", limits.syntax.max_parse_steps as u64),
            ],
        ),
        (
            "logging",
            vec![
                ("MAX_ERROR_COLLECTION", "usize", limits.logging.max_error_collection as u64),
                ("LOG_BUFFER_SIZE", "usize", limits.logging.log_buffer_size as u64),
                ("MAX_LOG_MESSAGE_LENGTH", "usize", limits.logging.max_log_message_length as u64),
                ("MAX_LOG_EVENTS_PER_FILE", "usize", limits.logging.max_log_events_per_file as u64),
            ],
        ),
    ];

    let mut code = format!("// Generated by build.rs from the '{}' profile\n\npub mod compile_time {{\n", profile);
    for (module, constants) in &sections {
        let _ = writeln!(code, "    pub mod {} {{", module);
        for (name, ty, value) in constants {
            let _ = writeln!(code, "        pub const {}: {} = {};", name, ty, value);
        }
        code.push_str("    }\n");
    }
    code.push_str("}\n");
    code
}
