use pyll_compiler::config::runtime::RuntimeConfig;
use pyll_compiler::{grammar, logging, pipeline};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Lex {
        source: String,
        output: Option<PathBuf>,
    },
    Grammar {
        grammar: String,
    },
    Parse {
        grammar: String,
        tokens: String,
    },
    Run {
        source: String,
        grammar: String,
        output: Option<PathBuf>,
        json: bool,
    },
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pyll");

    let cli = match parse_args(&args[1..]) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Run '{} --help' for usage", program);
            std::process::exit(2);
        }
    };

    if cli.command == Command::Help {
        print_help(program);
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    // Initialize global logging system
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;

    // Validate pipeline configuration
    pipeline::validate_pipeline()?;

    let succeeded = match cli.command {
        Command::Lex { source, output } => run_lex(&source, output.as_deref(), &config),
        Command::Grammar { grammar } => run_grammar(&grammar, &config),
        Command::Parse { grammar, tokens } => run_parse(&grammar, &tokens, &config),
        Command::Run {
            source,
            grammar,
            output,
            json,
        } => run_pipeline(&source, &grammar, output.as_deref(), json, &config),
        Command::Help => true,
    };

    if !succeeded {
        logging::print_cargo_style_summary();
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("pyll v{}", env!("CARGO_PKG_VERSION"));
    println!("Indentation-sensitive lexer and LL(1) parser");
    println!();
    println!("USAGE:");
    println!("    {} lex <source> [-o tokens.txt]", program_name);
    println!("    {} grammar <grammar>", program_name);
    println!("    {} parse <grammar> <tokens.txt>", program_name);
    println!(
        "    {} run <source> <grammar> [-o tokens.txt] [--json]",
        program_name
    );
    println!();
    println!("COMMANDS:");
    println!("    lex        Tokenize a source file and print the token listing");
    println!("    grammar    Print FIRST, FOLLOW and prediction sets and the parse table");
    println!("    parse      Parse a token file against a grammar");
    println!("    run        Tokenize a source file, then parse the tokens");
    println!();
    println!("OPTIONS:");
    println!("    -o, --output <file>   Write the token listing to <file>");
    println!("    --json                Print a JSON summary instead of the result line");
    println!("    --config <file>       Load runtime preferences from a TOML file");
    println!("    --help                Show this help message");
    println!();
    println!("Runtime preferences can also be set with PYLL_* environment variables.");
    println!(
        "Compile-time limits: {}",
        pyll_compiler::config::build_info::source_info()
    );
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut positional: Vec<String> = Vec::new();
    let mut output = None;
    let mut config = None;
    let mut json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                return Ok(CliArgs {
                    command: Command::Help,
                    config: None,
                })
            }
            "-o" | "--output" => {
                let value = args.get(i + 1).ok_or("-o requires a file path")?;
                output = Some(PathBuf::from(value));
                i += 1;
            }
            "--config" => {
                let value = args.get(i + 1).ok_or("--config requires a file path")?;
                config = Some(PathBuf::from(value));
                i += 1;
            }
            "--json" => json = true,
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option '{}'", flag));
            }
            value => positional.push(value.to_string()),
        }
        i += 1;
    }

    let (name, operands) = match positional.split_first() {
        Some((name, operands)) => (name.as_str(), operands),
        None => {
            return Ok(CliArgs {
                command: Command::Help,
                config,
            })
        }
    };

    let expect = |count: usize| -> Result<(), String> {
        if operands.len() == count {
            Ok(())
        } else {
            Err(format!(
                "'{}' takes {} argument(s), got {}",
                name,
                count,
                operands.len()
            ))
        }
    };

    let command = match name {
        "lex" => {
            expect(1)?;
            Command::Lex {
                source: operands[0].clone(),
                output,
            }
        }
        "grammar" => {
            expect(1)?;
            Command::Grammar {
                grammar: operands[0].clone(),
            }
        }
        "parse" => {
            expect(2)?;
            Command::Parse {
                grammar: operands[0].clone(),
                tokens: operands[1].clone(),
            }
        }
        "run" => {
            expect(2)?;
            Command::Run {
                source: operands[0].clone(),
                grammar: operands[1].clone(),
                output,
                json,
            }
        }
        other => return Err(format!("Unknown command '{}'", other)),
    };

    Ok(CliArgs { command, config })
}

fn run_lex(source: &str, output: Option<&Path>, config: &RuntimeConfig) -> bool {
    let lexed = match pipeline::lex_file(source, config) {
        Ok(lexed) => lexed,
        Err(error) => {
            eprintln!("{}", error.report());
            return false;
        }
    };

    print!("{}", lexed.listing());

    if let Some(path) = output {
        if let Err(error) = pipeline::write_token_file(path, &lexed.output) {
            eprintln!("{}", error.report());
            return false;
        }
    }

    lexed.is_ok()
}

fn run_grammar(path: &str, config: &RuntimeConfig) -> bool {
    match pipeline::compile_grammar_file(path, config) {
        Ok(compiled) => {
            println!("{}", grammar::report::render_report(&compiled));
            true
        }
        Err(error) => {
            eprintln!("{}", error.report());
            false
        }
    }
}

fn run_parse(grammar_path: &str, tokens_path: &str, config: &RuntimeConfig) -> bool {
    let result = pipeline::compile_grammar_file(grammar_path, config).and_then(|compiled| {
        let tokens = pipeline::read_token_file(tokens_path, config)?;
        pipeline::parse_tokens(&compiled, tokens, config)
    });

    match result {
        Ok(_) => {
            println!("Syntax analysis finished successfully.");
            true
        }
        Err(error) => {
            println!("{}", error.report());
            false
        }
    }
}

fn run_pipeline(
    source: &str,
    grammar_path: &str,
    output: Option<&Path>,
    json: bool,
    config: &RuntimeConfig,
) -> bool {
    let result = pipeline::process_files(source, grammar_path, output, config);

    if json {
        let summary = match &result {
            Ok(result) => pipeline::PipelineOutput::from_result(source, grammar_path, result),
            Err(error) => pipeline::PipelineOutput::from_error(source, grammar_path, error),
        };
        match summary.to_json() {
            Ok(text) => println!("{}", text),
            Err(error) => eprintln!("Failed to serialize summary: {}", error),
        }
        return result.is_ok();
    }

    match result {
        Ok(_) => {
            println!("Syntax analysis finished successfully.");
            true
        }
        Err(error) => {
            println!("{}", error.report());
            if error.is_lexical() {
                println!("Lexical error found; syntax analysis was not run.");
            }
            false
        }
    }
}
