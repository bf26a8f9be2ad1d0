use clap::Parser;
use clap::ValueEnum;
use colored::Colorize;
use ebnf::Grammar;
use regex::Regex;
use std::fmt::Display;
use std::io;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use translator::Config;
use translator::Dialect;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectArg {
    Rust,
    Ecmascript,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Rust => Dialect::Rust,
            DialectArg::Ecmascript => Dialect::EcmaScript,
        }
    }
}

/// Translates an EBNF grammar into an anchored regular expression.
#[derive(Debug, Parser)]
struct Cli {
    /// Grammar file, read from stdin when omitted.
    grammar: Option<PathBuf>,
    #[clap(short = 's', long = "start", default_value = "start")]
    start: String,
    #[clap(short = 'd', long = "dialect", value_enum, default_value = "rust")]
    dialect: DialectArg,
    /// Print the pattern of every production to stderr.
    #[clap(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
    /// Check every line of these files against the pattern.
    #[clap(short = 'm', long = "match")]
    inputs: Vec<PathBuf>,
}

fn report(error: impl Display) {
    eprintln!("{} {error}", "error:".red().bold());
}

fn read_grammar(path: Option<&PathBuf>) -> Option<String> {
    let mut source = String::new();
    match path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => source = content,
            Err(err) => {
                report(format!("could not read {}: {err}", path.display()));
                return None;
            }
        },
        None => {
            if let Err(err) = io::stdin().read_to_string(&mut source) {
                report(format!("could not read stdin: {err}"));
                return None;
            }
        }
    }
    Some(source)
}

fn print_productions(grammar: &Grammar, dialect: Dialect) {
    for production in grammar.iter() {
        match translator::translate_production(grammar, &production.name) {
            Ok(node) => eprintln!(
                "{} {}",
                format!("{}:", production.name).cyan(),
                node.pattern(dialect)
            ),
            Err(err) => eprintln!(
                "{} {}",
                format!("{}:", production.name).cyan(),
                err.to_string().yellow()
            ),
        }
    }
}

fn match_file(regex: &Regex, path: &PathBuf) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        report(format!("could not read {}", path.display()));
        return false;
    };
    let mut all_matched = true;
    for (number, line) in content.lines().enumerate() {
        let location = format!("{}:{}", path.display(), number + 1);
        if regex.is_match(line) {
            println!("{} {location}", "match".green());
        } else {
            println!("{} {location}: {line}", "no match".red());
            all_matched = false;
        }
    }
    all_matched
}

fn main() -> ExitCode {
    let args = Cli::parse();
    let dialect = Dialect::from(args.dialect);

    let Some(source) = read_grammar(args.grammar.as_ref()) else {
        return ExitCode::FAILURE;
    };
    let grammar: Grammar = match source.parse() {
        Ok(grammar) => grammar,
        Err(err) => {
            report(err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = grammar.verify(&args.start) {
        report(err);
        return ExitCode::FAILURE;
    }
    if args.verbose {
        print_productions(&grammar, dialect);
    }

    let config = Config::default()
        .with_start(args.start)
        .with_dialect(dialect);
    let pattern = match translator::translate(&grammar, &config) {
        Ok(pattern) => pattern,
        Err(err) => {
            report(err);
            return ExitCode::FAILURE;
        }
    };
    println!("{pattern}");

    if args.inputs.is_empty() {
        return ExitCode::SUCCESS;
    }
    if dialect != Dialect::Rust {
        report("--match needs the rust dialect");
        return ExitCode::FAILURE;
    }
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => {
            report(err);
            return ExitCode::FAILURE;
        }
    };
    let mut all_matched = true;
    for path in &args.inputs {
        if !match_file(&regex, path) {
            all_matched = false;
        }
    }
    if all_matched {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
