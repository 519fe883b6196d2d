use clap::{Parser, Subcommand};

mod code_generator;
mod compiler;
mod error;
mod grammar;
mod lexical_analyzer;
mod models;
mod semantic_analyzer;
mod syntax_analyzer;
mod token_table;
mod writer;

use compiler::Compiler;
use writer::Writer;

#[derive(Parser)]
#[command(name = "dslc")]
#[command(about = "DSL-to-assembly translator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file to an assembly listing
    Compile {
        /// Source file
        input: String,

        /// Listing output path (defaults to the input with an .asm extension)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the syntax tree
        #[arg(long)]
        show_ast: bool,
    },

    /// Tokenize a source file and dump the token tables
    Lex {
        /// Source file
        input: String,
    },

    /// Parse a source file and dump the reduction log
    Parse {
        /// Source file
        input: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output,
            show_ast,
        } => {
            let mut compiler = Compiler::new();
            let result = compiler.compile_file(&input)?;

            if show_ast {
                println!("=== AST ===");
                println!("{:#?}", result.program);
            }

            for error in &result.semantic_errors {
                eprintln!("semantic error: {}", error);
            }

            let output_path = output.unwrap_or_else(|| {
                let base = input.trim_end_matches(".dsl");
                format!("{}.asm", base)
            });
            Writer::new().write_lines(&output_path, &result.listing)?;
            println!("Compiled to: {}", output_path);
            println!("Listing size: {} lines", result.listing.len());
        }
        Commands::Lex { input } => {
            let source = std::fs::read_to_string(&input)?;
            let mut compiler = Compiler::new();
            let lexer = compiler.tokenize(&source)?;

            println!("=== TOKENS ===");
            for lex in lexer.tokenized_code() {
                println!("{}", lex);
            }
            let tables = lexer.tables();
            println!("=== WORDS ===");
            for lex in tables.words() {
                println!("{}", lex);
            }
            println!("=== IDS ===");
            for lex in tables.ids() {
                println!("{}", lex);
            }
            println!("=== CONSTS ===");
            for lex in tables.consts() {
                println!("{}", lex);
            }
            println!("=== DELIMITERS ===");
            for lex in tables.delimiters() {
                println!("{}", lex);
            }
        }
        Commands::Parse { input } => {
            let source = std::fs::read_to_string(&input)?;
            let mut compiler = Compiler::new();
            let (program, log) = compiler.parse(&source)?;

            println!("=== REDUCTIONS ===");
            for reduction in &log {
                let covered: Vec<&str> =
                    reduction.tokens().iter().map(|l| l.value()).collect();
                println!("{:14} {}", reduction.rule(), covered.join(" "));
            }
            println!("=== AST ===");
            println!("{:#?}", program);
        }
    }

    Ok(())
}
