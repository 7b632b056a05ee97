//! wmiq CLI - query the management service with SQL-like strings

use clap::Parser;
use wmiq::cli::{Args, SubCommand};
use wmiq::parser::parse_filter;
use wmiq::{
    build_query, format_explain, format_output, parse_query, BatchRunner, ExecutionContext,
    OutputFormat, QueryExecutor,
};

fn main() {
    let args = Args::parse();
    wmiq::logging::init_stderr_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let ctx = ExecutionContext {
        output_format: if args.json { OutputFormat::Json } else { OutputFormat::Human },
        verbose: args.verbose,
    };
    let connection = args.connection.to_connection_args();

    match args.command {
        SubCommand::Query { query } => {
            let parsed = parse_query(&query)?;
            let executor = QueryExecutor::new();
            match executor.execute_parsed(&parsed, &connection) {
                Ok(records) => {
                    println!("{}", format_output(&parsed.columns, &records, &ctx.output_format));
                    Ok(())
                }
                Err(failure) => {
                    if !failure.partial.is_empty() {
                        println!("{}", format_output(&parsed.columns, &failure.partial, &ctx.output_format));
                    }
                    Err(failure.error.into())
                }
            }
        }

        SubCommand::Run { file } => {
            let executor = QueryExecutor::new();
            let stdout = std::io::stdout();
            let mut runner = BatchRunner::new(&executor, &connection, ctx.clone(), stdout.lock());
            let result = runner
                .run_file(&file)
                .map_err(|e| anyhow::anyhow!("failed to run batch {}: {}", file.display(), e))?;

            if let Some(err) = result.error {
                anyhow::bail!(err);
            }
            if ctx.verbose {
                eprintln!("--- Batch completed: {} queries executed ---", result.statements_executed);
            }
            Ok(())
        }

        SubCommand::Explain { query } => {
            let parsed = parse_query(&query)?;
            println!("{}", format_explain(&parsed, &ctx.output_format));
            Ok(())
        }

        SubCommand::Build { class, columns, filters } => {
            let filters = filters
                .iter()
                .map(String::as_str)
                .map(parse_filter)
                .collect::<wmiq::Result<Vec<_>>>()?;
            println!("{}", build_query(&class, &columns, &filters)?);
            Ok(())
        }
    }
}
