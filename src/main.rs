use clap::Parser;
use std::process::ExitCode;
use vanilla_lint::{
    CliArgs, LintConfig, LintReport, LoggingConfig, RuleRegistry, Verdict, init_logging,
    rule_table, run, write_report,
};

const EXIT_FAIL: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let _guard = match init_logging(LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    if cli.list_rules {
        print!("{}", rule_table(&RuleRegistry::with_all_rules()));
        return ExitCode::SUCCESS;
    }

    if cli.print_schema {
        let schema = schemars::schema_for!(LintReport);
        return match serde_json::to_string_pretty(&schema) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    match lint(cli).await {
        Ok(Verdict::Pass) => ExitCode::SUCCESS,
        Ok(Verdict::Fail) => ExitCode::from(EXIT_FAIL),
        Err(err) => {
            tracing::error!(error = %err, "lint run failed");
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn lint(cli: CliArgs) -> anyhow::Result<Verdict> {
    let config = LintConfig::from_args(cli)?;
    let format = config.format;
    let output = config.output.clone();

    let report = run(config).await?;
    write_report(&report, format, output.as_deref())?;
    Ok(report.verdict)
}
