//! Benefit Illustration CLI
//!
//! Validate a single policy and print its illustration or maturity details

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use benefit_illustration::{
    validation::{validate_login, validate_registration, LoginInput, RegistrationInput},
    Clock, EngineConfig, FixedClock, IllustrationEngine, PolicyInput, PolicyValidation,
    PolicyValidator, ProjectionResult, SystemClock,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(name = "benefit_illustration", version, about = "Policy benefit illustrations")]
struct Cli {
    /// Engine configuration file (JSON); absent keys keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a policy against the business rules
    Validate(PolicyArgs),
    /// Print the year-by-year illustration
    Illustrate(PolicyArgs),
    /// Print maturity benefit, net gain, and return
    Maturity(PolicyArgs),
    /// Check identity-registration details
    Register(RegisterArgs),
    /// Check login credentials are well formed
    Login(LoginArgs),
}

#[derive(Args, Debug)]
struct PolicyArgs {
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    sum_assured: Option<Decimal>,
    /// Premium per installment
    #[arg(long)]
    modal_premium: Option<Decimal>,
    /// Yearly, Half-Yearly, or Monthly
    #[arg(long, default_value = "Yearly")]
    frequency: String,
    /// Policy term in years
    #[arg(long)]
    policy_term: Option<u32>,
    /// Premium paying term in years
    #[arg(long)]
    ppt: Option<u32>,
}

impl From<PolicyArgs> for PolicyInput {
    fn from(args: PolicyArgs) -> Self {
        PolicyInput {
            date_of_birth: args.dob,
            sum_assured: args.sum_assured,
            modal_premium: args.modal_premium,
            premium_frequency: Some(args.frequency),
            policy_term: args.policy_term,
            premium_paying_term: args.ppt,
        }
    }
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
    #[arg(long)]
    dob: Option<String>,
    /// M, F, or Other
    #[arg(long)]
    gender: Option<String>,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let clock = FixedClock(cli.as_of.unwrap_or_else(|| SystemClock.today()));
    let validator = PolicyValidator::with_clock(config.rules.clone(), clock);
    let engine = IllustrationEngine::new(config.illustration.clone());

    match cli.command {
        Command::Validate(args) => {
            let report = validator.validate(&args.into());
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_validation(&report);
            }
            Ok(exit_code(report.is_valid))
        }
        Command::Illustrate(args) => {
            let report = validator.validate(&args.into());
            if !report.is_valid {
                print_validation(&report);
                return Ok(ExitCode::FAILURE);
            }
            let policy = report.into_policy()?;
            let result = engine.project(&policy)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_illustration(&result);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Maturity(args) => {
            let report = validator.validate(&args.into());
            if !report.is_valid {
                print_validation(&report);
                return Ok(ExitCode::FAILURE);
            }
            let policy = report.into_policy()?;
            let details = engine.maturity_details(&policy)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                println!("Maturity Details:");
                println!("  Maturity Age:        {}", details.maturity_age);
                println!("  Maturity Benefit:    {:.2}", details.maturity_benefit);
                println!("  Total Premiums Paid: {:.2}", details.total_premiums_paid);
                println!("  Net Gain:            {:.2}", details.net_gain);
                println!("  Return:              {:.2}%", details.return_percentage);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Register(args) => {
            let input = RegistrationInput {
                name: args.name,
                email: args.email,
                password: args.password,
                mobile: args.mobile,
                date_of_birth: args.dob,
                gender: args.gender,
            };
            let report = validate_registration(&input, &config.rules, &clock);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_valid {
                println!("Registration valid (age {})", report.age.unwrap_or_default());
            } else {
                println!("Registration invalid:");
                for error in &report.errors {
                    println!("  - {}", error);
                }
            }
            Ok(exit_code(report.is_valid))
        }
        Command::Login(args) => {
            let input = LoginInput {
                email: args.email,
                password: args.password,
            };
            let report = validate_login(&input);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_valid {
                println!("Login details valid");
            } else {
                println!("Login details invalid:");
                for error in &report.errors {
                    println!("  - {}", error);
                }
            }
            Ok(exit_code(report.is_valid))
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_validation(report: &PolicyValidation) {
    match report.age {
        Some(age) => println!("Age: {}", age),
        None => println!("Age: -"),
    }
    if report.is_valid {
        println!("Policy inputs are valid");
    } else {
        println!("Policy inputs are invalid:");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
}

fn print_illustration(result: &ProjectionResult) {
    println!("Annual Premium: {:.2}\n", result.annual_premium);

    println!(
        "{:>4} {:>4} {:>12} {:>14} {:>12} {:>14} {:>14} {:>14} {:>14}",
        "Year",
        "Age",
        "Premium",
        "CumPremium",
        "GA",
        "CumGA",
        "TotalBenefit",
        "Surrender",
        "DeathBenefit"
    );
    println!("{}", "-".repeat(112));

    for row in &result.illustrations {
        println!(
            "{:>4} {:>4} {:>12.2} {:>14.2} {:>12.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            row.year,
            row.age,
            row.premium_paid,
            row.cumulative_premium,
            row.guaranteed_addition,
            row.cumulative_guaranteed_addition,
            row.total_benefit,
            row.surrender_value,
            row.death_benefit,
        );
    }

    println!("\nSummary:");
    println!("  Total Premiums Paid:      {:.2}", result.summary.total_premiums_paid);
    println!("  Total Guaranteed Adds:    {:.2}", result.summary.total_guaranteed_additions);
    println!("  Maturity Benefit:         {:.2}", result.summary.maturity_benefit);
}
