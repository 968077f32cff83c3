mod config;
mod terminal;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use entity::EmployeeId;
use platform_api::{EmployeeApi, EmployeeClient};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{DeleteOutcome, EmployeesController, HrError, HrResult, Notifier};
use tracing::debug;

use crate::{
    config::ConsoleConfig,
    terminal::{TerminalNotifier, render_field_errors, render_table},
};

#[derive(Parser, Debug)]
#[command(name = "hr-console", version, about = "Employee directory console")]
struct Cli {
    /// API base URL; `/Employees` is appended. Falls back to API_URL.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[arg(short, long, global = true, help = "Log HTTP calls to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every employee.
    List,
    /// Show one employee's details.
    View { id: EmployeeId },
    /// Add a new employee.
    Add(FieldArgs),
    /// Edit an employee; fields not given keep their current value.
    Edit {
        id: EmployeeId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an employee after confirmation.
    Delete {
        id: EmployeeId,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    salary: Option<f64>,
}

impl FieldArgs {
    fn apply<C: EmployeeApi, N: Notifier>(self, controller: &EmployeesController<C, N>) {
        if let Some(name) = self.name {
            controller.set_name(name);
        }
        if let Some(email) = self.email {
            controller.set_email(email);
        }
        if let Some(department) = self.department {
            controller.set_department(department);
        }
        if let Some(salary) = self.salary {
            controller.set_salary(Some(salary));
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(ObsConfig::console().verbose(cli.verbose))?;

    let config = ConsoleConfig::load(cli.api_url)?;
    let client = EmployeeClient::new(&config.api_url)
        .with_context(|| format!("cannot use API url {}", config.api_url))?;
    debug!(url = %client.collection_url(), "using employee API");

    let auto_confirm = matches!(cli.command, Command::Delete { yes: true, .. });
    let controller = EmployeesController::new(client, TerminalNotifier::stdout(auto_confirm));
    Ok(exit_code(run(&controller, cli.command).await))
}

async fn run<C: EmployeeApi, N: Notifier>(
    controller: &EmployeesController<C, N>,
    command: Command,
) -> HrResult<bool> {
    match command {
        Command::List => {
            controller.load_all().await?;
            print!("{}", render_table(&controller.employees()));
            Ok(true)
        }
        Command::View { id } => {
            let employee = controller.find(id).await?;
            controller.view(&employee);
            Ok(true)
        }
        Command::Add(fields) => {
            fields.apply(controller);
            controller.submit().await?;
            Ok(true)
        }
        Command::Edit { id, fields } => {
            let employee = controller.find(id).await?;
            controller.select_for_edit(&employee);
            fields.apply(controller);
            controller.submit().await?;
            Ok(true)
        }
        Command::Delete { id, .. } => {
            let employee = controller.find(id).await?;
            let outcome = controller.confirm_delete(&employee).await?;
            if outcome == DeleteOutcome::Declined {
                println!("Cancelled.");
            }
            Ok(outcome == DeleteOutcome::Deleted)
        }
    }
}

/// Failures were already shown by the notifier; only validation needs output here.
fn exit_code(result: HrResult<bool>) -> ExitCode {
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(HrError::Invalid(errors)) => {
            eprintln!("Employee not saved:");
            eprint!("{}", render_field_errors(&errors.0));
            ExitCode::from(2)
        }
        Err(err) => {
            debug!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_edit_overrides() {
        let cli = Cli::try_parse_from([
            "hr-console",
            "--api-url",
            "http://hr.local/api",
            "edit",
            "7",
            "--salary",
            "-3",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://hr.local/api"));
        let Command::Edit { id, fields } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(id, EmployeeId(7));
        assert_eq!(fields.salary, Some(-3.0));
        assert!(fields.name.is_none());
    }

    #[test]
    fn cli_rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["hr-console", "view", "seven"]).is_err());
    }

    #[test]
    fn delete_yes_flag_is_parsed() {
        let cli = Cli::try_parse_from(["hr-console", "delete", "3", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Delete { id: EmployeeId(3), yes: true }));
    }
}
