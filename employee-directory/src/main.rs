#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
//! Command-line driver for the employee directory.
//!
//! Signs in with the configured account, passes the session gate, loads the
//! directory and prints it as JSON. `add` submits one record first.
//!
//! # Examples
//! ```sh
//! DIRECTORY_FIREBASE_API_KEY=... DIRECTORY_FIREBASE_PROJECT_ID=... \
//! DIRECTORY_EMAIL=admin@example.com DIRECTORY_PASSWORD=... \
//!   employee-directory add --name Ada --department R&D --position Analyst \
//!   --employee-id 1815 --phone 5551234
//! ```

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use employee_directory::config::DirectorySettings;
use employee_directory::domain::ports::{
    Authenticator, EmployeeStore, FIXTURE_EMAIL, FIXTURE_PASSWORD, FixtureEmployeeStore,
    FixtureSessionProvider, SessionProvider, TracingNavigator,
};
use employee_directory::domain::{
    EmployeeField, FieldErrors, FormField, LoadStatus, SessionGate, SignInCredentials,
    SignInField, SignInForm, SubmitOutcome,
};
use employee_directory::outbound::firebase_auth::FirebaseAuthSession;
use employee_directory::outbound::firestore::FirestoreEmployeeStore;

/// `employee-directory` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "employee-directory",
    about = "List and add employee records in a Firestore-backed directory",
    version
)]
struct Cli {
    /// Use in-memory fixtures instead of Firebase.
    #[arg(long, global = true)]
    fixtures: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every employee record.
    List,
    /// Submit one employee record, then print the directory.
    Add(AddArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Full name.
    #[arg(long)]
    name: String,
    /// Department.
    #[arg(long)]
    department: String,
    /// Position or title.
    #[arg(long)]
    position: String,
    /// Employee number.
    #[arg(long = "employee-id", value_name = "id")]
    employee_id: String,
    /// Phone number.
    #[arg(long)]
    phone: String,
}

impl AddArgs {
    fn values(&self) -> [(EmployeeField, &str); 5] {
        [
            (EmployeeField::Name, self.name.as_str()),
            (EmployeeField::Department, self.department.as_str()),
            (EmployeeField::Position, self.position.as_str()),
            (EmployeeField::EmployeeId, self.employee_id.as_str()),
            (EmployeeField::Phone, self.phone.as_str()),
        ]
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = DirectorySettings::load_from_iter([OsString::from("employee-directory")])
        .map_err(|error| eyre!("failed to load directory settings: {error}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build directory runtime")?;
    runtime.block_on(run(cli, settings))
}

async fn run(cli: Cli, settings: DirectorySettings) -> Result<()> {
    if cli.fixtures {
        let credentials = settings
            .credentials()
            .unwrap_or_else(|_| SignInCredentials::new(FIXTURE_EMAIL, FIXTURE_PASSWORD));
        let session = Arc::new(FixtureSessionProvider::signed_out());
        let store = Arc::new(FixtureEmployeeStore::default());
        return drive(cli.command, session, store, credentials).await;
    }

    let session = Arc::new(FirebaseAuthSession::new(
        &settings.auth_base_url()?,
        settings.firebase_api_key()?,
    )?);
    let store = FirestoreEmployeeStore::new(
        &settings.firestore_base_url()?,
        settings.firebase_project_id()?,
        settings.collection(),
    )?
    .with_id_token(session.id_token());
    drive(cli.command, session, Arc::new(store), settings.credentials()?).await
}

async fn drive<P, S>(
    command: Command,
    session: Arc<P>,
    store: Arc<S>,
    credentials: SignInCredentials,
) -> Result<()>
where
    P: SessionProvider + Authenticator,
    S: EmployeeStore,
{
    let sign_in = SignInForm::new(Arc::clone(&session), TracingNavigator);
    sign_in.set_field(SignInField::Email, credentials.email());
    sign_in.set_field(SignInField::Password, credentials.password());
    match sign_in.submit().await? {
        SubmitOutcome::Persisted(_) => {}
        SubmitOutcome::Rejected(errors) => {
            return Err(eyre!("configured credentials are invalid: {}", describe(&errors)));
        }
        SubmitOutcome::AlreadySubmitting => return Err(eyre!("sign-in already in progress")),
    }

    let gate = SessionGate::mount(session, TracingNavigator);
    gate.resolve().await;
    let dashboard = gate
        .admit(store)
        .await
        .ok_or_else(|| eyre!("session was not admitted"))?;
    if let LoadStatus::Failed(error) = dashboard.directory().load_status() {
        return Err(error.into());
    }

    if let Command::Add(args) = command {
        for (field, value) in args.values() {
            dashboard.set_field(field, value);
        }
        match dashboard.submit().await? {
            SubmitOutcome::Persisted(stored) => info!(document_id = %stored.id(), "record added"),
            SubmitOutcome::Rejected(errors) => {
                return Err(eyre!("record rejected: {}", describe(&errors)));
            }
            SubmitOutcome::AlreadySubmitting => return Err(eyre!("submit already in progress")),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &dashboard.directory().snapshot())
        .wrap_err("failed to encode directory")?;
    writeln!(out).wrap_err("failed to write directory")?;
    gate.teardown();
    Ok(())
}

fn describe<F: FormField>(errors: &FieldErrors<F>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.name()))
        .collect::<Vec<_>>()
        .join(", ")
}
