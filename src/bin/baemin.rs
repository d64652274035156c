//! Command line front end: link an account, list entries, and print saved addresses.

// std
use std::{
	io::{self, BufRead, Write},
	path::PathBuf,
	sync::Arc,
};
// crates.io
use baemin_integration::{
	auth::{EntryId, LoginMethod},
	flows::{BaeminClient, Client},
	integration::Integration,
	setup::{FlowResult, SetupFlow},
	store::{EntryStore, FileStore},
};
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::eyre};
use tracing_subscriber::EnvFilter;

const MAX_CODE_ATTEMPTS: usize = 3;

/// Link a Baemin account and read its saved delivery addresses.
#[derive(Debug, Parser)]
#[command(name = "baemin", version, about)]
struct Cli {
	/// JSON file holding linked accounts.
	#[arg(long, env = "BAEMIN_STORE", default_value = "baemin-entries.json", global = true)]
	store: PathBuf,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Link an account through the browser login.
	Login {
		/// Identity provider to sign in with.
		#[arg(long, default_value = "kakao")]
		method: LoginMethod,
	},
	/// List linked accounts.
	Entries,
	/// Fetch and print the saved addresses of an entry.
	Addresses {
		/// Entry to read.
		entry_id: EntryId,
		/// Print the sensors as JSON.
		#[arg(long)]
		json: bool,
	},
	/// Open a member session with an entry's token and print the result.
	Member {
		/// Entry to use.
		entry_id: EntryId,
	},
	/// Delete a linked account.
	Remove {
		/// Entry to delete.
		entry_id: EntryId,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(io::stderr)
		.init();

	let cli = Cli::parse();
	let store: Arc<dyn EntryStore> = Arc::new(FileStore::open(&cli.store)?);
	let client = Arc::new(Client::baemin()?);

	match cli.command {
		Command::Login { method } => login(client, store, method).await,
		Command::Entries => entries(store).await,
		Command::Addresses { entry_id, json } => addresses(client, store, &entry_id, json).await,
		Command::Member { entry_id } => member(&client, store, &entry_id).await,
		Command::Remove { entry_id } => {
			let removed = Integration::new(client, store).remove_entry(&entry_id).await?;

			if removed {
				println!("Removed {entry_id}.");
			} else {
				println!("No entry named {entry_id}.");
			}

			Ok(())
		},
	}
}

async fn login(
	client: Arc<BaeminClient>,
	store: Arc<dyn EntryStore>,
	method: LoginMethod,
) -> Result<()> {
	let mut flow = SetupFlow::new(client, store);

	flow.start();

	let mut result = flow.submit_login_method(method);
	let mut attempts = 0;

	loop {
		match result {
			FlowResult::Form(form) => {
				if let Some(error) = form.base_error() {
					eprintln!("Login failed: {error}.");
				}
				if attempts == MAX_CODE_ATTEMPTS {
					return Err(eyre!("giving up after {MAX_CODE_ATTEMPTS} attempts"));
				}

				let url = form.authorize_url().ok_or_else(|| eyre!("login form has no URL"))?;

				println!("Open this URL, sign in, and paste the code (or the whole redirect URL):");
				println!("{url}");

				attempts += 1;
				result = flow.submit_auth_code(&prompt("code> ")?).await?;
			},
			FlowResult::Abort(reason) => return Err(eyre!("login aborted: {reason}")),
			FlowResult::CreateEntry(entry) => {
				println!("Linked {} as entry {}.", entry.title, entry.entry_id);

				return Ok(());
			},
		}
	}
}

async fn entries(store: Arc<dyn EntryStore>) -> Result<()> {
	let entries = store.list().await?;

	if entries.is_empty() {
		println!("No linked accounts.");
	}

	for entry in entries {
		println!(
			"{}\t{}\t{}\t{}\t{:?}",
			entry.entry_id,
			entry.unique_id,
			entry.title,
			entry.login_method,
			entry.token.status()
		);
	}

	Ok(())
}

async fn addresses(
	client: Arc<BaeminClient>,
	store: Arc<dyn EntryStore>,
	entry_id: &EntryId,
	json: bool,
) -> Result<()> {
	let integration = Integration::new(client, store);
	let sensors = integration.setup_entry(entry_id).await?;

	if json {
		println!("{}", serde_json::to_string_pretty(&sensors)?);

		return Ok(());
	}

	for sensor in sensors {
		println!("[{}] {}: {}", sensor.key, sensor.title(), sensor.native_value);
	}

	Ok(())
}

async fn member(
	client: &BaeminClient,
	store: Arc<dyn EntryStore>,
	entry_id: &EntryId,
) -> Result<()> {
	let entry =
		store.fetch(entry_id).await?.ok_or_else(|| eyre!("no entry named {entry_id}"))?;
	let session = client.login_member(&entry.token).await?;

	println!("status: {}", session.status.as_deref().unwrap_or("-"));
	println!("member: {}", session.member_number().as_deref().unwrap_or("-"));

	Ok(())
}

fn prompt(label: &str) -> Result<String> {
	let mut stdout = io::stdout();

	write!(stdout, "{label}")?;
	stdout.flush()?;

	let mut line = String::new();

	io::stdin().lock().read_line(&mut line)?;

	Ok(line.trim().to_owned())
}
