use std::path::PathBuf;

use beet_idl_renderer::RenderConfig;
use beet_idl_renderer::RenderError;
use beet_idl_renderer::idl::client_dir;
use beet_idl_renderer::idl::discover_idl_files;
use beet_idl_renderer::render_idl_file;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
	name = "beet_idl_renderer",
	about = "Generate beet TypeScript clients from Anchor and Shank IDLs"
)]
struct Args {
	/// An IDL JSON file. Can be provided multiple times.
	#[arg(long = "idl")]
	idls: Vec<PathBuf>,

	/// A directory whose `*.json` files are all rendered.
	#[arg(long = "idl-dir")]
	idl_dir: Option<PathBuf>,

	/// Root output directory; each IDL is written to `<output>/<idl stem>/`.
	#[arg(long)]
	output: PathBuf,

	/// Optional JSON render configuration.
	#[arg(long)]
	config: Option<PathBuf>,
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	if let Err(error) = run() {
		eprintln!("{error}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), RenderError> {
	let args = Args::parse();
	let idl_paths = discover_idl_files(&args.idls, args.idl_dir.as_deref())?;
	let config = match &args.config {
		Some(path) => RenderConfig::from_file(path)?,
		None => RenderConfig::default(),
	};

	for idl_path in &idl_paths {
		let generated = render_idl_file(idl_path, &client_dir(idl_path, &args.output)?, &config)?;
		for failure in &generated.failures {
			tracing::warn!(idl = %idl_path.display(), entity = %failure.entity, error = %failure.error, "entity skipped");
		}
	}

	Ok(())
}
