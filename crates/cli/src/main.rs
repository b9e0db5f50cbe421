use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use schema_ld_core::fetch::{FsFetcher, TextFetcher};
use schema_ld_core::Mapping;
use schema_ld_expansion::{parse_yaml, resolve_ref, yaml_to_string, Loader};

#[derive(Parser)]
#[clap(name = "schema-ld", author, version, about, long_about = None)]
struct Args {
	/// Sets the level of verbosity.
	#[clap(short, long = "verbose", action = clap::ArgAction::Count)]
	verbosity: u8,

	#[clap(subcommand)]
	command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
	/// Download the raw text behind a URL.
	Fetch { url: String },

	/// Resolve a reference: imports, includes, mixins, identifiers, and
	/// URL fields are all expanded and, unless `--no-link-check` is given,
	/// cross-checked against the resolved document.
	Resolve {
		/// URL or local path of the document to resolve.
		reference: UrlOrPath,

		/// Base URL used to resolve a relative reference.
		#[clap(short, long)]
		base: Option<String>,

		/// URL or local path of a context document to compile before
		/// resolving. Defaults to an empty context.
		#[clap(long)]
		context: Option<UrlOrPath>,

		/// Skip the link-validation pass.
		#[clap(long)]
		no_link_check: bool,
	},
}

#[derive(Clone)]
enum UrlOrPath {
	Url(String),
	Path(PathBuf),
}

impl FromStr for UrlOrPath {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.contains("://") {
			Ok(Self::Url(s.to_string()))
		} else {
			Ok(Self::Path(PathBuf::from(s)))
		}
	}
}

impl UrlOrPath {
	fn to_url(&self) -> String {
		match self {
			Self::Url(u) => u.clone(),
			Self::Path(p) => {
				let absolute = std::fs::canonicalize(p).unwrap_or_else(|_| p.clone());
				format!("file://{}", absolute.display())
			}
		}
	}
}

#[cfg(feature = "reqwest")]
fn default_fetcher() -> impl TextFetcher {
	schema_ld_core::fetch::ChainFetcher::new(FsFetcher::new(), schema_ld_core::fetch::HttpFetcher::new())
}

#[cfg(not(feature = "reqwest"))]
fn default_fetcher() -> impl TextFetcher {
	FsFetcher::new()
}

fn main() {
	let args = Args::parse();
	stderrlog::new().verbosity(args.verbosity as usize).init().unwrap();

	match args.command {
		Command::Fetch { url } => {
			let loader = Loader::new(default_fetcher(), &Mapping::new()).unwrap_or_else(|e| fail(&e));
			match loader.fetch_text(&url) {
				Ok(text) => print!("{text}"),
				Err(e) => fail(&e),
			}
		}
		Command::Resolve { reference, base, context, no_link_check } => {
			let context_mapping = match context {
				Some(c) => {
					let text = default_fetcher().fetch_text(&c.to_url()).unwrap_or_else(|e| fail(&e));
					match parse_yaml(&text).unwrap_or_else(|e| fail(&e)) {
						schema_ld_syntax::Node::Mapping(m) => m,
						_ => {
							eprintln!("error: context document must be a mapping");
							std::process::exit(1);
						}
					}
				}
				None => Mapping::new(),
			};

			let mut loader = Loader::new(default_fetcher(), &context_mapping).unwrap_or_else(|e| fail(&e));

			let reference_url = reference.to_url();
			let base_url = base.unwrap_or_else(|| reference_url.clone());

			let node = schema_ld_syntax::Node::String(reference_url);
			match resolve_ref(&mut loader, node, &base_url, !no_link_check) {
				Ok((resolved, _)) => match yaml_to_string(&resolved) {
					Ok(text) => print!("{text}"),
					Err(e) => fail(&e),
				},
				Err(e) => fail(&e),
			}
		}
	}
}

fn fail<E: std::fmt::Display, T>(e: &E) -> T {
	eprintln!("error: {e}");
	std::process::exit(1);
}
