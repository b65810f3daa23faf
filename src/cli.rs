use std::path::PathBuf;

use clap::Parser;

/// Normalize the audience and authorities of an access token and print the
/// resulting authentication as JSON.
///
/// The token is NOT verified: feed it tokens that were already accepted.
#[derive(Parser, Debug)]
#[command(name = "claims-normalizer", version, about)]
pub struct Args {
    /// Claim set (JSON object) or, with --jwt, a compact JWT. `-` or omitted reads stdin.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Treat the input as a compact JWT and read its payload
    #[arg(long, default_value_t = false)]
    pub jwt: bool,

    /// Print single-line JSON
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

impl Args {
    pub fn reads_stdin(&self) -> bool {
        match &self.input {
            None => true,
            Some(path) => path.as_os_str() == "-",
        }
    }
}
