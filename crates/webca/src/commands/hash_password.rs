//! Hash-password command - prints the SHA-256 hex digest for a `[[users]]` entry.

use std::io::BufRead;

use anyhow::{Result, bail};
use clap::Args;

use super::Context;

/// Arguments for the hash-password command.
#[derive(Args, Debug)]
pub struct HashPasswordArgs {
    /// Password to hash (read from stdin when omitted)
    pub password: Option<String>,
}

/// Run the hash-password command.
pub fn run(args: HashPasswordArgs, ctx: &Context) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => {
            if ctx.verbose {
                eprintln!("Reading password from stdin");
            }
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        bail!("password must not be empty");
    }

    println!("{}", webca_server::hash_password(&password));
    Ok(())
}
