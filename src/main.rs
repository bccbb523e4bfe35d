//! jailparam - FreeBSD jail front end
//!
//! Creates, updates, looks up and removes jails through jail_set(2) and
//! jail_get(2).

mod cli;

use cli::{Cli, Commands};
use jailparam::jail::names;
use jailparam::{Error, Jails, Param, Result, manifest};

use std::os::unix::process::CommandExt;
use std::process::Command;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        report(&e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "jailparam=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error on stderr, tagged with its kind
fn report(e: &Error) {
    match e {
        Error::Jail(msg) => eprintln!("jailparam: errmsg: {}", msg),
        Error::Syscall(err) => eprintln!("jailparam: syscall: {}", err),
        other => eprintln!("jailparam: {}", other),
    }
}

fn run(cli: Cli) -> Result<()> {
    let jails = Jails::system();

    match cli.command {
        Commands::Create {
            name,
            hostname,
            path,
            securelevel,
            ipaddr,
        } => {
            let params = vec![
                Param::string(names::NAME, &name)?,
                Param::string(names::HOSTNAME, &hostname)?,
                Param::string(names::PATH, &path)?,
                Param::string(names::PERSIST, "")?,
                Param::int(names::SECURELEVEL, securelevel)?,
                Param::ip(&ipaddr)?,
            ];
            let jid = jails.create(&params)?;
            println!("Created jail with ID: {}", jid);
        }
        Commands::Apply { file } => {
            let manifest = manifest::load(&file)?;
            let jid = jails.create(&manifest.to_params()?)?;
            println!("Created jail '{}' with ID: {}", manifest.name, jid);
        }
        Commands::Update {
            name,
            hostname,
            securelevel,
            ipaddr,
        } => {
            let params = vec![
                Param::string(names::NAME, &name)?,
                Param::string(names::HOSTNAME, &hostname)?,
                Param::int(names::SECURELEVEL, securelevel)?,
                Param::ip(&ipaddr)?,
            ];
            let jid = jails.update(&params)?;
            println!("Updated jail with ID: {}", jid);
        }
        Commands::Remove { jail } => {
            let jid = resolve(&jails, &jail)?;
            jails.remove(jid)?;
            println!("Removed jail with ID: {}", jid);
        }
        Commands::Lookup { jail, json } => {
            let jid = jails.lookup_id(&jail)?;
            let name = match jid {
                0 => String::new(),
                jid => jails.lookup_name(jid)?,
            };
            if json {
                let out = serde_json::json!({ "jid": jid, "name": name });
                println!("{}", out);
            } else {
                println!("{}\t{}", jid, name);
            }
        }
        Commands::Attach { jail, command } => {
            let Some((program, args)) = command.split_first() else {
                return Err(Error::ConfigValidation("attach needs a command".into()));
            };
            let jid = resolve(&jails, &jail)?;
            jails.attach(jid)?;
            // exec only returns on failure
            let err = Command::new(program).args(args).exec();
            return Err(Error::Io(err));
        }
        Commands::Completion { shell } => {
            Cli::generate_completion(shell);
        }
    }

    Ok(())
}

/// Resolve a name or ID to a running jail, refusing the host (jid 0)
fn resolve(jails: &Jails, jail: &str) -> Result<i32> {
    match jails.lookup_id(jail)? {
        0 => Err(Error::NotFound),
        jid => Ok(jid),
    }
}
