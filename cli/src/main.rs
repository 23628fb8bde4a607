use std::io::Read;

use serde::Deserialize;

use structopt::StructOpt;

use sparkpost_mailer::config;
use sparkpost_mailer::suppression;
use sparkpost_mailer::{Client, HeaderSet, Mailer, Outcome, Recipients, SparkpostMailer};

mod error;

use error::Error;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sparkpost-mailer",
    about = "Delivers outbound CRM mail through the SparkPost API."
)]
struct Opt {
    /// Config file (defaults to /etc/sparkpost/sparkpost.toml if present)
    #[structopt(short, long)]
    config: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Send one message, read as JSON from stdin
    Send,

    /// Sync the suppression list after a contact email was edited
    EmailEdit {
        #[structopt(short, long)]
        email: String,

        /// The stored email was on hold before the edit
        #[structopt(long)]
        was_on_hold: bool,

        /// The edit keeps (or puts) the email on hold
        #[structopt(long)]
        on_hold: bool,
    },
}

/// Send request as written by the host mail pipeline
#[derive(Debug, Deserialize)]
struct SendRequest {
    recipients: Recipients,
    headers: HeaderSet,
    body: String,
}

fn send(settings: &config::Settings) -> Result<(), Error> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let request: SendRequest = serde_json::from_str(&input)?;

    let mailer = SparkpostMailer::from_settings(settings)?;

    match mailer.send(&request.recipients, request.headers, &request.body)? {
        Outcome::Sent(resp) => println!("{}", resp),
        Outcome::Logged => log::info!("Mail logged, not sent"),
    }

    Ok(())
}

fn email_edit(settings: &config::Settings, email: &str, was_on_hold: bool, on_hold: bool) -> Result<(), Error> {
    let client = Client::from_settings(settings)?;

    let transition = suppression::observe_pre_edit(was_on_hold, on_hold);
    suppression::handle_post_edit(transition, email, &client);

    Ok(())
}

fn run(opt: Opt) -> Result<(), Error> {
    let settings = config::load_config(opt.config.as_deref())?;

    if let Some(backup) = &settings.backup_mailer {
        log::debug!("Backup mailer configured: {}", backup);
    }

    match opt.cmd {
        Command::Send => send(&settings),
        Command::EmailEdit {
            email,
            was_on_hold,
            on_hold,
        } => email_edit(&settings, &email, was_on_hold, on_hold),
    }
}

fn main() {
    // Init logger
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();

    if let Err(e) = run(opt) {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}
