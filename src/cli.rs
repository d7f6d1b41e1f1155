use clap::{crate_authors, crate_description, crate_version, value_parser, Arg, ArgAction, Command};
use pretty_env_logger::env_logger::Builder;
use std::env;
use std::io::Write;
use std::process::exit;
use std::time::Duration;

use linode_dynamic_dns::discovery::HttpAddressSource;
use linode_dynamic_dns::linode::LinodeClient;
use linode_dynamic_dns::service::Reconciler;
use linode_dynamic_dns::Config;

fn set_logger_level(b: &mut Builder) {
    let mut b = b;
    if env::var("RUST_LOG").is_err() {
        b = b.filter_level(log::LevelFilter::Info)
    }
    b.init();
}

fn setup_logger() {
    // journald reads the <N> prefix as the priority.
    match std::env::var("RUST_LOG_STYLE") {
        Ok(s) if s == "SYSTEMD" => {
            let builder = &mut pretty_env_logger::env_logger::builder();
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "<{}>{}: {}",
                    match record.level() {
                        log::Level::Error => 3,
                        log::Level::Warn => 4,
                        log::Level::Info => 6,
                        log::Level::Debug => 7,
                        log::Level::Trace => 7,
                    },
                    record.target(),
                    record.args()
                )
            });
            set_logger_level(builder);
        }
        _ => {
            let builder = &mut pretty_env_logger::formatted_builder();
            set_logger_level(builder);
        }
    };
}

pub(crate) fn main() {
    let cli = Command::new("linode-dynamic-dns")
        .about(format!(
            "{}\n{} {}",
            crate_description!(),
            "Configuration is read from the DOMAIN, HOST, TOKEN,",
            "IPV4_URL and IPV6_URL environment variables.",
        ))
        .arg(
            Arg::new("sleep")
                .short('s')
                .long("sleep")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Run continuously and sleep the specified number of seconds between passes"),
        )
        .arg(
            Arg::new("check")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("test")
                .help("Check the configuration"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .long("dry-run")
                .help("Show changes without applying them"),
        )
        .version(crate_version!())
        .author(crate_authors!("\n"));

    let args = cli.get_matches();

    setup_logger();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(err) => {
            println!("Error: {err}");
            exit(err.exit_code());
        }
    };

    if args.get_flag("check") {
        tracing::info!(
            domain = config.domain.as_str(),
            hosts = config.hosts().len(),
            "Configuration is valid."
        );
        exit(0);
    }

    let client = LinodeClient::from(&config);
    let addresses = HttpAddressSource::from(&config);
    let interval = args.get_one::<u64>("sleep").copied().map(Duration::from_secs);

    let result = Reconciler::new(&config, &client, &addresses)
        .dry_run(args.get_flag("dry-run"))
        .run(interval);

    if let Err(err) = result {
        println!("Error: {err}");
        exit(err.exit_code());
    }
}
