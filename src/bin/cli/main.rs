//! Scancom command line interface.

mod keyboard;
mod ports;

use std::{process, time::Duration};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_t, App, AppSettings::*, Arg,
    ArgMatches, SubCommand,
};
use console::style;
use log::{debug, trace, LevelFilter};
use simplelog::*;

use scancom::{
    CancelToken, CommandIntent, ListenerExit, ScannerDriver, ScannerEvent, ScannerMode,
    SerialTransport, SettingsBuilder, DEFAULT_PATH,
};

/// How long a key press is waited for between two rounds of event printing.
const KEY_POLL: Duration = Duration::from_millis(100);

fn main() {
    println!("[SC] scancom v{}", crate_version!());

    // Cancels whatever command is in progress; the listen loop and pending
    // sends check it.
    let interrupted = CancelToken::new();
    let handler_token = interrupted.clone();
    ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        handler_token.cancel();
    })
    .expect("Failed to install the Ctrl-C handler!");

    let mode_values = &["default", "continuous"];
    let matches = App::new(crate_name!())
        .version(format!("v{}", crate_version!()).as_str())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "\n\
            Scancom talks to a barcode scanner over a serial line (9600 baud, \
            8N1). It can switch the scan engine on and off, change the capture \
            mode, restore the factory configuration, and print the barcodes \
            the scanner reads.\n\
            \n\
            Every command waits for the scanner to answer with ACK (accepted), \
            NAK (bad command or out of range parameters) or ENQ (bad command) \
            and reports the answer.\
        ",
        )
        .max_term_width(80)
        .setting(ColoredHelp)
        .setting(NextLineHelp)
        .setting(SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("DEVICE_TTY")
                .help("the tty device the scanner is connected to")
                .long_help(
                    "the tty device the scanner is connected to; defaults to \
                     `/dev/serial0`, the primary UART of a Raspberry Pi.",
                )
                .short("t")
                .long("tty")
                .takes_value(true)
                .require_equals(true)
                .conflicts_with("SELECT"),
        )
        .arg(
            Arg::with_name("SELECT")
                .help("interactively select the serial port to use")
                .long("select"),
        )
        .arg(
            Arg::with_name("WAIT_MS")
                .help("how long to wait for the scanner's response, in milliseconds")
                .short("w")
                .long("wait-ms")
                .takes_value(true)
                .default_value("1000")
                .require_equals(true),
        )
        .arg(Arg::with_name("v").short("v").multiple(true).help(
            "Sets the logging level of verbosity, repeat several times for \
                higher verbosity",
        ))
        .subcommand(SubCommand::with_name("ports").about("list the serial ports on this system"))
        .subcommand(SubCommand::with_name("activate").about("turn the scan engine on"))
        .subcommand(SubCommand::with_name("deactivate").about("turn the scan engine off"))
        .subcommand(
            SubCommand::with_name("mode")
                .about("switch the capture mode")
                .arg(
                    Arg::with_name("MODE")
                        .help("`default` (single shot on trigger) or `continuous`")
                        .possible_values(mode_values)
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("factory-reset")
                .about("restore the scanner's factory configuration"),
        )
        .subcommand(
            SubCommand::with_name("listen")
                .about("print barcodes as they are scanned (ESC to stop)")
                .arg(
                    Arg::with_name("ACTIVATE")
                        .help("turn the scan engine on while listening")
                        .long("activate"),
                )
                .arg(
                    Arg::with_name("MODE")
                        .help("capture mode to apply before listening")
                        .long("mode")
                        .takes_value(true)
                        .possible_values(mode_values)
                        .require_equals(true),
                ),
        )
        .get_matches();

    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'scancom -v -v -v' or 'scancom -vvv' vs 'scancom -v'
    let log_level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("Failed to initialize the terminal logger!");

    trace!("{:#?}", matches);

    if let ("ports", _) = matches.subcommand() {
        ports::list_ports();
        process::exit(0);
    }

    let wait_ms = value_t!(matches.value_of("WAIT_MS"), u64).unwrap_or_else(|_| {
        println!(
            "{}: `{}` needs to be a numeric value",
            style("error").red(),
            style("wait-ms").cyan()
        );
        process::exit(-1);
    });

    let path = if matches.is_present("SELECT") {
        match ports::select_port() {
            Some(path) => path,
            None => {
                println!("❌ No port selected");
                process::exit(1);
            }
        }
    } else {
        matches
            .value_of("DEVICE_TTY")
            .unwrap_or(DEFAULT_PATH)
            .to_owned()
    };

    let settings = SettingsBuilder::new().path(path).finalize();
    let mut driver = ScannerDriver::serial(settings);

    let result = match matches.subcommand() {
        ("listen", Some(sub)) => listen(&mut driver, sub, &interrupted),
        (name, sub) => match intent_for(name, sub) {
            Some(intent) => {
                one_shot(&mut driver, intent, Duration::from_millis(wait_ms), &interrupted)
            }
            None => unreachable!("unknown subcommand `{}`", name),
        },
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            println!("{} {}", style("[SC] 💥").red(), e);
            1
        }
    };
    debug!("exit code: {}", exit_code);
    process::exit(exit_code);
}

fn intent_for(name: &str, sub: Option<&ArgMatches>) -> Option<CommandIntent> {
    match name {
        "activate" => Some(CommandIntent::ActivateEngine),
        "deactivate" => Some(CommandIntent::DeactivateEngine),
        "factory-reset" => Some(CommandIntent::FactoryReset),
        "mode" => sub
            .and_then(|sub| sub.value_of("MODE"))
            .and_then(|mode| mode.parse::<ScannerMode>().ok())
            .map(CommandIntent::SetMode),
        _ => None,
    }
}

/// Connect, send one command, report the scanner's answer and disconnect.
fn one_shot(
    driver: &mut ScannerDriver<SerialTransport>,
    intent: CommandIntent,
    wait: Duration,
    interrupted: &CancelToken,
) -> scancom::Result<i32> {
    let events = driver.subscribe();
    driver.connect()?;
    match intent {
        CommandIntent::SetMode(mode) => driver.set_mode(mode, interrupted)?,
        _ => driver.send(intent, interrupted)?,
    }

    let code = match events.wait_for_response(wait) {
        Some(response) if response.is_ack() => {
            println!("[SC] 👍 {}: {}", intent, style(response).green());
            0
        }
        Some(response) => {
            println!(
                "[SC] 🙁 {}: {} ({})",
                intent,
                style(response).red(),
                response.describe()
            );
            1
        }
        None => {
            println!(
                "[SC] ⌛ {}: no response within {}",
                intent,
                style(format!("{:?}", wait)).dim()
            );
            1
        }
    };

    driver.disconnect()?;
    Ok(code)
}

/// Print barcodes and responses until the user presses `ESC` or `Ctrl+C`, or
/// the serial line fails.
fn listen(
    driver: &mut ScannerDriver<SerialTransport>,
    sub: &ArgMatches,
    interrupted: &CancelToken,
) -> scancom::Result<i32> {
    let events = driver.subscribe();
    driver.connect()?;

    if let Some(mode) = sub.value_of("MODE") {
        driver.set_mode(mode.parse()?, interrupted)?;
    }
    let activate = sub.is_present("ACTIVATE");
    if activate {
        driver.activate_engine(interrupted)?;
    }

    let pb = ports::spinner();
    pb.set_message(format!(
        "Listening on {} (ESC to stop)...",
        style(&driver.transport().settings().path).cyan()
    ));

    let mut scanned: usize = 0;
    loop {
        while let Some(event) = events.try_recv() {
            match event {
                ScannerEvent::Barcode(barcode) => {
                    scanned += 1;
                    pb.println(format!("{}", style(barcode).green()));
                }
                ScannerEvent::Response(response) => pb.println(format!(
                    "[SC] {} {}",
                    style(response).cyan(),
                    style(response.describe()).dim()
                )),
            }
        }

        if interrupted.is_cancelled() || !driver.listener_running() {
            break;
        }
        match keyboard::poll_stop_key(KEY_POLL) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => debug!("keyboard poll error: {}", e),
        }
    }
    pb.finish_with_message(format!("{} barcode(s) scanned", scanned));

    if activate && driver.listener_running() {
        // The user may already have cancelled `interrupted`.
        if let Err(e) = driver.deactivate_engine(&CancelToken::new()) {
            println!("{} {}", style("[SC] 🙁 failed to deactivate the engine:").yellow(), e);
        }
    }

    match driver.disconnect()? {
        Some(ListenerExit::ReadFailed(kind)) => {
            println!(
                "{}",
                style(format!("[SC] 💥 Serial line failed ({:?})!", kind)).red()
            );
            println!("[SC] 🔌 Check the scanner connection!");
            Ok(1)
        }
        _ => Ok(0),
    }
}
