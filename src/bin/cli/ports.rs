//! Interactive serial port selection.

use std::{thread, time::Duration};

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use scancom::transport::available_ports;

pub(crate) fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            // For more spinners check out the cli-spinners project:
            // https://github.com/sindresorhus/cli-spinners/blob/master/spinners.json
            .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
            .template("[SC] {spinner:.blue} {msg}"),
    );
    pb
}

/// Wait until at least one serial port shows up, then let the user pick one.
/// Returns `None` when the user cancels the selection with `ESC`.
pub(crate) fn select_port() -> Option<String> {
    let mut found_ports;
    let mut attempt: u64 = 1;
    let waiting_period: u64 = 1;

    let pb = spinner();
    loop {
        found_ports = available_ports();
        if !found_ports.is_empty() {
            pb.finish_with_message("Select the scanner port:");
            break;
        }
        pb.set_message(format!(
            "[{:03}s] ⌛ Waiting for a serial port to show up...",
            style(attempt * waiting_period).dim()
        ));
        attempt += 1;
        thread::sleep(Duration::from_secs(waiting_period));
    }

    let term = Term::buffered_stderr();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .items(&found_ports)
        .default(0)
        .interact_on_opt(&term);

    match selection {
        Ok(Some(index)) => found_ports[index].split(':').next().map(String::from),
        Ok(None) => None,
        Err(ref e) => {
            info!("error: {}", e);
            None
        }
    }
}

/// Print the serial ports found on the system, one per line.
pub(crate) fn list_ports() {
    let ports = available_ports();
    if ports.is_empty() {
        println!("[SC] no serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
}
