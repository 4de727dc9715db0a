use std::time::Duration;

use cardfuzz::{FuzzConfig, FuzzError, Fuzzer, StatusTables};
use cardfuzz_apdu_transport_pcsc::{ConnectStrategy, PcscConfig, PcscConnector, PcscDeviceManager};
use colored::Colorize;
use tracing::info;

use crate::BoxError;
use crate::utils::AtrPattern;

/// Options for a fuzzing run, taken from the command line
#[derive(Debug, Clone)]
pub(crate) struct FuzzOptions {
    pub reader: Option<String>,
    pub atr: Option<AtrPattern>,
    pub timeout: u64,
    pub skip_ins: Vec<u8>,
}

impl FuzzOptions {
    fn strategy(&self) -> ConnectStrategy {
        match (&self.reader, &self.atr) {
            (Some(name), _) => ConnectStrategy::Reader(name.clone()),
            (None, Some(AtrPattern(atr))) => ConnectStrategy::CardWithAtr(atr.clone(), None),
            (None, None) => ConnectStrategy::AnyCard,
        }
    }

    fn tables(&self) -> StatusTables {
        StatusTables::new().with_blacklisted_instructions(self.skip_ins.iter().copied())
    }
}

/// Wait for a card, then report every command it accepts
pub(crate) fn fuzz_command(options: FuzzOptions) -> Result<(), BoxError> {
    let manager = PcscDeviceManager::new()?;
    let mut connector = PcscConnector::new(manager, options.strategy(), PcscConfig::default());

    let config = FuzzConfig::new()
        .with_connect_timeout(Duration::from_secs(options.timeout))
        .with_tables(options.tables());

    println!("Waiting for a card ({}s)...", options.timeout);
    let mut fuzzer = match Fuzzer::connect(&mut connector, config) {
        Ok(fuzzer) => fuzzer,
        Err(FuzzError::ConnectionTimeout(after)) => {
            println!(
                "{}",
                format!("No card presented within {}s", after.as_secs()).red()
            );
            return Err(FuzzError::ConnectionTimeout(after).into());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", "Card connected, probing...".green());

    let mut found = 0usize;
    for command in fuzzer.fuzz() {
        found += 1;
        println!(
            "{} {}",
            "Found valid apdu command".green().bold(),
            command.to_string().cyan()
        );
    }

    let stats = fuzzer.stats();
    info!(%stats, found, "Fuzzing complete");

    println!();
    println!("{}", "Fuzzing complete".bold());
    println!("  Valid commands:     {found}");
    println!("  Commands sent:      {}", stats.commands_sent);
    println!("  Classes recognized: {}", stats.classes_recognized);
    println!("  Parameter sweeps:   {}", stats.escalations);
    println!("  Errors:             {}", stats.errors);

    Ok(())
}
