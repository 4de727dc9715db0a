use cardfuzz_apdu_transport_pcsc::PcscDeviceManager;

use crate::BoxError;

/// List all available readers
pub(crate) fn list_readers(manager: &PcscDeviceManager) -> Result<(), BoxError> {
    let readers = manager.list_readers()?;

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        let status = match reader.atr() {
            Some(atr) if reader.has_card() => format!("card present, ATR {}", hex::encode_upper(atr)),
            _ if reader.has_card() => "card present".to_string(),
            _ => "no card".to_string(),
        };
        println!("{}. {} ({})", i + 1, reader.name(), status);
    }

    Ok(())
}
