use cardfuzz_apdu_transport_pcsc::PcscDeviceManager;

use crate::BoxError;
use crate::utils::reader::list_readers;

/// Print every reader known to PC/SC and whether it holds a card
pub(crate) fn list_command() -> Result<(), BoxError> {
    let manager = PcscDeviceManager::new()?;
    list_readers(&manager)
}
