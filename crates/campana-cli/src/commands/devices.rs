//! Audio input device listing command.

use campana_io::list_input_devices;
use clap::Args;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_input_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }

    println!("Available Input Devices");
    println!("=======================\n");

    for (idx, device) in devices.iter().enumerate() {
        println!(
            "  [{}] {} ({} Hz, {} ch)",
            idx, device.name, device.default_sample_rate, device.channels
        );
    }

    println!();
    println!("Tip: pass a partial name with --device:");
    println!("  campana monitor --device \"USB\"");

    Ok(())
}
