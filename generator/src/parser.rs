// Licensed under the Apache-2.0 license

//! Parser for the family pin-mapping CSV tables.
//!
//! Each file describes one device family member: `Key` rows name the
//! columns and package options, `Device` rows list the sellable variants,
//! `Pin` rows give the signals mappable onto each pin at each mux setting,
//! `Peripheral` rows carry clock gating and IRQ details, and `DmaMux` rows
//! list DMA request sources.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{DeviceInfo, MuxSelection, PinIdx, SignalIdx, DISABLED_SIGNAL};
use crate::util::compare_names;

lazy_static! {
    static ref PACKAGE_HEADER: Regex = Regex::new(r"^[Pp]kg\s*(.*?)\s*$").unwrap();
    static ref MULTI_NAME: Regex = Regex::new(r"^(.+?)/.*$").unwrap();
    static ref CLOCK_REG: Regex = Regex::new(r"^SIM->(SCGC\d?)$").unwrap();
}

/// Column positions learnt from the `Key` row.
struct ColumnLayout {
    pin: usize,
    reset: usize,
    default: usize,
    alt_start: usize,
    alt_end: usize,
    /// Package-location columns as (column, package index) pairs.
    packages: Vec<(usize, usize)>,
}

impl Default for ColumnLayout {
    fn default() -> ColumnLayout {
        ColumnLayout {
            pin: 1,
            reset: 3,
            default: 4,
            alt_start: 5,
            alt_end: 12,
            packages: Vec::new(),
        }
    }
}

/// Parses a pin-mapping CSV file. The device name is the file stem.
pub fn parse_file(path: &Path) -> Result<DeviceInfo> {
    let device_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("cannot determine device name from '{}'", path.display()))?;
    let source_file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(device_name);
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    parse(BufReader::new(file), device_name, source_file_name)
        .with_context(|| format!("failed to parse '{}'", path.display()))
}

/// Parses a pin-mapping table from any reader.
pub fn parse(reader: impl Read, device_name: &str, source_file_name: &str) -> Result<DeviceInfo> {
    let grid = read_grid(reader)?;
    let mut info = DeviceInfo::new(device_name, source_file_name);
    let mut layout = ColumnLayout::default();

    for line in &grid {
        if line.first().map(String::as_str) == Some("Key") {
            parse_key_line(&mut info, &mut layout, line);
        }
    }
    if layout.packages.is_empty() {
        bail!("No packages provided");
    }
    for line in &grid {
        if line.first().map(String::as_str) == Some("Device") {
            parse_device_line(&mut info, line)?;
        }
    }
    if info.variants.is_empty() {
        bail!("No Devices found in file");
    }

    for line in &grid {
        match line.first().map(String::as_str) {
            Some("Pin") => parse_pin_line(&mut info, &layout, line)?,
            Some("Peripheral") => parse_clock_info_line(&mut info, line)?,
            Some("DmaMux") => parse_dma_mux_line(&mut info, line)?,
            _ => {}
        }
    }
    log::info!(
        "{}: {} pins, {} signals, {} device variants",
        device_name,
        info.pins.len(),
        info.signals.len(),
        info.variants.len()
    );
    Ok(info)
}

/// Reads the table and sorts the rows into pin-name order. Short rows sort
/// first so the `Key` row is seen before any row that depends on it.
fn read_grid(reader: impl Read) -> Result<Vec<Vec<String>>> {
    let mut grid = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line.context("failed to read input line")?;
        if line.trim().is_empty() {
            continue;
        }
        grid.push(line.split(',').map(|cell| cell.trim().to_string()).collect::<Vec<_>>());
    }
    grid.sort_by(compare_lines);
    Ok(grid)
}

fn compare_lines(a: &Vec<String>, b: &Vec<String>) -> Ordering {
    if a.len() < 2 || b.len() < 2 {
        return a.len().cmp(&b.len());
    }
    compare_names(&a[1], &b[1])
}

fn parse_key_line(info: &mut DeviceInfo, layout: &mut ColumnLayout, line: &[String]) {
    for (col, cell) in line.iter().enumerate() {
        if cell.eq_ignore_ascii_case("pin") {
            layout.pin = col;
        } else if cell.eq_ignore_ascii_case("reset") {
            layout.reset = col;
        } else if cell.eq_ignore_ascii_case("default") {
            layout.default = col;
        } else if cell.eq_ignore_ascii_case("alt0") {
            layout.alt_start = col;
            layout.alt_end = col;
        } else if cell.to_ascii_uppercase().starts_with("ALT") {
            if col > layout.alt_end {
                layout.alt_end = col;
            }
        } else if let Some(caps) = PACKAGE_HEADER.captures(cell) {
            let package = info.find_or_create_package(&caps[1]);
            layout.packages.push((col, package));
        }
    }
}

fn parse_device_line(info: &mut DeviceInfo, line: &[String]) -> Result<()> {
    if line.len() < 4 {
        bail!("Illegal Device line");
    }
    let package = info
        .find_package(&line[3])
        .ok_or_else(|| anyhow!("Unknown package {} for device {}", line[3], line[1]))?;
    info.add_variant(&line[1], &line[2], package);
    Ok(())
}

/// Maps documentation names onto signal names, e.g. `PTA4` => `GPIOA_4`.
fn convert_name(name: &str) -> String {
    name.replace("PTA", "GPIOA_")
        .replace("PTB", "GPIOB_")
        .replace("PTC", "GPIOC_")
        .replace("PTD", "GPIOD_")
        .replace("PTE", "GPIOE_")
}

/// Creates the signals named in a table cell. Cells may hold several names
/// separated by `/`.
fn create_functions_from_string(
    info: &mut DeviceInfo,
    cell: &str,
    convert: bool,
) -> Result<Vec<SignalIdx>> {
    let cell = cell.trim();
    let cell = if convert {
        convert_name(cell)
    } else {
        cell.to_string()
    };
    let mut functions = Vec::new();
    for name in cell.split('/') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        functions.push(info.find_or_create_signal(name)?);
    }
    Ok(functions)
}

/// Finds the mux setting at which a signal is reachable on a pin, preferring
/// a numbered position over the reset/fixed pseudo-settings.
fn find_mux_for_signal(info: &DeviceInfo, pin: PinIdx, signal: SignalIdx) -> Option<MuxSelection> {
    let mappings = &info.pins[pin].mappings;
    mappings
        .iter()
        .find(|(mux, signals)| matches!(mux, MuxSelection::Mux(_)) && signals.contains(&signal))
        .or_else(|| mappings.iter().find(|(_, signals)| signals.contains(&signal)))
        .map(|(mux, _)| *mux)
}

fn parse_pin_line(info: &mut DeviceInfo, layout: &ColumnLayout, line: &[String]) -> Result<()> {
    let cell = |col: usize| line.get(col).map(String::as_str).unwrap_or("");

    let pin_name = cell(layout.pin);
    if pin_name.is_empty() {
        bail!("No pin name");
    }
    // A name like PTA0/LLWU_P3 identifies the pin by its first part
    let pin_name = match MULTI_NAME.captures(pin_name) {
        Some(caps) => caps[1].to_string(),
        None => pin_name.to_string(),
    };
    if info.find_pin(&pin_name).is_some() {
        bail!("Pin {pin_name} already defined");
    }
    let pin = info.find_or_create_pin(&pin_name);

    let mut pin_is_mapped = false;
    for col in layout.alt_start..=layout.alt_end {
        let text = cell(col);
        if text.is_empty() {
            continue;
        }
        let mux = MuxSelection::Mux((col - layout.alt_start) as u8);
        for signal in create_functions_from_string(info, text, true)? {
            info.create_mapping(signal, pin, mux);
            pin_is_mapped = true;
        }
    }

    let reset_text = cell(layout.reset);
    if reset_text.is_empty() {
        info.create_mapping(DISABLED_SIGNAL, pin, MuxSelection::Reset);
        info.pins[pin].reset_mux = Some(MuxSelection::Reset);
    } else {
        let mux = if pin_is_mapped {
            MuxSelection::Reset
        } else {
            MuxSelection::Fixed
        };
        let functions = create_functions_from_string(info, reset_text, true)?;
        for &signal in &functions {
            info.create_mapping(signal, pin, mux);
        }
        let reset_mux = functions
            .first()
            .and_then(|&signal| find_mux_for_signal(info, pin, signal))
            .unwrap_or(mux);
        info.pins[pin].reset_mux = Some(reset_mux);
    }

    let default_text = cell(layout.default);
    if !default_text.is_empty() {
        let functions = create_functions_from_string(info, default_text, true)?;
        let default_mux = functions
            .first()
            .and_then(|&signal| find_mux_for_signal(info, pin, signal))
            .ok_or_else(|| {
                anyhow!("Peripheral {default_text} not found as option for pin {pin_name}")
            })?;
        info.pins[pin].default_mux = Some(default_mux);
    }

    for &(col, package) in &layout.packages {
        let location = cell(col);
        if location == "*" {
            continue;
        }
        if location.is_empty() {
            let name = info.pins[pin].name.clone();
            info.packages[package].add_location(pin, &name);
        } else {
            let location = location.to_string();
            info.packages[package].add_location(pin, &location);
        }
    }
    Ok(())
}

fn parse_clock_info_line(info: &mut DeviceInfo, line: &[String]) -> Result<()> {
    if line.len() < 3 {
        bail!("Illegal ClockInfo Mapping line");
    }
    let peripheral_name = &line[1];
    let clock_reg = &line[2];
    let short_reg = match CLOCK_REG.captures(clock_reg) {
        Some(caps) => caps[1].to_string(),
        None => bail!("Unexpected Peripheral Clock Register {clock_reg} for {peripheral_name}"),
    };
    let clock_mask = match line.get(3).filter(|cell| !cell.is_empty()) {
        Some(mask) => mask.clone(),
        None => format!(
            "{}_{}_MASK",
            clock_reg.replace("->", "_"),
            peripheral_name
        ),
    };
    if !clock_mask.contains(&short_reg) {
        bail!("Clock Mask {clock_mask} doesn't match Clock Register {clock_reg}");
    }
    let irq_nums: Vec<String> = (4..14)
        .filter_map(|col| line.get(col))
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.to_string())
        .collect();

    for template_idx in info.templates_for_peripheral(peripheral_name) {
        let template = &mut info.templates[template_idx];
        template.clock_reg = Some(short_reg.clone());
        template.clock_mask = Some(clock_mask.clone());
        template.irq_nums = irq_nums.clone();
    }
    let peripheral_idx = info.find_or_create_peripheral_by_name(peripheral_name);
    let peripheral = &mut info.peripherals[peripheral_idx];
    peripheral.clock_reg = Some(short_reg);
    peripheral.clock_mask = Some(clock_mask);
    peripheral.irq_nums = irq_nums;
    Ok(())
}

fn parse_dma_mux_line(info: &mut DeviceInfo, line: &[String]) -> Result<()> {
    if line.len() < 4 {
        bail!("Illegal DmaMux Mapping line");
    }
    let dma_instance: u32 = line[1]
        .parse()
        .with_context(|| format!("bad DmaMux instance '{}'", line[1]))?;
    let channel: u32 = line[2]
        .parse()
        .with_context(|| format!("bad DmaMux channel '{}'", line[2]))?;
    info.add_dma_slot(dma_instance, channel, &line[3]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_CSV: &str = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,TSI0_CH1,PTA0,TSI0_CH1,PTA0,UART0_CTS_b,FTM0_CH5,,,,,26
Pin,PTA1,,TSI0_CH2,PTA1,TSI0_CH2,PTA1,UART0_RX,FTM0_CH6,,,,,27
Pin,RESET_b,,RESET_b,,,,,,,,,,34
Pin,VDD1,,,,,,,,,,,,*
Peripheral,PORTA,SIM->SCGC5,,PORTA_IRQn
Peripheral,FTM0,SIM->SCGC6,,FTM0_IRQn
DmaMux,0,2,UART0_Receive
";

    fn parse_simple() -> DeviceInfo {
        parse(SIMPLE_CSV.as_bytes(), "MK20D5", "MK20D5.csv").unwrap()
    }

    #[test]
    fn test_devices_and_packages() {
        let info = parse_simple();
        assert_eq!(info.variants.len(), 1);
        assert_eq!(info.variants[0].name, "MK20DX128VLH5");
        assert_eq!(info.variants[0].manual, "K20P64M50SF0RM");
        assert_eq!(info.packages[info.variants[0].package].name, "LQFP64");
    }

    #[test]
    fn test_pin_mappings() {
        let info = parse_simple();
        let pin = info.find_pin("PTA0").unwrap();
        let gpio = info.find_signal("GPIOA_0").unwrap();
        let tsi = info.find_signal("TSI0_CH1").unwrap();
        let ftm = info.find_signal("FTM0_CH5").unwrap();
        let mappings = &info.pins[pin].mappings;
        assert_eq!(mappings[&MuxSelection::Mux(0)], vec![tsi]);
        assert_eq!(mappings[&MuxSelection::Mux(1)], vec![gpio]);
        assert_eq!(mappings[&MuxSelection::Mux(3)], vec![ftm]);
        // Reset signal also appears at the reset pseudo-setting
        assert_eq!(mappings[&MuxSelection::Reset], vec![tsi]);
        assert_eq!(info.pins[pin].reset_mux, Some(MuxSelection::Mux(0)));
        assert_eq!(info.pins[pin].default_mux, Some(MuxSelection::Mux(1)));
    }

    #[test]
    fn test_fixed_function_pin() {
        let info = parse_simple();
        let pin = info.find_pin("RESET_b").unwrap();
        let signal = info.find_signal("RESET_b").unwrap();
        assert_eq!(
            info.pins[pin].mappings[&MuxSelection::Fixed],
            vec![signal]
        );
        assert_eq!(info.pins[pin].reset_mux, Some(MuxSelection::Fixed));
    }

    #[test]
    fn test_package_locations() {
        let info = parse_simple();
        let package = info.find_package("LQFP64").unwrap();
        let pta0 = info.find_pin("PTA0").unwrap();
        let vdd = info.find_pin("VDD1").unwrap();
        assert_eq!(info.packages[package].location(pta0), Some("26"));
        // '*' marks a pin absent from the package
        assert_eq!(info.packages[package].location(vdd), None);
    }

    #[test]
    fn test_clock_info_applied() {
        let info = parse_simple();
        let templates = info.templates_for_peripheral("FTM0");
        assert!(!templates.is_empty());
        let template = &info.templates[templates[0]];
        assert_eq!(template.clock_reg.as_deref(), Some("SCGC6"));
        assert_eq!(template.clock_mask.as_deref(), Some("SIM_SCGC6_FTM0_MASK"));
        assert_eq!(template.irq_nums, vec!["FTM0_IRQn"]);
        assert!(template.class_is_used());
    }

    #[test]
    fn test_dma_mux() {
        let info = parse_simple();
        assert_eq!(info.dma_slots.len(), 1);
        assert_eq!(info.dma_slots[0].channel, 2);
        assert_eq!(info.dma_slots[0].source, "UART0_Receive");
    }

    #[test]
    fn test_missing_packages_rejected() {
        let err = parse(b"Pin,PTA0".as_slice(), "X", "X.csv").unwrap_err();
        assert!(err.to_string().contains("No packages provided"));
    }

    #[test]
    fn test_missing_devices_rejected() {
        let err = parse(b"Key,Pin,,,,,,,,,,,,Pkg LQFP64".as_slice(), "X", "X.csv").unwrap_err();
        assert!(err.to_string().contains("No Devices found"));
    }

    #[test]
    fn test_bad_clock_register_rejected() {
        let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Peripheral,PORTA,SIM->NOTAREG
";
        let err = parse(csv.as_bytes(), "X", "X.csv").unwrap_err();
        assert!(err
            .root_cause()
            .to_string()
            .contains("Unexpected Peripheral Clock Register"));
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,TSI0_CH1,PTA0,TSI0_CH1,PTA0,,,,,,,26
Pin,PTA0,,TSI0_CH1,PTA0,TSI0_CH1,PTA0,,,,,,,27
";
        let err = parse(csv.as_bytes(), "X", "X.csv").unwrap_err();
        assert!(err
            .root_cause()
            .to_string()
            .contains("Pin PTA0 already defined"));
    }

    #[test]
    fn test_unknown_default_rejected() {
        let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,TSI0_CH1,UART1_TX,TSI0_CH1,PTA0,,,,,,,26
";
        let err = parse(csv.as_bytes(), "X", "X.csv").unwrap_err();
        assert!(err
            .root_cause()
            .to_string()
            .contains("not found as option for pin PTA0"));
    }
}
