// Licensed under the Apache-2.0 license

//! Device model built from a pin-mapping table.
//!
//! [`DeviceInfo`] owns flat arenas of pins, signals, peripherals and
//! peripheral templates, with by-name indexes for lookup. Cross-references
//! between entities are arena indexes, so the model is freely shared between
//! the parser that populates it and the code generators that walk it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fmt::Write;

use anyhow::{bail, Result};
use regex::Regex;

use crate::patterns;
use crate::util::compare_names;
use crate::writers::WriterKind;

/// Version stamped into every generated file.
pub const VERSION: &str = "1.2.0";

/// C++ namespace wrapping the generated declarations.
pub const NAMESPACE: &str = "USBDM";

pub type PinIdx = usize;
pub type SignalIdx = usize;
pub type PeripheralIdx = usize;
pub type TemplateIdx = usize;
pub type PackageIdx = usize;

/// The "Disabled" signal is created first and always has index 0.
pub const DISABLED_SIGNAL: SignalIdx = 0;

lazy_static::lazy_static! {
    static ref PIN_NAME: Regex = Regex::new(r"^\s*PT(.)(\d*)\s*$").unwrap();
}

/// One multiplexor setting of a pin.
///
/// The variant order gives the ordering used throughout: disabled, then
/// reset, then fixed, then the numbered mux positions in value order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MuxSelection {
    /// Pin is unmapped.
    Disabled,
    /// Mapping the pin has at reset.
    Reset,
    /// Pin has no mapping hardware.
    Fixed,
    /// Numbered multiplexor position.
    Mux(u8),
}

impl MuxSelection {
    pub fn value(&self) -> i32 {
        match self {
            MuxSelection::Disabled => -3,
            MuxSelection::Reset => -2,
            MuxSelection::Fixed => -1,
            MuxSelection::Mux(n) => i32::from(*n),
        }
    }
}

impl fmt::Display for MuxSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxSelection::Disabled => write!(f, "disabled"),
            MuxSelection::Reset => write!(f, "reset"),
            MuxSelection::Fixed => write!(f, "fixed"),
            MuxSelection::Mux(n) => write!(f, "mux{n}"),
        }
    }
}

/// Device family, determined from the device-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    Mk,
    Mke,
    Mkl,
    Mkm,
}

impl DeviceFamily {
    pub fn from_name(name: &str) -> DeviceFamily {
        let name = name.to_ascii_uppercase();
        if name.starts_with("MKE") {
            DeviceFamily::Mke
        } else if name.starts_with("MKL") {
            DeviceFamily::Mkl
        } else if name.starts_with("MKM") {
            DeviceFamily::Mkm
        } else {
            DeviceFamily::Mk
        }
    }
}

/// A physical pin and the signals mappable onto it.
#[derive(Debug, Clone)]
pub struct Pin {
    pub name: String,
    /// PORT instance letter for `PTxn` pins.
    pub port_instance: Option<String>,
    /// Bit number within the port for `PTxn` pins.
    pub port_pin: Option<String>,
    pub reset_mux: Option<MuxSelection>,
    pub default_mux: Option<MuxSelection>,
    /// Signals reachable at each mux setting, in mux order.
    pub mappings: BTreeMap<MuxSelection, Vec<SignalIdx>>,
}

impl Pin {
    fn new(name: &str) -> Pin {
        let (port_instance, port_pin) = match PIN_NAME.captures(name) {
            Some(caps) => (Some(caps[1].to_string()), Some(caps[2].to_string())),
            None => (None, None),
        };
        Pin {
            name: name.to_string(),
            port_instance,
            port_pin,
            reset_mux: None,
            default_mux: None,
            mappings: BTreeMap::new(),
        }
    }

    /// `&PORTx->PCR[n]` expression for the pin, if it is a port pin.
    pub fn pcr(&self) -> Option<String> {
        match (&self.port_instance, &self.port_pin) {
            (Some(instance), Some(pin)) => Some(format!("&PORT{instance}->PCR[{pin}]")),
            _ => None,
        }
    }

    pub fn port_base_ptr(&self) -> Option<String> {
        self.port_instance.as_ref().map(|i| format!("PORT{i}_BasePtr"))
    }

    pub fn gpio_reg(&self) -> Option<String> {
        self.port_instance.as_ref().map(|i| format!("GPIO{i}_BasePtr"))
    }

    pub fn port_clock_mask(&self) -> Option<String> {
        self.port_instance.as_ref().map(|i| format!("PORT{i}_CLOCK_MASK"))
    }

    /// Leading columns of a `PcrInfo` table row.
    pub fn pcr_init_string(&self) -> String {
        let (mask, base, gpio, bit) = match (
            self.port_clock_mask(),
            self.port_base_ptr(),
            self.gpio_reg(),
            &self.port_pin,
        ) {
            (Some(mask), Some(base), Some(gpio), Some(bit)) => (mask, base, gpio, bit.clone()),
            _ => return "0, 0, 0, 0, ".to_string(),
        };
        format!(
            "{:<17} {:<15} {:<15} {:<4} ",
            format!("{mask},"),
            format!("{base},"),
            format!("{gpio},"),
            format!("{bit},")
        )
    }
}

/// A peripheral signal, e.g. `FTM0_CH3`, and the pins it can map to.
#[derive(Debug, Clone)]
pub struct Signal {
    pub name: String,
    pub peripheral: Option<PeripheralIdx>,
    /// Signal part of the name, e.g. `CH3`.
    pub signal: String,
    /// Whether the signal appears in generated tables.
    pub included: bool,
    pub template: Option<TemplateIdx>,
    /// Pins this signal can be mapped to, with the mux setting used.
    pub mappings: Vec<(PinIdx, MuxSelection)>,
}

/// A peripheral instance, e.g. `FTM0`, carrying its clock and IRQ details.
#[derive(Debug, Clone)]
pub struct Peripheral {
    pub base_name: String,
    pub instance: String,
    pub clock_reg: Option<String>,
    pub clock_mask: Option<String>,
    pub irq_nums: Vec<String>,
}

impl Peripheral {
    pub fn name(&self) -> String {
        format!("{}{}", self.base_name, self.instance)
    }
}

/// Code-generation description of one peripheral class instance.
#[derive(Debug, Clone)]
pub struct PeripheralTemplate {
    /// C++ base identifier, e.g. `Ftm0`.
    pub base_name: String,
    /// Hardware name, e.g. `FTM0`.
    pub peripheral_name: String,
    pub match_regex: Option<Regex>,
    pub writer: WriterKind,
    pub clock_reg: Option<String>,
    pub clock_mask: Option<String>,
    pub irq_nums: Vec<String>,
    /// Signals indexed by their slot in the peripheral's PCR table.
    pub functions: Vec<Option<SignalIdx>>,
    /// The catch-all template matched only when no other applies.
    pub fallback: bool,
}

impl PeripheralTemplate {
    fn new(base_name: &str, peripheral_name: &str, pattern: Option<&str>, writer: WriterKind) -> PeripheralTemplate {
        PeripheralTemplate {
            base_name: base_name.to_string(),
            peripheral_name: peripheral_name.to_string(),
            match_regex: pattern.map(|p| Regex::new(p).unwrap()),
            writer,
            clock_reg: None,
            clock_mask: None,
            irq_nums: Vec::new(),
            functions: Vec::new(),
            fallback: false,
        }
    }

    /// Decomposes a signal name this template claims into (base, instance, signal).
    pub fn match_signal(&self, name: &str) -> Option<(String, String, String)> {
        if self.fallback {
            return None;
        }
        self.match_regex.as_ref().and_then(|regex| {
            regex.captures(name).map(|caps| {
                let group = |n| caps.get(n).map_or(String::new(), |m| m.as_str().to_string());
                (group(1), group(2), group(3))
            })
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.match_signal(name).is_some()
    }

    /// A `PcrInfo` table is generated when the writer wants one and some
    /// signal actually landed in the function table.
    pub fn need_pcr_info_table(&self) -> bool {
        self.writer.need_info_class() && !self.functions.is_empty()
    }

    /// Whether the `<Base>Info` class is emitted at all.
    pub fn class_is_used(&self) -> bool {
        self.clock_reg.is_some() || self.clock_mask.is_some() || self.need_pcr_info_table()
    }

    /// `IRQn` initialiser list, if any IRQ numbers were given.
    pub fn irq_initialiser(&self) -> Option<String> {
        if self.irq_nums.is_empty() {
            return None;
        }
        let mut text = String::new();
        for (n, irq) in self.irq_nums.iter().enumerate() {
            if n > 0 {
                text.push_str(", ");
            }
            write!(text, "{irq}").unwrap();
        }
        Some(text)
    }
}

/// Pin locations for one package option of the device.
#[derive(Debug, Clone)]
pub struct DevicePackage {
    pub name: String,
    locations: HashMap<PinIdx, String>,
}

impl DevicePackage {
    pub fn add_location(&mut self, pin: PinIdx, location: &str) {
        self.locations.insert(pin, location.to_string());
    }

    pub fn location(&self, pin: PinIdx) -> Option<&str> {
        self.locations.get(&pin).map(String::as_str)
    }
}

/// A sellable device variant tied to one package.
#[derive(Debug, Clone)]
pub struct DeviceVariant {
    pub name: String,
    /// Reference manual identifier.
    pub manual: String,
    pub package: PackageIdx,
}

/// One DMA request source routed through a DMAMUX instance.
#[derive(Debug, Clone)]
pub struct DmaSlot {
    pub dma_instance: u32,
    pub channel: u32,
    pub source: String,
}

/// Everything known about a device, populated by the parser.
#[derive(Debug)]
pub struct DeviceInfo {
    pub device_name: String,
    pub source_file_name: String,
    pub family: DeviceFamily,
    pub pins: Vec<Pin>,
    pub signals: Vec<Signal>,
    pub peripherals: Vec<Peripheral>,
    pub templates: Vec<PeripheralTemplate>,
    pub packages: Vec<DevicePackage>,
    pub variants: Vec<DeviceVariant>,
    pub dma_slots: Vec<DmaSlot>,
    pin_index: HashMap<String, PinIdx>,
    signal_index: HashMap<String, SignalIdx>,
    peripheral_index: HashMap<String, PeripheralIdx>,
    package_index: HashMap<String, PackageIdx>,
}

impl DeviceInfo {
    pub fn new(device_name: &str, source_file_name: &str) -> DeviceInfo {
        let mut info = DeviceInfo {
            device_name: device_name.to_string(),
            source_file_name: source_file_name.to_string(),
            family: DeviceFamily::from_name(device_name),
            pins: Vec::new(),
            signals: Vec::new(),
            peripherals: Vec::new(),
            templates: Vec::new(),
            packages: Vec::new(),
            variants: Vec::new(),
            dma_slots: Vec::new(),
            pin_index: HashMap::new(),
            signal_index: HashMap::new(),
            peripheral_index: HashMap::new(),
            package_index: HashMap::new(),
        };
        info.signals.push(Signal {
            name: "Disabled".to_string(),
            peripheral: None,
            signal: String::new(),
            included: false,
            template: None,
            mappings: Vec::new(),
        });
        info.signal_index.insert("Disabled".to_string(), DISABLED_SIGNAL);
        info.initialise_templates();
        info
    }

    fn add_template(&mut self, base: &str, peripheral: &str, pattern: Option<&str>, writer: WriterKind) {
        self.templates
            .push(PeripheralTemplate::new(base, peripheral, pattern, writer));
    }

    /// Creates the peripheral templates appropriate for the device family.
    /// Order matters: signals are claimed by the first matching template and
    /// the catch-all must come last.
    fn initialise_templates(&mut self) {
        for port in ["A", "B", "C", "D", "E", "F", "G", "H", "I"] {
            self.add_template(
                &format!("Gpio{port}"),
                &format!("PORT{port}"),
                Some(&format!(r"^\s*(GPIO)({port})_(\d+)\s*$")),
                WriterKind::Gpio,
            );
        }
        if self.family != DeviceFamily::Mkm {
            for n in 0..4 {
                self.add_template(
                    &format!("Adc{n}"),
                    &format!("ADC{n}"),
                    Some(&format!(r"^\s*(ADC)({n})_(SE\d+)b?\s*$")),
                    WriterKind::Adc,
                );
                self.add_template(
                    &format!("Adc{n}a"),
                    &format!("ADC{n}"),
                    Some(&format!(r"^\s*(ADC)({n})_(SE\d+)a\s*$")),
                    WriterKind::Adc,
                );
            }
            for n in 0..4 {
                self.add_template(
                    &format!("Cmp{n}"),
                    &format!("CMP{n}"),
                    Some(&format!(r"^\s*(CMP)({n})_(IN\d)\s*$")),
                    WriterKind::Cmp,
                );
            }
            self.add_template("DmaMux0", "DMAMUX0", None, WriterKind::DmaMux);
            for n in 0..4 {
                self.add_template(
                    &format!("Ftm{n}"),
                    &format!("FTM{n}"),
                    Some(&format!(
                        r"^\s*(FTM)({n})_(CH\d+|QD_PH[A|B]|FLT\d|CLKIN\d)\s*$"
                    )),
                    WriterKind::Ftm,
                );
            }
            for n in 0..4 {
                self.add_template(
                    &format!("I2c{n}"),
                    &format!("I2C{n}"),
                    Some(&format!(r"^\s*(I2C)({n})_(SCL|SDA|4WSCLOUT|4WSDAOUT)\s*$")),
                    WriterKind::I2c,
                );
            }
            self.add_template(
                "Lptmr0",
                "LPTMR0",
                Some(r"^\s*(LPTMR)(0)_(ALT\d+)\s*$"),
                WriterKind::Lptmr,
            );
            self.add_template("Pit", "PIT", Some(r"^\s*(PIT)()(\d+)\s*$"), WriterKind::Pit);
            self.add_template(
                "Llwu",
                "LLWU",
                Some(r"^\s*(LLWU)()_(P\d+)\s*$"),
                WriterKind::Llwu,
            );
            for n in 0..4 {
                self.add_template(
                    &format!("Spi{n}"),
                    &format!("SPI{n}"),
                    Some(&format!(
                        r"^\s*(SPI)({n})_(SCK|SIN|SOUT|MISO|MOSI|SS|PCS\d*)\s*$"
                    )),
                    WriterKind::Spi,
                );
            }
            for n in 0..4 {
                self.add_template(
                    &format!("Tpm{n}"),
                    &format!("TPM{n}"),
                    Some(&format!(r"^\s*(TPM)({n})_(CH\d+|QD_PH[A|B])\s*$")),
                    WriterKind::Tpm,
                );
            }
            for n in 0..4 {
                self.add_template(
                    &format!("Tsi{n}"),
                    &format!("TSI{n}"),
                    Some(&format!(r"^\s*(TSI)({n})_(CH\d+)\s*$")),
                    WriterKind::Tsi,
                );
            }
            for n in 0..6 {
                self.add_template(
                    &format!("Uart{n}"),
                    &format!("UART{n}"),
                    Some(&format!(r"^\s*(UART)({n})_(TX|RX|CTS_b|RTS_b|COL_b)\s*$")),
                    WriterKind::Uart,
                );
            }
            for n in 0..6 {
                self.add_template(
                    &format!("Lpuart{n}"),
                    &format!("LPUART{n}"),
                    Some(&format!(r"^\s*(LPUART)({n})_(TX|RX|CTS_b|RTS_b)\s*$")),
                    WriterKind::Lpuart,
                );
            }
            self.add_template(
                "Vref",
                "VREF",
                Some(r"^\s*(VREF)()_(OUT)\s*$"),
                WriterKind::Vref,
            );
        }
        self.add_template("Misc", "MISC", None, WriterKind::Misc);
        if let Some(fallback) = self.templates.last_mut() {
            fallback.fallback = true;
        }
    }

    pub fn find_pin(&self, name: &str) -> Option<PinIdx> {
        self.pin_index.get(name).copied()
    }

    pub fn find_or_create_pin(&mut self, name: &str) -> PinIdx {
        if let Some(&idx) = self.pin_index.get(name) {
            return idx;
        }
        let idx = self.pins.len();
        self.pins.push(Pin::new(name));
        self.pin_index.insert(name.to_string(), idx);
        idx
    }

    pub fn find_signal(&self, name: &str) -> Option<SignalIdx> {
        self.signal_index.get(name).copied()
    }

    pub fn find_or_create_peripheral(&mut self, base: &str, instance: &str) -> PeripheralIdx {
        let key = format!("{base}{instance}");
        if let Some(&idx) = self.peripheral_index.get(&key) {
            return idx;
        }
        let idx = self.peripherals.len();
        self.peripherals.push(Peripheral {
            base_name: base.to_string(),
            instance: instance.to_string(),
            clock_reg: None,
            clock_mask: None,
            irq_nums: Vec::new(),
        });
        self.peripheral_index.insert(key, idx);
        idx
    }

    /// Looks up or creates the peripheral record for a clock-information row.
    /// These are keyed by the full hardware name with no instance split.
    pub fn find_or_create_peripheral_by_name(&mut self, name: &str) -> PeripheralIdx {
        self.find_or_create_peripheral(name, "")
    }

    /// Finds or creates the signal for a name from the mapping table.
    ///
    /// The first peripheral template whose pattern claims the name takes it
    /// and records it in its function table. Names no template claims fall
    /// back to the pattern catalogs; those signals belong to the catch-all
    /// template and appear in no function table.
    pub fn find_or_create_signal(&mut self, name: &str) -> Result<SignalIdx> {
        if let Some(&idx) = self.signal_index.get(name) {
            return Ok(idx);
        }
        for template_idx in 0..self.templates.len() {
            if let Some((base, instance, signal)) = self.templates[template_idx].match_signal(name) {
                let peripheral = self.find_or_create_peripheral(&base, &instance);
                let idx = self.add_signal(name, Some(peripheral), &signal, Some(template_idx));
                let slot = self.templates[template_idx].writer.signal_index(&signal)?;
                let template = &mut self.templates[template_idx];
                if template.functions.len() <= slot {
                    template.functions.resize(slot + 1, None);
                }
                if let Some(existing) = template.functions[slot] {
                    if existing != idx {
                        bail!(
                            "multiple signals map to index {slot} of {}",
                            template.base_name
                        );
                    }
                }
                template.functions[slot] = Some(idx);
                return Ok(idx);
            }
        }
        let fallback = self.templates.len() - 1;
        match patterns::classify(name) {
            Some(parts) => {
                let peripheral = self.find_or_create_peripheral(&parts.base, &parts.instance);
                Ok(self.add_signal(name, Some(peripheral), &parts.signal, Some(fallback)))
            }
            None => bail!("unable to find peripheral for signal '{name}'"),
        }
    }

    fn add_signal(
        &mut self,
        name: &str,
        peripheral: Option<PeripheralIdx>,
        signal: &str,
        template: Option<TemplateIdx>,
    ) -> SignalIdx {
        let idx = self.signals.len();
        self.signals.push(Signal {
            name: name.to_string(),
            peripheral,
            signal: signal.to_string(),
            included: true,
            template,
            mappings: Vec::new(),
        });
        self.signal_index.insert(name.to_string(), idx);
        idx
    }

    /// Records that `signal` is reachable on `pin` at mux setting `mux`.
    pub fn create_mapping(&mut self, signal: SignalIdx, pin: PinIdx, mux: MuxSelection) {
        self.pins[pin].mappings.entry(mux).or_default().push(signal);
        if signal != DISABLED_SIGNAL {
            self.signals[signal].mappings.push((pin, mux));
        }
    }

    pub fn find_or_create_package(&mut self, name: &str) -> PackageIdx {
        if let Some(&idx) = self.package_index.get(name) {
            return idx;
        }
        let idx = self.packages.len();
        self.packages.push(DevicePackage {
            name: name.to_string(),
            locations: HashMap::new(),
        });
        self.package_index.insert(name.to_string(), idx);
        idx
    }

    pub fn find_package(&self, name: &str) -> Option<PackageIdx> {
        self.package_index.get(name).copied()
    }

    pub fn add_variant(&mut self, name: &str, manual: &str, package: PackageIdx) {
        self.variants.push(DeviceVariant {
            name: name.to_string(),
            manual: manual.to_string(),
            package,
        });
    }

    pub fn add_dma_slot(&mut self, dma_instance: u32, channel: u32, source: &str) {
        self.dma_slots.push(DmaSlot {
            dma_instance,
            channel,
            source: source.to_string(),
        });
    }

    /// Pin arena indexes in name order.
    pub fn sorted_pins(&self) -> Vec<PinIdx> {
        let mut indexes: Vec<PinIdx> = (0..self.pins.len()).collect();
        indexes.sort_by(|&a, &b| compare_names(&self.pins[a].name, &self.pins[b].name));
        indexes
    }

    /// Signal arena indexes in name order.
    pub fn sorted_signals(&self) -> Vec<SignalIdx> {
        let mut indexes: Vec<SignalIdx> = (0..self.signals.len()).collect();
        indexes.sort_by(|&a, &b| compare_names(&self.signals[a].name, &self.signals[b].name));
        indexes
    }

    /// Peripheral arena indexes in name order.
    pub fn sorted_peripherals(&self) -> Vec<PeripheralIdx> {
        let mut indexes: Vec<PeripheralIdx> = (0..self.peripherals.len()).collect();
        indexes.sort_by(|&a, &b| {
            compare_names(&self.peripherals[a].name(), &self.peripherals[b].name())
        });
        indexes
    }

    /// Peripheral templates matching a hardware name, e.g. `FTM0`.
    /// Several templates can share one peripheral (`ADC0` and `ADC0a`).
    pub fn templates_for_peripheral(&self, name: &str) -> Vec<TemplateIdx> {
        (0..self.templates.len())
            .filter(|&t| self.templates[t].peripheral_name.eq_ignore_ascii_case(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_selection_order() {
        assert!(MuxSelection::Disabled < MuxSelection::Reset);
        assert!(MuxSelection::Reset < MuxSelection::Fixed);
        assert!(MuxSelection::Fixed < MuxSelection::Mux(0));
        assert!(MuxSelection::Mux(2) < MuxSelection::Mux(7));
        assert_eq!(MuxSelection::Disabled.value(), -3);
        assert_eq!(MuxSelection::Mux(3).value(), 3);
        assert_eq!(MuxSelection::Mux(3).to_string(), "mux3");
        assert_eq!(MuxSelection::Reset.to_string(), "reset");
    }

    #[test]
    fn test_device_family() {
        assert_eq!(DeviceFamily::from_name("MK20D5"), DeviceFamily::Mk);
        assert_eq!(DeviceFamily::from_name("MKE02Z2"), DeviceFamily::Mke);
        assert_eq!(DeviceFamily::from_name("MKL25Z4"), DeviceFamily::Mkl);
        assert_eq!(DeviceFamily::from_name("MKM33ZA5"), DeviceFamily::Mkm);
    }

    #[test]
    fn test_pin_port_fields() {
        let pin = Pin::new("PTA13");
        assert_eq!(pin.port_instance.as_deref(), Some("A"));
        assert_eq!(pin.port_pin.as_deref(), Some("13"));
        assert_eq!(pin.pcr().unwrap(), "&PORTA->PCR[13]");
        assert_eq!(pin.port_base_ptr().unwrap(), "PORTA_BasePtr");
        assert_eq!(pin.gpio_reg().unwrap(), "GPIOA_BasePtr");
        assert_eq!(pin.port_clock_mask().unwrap(), "PORTA_CLOCK_MASK");

        let odd = Pin::new("VDD1");
        assert!(odd.port_instance.is_none());
        assert!(odd.pcr().is_none());
    }

    #[test]
    fn test_pcr_init_string() {
        let pin = Pin::new("PTC7");
        assert_eq!(
            pin.pcr_init_string(),
            "PORTC_CLOCK_MASK, PORTC_BasePtr,  GPIOC_BasePtr,  7,   "
        );
        assert_eq!(Pin::new("RESET_b").pcr_init_string(), "0, 0, 0, 0, ");
    }

    #[test]
    fn test_signal_creation_by_template() {
        let mut info = DeviceInfo::new("MK20D5", "MK20D5.csv");
        let idx = info.find_or_create_signal("GPIOA_6").unwrap();
        let signal = &info.signals[idx];
        assert_eq!(signal.signal, "6");
        assert!(signal.included);
        let template = &info.templates[signal.template.unwrap()];
        assert_eq!(template.base_name, "GpioA");
        assert_eq!(template.functions[6], Some(idx));
        assert_eq!(info.peripherals[signal.peripheral.unwrap()].name(), "GPIOA");

        let adc = info.find_or_create_signal("ADC0_SE5b").unwrap();
        let signal = &info.signals[adc];
        assert_eq!(signal.signal, "SE5");
        let template = &info.templates[signal.template.unwrap()];
        assert_eq!(template.base_name, "Adc0");
        assert_eq!(template.functions[5], Some(adc));
    }

    #[test]
    fn test_signal_fallback_not_in_function_table() {
        let mut info = DeviceInfo::new("MK20D5", "MK20D5.csv");
        let idx = info.find_or_create_signal("SWD_CLK").unwrap();
        let signal = &info.signals[idx];
        let template = &info.templates[signal.template.unwrap()];
        assert!(template.fallback);
        assert!(template.functions.is_empty());
        assert!(info.find_or_create_signal("TOTALLY_UNKNOWN").is_err());
    }

    #[test]
    fn test_disabled_signal_preallocated() {
        let mut info = DeviceInfo::new("MK20D5", "MK20D5.csv");
        assert_eq!(info.find_or_create_signal("Disabled").unwrap(), DISABLED_SIGNAL);
        assert!(!info.signals[DISABLED_SIGNAL].included);
    }

    #[test]
    fn test_mkm_family_templates() {
        let info = DeviceInfo::new("MKM33ZA5", "MKM33ZA5.csv");
        assert!(info
            .templates
            .iter()
            .all(|t| matches!(t.writer, WriterKind::Gpio | WriterKind::Misc)));
    }

    #[test]
    fn test_create_mapping() {
        let mut info = DeviceInfo::new("MK20D5", "MK20D5.csv");
        let pin = info.find_or_create_pin("PTA0");
        let sig = info.find_or_create_signal("FTM0_CH5").unwrap();
        info.create_mapping(sig, pin, MuxSelection::Mux(3));
        info.create_mapping(DISABLED_SIGNAL, pin, MuxSelection::Reset);
        assert_eq!(info.pins[pin].mappings[&MuxSelection::Mux(3)], vec![sig]);
        assert_eq!(info.signals[sig].mappings, vec![(pin, MuxSelection::Mux(3))]);
        assert!(info.signals[DISABLED_SIGNAL].mappings.is_empty());
    }
}
