// Licensed under the Apache-2.0 license

//! Generation of the `pin_mapping-<device>.h` and `gpio-<device>.cpp` files.
//!
//! One header and one source file are produced per device variant. The
//! header carries the configuration-wizard annotations, the peripheral
//! information classes and the pin alias declarations; the source file
//! carries the optional reset-time pin-mapping function.

use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{
    DeviceInfo, DevicePackage, DeviceVariant, MuxSelection, PinIdx, SignalIdx, DISABLED_SIGNAL,
    NAMESPACE, VERSION,
};
use crate::output;
use crate::output::Attribute;
use crate::writers::WriterKind;

pub mod xml;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

const PIN_MAPPING_BASE_NAME: &str = "pin_mapping";
const GPIO_BASE_NAME: &str = "gpio";

lazy_static! {
    static ref PORT_PIN_CATEGORY: Regex = Regex::new(r"^PT([A-Z]).*$").unwrap();
    static ref PORT_PERIPHERAL: Regex = Regex::new(r"^PORT[A-Z]$").unwrap();
}

/// Title patterns grouping signals in the "Mapping by Peripheral Function"
/// wizard section. First match wins; unmatched signals are miscellaneous.
const SIGNAL_CATEGORIES: &[(&str, &str)] = &[
    (r"^(ADC\d+).*$", "Analogue to Digital ($1)"),
    (r"^(VREF\d*).*$", "Voltage Reference ($1)"),
    (r"^(A?CMP\d+).*$", "Analogue Comparator ($1)"),
    (r"^(FTM\d+).*$", "FlexTimer ($1)"),
    (r"^(TPM\d+).*$", "Timer ($1)"),
    (r"^(LCD\d*).*$", "Liquid Crystal Display ($1)"),
    (r"^(GPIO[A-Z]).*$", "General Purpose I/O ($1)"),
    (r"^(I2C\d+).*$", "Inter-Integrated Circuit ($1)"),
    (r"^(I2S\d+).*$", "Integrated Interchip Sound ($1)"),
    (r"^(LLWU).*$", "Low-Leakage Wake-up Unit ($1)"),
    (r"^(SPI\d+).*$", "Serial Peripheral Interface ($1)"),
    (r"^(TSI\d+).*$", "Touch Sense Interface ($1)"),
    (r"^(LPTMR|LPTIM)\d*.*$", "Low Power Timer ($1)"),
    (r"^(UART\d+).*$", "Universal Asynchronous Rx/Tx ($1)"),
    (r"^(PXBAR).*$", "Peripheral Crossbar ($1)"),
    (r"^(QT\d+).*$", "Quad Timer ($1)"),
    (r"^(SCI\d+).*$", "Serial Communication Interface ($1)"),
    (r"^(SDAD)(M|P)\d+.*$", "Sigma-Delta ADC ($1)"),
    (r"^(LPUART\d+).*$", "Low Power UART ($1)"),
    (r"^(DAC\d*).*$", "Digital to Analogue ($1)"),
    (r"^(PDB\d*).*$", "Programmable Delay Block ($1)"),
    (r"^(CAN\d*).*$", "CAN Bus ($1)"),
    (r"^(ENET\d*).*$", "Ethernet ($1)"),
    (r"^(MII\d*).*$", "Ethernet ($1)"),
    (r"^(RMII\d*).*$", "Ethernet ($1)"),
    (r"^(SDHC\d*).*$", "Secured Digital Host Controller ($1)"),
    (r"^(CMT\d*).*$", "Carrier Modulator Transmitter ($1)"),
    (r"^(EWM).*$", "External Watchdog Monitor ($1)"),
    (r"^E?XTAL.*$", "Clock and Timing"),
    (r"^(JTAG|SWD|NMI|TRACE|RESET).*$", "Debug and Control"),
    (r"^(FB_).*$", "Flexbus"),
    (r"^(FXIO\d+).*$", "Flexible I/O ($1)"),
    (r"^.*(USB).*$", "Universal Serial Bus"),
    (r"^.*(CLK|EXTRG).*$", "Clock and Timing"),
];

lazy_static! {
    static ref SIGNAL_CATEGORY_PATTERNS: Vec<(Regex, &'static str)> = SIGNAL_CATEGORIES
        .iter()
        .map(|(pattern, title)| (Regex::new(pattern).unwrap(), *title))
        .collect();
}

fn pin_category(name: &str) -> String {
    match PORT_PIN_CATEGORY.captures(name) {
        Some(caps) => format!("Port {} Pins", &caps[1]),
        None => "Miscellaneous Pins".to_string(),
    }
}

fn signal_category(name: &str) -> String {
    for (pattern, title) in SIGNAL_CATEGORY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(name) {
            let class = caps.get(1).map_or("", |m| m.as_str());
            return title.replace("$1", class);
        }
    }
    "Miscellaneous".to_string()
}

/// Groups keys into titled buckets, keeping first-encounter order.
fn categorize<T: Copy>(items: &[T], title: impl Fn(T) -> String) -> Vec<(String, Vec<T>)> {
    let mut categories: Vec<(String, Vec<T>)> = Vec::new();
    for &item in items {
        let name = title(item);
        match categories.iter_mut().find(|(t, _)| *t == name) {
            Some((_, bucket)) => bucket.push(item),
            None => categories.push((name, vec![item])),
        }
    }
    categories
}

/// Per-variant emission state.
struct EmissionContext<'a> {
    info: &'a DeviceInfo,
    variant: &'a DeviceVariant,
    package: &'a DevicePackage,
    /// Alias macros already defined; duplicates are commented out.
    macros: HashSet<String>,
    port_clock_reg: String,
    gpio_fn_changes: bool,
    adc_fn_changes: bool,
    fixed_gpio_fn: i32,
    fixed_adc_fn: i32,
}

impl<'a> EmissionContext<'a> {
    fn new(info: &'a DeviceInfo, variant: &'a DeviceVariant) -> Result<EmissionContext<'a>> {
        let port_clock_reg = resolve_port_clock_reg(info)?;
        let (fixed_gpio_fn, gpio_fn_changes) = resolve_fixed_mux(info, WriterKind::Gpio, 1);
        let (fixed_adc_fn, adc_fn_changes) = resolve_fixed_mux(info, WriterKind::Adc, 0);
        Ok(EmissionContext {
            info,
            variant,
            package: &info.packages[variant.package],
            macros: HashSet::new(),
            port_clock_reg,
            gpio_fn_changes,
            adc_fn_changes,
            fixed_gpio_fn,
            fixed_adc_fn,
        })
    }

    /// Pin name decorated with its package location, `None` when the pin is
    /// absent from this package.
    fn pin_name_with_location(&self, pin: PinIdx) -> Option<String> {
        let name = &self.info.pins[pin].name;
        let location = self.package.location(pin)?;
        if location.eq_ignore_ascii_case(name) {
            Some(name.clone())
        } else {
            Some(format!("{} (Alias:{})", name, location.replace('/', ", ")))
        }
    }

    fn function_list(&self, signals: &[SignalIdx]) -> String {
        let mut text = String::new();
        for (n, &signal) in signals.iter().enumerate() {
            if n > 0 {
                text.push('/');
            }
            text.push_str(&self.info.signals[signal].name);
        }
        text
    }

    fn signal_instance(&self, signal: SignalIdx) -> String {
        self.info.signals[signal]
            .peripheral
            .map(|p| self.info.peripherals[p].instance.clone())
            .unwrap_or_default()
    }

    fn generate_header(&mut self) -> Result<String> {
        self.macros.clear();
        let mut out = String::new();
        let file_name = format!("{PIN_MAPPING_BASE_NAME}.h");
        let true_file_name = format!("{PIN_MAPPING_BASE_NAME}-{}.h", self.variant.name);
        output::header_preamble(
            &mut out,
            &file_name,
            &true_file_name,
            VERSION,
            &format!(
                "Pin declarations for {}, generated from {}",
                self.variant.name, self.info.source_file_name
            ),
        );
        output::system_include(&mut out, "stddef.h");
        output::local_include(&mut out, "derivative.h");
        out.push('\n');
        output::wizard_marker(&mut out);
        out.push_str("//================================\n// Validators\n");
        out.push_str(
            "// <validate=net.sourceforge.usbdm.annotationEditor.validators.PinMappingValidator>\n",
        );
        out.push('\n');
        self.write_device_wizards(&mut out);
        self.write_pin_mapping_options(&mut out);
        self.write_pin_mappings(&mut out);
        self.write_peripheral_signal_mappings(&mut out)?;
        output::end_wizard_marker(&mut out);
        self.write_pin_defines(&mut out);
        self.write_clock_macros(&mut out);
        self.write_peripheral_information_classes(&mut out);
        output::local_include(&mut out, "gpio_defs.h");
        self.write_declarations(&mut out)?;
        self.write_dma_mux_info(&mut out);
        output::header_postamble(&mut out, &file_name);
        Ok(out)
    }

    fn generate_source(&mut self) -> Result<String> {
        let mut out = String::new();
        let file_name = format!("{GPIO_BASE_NAME}.cpp");
        let true_file_name = format!("{GPIO_BASE_NAME}-{}.cpp", self.variant.name);
        output::source_preamble(
            &mut out,
            &file_name,
            &true_file_name,
            VERSION,
            &format!(
                "Pin mapping for {}, generated from {}",
                self.variant.name, self.info.source_file_name
            ),
        );
        output::local_include(&mut out, "gpio.h");
        out.push('\n');
        output::open_namespace(&mut out, NAMESPACE);
        self.write_pin_mapping_function(&mut out);
        output::close_namespace(&mut out, NAMESPACE);
        Ok(out)
    }

    fn write_device_wizards(&self, out: &mut String) {
        for template in &self.info.templates {
            if template.class_is_used() {
                template.writer.write_wizard(template, out);
            }
        }
    }

    fn write_pin_mapping_options(&self, out: &mut String) {
        output::wizard_binary_option_preamble(
            out,
            Some("Pin mapping Options\n//"),
            0,
            false,
            "Map pins",
            "Selects whether pin mappings are done when individual peripherals are configured\nor during reset initialisation.",
        );
        output::wizard_entry(out, "0", "Pins mapped on demand", &[]);
        output::wizard_entry(out, "1", "Pin mapping on reset", &[]);
        output::macro_def(out, "DO_MAP_PINS_ON_RESET", "0");
        out.push('\n');
    }

    fn write_pin_mappings(&self, out: &mut String) {
        output::wizard_conditional_open(
            out,
            Some("Pin peripheral signal mapping"),
            0,
            &[Attribute::Name("MAP_BY_PIN".to_string())],
            "Mapping by Pin",
            "This allows the mapping of peripheral functions to pins\nto be controlled by individual pin",
        );
        output::wizard_entry(out, "0", "Disabled", &[]);
        output::wizard_entry(out, "1", "Enabled", &[]);
        output::macro_def(out, "MAP_BY_PIN_ENABLED", "1");
        out.push('\n');
        let pins = self.info.sorted_pins();
        for (title, pins) in categorize(&pins, |pin| pin_category(&self.info.pins[pin].name)) {
            output::wizard_section_open(out, &title);
            for pin in pins {
                self.write_pin_mapping(out, pin);
            }
            output::wizard_section_close(out);
        }
        output::wizard_conditional_close(out);
    }

    /// Wizard option selecting which signal is routed to one pin.
    fn write_pin_mapping(&self, out: &mut String, pin_idx: PinIdx) {
        let pin = &self.info.pins[pin_idx];
        let Some(name_with_location) = self.pin_name_with_location(pin_idx) else {
            // Pin not present in this package
            return;
        };
        let selection_count = pin.mappings.len();

        // A fixed mapping always wins, then an explicit default, then reset
        let default_selection = if pin.mappings.contains_key(&MuxSelection::Fixed) {
            MuxSelection::Fixed
        } else {
            pin.default_mux.unwrap_or(MuxSelection::Reset)
        };
        let mut alternatives = Vec::new();
        for (&mux, signals) in &pin.mappings {
            let only_disabled = signals.iter().all(|&s| s == DISABLED_SIGNAL);
            if only_disabled || (mux == MuxSelection::Reset && selection_count > 1) {
                continue;
            }
            alternatives.push(self.function_list(signals));
        }

        let mut attributes = vec![Attribute::Name(format!("{}_SIG_SEL", pin.name))];
        if selection_count <= 1 {
            attributes.push(Attribute::Constant);
        }
        let hint = if selection_count <= 1 {
            format!("{} has no pin-mapping hardware", pin.name)
        } else {
            format!("Selects which peripheral signal is mapped to {} pin", pin.name)
        };
        output::wizard_option_preamble(
            out,
            Some(&format!("Signal mapping for {} pin", pin.name)),
            0,
            &attributes,
            &name_with_location,
            &hint,
            Some(&alternatives.join(", ")),
        );

        for (&mux, signals) in &pin.mappings {
            let mut description = self.function_list(signals);
            if selection_count <= 1 {
                description.push_str(" (fixed)");
            } else if mux == MuxSelection::Reset {
                description.push_str(" (reset default)");
            }
            let mut attributes = Vec::new();
            for &signal in signals {
                if !self.info.signals[signal].included {
                    continue;
                }
                let mut target = name_with_location.clone();
                if mux == MuxSelection::Reset {
                    target.push_str(" (reset default)");
                }
                attributes.push(Attribute::Selection(
                    format!("{}_PIN_SEL", self.info.signals[signal].name),
                    target,
                ));
            }
            output::wizard_entry(out, &mux.value().to_string(), &description, &attributes);
        }
        if selection_count >= 2 {
            output::wizard_default_entry(out, &default_selection.value().to_string());
        }
        output::macro_def(
            out,
            &format!("{}_SIG_SEL", pin.name),
            &default_selection.value().to_string(),
        );
        out.push('\n');
    }

    fn write_peripheral_signal_mappings(&self, out: &mut String) -> Result<()> {
        output::wizard_conditional_open(
            out,
            Some("Pin peripheral signal mapping"),
            0,
            &[
                Attribute::Name("MAP_BY_FUNCTION".to_string()),
                Attribute::Constant,
            ],
            "Mapping by Peripheral Function",
            "This allows the mapping of peripheral functions to pins\nto be controlled by peripheral function.\nThis option is active when Mapping by Pin is disabled",
        );
        output::wizard_entry(out, "0", "Disabled", &[]);
        output::wizard_entry(out, "1", "Enabled", &[]);
        output::macro_def(out, "MAP_BY_FUNCTION_ENABLED", "0");
        out.push('\n');

        let signals: Vec<SignalIdx> = self
            .info
            .sorted_signals()
            .into_iter()
            .filter(|&s| self.info.signals[s].included)
            .collect();
        for (title, signals) in
            categorize(&signals, |s| signal_category(&self.info.signals[s].name))
        {
            output::wizard_section_open(out, &title);
            for signal in signals {
                self.write_peripheral_signal_mapping(out, signal)?;
            }
            output::wizard_section_close(out);
        }
        output::wizard_conditional_close(out);
        Ok(())
    }

    /// Wizard option showing which pin one signal is routed to.
    fn write_peripheral_signal_mapping(&self, out: &mut String, signal_idx: SignalIdx) -> Result<()> {
        let signal = &self.info.signals[signal_idx];
        let mut mappings = signal.mappings.clone();
        if mappings.is_empty() {
            bail!("Signal must be mapped to at least one pin: {}", signal.name);
        }
        mappings.sort_by_key(|&(_, mux)| mux.value());
        if !mappings
            .iter()
            .any(|&(pin, _)| self.package.location(pin).is_some())
        {
            return Ok(());
        }
        let no_choices = mappings.len() == 1 && mappings[0].1 == MuxSelection::Fixed;

        // Selection 0 is the Disabled entry when there is a choice
        let mut selection = i32::from(!no_choices);
        let mut default_selection = 0;
        let mut default_is_fixed = false;
        let mut choices = Vec::new();
        for &(pin, mux) in &mappings {
            if self.package.location(pin).is_none() {
                continue;
            }
            if mux == MuxSelection::Reset {
                // Reset seeds the default only when the pin records no
                // explicit default of its own
                if default_selection == 0 && self.info.pins[pin].default_mux.is_none() {
                    default_selection = selection;
                }
                continue;
            }
            // A fixed mapping always wins over an explicit default elsewhere
            if mux == MuxSelection::Fixed {
                default_selection = selection;
                default_is_fixed = true;
            } else if !default_is_fixed && self.info.pins[pin].default_mux == Some(mux) {
                default_selection = selection;
            }
            choices.push(self.info.pins[pin].name.clone());
            selection += 1;
        }

        let mut attributes = vec![Attribute::Name(format!("{}_PIN_SEL", signal.name))];
        if no_choices {
            attributes.push(Attribute::Constant);
        }
        let mut title = signal.name.clone();
        if !choices.is_empty() {
            write!(title, " [{}]", choices.join(", ")).unwrap();
        }
        output::wizard_option_preamble(
            out,
            Some(&format!("Pin Mapping for {} signal", signal.name)),
            0,
            &attributes,
            &title,
            &format!("Shows which pin {} is mapped to", signal.name),
            None,
        );

        let mut selection = 0;
        if !no_choices {
            output::wizard_entry(out, "0", "Disabled", &[]);
            selection += 1;
        }
        for &(pin, mux) in &mappings {
            if mux == MuxSelection::Reset {
                continue;
            }
            let Some(pin_name) = self.pin_name_with_location(pin) else {
                continue;
            };
            let is_reset = self.info.pins[pin].reset_mux == Some(mux);
            let mut description = pin_name;
            let mut target = self.function_list(&self.info.pins[pin].mappings[&mux]);
            if is_reset {
                description.push_str(" (reset default)");
                target.push_str(" (reset default)");
            }
            output::wizard_entry(
                out,
                &selection.to_string(),
                &description,
                &[Attribute::Selection(
                    format!("{}_SIG_SEL", self.info.pins[pin].name),
                    target,
                )],
            );
            selection += 1;
        }
        output::wizard_default_entry(out, &default_selection.to_string());
        output::macro_def(
            out,
            &format!("{}_PIN_SEL", signal.name),
            &default_selection.to_string(),
        );
        out.push('\n');
        Ok(())
    }

    fn write_pin_defines(&self, out: &mut String) {
        output::banner(out, "Common Mux settings for PCR");
        output::macro_undef(out, "FIXED_ADC_FN");
        output::macro_undef(out, "FIXED_GPIO_FN");
        output::macro_undef(out, "FIXED_PORT_CLOCK_REG");
        if self.adc_fn_changes {
            output::macro_def_commented(
                out,
                "ADC_FN_CHANGES",
                "",
                " Indicates ADC Multiplexing varies with pin",
            );
        } else {
            output::macro_def_commented(
                out,
                "FIXED_ADC_FN",
                &self.fixed_adc_fn.to_string(),
                " Fixed ADC Multiplexing value",
            );
        }
        if self.gpio_fn_changes {
            output::macro_def_commented(
                out,
                "GPIO_FN_CHANGES",
                "",
                " Indicates GPIO Multiplexing varies with pin",
            );
        } else {
            output::macro_def_commented(
                out,
                "FIXED_GPIO_FN",
                &self.fixed_gpio_fn.to_string(),
                " Fixed GPIO Multiplexing value",
            );
        }
        output::macro_def_commented(
            out,
            "FIXED_PORT_CLOCK_REG",
            &self.port_clock_reg,
            " Fixed PORT Clock",
        );
        out.push('\n');
    }

    fn write_clock_macros(&self, out: &mut String) {
        output::banner(out, "Peripheral clock macros");
        for peripheral_idx in self.info.sorted_peripherals() {
            let peripheral = &self.info.peripherals[peripheral_idx];
            let Some(clock_reg) = &peripheral.clock_reg else {
                continue;
            };
            let name = peripheral.name();
            output::macro_def(out, &format!("{name}_CLOCK_REG"), clock_reg);
            if let Some(clock_mask) = &peripheral.clock_mask {
                output::macro_def(out, &format!("{name}_CLOCK_MASK"), clock_mask);
            }
        }
        output::macro_def(out, "PORT_CLOCK_REG", &self.port_clock_reg);
        out.push('\n');
    }

    fn write_peripheral_information_classes(&self, out: &mut String) {
        output::open_namespace(out, NAMESPACE);
        output::banner(out, "Peripheral Pin Tables");
        output::start_group(
            out,
            "PeripheralPinTables",
            "Peripheral Information Classes",
            Some("Provides instance specific information about a peripheral"),
        );
        for template in &self.info.templates {
            self.write_info_class(out, template);
        }
        output::close_group_named(out, "PeripheralPinTables");
        output::close_namespace(out, NAMESPACE);
        out.push('\n');
    }

    fn write_info_class(&self, out: &mut String, template: &crate::model::PeripheralTemplate) {
        if !template.class_is_used() {
            return;
        }
        output::doc_banner(
            out,
            &format!("Peripheral information for {}", template.writer.group_title()),
        );
        write!(out, "class {}Info {{\npublic:\n", template.base_name).unwrap();
        out.push_str(&template.writer.info_constants(template));
        if template.need_pcr_info_table() {
            out.push_str("   //! Information for each pin of peripheral\n");
            out.push_str("   static constexpr PcrInfo  info[32] = {\n\n");
            out.push_str(
                "         //          clockMask         pcrAddress      gpioAddress gpioBit muxValue\n",
            );
            for (index, function) in template.functions.iter().enumerate() {
                self.write_info_row(out, index, *function);
            }
            out.push_str("   };\n");
        }
        out.push_str("};\n\n");
    }

    /// One row of a `PcrInfo` table, conditional on the signal's pin mapping.
    fn write_info_row(&self, out: &mut String, index: usize, function: Option<SignalIdx>) {
        let dummy = format!("         /* {index:2} */  {{ 0, 0, 0, 0, 0 }},\n");
        let Some(signal_idx) = function else {
            out.push_str(&dummy);
            return;
        };
        let signal = &self.info.signals[signal_idx];
        let mut mappings = signal.mappings.clone();
        mappings.sort_by_key(|&(_, mux)| mux.value());
        let mut choice = 1;
        let mut chain_open = false;
        for (pin, mux) in mappings {
            let mux_value = match mux {
                MuxSelection::Mux(n) => i32::from(n),
                _ => continue,
            };
            if self.package.location(pin).is_none() {
                continue;
            }
            output::if_open(
                out,
                &format!("{}_PIN_SEL == {}", signal.name, choice),
                chain_open,
            );
            write!(
                out,
                "         /* {index:2} */  {{ {}{} }},\n",
                self.info.pins[pin].pcr_init_string(),
                mux_value
            )
            .unwrap();
            chain_open = true;
            choice += 1;
        }
        if chain_open {
            out.push_str("#else\n");
            out.push_str(&dummy);
            output::if_end(out);
        } else {
            out.push_str(&dummy);
        }
    }

    fn write_declarations(&mut self, out: &mut String) -> Result<()> {
        let info = self.info;
        out.push('\n');
        output::open_namespace(out, NAMESPACE);
        let pins = info.sorted_pins();
        for template_idx in 0..info.templates.len() {
            let template = &info.templates[template_idx];
            if !template.class_is_used() || !template.writer.use_aliases() {
                continue;
            }
            let mut group_open = false;
            for &pin in &pins {
                for (&mux, signals) in &info.pins[pin].mappings {
                    if mux == MuxSelection::Reset {
                        continue;
                    }
                    for &signal in signals {
                        if !template.matches(&info.signals[signal].name) {
                            continue;
                        }
                        if !group_open {
                            output::start_group(
                                out,
                                template.writer.group_name(),
                                template.writer.group_title(),
                                Some(template.writer.group_brief()),
                            );
                            if let Some(text) = template.writer.template_text(template) {
                                out.push_str(&text);
                            }
                            group_open = true;
                        }
                        self.write_extern_declaration(out, template_idx, pin, mux, signal)?;
                    }
                }
            }
            if group_open {
                output::close_group(out);
            }
        }
        output::if_start(out, "DO_MAP_PINS_ON_RESET>0");
        output::doc_banner(out, "Used to configure pin-mapping before 1st use of peripherals");
        out.push_str("extern void usbdm_PinMapping();\n");
        output::if_end(out);
        output::close_namespace(out, NAMESPACE);
        Ok(())
    }

    fn write_extern_declaration(
        &mut self,
        out: &mut String,
        template_idx: usize,
        pin: PinIdx,
        mux: MuxSelection,
        signal_idx: SignalIdx,
    ) -> Result<()> {
        let info = self.info;
        let template = &info.templates[template_idx];
        let signal = &info.signals[signal_idx];
        let instance = self.signal_instance(signal_idx);
        let index = template.writer.signal_index(&signal.signal)?;
        if template.writer.declaration(template, &instance, index).is_none() {
            return Ok(());
        }
        let instance_name = template.writer.instance_name(&instance, &signal.signal);
        let Some(location) = self.package.location(pin) else {
            return Ok(());
        };
        let pin_name = info.pins[pin].name.clone();
        let location = location.to_string();
        let use_guard = mux != MuxSelection::Fixed && template.writer.use_guard();
        let mut guard_open = false;
        for part in location.split('/') {
            if part.eq_ignore_ascii_case(&pin_name) {
                continue;
            }
            let Some(alias) = template.writer.alias_name(&instance_name, part) else {
                continue;
            };
            let Some(alias_def) = template
                .writer
                .alias_definition(template, &instance, index, &alias)
            else {
                continue;
            };
            // One guard covers every alias of this mapping
            if use_guard && !guard_open {
                output::if_start(out, &format!("{}_SIG_SEL == {}", pin_name, mux.value()));
                guard_open = true;
            }
            if !self.macros.insert(alias.clone()) {
                // Same alias already declared elsewhere
                out.push_str("//");
            }
            out.push_str(&alias_def);
        }
        output::if_end_when(out, guard_open);
        Ok(())
    }

    fn write_dma_mux_info(&self, out: &mut String) {
        if self.info.dma_slots.is_empty() {
            return;
        }
        out.push('\n');
        output::open_namespace(out, NAMESPACE);
        output::start_group(
            out,
            "DMA_Group",
            "Direct Memory Access (DMA)",
            Some("Support for DMA operations"),
        );
        for instance in 0..4 {
            let mut started = false;
            for slot in &self.info.dma_slots {
                if slot.dma_instance != instance {
                    continue;
                }
                if !started {
                    out.push_str("enum {\n");
                    started = true;
                }
                write!(
                    out,
                    "   {:<35}  = {},\n",
                    format!("DMA{}_SLOT_{}", instance, slot.source),
                    slot.channel
                )
                .unwrap();
            }
            if started {
                out.push_str("};\n");
            }
        }
        output::close_group(out);
        output::close_namespace(out, NAMESPACE);
    }

    /// Reset-time pin mapping function and its initialisation table.
    fn write_pin_mapping_function(&self, out: &mut String) {
        output::if_start(out, "DO_MAP_PINS_ON_RESET>0");
        out.push_str(
            "struct PinInit {\n   uint32_t pcrValue;\n   uint32_t volatile *pcr;\n};\n\nstatic constexpr PinInit pinInit[] = {\n",
        );
        let pins: Vec<PinIdx> = self
            .info
            .sorted_pins()
            .into_iter()
            .filter(|&pin| {
                self.package.location(pin).is_some() && self.info.pins[pin].pcr().is_some()
            })
            .collect();
        for &pin in &pins {
            let pin = &self.info.pins[pin];
            output::if_start(out, &format!("{}_SIG_SEL>=0", pin.name));
            write!(
                out,
                "   {{ PORT_PCR_MUX({}_SIG_SEL)|{}::DEFAULT_PCR, {}}},\n",
                pin.name,
                NAMESPACE,
                pin.pcr().unwrap_or_default()
            )
            .unwrap();
            output::if_end(out);
        }
        out.push_str("};\n\n");
        out.push_str(
            "/**\n * Used to configure pin-mapping before 1st use of peripherals\n */\nvoid usbdm_PinMapping() {\n",
        );
        let mut current_port: Option<String> = None;
        let mut condition_counter = 0;
        for &pin in &pins {
            let pin = &self.info.pins[pin];
            let port = pin.port_instance.clone().unwrap_or_default();
            if current_port.as_deref() != Some(&port) {
                if let Some(previous) = &current_port {
                    write!(
                        out,
                        "\n\n   SIM->FIXED_PORT_CLOCK_REG |= PORT{previous}_CLOCK_MASK;\n"
                    )
                    .unwrap();
                    output::if_end(out);
                }
                out.push_str("#if ");
                current_port = Some(port);
                condition_counter = 0;
            }
            if condition_counter > 0 {
                out.push_str(" || ");
                if condition_counter % 4 == 0 {
                    out.push_str("\\\n    ");
                }
            }
            write!(out, "({}_SIG_SEL>=0)", pin.name).unwrap();
            condition_counter += 1;
        }
        if let Some(previous) = &current_port {
            write!(
                out,
                "\n   SIM->FIXED_PORT_CLOCK_REG |= PORT{previous}_CLOCK_MASK;\n"
            )
            .unwrap();
            output::if_end(out);
        }
        out.push_str(
            "\n   for (const PinInit *p=pinInit; p<(pinInit+(sizeof(pinInit)/sizeof(pinInit[0]))); p++) {\n      *(p->pcr) = p->pcrValue;\n   }\n",
        );
        out.push_str("}\n");
        output::if_end(out);
    }
}

/// Finds the SIM register gating the PORT clocks. All ports must agree.
fn resolve_port_clock_reg(info: &DeviceInfo) -> Result<String> {
    let mut resolved: Option<String> = None;
    for peripheral in &info.peripherals {
        if !PORT_PERIPHERAL.is_match(&peripheral.name()) {
            continue;
        }
        let Some(clock_reg) = &peripheral.clock_reg else {
            continue;
        };
        match &resolved {
            Some(existing) if existing != clock_reg => {
                bail!("Multiple port clock registers existing={existing}, new={clock_reg}");
            }
            _ => resolved = Some(clock_reg.clone()),
        }
    }
    Ok(resolved.unwrap_or_else(|| "SCGC5".to_string()))
}

/// Determines whether every mapping of the given peripheral class uses the
/// same mux position, returning (fixed value, varies).
fn resolve_fixed_mux(info: &DeviceInfo, writer: WriterKind, default: i32) -> (i32, bool) {
    let mut fixed: Option<i32> = None;
    for pin in &info.pins {
        for (&mux, signals) in &pin.mappings {
            let MuxSelection::Mux(value) = mux else {
                continue;
            };
            for &signal in signals {
                let Some(template) = info.signals[signal].template else {
                    continue;
                };
                if info.templates[template].writer != writer {
                    continue;
                }
                match fixed {
                    Some(existing) if existing != i32::from(value) => return (default, true),
                    _ => fixed = Some(i32::from(value)),
                }
            }
        }
    }
    (fixed.unwrap_or(default), false)
}

/// Generates the pin-mapping header for one device variant.
pub fn generate_header(info: &DeviceInfo, variant: &DeviceVariant) -> Result<String> {
    EmissionContext::new(info, variant)?.generate_header()
}

/// Generates the gpio source file for one device variant.
pub fn generate_source(info: &DeviceInfo, variant: &DeviceVariant) -> Result<String> {
    EmissionContext::new(info, variant)?.generate_source()
}

/// Writes the generated files for every device variant below `output_dir`:
/// headers under `Project_Headers/`, sources under `Sources/`, and the
/// device description XML at the top level when requested.
pub fn write_all(info: &DeviceInfo, output_dir: &Path, with_xml: bool) -> Result<()> {
    let headers_dir = output_dir.join("Project_Headers");
    let sources_dir = output_dir.join("Sources");
    fs::create_dir_all(&headers_dir)
        .with_context(|| format!("failed to create '{}'", headers_dir.display()))?;
    fs::create_dir_all(&sources_dir)
        .with_context(|| format!("failed to create '{}'", sources_dir.display()))?;
    for variant in &info.variants {
        let header_path =
            headers_dir.join(format!("{PIN_MAPPING_BASE_NAME}-{}.h", variant.name));
        let source_path = sources_dir.join(format!("{GPIO_BASE_NAME}-{}.cpp", variant.name));
        fs::write(&header_path, generate_header(info, variant)?)
            .with_context(|| format!("failed to write '{}'", header_path.display()))?;
        log::info!("wrote {}", header_path.display());
        fs::write(&source_path, generate_source(info, variant)?)
            .with_context(|| format!("failed to write '{}'", source_path.display()))?;
        log::info!("wrote {}", source_path.display());
    }
    if with_xml {
        let xml_path = output_dir.join(format!("{}.xml", info.device_name));
        let file = fs::File::create(&xml_path)
            .with_context(|| format!("failed to write '{}'", xml_path.display()))?;
        xml::write_device_description(info, file)?;
        log::info!("wrote {}", xml_path.display());
    }
    Ok(())
}
