// Licensed under the Apache-2.0 license

//! Per-peripheral code-writer strategies.
//!
//! Each peripheral template carries a [`WriterKind`] that fixes how its
//! signals are indexed into the PCR table, how instances and aliases are
//! named, what C declarations and convenience templates are emitted, and
//! whether declarations are wrapped in `#if` signal-selection guards.
//! The set is closed: adding a peripheral class means adding a variant here.

use anyhow::{bail, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{PeripheralTemplate, NAMESPACE};
use crate::output;

/// Timer special-function index bands in the PCR table.
pub const QUAD_INDEX: usize = 8;
pub const CLOCK_INDEX: usize = 10;
pub const FAULT_INDEX: usize = 12;

lazy_static! {
    static ref LEADING_DIGITS: Regex = Regex::new(r"^(\d+).*$").unwrap();
    static ref ADC_SIGNAL: Regex = Regex::new(r"^(SE)?(\d+)(a|b)?$").unwrap();
    static ref CMP_INPUT: Regex = Regex::new(r"^IN(\d+)$").unwrap();
    static ref TIMER_CHANNEL: Regex = Regex::new(r"^CH(\d+)$").unwrap();
    static ref TSI_CHANNEL: Regex = Regex::new(r"^CH(\d+)$").unwrap();
    static ref SPI_PCS: Regex = Regex::new(r"^PCS(\d*)$").unwrap();
    static ref LPTMR_INPUT: Regex = Regex::new(r"^ALT(\d+)$").unwrap();
    static ref LLWU_INPUT: Regex = Regex::new(r"^P(\d+)$").unwrap();
    static ref CHANNEL_INSTANCE: Regex = Regex::new(r".*ch\d+").unwrap();
}

/// Writer strategy for one class of peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterKind {
    Gpio,
    Adc,
    Cmp,
    DmaMux,
    Ftm,
    I2c,
    Llwu,
    Lptmr,
    Lpuart,
    Pit,
    Port,
    Spi,
    Tpm,
    Tsi,
    Uart,
    Vref,
    Misc,
}

impl WriterKind {
    pub fn group_name(&self) -> &'static str {
        match self {
            WriterKind::Gpio => "DigitalIO_Group",
            WriterKind::Adc => "AnalogueIO_Group",
            WriterKind::Cmp => "CMP_Group",
            WriterKind::DmaMux => "DMA_Group",
            WriterKind::Ftm | WriterKind::Tpm => "PwmIO_Group",
            WriterKind::I2c => "I2C_Group",
            WriterKind::Llwu => "LLWU_Group",
            WriterKind::Lptmr => "LPTMR_Group",
            WriterKind::Lpuart => "LPUART_Group",
            WriterKind::Pit => "PIT_Group",
            WriterKind::Port => "Port_Group",
            WriterKind::Spi => "SPI_Group",
            WriterKind::Tsi => "TSI_Group",
            WriterKind::Uart => "UART_Group",
            WriterKind::Vref => "VREF_Group",
            WriterKind::Misc => "MISC_Group",
        }
    }

    pub fn group_title(&self) -> &'static str {
        match self {
            WriterKind::Gpio => "Digital Input/Output",
            WriterKind::Adc => "Analogue Input",
            WriterKind::Cmp => "CMP, Analogue Comparator",
            WriterKind::DmaMux => "Direct Memory Access (DMA)",
            WriterKind::Ftm | WriterKind::Tpm => "PWM, Input capture, Output compare",
            WriterKind::I2c => "I2C, Inter-Integrated-Circuit Interface",
            WriterKind::Llwu => "LLWU, Low-leakage Wake-up Unit",
            WriterKind::Lptmr => "LPTMR, Low Power Timer",
            WriterKind::Lpuart => "LPUART, Low Power UART",
            WriterKind::Pit => "PIT, Programmable Interrupt Timer",
            WriterKind::Port => "Port Definitions",
            WriterKind::Spi => "SPI, Serial Peripheral Interface",
            WriterKind::Tsi => "TSI, Touch Sense Interface",
            WriterKind::Uart => "UART, Universal Asynchonous Receiver/Transmitter",
            WriterKind::Vref => "VREF, Voltage Reference",
            WriterKind::Misc => "Miscellaneous",
        }
    }

    pub fn group_brief(&self) -> &'static str {
        match self {
            WriterKind::Gpio => "Allows use of port pins as simple digital inputs or outputs",
            WriterKind::Adc => "Allows use of port pins as analogue inputs",
            WriterKind::Cmp => "Pins used for Analogue Comparator",
            WriterKind::DmaMux => "Pins used Direct Memory Access (DMA)",
            WriterKind::Ftm | WriterKind::Tpm => "Allows use of port pins as PWM outputs",
            WriterKind::I2c => "Pins used for I2C functions",
            WriterKind::Llwu => "Pins used for Low-leakage Wake-up Unit",
            WriterKind::Lptmr => "Pins used for Low Power Timer functions",
            WriterKind::Lpuart => "Pins used for Low Power UART functions",
            WriterKind::Pit => "Pins used for PIT functions",
            WriterKind::Port => "Information required to manipulate PORT PCRs & associated GPIOs",
            WriterKind::Spi => "Pins used for SPI functions",
            WriterKind::Tsi => "Pins used for Touch Sense Interface",
            WriterKind::Uart => "Pins used for UART functions",
            WriterKind::Vref => "Pins used for Voltage Reference",
            WriterKind::Misc => "Miscellaneous pins",
        }
    }

    /// Declarations for these writers are wrapped in `#if (<pin>_SIG_SEL == n)` guards.
    pub fn use_guard(&self) -> bool {
        matches!(self, WriterKind::Adc | WriterKind::Ftm | WriterKind::Tpm)
    }

    /// Whether package-location aliases are declared for mapped pins.
    pub fn use_aliases(&self) -> bool {
        matches!(
            self,
            WriterKind::Gpio | WriterKind::Adc | WriterKind::Ftm | WriterKind::Tpm | WriterKind::Port
        )
    }

    /// Whether a `<Base>Info` class with a PCR table is wanted.
    pub fn need_info_class(&self) -> bool {
        !matches!(
            self,
            WriterKind::Gpio | WriterKind::Port | WriterKind::DmaMux | WriterKind::Vref | WriterKind::Misc
        )
    }

    /// Maps a signal name to its slot in the peripheral's PCR table.
    pub fn signal_index(&self, signal: &str) -> Result<usize> {
        let index = match self {
            WriterKind::Gpio | WriterKind::Port => {
                LEADING_DIGITS.captures(signal).map(|c| parse(&c[1]))
            }
            WriterKind::Adc => ADC_SIGNAL.captures(signal).map(|c| parse(&c[2])),
            WriterKind::Cmp => CMP_INPUT
                .captures(signal)
                .map(|c| parse(&c[1]))
                .or(match signal {
                    "OUT" => Some(8),
                    _ => None,
                }),
            WriterKind::Ftm | WriterKind::Tpm => timer_signal_index(signal),
            WriterKind::Tsi => TSI_CHANNEL.captures(signal).map(|c| parse(&c[1])),
            WriterKind::Uart | WriterKind::Lpuart => match signal {
                "TX" => Some(0),
                "RX" => Some(1),
                "RTS" | "RTS_b" => Some(2),
                "CTS" | "CTS_b" => Some(3),
                "COL" | "COL_b" => Some(4),
                _ => None,
            },
            WriterKind::I2c => match signal {
                "SCL" => Some(0),
                "SDA" => Some(1),
                "4WSCLOUT" => Some(2),
                "4WSDAOUT" => Some(3),
                _ => None,
            },
            WriterKind::Spi => match signal {
                "SCK" => Some(0),
                "SIN" | "MISO" => Some(1),
                "SOUT" | "MOSI" => Some(2),
                "SS" => Some(3),
                _ => SPI_PCS.captures(signal).map(|c| {
                    3 + c.get(1)
                        .map_or(0, |m| if m.as_str().is_empty() { 0 } else { parse(m.as_str()) })
                }),
            },
            WriterKind::Lptmr => LPTMR_INPUT.captures(signal).map(|c| parse(&c[1])),
            WriterKind::Llwu => LLWU_INPUT.captures(signal).map(|c| parse(&c[1])),
            WriterKind::Pit => signal.parse::<usize>().ok(),
            WriterKind::DmaMux | WriterKind::Vref => match signal {
                "OUT" => Some(0),
                _ => None,
            },
            WriterKind::Misc => None,
        };
        match index {
            Some(index) => Ok(index),
            None => bail!("signal '{signal}' does not match expected pattern"),
        }
    }

    /// Instance name for a mapped signal, e.g. `gpioA_0` or `adc0_se5`.
    pub fn instance_name(&self, instance: &str, signal: &str) -> String {
        match self {
            WriterKind::Gpio => format!("gpio{instance}_{signal}"),
            WriterKind::Adc => format!("adc{instance}_se{signal}"),
            WriterKind::Cmp => format!("cmp{instance}_{signal}"),
            WriterKind::DmaMux | WriterKind::Vref => format!("vref{instance}_{signal}"),
            WriterKind::Ftm => format!("ftm{instance}_{}", signal.replace("CH", "ch")),
            WriterKind::Tpm => format!("tpm{instance}_{}", signal.replace("CH", "ch")),
            WriterKind::I2c => format!("i2c{instance}_{signal}"),
            WriterKind::Llwu => format!("llwu{instance}_{signal}"),
            WriterKind::Lptmr => format!("lptmr{instance}_{signal}"),
            WriterKind::Lpuart => format!("lpuart{instance}_{signal}"),
            WriterKind::Pit => format!("pit{instance}_{signal}"),
            WriterKind::Port => format!("port{instance}_{signal}"),
            WriterKind::Spi => format!("spi{instance}_{signal}"),
            WriterKind::Tsi => format!("tsi{instance}_{signal}"),
            WriterKind::Uart => format!("uart{instance}_{signal}"),
            WriterKind::Misc => format!("misc{instance}_{signal}"),
        }
    }

    /// Alias macro name for a package location, if this writer aliases it.
    pub fn alias_name(&self, instance_name: &str, location: &str) -> Option<String> {
        match self {
            WriterKind::Gpio => Some(format!("gpio_{location}")),
            WriterKind::Adc => Some(format!("adc_{location}")),
            WriterKind::Port => Some(format!("port_{location}")),
            // Only channel signals are useful as timer aliases
            WriterKind::Ftm if CHANNEL_INSTANCE.is_match(instance_name) => {
                Some(format!("ftm_{location}"))
            }
            WriterKind::Tpm if CHANNEL_INSTANCE.is_match(instance_name) => {
                Some(format!("tpm_{location}"))
            }
            _ => None,
        }
    }

    /// C declaration type for a mapped signal.
    pub fn declaration(
        &self,
        template: &PeripheralTemplate,
        instance: &str,
        index: usize,
    ) -> Option<String> {
        match self {
            WriterKind::Gpio | WriterKind::Adc | WriterKind::Cmp | WriterKind::Port => Some(
                format!("const {}::{}<{}>", NAMESPACE, template.base_name, index),
            ),
            WriterKind::DmaMux | WriterKind::Vref => Some(format!(
                "const {}::{}<{}>",
                NAMESPACE, template.base_name, index
            )),
            WriterKind::Ftm => Some(format!("const {NAMESPACE}::Ftm{instance}<{index}>")),
            WriterKind::Tpm => Some(format!("const {NAMESPACE}::Tpm{instance}<{index}>")),
            WriterKind::Tsi
            | WriterKind::Uart
            | WriterKind::Lpuart
            | WriterKind::I2c
            | WriterKind::Spi
            | WriterKind::Lptmr
            | WriterKind::Pit
            | WriterKind::Llwu => Some(format!(
                "const {}::PcrTable_T<{}Info, {}>",
                NAMESPACE, template.base_name, index
            )),
            WriterKind::Misc => None,
        }
    }

    /// `using` alias definition for a declaration.
    pub fn alias_definition(
        &self,
        template: &PeripheralTemplate,
        instance: &str,
        index: usize,
        alias: &str,
    ) -> Option<String> {
        self.declaration(template, instance, index)
            .map(|declaration| format!("using {alias:<20} = {declaration};\n"))
    }

    /// Convenience-template text emitted once per declaration group.
    pub fn template_text(&self, template: &PeripheralTemplate) -> Option<String> {
        let base = template.base_name.as_str();
        match self {
            WriterKind::Gpio | WriterKind::Port => {
                let mut text = GPIO_TEMPLATE_DOC.replace("%s", base);
                text.push_str(&format!(
                    "template<uint8_t bitNum> using {base} = Gpio_T<{base}Info, bitNum>;\n\n"
                ));
                if *self == WriterKind::Gpio {
                    text.push_str(&GPIO_FIELD_TEMPLATE_DOC.replace("%s", base));
                    text.push_str(&format!(
                        "template<int left, int right> using {base}Field = Field_T<{base}Info, left, right>;\n\n"
                    ));
                }
                Some(text)
            }
            WriterKind::Adc => Some(format!(
                "{ADC_TEMPLATE_DOC}template<uint8_t channel> using {base} = Adc_T<{base}Info, channel>;\n\n"
            )),
            WriterKind::Ftm => Some(format!(
                "{FTM_TEMPLATE_DOC}template<uint8_t channel> using {base} = TmrBase_T<{base}Info, channel>;\n\n"
            )),
            WriterKind::Tpm => Some(format!(
                "{TPM_TEMPLATE_DOC}template<uint8_t channel> using {base} = TmrBase_T<{base}Info, channel>;\n\n"
            )),
            _ => None,
        }
    }

    fn pcr_value_text(&self) -> &'static str {
        match self {
            WriterKind::Gpio | WriterKind::Port => {
                "   //! Value for PCR (including MUX value)\n\
                 \x20  static constexpr uint32_t pcrValue  = GPIO_DEFAULT_PCR;\n\n"
            }
            _ => {
                "   //! Base value for PCR (excluding MUX value)\n\
                 \x20  static constexpr uint32_t pcrValue  = DEFAULT_PCR;\n\n"
            }
        }
    }

    /// Constants section of the peripheral's `<Base>Info` class.
    pub fn info_constants(&self, template: &PeripheralTemplate) -> String {
        let mut text = String::new();
        match self {
            WriterKind::Gpio | WriterKind::Port => {
                text.push_str(&format!(
                    "   //! PORT Hardware base pointer\n\
                     \x20  static constexpr uint32_t pcrAddress   = {}_BasePtr;\n\n",
                    template.peripheral_name
                ));
                text.push_str(&format!(
                    "   //! GPIO Hardware base pointer\n\
                     \x20  static constexpr uint32_t gpioAddress   = {}_BasePtr;\n\n",
                    template.peripheral_name.replace("PORT", "GPIO")
                ));
            }
            _ => {
                text.push_str(&format!(
                    "   //! Hardware base pointer\n\
                     \x20  static constexpr uint32_t basePtr   = {}_BasePtr;\n\n",
                    template.peripheral_name
                ));
            }
        }
        text.push_str(self.pcr_value_text());
        if let Some(clock_mask) = &template.clock_mask {
            text.push_str(&format!(
                "   //! Clock mask for peripheral\n\
                 \x20  static constexpr uint32_t clockMask = {clock_mask};\n\n"
            ));
        }
        if let Some(clock_reg) = &template.clock_reg {
            text.push_str(&format!(
                "   //! Address of clock register for peripheral\n\
                 \x20  static constexpr uint32_t clockReg  = SIM_BasePtr+offsetof(SIM_Type,{clock_reg});\n\n"
            ));
        }
        if let Some(irq_nums) = template.irq_initialiser() {
            text.push_str(&format!(
                "   //! Number of IRQs for hardware\n\
                 \x20  static constexpr uint32_t irqCount  = {};\n\n",
                template.irq_nums.len()
            ));
            text.push_str(&format!(
                "   //! IRQ numbers for hardware\n\
                 \x20  static constexpr IRQn_Type irqNums[]  = {{{irq_nums}}};\n\n"
            ));
        }
        if matches!(self, WriterKind::Ftm | WriterKind::Tpm) {
            text.push_str(&format!(
                "   //! Base value for tmr->SC register\n\
                 \x20  static constexpr uint32_t scValue  = {}_SC;\n\n",
                template.peripheral_name
            ));
            text.push_str(&format!(
                "   //! Indexes of special functions in PcrInfo[] table\n\
                 \x20  static constexpr int QUAD_INDEX  = {QUAD_INDEX};\n\
                 \x20  static constexpr int CLOCK_INDEX = {CLOCK_INDEX};\n\
                 \x20  static constexpr int FAULT_INDEX = {FAULT_INDEX};\n\n"
            ));
            let num_channels = template
                .functions
                .iter()
                .take(QUAD_INDEX)
                .rposition(Option::is_some)
                .map_or(0, |i| i + 1);
            text.push_str(&format!(
                "   static constexpr int NUM_CHANNELS  = {num_channels};\n\n"
            ));
        }
        text
    }

    /// Per-template configuration wizard block, if any.
    pub fn write_wizard(&self, template: &PeripheralTemplate, out: &mut String) {
        match self {
            WriterKind::Ftm => write_timer_wizard(
                template,
                out,
                "CLKS",
                &[
                    ("0", "Disabled"),
                    ("1", "System clock"),
                    ("2", "Fixed frequency clock"),
                    ("3", "External clock"),
                ],
                "(FTM_SC_CLKS(0x1)|FTM_SC_PS(0x0))",
            ),
            WriterKind::Tpm => write_timer_wizard(
                template,
                out,
                "CMOD",
                &[
                    ("0", "Disabled"),
                    ("1", "Internal clock"),
                    ("2", "External clock"),
                    ("3", "Reserved"),
                ],
                "(TPM_SC_CMOD(0x1)|TPM_SC_PS(0x0))",
            ),
            _ => {}
        }
    }
}

fn parse(digits: &str) -> usize {
    digits.parse().unwrap_or(0)
}

fn timer_signal_index(signal: &str) -> Option<usize> {
    if let Some(caps) = TIMER_CHANNEL.captures(signal) {
        return Some(parse(&caps[1]));
    }
    match signal {
        "QD_PHA" => Some(QUAD_INDEX),
        "QD_PHB" => Some(QUAD_INDEX + 1),
        "CLKIN0" => Some(CLOCK_INDEX),
        "CLKIN1" => Some(CLOCK_INDEX + 1),
        "FLT0" => Some(FAULT_INDEX),
        "FLT1" => Some(FAULT_INDEX + 1),
        "FLT2" => Some(FAULT_INDEX + 2),
        "FLT3" => Some(FAULT_INDEX + 3),
        _ => None,
    }
}

fn write_timer_wizard(
    template: &PeripheralTemplate,
    out: &mut String,
    clock_field: &str,
    clock_entries: &[(&str, &str)],
    sc_value: &str,
) {
    let name = &template.peripheral_name;
    output::wizard_section_open(out, &format!("Clock settings for {name}"));
    output::wizard_option_preamble(
        out,
        Some(&format!("{name}_SC.{clock_field} ================================\n//")),
        0,
        &[],
        &format!("{name}_SC.{clock_field} Clock source"),
        &format!("Selects the clock source for the {name} module. [{name}_SC.{clock_field}]"),
        None,
    );
    for (value, description) in clock_entries {
        output::wizard_entry(out, value, description, &[]);
    }
    output::wizard_default_entry(out, "1");
    output::wizard_option_preamble(
        out,
        Some(&format!("{name}_SC.PS ================================\n//")),
        1,
        &[],
        &format!("{name}_SC.PS Clock prescaler"),
        &format!("Selects the prescaler for the {name} module. [{name}_SC.PS]"),
        None,
    );
    for divisor in 0..8 {
        output::wizard_entry(
            out,
            &divisor.to_string(),
            &format!("Divide by {}", 1 << divisor),
            &[],
        );
    }
    output::wizard_default_entry(out, "0");
    output::open_namespace(out, NAMESPACE);
    output::constexpr_def(out, 16, &format!("{name}_SC"), sc_value);
    output::close_namespace_anon(out);
    out.push('\n');
    output::wizard_section_close(out);
}

const GPIO_TEMPLATE_DOC: &str = "\
/**
 * @brief Convenience template for %s. See @ref Gpio_T
 *
 * <b>Usage</b>
 * @code
 * // Instantiate for bit 3 of %s
 * %s<3> %s3
 *
 * // Set as digital output
 * %s3.setOutput();
 *
 * // Set pin high
 * %s3.set();
 *
 * // Set pin low
 * %s3.clear();
 *
 * // Toggle pin
 * %s3.toggle();
 *
 * // Set pin to boolean value
 * %s3.write(true);
 *
 * // Set pin to boolean value
 * %s3.write(false);
 *
 * // Set as digital input
 * %s3.setInput();
 *
 * // Read pin as boolean value
 * bool x = %s3.read();
 * @endcode
 *
 * @tparam bitNum        Bit number in the port
 */
";

const GPIO_FIELD_TEMPLATE_DOC: &str = "\
/**
 * @brief Convenience template for %s fields. See @ref Field_T
 *
 * <b>Usage</b>
 * @code
 * // Instantiate for bit 6 down to 3 of %s
 * %sField<6,3> %s6_3
 *
 * // Set as digital output
 * %s6_3.setOutput();
 *
 * // Write value to field
 * %s6_3.write(0x53);
 *
 * // Clear all of field
 * %s6_3.bitClear();
 *
 * // Clear lower two bits of field
 * %s6_3.bitClear(0x3);
 *
 * // Set lower two bits of field
 * %s6_3.bitSet(0x3);
 *
 * // Set as digital input
 * %s6_3.setInput();
 *
 * // Read pin as int value
 * int x = %s6_3.read();
 * @endcode
 *
 * @tparam left          Bit number of leftmost bit in port (inclusive)
 * @tparam right         Bit number of rightmost bit in port (inclusive)
 */
";

const ADC_TEMPLATE_DOC: &str = "\
/**
 * Convenience templated class representing an ADC
 *
 * Example
 * @code
 *  // Instantiate ADC0 single-ended channel #8
 *  const adc0<8> adc0_se8;
 *
 *  // Initialise ADC
 *  adc0_se8.initialiseADC(USBDM::resolution_12bit_se);
 *
 *  // Set as analogue input
 *  adc0_se8.setAnalogueInput();
 *
 *  // Read input
 *  uint16_t value = adc0_se8.readAnalogue();
 *  @endcode
 *
 * @tparam adcChannel    ADC channel
 */
";

const FTM_TEMPLATE_DOC: &str = "\
/**
 * Convenience templated class representing a FTM
 *
 * Example
 * @code
 * // Instantiate the ftm channel (for FTM0 CH6)
 * const USBDM::Ftm0<6>   ftm0_ch6;
 *
 * // Initialise PWM with initial period and alignment
 * ftm0_ch6.setPwmOutput(200, USBDM::ftm_leftAlign);
 *
 * // Change period (in ticks)
 * ftm0_ch6.setPeriod(500);
 *
 * // Change duty cycle (in percent)
 * ftm0_ch6.setDutyCycle(45);
 * @endcode
 *
 * @tparam channel    Timer channel
 */
";

const TPM_TEMPLATE_DOC: &str = "\
/**
 * Convenience templated class representing a TPM
 *
 * Example
 * @code
 * // Instantiate the tpm channel (for TPM0 CH6)
 * const USBDM::Tpm0<6>   tpm0_ch6;
 *
 * // Initialise PWM with initial period and alignment
 * tpm0_ch6.setPwmOutput(200, USBDM::ftm_leftAlign);
 *
 * // Change period (in ticks)
 * tpm0_ch6.setPeriod(500);
 *
 * // Change duty cycle (in percent)
 * tpm0_ch6.setDutyCycle(45);
 * @endcode
 *
 * @tparam channel    Timer channel
 */
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_index_gpio() {
        assert_eq!(WriterKind::Gpio.signal_index("0").unwrap(), 0);
        assert_eq!(WriterKind::Gpio.signal_index("19").unwrap(), 19);
        assert!(WriterKind::Gpio.signal_index("CH1").is_err());
    }

    #[test]
    fn test_signal_index_adc() {
        assert_eq!(WriterKind::Adc.signal_index("SE5b").unwrap(), 5);
        assert_eq!(WriterKind::Adc.signal_index("SE19").unwrap(), 19);
        assert_eq!(WriterKind::Adc.signal_index("4a").unwrap(), 4);
    }

    #[test]
    fn test_signal_index_timer_bands() {
        assert_eq!(WriterKind::Ftm.signal_index("CH7").unwrap(), 7);
        assert_eq!(WriterKind::Ftm.signal_index("QD_PHB").unwrap(), 9);
        assert_eq!(WriterKind::Ftm.signal_index("CLKIN1").unwrap(), 11);
        assert_eq!(WriterKind::Ftm.signal_index("FLT3").unwrap(), 15);
        assert_eq!(WriterKind::Tpm.signal_index("QD_PHA").unwrap(), 8);
    }

    #[test]
    fn test_signal_index_serial() {
        assert_eq!(WriterKind::Uart.signal_index("TX").unwrap(), 0);
        assert_eq!(WriterKind::Uart.signal_index("RTS_b").unwrap(), 2);
        assert_eq!(WriterKind::Lpuart.signal_index("COL_b").unwrap(), 4);
        assert_eq!(WriterKind::I2c.signal_index("4WSDAOUT").unwrap(), 3);
        assert_eq!(WriterKind::Spi.signal_index("MISO").unwrap(), 1);
        assert_eq!(WriterKind::Spi.signal_index("SS").unwrap(), 3);
        assert_eq!(WriterKind::Spi.signal_index("PCS2").unwrap(), 5);
        assert_eq!(WriterKind::Spi.signal_index("PCS").unwrap(), 3);
    }

    #[test]
    fn test_signal_index_others() {
        assert_eq!(WriterKind::Cmp.signal_index("IN3").unwrap(), 3);
        assert_eq!(WriterKind::Cmp.signal_index("OUT").unwrap(), 8);
        assert_eq!(WriterKind::Llwu.signal_index("P15").unwrap(), 15);
        assert_eq!(WriterKind::Lptmr.signal_index("ALT2").unwrap(), 2);
        assert_eq!(WriterKind::Pit.signal_index("1").unwrap(), 1);
        assert_eq!(WriterKind::Vref.signal_index("OUT").unwrap(), 0);
        assert!(WriterKind::Misc.signal_index("ANY").is_err());
    }

    #[test]
    fn test_alias_names() {
        assert_eq!(
            WriterKind::Gpio.alias_name("gpioA_0", "D5"),
            Some("gpio_D5".to_string())
        );
        assert_eq!(
            WriterKind::Ftm.alias_name("ftm0_ch3", "D5"),
            Some("ftm_D5".to_string())
        );
        // Quadrature inputs are not aliased
        assert_eq!(WriterKind::Ftm.alias_name("ftm0_QD_PHA", "D5"), None);
        assert_eq!(WriterKind::Uart.alias_name("uart0_TX", "D5"), None);
    }

    #[test]
    fn test_instance_names() {
        assert_eq!(WriterKind::Gpio.instance_name("A", "0"), "gpioA_0");
        assert_eq!(WriterKind::Adc.instance_name("0", "5b"), "adc0_se5b");
        assert_eq!(WriterKind::Tpm.instance_name("1", "CH3"), "tpm1_ch3");
    }
}
