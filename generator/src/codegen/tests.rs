// Licensed under the Apache-2.0 license

use super::*;
use crate::parser;

const FAMILY_CSV: &str = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,TSI0_CH1,PTA0,TSI0_CH1,PTA0,UART0_CTS_b,FTM0_CH5,,,,,26
Pin,PTA1,,TSI0_CH2,PTA1,TSI0_CH2,PTA1,UART0_RX,FTM0_CH6,,,,,27
Pin,PTB0,,ADC0_SE8,PTB0,ADC0_SE8,PTB0,I2C0_SCL,FTM1_CH0,,,,,35
Pin,RESET_b,,RESET_b,,,,,,,,,,34
Peripheral,PORTA,SIM->SCGC5,,PORTA_IRQn
Peripheral,PORTB,SIM->SCGC5
Peripheral,FTM0,SIM->SCGC6,,FTM0_IRQn
Peripheral,ADC0,SIM->SCGC6,,ADC0_IRQn
DmaMux,0,2,UART0_Receive
";

fn family_info() -> DeviceInfo {
    parser::parse(FAMILY_CSV.as_bytes(), "MK20D5", "MK20D5.csv").unwrap()
}

fn family_header() -> String {
    let info = family_info();
    generate_header(&info, &info.variants[0]).unwrap()
}

#[test]
fn test_header_preamble_and_guard() {
    let header = family_header();
    assert!(header.contains("@file      pin_mapping.h (derived from pin_mapping-MK20DX128VLH5.h)"));
    assert!(header.contains("Pin declarations for MK20DX128VLH5, generated from MK20D5.csv"));
    assert!(header.starts_with("/**"));
    assert!(header.contains("#ifndef PROJECT_HEADERS_PIN_MAPPING_H"));
    assert!(header.ends_with("#endif /* PROJECT_HEADERS_PIN_MAPPING_H */\n"));
    assert!(header.contains("#include <stddef.h>"));
    assert!(header.contains("#include \"derivative.h\""));
    assert!(header.contains("#include \"gpio_defs.h\""));
}

#[test]
fn test_header_wizard_sections() {
    let header = family_header();
    assert!(header.contains("<<< Use Configuration Wizard in Context Menu >>>"));
    assert!(header.contains("<<< end of configuration section >>>"));
    assert!(header
        .contains("// <validate=net.sourceforge.usbdm.annotationEditor.validators.PinMappingValidator>"));
    // FTM0 has clock information so its clock wizard is emitted
    assert!(header.contains("// <h> Clock settings for FTM0"));
    assert!(header.contains("constexpr uint16_t FTM0_SC              = (FTM_SC_CLKS(0x1)|FTM_SC_PS(0x0));"));
    assert!(header.contains("#define DO_MAP_PINS_ON_RESET 0"));
}

#[test]
fn test_pin_mapping_wizard() {
    let header = family_header();
    assert!(header.contains("// <h> Port A Pins"));
    assert!(header.contains("// <h> Miscellaneous Pins"));
    assert!(header.contains("<name=PTA0_SIG_SEL>"));
    assert!(header.contains("Selects which peripheral signal is mapped to PTA0 pin"));
    // Default mapping of PTA0 is GPIOA_0 at mux1
    assert!(header.lines().any(|l| l.starts_with("#define PTA0_SIG_SEL") && l.ends_with(" 1")));
    // Reset entry carries the reset-default tag
    assert!(header.contains("<-2=> TSI0_CH1 (reset default)"));
    // Fixed-function pin gets a constant option
    assert!(header.contains("RESET_b has no pin-mapping hardware"));
    assert!(header.contains("RESET_b (fixed)"));
}

#[test]
fn test_peripheral_signal_mapping_wizard() {
    let header = family_header();
    assert!(header.contains("<name=MAP_BY_FUNCTION>"));
    assert!(header.contains("// <h> FlexTimer (FTM0)"));
    assert!(header.contains("Shows which pin FTM0_CH5 is mapped to"));
    assert!(header.contains("FTM0_CH5 [PTA0]"));
    assert!(header.lines().any(|l| l.starts_with("#define FTM0_CH5_PIN_SEL")));
    assert!(header.contains("<selection=PTA0_SIG_SEL,"));
}

#[test]
fn test_pin_defines() {
    let header = family_header();
    assert!(header.contains("#undef FIXED_GPIO_FN"));
    // All GPIO signals sit at mux1 in this table
    assert!(header.contains("FIXED_GPIO_FN"));
    assert!(!header.contains("GPIO_FN_CHANGES"));
    assert!(header.contains("FIXED_ADC_FN"));
    assert!(header
        .lines()
        .any(|l| l.contains("FIXED_PORT_CLOCK_REG") && l.contains("SCGC5")));
}

#[test]
fn test_gpio_fn_varies() {
    let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,,PTA0,,PTA0,,,,,,,1
Pin,PTA1,,,PTA1,,,PTA1,,,,,,2
";
    let info = parser::parse(csv.as_bytes(), "MK20D5", "MK20D5.csv").unwrap();
    let header = generate_header(&info, &info.variants[0]).unwrap();
    assert!(header.contains("GPIO_FN_CHANGES"));
    assert!(!header.contains("#define FIXED_GPIO_FN"));
}

#[test]
fn test_clock_macros() {
    let header = family_header();
    assert!(header.lines().any(|l| l.starts_with("#define FTM0_CLOCK_REG") && l.ends_with("SCGC6")));
    assert!(header.contains("SIM_SCGC6_FTM0_MASK"));
    assert!(header.contains("SIM_SCGC5_PORTB_MASK"));
    assert!(header.lines().any(|l| l.starts_with("#define PORT_CLOCK_REG") && l.ends_with("SCGC5")));
}

#[test]
fn test_conflicting_port_clock_registers_rejected() {
    let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,,,,PTA0,,,,,,,1
Peripheral,PORTA,SIM->SCGC5
Peripheral,PORTB,SIM->SCGC6,SIM_SCGC6_PORTB_MASK
";
    let info = parser::parse(csv.as_bytes(), "MK20D5", "MK20D5.csv").unwrap();
    let err = generate_header(&info, &info.variants[0]).unwrap_err();
    assert!(err.to_string().contains("Multiple port clock registers"));
}

#[test]
fn test_info_classes() {
    let header = family_header();
    assert!(header.contains("class Ftm0Info {"));
    assert!(header.contains("class Adc0Info {"));
    // GpioA has clock information but digital IO carries no PcrInfo table
    assert!(!header.contains("class GpioAInfo {\npublic:\n   //! Information for each pin"));
    assert!(header.contains("static constexpr PcrInfo  info[32] = {"));
    assert!(header.contains("#if (FTM0_CH5_PIN_SEL == 1)"));
    assert!(header.contains("PORTA_CLOCK_MASK, PORTA_BasePtr,  GPIOA_BasePtr,  0,   3 },"));
    // FTM0 channels 5 and 6 are populated
    assert!(header.contains("NUM_CHANNELS  = 7"));
    assert!(header.contains("scValue  = FTM0_SC"));
    assert!(header.contains("irqNums[]  = {FTM0_IRQn}"));
}

#[test]
fn test_declarations_and_aliases() {
    let header = family_header();
    assert!(header.contains("namespace USBDM {"));
    // Package location 26 aliases the GPIO on PTA0
    assert!(header.contains("using gpio_26"));
    assert!(header.contains("= const USBDM::GpioA<0>;"));
    // ADC aliases are guarded by the pin's signal selection
    assert!(header.contains("#if (PTB0_SIG_SEL == 0)"));
    assert!(header.contains("using adc_35"));
    assert!(header.contains("= const USBDM::Adc0<8>;"));
    assert!(header.contains("extern void usbdm_PinMapping();"));
}

#[test]
fn test_aliases_share_guard() {
    let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,PTB0,,ADC0_SE8,ADC0_SE8,ADC0_SE8,PTB0,,,,,,,A5/D19
Peripheral,ADC0,SIM->SCGC6,,ADC0_IRQn
";
    let info = parser::parse(csv.as_bytes(), "MK20D5", "MK20D5.csv").unwrap();
    let header = generate_header(&info, &info.variants[0]).unwrap();
    // Both location aliases sit inside a single guard
    assert!(header.contains("#if (PTB0_SIG_SEL == 0)\nusing adc_A5"));
    assert!(header.contains("using adc_D19"));
    assert!(!header.contains("#elif (PTB0_SIG_SEL"));
    let guard_count = header.matches("#if (PTB0_SIG_SEL == 0)").count();
    assert_eq!(guard_count, 1);
}

#[test]
fn test_fixed_mapping_wins_default() {
    // RESET_b has no mux options so it maps as fixed; fixed beats the
    // recorded default
    let csv = "\
Key,Pin,Name,Reset,Default,ALT0,ALT1,ALT2,ALT3,ALT4,ALT5,ALT6,ALT7,Pkg LQFP64
Device,MK20DX128VLH5,K20P64M50SF0RM,LQFP64
Pin,RESET_b,,RESET_b,RESET_b,,,,,,,,,34
";
    let info = parser::parse(csv.as_bytes(), "MK20D5", "MK20D5.csv").unwrap();
    let pin = info.find_pin("RESET_b").unwrap();
    assert!(info.pins[pin]
        .mappings
        .contains_key(&MuxSelection::Fixed));
    let header = generate_header(&info, &info.variants[0]).unwrap();
    assert!(header
        .lines()
        .any(|l| l.starts_with("#define RESET_b_SIG_SEL") && l.ends_with(" -1")));
}

#[test]
fn test_default_beats_reset() {
    let header = family_header();
    // PTA0 resets to TSI0_CH1 at mux0 but records GPIOA_0 as default
    assert!(header
        .lines()
        .any(|l| l.starts_with("#define PTA0_SIG_SEL") && l.ends_with(" 1")));
    // The unselected reset signal must not claim a pin mapping
    assert!(header
        .lines()
        .any(|l| l.starts_with("#define TSI0_CH1_PIN_SEL") && l.ends_with(" 0")));
}

#[test]
fn test_dma_mux_table() {
    let header = family_header();
    assert!(header.contains("DMA0_SLOT_UART0_Receive"));
    assert!(header.lines().any(|l| l.contains("DMA0_SLOT_UART0_Receive") && l.ends_with("= 2,")));
}

#[test]
fn test_source_file() {
    let info = family_info();
    let source = generate_source(&info, &info.variants[0]).unwrap();
    assert!(source.contains("@file      gpio.cpp (derived from gpio-MK20DX128VLH5.cpp)"));
    assert!(source.contains("#include \"gpio.h\""));
    assert!(source.contains("void usbdm_PinMapping() {"));
    assert!(source.contains("#if (PTA0_SIG_SEL>=0)"));
    assert!(source.contains("{ PORT_PCR_MUX(PTA0_SIG_SEL)|USBDM::DEFAULT_PCR, &PORTA->PCR[0]},"));
    assert!(source.contains("#if (PTA0_SIG_SEL>=0) || (PTA1_SIG_SEL>=0)"));
    assert!(source.contains("SIM->FIXED_PORT_CLOCK_REG |= PORTA_CLOCK_MASK;"));
    assert!(source.contains("SIM->FIXED_PORT_CLOCK_REG |= PORTB_CLOCK_MASK;"));
    assert!(source.contains("for (const PinInit *p=pinInit;"));
    assert!(source.contains("} // End namespace USBDM"));
}

#[test]
fn test_xml_description() {
    let info = family_info();
    let mut buffer = Vec::new();
    xml::write_device_description(&info, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.contains("name=\"MK20DX128VLH5\""));
    assert!(text.contains("manual=\"K20P64M50SF0RM\""));
    assert!(text.contains("package=\"LQFP64\""));
    assert!(text.contains("name=\"PTA0\""));
    assert!(text.contains("sel=\"mux3\""));
    assert!(text.contains("function=\"FTM0_CH5\""));
    assert!(text.contains("<reset"));
    assert!(text.contains("sel=\"mux0\""));
    assert!(text.contains("isFixed=\"true\""));
    assert!(text.contains("<packages>"));
    assert!(text.contains("<placement"));
    assert!(text.contains("location=\"26\""));
    assert!(text.contains("<peripherals>"));
    assert!(text.contains("name=\"FTM0\""));
    assert!(text.contains("<pcr"));
    assert!(text.contains("index=\"5\""));
}

#[test]
fn test_write_all() {
    let info = family_info();
    let dir = tempfile::tempdir().unwrap();
    write_all(&info, dir.path(), true).unwrap();
    assert!(dir
        .path()
        .join("Project_Headers/pin_mapping-MK20DX128VLH5.h")
        .exists());
    assert!(dir.path().join("Sources/gpio-MK20DX128VLH5.cpp").exists());
    assert!(dir.path().join("MK20D5.xml").exists());
}

#[test]
fn test_categories() {
    assert_eq!(pin_category("PTA0"), "Port A Pins");
    assert_eq!(pin_category("RESET_b"), "Miscellaneous Pins");
    assert_eq!(signal_category("FTM0_CH5"), "FlexTimer (FTM0)");
    assert_eq!(signal_category("SWD_CLK"), "Debug and Control");
    assert_eq!(signal_category("VDD_WEIRD"), "Miscellaneous");
}
