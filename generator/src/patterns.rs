// Licensed under the Apache-2.0 license

//! Fallback signal-name classifier.
//!
//! Signal names that no peripheral template claims are decomposed here into
//! (peripheral base, instance, signal) so they can still be offered as pin
//! mapping choices. Two ordered catalogs are tried first-match-wins: the
//! primary catalog covers fixed-function and debug signals, the alternate
//! catalog covers spellings of signals normally claimed by a template.

use lazy_static::lazy_static;
use regex::Regex;

/// A signal name decomposed into peripheral base, instance and signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalParts {
    pub base: String,
    pub instance: String,
    pub signal: String,
}

const PRIMARY_PATTERNS: &[&str] = &[
    r"^\s*(ADC)(\d+)_(?:DM|DP|SE)(\d+[ab]?)\s*$",
    r"^\s*(FTM|TPM)()_(CLKIN\d+)\s*$",
    r"^\s*(SDHC)(\d+)_((CLKIN)|(D\d)|(CMD)|(DCLK))\s*$",
    r"^\s*(I2S)(\d+)_(TX_BCLK|TXD[0-1]|RXD[0-1]|TX_FS|RX_BCLK|MCLK|RX_FS|TXD1)\s*$",
    r"^\s*(A?CMP)(\d+)_((IN\d*)|(OUT\d*))\s*$",
    r"^\s*(JTAG)()_(TCLK|TDI|TDO|TMS|TRST_b)\s*$",
    r"^\s*(SWD)()_(CLK|DIO|IO)\s*$",
    r"^\s*(EZP)()_(CLK|DI|DO|CS_b)\s*$",
    r"^\s*(TRACE)()_(SWO)\s*$",
    r"^\s*(NMI)()_[bB]()\s*$",
    r"^\s*(USB\d*)(\d*)_(CLKIN|SOF_OUT|DP|DM)\s*$",
    r"^\s*(E?XTAL(?:32K?)?)(\d*)()\s*$",
    r"^\s*(EWM)()_(IN|OUT_b|OUT)\s*$",
    r"^\s*(PDB)(\d+)_(EXTRG)\s*$",
    r"^\s*(CMT)(\d*)_(IRO)\s*$",
    r"^\s*(RTC)(\d*)_(CLKOUT|CLKIN|WAKEUP_B)\s*$",
    r"^\s*(DAC)(\d+)_(OUT)\s*$",
    r"^\s*(VREF)(\d*)_(OUT)\s*$",
    r"^\s*(CLKOUT)()()\s*$",
    r"^\s*(TRACE)()_(CLKOUT|D[0-3])\s*$",
    r"^\s*(CLKOUT32K)()()\s*$",
    r"^\s*(R?MII)(\d+)_(RXCLK|RXER|RXD[0-4]|CRS_DV|RXDV|TXEN|TXD[0-4]|TXCLK|CRS|TXER|COL|MDIO|MDC)\s*$",
    r"^\s*(CAN)(\d+)_(TX|RX)\s*$",
    r"^\s*(FB)()_((AD?(\d+))|OE_b|RW_b|CS[0-5]_b|TSIZ[0-1]|BE\d+_\d+_BLS\d+_\d+_b|TBST_b|TA_b|ALE|TS_b)\s*$",
    r"^\s*(ENET)(\d*)_(1588_TMR[0-3]|CLKIN|1588_CLKIN)\s*$",
    r"^\s*(KBI)(\d+)_(P\d+)\s*$",
    r"^\s*(IRQ)()()\s*$",
    r"^\s*(RESET_[bB])()()\s*$",
    r"^\s*(BUSOUT)()()\s*$",
    r"^\s*(RTCCLKOUT)()()\s*$",
    r"^\s*(AFE)()_(CLK)\s*$",
    r"^\s*(EXTRG)()_(IN)\s*$",
    r"^\s*(CMP)(\d)(OUT|P[0-9])\s*$",
    r"^\s*(TCLK)(\d+)()\s*$",
    r"^\s*(PWT)()_(IN\d+)\s*$",
    r"^\s*(LCD)()_(P\d+)(_fault)?\s*$",
    r"^\s*(LCD)()(\d+)\s*$",
    r"^\s*(QT)(\d+)()\s*$",
    r"^\s*(audioUSB)()_(SOF_OUT)\s*$",
    r"^\s*(PXBAR)()_((IN\d+)|(OUT\d+))\s*$",
    r"^\s*(LGPIOI)()_(M\d+)\s*$",
    r"^\s*(SDAD)()((M|P)[0-3])\s*$",
    r"^\s*(FXIO)(\d+)_(D\d+)\s*$",
    r"^\s*(VOUT33|VREGIN)()()\s*$",
];

const ALTERNATE_PATTERNS: &[&str] = &[
    r"^\s*(Disabled)()()\s*$",
    r"^\s*(PT)([A-Z])(\d+)\s*$",
    r"^\s*(GPIO)([A-Z])_(\d+)\s*$",
    r"^\s*(FTM|TPM)(\d+)_(CH\d+)\s*$",
    r"^\s*(FTM)(\d+)_(QD_PH[AB]|FLT2|CLKIN[0-1]|FLT[0-9])\s*$",
    r"^\s*(SPI)(\d+)_(SOUT|SIN|SCK|SS|(PCS(\d+)?)|MOSI|MISO|SS_B)\s*$",
    r"^\s*(I2C)(\d+)_((SDA)|(SCL|4WSCLOUT|4WSDAOUT))\s*$",
    r"^\s*(LPTMR)(\d+)_ALT(\d+)\s*$",
    r"^\s*(LPTMR)()(_ALT\d+)\s*$",
    r"^\s*(UART)(\d+)_(CTS_b|RTS_b|COL_b|RX|TX)\s*$",
    r"^\s*(LPUART)(\d+)_(CTS_b|RTS_b|COL_b|RX|TX)\s*$",
    r"^\s*(TSI)(\d+)_(CH\d+)\s*$",
    r"^\s*(LLWU)()_(P\d+)\s*$",
    r"^\s*(SCI)(\d+)_(RTS|CTS|TxD|RxD)\s*$",
];

lazy_static! {
    static ref PRIMARY: Vec<Regex> = compile(PRIMARY_PATTERNS);
    static ref ALTERNATE: Vec<Regex> = compile(ALTERNATE_PATTERNS);
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

fn match_catalog(catalog: &[Regex], name: &str) -> Option<SignalParts> {
    for pattern in catalog {
        if let Some(caps) = pattern.captures(name) {
            let group = |n| caps.get(n).map_or(String::new(), |m| m.as_str().to_string());
            return Some(SignalParts {
                base: group(1),
                instance: group(2),
                signal: group(3),
            });
        }
    }
    None
}

/// Classifies a signal name that no template claimed.
///
/// A miss on the primary catalog is only a warning, since the alternate
/// catalog may still recognise the name. `None` means neither catalog did.
pub fn classify(name: &str) -> Option<SignalParts> {
    if let Some(parts) = match_catalog(&PRIMARY, name) {
        return Some(parts);
    }
    log::warn!("couldn't classify signal '{name}'");
    match_catalog(&ALTERNATE, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(base: &str, instance: &str, signal: &str) -> SignalParts {
        SignalParts {
            base: base.to_string(),
            instance: instance.to_string(),
            signal: signal.to_string(),
        }
    }

    #[test]
    fn test_primary_catalog() {
        assert_eq!(classify("SWD_CLK"), Some(parts("SWD", "", "CLK")));
        assert_eq!(classify("ADC0_DM1"), Some(parts("ADC", "0", "1")));
        assert_eq!(classify("JTAG_TDI"), Some(parts("JTAG", "", "TDI")));
        assert_eq!(classify("EXTAL32"), Some(parts("EXTAL32", "", "")));
        assert_eq!(classify("USB_DP"), Some(parts("USB", "", "DP")));
    }

    #[test]
    fn test_alternate_catalog() {
        assert_eq!(classify("PTA4"), Some(parts("PT", "A", "4")));
        assert_eq!(classify("LLWU_P5"), Some(parts("LLWU", "", "P5")));
        assert_eq!(classify("SPI0_PCS2"), Some(parts("SPI", "0", "PCS2")));
    }

    #[test]
    fn test_first_match_wins() {
        // CMP0_OUT is claimed by the A?CMP pattern before the bare CMP one
        assert_eq!(classify("CMP0_OUT"), Some(parts("CMP", "0", "OUT")));
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(classify("NOT_A_SIGNAL"), None);
    }
}
