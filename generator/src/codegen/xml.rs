// Licensed under the Apache-2.0 license

//! XML description of the pin mapping, consumed by the device editor.

use std::io;

use anyhow::{bail, Result};
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::model::{DeviceInfo, MuxSelection, PinIdx, DISABLED_SIGNAL, VERSION};

use super::{categorize, pin_category};

fn attribute(element: &mut Element, name: &str, value: &str) {
    element
        .attributes
        .insert(name.to_string(), value.to_string());
}

fn pin_element(info: &DeviceInfo, pin_idx: PinIdx) -> Result<Element> {
    let pin = &info.pins[pin_idx];
    let mut element = Element::new("pin");
    attribute(&mut element, "name", &pin.name);
    let is_fixed = pin.mappings.contains_key(&MuxSelection::Fixed);
    if is_fixed {
        attribute(&mut element, "isFixed", "true");
    }
    for (&mux, signals) in &pin.mappings {
        if !matches!(mux, MuxSelection::Mux(_)) {
            continue;
        }
        for &signal in signals {
            if signal == DISABLED_SIGNAL {
                continue;
            }
            let mut mux_element = Element::new("mux");
            attribute(&mut mux_element, "sel", &mux.to_string());
            attribute(&mut mux_element, "function", &info.signals[signal].name);
            element.children.push(XMLNode::Element(mux_element));
        }
    }
    if !is_fixed {
        let Some(reset_mux) = pin.reset_mux else {
            bail!("No reset value given for pin {}", pin.name);
        };
        let mut reset = Element::new("reset");
        attribute(&mut reset, "sel", &reset_mux.to_string());
        element.children.push(XMLNode::Element(reset));
        let mut default = Element::new("default");
        attribute(
            &mut default,
            "sel",
            &pin.default_mux.unwrap_or(reset_mux).to_string(),
        );
        element.children.push(XMLNode::Element(default));
    }
    Ok(element)
}

/// Writes the family description: device variants, pins grouped by port
/// with their mux options, package placements and peripheral PCR tables.
pub fn write_device_description(info: &DeviceInfo, writer: impl io::Write) -> Result<()> {
    let mut root = Element::new("root");
    attribute(&mut root, "version", VERSION);

    let mut family = Element::new("family");
    attribute(&mut family, "name", &info.device_name);
    for variant in &info.variants {
        let mut device = Element::new("device");
        attribute(&mut device, "name", &variant.name);
        attribute(&mut device, "manual", &variant.manual);
        attribute(&mut device, "package", &info.packages[variant.package].name);
        family.children.push(XMLNode::Element(device));
    }
    root.children.push(XMLNode::Element(family));

    let sorted = info.sorted_pins();

    let mut pins = Element::new("pins");
    for (title, group_pins) in categorize(&sorted, |pin| pin_category(&info.pins[pin].name)) {
        let mut group = Element::new("group");
        attribute(&mut group, "name", &title);
        for pin in group_pins {
            group.children.push(XMLNode::Element(pin_element(info, pin)?));
        }
        pins.children.push(XMLNode::Element(group));
    }
    root.children.push(XMLNode::Element(pins));

    let mut packages = Element::new("packages");
    for package in &info.packages {
        let mut package_element = Element::new("package");
        attribute(&mut package_element, "name", &package.name);
        for &pin in &sorted {
            let Some(location) = package.location(pin) else {
                continue;
            };
            let mut placement = Element::new("placement");
            attribute(&mut placement, "pin", &info.pins[pin].name);
            attribute(&mut placement, "location", location);
            package_element.children.push(XMLNode::Element(placement));
        }
        packages.children.push(XMLNode::Element(package_element));
    }
    root.children.push(XMLNode::Element(packages));

    let mut peripherals = Element::new("peripherals");
    for template in &info.templates {
        if !template.class_is_used() {
            continue;
        }
        let mut peripheral = Element::new("peripheral");
        attribute(&mut peripheral, "name", &template.peripheral_name);
        let mut pcrs = Element::new("pcrs");
        for (index, slot) in template.functions.iter().enumerate() {
            let Some(signal) = *slot else {
                continue;
            };
            let mut pcr = Element::new("pcr");
            attribute(&mut pcr, "index", &index.to_string());
            attribute(&mut pcr, "function", &info.signals[signal].name);
            pcrs.children.push(XMLNode::Element(pcr));
        }
        peripheral.children.push(XMLNode::Element(pcrs));
        peripherals.children.push(XMLNode::Element(peripheral));
    }
    root.children.push(XMLNode::Element(peripherals));

    let config = EmitterConfig::new().perform_indent(true);
    root.write_with_config(writer, config)?;
    Ok(())
}
