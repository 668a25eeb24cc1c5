// Licensed under the Apache-2.0 license

//! Text-emission primitives for the generated C files.
//!
//! Small helpers that append C preprocessor directives, doxygen groups and
//! configuration-wizard markup to a `String` sink. The wizard markup is the
//! annotation format understood by the configuration editor: `// <h>`
//! sections, `// <o>` options with `<0=>` entries, and `<name=..>` /
//! `<selection=..,..>` cross-reference attributes.

use std::fmt;
use std::fmt::Write;

const HEADER_FILE_PREFIX: &str = "PROJECT_HEADERS_";

/// Attribute appended to a wizard option or section title.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// `<name=..>`: names the option so other options can refer to it.
    Name(String),
    /// `<constant>`: the option is display-only.
    Constant,
    /// `<validate=..>`: annotation validator id.
    Validate(String),
    /// `<selection=name,value>`: ties this entry to a named option.
    Selection(String, String),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Name(name) => write!(f, "<name={name}>"),
            Attribute::Constant => write!(f, "<constant>"),
            Attribute::Validate(id) => write!(f, "<validate={id}>"),
            Attribute::Selection(name, value) => write!(f, "<selection={name},{value}>"),
        }
    }
}

fn attributes_text(attributes: &[Attribute]) -> String {
    let mut s = String::new();
    for attribute in attributes {
        write!(s, "{attribute}").unwrap();
    }
    s
}

/// Opens a doxygen `@addtogroup` block.
pub fn start_group(out: &mut String, name: &str, title: &str, brief: Option<&str>) {
    write!(out, "/**\n * @addtogroup {name} {title}\n").unwrap();
    if let Some(brief) = brief {
        write!(out, " * @brief {brief}\n").unwrap();
    }
    out.push_str(" * @{\n */\n");
}

/// Closes a doxygen group.
pub fn close_group(out: &mut String) {
    out.push_str("/**\n * @}\n */\n");
}

/// Closes a doxygen group, naming it in the trailer.
pub fn close_group_named(out: &mut String, name: &str) {
    write!(out, "/**\n * @}}\n ** {name}\n */\n").unwrap();
}

fn guard_macro(file_name: &str) -> String {
    let mut macro_name = String::from(HEADER_FILE_PREFIX);
    for c in file_name.chars() {
        macro_name.push(match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        });
    }
    macro_name
}

fn file_doc_block(
    out: &mut String,
    file_name: &str,
    true_file_name: &str,
    version: &str,
    description: &str,
) {
    let derived = if true_file_name.is_empty() {
        String::new()
    } else {
        format!("(derived from {true_file_name})")
    };
    let description = description.replace('\n', "\n *            ");
    write!(
        out,
        "/**\n * @file      {file_name} {derived}\n * @version   {version}\n * @brief     {description}\n */\n\n"
    )
    .unwrap();
}

/// Writes the header-file doc block and opens the include guard.
pub fn header_preamble(
    out: &mut String,
    file_name: &str,
    true_file_name: &str,
    version: &str,
    description: &str,
) {
    file_doc_block(out, file_name, true_file_name, version, description);
    let macro_name = guard_macro(file_name);
    write!(out, "#ifndef {macro_name}\n#define {macro_name}\n\n").unwrap();
}

/// Closes the include guard opened by [`header_preamble`].
pub fn header_postamble(out: &mut String, file_name: &str) {
    write!(out, "\n#endif /* {} */\n", guard_macro(file_name)).unwrap();
}

/// Writes the source-file doc block.
pub fn source_preamble(
    out: &mut String,
    file_name: &str,
    true_file_name: &str,
    version: &str,
    description: &str,
) {
    file_doc_block(out, file_name, true_file_name, version, description);
}

pub fn system_include(out: &mut String, file_name: &str) {
    write!(out, "#include <{file_name}>\n").unwrap();
}

pub fn local_include(out: &mut String, file_name: &str) {
    write!(out, "#include \"{file_name}\"\n").unwrap();
}

pub fn open_namespace(out: &mut String, namespace: &str) {
    write!(out, "namespace {namespace} {{\n\n").unwrap();
}

pub fn close_namespace(out: &mut String, namespace: &str) {
    write!(out, "\n}} // End namespace {namespace}\n").unwrap();
}

pub fn close_namespace_anon(out: &mut String) {
    out.push_str("\n} // End namespace\n");
}

pub fn if_start(out: &mut String, condition: &str) {
    write!(out, "#if ({condition})\n").unwrap();
}

pub fn if_elif(out: &mut String, condition: &str) {
    write!(out, "#elif ({condition})\n").unwrap();
}

pub fn if_end(out: &mut String) {
    out.push_str("#endif\n");
}

/// Writes `#if` on the first call of a chain and `#elif` afterwards.
pub fn if_open(out: &mut String, condition: &str, chain_open: bool) {
    if chain_open {
        if_elif(out, condition);
    } else {
        if_start(out, condition);
    }
}

/// Writes `#else` only when a guard chain is open.
pub fn if_else_when(out: &mut String, chain_open: bool) {
    if chain_open {
        out.push_str("#else\n");
    }
}

/// Writes `#endif` only when a guard chain is open.
pub fn if_end_when(out: &mut String, chain_open: bool) {
    if chain_open {
        if_end(out);
    }
}

pub fn wizard_marker(out: &mut String) {
    out.push_str(
        "//-------- <<< Use Configuration Wizard in Context Menu >>> -----------------  \n\n",
    );
}

pub fn end_wizard_marker(out: &mut String) {
    out.push_str("//-------- <<< end of configuration section >>> -----------------  \n\n");
}

pub fn wizard_section_open(out: &mut String, title: &str) {
    write!(out, "// <h> {title}\n\n").unwrap();
}

pub fn wizard_section_close(out: &mut String) {
    out.push_str("// </h>\n\n");
}

fn offset_tag(offset: usize) -> String {
    if offset == 0 {
        String::new()
    } else {
        offset.to_string()
    }
}

/// Opens a `<e>` conditional wizard section.
pub fn wizard_conditional_open(
    out: &mut String,
    comment: Option<&str>,
    offset: usize,
    attributes: &[Attribute],
    title: &str,
    hint: &str,
) {
    if let Some(comment) = comment {
        write!(out, "// {comment}\n").unwrap();
    }
    let hint = hint.replace('\n', "\n//   <i> ");
    write!(
        out,
        "//   <e{}> {} {}\n//   <i> {}\n",
        offset_tag(offset),
        title,
        attributes_text(attributes),
        hint
    )
    .unwrap();
}

pub fn wizard_conditional_close(out: &mut String) {
    out.push_str("// </e>\n\n");
}

/// Writes the `<o>` preamble of a wizard selection option.
pub fn wizard_option_preamble(
    out: &mut String,
    comment: Option<&str>,
    offset: usize,
    attributes: &[Attribute],
    title: &str,
    hint: &str,
    information: Option<&str>,
) {
    if let Some(comment) = comment {
        write!(out, "// {comment}\n").unwrap();
    }
    write!(out, "//   <o{}>    {}", offset_tag(offset), title).unwrap();
    out.push_str(&attributes_text(attributes));
    out.push('\n');
    let hint = hint.replace('\n', "\n//   <i>   ");
    write!(out, "//   <i>    {hint}\n").unwrap();
    if let Some(information) = information {
        if !information.is_empty() {
            let information = information.replace('\n', "\n//   <info> ");
            write!(out, "//   <info> {information}\n").unwrap();
        }
    }
}

/// Writes the `<q>` preamble of a binary wizard option.
pub fn wizard_binary_option_preamble(
    out: &mut String,
    comment: Option<&str>,
    offset: usize,
    is_constant: bool,
    title: &str,
    hint: &str,
) {
    if let Some(comment) = comment {
        write!(out, "// {comment}\n").unwrap();
    }
    let hint = hint.replace('\n', "\n//   <i> ");
    write!(
        out,
        "//   <q{}> {} {}\n//   <i> {}\n",
        offset_tag(offset),
        title,
        if is_constant { "<constant>" } else { "" },
        hint
    )
    .unwrap();
}

/// Writes a `<value=> description` wizard entry.
pub fn wizard_entry(out: &mut String, value: &str, description: &str, attributes: &[Attribute]) {
    write!(out, "//     <{value}=> {description}").unwrap();
    out.push_str(&attributes_text(attributes));
    out.push('\n');
}

pub fn wizard_default_entry(out: &mut String, value: &str) {
    write!(out, "//     <{value}=> Default\n").unwrap();
}

/// Writes a `constexpr` integer definition of the given bit size.
pub fn constexpr_def(out: &mut String, size: u32, name: &str, value: &str) {
    write!(
        out,
        "constexpr {:>8} {:<20} = {};\n",
        crate::util::c_int_type(size),
        name,
        value
    )
    .unwrap();
}

pub fn macro_def(out: &mut String, name: &str, value: &str) {
    write!(out, "#define {name:<20} {value}\n").unwrap();
}

pub fn macro_def_commented(out: &mut String, name: &str, value: &str, comment: &str) {
    write!(out, "#define {name:<24} {value:<20} //{comment}\n").unwrap();
}

pub fn macro_undef(out: &mut String, name: &str) {
    write!(out, "#undef {name:<24}\n").unwrap();
}

/// Writes a plain comment banner.
pub fn banner(out: &mut String, text: &str) {
    write!(out, "/*\n * {}\n */\n", text.replace('\n', "\n * ")).unwrap();
}

/// Writes a doc-comment banner.
pub fn doc_banner(out: &mut String, text: &str) {
    write!(out, "/**\n * {}\n */\n", text.replace('\n', "\n * ")).unwrap();
}
